//! Commands reading card files

use std::path::Path;

use eid_card::CertificateKind;
use tracing::debug;

use crate::utils::{self, session::CardSession};

/// Print the cardholder identity
pub fn identity_command(card: &mut CardSession) -> eyre::Result<()> {
    let identity = card.identity()?;
    println!("{identity}");
    Ok(())
}

/// Print the cardholder address
pub fn address_command(card: &mut CardSession) -> eyre::Result<()> {
    let address = card.address()?;
    println!("{address}");
    Ok(())
}

/// Save the cardholder photo
pub fn photo_command(card: &mut CardSession, output: &Path) -> eyre::Result<()> {
    let photo = card.photo()?;
    utils::write_file(output, photo.as_bytes())?;
    println!("Photo saved to {}", output.display());
    Ok(())
}

/// Save certificates as `<kind>.der` files in `dir`
///
/// Without `kind` every certificate on the card is exported.
pub fn certificates_command(
    card: &mut CardSession,
    kind: Option<CertificateKind>,
    dir: &Path,
) -> eyre::Result<()> {
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => CertificateKind::ALL.to_vec(),
    };

    for kind in kinds {
        let der = card.read_certificate(kind)?;
        debug!(%kind, len = der.len(), "Certificate read");
        let path = dir.join(format!("{kind}.der"));
        utils::write_file(&path, &der)?;
        println!("{kind} certificate saved to {}", path.display());
    }

    Ok(())
}
