//! Signing a file

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use eid_card::keys;
use eid_signer::{EidSignature, ExternalSignature, HashAlgorithm};
use parking_lot::Mutex;
use tracing::info;

use crate::utils::session::{self, CardSession};
use crate::utils;

/// Arguments of the `sign` command
#[derive(Args, Debug, Clone)]
pub struct SignArgs {
    /// File to sign
    #[arg(required = true)]
    pub input: PathBuf,

    /// Hash applied to the file
    #[arg(long, value_enum, default_value_t = HashAlgorithm::Sha256)]
    pub hash: HashAlgorithm,

    /// Let the card apply PSS padding (SHA-1 and SHA-256 only)
    #[arg(long)]
    pub pss: bool,

    /// Sign with the authentication key instead of the signature key
    #[arg(long)]
    pub authentication: bool,

    /// Where to write the signature (printed as hex when absent)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// PIN code (prompted for when the reader has no pinpad)
    #[arg(long)]
    pub pin: Option<String>,
}

/// Sign a file with the card
pub fn sign_command(card: CardSession, args: &SignArgs) -> eyre::Result<()> {
    let message = fs::read(&args.input)?;

    let mut card = if args.authentication {
        card.with_key_id(keys::AUTHENTICATION)
    } else {
        card
    };
    card.set_pin_source(Some(session::pin_source(args.pin.as_deref())));
    session::announce_pin_entry(&mut card);

    let card = Arc::new(Mutex::new(card));
    let mut signer = EidSignature::new(Arc::clone(&card), args.hash);
    if args.pss {
        signer = signer.with_pss()?;
    }

    let signature = signer.sign(&message)?;
    info!(
        encryption = signer.encryption_algorithm(),
        hash = signer.hash_algorithm(),
        len = signature.len(),
        "File signed"
    );

    match &args.output {
        Some(path) => {
            utils::write_file(path, &signature)?;
            println!("Signature saved to {}", path.display());
        }
        None => println!("{}", hex::encode(&signature)),
    }

    drop(signer);
    if let Some(card) = Arc::into_inner(card) {
        card.into_inner().disconnect()?;
    }
    Ok(())
}
