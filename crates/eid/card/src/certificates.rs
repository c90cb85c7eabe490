//! Certificates stored on the card

use crate::constants::files;

/// Certificate files of a BeID card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum CertificateKind {
    /// Authentication certificate (key 0x82)
    #[display("authentication")]
    Authentication,
    /// Qualified signature certificate (key 0x83)
    #[display("signing")]
    Signing,
    /// Citizen CA
    #[display("ca")]
    Ca,
    /// Belgium root CA
    #[display("root")]
    Root,
    /// National registry
    #[display("rrn")]
    Rrn,
}

impl CertificateKind {
    /// Every certificate on the card
    pub const ALL: [Self; 5] = [
        Self::Authentication,
        Self::Signing,
        Self::Ca,
        Self::Root,
        Self::Rrn,
    ];

    /// Chain of the signing key, leaf first
    pub const SIGNING_CHAIN: [Self; 3] = [Self::Signing, Self::Ca, Self::Root];

    /// File path on the card
    pub const fn path(self) -> [u8; 6] {
        match self {
            Self::Authentication => files::AUTHENTICATION_CERT,
            Self::Signing => files::SIGNING_CERT,
            Self::Ca => files::CA_CERT,
            Self::Root => files::ROOT_CERT,
            Self::Rrn => files::RRN_CERT,
        }
    }
}
