use crate::HashAlgorithm;

/// Signer error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The card refused or failed the operation
    #[error(transparent)]
    Card(#[from] eid_card::Error),

    /// Hash algorithm name not recognised
    #[error("Unknown hash algorithm: {0}")]
    UnknownHashAlgorithm(String),

    /// The card only pads SHA-1 and SHA-256 digests with PSS
    #[error("PSS padding is not available with {0}")]
    PssUnsupported(HashAlgorithm),
}

/// Signer result
pub type Result<T> = std::result::Result<T, Error>;
