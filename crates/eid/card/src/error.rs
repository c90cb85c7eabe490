use eid_apdu_core::StatusWord;

use crate::tlv::TlvError;

/// Result type for eID card operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for eID card operations
///
/// Variants fall in three groups: the channel failing (`Apdu`), the card
/// answering a step with an unexpected status word, and domain outcomes the
/// caller is expected to branch on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport or framing failure
    #[error(transparent)]
    Apdu(#[from] eid_apdu_core::Error),

    /// SELECT FILE was refused
    #[error("File {path} not found ({status})")]
    FileNotFound {
        /// Hex encoded file path
        path: String,
        /// Status word returned by SELECT
        status: StatusWord,
    },

    /// READ BINARY failed in the middle of a file
    #[error("Reading file failed at offset {offset} ({status})")]
    ReadBinary {
        /// Offset of the failing block
        offset: usize,
        /// Status word returned by READ BINARY
        status: StatusWord,
    },

    /// MANAGE SECURITY ENVIRONMENT was refused
    #[error("Security environment rejected: {0}")]
    SecurityEnvironment(StatusWord),

    /// PIN verification ended with a status outside the expected set
    #[error("PIN verification error: {0}")]
    PinProtocol(StatusWord),

    /// The card refused to compute the signature
    #[error("Digest could not be signed: {0}")]
    SignatureFailed(StatusWord),

    /// Malformed reply from card or reader
    #[error("Protocol error: {0}")]
    Protocol(&'static str),

    /// Wrong PIN entered
    #[error("Wrong PIN, {retries_remaining} attempts left")]
    WrongPin {
        /// Attempts left before the PIN is blocked
        retries_remaining: u8,
    },

    /// PIN is blocked
    #[error("PIN is blocked")]
    PinBlocked,

    /// Secure PIN entry was required but the reader has no pinpad
    #[error("No secure reader detected")]
    NoSecureReader,

    /// No pinpad and no PIN source configured
    #[error("No PIN entry method available")]
    NoPinMethodAvailable,

    /// PIN entry cancelled by the user
    #[error("PIN entry cancelled")]
    PinCancelled,

    /// Pinpad entry did not complete in time
    #[error("PIN entry timed out")]
    PinEntryTimeout,

    /// PIN supplied by a PIN source is not 4 to 12 digits
    #[error("Invalid PIN: {0}")]
    InvalidPin(&'static str),

    /// The card's ATR does not match the expected profile
    #[error("Card does not match profile {profile} (ATR {atr})")]
    CardIdentityMismatch {
        /// Profile name
        profile: &'static str,
        /// Hex encoded ATR of the inserted card
        atr: String,
    },

    /// Card file could not be decoded
    #[error(transparent)]
    Tlv(#[from] TlvError),
}

impl From<eid_apdu_core::TransportError> for Error {
    fn from(error: eid_apdu_core::TransportError) -> Self {
        Self::Apdu(error.into())
    }
}

impl Error {
    /// Status word carried by this error, if any
    pub const fn status_word(&self) -> Option<StatusWord> {
        match self {
            Self::FileNotFound { status, .. } | Self::ReadBinary { status, .. } => Some(*status),
            Self::SecurityEnvironment(status)
            | Self::PinProtocol(status)
            | Self::SignatureFailed(status) => Some(*status),
            _ => None,
        }
    }
}
