//! Core error type for all APDU operations
//!
//! Transport failures and malformed units are reported through [`Error`].
//! Non-success status words are not errors at this layer; they are handed
//! back to the caller inside a [`Response`](crate::Response).

use crate::transport::TransportError;

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The channel to the card could not be used
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Invalid command length
    #[error("Invalid command length: {0}")]
    InvalidCommandLength(usize),

    /// Parse error when processing a response
    #[error("Parse error: {0}")]
    Parse(&'static str),

    /// Context error with message and source error
    #[error("{context}: {source}")]
    Context {
        /// Contextual message
        context: String,
        /// Source error
        source: Box<Self>,
    },
}

impl Error {
    /// Create a new error with context information
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a new parse error
    pub const fn parse(message: &'static str) -> Self {
        Self::Parse(message)
    }
}

/// Result type for APDU operations
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for Result with APDU Errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, context: S) -> Result<T>;

    /// Add lazily built context to an error
    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, context: F) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context<S: Into<String>>(self, context: S) -> Self {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, context: F) -> Self {
        self.map_err(|e| e.with_context(context()))
    }
}
