//! Core traits and types for APDU (Application Protocol Data Unit) operations
//!
//! This crate provides the foundational types and traits for working with smart card
//! APDU commands and responses according to ISO/IEC 7816-4.
//!
//! ## Overview
//!
//! APDU (Application Protocol Data Unit) is the communication format used by smart cards.
//! This crate provides abstractions for:
//!
//! - Creating and parsing APDU commands and responses
//! - Classifying the status word that ends every response
//! - Communicating with smart cards and their readers through different transport layers
//! - Error handling and status word interpretation
//!
//! Protocol logic that is specific to a card application lives in the crates built on
//! top of this one; this crate only knows about framing and the single resend that
//! ISO 7816 cards may request through an `6C XX` status.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

// Main modules
pub mod command;
pub mod error;
pub mod executor;
pub mod response;
pub mod transport;

pub use command::{Command, ExpectedLength};
pub use error::{Error, Result, ResultExt};
pub use executor::{CardExecutor, Executor};
pub use response::Response;
pub use response::status::{StatusClass, StatusWord};
pub use transport::{CardTransport, ControlCode, TransportError};

#[cfg(any(test, feature = "mock"))]
pub use transport::mock::{Exchange, MockTransport};

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    // Test the basic types are re-exported correctly
    #[test]
    fn test_reexports() {
        let cmd = Command::new(0x00, 0xA4, 0x08, 0x0C);
        assert_eq!(cmd.class(), 0x00);
        assert_eq!(cmd.instruction(), 0xA4);
        assert_eq!(cmd.p1(), 0x08);
        assert_eq!(cmd.p2(), 0x0C);

        let data = Bytes::from_static(&[0x01, 0x02, 0x03]);
        let resp = Response::new(data.clone(), (0x90, 0x00));
        assert!(resp.is_success());
        assert_eq!(resp.payload(), &data);
        assert_eq!(resp.status(), StatusWord::new(0x90, 0x00));
        assert_eq!(resp.class(), StatusClass::Success);
    }
}
