//! Message signing with a Belgian eID card
//!
//! [`EidSignature`] hashes a message on the host and asks the card to sign
//! the digest, in the shape document signing libraries expect from an
//! external signer.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

mod error;
mod hash;
mod signature;

pub use error::{Error, Result};
pub use hash::HashAlgorithm;
pub use signature::{EidSignature, ExternalSignature};
