//! APDU protocol engine for the Belgian electronic identity card
//!
//! This crate talks to a BeID card over any [`Executor`] from
//! `eid-apdu-core`: it reads card files, negotiates pinpad features with the
//! reader, verifies the cardholder PIN and asks the card for signatures.
//!
//! ```no_run
//! use eid_apdu_core::CardTransport;
//! use eid_card::{CardProfile, EidCard, FixedPin, SessionConfig};
//!
//! fn sign_with<T: CardTransport>(transport: T, digest: &[u8]) -> eid_card::Result<Vec<u8>> {
//!     let mut card = EidCard::open(transport, CardProfile::beid(), SessionConfig::default())?
//!         .with_pin_source(FixedPin::new("1234"));
//!     println!("{}", card.identity()?);
//!
//!     let signature = card.sign(digest, "SHA-256")?;
//!     card.disconnect()?;
//!     Ok(signature.to_vec())
//! }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

mod certificates;
mod commands;
mod config;
mod constants;
mod digest;
mod error;
mod features;
mod file;
mod identity;
mod pin;
mod profile;
mod session;
mod sign;
pub mod tlv;

pub use certificates::CertificateKind;
pub use commands::{compute_digital_signature, manage_security_environment, read_binary, select_file};
pub use config::{SessionConfig, language, language_from_env, language_from_locale};
pub use constants::*;
pub use digest::{DIGEST_NAMES, PLAIN_TEXT, digest_prefix, plain_text_prefix};
pub use error::{Error, Result};
pub use features::{FeatureMap, FeatureTag, GET_FEATURE_REQUEST, control_code, query_features};
pub use file::read_file;
pub use identity::{Address, Identity, Photo, address_tag, identity_tag, parse_date, parse_int};
pub use pin::{
    CancelToken, FixedPin, PIN_BLOCK_LEN, PinBlock, PinMethod, PinOutcome, PinSource, PinVerifier,
    VERIFY_PARAMETERS_LEN, select_method, validate_pin, verification_data_structure,
};
pub use profile::CardProfile;
pub use session::{ENCRYPTION_ALGORITHM, EidCard};
pub use sign::{AlgorithmSelector, build_payload};

pub use eid_apdu_core::{CardExecutor, Executor};
