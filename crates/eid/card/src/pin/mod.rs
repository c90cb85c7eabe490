//! Cardholder PIN verification
//!
//! Three ways to get the PIN to the card, tried in this order:
//!
//! 1. the reader verifies on its own pinpad in one call (`VERIFY_PIN_DIRECT`),
//! 2. the reader is started, its keypad polled, then finished
//!    (`VERIFY_PIN_START`, `GET_KEY_PRESSED`, `VERIFY_PIN_FINISH`),
//! 3. a [`PinSource`] supplies the digits and a plain VERIFY is sent.
//!
//! Whatever the method, the final status word is folded into a [`PinOutcome`].

mod block;
mod cancel;
mod source;
mod verifier;

pub use block::{
    PIN_BLOCK_LEN, PinBlock, VERIFY_PARAMETERS_LEN, validate_pin, verification_data_structure,
};
pub use cancel::CancelToken;
pub use source::{FixedPin, PinSource};
pub use verifier::PinVerifier;

use eid_apdu_core::{ControlCode, StatusClass, StatusWord};

use crate::features::{FeatureMap, FeatureTag};
use crate::{Error, Result};

/// Result of one PIN verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    /// The card accepted the PIN
    Verified,
    /// The card refused the PIN
    WrongPin {
        /// Attempts left before the PIN is blocked
        retries_remaining: u8,
    },
    /// The PIN is blocked
    Blocked,
    /// Any other status
    ProtocolError(StatusWord),
}

impl PinOutcome {
    /// Fold the status word that ended a verification
    pub const fn from_status(status: StatusWord) -> Self {
        match status.classify() {
            StatusClass::Success => Self::Verified,
            StatusClass::AuthMethodBlocked => Self::Blocked,
            StatusClass::Warning { retries_remaining } => Self::WrongPin { retries_remaining },
            _ => Self::ProtocolError(status),
        }
    }

    /// Whether the card accepted the PIN
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }

    /// Turn every outcome but [`Verified`](Self::Verified) into an error
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Verified => Ok(()),
            Self::WrongPin { retries_remaining } => Err(Error::WrongPin { retries_remaining }),
            Self::Blocked => Err(Error::PinBlocked),
            Self::ProtocolError(status) => Err(Error::PinProtocol(status)),
        }
    }
}

/// How the PIN reaches the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMethod {
    /// Reader verifies on its pinpad in one blocking call
    DirectPinpad(ControlCode),
    /// Reader entry started, polled key by key, then finished
    StartFinishPinpad {
        /// `VERIFY_PIN_START` code
        start: ControlCode,
        /// `VERIFY_PIN_FINISH` code
        finish: ControlCode,
        /// `GET_KEY_PRESSED` code
        key_pressed: ControlCode,
    },
    /// Digits come from a [`PinSource`]
    SoftwareProvided,
}

/// Pick the best available method
///
/// A start/finish pinpad is only usable when start, finish and key-pressed
/// codes are all advertised.
pub fn select_method(features: &FeatureMap, has_pin_source: bool) -> Result<PinMethod> {
    if let Some(code) = features.get(FeatureTag::VerifyPinDirect) {
        return Ok(PinMethod::DirectPinpad(code));
    }

    if let (Some(start), Some(finish), Some(key_pressed)) = (
        features.get(FeatureTag::VerifyPinStart),
        features.get(FeatureTag::VerifyPinFinish),
        features.get(FeatureTag::GetKeyPressed),
    ) {
        return Ok(PinMethod::StartFinishPinpad {
            start,
            finish,
            key_pressed,
        });
    }

    if has_pin_source {
        return Ok(PinMethod::SoftwareProvided);
    }

    Err(Error::NoPinMethodAvailable)
}
