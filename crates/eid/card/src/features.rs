//! Reader feature negotiation
//!
//! Pinpad readers advertise their secure PIN entry functions as vendor control
//! codes. The reader is asked once with `GET_FEATURE_REQUEST`; the answer is a
//! list of 6 byte records `tag, reserved, code (u32 BE)`.

use std::collections::BTreeMap;
use std::fmt;

use eid_apdu_core::{ControlCode, Executor};
use tracing::{debug, warn};

/// `CM_IOCTL_GET_FEATURE_REQUEST` before the platform transform
pub const GET_FEATURE_REQUEST: u32 = 0xD48;

/// Size of one feature record
const RECORD_LEN: usize = 6;

/// Reader feature tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum FeatureTag {
    /// Start a pinpad PIN verification
    #[display("VERIFY_PIN_START")]
    VerifyPinStart = 0x01,
    /// Collect the result of a started verification
    #[display("VERIFY_PIN_FINISH")]
    VerifyPinFinish = 0x02,
    /// Start a pinpad PIN change
    #[display("MODIFY_PIN_START")]
    ModifyPinStart = 0x03,
    /// Collect the result of a started PIN change
    #[display("MODIFY_PIN_FINISH")]
    ModifyPinFinish = 0x04,
    /// Poll the last key pressed on the pinpad
    #[display("GET_KEY_PRESSED")]
    GetKeyPressed = 0x05,
    /// Verify a PIN in one blocking call
    #[display("VERIFY_PIN_DIRECT")]
    VerifyPinDirect = 0x06,
    /// Change a PIN in one blocking call
    #[display("MODIFY_PIN_DIRECT")]
    ModifyPinDirect = 0x07,
    /// Reader certified as eID pinpad
    #[display("EID_PIN_PAD_READER")]
    EidPinPadReader = 0x80,
}

impl FeatureTag {
    /// Tag for a raw record byte
    pub const fn from_u8(tag: u8) -> Option<Self> {
        Some(match tag {
            0x01 => Self::VerifyPinStart,
            0x02 => Self::VerifyPinFinish,
            0x03 => Self::ModifyPinStart,
            0x04 => Self::ModifyPinFinish,
            0x05 => Self::GetKeyPressed,
            0x06 => Self::VerifyPinDirect,
            0x07 => Self::ModifyPinDirect,
            0x80 => Self::EidPinPadReader,
            _ => return None,
        })
    }
}

/// Control codes advertised by the reader, keyed by feature tag
///
/// A missing tag means the reader lacks that feature; readers without a
/// pinpad produce an empty map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureMap(BTreeMap<u8, ControlCode>);

impl FeatureMap {
    /// Empty map
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Parse a `GET_FEATURE_REQUEST` answer
    ///
    /// Trailing bytes shorter than a record are ignored. Codes are stored as
    /// advertised, already in the form the reader expects for control calls.
    pub fn parse(data: &[u8]) -> Self {
        let mut map = Self::new();
        for record in data.chunks_exact(RECORD_LEN) {
            let code = u32::from_be_bytes([record[2], record[3], record[4], record[5]]);
            map.0.insert(record[0], code);
        }
        map
    }

    /// Add a feature
    pub fn insert(&mut self, tag: FeatureTag, code: ControlCode) {
        self.0.insert(tag as u8, code);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, tag: FeatureTag, code: ControlCode) -> Self {
        self.insert(tag, code);
        self
    }

    /// Control code for a feature
    pub fn get(&self, tag: FeatureTag) -> Option<ControlCode> {
        self.0.get(&(tag as u8)).copied()
    }

    /// Whether the reader advertises a feature
    pub fn contains(&self, tag: FeatureTag) -> bool {
        self.0.contains_key(&(tag as u8))
    }

    /// Whether the reader can take the PIN on its own keypad
    pub fn has_secure_pin_entry(&self) -> bool {
        self.contains(FeatureTag::VerifyPinDirect) || self.contains(FeatureTag::VerifyPinStart)
    }

    /// Number of advertised features
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no feature is advertised
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FeatureMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<String> = self
            .0
            .keys()
            .map(|&tag| match FeatureTag::from_u8(tag) {
                Some(tag) => tag.to_string(),
                None => format!("0x{tag:02X}"),
            })
            .collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Platform form of a reader control code
#[cfg(windows)]
pub const fn control_code(code: u32) -> ControlCode {
    (0x31 << 16) | (code << 2)
}

/// Platform form of a reader control code
#[cfg(not(windows))]
pub const fn control_code(code: u32) -> ControlCode {
    0x4200_0000 + code
}

/// Ask the reader for its features
///
/// Readers that do not understand the request are the common case, so any
/// failure is logged and yields an empty map.
pub fn query_features<E: Executor + ?Sized>(executor: &mut E) -> FeatureMap {
    match executor.control(control_code(GET_FEATURE_REQUEST), &[]) {
        Ok(reply) => {
            let features = FeatureMap::parse(&reply);
            debug!(%features, "Reader features");
            features
        }
        Err(e) => {
            warn!(error = %e, "Reader feature query failed, assuming no pinpad");
            FeatureMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eid_apdu_core::{CardExecutor, MockTransport};
    use hex_literal::hex;

    #[test]
    fn test_parse_records() {
        let features = FeatureMap::parse(&hex!(
            "06 04 42330006"
            "01 04 42330001"
            "02 04 42330002"
            "05 04 42330005"
        ));
        assert_eq!(features.len(), 4);
        assert_eq!(features.get(FeatureTag::VerifyPinDirect), Some(0x4233_0006));
        assert_eq!(features.get(FeatureTag::GetKeyPressed), Some(0x4233_0005));
        assert_eq!(features.get(FeatureTag::ModifyPinDirect), None);
        assert!(features.has_secure_pin_entry());
    }

    #[test]
    fn test_parse_ignores_partial_record() {
        let features = FeatureMap::parse(&hex!("80 04 00000080 06 04"));
        assert_eq!(features.len(), 1);
        assert!(features.contains(FeatureTag::EidPinPadReader));
        assert!(!features.has_secure_pin_entry());
    }

    #[test]
    fn test_display() {
        let features = FeatureMap::new()
            .with(FeatureTag::VerifyPinStart, 1)
            .with(FeatureTag::VerifyPinDirect, 6);
        assert_eq!(features.to_string(), "VERIFY_PIN_START, VERIFY_PIN_DIRECT");
        assert_eq!(FeatureMap::new().to_string(), "none");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_control_code_transform() {
        assert_eq!(control_code(GET_FEATURE_REQUEST), 0x4200_0D48);
    }

    #[test]
    fn test_query_features() {
        let mock = MockTransport::new().control_reply(hex!("06 04 42330006").to_vec());
        let mut executor = CardExecutor::new(mock);

        let features = query_features(&mut executor);
        assert_eq!(features.get(FeatureTag::VerifyPinDirect), Some(0x4233_0006));

        let controls = executor.transport().controls();
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].0, control_code(GET_FEATURE_REQUEST));
        assert!(controls[0].1.is_empty());
    }

    #[test]
    fn test_query_failure_yields_empty_map() {
        let mut executor = CardExecutor::new(MockTransport::new().control_failure());
        assert!(query_features(&mut executor).is_empty());
    }
}
