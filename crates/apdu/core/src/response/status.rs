//! Status word definitions for APDU responses

use std::fmt;

use tracing::Level;

/// Status Word (SW1-SW2) from an APDU response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord {
    /// First status byte (SW1)
    pub sw1: u8,
    /// Second status byte (SW2)
    pub sw2: u8,
}

/// Outcome family of a status word
///
/// Every status word falls into exactly one class. Protocol code branches on
/// the class and keeps the raw word only for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// Normal completion (90 00)
    Success,
    /// Verification failed with a retry counter (63 XX)
    Warning {
        /// Low nibble of SW2
        retries_remaining: u8,
    },
    /// Security status not satisfied (69 82)
    SecurityNotSatisfied,
    /// Authentication method blocked (69 83)
    AuthMethodBlocked,
    /// Wrong parameters P1-P2 (6B 00)
    WrongParameters,
    /// File or record not found (6A 82, 6A 83)
    FileNotFound,
    /// Pinpad entry timed out (64 00)
    Timeout,
    /// Pinpad entry cancelled by the user (64 01)
    UserAborted,
    /// Anything else
    Other(StatusWord),
}

impl StatusWord {
    /// Create a new status word
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Create from a u16 value (SW1 | SW2)
    pub const fn from_u16(status: u16) -> Self {
        Self {
            sw1: (status >> 8) as u8,
            sw2: status as u8,
        }
    }

    /// Convert to a u16 value (SW1 | SW2)
    pub const fn to_u16(&self) -> u16 {
        ((self.sw1 as u16) << 8) | (self.sw2 as u16)
    }

    /// Classify this status word
    pub const fn classify(&self) -> StatusClass {
        match (self.sw1, self.sw2) {
            (0x90, 0x00) => StatusClass::Success,
            (0x63, sw2) => StatusClass::Warning {
                retries_remaining: sw2 & 0x0F,
            },
            (0x69, 0x82) => StatusClass::SecurityNotSatisfied,
            (0x69, 0x83) => StatusClass::AuthMethodBlocked,
            (0x6B, 0x00) => StatusClass::WrongParameters,
            (0x6A, 0x82) | (0x6A, 0x83) => StatusClass::FileNotFound,
            (0x64, 0x00) => StatusClass::Timeout,
            (0x64, 0x01) => StatusClass::UserAborted,
            _ => StatusClass::Other(*self),
        }
    }

    /// Check if this status word indicates success (90 00)
    pub const fn is_success(&self) -> bool {
        self.sw1 == 0x90 && self.sw2 == 0x00
    }

    /// Check if the card asks for the command to be resent (6C XX)
    ///
    /// SW2 carries the length the card expected; the framer resends the
    /// command unchanged once.
    pub const fn is_aborted(&self) -> bool {
        self.sw1 == 0x6C
    }

    /// Check if this status word indicates more data is available (61 XX)
    pub const fn is_more_data_available(&self) -> bool {
        self.sw1 == 0x61
    }

    /// Check if this status word is a verification warning (63 XX)
    pub const fn is_warning(&self) -> bool {
        self.sw1 == 0x63
    }

    /// Retry counter carried by a 63 XX warning
    pub const fn retries_remaining(&self) -> Option<u8> {
        if self.sw1 == 0x63 {
            Some(self.sw2 & 0x0F)
        } else {
            None
        }
    }

    /// Check if this status word indicates a security condition not satisfied (69 82)
    pub const fn is_security_condition_not_satisfied(&self) -> bool {
        self.sw1 == 0x69 && self.sw2 == 0x82
    }

    /// Check if this status word indicates a blocked authentication method (69 83)
    pub const fn is_auth_method_blocked(&self) -> bool {
        self.sw1 == 0x69 && self.sw2 == 0x83
    }

    /// Check if this status word indicates a file not found (6A 82)
    pub const fn is_file_not_found(&self) -> bool {
        self.sw1 == 0x6A && self.sw2 == 0x82
    }

    /// Check if this status word indicates wrong P1-P2 (6B 00)
    pub const fn is_wrong_parameters(&self) -> bool {
        self.sw1 == 0x6B && self.sw2 == 0x00
    }

    /// Get the appropriate tracing level for this status word
    pub const fn tracing_level(&self) -> Level {
        if self.is_success() || self.is_more_data_available() {
            Level::DEBUG
        } else if self.sw1 == 0x62 || self.sw1 == 0x63 {
            // Warnings
            Level::INFO
        } else {
            // Errors
            Level::WARN
        }
    }

    /// Get a description of this status word
    pub const fn description(&self) -> &'static str {
        match (self.sw1, self.sw2) {
            (0x90, 0x00) => "Success",
            (0x61, _) => "More data available",
            (0x62, 0x00) => "No information given",
            (0x62, 0x82) => "End of file/record reached before reading Le bytes",
            (0x63, 0x00) => "Verification failed",
            (0x63, n) if (n & 0xF0) == 0xC0 => "Verification failed, counter value",
            (0x64, 0x00) => "Input timed out",
            (0x64, 0x01) => "Input cancelled",
            (0x64, 0x02) => "New PIN mismatch",
            (0x65, 0x81) => "Memory failure",
            (0x67, 0x00) => "Wrong length",
            (0x68, 0x82) => "Secure messaging not supported",
            (0x69, 0x81) => "Command incompatible with file structure",
            (0x69, 0x82) => "Security status not satisfied",
            (0x69, 0x83) => "Authentication method blocked",
            (0x69, 0x84) => "Referenced data invalidated",
            (0x69, 0x85) => "Conditions of use not satisfied",
            (0x69, 0x86) => "Command not allowed",
            (0x6A, 0x80) => "Incorrect parameters in the data field",
            (0x6A, 0x81) => "Function not supported",
            (0x6A, 0x82) => "File not found",
            (0x6A, 0x83) => "Record not found",
            (0x6A, 0x86) => "Incorrect parameters P1-P2",
            (0x6A, 0x88) => "Referenced data not found",
            (0x6B, 0x00) => "Wrong parameters P1-P2",
            (0x6C, _) => "Wrong Le field",
            (0x6D, 0x00) => "Instruction code not supported or invalid",
            (0x6E, 0x00) => "Class not supported",
            (0x6F, 0x00) => "No precise diagnosis",
            _ => "Unknown status word",
        }
    }
}

impl From<(u8, u8)> for StatusWord {
    fn from(tuple: (u8, u8)) -> Self {
        Self::new(tuple.0, tuple.1)
    }
}

impl From<u16> for StatusWord {
    fn from(status: u16) -> Self {
        Self::from_u16(status)
    }
}

impl From<StatusWord> for u16 {
    fn from(status: StatusWord) -> Self {
        status.to_u16()
    }
}

impl From<StatusWord> for StatusClass {
    fn from(status: StatusWord) -> Self {
        status.classify()
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X}", self.sw1, self.sw2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_word_from_to_u16() {
        let sw = StatusWord::from_u16(0x9000);
        assert_eq!(sw.sw1, 0x90);
        assert_eq!(sw.sw2, 0x00);
        assert_eq!(sw.to_u16(), 0x9000);
    }

    #[test]
    fn test_classify() {
        assert_eq!(StatusWord::from_u16(0x9000).classify(), StatusClass::Success);
        assert_eq!(
            StatusWord::from_u16(0x63C5).classify(),
            StatusClass::Warning {
                retries_remaining: 5
            }
        );
        assert_eq!(
            StatusWord::from_u16(0x6983).classify(),
            StatusClass::AuthMethodBlocked
        );
        assert_eq!(
            StatusWord::from_u16(0x6982).classify(),
            StatusClass::SecurityNotSatisfied
        );
        assert_eq!(
            StatusWord::from_u16(0x6B00).classify(),
            StatusClass::WrongParameters
        );
        assert_eq!(
            StatusWord::from_u16(0x6A82).classify(),
            StatusClass::FileNotFound
        );
        assert_eq!(StatusWord::from_u16(0x6400).classify(), StatusClass::Timeout);
        assert_eq!(
            StatusWord::from_u16(0x6401).classify(),
            StatusClass::UserAborted
        );

        let other = StatusWord::from_u16(0x6D00);
        assert_eq!(other.classify(), StatusClass::Other(other));
    }

    #[test]
    fn test_status_word_is_methods() {
        assert!(StatusWord::new(0x90, 0x00).is_success());
        assert!(StatusWord::new(0x6C, 0x10).is_aborted());
        assert!(StatusWord::new(0x61, 0x10).is_more_data_available());
        assert!(StatusWord::new(0x63, 0xC2).is_warning());
        assert!(StatusWord::new(0x69, 0x82).is_security_condition_not_satisfied());
        assert!(StatusWord::new(0x69, 0x83).is_auth_method_blocked());
        assert!(StatusWord::new(0x6A, 0x82).is_file_not_found());
        assert!(StatusWord::new(0x6B, 0x00).is_wrong_parameters());
    }

    #[test]
    fn test_retries_remaining() {
        assert_eq!(StatusWord::new(0x63, 0xC2).retries_remaining(), Some(2));
        assert_eq!(StatusWord::new(0x63, 0x00).retries_remaining(), Some(0));
        assert_eq!(StatusWord::new(0x90, 0x00).retries_remaining(), None);
    }

    #[test]
    fn test_status_word_description() {
        assert_eq!(StatusWord::new(0x90, 0x00).description(), "Success");
        assert_eq!(StatusWord::new(0x6A, 0x82).description(), "File not found");
        assert_eq!(
            StatusWord::new(0x69, 0x83).description(),
            "Authentication method blocked"
        );
        assert_eq!(StatusWord::new(0x64, 0x01).description(), "Input cancelled");
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusWord::from_u16(0x6982).to_string(), "69 82");
    }
}
