//! Session timing and pinpad configuration

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Language ids understood by pinpad readers (primary language part of a LANGID)
pub mod language {
    /// German
    pub const GERMAN: u8 = 0x07;
    /// English
    pub const ENGLISH: u8 = 0x09;
    /// French
    pub const FRENCH: u8 = 0x0C;
    /// Dutch
    pub const DUTCH: u8 = 0x13;
}

/// Configuration for one card session
///
/// All waits are protocol timing requirements of the card or reader. Tests
/// set them to zero.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SessionConfig {
    /// Wait between SELECT FILE and the first READ BINARY
    #[serde(rename = "settle-delay-ms", deserialize_with = "millis")]
    pub settle_delay: Duration,

    /// Wait before resending a command answered with 6C XX
    #[serde(rename = "resend-delay-ms", deserialize_with = "millis")]
    pub resend_delay: Duration,

    /// Wait between two key-pressed polls while no key is pressed
    #[serde(rename = "key-poll-interval-ms", deserialize_with = "millis")]
    pub key_poll_interval: Duration,

    /// Longest time a pinpad entry may take before it is abandoned
    #[serde(rename = "pin-entry-timeout-ms", deserialize_with = "millis")]
    pub pin_entry_timeout: Duration,

    /// How many times a timed out direct pinpad verification is resent
    pub direct_pinpad_attempts: u8,

    /// Language of the pinpad prompt
    pub language_id: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(200),
            resend_delay: Duration::from_millis(10),
            key_poll_interval: Duration::from_millis(200),
            pin_entry_timeout: Duration::from_secs(60),
            direct_pinpad_attempts: 3,
            language_id: language_from_env(),
        }
    }
}

impl SessionConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration without any protocol waits, for scripted transports
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            resend_delay: Duration::ZERO,
            key_poll_interval: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Set the file settle delay
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the resend delay
    pub const fn with_resend_delay(mut self, delay: Duration) -> Self {
        self.resend_delay = delay;
        self
    }

    /// Set the key poll interval
    pub const fn with_key_poll_interval(mut self, interval: Duration) -> Self {
        self.key_poll_interval = interval;
        self
    }

    /// Set the pinpad entry budget
    pub const fn with_pin_entry_timeout(mut self, timeout: Duration) -> Self {
        self.pin_entry_timeout = timeout;
        self
    }

    /// Set the number of direct pinpad attempts on timeout
    pub const fn with_direct_pinpad_attempts(mut self, attempts: u8) -> Self {
        self.direct_pinpad_attempts = attempts;
        self
    }

    /// Set the pinpad prompt language
    pub const fn with_language_id(mut self, language_id: u8) -> Self {
        self.language_id = language_id;
        self
    }
}

/// Pinpad language derived from the `LANG` environment variable
pub fn language_from_env() -> u8 {
    std::env::var("LANG")
        .map(|lang| language_from_locale(&lang))
        .unwrap_or(language::ENGLISH)
}

/// Pinpad language for a POSIX locale string such as `nl_BE.UTF-8`
pub fn language_from_locale(locale: &str) -> u8 {
    match locale.get(..2) {
        Some("nl") => language::DUTCH,
        Some("fr") => language::FRENCH,
        Some("de") => language::GERMAN,
        _ => language::ENGLISH,
    }
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.settle_delay, Duration::from_millis(200));
        assert_eq!(config.resend_delay, Duration::from_millis(10));
        assert_eq!(config.key_poll_interval, Duration::from_millis(200));
        assert_eq!(config.direct_pinpad_attempts, 3);
    }

    #[test]
    fn test_immediate_has_no_waits() {
        let config = SessionConfig::immediate();
        assert!(config.settle_delay.is_zero());
        assert!(config.resend_delay.is_zero());
        assert!(config.key_poll_interval.is_zero());
        assert!(!config.pin_entry_timeout.is_zero());
    }

    #[test]
    fn test_language_from_locale() {
        assert_eq!(language_from_locale("nl_BE.UTF-8"), language::DUTCH);
        assert_eq!(language_from_locale("fr_BE"), language::FRENCH);
        assert_eq!(language_from_locale("de_DE.UTF-8"), language::GERMAN);
        assert_eq!(language_from_locale("C"), language::ENGLISH);
        assert_eq!(language_from_locale(""), language::ENGLISH);
    }
}
