//! Configuration options for PC/SC transport

use pcsc::{Protocols as PcscProtocols, ShareMode as PcscShareMode};
use serde::Deserialize;

/// Sharing mode for card connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareMode {
    /// Exclusive access to the card
    Exclusive,
    /// Shared access to the card (default)
    Shared,
    /// Direct connection to the reader
    Direct,
}

impl From<ShareMode> for PcscShareMode {
    fn from(mode: ShareMode) -> Self {
        match mode {
            ShareMode::Exclusive => Self::Exclusive,
            ShareMode::Shared => Self::Shared,
            ShareMode::Direct => Self::Direct,
        }
    }
}

/// Strategy for connecting to a card/reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectStrategy {
    /// Connect to a specific reader by name
    Reader(String),

    /// Connect to any reader with a card
    AnyCard,

    /// Connect to reader with a card matching this ATR pattern
    CardWithAtr(Vec<u8>, Option<Vec<u8>>), // (ATR, mask)

    /// Connect to the first available reader
    FirstAvailable,
}

/// Configuration options for PC/SC transport
///
/// Loadable from a `[pcsc]` settings table; protocols are always taken from
/// the default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PcscConfig {
    /// Sharing mode for card connections
    pub share_mode: ShareMode,

    /// Preferred protocols for card communication
    #[serde(skip, default = "any_protocol")]
    pub protocols: PcscProtocols,

    /// Reconnect after a card reset
    ///
    /// The exchange that saw the reset still fails; only later commands use
    /// the new connection.
    pub auto_reconnect: bool,
}

impl Default for PcscConfig {
    fn default() -> Self {
        Self {
            share_mode: ShareMode::Shared,
            protocols: any_protocol(),
            auto_reconnect: false,
        }
    }
}

const fn any_protocol() -> PcscProtocols {
    PcscProtocols::ANY
}

impl PcscConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sharing mode
    pub const fn with_share_mode(mut self, mode: ShareMode) -> Self {
        self.share_mode = mode;
        self
    }

    /// Set the preferred protocols
    pub const fn with_protocols(mut self, protocols: PcscProtocols) -> Self {
        self.protocols = protocols;
        self
    }

    /// Set whether to automatically reconnect
    pub const fn with_auto_reconnect(mut self, auto_reconnect: bool) -> Self {
        self.auto_reconnect = auto_reconnect;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_does_not_reconnect() {
        let config = PcscConfig::default();
        assert_eq!(config.share_mode, ShareMode::Shared);
        assert_eq!(config.protocols, PcscProtocols::ANY);
        assert!(!config.auto_reconnect);
    }

    #[test]
    fn test_builders() {
        let config = PcscConfig::new()
            .with_share_mode(ShareMode::Exclusive)
            .with_protocols(PcscProtocols::T1)
            .with_auto_reconnect(true);
        assert_eq!(config.share_mode, ShareMode::Exclusive);
        assert_eq!(config.protocols, PcscProtocols::T1);
        assert!(config.auto_reconnect);
    }
}
