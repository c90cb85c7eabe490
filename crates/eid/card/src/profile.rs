//! Card profiles
//!
//! A profile tells a session which cards it accepts. The ATR check runs once
//! while the session is being built; a card that fails it never receives a
//! command.

use tracing::{debug, warn};

use crate::constants::{BEID_ATR_MASK, BEID_ATR_PATTERN};

/// Expected card identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardProfile {
    /// Human readable name, used in errors and logs
    pub name: &'static str,
    /// Expected ATR after masking; `None` accepts any card
    pub atr_pattern: Option<&'static [u8]>,
    /// Mask ANDed into the ATR before comparison
    pub atr_mask: Option<&'static [u8]>,
}

impl CardProfile {
    /// Belgian electronic identity card
    pub const fn beid() -> Self {
        Self {
            name: "BeID",
            atr_pattern: Some(&BEID_ATR_PATTERN),
            atr_mask: Some(&BEID_ATR_MASK),
        }
    }

    /// Accept any card
    pub const fn any() -> Self {
        Self {
            name: "any",
            atr_pattern: None,
            atr_mask: None,
        }
    }

    /// Check an ATR against this profile
    pub fn matches_atr(&self, atr: &[u8]) -> bool {
        let Some(pattern) = self.atr_pattern else {
            return true;
        };

        if atr.len() != pattern.len() {
            warn!(
                profile = self.name,
                expected = pattern.len(),
                actual = atr.len(),
                "ATR length mismatch"
            );
            return false;
        }

        let matches = match self.atr_mask {
            Some(mask) => atr
                .iter()
                .zip(pattern)
                .enumerate()
                .all(|(i, (a, p))| (a & mask.get(i).copied().unwrap_or(0xFF)) == *p),
            None => atr == pattern,
        };

        debug!(profile = self.name, matches, "Checked card ATR");
        matches
    }
}

impl Default for CardProfile {
    fn default() -> Self {
        Self::beid()
    }
}
