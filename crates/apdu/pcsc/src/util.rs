//! Utility functions for PC/SC operations

/// Match an ATR against a pattern with an optional mask
///
/// Used to pick a reader; only the first `pattern.len()` bytes are looked at.
/// If a mask is provided, only the bits set in the mask are compared.
pub(crate) fn match_atr(atr: &[u8], pattern: &[u8], mask: Option<&[u8]>) -> bool {
    // If pattern is longer than ATR, it can't match
    if pattern.len() > atr.len() {
        return false;
    }

    match mask {
        // Mask must be at least as long as pattern
        Some(mask) if mask.len() < pattern.len() => false,
        Some(mask) => pattern
            .iter()
            .zip(atr)
            .zip(mask)
            .all(|((p, a), m)| (a & m) == (p & m)),
        None => atr.starts_with(pattern),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERN: [u8; 4] = [0x3B, 0x98, 0x00, 0x40];
    const MASK: [u8; 4] = [0xFF, 0xFF, 0x00, 0xFF];

    #[test]
    fn test_masked_match() {
        assert!(match_atr(&[0x3B, 0x98, 0x13, 0x40, 0x0A], &PATTERN, Some(&MASK)));
        assert!(!match_atr(&[0x3B, 0x99, 0x13, 0x40], &PATTERN, Some(&MASK)));
    }

    #[test]
    fn test_unmasked_prefix_match() {
        assert!(match_atr(&[0x3B, 0x98, 0x00, 0x40, 0x0A], &PATTERN, None));
        assert!(!match_atr(&[0x3B, 0x98, 0x13, 0x40], &PATTERN, None));
    }

    #[test]
    fn test_short_inputs() {
        assert!(!match_atr(&[0x3B], &PATTERN, None));
        assert!(!match_atr(&[0x3B, 0x98, 0x00, 0x40], &PATTERN, Some(&[0xFF])));
    }
}
