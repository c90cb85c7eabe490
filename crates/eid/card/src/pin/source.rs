//! Where software PINs come from

use zeroize::Zeroizing;

use crate::Result;

/// Supplies a PIN when the reader has no pinpad
///
/// `retries_remaining` is `None` on the first attempt and the card's counter
/// after a wrong PIN. Returning an empty PIN cancels the verification.
pub trait PinSource: Send {
    /// Ask for a PIN
    fn get_pin(&mut self, retries_remaining: Option<u8>) -> Result<Zeroizing<String>>;
}

impl<F> PinSource for F
where
    F: FnMut(Option<u8>) -> Result<Zeroizing<String>> + Send,
{
    fn get_pin(&mut self, retries_remaining: Option<u8>) -> Result<Zeroizing<String>> {
        self(retries_remaining)
    }
}

/// Always answers with the same PIN
///
/// For scripted use. The card blocks the PIN after three wrong attempts, so
/// callers should stop once a wrong PIN is reported.
pub struct FixedPin(Zeroizing<String>);

impl FixedPin {
    /// Wrap a PIN
    pub fn new(pin: impl Into<String>) -> Self {
        Self(Zeroizing::new(pin.into()))
    }
}

impl PinSource for FixedPin {
    fn get_pin(&mut self, _retries_remaining: Option<u8>) -> Result<Zeroizing<String>> {
        Ok(self.0.clone())
    }
}

impl std::fmt::Debug for FixedPin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FixedPin(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_pin() {
        let mut source = FixedPin::new("1234");
        assert_eq!(source.get_pin(None).unwrap().as_str(), "1234");
        assert_eq!(source.get_pin(Some(2)).unwrap().as_str(), "1234");
        assert_eq!(format!("{source:?}"), "FixedPin(..)");
    }

    #[test]
    fn test_closure_source_sees_retries() {
        let mut seen = Vec::new();
        let mut source = |retries: Option<u8>| {
            seen.push(retries);
            Ok::<_, crate::Error>(Zeroizing::new(String::new()))
        };
        assert!(source.get_pin(None).unwrap().is_empty());
        assert!(source.get_pin(Some(1)).unwrap().is_empty());
        assert_eq!(seen, vec![None, Some(1)]);
    }
}
