//! PIN encodings sent to card and reader

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::constants::{CLA_00, MAX_PIN_LENGTH, MIN_PIN_LENGTH, ins, params};
use crate::{Error, Result};

/// Length of an encoded PIN block
pub const PIN_BLOCK_LEN: usize = 8;

/// Format 2 PIN block: `0x20 | length`, BCD digits, `F` padding
///
/// Wiped when dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PinBlock([u8; PIN_BLOCK_LEN]);

impl PinBlock {
    /// Encode up to 12 ASCII digits
    ///
    /// The card itself refuses PINs shorter than four digits; that bound is
    /// checked by [`validate_pin`], not here.
    pub fn encode(pin: &str) -> Result<Self> {
        let digits = pin.as_bytes();
        if digits.is_empty() || digits.len() > MAX_PIN_LENGTH {
            return Err(Error::InvalidPin("PIN must be 1 to 12 digits"));
        }
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(Error::InvalidPin("PIN must contain only digits"));
        }

        let mut block = [0xFF; PIN_BLOCK_LEN];
        block[0] = 0x20 | digits.len() as u8;
        for (i, pair) in digits.chunks(2).enumerate() {
            let high = pair[0] - b'0';
            let low = pair.get(1).map_or(0x0F, |d| d - b'0');
            block[i + 1] = (high << 4) | low;
        }
        Ok(Self(block))
    }

    /// Encoded bytes
    pub const fn as_bytes(&self) -> &[u8; PIN_BLOCK_LEN] {
        &self.0
    }

    /// Serialized VERIFY command carrying this block
    ///
    /// The buffer is wiped when dropped, like the block itself.
    pub fn verify_command(&self) -> Zeroizing<Vec<u8>> {
        let mut apdu = Zeroizing::new(Vec::with_capacity(5 + PIN_BLOCK_LEN));
        apdu.extend_from_slice(&[
            CLA_00,
            ins::VERIFY,
            0x00,
            params::VERIFY_PIN_REFERENCE,
            PIN_BLOCK_LEN as u8,
        ]);
        apdu.extend_from_slice(&self.0);
        apdu
    }
}

/// Check a PIN supplied by a PIN source against the card's length rules
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.len() < MIN_PIN_LENGTH || pin.len() > MAX_PIN_LENGTH {
        return Err(Error::InvalidPin("PIN must be 4 to 12 digits"));
    }
    if !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidPin("PIN must contain only digits"));
    }
    Ok(())
}

impl std::fmt::Debug for PinBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PinBlock(..)")
    }
}

/// Length of the PIN verification data structure
pub const VERIFY_PARAMETERS_LEN: usize = 32;

/// PIN verification data structure handed to a pinpad reader
///
/// Fixed apart from the prompt language. The embedded VERIFY template carries
/// `0x20` in place of the length nibble and `FF` placeholders the reader fills
/// with the digits typed on its keypad.
pub fn verification_data_structure(language_id: u8) -> [u8; VERIFY_PARAMETERS_LEN] {
    [
        30,   // bTimerOut
        30,   // bTimerOut2
        0x89, // bmFormatString: bytes, offset 1, left justified, BCD
        0x47, // bmPINBlockString: 4 bit length, 7 byte block
        0x04, // bmPINLengthFormat
        MAX_PIN_LENGTH as u8,
        MIN_PIN_LENGTH as u8,
        0x02, // bEntryValidationCondition: OK key
        0x01, // bNumberMessage
        language_id,
        0x04, // sub-language
        0x00, // bMsgIndex
        0x00,
        0x00,
        0x00, // bTeoPrologue
        13,   // ulDataLength
        0x00,
        0x00,
        0x00,
        CLA_00,
        ins::VERIFY,
        0x00,
        params::VERIFY_PIN_REFERENCE,
        PIN_BLOCK_LEN as u8,
        0x20,
        0xFF,
        0xFF,
        0xFF,
        0xFF,
        0xFF,
        0xFF,
        0xFF,
    ]
}
