//! Command units sent to the card
//!
//! VERIFY with a software PIN is not built here: its serialized form is
//! assembled directly in a scrubbed buffer by the PIN block code.

use bytes::Bytes;
use eid_apdu_core::Command;

use crate::constants::{CLA_00, READ_BLOCK_SIZE, ins, params};

/// SELECT FILE by absolute path
pub fn select_file(path: &[u8]) -> Command {
    Command::new_with_data(
        CLA_00,
        ins::SELECT_FILE,
        params::SELECT_BY_PATH,
        params::SELECT_NO_RESPONSE,
        Bytes::copy_from_slice(path),
    )
}

/// READ BINARY of one block at `offset`
pub const fn read_binary(offset: u16) -> Command {
    let [p1, p2] = offset.to_be_bytes();
    Command::new_with_le(CLA_00, ins::READ_BINARY, p1, p2, READ_BLOCK_SIZE)
}

/// MANAGE SECURITY ENVIRONMENT selecting algorithm and key for a signature
pub fn manage_security_environment(algorithm: u8, key_id: u8) -> Command {
    Command::new_with_data(
        CLA_00,
        ins::MANAGE_SECURITY_ENVIRONMENT,
        params::MSE_SET_COMPUTATION,
        params::MSE_CRT_DIGITAL_SIGNATURE,
        vec![0x04, 0x80, algorithm, 0x84, key_id],
    )
}

/// PERFORM SECURITY OPERATION: compute digital signature
pub fn compute_digital_signature(payload: Bytes) -> Command {
    Command::new_with_data(
        CLA_00,
        ins::PERFORM_SECURITY_OPERATION,
        params::PSO_DIGITAL_SIGNATURE,
        params::PSO_INPUT_DATA,
        payload,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{files, keys};
    use hex_literal::hex;

    #[test]
    fn test_select_file() {
        let bytes = select_file(&files::IDENTITY).to_bytes().unwrap();
        assert_eq!(bytes.as_ref(), hex!("00A4080C063F00DF014031"));
    }

    #[test]
    fn test_read_binary_offsets() {
        assert_eq!(read_binary(0).to_bytes().unwrap().as_ref(), hex!("00B00000FF"));
        assert_eq!(read_binary(510).to_bytes().unwrap().as_ref(), hex!("00B001FEFF"));
    }

    #[test]
    fn test_manage_security_environment() {
        let bytes = manage_security_environment(0x01, keys::NON_REPUDIATION)
            .to_bytes()
            .unwrap();
        assert_eq!(bytes.as_ref(), hex!("002241B6050480018483"));
    }

    #[test]
    fn test_compute_digital_signature() {
        let bytes = compute_digital_signature(Bytes::from_static(&[0xAA, 0xBB]))
            .to_bytes()
            .unwrap();
        assert_eq!(bytes.as_ref(), hex!("002A9E9A02AABB"));
    }
}
