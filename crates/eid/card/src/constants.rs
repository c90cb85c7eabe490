//! ISO 7816 and BeID constants

/// Class byte for every command this crate sends
pub const CLA_00: u8 = 0x00;

/// Instruction bytes
pub mod ins {
    /// VERIFY
    pub const VERIFY: u8 = 0x20;
    /// MANAGE SECURITY ENVIRONMENT
    pub const MANAGE_SECURITY_ENVIRONMENT: u8 = 0x22;
    /// PERFORM SECURITY OPERATION
    pub const PERFORM_SECURITY_OPERATION: u8 = 0x2A;
    /// SELECT FILE
    pub const SELECT_FILE: u8 = 0xA4;
    /// READ BINARY
    pub const READ_BINARY: u8 = 0xB0;
}

/// Parameter bytes
pub mod params {
    /// SELECT by path from the master file
    pub const SELECT_BY_PATH: u8 = 0x08;
    /// SELECT without response data
    pub const SELECT_NO_RESPONSE: u8 = 0x0C;
    /// VERIFY P2: PIN reference
    pub const VERIFY_PIN_REFERENCE: u8 = 0x01;
    /// MSE P1: set for computation
    pub const MSE_SET_COMPUTATION: u8 = 0x41;
    /// MSE P2: digital signature control reference template
    pub const MSE_CRT_DIGITAL_SIGNATURE: u8 = 0xB6;
    /// PSO P1: return digital signature
    pub const PSO_DIGITAL_SIGNATURE: u8 = 0x9E;
    /// PSO P2: input is data to be signed
    pub const PSO_INPUT_DATA: u8 = 0x9A;
}

/// Block size requested by each READ BINARY
pub const READ_BLOCK_SIZE: u8 = 0xFF;

/// Shortest PIN accepted by the card
pub const MIN_PIN_LENGTH: usize = 4;

/// Longest PIN accepted by the card
pub const MAX_PIN_LENGTH: usize = 12;

/// Key references
pub mod keys {
    /// Authentication key
    pub const AUTHENTICATION: u8 = 0x82;
    /// Non-repudiation (qualified signature) key
    pub const NON_REPUDIATION: u8 = 0x83;
}

/// BeID file paths, from the master file
pub mod files {
    /// Identity record
    pub const IDENTITY: [u8; 6] = [0x3F, 0x00, 0xDF, 0x01, 0x40, 0x31];
    /// Signature over the identity record
    pub const IDENTITY_SIGNATURE: [u8; 6] = [0x3F, 0x00, 0xDF, 0x01, 0x40, 0x32];
    /// Address record
    pub const ADDRESS: [u8; 6] = [0x3F, 0x00, 0xDF, 0x01, 0x40, 0x33];
    /// Signature over the address record
    pub const ADDRESS_SIGNATURE: [u8; 6] = [0x3F, 0x00, 0xDF, 0x01, 0x40, 0x34];
    /// Photo (JPEG)
    pub const PHOTO: [u8; 6] = [0x3F, 0x00, 0xDF, 0x01, 0x40, 0x35];

    /// Authentication certificate
    pub const AUTHENTICATION_CERT: [u8; 6] = [0x3F, 0x00, 0xDF, 0x00, 0x50, 0x38];
    /// Non-repudiation certificate
    pub const SIGNING_CERT: [u8; 6] = [0x3F, 0x00, 0xDF, 0x00, 0x50, 0x39];
    /// Citizen CA certificate
    pub const CA_CERT: [u8; 6] = [0x3F, 0x00, 0xDF, 0x00, 0x50, 0x3A];
    /// Root CA certificate
    pub const ROOT_CERT: [u8; 6] = [0x3F, 0x00, 0xDF, 0x00, 0x50, 0x3B];
    /// National registry certificate
    pub const RRN_CERT: [u8; 6] = [0x3F, 0x00, 0xDF, 0x00, 0x50, 0x3C];
}

/// BeID answer-to-reset, already masked
pub const BEID_ATR_PATTERN: [u8; 13] = [
    0x3B, 0x98, 0x00, 0x40, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, 0xAD, 0x13, 0x10,
];

/// Mask applied to the card's ATR before comparing it to [`BEID_ATR_PATTERN`]
pub const BEID_ATR_MASK: [u8; 13] = [
    0xFF, 0xFF, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xF0,
];
