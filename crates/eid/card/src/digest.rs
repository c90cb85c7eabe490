//! DigestInfo prefixes for PKCS#1 v1.5 signatures
//!
//! The card pads whatever it is given, so for plain RSA the ASN.1 DigestInfo
//! header naming the hash has to be prepended here.

/// Pseudo algorithm for signing short plain text instead of a digest
pub const PLAIN_TEXT: &str = "2.16.56.1.2.1.3.1";

const SHA1: &[u8] = &[
    0x30, 0x1F, 0x30, 0x07, 0x06, 0x05, 0x2B, 0x0E, 0x03, 0x02, 0x1A, 0x04, 0x14,
];
const SHA224: &[u8] = &[
    0x30, 0x2B, 0x30, 0x0B, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x04, 0x04,
    0x1C,
];
const SHA256: &[u8] = &[
    0x30, 0x2F, 0x30, 0x0B, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01, 0x04,
    0x20,
];
const SHA384: &[u8] = &[
    0x30, 0x3F, 0x30, 0x0B, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x02, 0x04,
    0x30,
];
const SHA512: &[u8] = &[
    0x30, 0x4F, 0x30, 0x0B, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x03, 0x04,
    0x40,
];
const RIPEMD128: &[u8] = &[
    0x30, 0x1B, 0x30, 0x07, 0x06, 0x05, 0x2B, 0x24, 0x03, 0x02, 0x02, 0x04, 0x10,
];
const RIPEMD160: &[u8] = &[
    0x30, 0x1F, 0x30, 0x07, 0x06, 0x05, 0x2B, 0x24, 0x03, 0x02, 0x01, 0x04, 0x14,
];
const RIPEMD256: &[u8] = &[
    0x30, 0x2B, 0x30, 0x07, 0x06, 0x05, 0x2B, 0x24, 0x03, 0x02, 0x03, 0x04, 0x20,
];

/// Plain text template; offsets 1 and 14 are patched per message
const PLAIN_TEXT_TEMPLATE: [u8; 15] = [
    0x30, 0xFF, 0x30, 0x09, 0x06, 0x07, 0x60, 0x38, 0x01, 0x02, 0x01, 0x03, 0x01, 0x04, 0xFF,
];

/// Algorithm names with a DigestInfo prefix, dashed and undashed
pub const DIGEST_NAMES: [&str; 16] = [
    "SHA1",
    "SHA-1",
    "SHA224",
    "SHA-224",
    "SHA256",
    "SHA-256",
    "SHA384",
    "SHA-384",
    "SHA512",
    "SHA-512",
    "RIPEMD128",
    "RIPEMD-128",
    "RIPEMD160",
    "RIPEMD-160",
    "RIPEMD256",
    "RIPEMD-256",
];

/// DigestInfo prefix for an algorithm name
///
/// Names are case sensitive. The plain text pseudo algorithm has no fixed
/// prefix, see [`plain_text_prefix`].
pub fn digest_prefix(name: &str) -> Option<&'static [u8]> {
    Some(match name {
        "SHA1" | "SHA-1" => SHA1,
        "SHA224" | "SHA-224" => SHA224,
        "SHA256" | "SHA-256" => SHA256,
        "SHA384" | "SHA-384" => SHA384,
        "SHA512" | "SHA-512" => SHA512,
        "RIPEMD128" | "RIPEMD-128" => RIPEMD128,
        "RIPEMD160" | "RIPEMD-160" => RIPEMD160,
        "RIPEMD256" | "RIPEMD-256" => RIPEMD256,
        _ => return None,
    })
}

/// Plain text header for a message of `len` bytes
///
/// Both lengths wrap at 256 like the single bytes they are written into.
pub const fn plain_text_prefix(len: usize) -> [u8; 15] {
    let mut prefix = PLAIN_TEXT_TEMPLATE;
    prefix[1] = (len + 13) as u8;
    prefix[14] = len as u8;
    prefix
}
