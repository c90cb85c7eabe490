//! Signature payload assembly

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::digest::{PLAIN_TEXT, digest_prefix, plain_text_prefix};

/// Algorithm reference sent in MANAGE SECURITY ENVIRONMENT
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum AlgorithmSelector {
    /// PKCS#1 v1.5, DigestInfo built on the host
    #[display("RSA")]
    Rsa = 0x01,
    /// RSASSA-PSS over a SHA-1 digest
    #[display("RSA-PSS-SHA1")]
    Sha1Pss = 0x10,
    /// RSASSA-PSS over a SHA-256 digest
    #[display("RSA-PSS-SHA256")]
    Sha256Pss = 0x20,
}

impl AlgorithmSelector {
    /// Selector for a digest algorithm name
    ///
    /// Only SHA-1 and SHA-256 have PSS variants on the card; every other
    /// name is signed with plain RSA.
    pub fn for_digest(name: &str) -> Self {
        match name {
            "SHA-1-PSS" | "SHA1-PSS" => Self::Sha1Pss,
            "SHA-256-PSS" | "SHA256-PSS" => Self::Sha256Pss,
            _ => Self::Rsa,
        }
    }

    /// Byte sent to the card
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether the card applies PSS padding
    pub const fn is_pss(self) -> bool {
        !matches!(self, Self::Rsa)
    }
}

/// Bytes handed to PERFORM SECURITY OPERATION
///
/// Plain RSA gets the DigestInfo prefix of `digest_name` (or the patched plain
/// text header) in front of the digest; PSS selectors send the digest alone.
/// A name with no known prefix is signed as a raw, caller-encoded digest.
pub fn build_payload(selector: AlgorithmSelector, digest_name: &str, digest: &[u8]) -> Bytes {
    if selector.is_pss() {
        return Bytes::copy_from_slice(digest);
    }

    let mut payload = BytesMut::new();
    if digest_name == PLAIN_TEXT {
        payload.put_slice(&plain_text_prefix(digest.len()));
    } else if let Some(prefix) = digest_prefix(digest_name) {
        payload.put_slice(prefix);
    } else {
        debug!(digest_name, "No DigestInfo prefix, signing digest as given");
    }
    payload.put_slice(digest);
    payload.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_selector_for_digest() {
        assert_eq!(AlgorithmSelector::for_digest("SHA-256"), AlgorithmSelector::Rsa);
        assert_eq!(AlgorithmSelector::for_digest("SHA-1-PSS"), AlgorithmSelector::Sha1Pss);
        assert_eq!(AlgorithmSelector::for_digest("SHA1-PSS"), AlgorithmSelector::Sha1Pss);
        assert_eq!(AlgorithmSelector::for_digest("SHA-256-PSS"), AlgorithmSelector::Sha256Pss);
        assert_eq!(AlgorithmSelector::for_digest("SHA256-PSS"), AlgorithmSelector::Sha256Pss);
        assert_eq!(AlgorithmSelector::for_digest("SHA-512-PSS"), AlgorithmSelector::Rsa);
        assert_eq!(AlgorithmSelector::Sha256Pss.as_u8(), 0x20);
    }

    #[test]
    fn test_rsa_payload_has_digest_info() {
        let digest = [0xAB; 32];
        let payload = build_payload(AlgorithmSelector::Rsa, "SHA-256", &digest);
        assert_eq!(payload.len(), 17 + 32);
        assert_eq!(&payload[..17], hex!("302F300B06096086480165030402010420"));
        assert_eq!(&payload[17..], &digest);
    }

    #[test]
    fn test_pss_payload_is_bare_digest() {
        let digest = [0x01; 20];
        let payload = build_payload(AlgorithmSelector::Sha1Pss, "SHA-1-PSS", &digest);
        assert_eq!(payload.as_ref(), &digest);
    }

    #[test]
    fn test_plain_text_payload() {
        let message = b"hello";
        let payload = build_payload(AlgorithmSelector::Rsa, PLAIN_TEXT, message);
        assert_eq!(
            payload.as_ref(),
            hex!("3012 3009 0607 60380102010301 0405 68656C6C6F")
        );
    }

    #[test]
    fn test_unknown_digest_sent_raw() {
        let digest = [0xAA; 20];
        let payload = build_payload(AlgorithmSelector::Rsa, "NONE", &digest);
        assert_eq!(payload.as_ref(), &digest);

        let encoded = hex!("3021300906052B0E03021A05000414 0102030405060708090A0B0C0D0E0F1011121314");
        let payload = build_payload(AlgorithmSelector::Rsa, "MD5", &encoded);
        assert_eq!(payload.as_ref(), &encoded);
    }
}
