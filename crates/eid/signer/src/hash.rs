//! Message digests computed before the card signs

use std::str::FromStr;

use digest::Digest;

use crate::Error;

/// Hash algorithm applied to the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::Display)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum HashAlgorithm {
    /// SHA-1
    #[display("SHA-1")]
    Sha1,
    /// SHA-224
    #[display("SHA-224")]
    Sha224,
    /// SHA-256
    #[default]
    #[display("SHA-256")]
    Sha256,
    /// SHA-384
    #[display("SHA-384")]
    Sha384,
    /// SHA-512
    #[display("SHA-512")]
    Sha512,
}

impl HashAlgorithm {
    /// Name understood by the card's DigestInfo table
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Sha224 => "SHA-224",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    /// Digest length in bytes
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Whether the card can apply PSS padding to this digest
    pub const fn supports_pss(self) -> bool {
        matches!(self, Self::Sha1 | Self::Sha256)
    }

    /// Hash `message`
    pub fn digest(self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => hash::<sha1::Sha1>(message),
            Self::Sha224 => hash::<sha2::Sha224>(message),
            Self::Sha256 => hash::<sha2::Sha256>(message),
            Self::Sha384 => hash::<sha2::Sha384>(message),
            Self::Sha512 => hash::<sha2::Sha512>(message),
        }
    }
}

fn hash<D: Digest>(message: &[u8]) -> Vec<u8> {
    D::digest(message).to_vec()
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    /// Accepts `SHA256`, `SHA-256` and `sha256` alike
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "SHA1" => Ok(Self::Sha1),
            "SHA224" => Ok(Self::Sha224),
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            _ => Err(Error::UnknownHashAlgorithm(s.to_string())),
        }
    }
}
