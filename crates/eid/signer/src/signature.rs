use std::sync::Arc;

use bytes::Bytes;
use eid_card::{EidCard, Executor};
use parking_lot::Mutex;
use tracing::debug;

use crate::{Error, HashAlgorithm, Result};

/// Signs messages on behalf of a document signing workflow
pub trait ExternalSignature {
    /// Hash `message` and sign the digest
    fn sign(&self, message: &[u8]) -> Result<Bytes>;

    /// Encryption algorithm of the key, such as `RSA`
    fn encryption_algorithm(&self) -> &str;

    /// Name of the hash applied by [`sign`](Self::sign)
    fn hash_algorithm(&self) -> &str;
}

/// [`ExternalSignature`] backed by a card session
///
/// The session sits behind a mutex so one card can serve several signers.
/// Each call holds the lock for the whole select, verify and sign sequence.
#[derive(Debug)]
pub struct EidSignature<E: Executor> {
    card: Arc<Mutex<EidCard<E>>>,
    hash: HashAlgorithm,
    pss: bool,
}

impl<E: Executor> EidSignature<E> {
    /// Sign with `hash` and PKCS#1 v1.5 padding
    pub const fn new(card: Arc<Mutex<EidCard<E>>>, hash: HashAlgorithm) -> Self {
        Self {
            card,
            hash,
            pss: false,
        }
    }

    /// Let the card apply PSS padding instead
    pub fn with_pss(mut self) -> Result<Self> {
        if !self.hash.supports_pss() {
            return Err(Error::PssUnsupported(self.hash));
        }
        self.pss = true;
        Ok(self)
    }

    /// Hash applied to messages
    pub const fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    /// Shared card session
    pub const fn card(&self) -> &Arc<Mutex<EidCard<E>>> {
        &self.card
    }

    fn card_algorithm(&self) -> String {
        if self.pss {
            format!("{}-PSS", self.hash.name())
        } else {
            self.hash.name().to_string()
        }
    }
}

impl<E: Executor> ExternalSignature for EidSignature<E> {
    fn sign(&self, message: &[u8]) -> Result<Bytes> {
        let digest = self.hash.digest(message);
        let algorithm = self.card_algorithm();
        debug!(%algorithm, len = message.len(), "Signing message");
        Ok(self.card.lock().sign(&digest, &algorithm)?)
    }

    fn encryption_algorithm(&self) -> &str {
        eid_card::ENCRYPTION_ALGORITHM
    }

    fn hash_algorithm(&self) -> &str {
        self.hash.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eid_apdu_core::{CardExecutor, MockTransport};
    use eid_card::{CardProfile, FixedPin, SessionConfig};
    use hex_literal::hex;

    fn shared_card(mock: MockTransport) -> Arc<Mutex<EidCard<CardExecutor<MockTransport>>>> {
        let card = EidCard::open(
            mock.with_atr(hex!("3B9813400AA503010101AD1311").to_vec()),
            CardProfile::beid(),
            SessionConfig::immediate(),
        )
        .unwrap()
        .with_pin_source(FixedPin::new("1234"));
        Arc::new(Mutex::new(card))
    }

    fn signing_card() -> MockTransport {
        MockTransport::new()
            .control_failure()
            .reply_status(0x9000)
            .reply_status(0x9000)
            .reply_with(&[0xAB; 256], 0x9000)
    }

    #[test]
    fn test_sign_hashes_message() {
        let card = shared_card(signing_card());
        let signer = EidSignature::new(Arc::clone(&card), HashAlgorithm::Sha256);

        let signature = signer.sign(b"abc").unwrap();
        assert_eq!(signature.as_ref(), &[0xAB; 256]);
        assert_eq!(signer.encryption_algorithm(), "RSA");
        assert_eq!(signer.hash_algorithm(), "SHA-256");

        let card = card.lock();
        let apdus = card.executor().transport().apdus();
        assert_eq!(apdus[0].as_ref(), hex!("002241B6050480018483"));
        assert_eq!(
            &apdus[2][22..],
            hex!("BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD")
        );
    }

    #[test]
    fn test_pss_sends_bare_digest() {
        let card = shared_card(signing_card());
        let signer = EidSignature::new(Arc::clone(&card), HashAlgorithm::Sha1)
            .with_pss()
            .unwrap();
        signer.sign(b"abc").unwrap();

        let card = card.lock();
        let apdus = card.executor().transport().apdus();
        assert_eq!(apdus[0].as_ref(), hex!("002241B6050480108483"));
        assert_eq!(
            apdus[2].as_ref(),
            hex!("002A9E9A14 A9993E364706816ABA3E25717850C26C9CD0D89D")
        );
    }

    #[test]
    fn test_pss_refused_for_sha512() {
        let card = shared_card(MockTransport::new());
        let err = EidSignature::new(card, HashAlgorithm::Sha512)
            .with_pss()
            .unwrap_err();
        assert!(matches!(err, Error::PssUnsupported(HashAlgorithm::Sha512)));
    }

    #[test]
    fn test_card_error_is_forwarded() {
        let card = shared_card(MockTransport::new().control_failure().reply_status(0x6A80));
        let signer = EidSignature::new(card, HashAlgorithm::Sha384);
        let err = signer.sign(b"abc").unwrap_err();
        assert!(matches!(
            err,
            Error::Card(eid_card::Error::SecurityEnvironment(_))
        ));
    }
}
