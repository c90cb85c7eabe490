//! Card session
//!
//! [`EidCard`] owns the channel to one inserted card together with everything
//! derived from it: the ATR, the reader's feature map and the key used for
//! signing. Every method takes `&mut self`, so each multi-command sequence
//! runs uninterrupted on the channel. Share a session between threads behind
//! a mutex.

use bytes::Bytes;
use eid_apdu_core::{CardExecutor, CardTransport, Executor, StatusClass};
use tracing::{debug, info, instrument, warn};

use crate::certificates::CertificateKind;
use crate::commands::{compute_digital_signature, manage_security_environment};
use crate::config::SessionConfig;
use crate::constants::{files, keys};
use crate::features::{FeatureMap, FeatureTag, query_features};
use crate::identity::{Address, Identity, Photo};
use crate::pin::{CancelToken, PinMethod, PinOutcome, PinSource, PinVerifier, select_method};
use crate::profile::CardProfile;
use crate::sign::{AlgorithmSelector, build_payload};
use crate::{Error, Result, file};

/// Encryption algorithm of every BeID key
pub const ENCRYPTION_ALGORITHM: &str = "RSA";

/// Session with one BeID card
pub struct EidCard<E: Executor> {
    executor: E,
    profile: CardProfile,
    config: SessionConfig,
    atr: Bytes,
    features: Option<FeatureMap>,
    key_id: u8,
    secure_required: bool,
    pin_source: Option<Box<dyn PinSource>>,
    cancel: CancelToken,
}

impl<T: CardTransport> EidCard<CardExecutor<T>> {
    /// Open a session directly on a transport
    ///
    /// The framer's resend delay is taken from `config`.
    pub fn open(transport: T, profile: CardProfile, config: SessionConfig) -> Result<Self> {
        let executor = CardExecutor::new(transport).with_resend_delay(config.resend_delay);
        Self::connect(executor, profile, config)
    }
}

impl<E: Executor> EidCard<E> {
    /// Start a session, checking the card against `profile`
    ///
    /// Fails with [`Error::CardIdentityMismatch`] before any command is sent
    /// when the ATR does not match.
    pub fn connect(executor: E, profile: CardProfile, config: SessionConfig) -> Result<Self> {
        let atr = executor.atr()?;
        if !profile.matches_atr(&atr) {
            return Err(Error::CardIdentityMismatch {
                profile: profile.name,
                atr: hex::encode_upper(&atr),
            });
        }
        info!(profile = profile.name, atr = %hex::encode_upper(&atr), "Card connected");

        Ok(Self {
            executor,
            profile,
            config,
            atr,
            features: None,
            key_id: keys::NON_REPUDIATION,
            secure_required: false,
            pin_source: None,
            cancel: CancelToken::new(),
        })
    }

    /// Sign with another key
    pub const fn with_key_id(mut self, key_id: u8) -> Self {
        self.key_id = key_id;
        self
    }

    /// Refuse to sign unless the PIN is entered on the reader
    pub const fn with_secure_required(mut self, secure_required: bool) -> Self {
        self.secure_required = secure_required;
        self
    }

    /// Supply PINs from `source` when the reader has no pinpad
    pub fn with_pin_source(mut self, source: impl PinSource + 'static) -> Self {
        self.pin_source = Some(Box::new(source));
        self
    }

    /// Replace or remove the PIN source
    pub fn set_pin_source(&mut self, source: Option<Box<dyn PinSource>>) {
        self.pin_source = source;
    }

    /// Token that cancels a pinpad entry in progress
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Answer-to-reset of the card
    pub const fn atr(&self) -> &Bytes {
        &self.atr
    }

    /// Profile the card was accepted under
    pub const fn profile(&self) -> &CardProfile {
        &self.profile
    }

    /// Session configuration
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Key used by [`sign`](Self::sign)
    pub const fn key_id(&self) -> u8 {
        self.key_id
    }

    /// Encryption algorithm of the signing key
    pub const fn encryption_algorithm(&self) -> &'static str {
        ENCRYPTION_ALGORITHM
    }

    /// Whether signing requires a pinpad
    pub const fn secure_required(&self) -> bool {
        self.secure_required
    }

    /// Underlying executor
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Underlying executor, mutably
    pub const fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Reader features, queried on first use
    pub fn features(&mut self) -> &FeatureMap {
        let executor = &mut self.executor;
        self.features.get_or_insert_with(|| query_features(executor))
    }

    /// Verify the cardholder PIN
    ///
    /// `retries_hint` is the counter from a previous wrong attempt, if any.
    pub fn verify_pin(&mut self, retries_hint: Option<u8>) -> Result<PinOutcome> {
        let features = self.features().clone();
        let method = select_method(&features, self.pin_source.is_some())?;
        self.verify_with(method, retries_hint)
    }

    fn verify_with(&mut self, method: PinMethod, retries_hint: Option<u8>) -> Result<PinOutcome> {
        let pin_source = self
            .pin_source
            .as_deref_mut()
            .map(|source| source as &mut dyn PinSource);
        PinVerifier::new(&mut self.executor, &self.config, &self.cancel, pin_source)
            .verify_with(method, retries_hint)
    }

    /// Sign a digest with the session key
    ///
    /// `digest_algorithm` names the hash that produced `digest` (for example
    /// `SHA-256`, or `SHA-256-PSS` to have the card apply PSS padding). The
    /// PIN is verified as part of the operation; if the card still asks for
    /// it when signing, it is verified once more and the signature requested
    /// again.
    #[instrument(level = "debug", skip_all, fields(algorithm = digest_algorithm, len = digest.len()))]
    pub fn sign(&mut self, digest: &[u8], digest_algorithm: &str) -> Result<Bytes> {
        let features = self.features().clone();
        if features.contains(FeatureTag::EidPinPadReader) {
            info!("Reader has an eID aware pinpad");
        }

        if self.secure_required && !features.has_secure_pin_entry() {
            warn!("Reader does not allow secure PIN entry");
            return Err(Error::NoSecureReader);
        }
        let method = select_method(&features, self.pin_source.is_some())?;

        let selector = AlgorithmSelector::for_digest(digest_algorithm);
        let payload = build_payload(selector, digest_algorithm, digest);

        debug!(%selector, key_id = self.key_id, "Setting security environment");
        let response = self
            .executor
            .transmit(&manage_security_environment(selector.as_u8(), self.key_id))?;
        if !response.is_success() {
            return Err(Error::SecurityEnvironment(response.status()));
        }

        let mut retries = retries_after(self.verify_with(method, None)?)?;

        let command = compute_digital_signature(payload);
        let mut response = self.executor.transmit(&command)?;

        if response.class() == StatusClass::SecurityNotSatisfied {
            info!("Card requires the PIN again");
            retries = retries_after(self.verify_with(method, retries)?)?;
            response = self.executor.transmit(&command)?;
        }

        match (response.class(), retries) {
            (StatusClass::Success, _) => {
                let signature = response.into_payload();
                info!(len = signature.len(), "Signature produced");
                Ok(signature)
            }
            (StatusClass::SecurityNotSatisfied, Some(retries_remaining)) => {
                Err(Error::WrongPin { retries_remaining })
            }
            _ => Err(Error::SignatureFailed(response.status())),
        }
    }

    /// Read a whole file
    pub fn read_file(&mut self, path: &[u8]) -> Result<Bytes> {
        file::read_file(&mut self.executor, path, self.config.settle_delay)
    }

    /// Cardholder identity
    pub fn identity(&mut self) -> Result<Identity> {
        let data = self.read_file(&files::IDENTITY)?;
        Ok(Identity::from_tlv(&data)?)
    }

    /// Cardholder address
    pub fn address(&mut self) -> Result<Address> {
        let data = self.read_file(&files::ADDRESS)?;
        Ok(Address::from_tlv(&data)?)
    }

    /// Cardholder photo
    pub fn photo(&mut self) -> Result<Photo> {
        self.read_file(&files::PHOTO).map(Photo)
    }

    /// DER encoded certificate
    pub fn read_certificate(&mut self, kind: CertificateKind) -> Result<Bytes> {
        debug!(%kind, "Reading certificate");
        self.read_file(&kind.path())
    }

    /// Signing certificate followed by its CA and root
    pub fn signing_chain(&mut self) -> Result<Vec<Bytes>> {
        CertificateKind::SIGNING_CHAIN
            .into_iter()
            .map(|kind| self.read_certificate(kind))
            .collect()
    }

    /// End the session and reset the card
    pub fn disconnect(mut self) -> Result<()> {
        self.executor.reset()?;
        info!("Card disconnected");
        Ok(())
    }
}

/// Retry hint to carry forward, or the error that ends the operation
fn retries_after(outcome: PinOutcome) -> Result<Option<u8>> {
    match outcome {
        PinOutcome::Verified => Ok(None),
        PinOutcome::WrongPin { retries_remaining } => Ok(Some(retries_remaining)),
        PinOutcome::Blocked => Err(Error::PinBlocked),
        PinOutcome::ProtocolError(status) => Err(Error::PinProtocol(status)),
    }
}

impl<E: Executor> std::fmt::Debug for EidCard<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EidCard")
            .field("executor", &self.executor)
            .field("profile", &self.profile.name)
            .field("atr", &hex::encode_upper(&self.atr))
            .field("features", &self.features)
            .field("key_id", &self.key_id)
            .field("secure_required", &self.secure_required)
            .field("has_pin_source", &self.pin_source.is_some())
            .finish_non_exhaustive()
    }
}
