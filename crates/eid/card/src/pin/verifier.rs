use std::thread;
use std::time::Instant;

use eid_apdu_core::{Bytes, ControlCode, Executor, Response, StatusClass};
use tracing::{debug, info, instrument, trace, warn};

use super::block::{PinBlock, validate_pin, verification_data_structure};
use super::{CancelToken, PinMethod, PinOutcome, PinSource, select_method};
use crate::config::SessionConfig;
use crate::features::FeatureMap;
use crate::{Error, Result};

/// Key codes returned by `GET_KEY_PRESSED`
mod key {
    pub(super) const NONE: u8 = 0x00;
    pub(super) const DIGIT: u8 = 0x2B;
    pub(super) const ERASE: u8 = 0x0A;
    pub(super) const CONFIRM: u8 = 0x0D;
    pub(super) const CANCEL: u8 = 0x1B;
    pub(super) const ABORT: u8 = 0x40;
}

/// Runs one PIN verification over a borrowed channel
///
/// Borrows everything it needs from the session for the duration of a single
/// verification, so the channel stays exclusively held.
pub struct PinVerifier<'a, E: Executor + ?Sized> {
    executor: &'a mut E,
    config: &'a SessionConfig,
    cancel: &'a CancelToken,
    pin_source: Option<&'a mut dyn PinSource>,
}

impl<'a, E: Executor + ?Sized> PinVerifier<'a, E> {
    /// Create a verifier
    pub fn new(
        executor: &'a mut E,
        config: &'a SessionConfig,
        cancel: &'a CancelToken,
        pin_source: Option<&'a mut dyn PinSource>,
    ) -> Self {
        Self {
            executor,
            config,
            cancel,
            pin_source,
        }
    }

    /// Verify the PIN with the best method the reader offers
    ///
    /// `retries_hint` is handed to the PIN source so it can warn the user.
    /// Cancellation and pinpad timeouts are errors; every status the card
    /// gives back is an outcome.
    #[instrument(level = "debug", skip_all, fields(retries_hint = ?retries_hint))]
    pub fn verify(&mut self, features: &FeatureMap, retries_hint: Option<u8>) -> Result<PinOutcome> {
        let method = select_method(features, self.pin_source.is_some())?;
        self.verify_with(method, retries_hint)
    }

    /// Verify the PIN with a given method
    pub fn verify_with(&mut self, method: PinMethod, retries_hint: Option<u8>) -> Result<PinOutcome> {
        let response = match method {
            PinMethod::DirectPinpad(code) => {
                info!("Verifying PIN on the pinpad");
                self.direct(code)?
            }
            PinMethod::StartFinishPinpad {
                start,
                finish,
                key_pressed,
            } => {
                info!("Verifying PIN on the pinpad, polling keys");
                self.start_finish(start, finish, key_pressed)?
            }
            PinMethod::SoftwareProvided => {
                info!("Verifying PIN from PIN source");
                self.software(retries_hint)?
            }
        };

        let outcome = PinOutcome::from_status(response.status());
        match outcome {
            PinOutcome::Verified => info!("PIN verified"),
            _ => warn!(status = %response.status(), ?outcome, "PIN not verified"),
        }
        Ok(outcome)
    }

    fn direct(&mut self, code: ControlCode) -> Result<Response> {
        let parameters = verification_data_structure(self.config.language_id);
        let attempts = self.config.direct_pinpad_attempts.max(1);

        for attempt in 1..=attempts {
            let response = self.control(code, &parameters)?;
            match response.class() {
                StatusClass::UserAborted => return Err(Error::PinCancelled),
                StatusClass::Timeout => {
                    warn!(attempt, attempts, "Pinpad entry timed out");
                }
                _ => return Ok(response),
            }
        }

        Err(Error::PinEntryTimeout)
    }

    fn start_finish(
        &mut self,
        start: ControlCode,
        finish: ControlCode,
        key_pressed: ControlCode,
    ) -> Result<Response> {
        let parameters = verification_data_structure(self.config.language_id);
        // The start reply carries nothing useful, the outcome comes from finish.
        self.executor.control(start, &parameters)?;

        let deadline = Instant::now() + self.config.pin_entry_timeout;
        loop {
            if self.cancel.is_cancelled() {
                debug!("PIN entry cancelled by caller");
                return Err(Error::PinCancelled);
            }
            if Instant::now() >= deadline {
                warn!(
                    timeout_ms = self.config.pin_entry_timeout.as_millis() as u64,
                    "Pinpad entry took too long"
                );
                return Err(Error::PinEntryTimeout);
            }

            let reply = self.executor.control(key_pressed, &[])?;
            let code = reply
                .first()
                .copied()
                .ok_or(Error::Protocol("empty key pressed reply"))?;
            match code {
                key::NONE => {
                    if !self.config.key_poll_interval.is_zero() {
                        thread::sleep(self.config.key_poll_interval);
                    }
                }
                key::DIGIT => trace!("Digit entered"),
                key::ERASE => trace!("Digit erased"),
                key::CONFIRM => {
                    debug!("PIN entry confirmed");
                    break;
                }
                key::CANCEL => return Err(Error::PinCancelled),
                key::ABORT => {
                    debug!("PIN entry aborted by the reader");
                    break;
                }
                other => warn!(key = other, "Unknown key code"),
            }
        }

        let response = self.control(finish, &[])?;
        match response.class() {
            StatusClass::UserAborted => Err(Error::PinCancelled),
            StatusClass::Timeout => Err(Error::PinEntryTimeout),
            _ => Ok(response),
        }
    }

    fn software(&mut self, retries_hint: Option<u8>) -> Result<Response> {
        let source = self
            .pin_source
            .as_deref_mut()
            .ok_or(Error::NoPinMethodAvailable)?;

        let pin = source.get_pin(retries_hint)?;
        if pin.is_empty() {
            return Err(Error::PinCancelled);
        }
        validate_pin(&pin)?;

        let block = PinBlock::encode(&pin)?;
        drop(pin);
        let command = block.verify_command();
        drop(block);

        Ok(self.executor.transmit_raw(&command)?)
    }

    fn control(&mut self, code: ControlCode, input: &[u8]) -> Result<Response> {
        let reply: Bytes = self.executor.control(code, input)?;
        Ok(Response::from_bytes(&reply)?)
    }
}

impl<E: Executor + ?Sized> std::fmt::Debug for PinVerifier<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinVerifier")
            .field("executor", &self.executor)
            .field("has_pin_source", &self.pin_source.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::language;
    use crate::features::FeatureTag;
    use crate::pin::FixedPin;
    use eid_apdu_core::{CardExecutor, MockTransport, StatusWord};
    use hex_literal::hex;
    use std::time::Duration;
    use zeroize::Zeroizing;

    const DIRECT: ControlCode = 0x4233_0006;
    const START: ControlCode = 0x4233_0001;
    const FINISH: ControlCode = 0x4233_0002;
    const KEY: ControlCode = 0x4233_0005;

    fn config() -> SessionConfig {
        SessionConfig::immediate().with_language_id(language::ENGLISH)
    }

    fn executor(mock: MockTransport) -> CardExecutor<MockTransport> {
        CardExecutor::new(mock).with_resend_delay(Duration::ZERO)
    }

    fn start_finish() -> FeatureMap {
        FeatureMap::new()
            .with(FeatureTag::VerifyPinStart, START)
            .with(FeatureTag::VerifyPinFinish, FINISH)
            .with(FeatureTag::GetKeyPressed, KEY)
    }

    #[test]
    fn test_direct_pinpad_verified() {
        let mut executor = executor(MockTransport::new().control_reply(hex!("9000").to_vec()));
        let config = config();
        let cancel = CancelToken::new();
        let features = FeatureMap::new().with(FeatureTag::VerifyPinDirect, DIRECT);

        let outcome = PinVerifier::new(&mut executor, &config, &cancel, None)
            .verify(&features, None)
            .unwrap();
        assert_eq!(outcome, PinOutcome::Verified);

        let controls = executor.transport().controls();
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].0, DIRECT);
        assert_eq!(
            controls[0].1.as_ref(),
            verification_data_structure(language::ENGLISH)
        );
    }

    #[test]
    fn test_direct_pinpad_wrong_pin() {
        let mut executor = executor(MockTransport::new().control_reply(hex!("63C2").to_vec()));
        let config = config();
        let cancel = CancelToken::new();

        let outcome = PinVerifier::new(&mut executor, &config, &cancel, None)
            .verify_with(PinMethod::DirectPinpad(DIRECT), None)
            .unwrap();
        assert_eq!(
            outcome,
            PinOutcome::WrongPin {
                retries_remaining: 2
            }
        );
    }

    #[test]
    fn test_direct_pinpad_cancelled() {
        let mut executor = executor(MockTransport::new().control_reply(hex!("6401").to_vec()));
        let config = config();
        let cancel = CancelToken::new();

        let err = PinVerifier::new(&mut executor, &config, &cancel, None)
            .verify_with(PinMethod::DirectPinpad(DIRECT), None)
            .unwrap_err();
        assert!(matches!(err, Error::PinCancelled));
    }

    #[test]
    fn test_direct_pinpad_timeout_is_resent() {
        let mut executor = executor(
            MockTransport::new()
                .control_reply(hex!("6400").to_vec())
                .control_reply(hex!("9000").to_vec()),
        );
        let config = config();
        let cancel = CancelToken::new();

        let outcome = PinVerifier::new(&mut executor, &config, &cancel, None)
            .verify_with(PinMethod::DirectPinpad(DIRECT), None)
            .unwrap();
        assert_eq!(outcome, PinOutcome::Verified);
        assert_eq!(executor.transport().controls().len(), 2);
    }

    #[test]
    fn test_direct_pinpad_timeout_is_bounded() {
        let mut executor = executor(
            MockTransport::new()
                .control_reply(hex!("6400").to_vec())
                .control_reply(hex!("6400").to_vec())
                .control_reply(hex!("9000").to_vec()),
        );
        let config = config().with_direct_pinpad_attempts(2);
        let cancel = CancelToken::new();

        let err = PinVerifier::new(&mut executor, &config, &cancel, None)
            .verify_with(PinMethod::DirectPinpad(DIRECT), None)
            .unwrap_err();
        assert!(matches!(err, Error::PinEntryTimeout));
        assert_eq!(executor.transport().controls().len(), 2);
    }

    #[test]
    fn test_start_finish_polls_until_confirm() {
        let mut executor = executor(
            MockTransport::new()
                .control_reply(Vec::new())
                .control_reply(vec![key::NONE])
                .control_reply(vec![key::DIGIT])
                .control_reply(vec![key::ERASE])
                .control_reply(vec![0x77])
                .control_reply(vec![key::CONFIRM])
                .control_reply(hex!("9000").to_vec()),
        );
        let config = config();
        let cancel = CancelToken::new();

        let outcome = PinVerifier::new(&mut executor, &config, &cancel, None)
            .verify(&start_finish(), None)
            .unwrap();
        assert_eq!(outcome, PinOutcome::Verified);

        let codes: Vec<_> = executor
            .transport()
            .controls()
            .into_iter()
            .map(|(code, _)| code)
            .collect();
        assert_eq!(codes, vec![START, KEY, KEY, KEY, KEY, KEY, FINISH]);
        assert_eq!(executor.transport().pending(), 0);
    }

    #[test]
    fn test_start_finish_abort_key_goes_to_finish() {
        let mut executor = executor(
            MockTransport::new()
                .control_reply(Vec::new())
                .control_reply(vec![key::ABORT])
                .control_reply(hex!("63C1").to_vec()),
        );
        let config = config();
        let cancel = CancelToken::new();

        let outcome = PinVerifier::new(&mut executor, &config, &cancel, None)
            .verify(&start_finish(), None)
            .unwrap();
        assert_eq!(
            outcome,
            PinOutcome::WrongPin {
                retries_remaining: 1
            }
        );
    }

    #[test]
    fn test_start_finish_cancel_key() {
        let mut executor = executor(
            MockTransport::new()
                .control_reply(Vec::new())
                .control_reply(vec![key::DIGIT])
                .control_reply(vec![key::CANCEL]),
        );
        let config = config();
        let cancel = CancelToken::new();

        let err = PinVerifier::new(&mut executor, &config, &cancel, None)
            .verify(&start_finish(), None)
            .unwrap_err();
        assert!(matches!(err, Error::PinCancelled));
        // No finish after a cancel key
        assert_eq!(executor.transport().controls().len(), 3);
    }

    #[test]
    fn test_start_finish_cancel_token() {
        let mut executor = executor(MockTransport::new().control_reply(Vec::new()));
        let config = config();
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = PinVerifier::new(&mut executor, &config, &cancel, None)
            .verify(&start_finish(), None)
            .unwrap_err();
        assert!(matches!(err, Error::PinCancelled));
        assert_eq!(executor.transport().controls().len(), 1);
    }

    #[test]
    fn test_start_finish_entry_budget() {
        let mut executor = executor(MockTransport::new().control_reply(Vec::new()));
        let config = config().with_pin_entry_timeout(Duration::ZERO);
        let cancel = CancelToken::new();

        let err = PinVerifier::new(&mut executor, &config, &cancel, None)
            .verify(&start_finish(), None)
            .unwrap_err();
        assert!(matches!(err, Error::PinEntryTimeout));
    }

    #[test]
    fn test_software_pin_sends_verify() {
        let mut executor = executor(MockTransport::new().reply_status(0x9000));
        let config = config();
        let cancel = CancelToken::new();
        let mut source = FixedPin::new("1234");

        let outcome = PinVerifier::new(&mut executor, &config, &cancel, Some(&mut source))
            .verify(&FeatureMap::new(), None)
            .unwrap();
        assert_eq!(outcome, PinOutcome::Verified);
        assert_eq!(
            executor.transport().apdus()[0].as_ref(),
            hex!("0020000108241234FFFFFFFFFF")
        );
    }

    #[test]
    fn test_software_pin_receives_retries_hint() {
        let mut executor = executor(MockTransport::new().reply_status(0x6983));
        let config = config();
        let cancel = CancelToken::new();
        let mut hints = Vec::new();
        let mut source = |retries: Option<u8>| {
            hints.push(retries);
            Ok::<_, Error>(Zeroizing::new("5678".to_string()))
        };

        let outcome = PinVerifier::new(&mut executor, &config, &cancel, Some(&mut source))
            .verify(&FeatureMap::new(), Some(1))
            .unwrap();
        assert_eq!(outcome, PinOutcome::Blocked);
        assert_eq!(hints, vec![Some(1)]);
    }

    #[test]
    fn test_software_empty_pin_cancels() {
        let mut executor = executor(MockTransport::new());
        let config = config();
        let cancel = CancelToken::new();
        let mut source = FixedPin::new("");

        let err = PinVerifier::new(&mut executor, &config, &cancel, Some(&mut source))
            .verify(&FeatureMap::new(), None)
            .unwrap_err();
        assert!(matches!(err, Error::PinCancelled));
        assert!(executor.transport().sent.is_empty());
    }

    #[test]
    fn test_software_short_pin_never_reaches_card() {
        let mut executor = executor(MockTransport::new());
        let config = config();
        let cancel = CancelToken::new();
        let mut source = FixedPin::new("123");

        let err = PinVerifier::new(&mut executor, &config, &cancel, Some(&mut source))
            .verify(&FeatureMap::new(), None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPin(_)));
        assert!(executor.transport().sent.is_empty());
    }

    #[test]
    fn test_other_status_is_protocol_error() {
        let mut executor = executor(MockTransport::new().reply_status(0x6700));
        let config = config();
        let cancel = CancelToken::new();
        let mut source = FixedPin::new("1234");

        let outcome = PinVerifier::new(&mut executor, &config, &cancel, Some(&mut source))
            .verify(&FeatureMap::new(), None)
            .unwrap();
        assert_eq!(
            outcome,
            PinOutcome::ProtocolError(StatusWord::new(0x67, 0x00))
        );
    }
}
