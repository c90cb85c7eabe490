//! Scripted transport for tests
//!
//! Replies are queued per channel kind (APDU and reader control) and handed
//! out in order. Everything sent is recorded so tests can assert on the exact
//! byte sequence a protocol flow produced.

use std::collections::VecDeque;

use bytes::Bytes;

use super::{CardTransport, ControlCode, TransportError};

/// One recorded exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    /// A command APDU
    Apdu(Bytes),
    /// A reader control command
    Control(ControlCode, Bytes),
}

/// Mock transport driven by scripted replies
#[derive(Debug, Clone)]
pub struct MockTransport {
    apdu_replies: VecDeque<Result<Bytes, ()>>,
    control_replies: VecDeque<Result<Bytes, ()>>,
    /// Everything sent to the mock, in order
    pub sent: Vec<Exchange>,
    /// Answer-to-reset reported by the mock
    pub atr: Bytes,
    /// Whether the transport is connected
    pub connected: bool,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create an empty mock with no scripted replies
    pub fn new() -> Self {
        Self {
            apdu_replies: VecDeque::new(),
            control_replies: VecDeque::new(),
            sent: Vec::new(),
            atr: Bytes::new(),
            connected: true,
        }
    }

    /// Set the answer-to-reset
    pub fn with_atr(mut self, atr: impl Into<Bytes>) -> Self {
        self.atr = atr.into();
        self
    }

    /// Queue a raw APDU reply (payload followed by SW1 SW2)
    pub fn reply(mut self, response: impl Into<Bytes>) -> Self {
        self.apdu_replies.push_back(Ok(response.into()));
        self
    }

    /// Queue a reply made of a payload and a status word
    pub fn reply_with(self, payload: &[u8], sw: u16) -> Self {
        let mut response = payload.to_vec();
        response.extend_from_slice(&sw.to_be_bytes());
        self.reply(response)
    }

    /// Queue a bare status word reply
    pub fn reply_status(self, sw: u16) -> Self {
        self.reply_with(&[], sw)
    }

    /// Queue a transmission failure for the next APDU
    pub fn reply_failure(mut self) -> Self {
        self.apdu_replies.push_back(Err(()));
        self
    }

    /// Queue a reply for the next control command
    pub fn control_reply(mut self, response: impl Into<Bytes>) -> Self {
        self.control_replies.push_back(Ok(response.into()));
        self
    }

    /// Queue a failure for the next control command
    pub fn control_failure(mut self) -> Self {
        self.control_replies.push_back(Err(()));
        self
    }

    /// Commands sent as APDUs, in order
    pub fn apdus(&self) -> Vec<Bytes> {
        self.sent
            .iter()
            .filter_map(|e| match e {
                Exchange::Apdu(bytes) => Some(bytes.clone()),
                Exchange::Control(..) => None,
            })
            .collect()
    }

    /// Control commands sent, in order
    pub fn controls(&self) -> Vec<(ControlCode, Bytes)> {
        self.sent
            .iter()
            .filter_map(|e| match e {
                Exchange::Control(code, bytes) => Some((*code, bytes.clone())),
                Exchange::Apdu(_) => None,
            })
            .collect()
    }

    /// Number of scripted replies not consumed yet
    pub fn pending(&self) -> usize {
        self.apdu_replies.len() + self.control_replies.len()
    }
}

impl CardTransport for MockTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        if !self.connected {
            return Err(TransportError::Connection);
        }

        self.sent.push(Exchange::Apdu(Bytes::copy_from_slice(command)));

        match self.apdu_replies.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(())) | None => Err(TransportError::Transmission),
        }
    }

    fn do_control(&mut self, code: ControlCode, input: &[u8]) -> Result<Bytes, TransportError> {
        if !self.connected {
            return Err(TransportError::Connection);
        }

        self.sent
            .push(Exchange::Control(code, Bytes::copy_from_slice(input)));

        match self.control_replies.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(())) | None => Err(TransportError::UnsupportedControl(code)),
        }
    }

    fn atr(&self) -> Result<Bytes, TransportError> {
        if self.connected {
            Ok(self.atr.clone())
        } else {
            Err(TransportError::Connection)
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        self.connected = false;
        Ok(())
    }
}
