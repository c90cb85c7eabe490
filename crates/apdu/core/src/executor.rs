//! Executor for APDU command execution
//!
//! The executor is the framer: it serializes commands, hands them to a
//! transport and parses the reply into a [`Response`]. A non-success status
//! word is returned to the caller, never turned into an error here.

use std::fmt;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, instrument, trace};

use crate::command::Command;
use crate::response::Response;
use crate::transport::{CardTransport, ControlCode};
use crate::{Error, Result};

/// Delay before resending a command the card answered with 6C XX
pub const DEFAULT_RESEND_DELAY: Duration = Duration::from_millis(10);

/// Trait for APDU command execution
pub trait Executor: Send + fmt::Debug {
    /// Transmit an APDU command
    #[instrument(level = "trace", skip_all, fields(ins = command.ins))]
    fn transmit(&mut self, command: &Command) -> Result<Response> {
        let command_bytes = command.to_bytes()?;
        self.transmit_raw(&command_bytes)
    }

    /// Transmit an already serialized command
    ///
    /// Used for commands whose serialized form must live in a buffer owned
    /// by the caller, such as a VERIFY carrying PIN digits.
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Response>;

    /// Send a reader control command
    fn control(&mut self, code: ControlCode, input: &[u8]) -> Result<Bytes>;

    /// Answer-to-reset of the connected card
    fn atr(&self) -> Result<Bytes>;

    /// Reset the executor, including the transport
    fn reset(&mut self) -> Result<()>;
}

/// Card executor implementation on top of a transport
#[derive(Debug)]
pub struct CardExecutor<T: CardTransport> {
    /// The transport used for communication
    transport: T,
    /// Wait before the single resend on 6C XX
    resend_delay: Duration,
}

impl<T: CardTransport> CardExecutor<T> {
    /// Create a new card executor with the given transport
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            resend_delay: DEFAULT_RESEND_DELAY,
        }
    }

    /// Override the resend delay
    pub const fn with_resend_delay(mut self, delay: Duration) -> Self {
        self.resend_delay = delay;
        self
    }

    /// Get a reference to the underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the underlying transport
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Take ownership of the transport and return it
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn exchange(&mut self, command: &[u8]) -> Result<Response> {
        let raw = self.transport.transmit_raw(command)?;
        Response::from_bytes(&raw)
    }
}

impl<T: CardTransport> Executor for CardExecutor<T> {
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Response> {
        let response = self.exchange(command)?;

        if !response.status().is_aborted() {
            return Ok(response);
        }

        debug!(
            status = %response.status(),
            delay_ms = self.resend_delay.as_millis() as u64,
            "Card requested a resend"
        );
        if !self.resend_delay.is_zero() {
            thread::sleep(self.resend_delay);
        }

        // Second answer is returned as is, whatever its status.
        let response = self.exchange(command)?;
        trace!(status = %response.status(), "Resend completed");
        Ok(response)
    }

    fn control(&mut self, code: ControlCode, input: &[u8]) -> Result<Bytes> {
        self.transport.control(code, input).map_err(Error::from)
    }

    fn atr(&self) -> Result<Bytes> {
        self.transport.atr().map_err(Error::from)
    }

    fn reset(&mut self) -> Result<()> {
        self.transport.reset().map_err(Error::from)
    }
}
