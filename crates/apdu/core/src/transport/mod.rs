//! Transport traits for APDU communication with cards
//!
//! A transport is the duplex byte channel to one connected card. Besides
//! plain command/response exchange it forwards reader "control" commands,
//! which are addressed by an opaque vendor control code.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

use std::fmt;

use bytes::Bytes;
pub use error::TransportError;
use tracing::{debug, trace};

/// Reader control code, as passed to `SCardControl`
pub type ControlCode = u32;

/// Trait for basic card transports
///
/// Implementations do not interpret command contents. Logging in the provided
/// methods records the command header and lengths only, so PIN-bearing
/// commands never reach the log.
pub trait CardTransport: Send + Sync + fmt::Debug {
    /// Send raw APDU bytes to card and return response bytes
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        trace!(
            header = ?hex::encode(&command[..command.len().min(4)]),
            len = command.len(),
            "Transmitting raw command"
        );
        let result = self.do_transmit_raw(command);
        match &result {
            Ok(response) => trace!(len = response.len(), "Received raw response"),
            Err(e) => debug!(error = ?e, "Transport error during transmission"),
        }
        result
    }

    /// Internal implementation of transmit_raw
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError>;

    /// Send a reader control command and return the reader's reply
    fn control(&mut self, code: ControlCode, input: &[u8]) -> Result<Bytes, TransportError> {
        trace!(
            code = format_args!("{code:#010x}"),
            len = input.len(),
            "Sending control command"
        );
        let result = self.do_control(code, input);
        if let Err(e) = &result {
            debug!(error = ?e, "Transport error during control command");
        }
        result
    }

    /// Internal implementation of control
    fn do_control(&mut self, code: ControlCode, input: &[u8]) -> Result<Bytes, TransportError>;

    /// Answer-to-reset of the connected card
    fn atr(&self) -> Result<Bytes, TransportError>;

    /// Check if the transport is connected to a physical card
    fn is_connected(&self) -> bool;

    /// Reset the transport connection
    fn reset(&mut self) -> Result<(), TransportError>;
}
