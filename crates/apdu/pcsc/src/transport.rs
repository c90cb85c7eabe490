//! PC/SC transport implementation

use eid_apdu_core::{Bytes, CardTransport, ControlCode, TransportError};

use pcsc::{Card, Context, Disposition, MAX_BUFFER_SIZE};
use std::{ffi::CString, fmt};
use tracing::{debug, info};

use crate::{config::PcscConfig, error::PcscError};

/// Transport implementation using PC/SC
pub struct PcscTransport {
    /// PC/SC context
    context: Context,
    /// Card connection, if established
    card: Option<Card>,
    /// Reader name
    reader_name: String,
    /// Configuration
    config: PcscConfig,
}

impl fmt::Debug for PcscTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscTransport")
            .field("reader_name", &self.reader_name)
            .field("has_card", &self.card.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl PcscTransport {
    /// Create a new PC/SC transport for the specified reader
    pub(crate) fn new(
        context: Context,
        reader_name: &str,
        config: PcscConfig,
    ) -> Result<Self, PcscError> {
        let mut transport = Self {
            context,
            card: None,
            reader_name: reader_name.to_string(),
            config,
        };

        transport.connect_card()?;
        info!(reader = %transport.reader_name, "Connected to card");

        Ok(transport)
    }

    /// Try to connect to the card
    fn connect_card(&mut self) -> Result<(), PcscError> {
        if self.card.is_some() {
            return Ok(());
        }

        let reader_cstr = CString::new(self.reader_name.clone())
            .map_err(|_| PcscError::ReaderNotFound(self.reader_name.clone()))?;

        match self.context.connect(
            &reader_cstr,
            self.config.share_mode.into(),
            self.config.protocols,
        ) {
            Ok(card) => {
                self.card = Some(card);
                Ok(())
            }
            Err(pcsc::Error::NoSmartcard) => Err(PcscError::NoCard(self.reader_name.clone())),
            Err(pcsc::Error::UnknownReader) => {
                Err(PcscError::ReaderNotFound(self.reader_name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get the reader name
    pub fn reader_name(&self) -> &str {
        &self.reader_name
    }

    fn card(&mut self) -> Result<&mut Card, PcscError> {
        if self.card.is_none() && self.config.auto_reconnect {
            self.connect_card()?;
        }
        self.card
            .as_mut()
            .ok_or_else(|| PcscError::NoCard(self.reader_name.clone()))
    }

    /// Forget the connection after the card went away
    ///
    /// The failed exchange is never resent: a reset card has lost its
    /// security state.
    fn on_card_error(&mut self, error: pcsc::Error) -> PcscError {
        match recovery_for(error, self.config.auto_reconnect) {
            Recovery::Keep => {}
            Recovery::Forget => self.card = None,
            Recovery::Reconnect => {
                self.card = None;
                debug!(reader = %self.reader_name, "Card was reset, reconnecting");
                if let Err(e) = self.connect_card() {
                    debug!(error = %e, "Reconnect failed");
                }
            }
        }
        error.into()
    }

    /// Transmit a command to the card
    fn transmit_command(&mut self, command: &[u8]) -> Result<Bytes, PcscError> {
        let mut response_buffer = [0u8; MAX_BUFFER_SIZE];

        let result = self
            .card()?
            .transmit(command, &mut response_buffer)
            .map(Bytes::copy_from_slice);

        result.map_err(|e| self.on_card_error(e))
    }

    /// Send a control command to the reader
    fn control_command(&mut self, code: ControlCode, input: &[u8]) -> Result<Bytes, PcscError> {
        let mut response_buffer = [0u8; MAX_BUFFER_SIZE];

        let result = self
            .card()?
            .control(code.into(), input, &mut response_buffer)
            .map(Bytes::copy_from_slice);

        result.map_err(|e| self.on_card_error(e))
    }
}

/// Connection handling after a failed exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    Keep,
    Forget,
    Reconnect,
}

const fn recovery_for(error: pcsc::Error, auto_reconnect: bool) -> Recovery {
    match error {
        pcsc::Error::ResetCard if auto_reconnect => Recovery::Reconnect,
        pcsc::Error::ResetCard | pcsc::Error::RemovedCard => Recovery::Forget,
        _ => Recovery::Keep,
    }
}

impl CardTransport for PcscTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.transmit_command(command).map_err(TransportError::from)
    }

    fn do_control(&mut self, code: ControlCode, input: &[u8]) -> Result<Bytes, TransportError> {
        self.control_command(code, input)
            .map_err(TransportError::from)
    }

    fn atr(&self) -> Result<Bytes, TransportError> {
        let card = self
            .card
            .as_ref()
            .ok_or_else(|| PcscError::NoCard(self.reader_name.clone()))?;
        card.get_attribute_owned(pcsc::Attribute::AtrString)
            .map(Bytes::from)
            .map_err(|e| PcscError::from(e).into())
    }

    fn is_connected(&self) -> bool {
        self.card.is_some()
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        if let Some(card) = self.card.take() {
            if let Err((_, e)) = card.disconnect(Disposition::ResetCard) {
                debug!(error = ?e, "Card disconnect failed");
            }
        }
        Ok(())
    }
}

impl Drop for PcscTransport {
    fn drop(&mut self) {
        if let Some(card) = self.card.take() {
            let _ = card.disconnect(Disposition::LeaveCard);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_card_is_not_reconnected_by_default() {
        let config = PcscConfig::default();
        assert_eq!(
            recovery_for(pcsc::Error::ResetCard, config.auto_reconnect),
            Recovery::Forget
        );
        assert_eq!(recovery_for(pcsc::Error::RemovedCard, true), Recovery::Forget);
        assert_eq!(recovery_for(pcsc::Error::ResetCard, true), Recovery::Reconnect);
        assert_eq!(recovery_for(pcsc::Error::Timeout, true), Recovery::Keep);
    }

    #[test]
    fn test_reset_card_error_is_returned() {
        assert!(matches!(
            TransportError::from(PcscError::Pcsc(pcsc::Error::ResetCard)),
            TransportError::Connection
        ));
    }
}
