//! Opening card sessions for the commands

use eid_apdu_transport_pcsc::{PcscDeviceManager, PcscTransport};
use eid_card::{CardExecutor, CardProfile, EidCard, FixedPin, PinSource};
use tracing::info;

use super::prompt::TerminalPin;
use super::reader;
use crate::config::Config;

/// Card session over PC/SC
pub type CardSession = EidCard<CardExecutor<PcscTransport>>;

/// Options shared by every card command
#[derive(Debug)]
pub struct SessionOptions<'a> {
    /// Reader named on the command line
    pub reader: Option<&'a str>,
    /// Accept cards that do not look like a BeID
    pub any_card: bool,
    /// Refuse to sign without a pinpad
    pub secure: bool,
    /// Loaded configuration file
    pub config: &'a Config,
}

impl SessionOptions<'_> {
    /// Profile cards are checked against
    pub const fn profile(&self) -> CardProfile {
        if self.any_card {
            CardProfile::any()
        } else {
            CardProfile::beid()
        }
    }
}

/// Connect to the chosen reader and open a session
pub fn open_card(manager: &PcscDeviceManager, options: &SessionOptions<'_>) -> eyre::Result<CardSession> {
    let profile = options.profile();
    let strategy = reader::connect_strategy(
        options.reader.or(options.config.reader.as_deref()),
        &profile,
    );
    let transport = manager.connect_strategy(strategy, options.config.pcsc.clone())?;
    info!(reader = transport.reader_name(), "Using reader");

    let card = EidCard::open(transport, profile, options.config.session.clone())?
        .with_secure_required(options.secure || options.config.secure);
    Ok(card)
}

/// PIN source for the commands: a PIN given on the command line, or a prompt
pub fn pin_source(pin: Option<&str>) -> Box<dyn PinSource> {
    match pin {
        Some(pin) => Box::new(FixedPin::new(pin)),
        None => Box::new(TerminalPin),
    }
}

/// Tell the user where the PIN will be asked
pub fn announce_pin_entry(card: &mut CardSession) {
    if card.features().has_secure_pin_entry() {
        println!("Enter your PIN on the reader");
    }
}
