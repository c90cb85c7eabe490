//! PIN prompt on the terminal

use std::io::{self, BufRead, Write};

use eid_card::{Error, PinSource};
use tracing::warn;
use zeroize::Zeroizing;

/// Reads the PIN from standard input
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPin;

impl PinSource for TerminalPin {
    fn get_pin(&mut self, retries_remaining: Option<u8>) -> eid_card::Result<Zeroizing<String>> {
        if let Some(retries) = retries_remaining {
            eprintln!("Wrong PIN, {retries} attempts left");
        }
        eprint!("Enter PIN (empty to cancel): ");
        let _ = io::stderr().flush();

        let mut line = Zeroizing::new(String::new());
        if let Err(e) = io::stdin().lock().read_line(&mut line) {
            warn!(error = %e, "Could not read PIN");
            return Err(Error::PinCancelled);
        }
        Ok(Zeroizing::new(line.trim().to_string()))
    }
}
