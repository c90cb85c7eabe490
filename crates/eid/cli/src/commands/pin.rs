use eid_card::PinOutcome;

use crate::utils::session::{self, CardSession};

/// Verify the PIN, asking again while attempts remain
pub fn verify_pin_command(card: &mut CardSession, pin: Option<&str>) -> eyre::Result<()> {
    let fixed = pin.is_some();
    card.set_pin_source(Some(session::pin_source(pin)));
    session::announce_pin_entry(card);

    let mut retries = None;
    loop {
        match card.verify_pin(retries)? {
            PinOutcome::Verified => {
                println!("PIN verified");
                return Ok(());
            }
            PinOutcome::WrongPin { retries_remaining } if !fixed && retries_remaining > 0 => {
                retries = Some(retries_remaining);
            }
            outcome => {
                outcome.into_result()?;
                return Ok(());
            }
        }
    }
}
