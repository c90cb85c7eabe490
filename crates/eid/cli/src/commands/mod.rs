//! Command implementations

mod card_data;
mod pin;
mod sign;

pub use card_data::{address_command, certificates_command, identity_command, photo_command};
pub use pin::verify_pin_command;
pub use sign::{SignArgs, sign_command};
