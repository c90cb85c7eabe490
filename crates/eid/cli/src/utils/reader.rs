use eid_apdu_transport_pcsc::{ConnectStrategy, PcscDeviceManager};
use eid_card::CardProfile;

/// How to pick the reader: by name, else the first holding a card of `profile`
pub fn connect_strategy(reader_name: Option<&str>, profile: &CardProfile) -> ConnectStrategy {
    match (reader_name, profile.atr_pattern) {
        (Some(name), _) => ConnectStrategy::Reader(name.to_string()),
        (None, Some(pattern)) => {
            ConnectStrategy::CardWithAtr(pattern.to_vec(), profile.atr_mask.map(<[u8]>::to_vec))
        }
        (None, None) => ConnectStrategy::AnyCard,
    }
}

/// List all available readers
pub fn list_readers(manager: &PcscDeviceManager, profile: &CardProfile) -> eyre::Result<()> {
    let readers = manager.list_readers()?;

    println!("Available readers:");
    for (i, reader) in readers.iter().enumerate() {
        let status = match reader.atr() {
            Some(atr) if profile.matches_atr(atr) => format!("{} card", profile.name),
            Some(atr) => format!("other card, ATR {}", hex::encode_upper(atr)),
            None => "no card".to_string(),
        };
        println!("{}. {} ({})", i + 1, reader.name(), status);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_reader_wins() {
        let strategy = connect_strategy(Some("Gemalto PC Pinpad"), &CardProfile::beid());
        assert_eq!(strategy, ConnectStrategy::Reader("Gemalto PC Pinpad".to_string()));
    }

    #[test]
    fn test_profile_atr_is_used() {
        let profile = CardProfile::beid();
        match connect_strategy(None, &profile) {
            ConnectStrategy::CardWithAtr(pattern, mask) => {
                assert_eq!(Some(pattern.as_slice()), profile.atr_pattern);
                assert_eq!(mask.as_deref(), profile.atr_mask);
            }
            other => panic!("unexpected strategy: {other:?}"),
        }
        assert_eq!(connect_strategy(None, &CardProfile::any()), ConnectStrategy::AnyCard);
    }
}
