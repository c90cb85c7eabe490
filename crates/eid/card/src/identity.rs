//! Identity, address and photo records

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use chrono::NaiveDate;
use tracing::debug;

use crate::tlv::{self, TlvError};

/// Tags of the identity file
pub mod identity_tag {
    /// Card number
    pub const CARD_NUMBER: u8 = 0x01;
    /// First day of validity
    pub const VALIDITY_BEGIN: u8 = 0x03;
    /// Last day of validity
    pub const VALIDITY_END: u8 = 0x04;
    /// Municipality that delivered the card
    pub const DELIVERY_MUNICIPALITY: u8 = 0x05;
    /// National registry number
    pub const NATIONAL_NUMBER: u8 = 0x06;
    /// Last name
    pub const NAME: u8 = 0x07;
    /// First two given names
    pub const GIVEN_NAMES: u8 = 0x08;
    /// Initial of the third given name
    pub const THIRD_NAME_INITIAL: u8 = 0x09;
    /// Nationality
    pub const NATIONALITY: u8 = 0x0A;
    /// Birth location
    pub const BIRTH_LOCATION: u8 = 0x0B;
    /// Birth date, as printed on the card
    pub const BIRTH_DATE: u8 = 0x0C;
    /// Sex
    pub const SEX: u8 = 0x0D;
    /// Noble condition
    pub const NOBLE_CONDITION: u8 = 0x0E;
    /// Document type
    pub const DOCUMENT_TYPE: u8 = 0x0F;
    /// Special status
    pub const SPECIAL_STATUS: u8 = 0x10;
}

/// Tags of the address file
pub mod address_tag {
    /// Street and number
    pub const STREET: u8 = 0x01;
    /// Postal code
    pub const ZIP: u8 = 0x02;
    /// Municipality
    pub const MUNICIPALITY: u8 = 0x03;
}

/// Cardholder identity
///
/// Missing tags decode to `None`, and so do dates and numbers that do not
/// parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// Card number
    pub card_number: Option<String>,
    /// First day of validity
    pub validity_begin: Option<NaiveDate>,
    /// Last day of validity
    pub validity_end: Option<NaiveDate>,
    /// Municipality that delivered the card
    pub delivery_municipality: Option<String>,
    /// National registry number
    pub national_number: Option<String>,
    /// Last name
    pub name: Option<String>,
    /// First two given names
    pub given_names: Option<String>,
    /// Initial of the third given name
    pub third_name_initial: Option<String>,
    /// Nationality
    pub nationality: Option<String>,
    /// Birth location
    pub birth_location: Option<String>,
    /// Kept as text: the card writes the month in the holder's language
    pub birth_date: Option<String>,
    /// Sex
    pub sex: Option<String>,
    /// Noble condition
    pub noble_condition: Option<String>,
    /// Document type
    pub document_type: Option<i32>,
    /// Special status
    pub special_status: Option<i32>,
}

impl Identity {
    /// Decode the identity file
    pub fn from_tlv(data: &[u8]) -> Result<Self, TlvError> {
        let mut map = tlv::decode(data)?;
        debug!(fields = map.len(), "Decoded identity file");
        let mut take = |tag| map.remove(&tag);

        Ok(Self {
            card_number: take(identity_tag::CARD_NUMBER),
            validity_begin: take(identity_tag::VALIDITY_BEGIN).as_deref().and_then(parse_date),
            validity_end: take(identity_tag::VALIDITY_END).as_deref().and_then(parse_date),
            delivery_municipality: take(identity_tag::DELIVERY_MUNICIPALITY),
            national_number: take(identity_tag::NATIONAL_NUMBER),
            name: take(identity_tag::NAME),
            given_names: take(identity_tag::GIVEN_NAMES),
            third_name_initial: take(identity_tag::THIRD_NAME_INITIAL),
            nationality: take(identity_tag::NATIONALITY),
            birth_location: take(identity_tag::BIRTH_LOCATION),
            birth_date: take(identity_tag::BIRTH_DATE),
            sex: take(identity_tag::SEX),
            noble_condition: take(identity_tag::NOBLE_CONDITION),
            document_type: take(identity_tag::DOCUMENT_TYPE).as_deref().and_then(parse_int),
            special_status: take(identity_tag::SPECIAL_STATUS).as_deref().and_then(parse_int),
        })
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let date = |value: &Option<NaiveDate>| {
            value.map_or_else(String::new, |d| d.format("%d.%m.%Y").to_string())
        };
        let number = |value: &Option<i32>| value.map_or_else(String::new, |n| n.to_string());

        writeln!(f, "Card number:      {}", text(&self.card_number))?;
        writeln!(
            f,
            "Valid:            {} - {}",
            date(&self.validity_begin),
            date(&self.validity_end)
        )?;
        writeln!(f, "Issued by:        {}", text(&self.delivery_municipality))?;
        writeln!(f, "National number:  {}", text(&self.national_number))?;
        writeln!(
            f,
            "Name:             {}, {} {}",
            text(&self.name),
            text(&self.given_names),
            text(&self.third_name_initial)
        )?;
        writeln!(f, "Nationality:      {}", text(&self.nationality))?;
        writeln!(f, "Birth location:   {}", text(&self.birth_location))?;
        writeln!(f, "Birth date:       {}", text(&self.birth_date))?;
        writeln!(f, "Sex:              {}", text(&self.sex))?;
        writeln!(f, "Noble condition:  {}", text(&self.noble_condition))?;
        writeln!(f, "Document type:    {}", number(&self.document_type))?;
        write!(f, "Special status:   {}", number(&self.special_status))
    }
}

/// Cardholder address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// Street and number
    pub street: Option<String>,
    /// Postal code
    pub zip: Option<String>,
    /// Municipality
    pub municipality: Option<String>,
}

impl Address {
    /// Decode the address file
    pub fn from_tlv(data: &[u8]) -> Result<Self, TlvError> {
        let mut map: BTreeMap<u8, String> = tlv::decode(data)?;
        Ok(Self {
            street: map.remove(&address_tag::STREET),
            zip: map.remove(&address_tag::ZIP),
            municipality: map.remove(&address_tag::MUNICIPALITY),
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.street.as_deref().unwrap_or_default())?;
        write!(
            f,
            "{} {}",
            self.zip.as_deref().unwrap_or_default(),
            self.municipality.as_deref().unwrap_or_default()
        )
    }
}

/// Cardholder photo, JPEG encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo(pub Bytes);

impl Photo {
    /// JPEG bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Parse a `dd.MM.yyyy` date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%d.%m.%Y").ok()
}

/// Parse a decimal number
pub fn parse_int(value: &str) -> Option<i32> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: u8, value: &str) -> Vec<u8> {
        let mut out = vec![tag, value.len() as u8];
        out.extend_from_slice(value.as_bytes());
        out
    }

    fn identity_file() -> Vec<u8> {
        [
            element(identity_tag::CARD_NUMBER, "591123456789"),
            element(0x02, "chip"),
            element(identity_tag::VALIDITY_BEGIN, "01.02.2020"),
            element(identity_tag::VALIDITY_END, "01.02.2030"),
            element(identity_tag::DELIVERY_MUNICIPALITY, "Gent"),
            element(identity_tag::NATIONAL_NUMBER, "85073100145"),
            element(identity_tag::NAME, "Peeters"),
            element(identity_tag::GIVEN_NAMES, "Jan Pieter"),
            element(identity_tag::THIRD_NAME_INITIAL, "K"),
            element(identity_tag::NATIONALITY, "Belg"),
            element(identity_tag::BIRTH_LOCATION, "Antwerpen"),
            element(identity_tag::BIRTH_DATE, "31 JUL 1985"),
            element(identity_tag::SEX, "M"),
            element(identity_tag::NOBLE_CONDITION, ""),
            element(identity_tag::DOCUMENT_TYPE, "1"),
            element(identity_tag::SPECIAL_STATUS, "x"),
        ]
        .concat()
    }

    #[test]
    fn test_identity_from_tlv() {
        let identity = Identity::from_tlv(&identity_file()).unwrap();
        assert_eq!(identity.card_number.as_deref(), Some("591123456789"));
        assert_eq!(identity.validity_begin, NaiveDate::from_ymd_opt(2020, 2, 1));
        assert_eq!(identity.validity_end, NaiveDate::from_ymd_opt(2030, 2, 1));
        assert_eq!(identity.name.as_deref(), Some("Peeters"));
        assert_eq!(identity.birth_date.as_deref(), Some("31 JUL 1985"));
        assert_eq!(identity.noble_condition.as_deref(), Some(""));
        assert_eq!(identity.document_type, Some(1));
        assert_eq!(identity.special_status, None);
    }

    #[test]
    fn test_identity_display() {
        let identity = Identity::from_tlv(&identity_file()).unwrap();
        let text = identity.to_string();
        assert!(text.contains("Name:             Peeters, Jan Pieter K"));
        assert!(text.contains("Valid:            01.02.2020 - 01.02.2030"));
    }

    #[test]
    fn test_missing_tags_are_none() {
        let identity = Identity::from_tlv(&element(identity_tag::NAME, "Janssens")).unwrap();
        assert_eq!(identity.name.as_deref(), Some("Janssens"));
        assert_eq!(identity.card_number, None);
        assert_eq!(identity.validity_begin, None);
    }

    #[test]
    fn test_address_from_tlv() {
        let file = [
            element(address_tag::STREET, "Kerkstraat 1"),
            element(address_tag::ZIP, "9000"),
            element(address_tag::MUNICIPALITY, "Gent"),
        ]
        .concat();
        let address = Address::from_tlv(&file).unwrap();
        assert_eq!(address.zip.as_deref(), Some("9000"));
        assert_eq!(address.to_string(), "Kerkstraat 1\n9000 Gent");
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_date("31.07.1985"), NaiveDate::from_ymd_opt(1985, 7, 31));
        assert_eq!(parse_date("31 JUL 1985"), None);
        assert_eq!(parse_int(" 12 "), Some(12));
        assert_eq!(parse_int(""), None);
    }
}
