//! Simple-TLV decoding of card files
//!
//! BeID files are flat lists of `tag, length, value` with one byte tags. A
//! length of 255 or more is written as a run of `FF` bytes followed by the
//! remainder, each `FF` adding 255.

use std::collections::BTreeMap;

use tracing::trace;

/// Decoding failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TlvError {
    /// The buffer ended inside an element
    #[error("TLV element with tag 0x{tag:02X} truncated at offset {offset}")]
    Truncated {
        /// Tag of the incomplete element
        tag: u8,
        /// Offset at which more bytes were needed
        offset: usize,
    },
}

/// Decode a whole buffer into tag/text pairs
///
/// Values are read as UTF-8, falling back to one char per byte (ISO-8859-1)
/// when that fails. A tag seen twice keeps its last value.
pub fn decode(data: &[u8]) -> Result<BTreeMap<u8, String>, TlvError> {
    let mut map = BTreeMap::new();
    let mut pos = 0;

    while pos < data.len() {
        let tag = data[pos];
        pos += 1;

        let mut length = 0usize;
        loop {
            let byte = *data
                .get(pos)
                .ok_or(TlvError::Truncated { tag, offset: pos })?;
            pos += 1;
            length += byte as usize;
            if byte != 0xFF {
                break;
            }
        }

        let value = data.get(pos..pos + length).ok_or(TlvError::Truncated {
            tag,
            offset: data.len(),
        })?;
        pos += length;

        trace!(tag, length, "TLV element");
        map.insert(tag, text(value));
    }

    Ok(map)
}

fn text(value: &[u8]) -> String {
    match std::str::from_utf8(value) {
        Ok(s) => s.to_owned(),
        Err(_) => value.iter().map(|&b| char::from(b)).collect(),
    }
}
