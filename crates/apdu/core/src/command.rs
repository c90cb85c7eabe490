//! APDU command definitions
//!
//! This module provides the command unit sent to a card, according to
//! ISO/IEC 7816-4 short length encoding.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::Error;

/// Expected length type for APDU commands
pub type ExpectedLength = u8;

/// Largest payload that fits a short APDU (Lc is a single byte)
pub const MAX_SHORT_DATA_LEN: usize = 255;

/// Generic APDU command structure
///
/// A command is immutable once built; the `with_*` builders consume and
/// return a new value.
#[derive(Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected length (optional)
    pub le: Option<ExpectedLength>,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Create a new command with expected response length (Le)
    pub const fn new_with_le(cla: u8, ins: u8, p1: u8, p2: u8, le: ExpectedLength) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: Some(le),
        }
    }

    /// Create a new command with data payload
    pub fn new_with_data<T: Into<Bytes>>(cla: u8, ins: u8, p1: u8, p2: u8, data: T) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Some(data.into()),
            le: None,
        }
    }

    /// Set the data field
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the expected length field
    pub const fn with_le(mut self, le: ExpectedLength) -> Self {
        self.le = Some(le);
        self
    }

    /// Command class (CLA)
    pub const fn class(&self) -> u8 {
        self.cla
    }

    /// Instruction code (INS)
    pub const fn instruction(&self) -> u8 {
        self.ins
    }

    /// First parameter (P1)
    pub const fn p1(&self) -> u8 {
        self.p1
    }

    /// Second parameter (P2)
    pub const fn p2(&self) -> u8 {
        self.p2
    }

    /// Command payload data (optional)
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Expected response length (optional)
    pub const fn expected_length(&self) -> Option<ExpectedLength> {
        self.le
    }

    /// Calculate length of serialized command
    pub fn command_length(&self) -> usize {
        // Header (CLA, INS, P1, P2) is always 4 bytes
        let mut length = 4;
        if let Some(data) = self.data() {
            length += 1 + data.len();
        }
        if self.le.is_some() {
            length += 1;
        }
        length
    }

    /// Serialize the command into `out`
    ///
    /// The caller owns the buffer, which lets secret-bearing commands be
    /// written into a buffer that is scrubbed afterwards.
    pub fn encode_into(&self, out: &mut impl BufMut) -> Result<(), Error> {
        // Header: CLA, INS, P1, P2
        out.put_u8(self.cla);
        out.put_u8(self.ins);
        out.put_u8(self.p1);
        out.put_u8(self.p2);

        // Add Lc and data if present
        if let Some(data) = self.data() {
            if data.len() > MAX_SHORT_DATA_LEN {
                return Err(Error::InvalidCommandLength(data.len()));
            }
            out.put_u8(data.len() as u8);
            out.put_slice(data);
        }

        if let Some(le) = self.le {
            out.put_u8(le);
        }

        Ok(())
    }

    /// Convert to raw APDU bytes
    pub fn to_bytes(&self) -> Result<Bytes, Error> {
        let mut buffer = BytesMut::with_capacity(self.command_length());
        self.encode_into(&mut buffer)?;
        Ok(buffer.freeze())
    }
}

// Payloads may carry key references or digests, so only their length is shown.
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("cla", &format_args!("{:#04x}", self.cla))
            .field("ins", &format_args!("{:#04x}", self.ins))
            .field("p1", &format_args!("{:#04x}", self.p1))
            .field("p2", &format_args!("{:#04x}", self.p2))
            .field("data_len", &self.data.as_ref().map(|d| d.len()))
            .field("le", &self.le)
            .finish()
    }
}
