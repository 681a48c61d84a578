//! Response APDU parsing and status words

use std::fmt;

use bytes::Bytes;

use crate::Error;

/// Two-byte completion code trailing every response APDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord {
    /// First status byte
    pub sw1: u8,
    /// Second status byte
    pub sw2: u8,
}

impl StatusWord {
    /// Create a status word from its two bytes.
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// The status word as a single big-endian value.
    pub const fn to_u16(self) -> u16 {
        ((self.sw1 as u16) << 8) | self.sw2 as u16
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}", self.sw1, self.sw2)
    }
}

/// Common status words of the card family.
pub mod status {
    use super::StatusWord;

    /// ISO success (plain ISO commands such as SELECT)
    pub const SW_ISO_OK: StatusWord = StatusWord::new(0x90, 0x00);
    /// Native success inside the wrapped frame format
    pub const SW_OPERATION_OK: StatusWord = StatusWord::new(0x91, 0x00);
    /// More frames follow (chained native command)
    pub const SW_ADDITIONAL_FRAME: StatusWord = StatusWord::new(0x91, 0xAF);
}

/// A parsed response APDU: payload bytes followed by the status word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    payload: Bytes,
    status: StatusWord,
}

impl Response {
    /// Build a response from its parts.
    pub const fn new(payload: Bytes, status: StatusWord) -> Self {
        Self { payload, status }
    }

    /// Parse a raw response frame. The frame must carry at least the two
    /// trailing status bytes.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, Error> {
        if raw.len() < 2 {
            return Err(Error::ResponseTooShort(raw.len()));
        }
        let (payload, sw) = raw.split_at(raw.len() - 2);
        Ok(Self {
            payload: Bytes::copy_from_slice(payload),
            status: StatusWord::new(sw[0], sw[1]),
        })
    }

    /// The response payload, without the status word.
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// The trailing status word.
    pub const fn status(&self) -> StatusWord {
        self.status
    }
}
