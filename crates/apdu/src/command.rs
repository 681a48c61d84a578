//! Wrapped APDU command construction
//!
//! NTAG 424 DNA native commands travel inside ISO 7816-4 short frames:
//! `CLA INS P1 P2 [Lc data] [Le]`. The secure messaging layer always uses
//! `CLA = 0x90`, `P1 = P2 = 0x00` and `Le = 0x00`, but plain ISO commands
//! (e.g. SELECT) use other values, so the full header is kept explicit.

use bytes::{BufMut, Bytes, BytesMut};

use crate::Error;

/// Class byte for wrapped native commands.
pub const CLA_WRAPPED: u8 = 0x90;

/// A single command APDU in the short (1-byte Lc/Le) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data field (empty means no Lc/data on the wire)
    pub data: Bytes,
    /// Expected response length, if any
    pub le: Option<u8>,
}

impl Command {
    /// Create a command with an empty data field and no Le.
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Bytes::new(),
            le: None,
        }
    }

    /// Create a wrapped native command: `90 INS 00 00 Lc data 00`.
    pub fn wrapped<T: Into<Bytes>>(ins: u8, data: T) -> Self {
        Self {
            cla: CLA_WRAPPED,
            ins,
            p1: 0x00,
            p2: 0x00,
            data: data.into(),
            le: Some(0x00),
        }
    }

    /// Set the data field.
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = data.into();
        self
    }

    /// Set the expected response length.
    pub const fn with_le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    /// Serialized length of this command.
    pub fn serialized_len(&self) -> usize {
        let mut len = 4;
        if !self.data.is_empty() {
            len += 1 + self.data.len();
        }
        if self.le.is_some() {
            len += 1;
        }
        len
    }

    /// Serialize to raw APDU bytes.
    ///
    /// Fails with [`Error::DataTooLong`] when the data field does not fit a
    /// single-byte Lc; the card family has no extended-length frames.
    pub fn to_bytes(&self) -> Result<Bytes, Error> {
        if self.data.len() > u8::MAX as usize {
            return Err(Error::DataTooLong(self.data.len()));
        }

        let mut buffer = BytesMut::with_capacity(self.serialized_len());
        buffer.put_u8(self.cla);
        buffer.put_u8(self.ins);
        buffer.put_u8(self.p1);
        buffer.put_u8(self.p2);

        if !self.data.is_empty() {
            buffer.put_u8(self.data.len() as u8);
            buffer.put_slice(&self.data);
        }

        if let Some(le) = self.le {
            buffer.put_u8(le);
        }

        Ok(buffer.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn wrapped_serialization() {
        let cmd = Command::wrapped(0xF5, vec![0x02]);
        assert_eq!(cmd.to_bytes().unwrap().as_ref(), hex!("90F500000102 00"));
    }

    #[test]
    fn no_data_no_lc() {
        // A data-less wrapped command has no Lc byte at all.
        let cmd = Command::wrapped(0x51, Bytes::new());
        assert_eq!(cmd.to_bytes().unwrap().as_ref(), hex!("9051000000"));
    }

    #[test]
    fn iso_select_shape() {
        let cmd = Command::new(0x00, 0xA4, 0x04, 0x00)
            .with_data(hex!("D2760000850101").to_vec())
            .with_le(0x00);
        assert_eq!(
            cmd.to_bytes().unwrap().as_ref(),
            hex!("00A4040007D276000085010100")
        );
        assert_eq!(cmd.serialized_len(), 13);
    }

    #[test]
    fn oversized_data_rejected() {
        let cmd = Command::wrapped(0x8D, vec![0u8; 256]);
        assert!(matches!(cmd.to_bytes(), Err(Error::DataTooLong(256))));
    }
}
