//! File settings, as reported by GetFileSettings
//!
//! The same logical file has a short settings form and an SDM-extended form
//! depending on how the card was configured, so the layout is read from the
//! response itself (the file-option flags select which trailing fields
//! exist) rather than assumed. Callers changing a file's protection follow
//! the read-modify-write pattern: fetch the current settings, adjust, and
//! feed [`FileSettings::change_payload`] to ChangeFileSettings.

use bytes::{BufMut, Bytes, BytesMut};

use crate::registry::CommMode;
use crate::{Error, Result};

/// Secure dynamic messaging (SDM) flag inside the file option byte.
const OPT_SDM_ENABLED: u8 = 0x40;

/// SDM option flags selecting which mirror offsets follow.
const SDM_OPT_UID: u8 = 0x80;
const SDM_OPT_READ_CTR: u8 = 0x40;

/// SDM mirroring configuration, present only in the extended form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdmSettings {
    /// SDM option flags
    pub options: u8,
    /// SDM access rights (2 bytes, as on the wire)
    pub access_rights: [u8; 2],
    /// UID mirror offset, when UID mirroring is enabled
    pub uid_offset: Option<u32>,
    /// Read-counter mirror offset, when counter mirroring is enabled
    pub read_ctr_offset: Option<u32>,
}

/// Parsed settings of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSettings {
    /// File type byte
    pub file_type: u8,
    /// Communication mode the file demands for data access
    pub comm_mode: CommMode,
    /// Access rights (2 bytes, as on the wire)
    pub access_rights: [u8; 2],
    /// File size in bytes
    pub size: u32,
    /// SDM configuration, when the file option flags announce it
    pub sdm: Option<SdmSettings>,
}

const fn comm_mode_from_option(option: u8) -> CommMode {
    match option & 0x03 {
        0b01 => CommMode::Mac,
        0b11 => CommMode::Full,
        // The high bit of the two-bit field is "don't care" for plain.
        _ => CommMode::Plain,
    }
}

const fn comm_mode_bits(mode: CommMode) -> u8 {
    match mode {
        CommMode::Plain => 0b00,
        CommMode::Mac => 0b01,
        CommMode::Full => 0b11,
    }
}

fn read_u24_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0])
}

impl FileSettings {
    /// Parse a GetFileSettings response payload, short or SDM-extended form.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 7 {
            return Err(Error::InvalidData("file settings shorter than base form"));
        }

        let file_type = data[0];
        let option = data[1];
        let access_rights = [data[2], data[3]];
        let size = read_u24_le(&data[4..7]);

        let sdm = if option & OPT_SDM_ENABLED != 0 {
            let mut rest = &data[7..];
            if rest.len() < 3 {
                return Err(Error::InvalidData("SDM form missing options"));
            }
            let options = rest[0];
            let sdm_access_rights = [rest[1], rest[2]];
            rest = &rest[3..];

            let mut take_offset = |flag: u8| -> Result<Option<u32>> {
                if options & flag == 0 {
                    return Ok(None);
                }
                if rest.len() < 3 {
                    return Err(Error::InvalidData("SDM form missing mirror offset"));
                }
                let value = read_u24_le(rest);
                rest = &rest[3..];
                Ok(Some(value))
            };

            Some(SdmSettings {
                options,
                access_rights: sdm_access_rights,
                uid_offset: take_offset(SDM_OPT_UID)?,
                read_ctr_offset: take_offset(SDM_OPT_READ_CTR)?,
            })
        } else {
            None
        };

        Ok(Self {
            file_type,
            comm_mode: comm_mode_from_option(option),
            access_rights,
            size,
            sdm,
        })
    }

    /// Build the ChangeFileSettings data field for these settings. The file
    /// type and size are fixed properties and are not part of the change
    /// payload.
    pub fn change_payload(&self) -> Bytes {
        let mut option = comm_mode_bits(self.comm_mode);
        if self.sdm.is_some() {
            option |= OPT_SDM_ENABLED;
        }

        let mut buf = BytesMut::with_capacity(3);
        buf.put_u8(option);
        buf.put_slice(&self.access_rights);
        if let Some(sdm) = &self.sdm {
            buf.put_u8(sdm.options);
            buf.put_slice(&sdm.access_rights);
            for offset in [sdm.uid_offset, sdm.read_ctr_offset].into_iter().flatten() {
                buf.put_slice(&offset.to_le_bytes()[..3]);
            }
        }
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn parses_short_form() {
        // StandardData file, full comm mode, AR E0EE, 256 bytes.
        let settings = FileSettings::parse(&hex!("00 03 E0EE 000100")).unwrap();
        assert_eq!(settings.file_type, 0x00);
        assert_eq!(settings.comm_mode, CommMode::Full);
        assert_eq!(settings.access_rights, hex!("E0EE"));
        assert_eq!(settings.size, 256);
        assert!(settings.sdm.is_none());
    }

    #[test]
    fn plain_mode_tolerates_dont_care_bit() {
        let settings = FileSettings::parse(&hex!("00 02 E0EE 000100")).unwrap();
        assert_eq!(settings.comm_mode, CommMode::Plain);
    }

    #[test]
    fn parses_sdm_extended_form() {
        // SDM enabled with UID + read counter mirrors at offsets 0x20/0x43.
        let settings =
            FileSettings::parse(&hex!("00 40 00E0 000100 C0 F121 200000 430000")).unwrap();
        assert_eq!(settings.comm_mode, CommMode::Plain);
        let sdm = settings.sdm.unwrap();
        assert_eq!(sdm.options, 0xC0);
        assert_eq!(sdm.access_rights, hex!("F121"));
        assert_eq!(sdm.uid_offset, Some(0x20));
        assert_eq!(sdm.read_ctr_offset, Some(0x43));
    }

    #[test]
    fn truncated_forms_rejected() {
        assert_eq!(
            FileSettings::parse(&hex!("000300")),
            Err(Error::InvalidData("file settings shorter than base form"))
        );
        assert_eq!(
            FileSettings::parse(&hex!("00 40 E0EE 000100 C0")),
            Err(Error::InvalidData("SDM form missing options"))
        );
        assert_eq!(
            FileSettings::parse(&hex!("00 40 E0EE 000100 C0 F121 2000")),
            Err(Error::InvalidData("SDM form missing mirror offset"))
        );
    }

    #[test]
    fn change_payload_round_trips_the_read_form() {
        // The read-before-change pattern: what GetFileSettings reported,
        // re-encoded, is what ChangeFileSettings expects.
        let settings = FileSettings::parse(&hex!("00 00 E0EE 000100")).unwrap();
        assert_eq!(settings.change_payload().as_ref(), hex!("00E0EE"));

        let extended =
            FileSettings::parse(&hex!("00 40 00E0 000100 C0 F121 200000 430000")).unwrap();
        assert_eq!(
            extended.change_payload().as_ref(),
            hex!("40 00E0 C0 F121 200000 430000")
        );
    }
}
