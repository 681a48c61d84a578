//! Per-command framing rules and IV derivation
//!
//! Every native command the crate can frame has exactly one entry here
//! describing how its IV suffix is assembled in each direction, whether a
//! Plain-mode variant still carries a MAC, and what header/data lengths are
//! legal. The table is closed: an instruction byte without an entry is
//! rejected, never framed "by similarity". ChangeFileSettings is the
//! cautionary entry — its IV suffix is all zeros where almost every other
//! encrypting command folds the instruction and header bytes in, and
//! guessing the common policy produces a cryptogram the card rejects with
//! an unrelated-looking status code.

use crate::Error;
use crate::crypto::{BLOCK_LEN, encrypt_block};
use crate::session::SessionKeys;

/// Instruction bytes of the supported native commands.
pub mod ins {
    /// GetCardUID: no header, response carries the encrypted 7-byte UID.
    pub const GET_CARD_UID: u8 = 0x51;
    /// SetConfiguration: 1-byte option header, encrypted data.
    pub const SET_CONFIGURATION: u8 = 0x5C;
    /// ChangeFileSettings: 1-byte file number header, encrypted settings.
    pub const CHANGE_FILE_SETTINGS: u8 = 0x5F;
    /// WriteData: file number + offset + length header, data per file mode.
    pub const WRITE_DATA: u8 = 0x8D;
    /// ReadData: file number + offset + length header.
    pub const READ_DATA: u8 = 0xAD;
    /// GetFileSettings: 1-byte file number header, MAC-protected.
    pub const GET_FILE_SETTINGS: u8 = 0xF5;
}

/// Communication mode of one command exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommMode {
    /// Data travels unmodified; a MAC is appended only for commands whose
    /// rule marks them plain-but-authenticated.
    Plain,
    /// Data travels unmodified with a truncated MAC appended.
    Mac,
    /// Data is padded and CBC-encrypted, then MACed.
    Full,
}

/// How the 8-byte IV suffix is assembled for one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IvSuffix {
    /// Instruction byte, then the header bytes, zero-padded to 8 bytes.
    CommandHeader,
    /// Eight zero bytes, regardless of header content.
    Zero,
}

/// Legal length of a header or data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthRule {
    /// Any length (bounded only by the frame format).
    Any,
    /// Exactly this many bytes.
    Exact(usize),
    /// At least one byte.
    NonEmpty,
}

impl LengthRule {
    const fn allows(self, len: usize) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => len == expected,
            Self::NonEmpty => len > 0,
        }
    }
}

/// Framing rule for one native command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramingRule {
    /// Instruction byte this rule governs.
    pub ins: u8,
    /// Command name, for diagnostics.
    pub name: &'static str,
    /// IV suffix policy for the request direction.
    pub cmd_iv_suffix: IvSuffix,
    /// IV suffix policy for the response direction. Kept explicit rather
    /// than derived from the request side; the two are not symmetric.
    pub resp_iv_suffix: IvSuffix,
    /// Whether a Plain-mode exchange still appends a MAC.
    pub plain_authenticated: bool,
    /// Legal header length.
    pub header_len: LengthRule,
    /// Legal data length.
    pub data_len: LengthRule,
}

/// The closed command table. Versioned against the card's command set:
/// adding a command means adding a row.
pub static RULES: &[FramingRule] = &[
    FramingRule {
        ins: ins::GET_CARD_UID,
        name: "GetCardUID",
        cmd_iv_suffix: IvSuffix::CommandHeader,
        resp_iv_suffix: IvSuffix::Zero,
        plain_authenticated: true,
        header_len: LengthRule::Exact(0),
        data_len: LengthRule::Exact(0),
    },
    FramingRule {
        ins: ins::SET_CONFIGURATION,
        name: "SetConfiguration",
        cmd_iv_suffix: IvSuffix::CommandHeader,
        resp_iv_suffix: IvSuffix::Zero,
        plain_authenticated: true,
        header_len: LengthRule::Exact(1),
        data_len: LengthRule::NonEmpty,
    },
    FramingRule {
        ins: ins::CHANGE_FILE_SETTINGS,
        name: "ChangeFileSettings",
        // The incident command: all-zero suffix in both directions.
        cmd_iv_suffix: IvSuffix::Zero,
        resp_iv_suffix: IvSuffix::Zero,
        plain_authenticated: true,
        header_len: LengthRule::Exact(1),
        data_len: LengthRule::NonEmpty,
    },
    FramingRule {
        ins: ins::WRITE_DATA,
        name: "WriteData",
        cmd_iv_suffix: IvSuffix::CommandHeader,
        resp_iv_suffix: IvSuffix::Zero,
        plain_authenticated: true,
        header_len: LengthRule::Exact(7),
        data_len: LengthRule::NonEmpty,
    },
    FramingRule {
        ins: ins::READ_DATA,
        name: "ReadData",
        cmd_iv_suffix: IvSuffix::CommandHeader,
        resp_iv_suffix: IvSuffix::Zero,
        plain_authenticated: true,
        header_len: LengthRule::Exact(7),
        data_len: LengthRule::Exact(0),
    },
    FramingRule {
        ins: ins::GET_FILE_SETTINGS,
        name: "GetFileSettings",
        cmd_iv_suffix: IvSuffix::CommandHeader,
        resp_iv_suffix: IvSuffix::Zero,
        plain_authenticated: true,
        header_len: LengthRule::Exact(1),
        data_len: LengthRule::Exact(0),
    },
];

/// Look up the framing rule for an instruction byte.
pub fn lookup(ins: u8) -> Result<&'static FramingRule, Error> {
    RULES
        .iter()
        .find(|rule| rule.ins == ins)
        .ok_or(Error::UnknownCommand(ins))
}

impl FramingRule {
    /// Validate the caller-supplied header and data against this rule.
    pub(crate) fn check_lengths(&self, header: &[u8], data: &[u8]) -> Result<(), Error> {
        if !self.header_len.allows(header.len()) {
            return Err(Error::InvalidPayloadLength {
                ins: self.ins,
                field: "header",
                actual: header.len(),
            });
        }
        if !self.data_len.allows(data.len()) {
            return Err(Error::InvalidPayloadLength {
                ins: self.ins,
                field: "data",
                actual: data.len(),
            });
        }
        Ok(())
    }
}

/// Byte-order label opening the request-direction IV input.
const IV_LABEL_CMD: [u8; 2] = [0xA5, 0x5A];
/// Byte-order label opening the response-direction IV input. Swapped, not
/// derived by mutating the request label.
const IV_LABEL_RESP: [u8; 2] = [0x5A, 0xA5];

fn iv_input(
    label: [u8; 2],
    suffix: IvSuffix,
    ins: u8,
    header: &[u8],
    ti: [u8; 4],
    ctr_le: [u8; 2],
) -> [u8; BLOCK_LEN] {
    let mut input = [0u8; BLOCK_LEN];
    input[0..2].copy_from_slice(&label);
    input[2..6].copy_from_slice(&ti);
    input[6..8].copy_from_slice(&ctr_le);
    if suffix == IvSuffix::CommandHeader {
        // Rules folding the header into the suffix must bound it to 7 bytes
        // via their length rule; anything longer cannot be represented.
        debug_assert!(
            header.len() <= 7,
            "header of {} bytes does not fit the IV suffix",
            header.len()
        );
        input[8] = ins;
        let take = header.len().min(7);
        input[9..9 + take].copy_from_slice(&header[..take]);
    }
    input
}

/// Derive the request-direction encryption IV for this command.
pub(crate) fn command_iv(
    rule: &FramingRule,
    keys: &SessionKeys,
    ti: [u8; 4],
    ctr_le: [u8; 2],
    header: &[u8],
) -> [u8; BLOCK_LEN] {
    let input = iv_input(IV_LABEL_CMD, rule.cmd_iv_suffix, rule.ins, header, ti, ctr_le);
    encrypt_block(keys.enc(), input)
}

/// Derive the response-direction decryption IV for this command.
pub(crate) fn response_iv(
    rule: &FramingRule,
    keys: &SessionKeys,
    ti: [u8; 4],
    ctr_le: [u8; 2],
    header: &[u8],
) -> [u8; BLOCK_LEN] {
    let input = iv_input(
        IV_LABEL_RESP,
        rule.resp_iv_suffix,
        rule.ins,
        header,
        ti,
        ctr_le,
    );
    encrypt_block(keys.enc(), input)
}
