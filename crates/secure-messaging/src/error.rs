//! Error types for secure messaging
//!
//! The taxonomy deliberately keeps response-authentication failures and
//! decryption failures apart: a [`Error::MacVerificationFailed`] almost
//! always means the *request-side* IV or MAC-input composition is wrong,
//! while [`Error::DecryptionFailed`] points at the response-direction IV or
//! padding handling.

use crate::status::CardStatus;

/// Result type for secure messaging operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for secure messaging operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The session was invalidated and cannot be used again
    #[error("session invalidated; a fresh authentication is required")]
    SessionInvalid,

    /// No framing rule exists for the instruction byte
    #[error("no framing rule for command {0:#04X}")]
    UnknownCommand(u8),

    /// Header or data length violates the command's framing rule
    #[error("invalid {field} length for command {ins:#04X}: {actual}")]
    InvalidPayloadLength {
        /// Instruction byte of the offending command
        ins: u8,
        /// Which field violated the rule (`"header"` or `"data"`)
        field: &'static str,
        /// Length actually supplied
        actual: usize,
    },

    /// Response MAC did not verify against the recomputed value
    #[error("response MAC verification failed")]
    MacVerificationFailed,

    /// Response payload decrypted to a malformed plaintext
    #[error("response decryption failed")]
    DecryptionFailed,

    /// The card answered with a non-success status word
    #[error("card returned error status: {0}")]
    CardStatus(CardStatus),

    /// A verified response payload did not have the expected structure
    #[error("invalid response data: {0}")]
    InvalidData(&'static str),

    /// Frame-level error from the APDU layer
    #[error(transparent)]
    Apdu(#[from] ntag424_apdu::Error),
}
