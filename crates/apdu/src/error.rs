//! Error types for APDU framing

/// Result type for APDU operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for APDU framing operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// Command data field does not fit a single-byte Lc
    #[error("command data too long for short frame: {0} bytes")]
    DataTooLong(usize),

    /// Response frame shorter than the two status bytes
    #[error("response frame too short: {0} bytes")]
    ResponseTooShort(usize),

    /// Transport-level failure reported by the reader layer
    #[error("transport failed: {0}")]
    Transport(&'static str),
}
