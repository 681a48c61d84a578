//! Status word classification
//!
//! The card signals failure through its two-byte completion code, and the
//! distinctions matter during development: `IntegrityError` means the local
//! MAC/IV construction is wrong, `ParameterError` means the framing was
//! structurally fine but the payload content was not, and `LengthError`
//! means the assumed command-data layout disagrees with the card's. Mapping
//! these to one opaque "card error" would erase the only diagnostic signal
//! a framing bug produces.

use std::fmt;

use ntag424_apdu::StatusWord;

/// Classified card completion code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStatus {
    /// Operation completed (`0x9100`)
    Success,
    /// Payload content semantically invalid; framing was accepted (`0x919E`)
    ParameterError,
    /// Command-data layout mismatch (`0x917E`)
    LengthError,
    /// MAC or cryptogram rejected by the card: the local IV/MAC construction
    /// is wrong (`0x911E`)
    IntegrityError,
    /// Authentication state insufficient or lost (`0x91AE`)
    AuthenticationError,
    /// Access rights deny the operation (`0x919D`)
    PermissionDenied,
    /// Read/write past the file bounds (`0x91BE`)
    BoundaryError,
    /// Status word outside the card's native `0x91xx` space
    UnknownError(StatusWord),
    /// Native status this crate does not give a name to
    Other(StatusWord),
}

impl CardStatus {
    /// Classify a raw status word.
    pub const fn classify(sw: StatusWord) -> Self {
        if sw.sw1 != 0x91 {
            return Self::UnknownError(sw);
        }
        match sw.sw2 {
            0x00 => Self::Success,
            0x9E => Self::ParameterError,
            0x7E => Self::LengthError,
            0x1E => Self::IntegrityError,
            0xAE => Self::AuthenticationError,
            0x9D => Self::PermissionDenied,
            0xBE => Self::BoundaryError,
            _ => Self::Other(sw),
        }
    }

    /// Whether this status is the success code.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "operation ok (9100)"),
            Self::ParameterError => write!(f, "parameter error (919E)"),
            Self::LengthError => write!(f, "length error (917E)"),
            Self::IntegrityError => write!(f, "integrity error (911E)"),
            Self::AuthenticationError => write!(f, "authentication error (91AE)"),
            Self::PermissionDenied => write!(f, "permission denied (919D)"),
            Self::BoundaryError => write!(f, "boundary error (91BE)"),
            Self::UnknownError(sw) => write!(f, "unknown error ({sw})"),
            Self::Other(sw) => write!(f, "card status {sw}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_per_code() {
        assert_eq!(
            CardStatus::classify(StatusWord::new(0x91, 0x00)),
            CardStatus::Success
        );
        assert_eq!(
            CardStatus::classify(StatusWord::new(0x91, 0x9E)),
            CardStatus::ParameterError
        );
        assert_eq!(
            CardStatus::classify(StatusWord::new(0x91, 0x7E)),
            CardStatus::LengthError
        );
        assert_eq!(
            CardStatus::classify(StatusWord::new(0x91, 0x1E)),
            CardStatus::IntegrityError
        );
        assert_eq!(
            CardStatus::classify(StatusWord::new(0x91, 0xAE)),
            CardStatus::AuthenticationError
        );
    }

    #[test]
    fn residual_codes_stay_distinguishable() {
        let aborted = StatusWord::new(0x91, 0xCA);
        assert_eq!(CardStatus::classify(aborted), CardStatus::Other(aborted));

        let iso = StatusWord::new(0x6A, 0x82);
        assert_eq!(CardStatus::classify(iso), CardStatus::UnknownError(iso));
    }

    #[test]
    fn success_predicate() {
        assert!(CardStatus::classify(StatusWord::new(0x91, 0x00)).is_success());
        assert!(!CardStatus::classify(StatusWord::new(0x91, 0x0C)).is_success());
    }
}
