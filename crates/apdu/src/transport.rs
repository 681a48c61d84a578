//! Transport seam between frame construction and the physical reader
//!
//! The secure messaging layer never performs I/O itself; it hands a finished
//! frame to a [`CardTransport`] and gets the raw response frame back. PC/SC,
//! NFC stacks or test doubles all live behind this trait.

use bytes::Bytes;
use tracing::trace;

use crate::Error;

/// A byte-level exchange with one card.
///
/// Implementations must report "no response received" as an `Err`, never as
/// an empty response: the caller cannot tell whether the card advanced its
/// internal state in that case and has to treat the session as lost.
pub trait CardTransport {
    /// Send one command frame and return the raw response frame
    /// (payload plus the two status bytes).
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, Error>;

    /// Reset the transport to its initial state.
    fn reset(&mut self) -> Result<(), Error>;
}

impl<T: CardTransport + ?Sized> CardTransport for &mut T {
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, Error> {
        trace!(command = %hex::encode(command), "transmit");
        (**self).transmit_raw(command)
    }

    fn reset(&mut self) -> Result<(), Error> {
        (**self).reset()
    }
}
