//! One authenticated exchange at a time over a card transport
//!
//! [`SecureChannel`] owns the transport and the session and runs the only
//! legal ordering: encode, transmit, decode, and commit the counter solely
//! after the response verified. Any failure after the frame left for the
//! card invalidates the session — once a frame is in flight the card's own
//! counter state cannot be queried, so retrying with the old counter risks
//! a desynchronization that looks like an authentication lockout. Failures
//! during encoding leave the session intact: nothing was sent, so the
//! counter state is still known. The exclusive `&mut self` borrow is what
//! keeps a session single-writer.

use bytes::Bytes;
use ntag424_apdu::{CardTransport, Response};
use tracing::{debug, warn};

use crate::registry::CommMode;
use crate::session::Session;
use crate::{Error, Result, decoder, encoder};

/// A session bound to the transport it talks through.
pub struct SecureChannel<T: CardTransport> {
    transport: T,
    session: Session,
}

impl<T: CardTransport> core::fmt::Debug for SecureChannel<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SecureChannel")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<T: CardTransport> SecureChannel<T> {
    /// Bind an authenticated session to a transport.
    pub const fn new(transport: T, session: Session) -> Self {
        Self { transport, session }
    }

    /// The session state, read-only.
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Tear the channel apart, returning the transport. The session is
    /// invalidated on the way out.
    pub fn into_transport(mut self) -> T {
        self.session.invalidate();
        self.transport
    }

    /// Run one full command exchange and return the verified, decrypted
    /// response data.
    ///
    /// On success the command counter has been committed. Encoding failures
    /// (unknown command, length violation) are returned without touching the
    /// session: no frame was sent. Any error once the frame is in flight —
    /// transport failure, card error status, MAC or decryption failure —
    /// invalidates the session and a fresh authentication is required.
    pub fn execute(
        &mut self,
        ins: u8,
        header: &[u8],
        data: &[u8],
        mode: CommMode,
    ) -> Result<Bytes> {
        let wire = encoder::encode(ins, header, data, mode, &self.session)?;

        match self.exchange(&wire, ins, header, mode) {
            Ok(plain) => Ok(plain),
            Err(err) => {
                warn!(%err, "exchange failed; invalidating session");
                self.session.invalidate();
                Err(err)
            }
        }
    }

    fn exchange(&mut self, wire: &[u8], ins: u8, header: &[u8], mode: CommMode) -> Result<Bytes> {
        let raw = self
            .transport
            .transmit_raw(wire)
            .map_err(Error::Apdu)?;
        let response = Response::from_bytes(&raw).map_err(Error::Apdu)?;

        let plain = decoder::decode(&response, ins, header, mode, &self.session)?;

        // Only a verified response confirms the card consumed the counter.
        self.session.commit()?;
        debug!(counter = self.session.counter(), "exchange committed");
        Ok(plain)
    }
}
