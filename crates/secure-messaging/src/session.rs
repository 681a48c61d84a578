//! Session state established by the EV2 authentication handshake
//!
//! The handshake itself lives outside this crate; what it produces — the two
//! session keys, the 4-byte transaction identifier and a command counter at
//! zero — is what a [`Session`] holds. The counter is the protocol's replay
//! anchor: it is read into every frame, but only advanced by [`Session::commit`]
//! after the response has verified. Encoding the same command twice without a
//! commit therefore yields byte-identical frames.

use zeroize::Zeroize;

use crate::Error;
use crate::crypto::BLOCK_LEN;

/// The two AES-128 session keys derived by the handshake.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SessionKeys {
    enc: [u8; BLOCK_LEN],
    mac: [u8; BLOCK_LEN],
}

impl SessionKeys {
    /// Create a key set from the handshake output.
    pub const fn new(enc: [u8; BLOCK_LEN], mac: [u8; BLOCK_LEN]) -> Self {
        Self { enc, mac }
    }

    /// The session encryption key.
    pub(crate) const fn enc(&self) -> &[u8; BLOCK_LEN] {
        &self.enc
    }

    /// The session MAC key.
    pub(crate) const fn mac(&self) -> &[u8; BLOCK_LEN] {
        &self.mac
    }
}

impl core::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Key material stays out of logs.
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

/// Mutable per-session state: keys, transaction identifier and the strictly
/// monotonic command counter.
///
/// A session is exclusively owned; the encode → transmit → decode → commit
/// sequence must run under one `&mut` borrow. Once invalidated it can never
/// be used again — a fresh handshake is the only recovery.
#[derive(Debug, Clone)]
pub struct Session {
    keys: SessionKeys,
    ti: [u8; 4],
    cmd_counter: u16,
    valid: bool,
}

impl Session {
    /// Create a session from the authentication handshake output.
    /// The command counter starts at zero.
    pub const fn new(ti: [u8; 4], keys: SessionKeys) -> Self {
        Self {
            keys,
            ti,
            cmd_counter: 0,
            valid: true,
        }
    }

    /// Whether the session is still usable.
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// The current counter value, for diagnostics.
    pub const fn counter(&self) -> u16 {
        self.cmd_counter
    }

    /// The session keys, or [`Error::SessionInvalid`] after invalidation.
    pub(crate) const fn keys(&self) -> Result<&SessionKeys, Error> {
        if !self.valid {
            return Err(Error::SessionInvalid);
        }
        Ok(&self.keys)
    }

    /// The transaction identifier fixed at authentication time.
    pub fn transaction_id(&self) -> Result<[u8; 4], Error> {
        if !self.valid {
            return Err(Error::SessionInvalid);
        }
        Ok(self.ti)
    }

    /// Little-endian encoding of the command counter, without mutation.
    pub fn counter_le(&self) -> Result<[u8; 2], Error> {
        if !self.valid {
            return Err(Error::SessionInvalid);
        }
        Ok(self.cmd_counter.to_le_bytes())
    }

    /// Advance the counter by one. Only callable after the card confirmed
    /// the command; the channel layer enforces that ordering. A counter that
    /// would wrap ends the session instead.
    pub fn commit(&mut self) -> Result<(), Error> {
        if !self.valid {
            return Err(Error::SessionInvalid);
        }
        match self.cmd_counter.checked_add(1) {
            Some(next) => {
                self.cmd_counter = next;
                Ok(())
            }
            None => {
                self.invalidate();
                Err(Error::SessionInvalid)
            }
        }
    }

    /// Mark the session unusable. Idempotent.
    pub fn invalidate(&mut self) {
        self.valid = false;
        self.keys.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn session() -> Session {
        Session::new(
            hex!("7A21085E"),
            SessionKeys::new(
                hex!("1309C877509E5A215007FF0ED19CA564"),
                hex!("4C6626F5E72EA694202139295C7A7FC7"),
            ),
        )
    }

    #[test]
    fn counter_advances_only_on_commit() {
        let mut s = session();
        assert_eq!(s.counter_le().unwrap(), [0x00, 0x00]);
        assert_eq!(s.counter_le().unwrap(), [0x00, 0x00]);
        s.commit().unwrap();
        assert_eq!(s.counter_le().unwrap(), [0x01, 0x00]);
        assert_eq!(s.counter(), 1);
    }

    #[test]
    fn counter_encoding_is_little_endian() {
        let mut s = session();
        for _ in 0..0x1234 {
            s.commit().unwrap();
        }
        assert_eq!(s.counter_le().unwrap(), [0x34, 0x12]);
    }

    #[test]
    fn invalidation_is_terminal_and_idempotent() {
        let mut s = session();
        s.invalidate();
        s.invalidate();
        assert!(!s.is_valid());
        assert_eq!(s.counter_le(), Err(Error::SessionInvalid));
        assert_eq!(s.transaction_id(), Err(Error::SessionInvalid));
        assert_eq!(s.commit(), Err(Error::SessionInvalid));
    }

    #[test]
    fn counter_exhaustion_invalidates() {
        let mut s = session();
        s.cmd_counter = u16::MAX;
        assert_eq!(s.commit(), Err(Error::SessionInvalid));
        assert!(!s.is_valid());
    }

    #[test]
    fn debug_never_prints_key_material() {
        let s = session();
        let out = format!("{s:?}");
        assert!(!out.contains("1309C877"));
        assert!(!out.contains("13, 09"));
    }
}
