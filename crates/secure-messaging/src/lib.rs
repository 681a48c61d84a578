//! EV2 secure messaging for the NTAG 424 DNA / DESFire card family
//!
//! This crate turns a plaintext native command (instruction byte, command
//! header, command data, communication mode) into an authenticated and
//! optionally encrypted wrapped APDU, and verifies and decrypts the card's
//! response. The authentication handshake itself is out of scope: its output
//! — the two session keys and the transaction identifier — is what a
//! [`Session`] is built from.
//!
//! The subtle part of the protocol is that the encryption IV, the MAC input
//! and the padding differ per command and per communication mode. Those
//! per-command rules live in one static [`registry`] table rather than in
//! per-command code paths, so adding or auditing a command's framing is a
//! data change.
//!
//! ## Layering
//!
//! - [`encode`](encoder::encode) / [`decode`](decoder::decode) are pure in
//!   the session: the command counter is read, never advanced.
//! - [`SecureChannel`] drives one full exchange over a
//!   [`CardTransport`](ntag424_apdu::CardTransport) and commits the counter
//!   only after the response verified; every failure invalidates the session
//!   because the card-side counter state is then unknowable.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub mod channel;
pub mod crypto;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod file_settings;
pub mod registry;
pub mod session;
pub mod status;

pub use channel::SecureChannel;
pub use decoder::decode;
pub use encoder::encode;
pub use error::{Error, Result};
pub use file_settings::FileSettings;
pub use registry::{CommMode, FramingRule, IvSuffix, ins};
pub use session::{Session, SessionKeys};
pub use status::CardStatus;
