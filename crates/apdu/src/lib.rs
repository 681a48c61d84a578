//! APDU framing for the NTAG 424 DNA / DESFire wrapped-frame format
//!
//! This crate provides the transport-level byte layer used by the secure
//! messaging crate: building wrapped command APDUs (`CLA 0x90`, single-byte
//! Lc and Le), splitting response frames into payload and status word, and
//! the [`CardTransport`] seam behind which the physical reader lives.
//!
//! The crate knows nothing about session keys, MACs or encryption; it only
//! moves bytes into and out of the ISO 7816-4 short-form frame shape that
//! the card family speaks.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

pub mod command;
pub mod error;
pub mod response;
pub mod transport;

pub use command::Command;
pub use error::Error;
pub use response::{Response, StatusWord};
pub use transport::CardTransport;
