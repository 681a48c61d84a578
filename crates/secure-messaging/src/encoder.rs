//! Secure message encoder
//!
//! Turns `(instruction, header, data, mode)` plus the session state into the
//! transport-ready wrapped APDU. Pure in the session: the command counter is
//! read but never advanced, so encoding twice without a commit produces
//! byte-identical frames.

use bytes::{BufMut, Bytes, BytesMut};
use ntag424_apdu::Command;
use tracing::{debug, trace};

use crate::crypto::{aes_cmac, cbc_encrypt, truncate_mac};
use crate::registry::{self, CommMode, FramingRule};
use crate::session::Session;
use crate::{Error, Result};

/// Encode one command into its wrapped APDU bytes.
///
/// `header` is the command-specific header (sent in clear, always covered by
/// the MAC); `data` is the logical payload whose treatment depends on `mode`.
pub fn encode(
    ins: u8,
    header: &[u8],
    data: &[u8],
    mode: CommMode,
    session: &Session,
) -> Result<Bytes> {
    encode_with_rule(registry::lookup(ins)?, header, data, mode, session)
}

/// Encode under an explicit framing rule instead of a table lookup.
pub(crate) fn encode_with_rule(
    rule: &FramingRule,
    header: &[u8],
    data: &[u8],
    mode: CommMode,
    session: &Session,
) -> Result<Bytes> {
    let ins = rule.ins;
    rule.check_lengths(header, data)?;

    let keys = session.keys()?;
    let ti = session.transaction_id()?;
    let ctr_le = session.counter_le()?;

    trace!(
        command = rule.name,
        counter = session.counter(),
        ?mode,
        "encoding command"
    );

    // Plain data, or the CBC cryptogram under the request-direction IV.
    let payload = match mode {
        CommMode::Plain | CommMode::Mac => Bytes::copy_from_slice(data),
        CommMode::Full => {
            if data.is_empty() {
                // Data-less Full-mode commands (e.g. GetCardUID) carry no
                // cryptogram; only the response direction is encrypted.
                Bytes::new()
            } else {
                let iv = registry::command_iv(rule, keys, ti, ctr_le, header);
                cbc_encrypt(keys.enc(), &iv, data)
            }
        }
    };

    let with_mac = match mode {
        CommMode::Plain if !rule.plain_authenticated => false,
        _ => true,
    };

    let mac_len = if with_mac { crate::crypto::MAC_LEN } else { 0 };
    let mut frame = BytesMut::with_capacity(header.len() + payload.len() + mac_len);
    frame.put_slice(header);
    frame.put_slice(&payload);

    if with_mac {
        // MAC input: INS ‖ counter(LE) ‖ TI ‖ header ‖ payload. The header
        // is authenticated even though it travels in clear.
        let mut mac_input = BytesMut::with_capacity(7 + header.len() + payload.len());
        mac_input.put_u8(ins);
        mac_input.put_slice(&ctr_le);
        mac_input.put_slice(&ti);
        mac_input.put_slice(header);
        mac_input.put_slice(&payload);
        let mac = truncate_mac(&aes_cmac(keys.mac(), &mac_input));
        frame.put_slice(&mac);
    }

    let wire = Command::wrapped(ins, frame.freeze()).to_bytes()?;
    debug!(command = rule.name, frame = %hex::encode(&wire), "encoded");
    Ok(wire)
}
