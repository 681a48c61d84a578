//! Secure message decoder
//!
//! Verifies the trailing MAC of a card response and, in Full mode, decrypts
//! the payload under the response-direction IV. The two failure modes stay
//! distinct on purpose: a bad MAC points at the request-side framing, a bad
//! padding trailer after decryption points at the response-direction IV.
//! The decoder never advances the command counter; committing is the
//! caller's move once this function has returned successfully.

use bytes::{BufMut, Bytes, BytesMut};
use ntag424_apdu::Response;
use tracing::{debug, warn};

use crate::crypto::{MAC_LEN, aes_cmac, cbc_decrypt, truncate_mac};
use crate::registry::{self, CommMode, FramingRule};
use crate::session::Session;
use crate::status::CardStatus;
use crate::{Error, Result};

/// Verify and decrypt one card response.
///
/// `ins`, `header` and `mode` must be the values the request was encoded
/// with; the response MAC is bound to the same counter value the request
/// used.
pub fn decode(
    response: &Response,
    ins: u8,
    header: &[u8],
    mode: CommMode,
    session: &Session,
) -> Result<Bytes> {
    decode_with_rule(response, registry::lookup(ins)?, header, mode, session)
}

/// Decode under an explicit framing rule instead of a table lookup.
pub(crate) fn decode_with_rule(
    response: &Response,
    rule: &FramingRule,
    header: &[u8],
    mode: CommMode,
    session: &Session,
) -> Result<Bytes> {
    let status = CardStatus::classify(response.status());
    if !status.is_success() {
        // Error responses carry no MAC; surface the classified code as-is.
        return Err(Error::CardStatus(status));
    }

    let keys = session.keys()?;
    let ti = session.transaction_id()?;
    let ctr_le = session.counter_le()?;

    if mode == CommMode::Plain && !rule.plain_authenticated {
        return Ok(response.payload().clone());
    }

    let payload = response.payload();
    if payload.len() < MAC_LEN {
        warn!(command = rule.name, "response shorter than its MAC");
        return Err(Error::MacVerificationFailed);
    }
    let (body, received_mac) = payload.split_at(payload.len() - MAC_LEN);

    // Response MAC input: status byte ‖ counter(LE) ‖ TI ‖ payload. The
    // instruction byte is not part of it; the direction asymmetry is part
    // of the protocol, not an artifact of the request-side rule.
    let mut mac_input = BytesMut::with_capacity(7 + body.len());
    mac_input.put_u8(response.status().sw2);
    mac_input.put_slice(&ctr_le);
    mac_input.put_slice(&ti);
    mac_input.put_slice(body);
    let expected = truncate_mac(&aes_cmac(keys.mac(), &mac_input));

    if received_mac != expected {
        warn!(command = rule.name, "response MAC verification failed");
        return Err(Error::MacVerificationFailed);
    }

    let plain = match mode {
        CommMode::Plain | CommMode::Mac => Bytes::copy_from_slice(body),
        CommMode::Full => {
            if body.is_empty() {
                Bytes::new()
            } else {
                let iv = registry::response_iv(rule, keys, ti, ctr_le, header);
                cbc_decrypt(keys.enc(), &iv, body)?
            }
        }
    };

    debug!(
        command = rule.name,
        payload = %hex::encode(&plain),
        "response verified"
    );
    Ok(plain)
}
