//! Thin wrappers over the AES primitives the protocol consumes
//!
//! The block cipher, CBC chaining and CMAC come from the RustCrypto crates;
//! this module only fixes the protocol-specific details on top of them: the
//! `0x80`-marker padding rule and the odd-byte MAC truncation.

use aes::Aes128;
use aes::cipher::{BlockEncrypt, KeyInit};
use bytes::{BufMut, Bytes, BytesMut};
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
use cmac::{Cmac, Mac};
use generic_array::GenericArray;

use crate::Error;

/// AES block and session-key length in bytes.
pub const BLOCK_LEN: usize = 16;

/// Length of the truncated MAC carried on the wire.
pub const MAC_LEN: usize = 8;

type Encryptor = cbc::Encryptor<Aes128>;
type Decryptor = cbc::Decryptor<Aes128>;

/// Encrypt a single block with no chaining (used for IV derivation).
pub fn encrypt_block(key: &[u8; BLOCK_LEN], block: [u8; BLOCK_LEN]) -> [u8; BLOCK_LEN] {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut block = GenericArray::from(block);
    cipher.encrypt_block(&mut block);
    block.into()
}

/// AES-CMAC over arbitrary-length input.
pub fn aes_cmac(key: &[u8; BLOCK_LEN], data: &[u8]) -> [u8; BLOCK_LEN] {
    let mut mac = <Cmac<Aes128> as Mac>::new(GenericArray::from_slice(key));
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Truncate a full 16-byte MAC to the 8 bytes sent on the wire: the bytes at
/// odd positions 1, 3, ..., 15.
pub fn truncate_mac(full: &[u8; BLOCK_LEN]) -> [u8; MAC_LEN] {
    let mut out = [0u8; MAC_LEN];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = full[2 * i + 1];
    }
    out
}

/// Pad plaintext for encryption: one mandatory `0x80` marker byte, then
/// zeros up to the next block boundary. At least one byte is always added,
/// so already-aligned input grows by a whole block.
pub(crate) fn pad(data: &[u8]) -> BytesMut {
    let padded_len = (data.len() / BLOCK_LEN + 1) * BLOCK_LEN;
    let mut buf = BytesMut::with_capacity(padded_len);
    buf.put_slice(data);
    buf.put_u8(0x80);
    buf.resize(padded_len, 0x00);
    buf
}

/// Strip the `0x80 00..00` padding trailer, failing on anything malformed.
pub(crate) fn unpad(mut buf: BytesMut) -> Result<BytesMut, Error> {
    let marker = buf
        .iter()
        .rposition(|&b| b != 0x00)
        .ok_or(Error::DecryptionFailed)?;
    // The marker must be 0x80 and must sit inside the final block.
    if buf[marker] != 0x80 || buf.len() - marker > BLOCK_LEN {
        return Err(Error::DecryptionFailed);
    }
    buf.truncate(marker);
    Ok(buf)
}

/// CBC-encrypt under the given IV, applying the marker padding first.
pub fn cbc_encrypt(key: &[u8; BLOCK_LEN], iv: &[u8; BLOCK_LEN], plaintext: &[u8]) -> Bytes {
    let mut buf = pad(plaintext);
    let len = buf.len();
    Encryptor::new(GenericArray::from_slice(key), GenericArray::from_slice(iv))
        .encrypt_padded_mut::<NoPadding>(&mut buf, len)
        // buf is a whole number of blocks by construction
        .unwrap();
    buf.freeze()
}

/// CBC-decrypt under the given IV and strip the marker padding.
pub fn cbc_decrypt(
    key: &[u8; BLOCK_LEN],
    iv: &[u8; BLOCK_LEN],
    ciphertext: &[u8],
) -> Result<Bytes, Error> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(Error::DecryptionFailed);
    }
    let mut buf = BytesMut::from(ciphertext);
    Decryptor::new(GenericArray::from_slice(key), GenericArray::from_slice(iv))
        .decrypt_padded_mut::<NoPadding>(&mut buf)
        .map_err(|_| Error::DecryptionFailed)?;
    Ok(unpad(buf)?.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // NIST FIPS-197 / SP 800-38A AES-128 key used across the vectors below.
    const KEY: [u8; 16] = hex!("2b7e151628aed2a6abf7158809cf4f3c");

    #[test]
    fn single_block_matches_fips197_vector() {
        let out = encrypt_block(&KEY, hex!("6bc1bee22e409f96e93d7e117393172a"));
        assert_eq!(out, hex!("3ad77bb40d7a3660a89ecaf32466ef97"));
    }

    #[test]
    fn cmac_matches_rfc4493_vectors() {
        assert_eq!(
            aes_cmac(&KEY, &[]),
            hex!("bb1d6929e95937287fa37d129b756746")
        );
        assert_eq!(
            aes_cmac(&KEY, &hex!("6bc1bee22e409f96e93d7e117393172a")),
            hex!("070a16b46b4d4144f79bdd9dd04a287c")
        );
        assert_eq!(
            aes_cmac(
                &KEY,
                &hex!(
                    "6bc1bee22e409f96e93d7e117393172a"
                    "ae2d8a571e03ac9c9eb76fac45af8e51"
                    "30c81c46a35ce411"
                )
            ),
            hex!("dfa66747de9ae63030ca32611497c827")
        );
    }

    #[test]
    fn truncation_takes_odd_positions() {
        let full: [u8; 16] = core::array::from_fn(|i| i as u8);
        assert_eq!(truncate_mac(&full), [1, 3, 5, 7, 9, 11, 13, 15]);
    }

    #[test]
    fn padding_law() {
        for len in 0..=31 {
            let data = vec![0xAAu8; len];
            let padded = pad(&data);
            assert_eq!(padded.len() % BLOCK_LEN, 0);
            assert!(padded.len() > len);
            assert!(padded.len() - len <= BLOCK_LEN);
            assert_eq!(padded[len], 0x80);
            assert!(padded[len + 1..].iter().all(|&b| b == 0x00));
        }
    }

    #[test]
    fn cbc_round_trip_all_short_lengths() {
        let iv = hex!("000102030405060708090a0b0c0d0e0f");
        for len in 0..=31 {
            let data: Vec<u8> = (0..len as u8).collect();
            let ct = cbc_encrypt(&KEY, &iv, &data);
            assert_eq!(ct.len() % BLOCK_LEN, 0);
            let pt = cbc_decrypt(&KEY, &iv, &ct).unwrap();
            assert_eq!(pt.as_ref(), data.as_slice());
        }
    }

    #[test]
    fn unpad_rejects_malformed_trailers() {
        // All zeros: no marker anywhere.
        assert_eq!(
            unpad(BytesMut::from(&[0u8; 16][..])),
            Err(Error::DecryptionFailed)
        );
        // Wrong marker byte.
        let mut buf = [0u8; 16];
        buf[10] = 0x7f;
        assert_eq!(
            unpad(BytesMut::from(&buf[..])),
            Err(Error::DecryptionFailed)
        );
        // Marker outside the final block.
        let mut buf = [0u8; 32];
        buf[3] = 0x80;
        assert_eq!(
            unpad(BytesMut::from(&buf[..])),
            Err(Error::DecryptionFailed)
        );
    }

    #[test]
    fn decrypt_rejects_partial_blocks() {
        let iv = [0u8; 16];
        assert_eq!(cbc_decrypt(&KEY, &iv, &[]), Err(Error::DecryptionFailed));
        assert_eq!(
            cbc_decrypt(&KEY, &iv, &[0u8; 15]),
            Err(Error::DecryptionFailed)
        );
    }
}
