//! StrKey encoding for account ids and secret seeds.
//!
//! A StrKey is the RFC 4648 base32 encoding (no padding) of:
//!
//! ```text
//! version byte (1) || payload (32) || CRC16-XModem of the first 33 bytes (2, little-endian)
//! ```
//!
//! The version byte selects the leading character: account ids start with
//! `G` and secret seeds with `S`. Every StrKey handled here is exactly 56
//! characters long.

use base32::Alphabet;

use crate::error::StrKeyError;

/// RFC 4648 base32 without padding.
const STRKEY_ALPHABET: Alphabet = Alphabet::RFC4648 { padding: false };

/// Characters a StrKey may contain.
const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Encoded length of a 35-byte StrKey body.
pub const STRKEY_LEN: usize = 56;

/// What a StrKey encodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// Ed25519 public key (`G…`).
    AccountId,
    /// Ed25519 secret seed (`S…`).
    Seed,
}

impl KeyKind {
    pub fn version_byte(&self) -> u8 {
        match self {
            KeyKind::AccountId => 6 << 3,
            KeyKind::Seed => 18 << 3,
        }
    }
}

/// Encode a 32-byte key with the given kind.
pub fn encode(kind: KeyKind, key: &[u8; 32]) -> String {
    let mut body = Vec::with_capacity(35);
    body.push(kind.version_byte());
    body.extend_from_slice(key);
    let crc = crc16_xmodem(&body);
    body.extend_from_slice(&crc.to_le_bytes());
    base32::encode(STRKEY_ALPHABET, &body)
}

/// Decode a StrKey, checking the version byte and checksum.
pub fn decode(kind: KeyKind, s: &str) -> Result<[u8; 32], StrKeyError> {
    if s.len() != STRKEY_LEN {
        return Err(StrKeyError::InvalidLength(s.len()));
    }
    let body = base32_decode(s)?;

    if body[0] != kind.version_byte() {
        return Err(StrKeyError::InvalidVersion(body[0]));
    }

    let expected = crc16_xmodem(&body[..33]);
    let actual = u16::from_le_bytes([body[33], body[34]]);
    if expected != actual {
        return Err(StrKeyError::InvalidChecksum);
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&body[1..33]);
    Ok(key)
}

/// Cheap syntactic check that `s` is a well-formed account id.
pub fn is_valid_account_id(s: &str) -> bool {
    decode(KeyKind::AccountId, s).is_ok()
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Decode exactly [`STRKEY_LEN`] characters into 35 bytes.
fn base32_decode(s: &str) -> Result<[u8; 35], StrKeyError> {
    // The codec folds lowercase into the alphabet; StrKeys are uppercase only.
    if let Some(c) = s.chars().find(|c| !ALPHABET.contains(*c)) {
        return Err(StrKeyError::InvalidCharacter(c));
    }
    let bytes = base32::decode(STRKEY_ALPHABET, s).ok_or(StrKeyError::InvalidLength(s.len()))?;
    bytes
        .try_into()
        .map_err(|_| StrKeyError::InvalidLength(s.len()))
}
