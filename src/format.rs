//! Codecs for the signed cookie wire format.
//!
//! Django strips `=` padding from every base64 segment it emits and encodes the signing timestamp
//! in base62. These helpers are public mostly for testing and debugging.

use base64::{
    Engine as _,
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};

use crate::error::{DecodeError, Result};

const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// URL-safe base64 with the trailing `=` padding removed.
pub fn base64_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode URL-safe base64 whose padding was stripped.
///
/// Padding is restored up to the next multiple of four before decoding; an input whose length is
/// already a multiple of four gets no padding.
pub fn base64_decode(encoded: &[u8]) -> Result<Vec<u8>> {
    let pad = (4 - encoded.len() % 4) % 4;
    let mut padded = Vec::with_capacity(encoded.len() + pad);
    padded.extend_from_slice(encoded);
    padded.resize(encoded.len() + pad, b'=');

    Ok(URL_SAFE.decode(padded)?)
}

/// Decode a base62 number (`0-9A-Za-z`, most significant digit first).
pub fn base62_decode(encoded: &[u8]) -> Result<u64> {
    if encoded.is_empty() {
        return Err(DecodeError::InvalidTimestamp("empty base62 value".into()));
    }

    encoded.iter().try_fold(0u64, |n, &digit| {
        let index = base62_index(digit).ok_or_else(|| {
            DecodeError::InvalidTimestamp(format!("invalid base62 digit {:?}", char::from(digit)))
        })?;
        n.checked_mul(62)
            .and_then(|n| n.checked_add(index))
            .ok_or_else(|| DecodeError::InvalidTimestamp("base62 value overflows u64".into()))
    })
}

fn base62_index(digit: u8) -> Option<u64> {
    BASE62_ALPHABET
        .iter()
        .position(|&d| d == digit)
        .map(|i| i as u64)
}
