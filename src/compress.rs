use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::{
    error::{DecodeError, Result},
    format,
};

/// Leading byte Django adds when the payload is zlib-compressed.
const COMPRESSED_MARKER: u8 = b'.';

/// Strip the compression marker, base64-decode and, if marked, inflate the payload.
///
/// Inflated output larger than `max_bytes` is rejected.
pub(crate) fn decompress_payload(payload: &str, max_bytes: usize) -> Result<Vec<u8>> {
    let (compressed, encoded) = match payload.as_bytes() {
        [COMPRESSED_MARKER, rest @ ..] => (true, rest),
        bytes => (false, bytes),
    };

    let decoded = format::base64_decode(encoded)?;
    if !compressed {
        return Ok(decoded);
    }

    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut inflated = Vec::new();
    ZlibDecoder::new(decoded.as_slice())
        .take(limit)
        .read_to_end(&mut inflated)
        .map_err(|err| DecodeError::Decompression(err.to_string()))?;

    if inflated.len() > max_bytes {
        return Err(DecodeError::Decompression(format!(
            "inflated payload exceeds {max_bytes} bytes"
        )));
    }

    Ok(inflated)
}
