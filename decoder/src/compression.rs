use std::io::Read;

use bytes::{Buf, Bytes};
use flate2::bufread::GzDecoder;

use crate::error::DecodeError;

static GZIP_MAGIC_NUMBERS: [u8; 3] = [0x1f, 0x8b, 8];

/// Gunzips `bytes` when they start with the gzip magic bytes and returns them unchanged
/// otherwise. Request headers are never consulted.
pub fn gunzip_if_compressed(bytes: Bytes) -> Result<Bytes, DecodeError> {
    if !bytes.starts_with(&GZIP_MAGIC_NUMBERS) {
        return Ok(bytes);
    }

    let mut out = Vec::new();
    GzDecoder::new(bytes.reader())
        .read_to_end(&mut out)
        .map_err(|e| {
            tracing::error!("failed to decode gzip: {}", e);
            DecodeError::RequestDecodingError(String::from("invalid gzip data"))
        })?;
    Ok(Bytes::from(out))
}
