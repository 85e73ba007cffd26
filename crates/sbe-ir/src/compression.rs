use std::io::Read;

use crate::error::CodecError;

/// Default zstd compression level (1–22 scale).
const COMPRESSION_LEVEL: i32 = 3;

/// Compress a frame body with zstd.
///
/// Returns `None` when compression would not shrink the body, in which
/// case the encoder stores it raw and leaves the flag clear.
pub(crate) fn compress(data: &[u8]) -> Option<Vec<u8>> {
    let compressed = zstd::encode_all(data, COMPRESSION_LEVEL).ok()?;
    (compressed.len() < data.len()).then_some(compressed)
}

/// Decompress a frame body, stopping as soon as the output passes
/// `limit` bytes.
///
/// # Errors
///
/// - [`CodecError::DecompressFailed`] if the input is not a valid zstd frame.
/// - [`CodecError::DecompressionBomb`] if the output exceeds `limit`.
pub(crate) fn decompress(data: &[u8], limit: usize) -> Result<Vec<u8>, CodecError> {
    let decoder =
        zstd::stream::read::Decoder::new(data).map_err(|e| CodecError::DecompressFailed(e.to_string()))?;
    let mut out = Vec::new();
    decoder
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| CodecError::DecompressFailed(e.to_string()))?;
    if out.len() > limit {
        return Err(CodecError::DecompressionBomb { limit });
    }
    Ok(out)
}
