use crate::error::WireError;

/// Maximum number of bytes a u64 varint can occupy.
/// ceil(64 / 7) = 10 bytes.
pub const MAX_VARINT_BYTES: usize = 10;

/// Append `value` to `out` as an unsigned LEB128 varint.
///
/// Returns the number of bytes appended (1–10).
///
/// | Value   | Encoded bytes        |
/// |---------|----------------------|
/// | 0       | `[0x00]`             |
/// | 127     | `[0x7F]`             |
/// | 128     | `[0x80, 0x01]`       |
/// | 300     | `[0xAC, 0x02]`       |
/// | 16384   | `[0x80, 0x80, 0x01]` |
pub fn write_varint(mut value: u64, out: &mut Vec<u8>) -> usize {
    let start = out.len();
    loop {
        let low = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(low);
            break;
        }
        out.push(low | 0x80);
    }
    out.len() - start
}

/// Decode an unsigned LEB128 varint starting at `offset` in `buf`.
///
/// # Returns
///
/// `(decoded_value, bytes_consumed)` on success.
///
/// # Errors
///
/// - [`WireError::VarintTooLong`] if ten bytes pass without a
///   terminating byte.
/// - [`WireError::UnexpectedEof`] if `buf` ends mid-varint.
pub fn read_varint(buf: &[u8], offset: usize) -> Result<(u64, usize), WireError> {
    let mut result: u64 = 0;
    let tail = buf.get(offset..).unwrap_or_default();

    for (i, &byte) in tail.iter().enumerate() {
        if i >= MAX_VARINT_BYTES {
            return Err(WireError::VarintTooLong { offset });
        }

        // The tenth byte only has room for the top bit of a u64.
        result |= u64::from(byte & 0x7F).checked_shl(7 * i as u32).unwrap_or(0);

        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }

    Err(WireError::UnexpectedEof {
        offset: offset + tail.len(),
    })
}
