use crate::error::WireError;

/// Byte order of multi-byte scalars in an encoded message.
///
/// Fixed per schema. The IR frame itself is always little-endian; this
/// only describes the messages the IR decodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// Encode as a single wire byte for the IR frame.
    pub fn wire_id(self) -> u8 {
        match self {
            Self::LittleEndian => 0,
            Self::BigEndian => 1,
        }
    }

    /// Decode a wire byte; `None` for anything but 0 or 1.
    pub fn from_wire_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::LittleEndian),
            1 => Some(Self::BigEndian),
            _ => None,
        }
    }

    /// Schema spelling: `littleEndian` or `bigEndian`.
    pub fn name(self) -> &'static str {
        match self {
            Self::LittleEndian => "littleEndian",
            Self::BigEndian => "bigEndian",
        }
    }
}

/// Borrow `len` bytes starting at `offset`.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if the range crosses the end of `buf` or
/// `offset + len` overflows.
pub fn slice_at(buf: &[u8], offset: usize, len: usize) -> Result<&[u8], WireError> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(WireError::OutOfBounds {
            offset,
            len,
            capacity: buf.len(),
        })
}

/// Mutable counterpart of [`slice_at`].
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if the range crosses the end of `buf`.
pub fn slice_at_mut(buf: &mut [u8], offset: usize, len: usize) -> Result<&mut [u8], WireError> {
    let capacity = buf.len();
    offset
        .checked_add(len)
        .and_then(|end| buf.get_mut(offset..end))
        .ok_or(WireError::OutOfBounds {
            offset,
            len,
            capacity,
        })
}

/// Check that `len` bytes at `offset` lie inside a buffer of `capacity` bytes.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] when they do not.
pub fn check_range(capacity: usize, offset: usize, len: usize) -> Result<(), WireError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(WireError::OutOfBounds {
            offset,
            len,
            capacity,
        }),
    }
}

/// Read one unsigned byte.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if `offset` is past the end of `buf`.
pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8, WireError> {
    Ok(slice_at(buf, offset, 1)?[0])
}

/// Read one signed byte.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if `offset` is past the end of `buf`.
pub fn read_i8(buf: &[u8], offset: usize) -> Result<i8, WireError> {
    Ok(i8::from_ne_bytes([read_u8(buf, offset)?]))
}

/// Write one unsigned byte.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if `offset` is past the end of `buf`.
pub fn write_u8(buf: &mut [u8], offset: usize, value: u8) -> Result<(), WireError> {
    slice_at_mut(buf, offset, 1)?[0] = value;
    Ok(())
}

/// Write one signed byte.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if `offset` is past the end of `buf`.
pub fn write_i8(buf: &mut [u8], offset: usize, value: i8) -> Result<(), WireError> {
    write_u8(buf, offset, value.to_ne_bytes()[0])
}

// ── Multi-byte scalars ────────────────────────────────────────────────
//
// Every fixed-width scalar gets the same read/write pair, differing only
// in type and width, so the pair is stamped out by a macro.

macro_rules! scalar_access {
    ($( $read:ident, $write:ident, $ty:ty, $size:literal; )+) => {
        $(
            #[doc = concat!("Read a `", stringify!($ty), "` at `offset` in the given byte order.")]
            ///
            /// # Errors
            ///
            /// [`WireError::OutOfBounds`] if the value crosses the end of `buf`.
            pub fn $read(buf: &[u8], offset: usize, order: ByteOrder) -> Result<$ty, WireError> {
                let mut raw = [0u8; $size];
                raw.copy_from_slice(slice_at(buf, offset, $size)?);
                Ok(match order {
                    ByteOrder::LittleEndian => <$ty>::from_le_bytes(raw),
                    ByteOrder::BigEndian => <$ty>::from_be_bytes(raw),
                })
            }

            #[doc = concat!("Write a `", stringify!($ty), "` at `offset` in the given byte order.")]
            ///
            /// # Errors
            ///
            /// [`WireError::OutOfBounds`] if the value crosses the end of `buf`.
            pub fn $write(
                buf: &mut [u8],
                offset: usize,
                value: $ty,
                order: ByteOrder,
            ) -> Result<(), WireError> {
                let raw = match order {
                    ByteOrder::LittleEndian => value.to_le_bytes(),
                    ByteOrder::BigEndian => value.to_be_bytes(),
                };
                slice_at_mut(buf, offset, $size)?.copy_from_slice(&raw);
                Ok(())
            }
        )+
    };
}

scalar_access! {
    read_u16, write_u16, u16, 2;
    read_i16, write_i16, i16, 2;
    read_u32, write_u32, u32, 4;
    read_i32, write_i32, i32, 4;
    read_u64, write_u64, u64, 8;
    read_i64, write_i64, i64, 8;
    read_f32, write_f32, f32, 4;
    read_f64, write_f64, f64, 8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_respect_byte_order() {
        let buf = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(read_u16(&buf, 0, ByteOrder::LittleEndian).unwrap(), 0x0201);
        assert_eq!(read_u16(&buf, 0, ByteOrder::BigEndian).unwrap(), 0x0102);
        assert_eq!(read_u32(&buf, 0, ByteOrder::BigEndian).unwrap(), 0x0102_0304);
    }

    #[test]
    fn write_then_read_at_offset() {
        let mut buf = [0u8; 12];
        write_i64(&mut buf, 4, -42, ByteOrder::BigEndian).unwrap();
        assert_eq!(read_i64(&buf, 4, ByteOrder::BigEndian).unwrap(), -42);
        assert_eq!(&buf[..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn read_past_end_reports_capacity() {
        let buf = [0u8; 5];
        let result = read_u32(&buf, 2, ByteOrder::LittleEndian);
        assert!(matches!(
            result,
            Err(WireError::OutOfBounds {
                offset: 2,
                len: 4,
                capacity: 5
            })
        ));
    }

    #[test]
    fn offset_overflow_is_out_of_bounds() {
        let buf = [0u8; 4];
        assert!(slice_at(&buf, usize::MAX, 2).is_err());
        assert!(check_range(4, usize::MAX, 1).is_err());
    }

    #[test]
    fn signed_byte_roundtrip() {
        let mut buf = [0u8; 1];
        write_i8(&mut buf, 0, -128).unwrap();
        assert_eq!(buf[0], 0x80);
        assert_eq!(read_i8(&buf, 0).unwrap(), -128);
    }

    #[test]
    fn byte_order_wire_ids() {
        assert_eq!(ByteOrder::from_wire_id(1), Some(ByteOrder::BigEndian));
        assert_eq!(ByteOrder::from_wire_id(7), None);
        assert_eq!(ByteOrder::default(), ByteOrder::LittleEndian);
    }
}
