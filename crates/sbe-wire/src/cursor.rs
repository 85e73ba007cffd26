use crate::buffer::{self, ByteOrder};
use crate::error::WireError;
use crate::varint::{read_varint, write_varint};

// Frame primitives are always little-endian. Lengths and counts are LEB128
// varints; strings are a varint byte length followed by UTF-8.

/// Append-only writer for IR frame bodies.
#[derive(Debug, Default)]
pub struct FrameWriter {
    buf: Vec<u8>,
}

impl FrameWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Doubles are written by bit pattern so NaN payloads survive.
    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_bits().to_le_bytes());
    }

    pub fn write_varint(&mut self, value: u64) {
        write_varint(value, &mut self.buf);
    }

    /// Varint length followed by the raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_str(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    /// Presence byte (0 or 1), then the string when present.
    pub fn write_opt_str(&mut self, value: Option<&str>) {
        match value {
            Some(s) => {
                self.write_u8(1);
                self.write_str(s);
            }
            None => self.write_u8(0),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Forward-only reader over an IR frame body.
///
/// `base` is the absolute offset of `buf[0]` within the whole frame, so
/// every error reports a position a user can find in the file.
#[derive(Debug)]
pub struct FrameReader<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> FrameReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_base(buf, 0)
    }

    pub fn with_base(buf: &'a [u8], base: usize) -> Self {
        Self { buf, pos: 0, base }
    }

    /// Absolute frame offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        let bytes = buffer::slice_at(self.buf, self.pos, len).map_err(|_| WireError::UnexpectedEof {
            offset: self.offset(),
        })?;
        self.pos += len;
        Ok(bytes)
    }

    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] at the end of the frame.
    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if fewer than 4 bytes remain.
    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        buffer::read_i32(self.take(4)?, 0, ByteOrder::LittleEndian)
    }

    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        buffer::read_u32(self.take(4)?, 0, ByteOrder::LittleEndian)
    }

    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if fewer than 8 bytes remain.
    pub fn read_i64(&mut self) -> Result<i64, WireError> {
        buffer::read_i64(self.take(8)?, 0, ByteOrder::LittleEndian)
    }

    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if fewer than 8 bytes remain.
    pub fn read_f64(&mut self) -> Result<f64, WireError> {
        let bits = buffer::read_u64(self.take(8)?, 0, ByteOrder::LittleEndian)?;
        Ok(f64::from_bits(bits))
    }

    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] or [`WireError::VarintTooLong`], with
    /// absolute offsets.
    pub fn read_varint(&mut self) -> Result<u64, WireError> {
        let (value, consumed) = read_varint(self.buf, self.pos).map_err(|e| match e {
            WireError::UnexpectedEof { offset } => WireError::UnexpectedEof {
                offset: self.base + offset,
            },
            WireError::VarintTooLong { offset } => WireError::VarintTooLong {
                offset: self.base + offset,
            },
            other => other,
        })?;
        self.pos += consumed;
        Ok(value)
    }

    /// Read a varint that counts something held in the remaining input,
    /// so a corrupt length fails here instead of triggering a huge
    /// allocation later.
    ///
    /// # Errors
    ///
    /// [`WireError::LengthOverflow`] if the count exceeds the remaining
    /// bytes, plus any error from [`read_varint`](Self::read_varint).
    pub fn read_len(&mut self) -> Result<usize, WireError> {
        let offset = self.offset();
        let value = self.read_varint()?;
        match usize::try_from(value) {
            Ok(len) if len <= self.remaining() => Ok(len),
            _ => Err(WireError::LengthOverflow { offset, value }),
        }
    }

    /// # Errors
    ///
    /// Length errors from [`read_len`](Self::read_len).
    pub fn read_bytes(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.read_len()?;
        self.take(len)
    }

    /// # Errors
    ///
    /// [`WireError::InvalidUtf8`] pointing at the length prefix, plus any
    /// length error.
    pub fn read_str(&mut self) -> Result<String, WireError> {
        let offset = self.offset();
        let bytes = self.read_bytes()?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| WireError::InvalidUtf8 { offset })
    }

    /// Presence byte 0 yields `None`; 1 yields the following string.
    ///
    /// # Errors
    ///
    /// [`WireError::InvalidFlag`] for a presence byte other than 0 or 1,
    /// plus any string error.
    pub fn read_opt_str(&mut self) -> Result<Option<String>, WireError> {
        let offset = self.offset();
        match self.read_u8()? {
            0 => Ok(None),
            1 => self.read_str().map(Some),
            value => Err(WireError::InvalidFlag { offset, value }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_layout_is_little_endian() {
        let mut w = FrameWriter::new();
        w.write_i32(-1);
        w.write_u32(0x0102_0304);
        w.write_str("ab");
        w.write_opt_str(None);
        assert_eq!(
            w.into_inner(),
            vec![0xFF, 0xFF, 0xFF, 0xFF, 0x04, 0x03, 0x02, 0x01, 0x02, b'a', b'b', 0x00]
        );
    }

    #[test]
    fn reader_follows_writer() {
        let mut w = FrameWriter::new();
        w.write_u8(9);
        w.write_i64(i64::MIN);
        w.write_f64(f64::NAN);
        w.write_opt_str(Some("US-ASCII"));
        w.write_bytes(&[1, 2, 3]);
        let bytes = w.into_inner();

        let mut r = FrameReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 9);
        assert_eq!(r.read_i64().unwrap(), i64::MIN);
        assert!(r.read_f64().unwrap().is_nan());
        assert_eq!(r.read_opt_str().unwrap().as_deref(), Some("US-ASCII"));
        assert_eq!(r.read_bytes().unwrap(), &[1, 2, 3]);
        assert!(r.is_empty());
    }

    #[test]
    fn eof_offset_includes_base() {
        let bytes = [0x01, 0x02];
        let mut r = FrameReader::with_base(&bytes, 8);
        r.read_u8().unwrap();
        assert!(matches!(
            r.read_i32(),
            Err(WireError::UnexpectedEof { offset: 9 })
        ));
    }

    #[test]
    fn length_larger_than_input_rejected() {
        // Claims 300 bytes follow; only 1 does.
        let bytes = [0xAC, 0x02, b'x'];
        let mut r = FrameReader::with_base(&bytes, 100);
        assert!(matches!(
            r.read_str(),
            Err(WireError::LengthOverflow {
                offset: 100,
                value: 300
            })
        ));
    }

    #[test]
    fn invalid_utf8_reports_string_offset() {
        let bytes = [0x00, 0x02, 0xC3, 0x28];
        let mut r = FrameReader::new(&bytes);
        r.read_u8().unwrap();
        assert!(matches!(
            r.read_str(),
            Err(WireError::InvalidUtf8 { offset: 1 })
        ));
    }

    #[test]
    fn bad_presence_byte_rejected() {
        let mut r = FrameReader::new(&[0x07]);
        assert!(matches!(
            r.read_opt_str(),
            Err(WireError::InvalidFlag {
                offset: 0,
                value: 0x07
            })
        ));
    }
}
