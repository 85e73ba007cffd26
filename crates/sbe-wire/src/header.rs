use crate::error::WireError;

/// Magic number: ASCII "SBIR". Stored as raw bytes so byte order never
/// enters into it.
pub const FRAME_MAGIC: [u8; 4] = *b"SBIR";

/// Total frame header size in bytes (fixed).
pub const HEADER_SIZE: usize = 8;

/// Current frame format version major.
pub const VERSION_MAJOR: u8 = 1;

/// Current frame format version minor.
pub const VERSION_MINOR: u8 = 0;

/// Frame flags bitfield.
///
/// Bit layout:
///   bit 0 = compressed (body after the header is one zstd frame)
///   bits 1-7 = reserved (MUST be 0)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameFlags(u8);

impl FrameFlags {
    /// The body is zstd-compressed.
    pub const COMPRESSED: Self = Self(0b0000_0001);

    /// No flags set.
    pub const NONE: Self = Self(0);

    const KNOWN: u8 = Self::COMPRESSED.0;

    pub fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    pub fn is_compressed(self) -> bool {
        self.0 & Self::COMPRESSED.0 != 0
    }
}

/// IR frame header: the first 8 bytes of every serialized IR.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────┐
/// │ Offset │ Size    │ Description                      │
/// ├────────┼─────────┼──────────────────────────────────┤
/// │ 0x00   │ 4 bytes │ Magic: "SBIR"                    │
/// │ 0x04   │ 1 byte  │ Version major                    │
/// │ 0x05   │ 1 byte  │ Version minor                    │
/// │ 0x06   │ 1 byte  │ Flags                            │
/// │ 0x07   │ 1 byte  │ Reserved (0x00)                  │
/// └────────┴─────────┴──────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub flags: FrameFlags,
}

impl FrameHeader {
    /// A header for the current format version.
    pub fn new(flags: FrameFlags) -> Self {
        Self {
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            flags,
        }
    }

    /// The 8 header bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..4].copy_from_slice(&FRAME_MAGIC);
        out[4] = self.version_major;
        out[5] = self.version_minor;
        out[6] = self.flags.raw();
        out
    }

    /// Parse and validate the header at the start of `buf`.
    ///
    /// Checks run magic first, then version, then flags and reserved
    /// bits, so the first error names the most basic problem.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if fewer than 8 bytes are present.
    /// - [`WireError::InvalidMagic`] if the file is not an IR frame.
    /// - [`WireError::UnsupportedVersion`] for an unknown major version.
    /// - [`WireError::ReservedNonZero`] for unknown flag bits or a
    ///   non-zero reserved byte.
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        let Some(head) = buf.get(..HEADER_SIZE) else {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        };

        if head[..4] != FRAME_MAGIC {
            let found = u32::from_le_bytes([head[0], head[1], head[2], head[3]]);
            return Err(WireError::InvalidMagic { found });
        }

        if head[4] != VERSION_MAJOR {
            return Err(WireError::UnsupportedVersion {
                major: head[4],
                minor: head[5],
            });
        }

        if head[6] & !FrameFlags::KNOWN != 0 {
            return Err(WireError::ReservedNonZero {
                offset: 6,
                value: head[6],
            });
        }

        if head[7] != 0x00 {
            return Err(WireError::ReservedNonZero {
                offset: 7,
                value: head[7],
            });
        }

        Ok(Self {
            version_major: head[4],
            version_minor: head[5],
            flags: FrameFlags::from_raw(head[6]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_bytes_are_stable() {
        let bytes = FrameHeader::new(FrameFlags::COMPRESSED).to_bytes();
        assert_eq!(bytes, [b'S', b'B', b'I', b'R', 1, 0, 1, 0]);
    }

    #[test]
    fn parse_written_header() {
        let header = FrameHeader::new(FrameFlags::NONE);
        let parsed = FrameHeader::read_from(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
        assert!(!parsed.flags.is_compressed());
    }

    #[test]
    fn reject_bad_magic() {
        let mut bytes = FrameHeader::new(FrameFlags::NONE).to_bytes();
        bytes[..4].copy_from_slice(b"SBE\0");
        assert!(matches!(
            FrameHeader::read_from(&bytes),
            Err(WireError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn reject_future_major_version() {
        let mut bytes = FrameHeader::new(FrameFlags::NONE).to_bytes();
        bytes[4] = 2;
        assert!(matches!(
            FrameHeader::read_from(&bytes),
            Err(WireError::UnsupportedVersion { major: 2, .. })
        ));
    }

    #[test]
    fn reject_unknown_flag_bits() {
        let mut bytes = FrameHeader::new(FrameFlags::NONE).to_bytes();
        bytes[6] = 0b1000_0000;
        assert!(matches!(
            FrameHeader::read_from(&bytes),
            Err(WireError::ReservedNonZero { offset: 6, .. })
        ));
    }

    #[test]
    fn reject_nonzero_reserved() {
        let mut bytes = FrameHeader::new(FrameFlags::NONE).to_bytes();
        bytes[7] = 0xFF;
        assert!(matches!(
            FrameHeader::read_from(&bytes),
            Err(WireError::ReservedNonZero {
                offset: 7,
                value: 0xFF
            })
        ));
    }

    #[test]
    fn reject_short_input() {
        assert!(matches!(
            FrameHeader::read_from(b"SBIR"),
            Err(WireError::UnexpectedEof { offset: 4 })
        ));
    }
}
