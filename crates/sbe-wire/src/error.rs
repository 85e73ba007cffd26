/// Byte-level failures shared by every layer of the stack.
///
/// Every variant that can be triggered by input data carries the byte
/// offset at which reading broke, so a truncated IR frame or a short
/// message buffer can be diagnosed without a hex editor.
///
/// ```text
/// WireError
/// ├── OutOfBounds        ← access past the end of a caller buffer
/// ├── UnexpectedEof      ← frame ended mid-value
/// ├── VarintTooLong      ← LEB128 run longer than 10 bytes
/// ├── LengthOverflow     ← decoded length does not fit in memory
/// ├── InvalidUtf8        ← frame string is not UTF-8
/// ├── InvalidFlag        ← optional-value presence byte not 0/1
/// ├── InvalidMagic       ← frame does not start with "SBIR"
/// ├── UnsupportedVersion ← frame major version unknown
/// └── ReservedNonZero    ← reserved header byte set
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A read or write of `len` bytes at `offset` would cross the end of a
    /// buffer holding `capacity` bytes.
    #[error("access of {len} bytes at offset {offset} exceeds buffer capacity {capacity}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        capacity: usize,
    },

    /// Input ended before a complete value could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// Varint encoding exceeded 10 bytes without terminating.
    #[error("varint at offset {offset} exceeds the 10-byte limit")]
    VarintTooLong { offset: usize },

    /// A varint length prefix is larger than the address space.
    #[error("length {value} at offset {offset} does not fit in usize")]
    LengthOverflow { offset: usize, value: u64 },

    /// A length-prefixed string is not valid UTF-8.
    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// A presence byte was neither 0 nor 1.
    #[error("invalid presence flag {value:#04X} at offset {offset}")]
    InvalidFlag { offset: usize, value: u8 },

    /// Magic number did not match "SBIR".
    #[error("invalid magic number: expected 0x52494253, got {found:#010X}")]
    InvalidMagic { found: u32 },

    /// Unsupported frame format version.
    #[error("unsupported frame version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Reserved field was non-zero.
    #[error("reserved field at offset {offset} was {value:#04X}, expected 0x00")]
    ReservedNonZero { offset: usize, value: u8 },
}
