use sbe_types::TypeError;
use sbe_wire::WireError;

/// A token list or header that cannot form a valid IR container.
///
/// ```text
///   IrError
///   ├── DuplicateMessage     ← two messages share a template id
///   ├── InvalidMessage       ← list is not one BEGIN/END_MESSAGE region
///   ├── InvalidHeader        ← header is not one composite
///   ├── MissingHeaderField   ← blockLength/templateId/schemaId/version absent
///   ├── InvalidHeaderField   ← header field is not an unsigned integer
///   └── Type(TypeError)      ← unbalanced BEGIN/END nesting
/// ```
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    #[error("duplicate message id {id}")]
    DuplicateMessage { id: i32 },

    #[error("message {id}: {reason}")]
    InvalidMessage { id: i32, reason: &'static str },

    #[error("invalid message header: {reason}")]
    InvalidHeader { reason: &'static str },

    #[error("message header has no {name} field")]
    MissingHeaderField { name: &'static str },

    #[error("message header field {name}: {reason}")]
    InvalidHeaderField {
        name: &'static str,
        reason: &'static str,
    },

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Errors raised while decoding an IR frame.
///
/// Every data-dependent variant reports the absolute byte offset within
/// the frame (for compressed frames: within the decompressed body, plus
/// the 8 header bytes). Decoding never returns a partial container.
///
/// ```text
///   CodecError
///   ├── Wire(WireError)      ← header, truncation, varint, string errors
///   ├── InvalidByte          ← unknown signal/type/order/presence/tag byte
///   ├── TrailingData         ← bytes left after the last message
///   ├── DecompressFailed     ← zstd could not decode the body
///   ├── DecompressionBomb    ← body larger than the configured limit
///   └── Ir(IrError)          ← tokens decode but do not form a valid IR
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Wire(#[from] WireError),

    /// A one-byte discriminant held no known value.
    #[error("invalid {field} byte {value:#04X} at offset {offset}")]
    InvalidByte {
        offset: usize,
        field: &'static str,
        value: u8,
    },

    #[error("{extra_bytes} unexpected bytes after frame body at offset {offset}")]
    TrailingData { offset: usize, extra_bytes: usize },

    #[error("zstd decompression failed: {0}")]
    DecompressFailed(String),

    #[error("decompressed size exceeds limit {limit}")]
    DecompressionBomb { limit: usize },

    #[error(transparent)]
    Ir(#[from] IrError),
}
