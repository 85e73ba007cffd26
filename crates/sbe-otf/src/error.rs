use sbe_ir::IrError;
use sbe_types::TypeError;
use sbe_wire::WireError;

/// Errors raised while walking a message buffer.
///
/// A failed decode never leaves state behind: the token list and any
/// cached decoders stay valid for the next buffer.
///
/// ```text
///   DecodeError
///   ├── Wire(WireError)     ← a read would cross the end of the buffer
///   ├── Type(TypeError)     ← a token list failed to pair up
///   ├── Ir(IrError)         ← header tokens do not describe a header
///   ├── MalformedTokens     ← token list cannot drive a decode
///   ├── UnknownTemplate     ← header names a message the IR lacks
///   ├── InvalidLength       ← count or length field out of range
///   └── Listener            ← a callback asked to stop
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error("malformed token list at index {index}: {reason}")]
    MalformedTokens { index: usize, reason: &'static str },

    #[error("no message with template id {id}")]
    UnknownTemplate { id: u64 },

    /// A length or count read from the buffer that the remaining bytes
    /// cannot hold. Also a block length narrower than its own fields.
    #[error("invalid length {value} at offset {offset}")]
    InvalidLength { offset: usize, value: i64 },

    #[error("listener error: {0}")]
    Listener(Box<dyn std::error::Error + Send + Sync>),
}

impl DecodeError {
    /// Wrap an error raised inside a [`TokenListener`](crate::TokenListener)
    /// callback.
    pub fn listener(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Listener(error.into())
    }
}
