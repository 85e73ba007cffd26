use sbe_wire::WireError;

/// Errors raised by the value and token model.
///
/// ```text
/// ┌──────────────────────────────────────────────────────┐
/// │ TypeError (this crate)                               │
/// │   ├── InvalidEnumValue for out-of-range wire bytes   │
/// │   ├── InvalidValue for unparseable schema literals   │
/// │   ├── UnbalancedTokens for broken BEGIN/END nesting  │
/// │   └── wraps WireError for buffer access failures     │
/// └──────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// A wire byte did not map to any variant of the named enum.
    #[error("invalid {enum_name} value: {value:#04X}")]
    InvalidEnumValue { enum_name: &'static str, value: u8 },

    /// Schema text could not be read as a value of the given type, or
    /// falls outside the type's representable range.
    #[error("{text:?} is not a valid {primitive_type} value")]
    InvalidValue {
        primitive_type: &'static str,
        text: String,
    },

    /// The token at `index` closes something it did not open, or a
    /// BEGIN token is never closed.
    #[error("unbalanced token list at index {index}: {reason}")]
    UnbalancedTokens { index: usize, reason: &'static str },

    #[error(transparent)]
    Wire(#[from] WireError),
}
