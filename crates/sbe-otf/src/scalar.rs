use sbe_types::{ByteOrder, PrimitiveType, PrimitiveValue, Signal, Token};
use sbe_wire::WireError;

use crate::error::DecodeError;

/// An unsigned integer sub-field at a fixed offset: a header field, a
/// group dimension member or a var-data length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct UnsignedField {
    pub offset: usize,
    pub primitive_type: PrimitiveType,
    pub byte_order: ByteOrder,
}

impl UnsignedField {
    /// Locate `name` among the direct members of the composite at
    /// `composite`.
    pub fn locate(tokens: &[Token], composite: usize, name: &str, reason: &'static str) -> Result<Self, DecodeError> {
        let index = sbe_types::tokens::find_child(tokens, composite, Signal::Encoding, name)
            .ok_or(DecodeError::MalformedTokens { index: composite, reason })?;
        let token = &tokens[index];
        match (token.encoding.primitive_type, usize::try_from(token.offset)) {
            (Some(primitive_type), Ok(offset)) if primitive_type.is_integer() => Ok(Self {
                offset,
                primitive_type,
                byte_order: token.encoding.byte_order,
            }),
            _ => Err(DecodeError::MalformedTokens {
                index,
                reason: "sub-field is not an integer at a static offset",
            }),
        }
    }

    /// Read the field relative to `base`.
    pub fn read(&self, buffer: &[u8], base: usize) -> Result<u64, DecodeError> {
        let at = offset(base, self.offset, buffer.len())?;
        let value = PrimitiveValue::read(buffer, at, self.primitive_type, self.byte_order)?;
        let raw = value.as_i64().unwrap_or_default();
        if self.primitive_type == PrimitiveType::Uint64 {
            return value.as_u64().ok_or(DecodeError::InvalidLength { offset: at, value: raw });
        }
        u64::try_from(raw).map_err(|_| DecodeError::InvalidLength { offset: at, value: raw })
    }
}

/// `base + delta`, failing when the sum overflows.
pub(crate) fn offset(base: usize, delta: usize, capacity: usize) -> Result<usize, DecodeError> {
    base.checked_add(delta).ok_or(DecodeError::Wire(WireError::OutOfBounds {
        offset: base,
        len: delta,
        capacity,
    }))
}

/// Convert a length read from the buffer, reporting where it came from.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn to_usize(value: u64, at: usize) -> Result<usize, DecodeError> {
    usize::try_from(value).map_err(|_| DecodeError::InvalidLength {
        offset: at,
        value: value as i64,
    })
}
