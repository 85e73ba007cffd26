//! Cached readers for the variable parts of a message.
//!
//! Both decoders locate their sub-fields once, when the
//! [`MessageDecoder`](crate::MessageDecoder) is built, so walking a group
//! with thousands of elements never rescans tokens.

use sbe_types::{Signal, Token};

use crate::error::DecodeError;
use crate::scalar::{UnsignedField, offset, to_usize};

const DIMENSION_BLOCK_LENGTH: &str = "blockLength";
const DIMENSION_NUM_IN_GROUP: &str = "numInGroup";
const VAR_DATA_LENGTH: &str = "length";
const VAR_DATA_PAYLOAD: &str = "varData";

/// Values read from one group dimension header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupSize {
    /// Width of each element's fixed block.
    pub block_length: usize,
    pub num_in_group: u64,
}

/// Reads the dimension composite that precedes a repeating group.
///
/// ```text
/// BEGIN_GROUP            ← begin
///   BEGIN_COMPOSITE      ← begin + 1, encoded_length = header width
///     ENCODING blockLength
///     ENCODING numInGroup
///   END_COMPOSITE
///   ...fields, nested groups, var data
/// END_GROUP
/// ```
#[derive(Clone, Debug)]
pub struct GroupSizeDecoder {
    block_length: UnsignedField,
    num_in_group: UnsignedField,
    encoded_length: usize,
}

impl GroupSizeDecoder {
    /// # Errors
    ///
    /// [`DecodeError::MalformedTokens`] if `begin` is not a BEGIN_GROUP
    /// followed by a fixed-width dimension composite with both sub-fields.
    pub fn new(tokens: &[Token], begin: usize) -> Result<Self, DecodeError> {
        let dimension = dimension_composite(tokens, begin, Signal::BeginGroup)?;
        Ok(Self {
            block_length: UnsignedField::locate(
                tokens,
                dimension,
                DIMENSION_BLOCK_LENGTH,
                "group dimension has no blockLength",
            )?,
            num_in_group: UnsignedField::locate(
                tokens,
                dimension,
                DIMENSION_NUM_IN_GROUP,
                "group dimension has no numInGroup",
            )?,
            encoded_length: usize::try_from(tokens[dimension].encoded_length).map_err(|_| {
                DecodeError::MalformedTokens {
                    index: dimension,
                    reason: "group dimension has no fixed length",
                }
            })?,
        })
    }

    /// Width of the dimension header.
    pub fn encoded_length(&self) -> usize {
        self.encoded_length
    }

    /// # Errors
    ///
    /// [`DecodeError::Wire`] if the header crosses the end of `buffer`,
    /// [`DecodeError::InvalidLength`] for a negative block length.
    pub fn decode(&self, buffer: &[u8], at: usize) -> Result<GroupSize, DecodeError> {
        let block_length = self.block_length.read(buffer, at)?;
        Ok(GroupSize {
            block_length: to_usize(block_length, at)?,
            num_in_group: self.num_in_group.read(buffer, at)?,
        })
    }
}

/// Reads the length prefix of a var-data field and locates its payload.
#[derive(Clone, Debug)]
pub struct VarDataDecoder {
    length: UnsignedField,
    payload: usize,
    payload_offset: usize,
    element_size: usize,
}

impl VarDataDecoder {
    /// # Errors
    ///
    /// [`DecodeError::MalformedTokens`] if `begin` is not a BEGIN_VAR_DATA
    /// followed by a composite holding `length` and `varData`.
    pub fn new(tokens: &[Token], begin: usize) -> Result<Self, DecodeError> {
        let composite = dimension_composite(tokens, begin, Signal::BeginVarData)?;
        let length = UnsignedField::locate(tokens, composite, VAR_DATA_LENGTH, "var data has no length")?;
        let payload = sbe_types::tokens::find_child(tokens, composite, Signal::Encoding, VAR_DATA_PAYLOAD).ok_or(
            DecodeError::MalformedTokens {
                index: composite,
                reason: "var data has no varData",
            },
        )?;
        let token = &tokens[payload];
        match (token.encoding.primitive_type, usize::try_from(token.offset)) {
            (Some(t), Ok(payload_offset)) => Ok(Self {
                length,
                payload,
                payload_offset,
                element_size: t.size(),
            }),
            _ => Err(DecodeError::MalformedTokens {
                index: payload,
                reason: "varData needs a primitive type and a static offset",
            }),
        }
    }

    /// Index of the `varData` token in the message token list.
    pub fn payload_index(&self) -> usize {
        self.payload
    }

    /// Offset of the payload from the start of the var-data region.
    pub fn payload_offset(&self) -> usize {
        self.payload_offset
    }

    /// Payload width in bytes for the region starting at `at`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Wire`] if the length field crosses the end of
    /// `buffer`, [`DecodeError::InvalidLength`] if the payload width
    /// overflows.
    pub fn byte_length(&self, buffer: &[u8], at: usize) -> Result<usize, DecodeError> {
        let length = to_usize(self.length.read(buffer, at)?, at)?;
        length
            .checked_mul(self.element_size)
            .ok_or_else(|| DecodeError::InvalidLength {
                offset: at,
                value: i64::try_from(length).unwrap_or(i64::MAX),
            })
    }

    /// Absolute offset of the payload for the region starting at `at`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Wire`] if the sum overflows.
    pub fn payload_at(&self, buffer: &[u8], at: usize) -> Result<usize, DecodeError> {
        offset(at, self.payload_offset, buffer.len())
    }
}

fn dimension_composite(tokens: &[Token], begin: usize, expected: Signal) -> Result<usize, DecodeError> {
    if tokens.get(begin).map(|t| t.signal) != Some(expected) {
        return Err(DecodeError::MalformedTokens {
            index: begin,
            reason: "expected BEGIN_GROUP or BEGIN_VAR_DATA",
        });
    }
    let composite = begin + 1;
    match tokens.get(composite) {
        Some(t) if t.signal == Signal::BeginComposite => Ok(composite),
        _ => Err(DecodeError::MalformedTokens {
            index: composite,
            reason: "expected a BEGIN_COMPOSITE header",
        }),
    }
}
