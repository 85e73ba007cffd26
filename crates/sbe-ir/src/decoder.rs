use std::borrow::Cow;

use sbe_types::{ByteOrder, Encoding, Presence, PrimitiveType, PrimitiveValue, Signal, Token};
use sbe_wire::header::{FrameHeader, HEADER_SIZE};
use sbe_wire::FrameReader;
use tracing::debug;

use crate::compression;
use crate::encoder::{TAG_ABSENT, TAG_BYTES, TAG_DOUBLE, TAG_LONG};
use crate::error::CodecError;
use crate::ir::{Ir, SchemaInfo};

/// Upper bound on a decompressed frame body (64 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024 * 1024;

/// Rebuilds an [`Ir`] from a frame written by [`IrEncoder`].
///
/// Decoding is all-or-nothing: the first malformed byte aborts with an
/// error naming its offset, and no container is returned.
///
/// [`IrEncoder`]: crate::IrEncoder
#[derive(Clone, Debug)]
pub struct IrDecoder {
    max_body_size: usize,
}

impl Default for IrDecoder {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl IrDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the size of a decompressed body.
    pub fn max_body_size(&mut self, limit: usize) -> &mut Self {
        self.max_body_size = limit;
        self
    }

    /// Decode a complete frame.
    ///
    /// # Errors
    ///
    /// - [`CodecError::Wire`] for a bad frame header or truncated body.
    /// - [`CodecError::InvalidByte`] for an unknown discriminant.
    /// - [`CodecError::TrailingData`] if bytes follow the last message.
    /// - [`CodecError::DecompressFailed`] / [`CodecError::DecompressionBomb`]
    ///   for compressed bodies.
    /// - [`CodecError::Ir`] if the tokens do not form a valid container.
    pub fn decode(&self, frame: &[u8]) -> Result<Ir, CodecError> {
        let header = FrameHeader::read_from(frame)?;
        let raw = &frame[HEADER_SIZE..];
        let body: Cow<'_, [u8]> = if header.flags.is_compressed() {
            Cow::Owned(compression::decompress(raw, self.max_body_size)?)
        } else {
            Cow::Borrowed(raw)
        };

        let mut r = FrameReader::with_base(&body, HEADER_SIZE);

        let id = r.read_i32()?;
        let version = r.read_u32()?;
        let byte_order = read_byte_order(&mut r)?;
        let info = SchemaInfo {
            id,
            version,
            byte_order,
            package_name: r.read_str()?,
            namespace_name: r.read_opt_str()?,
            semantic_version: r.read_opt_str()?,
        };

        let header_tokens = read_tokens(&mut r)?;
        let mut ir = Ir::new(info, header_tokens)?;

        let message_count = r.read_len()?;
        for _ in 0..message_count {
            let id = r.read_i32()?;
            let tokens = read_tokens(&mut r)?;
            ir.add_message(id, tokens)?;
        }

        if !r.is_empty() {
            return Err(CodecError::TrailingData {
                offset: r.offset(),
                extra_bytes: r.remaining(),
            });
        }

        debug!(
            package = ir.package_name(),
            messages = ir.message_count(),
            bytes = frame.len(),
            "decoded IR frame"
        );
        Ok(ir)
    }
}

fn read_tokens(r: &mut FrameReader<'_>) -> Result<Vec<Token>, CodecError> {
    let count = r.read_len()?;
    // Bounded by remaining bytes, not by tokens.
    let mut tokens = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        tokens.push(read_token(r)?);
    }
    Ok(tokens)
}

fn read_token(r: &mut FrameReader<'_>) -> Result<Token, CodecError> {
    let signal = read_discriminant(r, "signal", Signal::from_wire_byte)?;
    let name = r.read_str()?;
    let referenced_name = r.read_opt_str()?;
    let description = r.read_opt_str()?;
    let id = r.read_i32()?;
    let offset = r.read_i32()?;
    let encoded_length = r.read_i32()?;
    let component_token_count = r.read_i32()?;
    let version = r.read_u32()?;
    let deprecated = r.read_u32()?;

    let primitive_type = read_primitive_type(r)?;
    let byte_order = read_byte_order(r)?;
    let presence = read_discriminant(r, "presence", Presence::from_wire_byte)?;
    let encoding = Encoding {
        primitive_type,
        byte_order,
        presence,
        const_value: read_value(r)?,
        min_value: read_value(r)?,
        max_value: read_value(r)?,
        null_value: read_value(r)?,
        character_encoding: r.read_opt_str()?,
        epoch: r.read_opt_str()?,
        time_unit: r.read_opt_str()?,
        semantic_type: r.read_opt_str()?,
    };

    Ok(Token {
        signal,
        name,
        referenced_name,
        description,
        id,
        version,
        deprecated,
        offset,
        encoded_length,
        component_token_count,
        encoding,
    })
}

fn read_discriminant<T, E>(
    r: &mut FrameReader<'_>,
    field: &'static str,
    parse: impl FnOnce(u8) -> Result<T, E>,
) -> Result<T, CodecError> {
    let offset = r.offset();
    let value = r.read_u8()?;
    parse(value).map_err(|_| CodecError::InvalidByte {
        offset,
        field,
        value,
    })
}

fn read_byte_order(r: &mut FrameReader<'_>) -> Result<ByteOrder, CodecError> {
    read_discriminant(r, "byte order", |b| ByteOrder::from_wire_id(b).ok_or(()))
}

fn read_primitive_type(r: &mut FrameReader<'_>) -> Result<Option<PrimitiveType>, CodecError> {
    read_discriminant(r, "primitive type", |b| match b {
        0 => Ok(None),
        other => PrimitiveType::from_wire_byte(other).map(Some),
    })
}

fn read_value(r: &mut FrameReader<'_>) -> Result<Option<PrimitiveValue>, CodecError> {
    let offset = r.offset();
    let value = match r.read_u8()? {
        TAG_ABSENT => None,
        TAG_LONG => Some(PrimitiveValue::Long(r.read_i64()?)),
        TAG_DOUBLE => Some(PrimitiveValue::Double(r.read_f64()?)),
        TAG_BYTES => {
            let character_encoding = r.read_str()?;
            let bytes = r.read_bytes()?;
            Some(PrimitiveValue::bytes(bytes, character_encoding))
        }
        tag => {
            return Err(CodecError::InvalidByte {
                offset,
                field: "value tag",
                value: tag,
            });
        }
    };
    Ok(value)
}
