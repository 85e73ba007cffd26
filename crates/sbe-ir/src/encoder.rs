use sbe_types::{PrimitiveValue, Token};
use sbe_wire::header::{FrameFlags, FrameHeader, HEADER_SIZE};
use sbe_wire::FrameWriter;
use tracing::debug;

use crate::compression;
use crate::ir::Ir;

// ── Value tags ────────────────────────────────────────────────────────

pub(crate) const TAG_ABSENT: u8 = 0;
pub(crate) const TAG_LONG: u8 = 1;
pub(crate) const TAG_DOUBLE: u8 = 2;
pub(crate) const TAG_BYTES: u8 = 3;

/// Serializes an [`Ir`] into a self-describing binary frame.
///
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │ frame header (8 bytes)  "SBIR" 1 0 flags 0                    │
/// ├──────────────────────────────────────────────────────────────┤
/// │ body (zstd frame when flags bit 0 is set)                    │
/// │   i32 schema id │ u32 schema version │ u8 byte order         │
/// │   str package │ opt-str namespace │ opt-str semantic version │
/// │   varint n │ n header tokens                                 │
/// │   varint m │ m × (i32 message id │ varint k │ k tokens)      │
/// └──────────────────────────────────────────────────────────────┘
///
/// token:
///   u8 signal │ str name │ opt-str referenced name │ opt-str description
///   i32 id │ i32 offset │ i32 encoded length │ i32 component count
///   u32 version │ u32 deprecated
///   u8 primitive type (0 = none) │ u8 byte order │ u8 presence
///   value const │ value min │ value max │ value null
///   opt-str character encoding │ opt-str epoch │ opt-str time unit
///   opt-str semantic type
///
/// value:
///   u8 0              absent
///   u8 1 │ i64        integer
///   u8 2 │ u64 bits   double
///   u8 3 │ str encoding │ varint len │ bytes
/// ```
///
/// Fixed-width integers are little-endian regardless of the schema's
/// byte order. Named types are not written: they are recovered from the
/// message token lists on decode, exactly as they were captured when the
/// container was built.
///
/// The output depends only on the container, so equal containers always
/// produce identical frames.
///
/// # Example
///
/// ```rust,ignore
/// let frame = IrEncoder::new().compress_body().encode(&ir);
/// let back = IrDecoder::new().decode(&frame)?;
/// assert_eq!(back, ir);
/// ```
#[derive(Clone, Debug, Default)]
pub struct IrEncoder {
    compress: bool,
}

impl IrEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// zstd-compress the body when that makes the frame smaller.
    pub fn compress_body(&mut self) -> &mut Self {
        self.compress = true;
        self
    }

    /// Serialize `ir` into a frame.
    pub fn encode(&self, ir: &Ir) -> Vec<u8> {
        let body = encode_body(ir);

        let (flags, body) = match self.compress.then(|| compression::compress(&body)).flatten() {
            Some(compressed) => (FrameFlags::COMPRESSED, compressed),
            None => (FrameFlags::NONE, body),
        };

        let mut frame = Vec::with_capacity(HEADER_SIZE + body.len());
        frame.extend_from_slice(&FrameHeader::new(flags).to_bytes());
        frame.extend_from_slice(&body);

        debug!(
            package = ir.package_name(),
            messages = ir.message_count(),
            bytes = frame.len(),
            compressed = flags.is_compressed(),
            "encoded IR frame"
        );
        frame
    }
}

fn encode_body(ir: &Ir) -> Vec<u8> {
    let info = ir.info();
    let mut w = FrameWriter::new();

    w.write_i32(info.id);
    w.write_u32(info.version);
    w.write_u8(info.byte_order.wire_id());
    w.write_str(&info.package_name);
    w.write_opt_str(info.namespace_name.as_deref());
    w.write_opt_str(info.semantic_version.as_deref());

    write_tokens(&mut w, ir.header_tokens());

    w.write_varint(ir.message_count() as u64);
    for (id, tokens) in ir.messages() {
        w.write_i32(id);
        write_tokens(&mut w, tokens);
    }

    w.into_inner()
}

pub(crate) fn write_tokens(w: &mut FrameWriter, tokens: &[Token]) {
    w.write_varint(tokens.len() as u64);
    for token in tokens {
        write_token(w, token);
    }
}

fn write_token(w: &mut FrameWriter, token: &Token) {
    w.write_u8(token.signal.to_wire_byte());
    w.write_str(&token.name);
    w.write_opt_str(token.referenced_name.as_deref());
    w.write_opt_str(token.description.as_deref());
    w.write_i32(token.id);
    w.write_i32(token.offset);
    w.write_i32(token.encoded_length);
    w.write_i32(token.component_token_count);
    w.write_u32(token.version);
    w.write_u32(token.deprecated);

    let e = &token.encoding;
    w.write_u8(e.primitive_type.map_or(0, |t| t.to_wire_byte()));
    w.write_u8(e.byte_order.wire_id());
    w.write_u8(e.presence.to_wire_byte());
    write_value(w, e.const_value.as_ref());
    write_value(w, e.min_value.as_ref());
    write_value(w, e.max_value.as_ref());
    write_value(w, e.null_value.as_ref());
    w.write_opt_str(e.character_encoding.as_deref());
    w.write_opt_str(e.epoch.as_deref());
    w.write_opt_str(e.time_unit.as_deref());
    w.write_opt_str(e.semantic_type.as_deref());
}

fn write_value(w: &mut FrameWriter, value: Option<&PrimitiveValue>) {
    match value {
        None => w.write_u8(TAG_ABSENT),
        Some(PrimitiveValue::Long(v)) => {
            w.write_u8(TAG_LONG);
            w.write_i64(*v);
        }
        Some(PrimitiveValue::Double(v)) => {
            w.write_u8(TAG_DOUBLE);
            w.write_f64(*v);
        }
        Some(PrimitiveValue::Bytes {
            bytes,
            character_encoding,
        }) => {
            w.write_u8(TAG_BYTES);
            w.write_str(character_encoding);
            w.write_bytes(bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::tests::{header_tokens, message_tokens};
    use crate::ir::SchemaInfo;

    fn sample() -> Ir {
        let info = SchemaInfo {
            package_name: "demo".into(),
            id: 9,
            version: 2,
            ..SchemaInfo::default()
        };
        let mut ir = Ir::new(info, header_tokens()).unwrap();
        ir.add_message(1, message_tokens(1)).unwrap();
        ir
    }

    #[test]
    fn frame_starts_with_header_then_schema_id() {
        let frame = IrEncoder::new().encode(&sample());
        assert_eq!(&frame[..8], b"SBIR\x01\x00\x00\x00");
        assert_eq!(&frame[8..12], &9i32.to_le_bytes());
        assert_eq!(&frame[12..16], &2u32.to_le_bytes());
    }

    #[test]
    fn encoding_is_deterministic() {
        let ir = sample();
        assert_eq!(IrEncoder::new().encode(&ir), IrEncoder::new().encode(&ir.clone()));
    }

    #[test]
    fn value_tags() {
        let mut w = FrameWriter::new();
        write_value(&mut w, None);
        write_value(&mut w, Some(&PrimitiveValue::Long(-1)));
        write_value(&mut w, Some(&PrimitiveValue::bytes(*b"ab", "UTF-8")));
        let bytes = w.into_inner();
        assert_eq!(bytes[0], TAG_ABSENT);
        assert_eq!(bytes[1], TAG_LONG);
        assert_eq!(&bytes[2..10], &[0xFF; 8]);
        assert_eq!(bytes[10], TAG_BYTES);
        assert_eq!(&bytes[11..], b"\x05UTF-8\x02ab");
    }
}
