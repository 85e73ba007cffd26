use sbe_ir::{HeaderField, HeaderStructure, Ir};
use sbe_types::Token;

use crate::error::DecodeError;
use crate::scalar::UnsignedField;

/// The four header fields of one encoded message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    pub block_length: u64,
    pub template_id: u64,
    pub schema_id: u64,
    /// Acting version of the writer.
    pub version: u64,
}

/// Reads message headers using field positions located once from the
/// header token list.
#[derive(Clone, Debug)]
pub struct HeaderDecoder {
    block_length: UnsignedField,
    template_id: UnsignedField,
    schema_id: UnsignedField,
    version: UnsignedField,
    encoded_length: usize,
}

impl HeaderDecoder {
    /// # Errors
    ///
    /// [`DecodeError::Ir`] if the tokens do not describe a message header.
    pub fn new(header_tokens: &[Token]) -> Result<Self, DecodeError> {
        Ok(Self::from_structure(&HeaderStructure::new(header_tokens)?))
    }

    /// Reuse the header structure an [`Ir`] already located.
    pub fn for_ir(ir: &Ir) -> Self {
        Self::from_structure(ir.header_structure())
    }

    fn from_structure(structure: &HeaderStructure) -> Self {
        let field = |f: &HeaderField| UnsignedField {
            offset: f.offset,
            primitive_type: f.primitive_type,
            byte_order: f.byte_order,
        };
        Self {
            block_length: field(&structure.block_length),
            template_id: field(&structure.template_id),
            schema_id: field(&structure.schema_id),
            version: field(&structure.version),
            encoded_length: structure.encoded_length,
        }
    }

    /// Width of the header in bytes.
    pub fn encoded_length(&self) -> usize {
        self.encoded_length
    }

    /// # Errors
    ///
    /// [`DecodeError::Wire`] if the header crosses the end of `buffer`.
    pub fn block_length(&self, buffer: &[u8], offset: usize) -> Result<u64, DecodeError> {
        self.block_length.read(buffer, offset)
    }

    /// # Errors
    ///
    /// As for [`block_length`](Self::block_length).
    pub fn template_id(&self, buffer: &[u8], offset: usize) -> Result<u64, DecodeError> {
        self.template_id.read(buffer, offset)
    }

    /// # Errors
    ///
    /// As for [`block_length`](Self::block_length).
    pub fn schema_id(&self, buffer: &[u8], offset: usize) -> Result<u64, DecodeError> {
        self.schema_id.read(buffer, offset)
    }

    /// # Errors
    ///
    /// As for [`block_length`](Self::block_length).
    pub fn schema_version(&self, buffer: &[u8], offset: usize) -> Result<u64, DecodeError> {
        self.version.read(buffer, offset)
    }

    /// Read all four fields.
    ///
    /// # Errors
    ///
    /// As for [`block_length`](Self::block_length).
    pub fn decode(&self, buffer: &[u8], offset: usize) -> Result<MessageHeader, DecodeError> {
        Ok(MessageHeader {
            block_length: self.block_length(buffer, offset)?,
            template_id: self.template_id(buffer, offset)?,
            schema_id: self.schema_id(buffer, offset)?,
            version: self.schema_version(buffer, offset)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbe_types::tokens::compute_component_token_counts;
    use sbe_types::{ByteOrder, Encoding, PrimitiveType, Signal};
    use sbe_wire::WireError;

    fn header_tokens(order: ByteOrder) -> Vec<Token> {
        let field = |name: &str, offset: i32| {
            Token::builder(Signal::Encoding, name)
                .offset(offset)
                .encoded_length(2)
                .encoding(Encoding::scalar(PrimitiveType::Uint16, order))
                .build()
        };
        let begin = Token::builder(Signal::BeginComposite, "messageHeader")
            .encoded_length(8)
            .build();
        let mut end = begin.clone();
        end.signal = Signal::EndComposite;
        let mut tokens = vec![
            begin,
            field("blockLength", 0),
            field("templateId", 2),
            field("schemaId", 4),
            field("version", 6),
            end,
        ];
        compute_component_token_counts(&mut tokens).unwrap();
        tokens
    }

    #[test]
    fn reads_little_endian_header_at_offset() {
        let decoder = HeaderDecoder::new(&header_tokens(ByteOrder::LittleEndian)).unwrap();
        let buf = [0xFF, 0xFF, 40, 0, 7, 0, 1, 0, 3, 0];
        let header = decoder.decode(&buf, 2).unwrap();
        assert_eq!(
            header,
            MessageHeader {
                block_length: 40,
                template_id: 7,
                schema_id: 1,
                version: 3,
            }
        );
        assert_eq!(decoder.encoded_length(), 8);
    }

    #[test]
    fn reads_big_endian_header() {
        let decoder = HeaderDecoder::new(&header_tokens(ByteOrder::BigEndian)).unwrap();
        let buf = [0, 40, 0, 7, 0, 1, 0, 3];
        assert_eq!(decoder.template_id(&buf, 0).unwrap(), 7);
        assert_eq!(decoder.block_length(&buf, 0).unwrap(), 40);
    }

    #[test]
    fn short_buffer_is_out_of_bounds() {
        let decoder = HeaderDecoder::new(&header_tokens(ByteOrder::LittleEndian)).unwrap();
        let buf = [40, 0, 7, 0, 1, 0, 3];
        assert!(matches!(
            decoder.decode(&buf, 0),
            Err(DecodeError::Wire(WireError::OutOfBounds { offset: 6, .. }))
        ));
    }
}
