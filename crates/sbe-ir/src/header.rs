use sbe_types::tokens::{self, find_child};
use sbe_types::{ByteOrder, PrimitiveType, Signal, Token};

use crate::error::IrError;

/// Location and type of one message-header field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderField {
    /// Offset from the start of the header.
    pub offset: usize,
    pub primitive_type: PrimitiveType,
    pub byte_order: ByteOrder,
}

/// The four fields every message header must carry, located once from
/// the header token list.
///
/// ```text
/// messageHeader
/// ├── blockLength  root block width of the message that follows
/// ├── templateId   message id, the key into the IR
/// ├── schemaId     schema the message belongs to
/// └── version      acting version of the writer
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderStructure {
    pub block_length: HeaderField,
    pub template_id: HeaderField,
    pub schema_id: HeaderField,
    pub version: HeaderField,
    /// Total header width in bytes.
    pub encoded_length: usize,
}

impl HeaderStructure {
    pub const BLOCK_LENGTH: &'static str = "blockLength";
    pub const TEMPLATE_ID: &'static str = "templateId";
    pub const SCHEMA_ID: &'static str = "schemaId";
    pub const VERSION: &'static str = "version";

    /// Locate the header fields inside a header composite.
    ///
    /// # Errors
    ///
    /// - [`IrError::InvalidHeader`] if the list is not a single composite.
    /// - [`IrError::MissingHeaderField`] if a required field is absent.
    /// - [`IrError::InvalidHeaderField`] if a field is not an integer at a
    ///   static offset.
    pub fn new(header_tokens: &[Token]) -> Result<Self, IrError> {
        let Some(first) = header_tokens.first() else {
            return Err(IrError::InvalidHeader { reason: "no tokens" });
        };
        if first.signal != Signal::BeginComposite {
            return Err(IrError::InvalidHeader {
                reason: "header must start with BEGIN_COMPOSITE",
            });
        }
        tokens::check_balanced(header_tokens)?;
        if tokens::end_index(header_tokens, 0) != header_tokens.len() - 1 {
            return Err(IrError::InvalidHeader {
                reason: "tokens follow the header composite",
            });
        }

        let encoded_length =
            usize::try_from(first.encoded_length).map_err(|_| IrError::InvalidHeader {
                reason: "header must have a fixed length",
            })?;

        Ok(Self {
            block_length: locate(header_tokens, Self::BLOCK_LENGTH)?,
            template_id: locate(header_tokens, Self::TEMPLATE_ID)?,
            schema_id: locate(header_tokens, Self::SCHEMA_ID)?,
            version: locate(header_tokens, Self::VERSION)?,
            encoded_length,
        })
    }
}

fn locate(header_tokens: &[Token], name: &'static str) -> Result<HeaderField, IrError> {
    let index = find_child(header_tokens, 0, Signal::Encoding, name)
        .ok_or(IrError::MissingHeaderField { name })?;
    let token = &header_tokens[index];

    let primitive_type = token
        .encoding
        .primitive_type
        .filter(|t| t.is_integer() && *t != PrimitiveType::Char)
        .ok_or(IrError::InvalidHeaderField {
            name,
            reason: "must be an integer type",
        })?;
    let offset = usize::try_from(token.offset).map_err(|_| IrError::InvalidHeaderField {
        name,
        reason: "must have a static offset",
    })?;

    Ok(HeaderField {
        offset,
        primitive_type,
        byte_order: token.encoding.byte_order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbe_types::Encoding;
    use sbe_types::tokens::compute_component_token_counts;

    fn field(name: &str, offset: i32) -> Token {
        Token::builder(Signal::Encoding, name)
            .offset(offset)
            .encoded_length(2)
            .encoding(Encoding::scalar(PrimitiveType::Uint16, ByteOrder::LittleEndian))
            .build()
    }

    fn header(names: &[&str]) -> Vec<Token> {
        let mut list = vec![Token::builder(Signal::BeginComposite, "messageHeader")
            .encoded_length(8)
            .build()];
        for (i, name) in names.iter().enumerate() {
            list.push(field(name, i32::try_from(i * 2).unwrap()));
        }
        list.push(Token::builder(Signal::EndComposite, "messageHeader").build());
        compute_component_token_counts(&mut list).unwrap();
        list
    }

    #[test]
    fn locates_standard_fields() {
        let tokens = header(&["blockLength", "templateId", "schemaId", "version"]);
        let structure = HeaderStructure::new(&tokens).unwrap();
        assert_eq!(structure.encoded_length, 8);
        assert_eq!(structure.template_id.offset, 2);
        assert_eq!(structure.version.offset, 6);
    }

    #[test]
    fn missing_field_named() {
        let tokens = header(&["blockLength", "templateId", "version"]);
        assert!(matches!(
            HeaderStructure::new(&tokens),
            Err(IrError::MissingHeaderField { name: "schemaId" })
        ));
    }

    #[test]
    fn non_composite_rejected() {
        let tokens = vec![field("blockLength", 0)];
        assert!(matches!(
            HeaderStructure::new(&tokens),
            Err(IrError::InvalidHeader { .. })
        ));
    }
}
