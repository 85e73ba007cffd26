use std::collections::BTreeMap;

use sbe_types::tokens::{check_balanced, end_index};
use sbe_types::{ByteOrder, Signal, Token};
use tracing::debug;

use crate::error::IrError;
use crate::header::HeaderStructure;

/// Schema-level metadata carried alongside the token lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaInfo {
    pub package_name: String,
    pub namespace_name: Option<String>,
    pub id: i32,
    pub version: u32,
    pub semantic_version: Option<String>,
    pub byte_order: ByteOrder,
}

/// The intermediate representation of a whole schema.
///
/// Built once (by the generator or by decoding a frame), then read by
/// any number of consumers. There are no mutators beyond
/// [`add_message`](Self::add_message), which the builders use while
/// assembling it; every accessor hands out shared slices.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────┐
/// │ Ir                                                      │
/// │   info            package, id, version, byte order      │
/// │   header_tokens   BEGIN_COMPOSITE messageHeader .. END  │
/// │   messages        template id  → BEGIN_MESSAGE .. END   │
/// │   types           type name    → BEGIN_COMPOSITE/ENUM/  │
/// │                                  SET .. END             │
/// └─────────────────────────────────────────────────────────┘
/// ```
///
/// Messages and types are kept in sorted maps so iteration order, and
/// therefore the serialized frame, is deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ir {
    info: SchemaInfo,
    header_tokens: Vec<Token>,
    header_structure: HeaderStructure,
    messages: BTreeMap<i32, Vec<Token>>,
    types: BTreeMap<String, Vec<Token>>,
}

impl Ir {
    /// Create an empty container around a validated message header.
    ///
    /// # Errors
    ///
    /// Any [`IrError`] raised by [`HeaderStructure::new`].
    pub fn new(info: SchemaInfo, header_tokens: Vec<Token>) -> Result<Self, IrError> {
        let header_structure = HeaderStructure::new(&header_tokens)?;
        let mut ir = Self {
            info,
            header_tokens,
            header_structure,
            messages: BTreeMap::new(),
            types: BTreeMap::new(),
        };
        let header = std::mem::take(&mut ir.header_tokens);
        ir.capture_types(&header);
        ir.header_tokens = header;
        Ok(ir)
    }

    /// Add one message's token list and record every named type it
    /// expands.
    ///
    /// # Errors
    ///
    /// - [`IrError::DuplicateMessage`] if `id` is already present.
    /// - [`IrError::InvalidMessage`] if the list is not exactly one
    ///   BEGIN_MESSAGE..END_MESSAGE region.
    /// - [`IrError::Type`] if nesting is unbalanced.
    pub fn add_message(&mut self, id: i32, tokens: Vec<Token>) -> Result<(), IrError> {
        if self.messages.contains_key(&id) {
            return Err(IrError::DuplicateMessage { id });
        }
        if tokens.first().map(|t| t.signal) != Some(Signal::BeginMessage) {
            return Err(IrError::InvalidMessage {
                id,
                reason: "first token is not BEGIN_MESSAGE",
            });
        }
        check_balanced(&tokens)?;
        if end_index(&tokens, 0) != tokens.len() - 1 {
            return Err(IrError::InvalidMessage {
                id,
                reason: "tokens follow END_MESSAGE",
            });
        }

        debug!(id, name = %tokens[0].name, tokens = tokens.len(), "adding message");
        self.capture_types(&tokens);
        self.messages.insert(id, tokens);
        Ok(())
    }

    fn capture_types(&mut self, tokens: &[Token]) {
        for (i, token) in tokens.iter().enumerate() {
            if matches!(
                token.signal,
                Signal::BeginComposite | Signal::BeginEnum | Signal::BeginSet
            ) {
                let end = end_index(tokens, i);
                self.types
                    .entry(token.type_name().to_owned())
                    .or_insert_with(|| tokens[i..=end].to_vec());
            }
        }
    }

    pub fn info(&self) -> &SchemaInfo {
        &self.info
    }

    pub fn package_name(&self) -> &str {
        &self.info.package_name
    }

    pub fn id(&self) -> i32 {
        self.info.id
    }

    pub fn version(&self) -> u32 {
        self.info.version
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.info.byte_order
    }

    pub fn header_tokens(&self) -> &[Token] {
        &self.header_tokens
    }

    pub fn header_structure(&self) -> &HeaderStructure {
        &self.header_structure
    }

    /// Token list of the message with the given template id.
    pub fn message(&self, id: i32) -> Option<&[Token]> {
        self.messages.get(&id).map(Vec::as_slice)
    }

    /// Find a message by the name on its BEGIN_MESSAGE token.
    pub fn message_by_name(&self, name: &str) -> Option<&[Token]> {
        self.messages
            .values()
            .find(|tokens| tokens[0].name == name)
            .map(Vec::as_slice)
    }

    /// All messages in ascending id order.
    pub fn messages(&self) -> impl Iterator<Item = (i32, &[Token])> {
        self.messages.iter().map(|(id, t)| (*id, t.as_slice()))
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Token list of a composite, enum or set by type name.
    pub fn type_by_name(&self, name: &str) -> Option<&[Token]> {
        self.types.get(name).map(Vec::as_slice)
    }

    /// All captured types in name order.
    pub fn types(&self) -> impl Iterator<Item = (&str, &[Token])> {
        self.types.iter().map(|(n, t)| (n.as_str(), t.as_slice()))
    }
}
