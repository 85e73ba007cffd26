use std::fmt;

use crate::encoding::Encoding;
use crate::enums::{Presence, Signal};
use crate::primitive::PrimitiveType;

/// One entry of the flat IR.
///
/// A message is a sequence of tokens bracketed by BEGIN/END signals. The
/// arithmetic needed to decode a buffer lives in `offset`,
/// `encoded_length` and `component_token_count`; everything else is
/// descriptive.
///
/// ```text
/// ┌───────────────────────┬─────────────────────────────────────────────┐
/// │ Field                 │ Meaning                                     │
/// ├───────────────────────┼─────────────────────────────────────────────┤
/// │ id                    │ schema id, or -1 where none applies         │
/// │ offset                │ bytes from the start of the enclosing block │
/// │                       │ or composite; -1 when not static            │
/// │ encoded_length        │ bytes occupied; -1 for variable length      │
/// │ component_token_count │ tokens from here to the matching END, both  │
/// │                       │ included; 1 for leaves                      │
/// │ version               │ schema version that introduced the element  │
/// │ deprecated            │ version that deprecated it, 0 for never     │
/// └───────────────────────┴─────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub signal: Signal,
    pub name: String,
    /// Name of the named type this element was expanded from, when it
    /// differs from `name`.
    pub referenced_name: Option<String>,
    pub description: Option<String>,
    pub id: i32,
    pub version: u32,
    pub deprecated: u32,
    pub offset: i32,
    pub encoded_length: i32,
    pub component_token_count: i32,
    pub encoding: Encoding,
}

impl Token {
    pub const INVALID_ID: i32 = -1;
    pub const VARIABLE_LENGTH: i32 = -1;
    pub const UNKNOWN_OFFSET: i32 = -1;

    pub fn builder(signal: Signal, name: impl Into<String>) -> TokenBuilder {
        TokenBuilder::new(signal, name)
    }

    /// Number of elements when this token describes a fixed array.
    ///
    /// Returns 1 for scalars and 0 for constants and variable-length data.
    pub fn array_length(&self) -> usize {
        match (self.encoding.primitive_type, usize::try_from(self.encoded_length)) {
            (Some(t), Ok(len)) if self.encoding.presence != Presence::Constant => len / t.size(),
            _ => 0,
        }
    }

    pub fn is_constant_encoding(&self) -> bool {
        self.encoding.presence == Presence::Constant
    }

    pub fn is_optional_encoding(&self) -> bool {
        self.encoding.presence == Presence::Optional
    }

    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        self.encoding.primitive_type
    }

    /// Name of the type this token was expanded from.
    pub fn type_name(&self) -> &str {
        self.referenced_name.as_deref().unwrap_or(&self.name)
    }
}

/// One-line summary used by token dumps.
///
/// `BEGIN_FIELD name=fuel id=3 version=0 offset=8 length=4 count=3`
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} name={} id={} version={} offset={} length={} count={}",
            self.signal,
            self.name,
            self.id,
            self.version,
            self.offset,
            self.encoded_length,
            self.component_token_count
        )?;
        if let Some(referenced) = &self.referenced_name {
            write!(f, " ref={referenced}")?;
        }
        let e = &self.encoding;
        if let Some(t) = e.primitive_type {
            write!(f, " type={t} {}", e.presence.name())?;
        }
        if let Some(v) = &e.const_value {
            write!(f, " const={v}")?;
        }
        if let Some(v) = &e.null_value {
            write!(f, " null={v}")?;
        }
        if let Some(s) = &e.semantic_type {
            write!(f, " semantic={s}")?;
        }
        Ok(())
    }
}

/// Builder for [`Token`].
///
/// Defaults: id -1, offset 0, length 0, version 0, not deprecated,
/// component count 1, default encoding.
#[derive(Debug, Clone)]
pub struct TokenBuilder {
    token: Token,
}

impl TokenBuilder {
    pub fn new(signal: Signal, name: impl Into<String>) -> Self {
        Self {
            token: Token {
                signal,
                name: name.into(),
                referenced_name: None,
                description: None,
                id: Token::INVALID_ID,
                version: 0,
                deprecated: 0,
                offset: 0,
                encoded_length: 0,
                component_token_count: 1,
                encoding: Encoding::default(),
            },
        }
    }

    #[must_use]
    pub fn id(mut self, id: i32) -> Self {
        self.token.id = id;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: i32) -> Self {
        self.token.offset = offset;
        self
    }

    #[must_use]
    pub fn encoded_length(mut self, encoded_length: i32) -> Self {
        self.token.encoded_length = encoded_length;
        self
    }

    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.token.version = version;
        self
    }

    #[must_use]
    pub fn deprecated(mut self, deprecated: u32) -> Self {
        self.token.deprecated = deprecated;
        self
    }

    #[must_use]
    pub fn referenced_name(mut self, name: Option<String>) -> Self {
        self.token.referenced_name = name;
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.token.description = description;
        self
    }

    #[must_use]
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.token.encoding = encoding;
        self
    }

    pub fn build(self) -> Token {
        self.token
    }
}
