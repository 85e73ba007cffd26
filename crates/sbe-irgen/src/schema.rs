//! Hierarchical schema tree consumed by the generator.
//!
//! The tree is plain data. Tooling usually loads it from JSON, and every
//! struct here deserializes with camelCase keys:
//!
//! ```json
//! {
//!   "package": "baseline", "id": 1, "version": 0,
//!   "types": [
//!     { "kind": "type", "name": "VehicleCode", "primitiveType": "char", "length": 6 }
//!   ],
//!   "messages": [
//!     { "name": "Car", "id": 1,
//!       "fields": [ { "name": "serialNumber", "id": 1, "type": "uint64" } ] }
//!   ]
//! }
//! ```
//!
//! Within a message or group the layout order is fixed: `fields` form
//! the block, then `groups`, then `data`.

use sbe_types::{ByteOrder, Presence, PrimitiveType};
use serde::Deserialize;

pub const DEFAULT_HEADER_TYPE: &str = "messageHeader";

fn default_header_type() -> String {
    DEFAULT_HEADER_TYPE.to_owned()
}

fn default_length() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSchema {
    pub package: String,
    #[serde(default)]
    pub namespace: Option<String>,
    pub id: i32,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub semantic_version: Option<String>,
    #[serde(default)]
    pub byte_order: ByteOrder,
    /// Composite used as the message header.
    #[serde(default = "default_header_type")]
    pub header_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

// ── Types ─────────────────────────────────────────────────────────────

/// A named type declared at schema level.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeDef {
    Type(EncodedType),
    Composite(CompositeType),
    Enum(EnumType),
    Set(SetType),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            Self::Type(t) => &t.name,
            Self::Composite(t) => &t.name,
            Self::Enum(t) => &t.name,
            Self::Set(t) => &t.name,
        }
    }

    pub fn since_version(&self) -> u32 {
        match self {
            Self::Type(t) => t.since_version,
            Self::Composite(t) => t.since_version,
            Self::Enum(t) => t.since_version,
            Self::Set(t) => t.since_version,
        }
    }

    /// Schema word for this kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Type(_) => "type",
            Self::Composite(_) => "composite",
            Self::Enum(_) => "enum",
            Self::Set(_) => "set",
        }
    }
}

/// A scalar or fixed array of one primitive type.
///
/// `length` counts elements; 0 marks the variable-length payload of a
/// var-data composite.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedType {
    pub name: String,
    pub primitive_type: PrimitiveType,
    #[serde(default = "default_length")]
    pub length: u32,
    #[serde(default)]
    pub presence: Presence,
    #[serde(default)]
    pub const_value: Option<String>,
    #[serde(default)]
    pub min_value: Option<String>,
    #[serde(default)]
    pub max_value: Option<String>,
    #[serde(default)]
    pub null_value: Option<String>,
    #[serde(default)]
    pub character_encoding: Option<String>,
    #[serde(default)]
    pub semantic_type: Option<String>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub since_version: u32,
    #[serde(default)]
    pub deprecated: u32,
    #[serde(default)]
    pub description: Option<String>,
}

impl EncodedType {
    pub fn is_variable_length(&self) -> bool {
        self.length == 0
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeType {
    pub name: String,
    pub elements: Vec<CompositeElement>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub semantic_type: Option<String>,
    #[serde(default)]
    pub since_version: u32,
    #[serde(default)]
    pub deprecated: u32,
    #[serde(default)]
    pub description: Option<String>,
}

/// One member of a composite, declared inline or by reference.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CompositeElement {
    Type(EncodedType),
    Composite(CompositeType),
    Enum(EnumType),
    Set(SetType),
    Ref(TypeRef),
}

impl CompositeElement {
    pub fn name(&self) -> &str {
        match self {
            Self::Type(t) => &t.name,
            Self::Composite(t) => &t.name,
            Self::Enum(t) => &t.name,
            Self::Set(t) => &t.name,
            Self::Ref(r) => &r.name,
        }
    }

    pub fn offset(&self) -> Option<u32> {
        match self {
            Self::Type(t) => t.offset,
            Self::Composite(t) => t.offset,
            Self::Enum(t) => t.offset,
            Self::Set(t) => t.offset,
            Self::Ref(r) => r.offset,
        }
    }

    pub fn since_version(&self) -> u32 {
        match self {
            Self::Type(t) => t.since_version,
            Self::Composite(t) => t.since_version,
            Self::Enum(t) => t.since_version,
            Self::Set(t) => t.since_version,
            Self::Ref(r) => r.since_version,
        }
    }
}

/// A composite member that reuses a named type under its own name.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub since_version: u32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumType {
    pub name: String,
    /// Primitive name (`"uint8"`, `"char"`) or a named `type`.
    pub encoding_type: String,
    #[serde(default)]
    pub presence: Presence,
    #[serde(default)]
    pub null_value: Option<String>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub semantic_type: Option<String>,
    #[serde(default)]
    pub since_version: u32,
    #[serde(default)]
    pub deprecated: u32,
    #[serde(default)]
    pub description: Option<String>,
    pub valid_values: Vec<ValidValue>,
}

impl EnumType {
    pub fn valid_value(&self, name: &str) -> Option<&ValidValue> {
        self.valid_values.iter().find(|v| v.name == name)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidValue {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub since_version: u32,
    #[serde(default)]
    pub deprecated: u32,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetType {
    pub name: String,
    /// Unsigned primitive name or a named `type`.
    pub encoding_type: String,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub semantic_type: Option<String>,
    #[serde(default)]
    pub since_version: u32,
    #[serde(default)]
    pub deprecated: u32,
    #[serde(default)]
    pub description: Option<String>,
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub name: String,
    pub bit: u32,
    #[serde(default)]
    pub since_version: u32,
    #[serde(default)]
    pub deprecated: u32,
    #[serde(default)]
    pub description: Option<String>,
}

// ── Messages ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub name: String,
    pub id: i32,
    /// Declared root block width; may only pad the computed width.
    #[serde(default)]
    pub block_length: Option<u32>,
    #[serde(default)]
    pub semantic_type: Option<String>,
    #[serde(default)]
    pub since_version: u32,
    #[serde(default)]
    pub deprecated: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub data: Vec<VarData>,
}

/// A repeating group. Its body has the same shape as a message.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: String,
    pub id: i32,
    /// Composite carrying `blockLength` and `numInGroup`.
    #[serde(default)]
    pub dimension_type: Option<String>,
    #[serde(default)]
    pub block_length: Option<u32>,
    #[serde(default)]
    pub semantic_type: Option<String>,
    #[serde(default)]
    pub since_version: u32,
    #[serde(default)]
    pub deprecated: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub data: Vec<VarData>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub id: i32,
    /// Primitive name or named type.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub presence: Option<Presence>,
    /// `"EnumName.ValueName"` for constant fields.
    #[serde(default)]
    pub value_ref: Option<String>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub epoch: Option<String>,
    #[serde(default)]
    pub time_unit: Option<String>,
    #[serde(default)]
    pub semantic_type: Option<String>,
    #[serde(default)]
    pub since_version: u32,
    #[serde(default)]
    pub deprecated: u32,
    #[serde(default)]
    pub description: Option<String>,
}

impl Field {
    pub fn is_constant(&self) -> bool {
        self.presence == Some(Presence::Constant)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarData {
    pub name: String,
    pub id: i32,
    /// Composite carrying `length` and `varData`.
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub semantic_type: Option<String>,
    #[serde(default)]
    pub since_version: u32,
    #[serde(default)]
    pub deprecated: u32,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_schema_fills_defaults() {
        let schema: MessageSchema = serde_json::from_str(
            r#"{ "package": "p", "id": 7,
                 "messages": [ { "name": "M", "id": 1,
                   "fields": [ { "name": "a", "id": 1, "type": "uint32" } ] } ] }"#,
        )
        .unwrap();
        assert_eq!(schema.version, 0);
        assert_eq!(schema.byte_order, ByteOrder::LittleEndian);
        assert_eq!(schema.header_type, "messageHeader");
        assert_eq!(schema.messages[0].fields[0].type_name, "uint32");
        assert!(schema.messages[0].groups.is_empty());
    }

    #[test]
    fn tagged_types_and_refs() {
        let schema: MessageSchema = serde_json::from_str(
            r#"{ "package": "p", "id": 1, "byteOrder": "bigEndian",
                 "types": [
                   { "kind": "type", "name": "Code", "primitiveType": "char", "length": 6 },
                   { "kind": "composite", "name": "Booster", "elements": [
                       { "kind": "ref", "name": "code", "type": "Code", "offset": 2 },
                       { "kind": "enum", "name": "Kind", "encodingType": "char",
                         "validValues": [ { "name": "A", "value": "A" } ] } ] } ] }"#,
        )
        .unwrap();
        assert_eq!(schema.byte_order, ByteOrder::BigEndian);
        let TypeDef::Composite(booster) = &schema.types[1] else {
            panic!("expected composite");
        };
        assert!(matches!(
            &booster.elements[0],
            CompositeElement::Ref(TypeRef { type_name, offset: Some(2), .. }) if type_name == "Code"
        ));
        assert_eq!(booster.elements[1].name(), "Kind");
        assert_eq!(schema.types[0].kind(), "type");
    }
}
