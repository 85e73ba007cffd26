//! Schema checks that run before any token is emitted.
//!
//! The order matters: references are resolved first, then cycles are
//! ruled out, and only then are lengths computed (a cyclic composite has
//! no length).

use std::collections::{HashMap, HashSet};

use sbe_ir::HeaderStructure;
use sbe_types::{PrimitiveType, PrimitiveValue};

use crate::config::GeneratorConfig;
use crate::error::SchemaError;
use crate::registry::{ResolvedType, TypeRegistry, primitive_width};
use crate::schema::{
    CompositeElement, CompositeType, EncodedType, EnumType, Field, Group, Message, MessageSchema, SetType,
    TypeDef, ValidValue, VarData,
};

pub const DIMENSION_BLOCK_LENGTH: &str = "blockLength";
pub const DIMENSION_NUM_IN_GROUP: &str = "numInGroup";
pub const VAR_DATA_LENGTH: &str = "length";
pub const VAR_DATA_PAYLOAD: &str = "varData";

/// Run every check against `schema`.
///
/// # Errors
///
/// The first [`SchemaError`] found.
pub fn validate(
    schema: &MessageSchema,
    registry: &TypeRegistry<'_>,
    config: &GeneratorConfig,
) -> Result<(), SchemaError> {
    check_references(schema, registry, config)?;
    check_cycles(registry)?;
    check_versions(schema)?;
    check_header(schema, registry)?;
    for def in registry.iter() {
        check_type(def, registry)?;
    }
    check_messages(schema, registry, config)
}

// ── References ────────────────────────────────────────────────────────

fn check_references(
    schema: &MessageSchema,
    registry: &TypeRegistry<'_>,
    config: &GeneratorConfig,
) -> Result<(), SchemaError> {
    registry.named(&schema.header_type, "message header")?;
    for def in registry.iter() {
        match def {
            TypeDef::Composite(c) => check_composite_refs(c, registry)?,
            TypeDef::Enum(e) => {
                registry.resolve(&e.encoding_type, &e.name)?;
            }
            TypeDef::Set(s) => {
                registry.resolve(&s.encoding_type, &s.name)?;
            }
            TypeDef::Type(_) => {}
        }
    }
    for message in &schema.messages {
        check_block_refs(&message.fields, &message.groups, &message.data, registry, config)?;
    }
    Ok(())
}

fn check_composite_refs(composite: &CompositeType, registry: &TypeRegistry<'_>) -> Result<(), SchemaError> {
    for element in &composite.elements {
        match element {
            CompositeElement::Ref(r) => {
                registry.named(&r.type_name, &r.name)?;
            }
            CompositeElement::Composite(c) => check_composite_refs(c, registry)?,
            CompositeElement::Enum(e) => {
                registry.resolve(&e.encoding_type, &e.name)?;
            }
            CompositeElement::Set(s) => {
                registry.resolve(&s.encoding_type, &s.name)?;
            }
            CompositeElement::Type(_) => {}
        }
    }
    Ok(())
}

fn check_block_refs(
    fields: &[Field],
    groups: &[Group],
    data: &[VarData],
    registry: &TypeRegistry<'_>,
    config: &GeneratorConfig,
) -> Result<(), SchemaError> {
    for field in fields {
        registry.resolve(&field.type_name, &field.name)?;
    }
    for group in groups {
        let dimension = group.dimension_type.as_deref().unwrap_or(&config.default_dimension_type);
        registry.named(dimension, &group.name)?;
        check_block_refs(&group.fields, &group.groups, &group.data, registry, config)?;
    }
    for var in data {
        let type_name = var.type_name.as_deref().unwrap_or(&config.default_var_data_type);
        registry.named(type_name, &var.name)?;
    }
    Ok(())
}

// ── Cycles ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Depth-first search over the composite reference graph.
///
/// Only refs create edges; inline composites belong to the named type
/// that declares them.
fn check_cycles(registry: &TypeRegistry<'_>) -> Result<(), SchemaError> {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut path: Vec<&str> = Vec::new();
    for def in registry.iter() {
        if let TypeDef::Composite(c) = def {
            visit(c, registry, &mut marks, &mut path)?;
        }
    }
    Ok(())
}

fn visit<'a>(
    composite: &'a CompositeType,
    registry: &TypeRegistry<'a>,
    marks: &mut HashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
) -> Result<(), SchemaError> {
    let name = composite.name.as_str();
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            let start = path.iter().position(|p| *p == name).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|s| (*s).to_owned()).collect();
            cycle.push(name.to_owned());
            return Err(SchemaError::CyclicTypeReference { path: cycle });
        }
        None => {}
    }

    marks.insert(name, Mark::Visiting);
    path.push(name);
    let mut targets = Vec::new();
    collect_refs(composite, &mut targets);
    for target in targets {
        if let Some(TypeDef::Composite(next)) = registry.get(target) {
            visit(next, registry, marks, path)?;
        }
    }
    path.pop();
    marks.insert(name, Mark::Done);
    Ok(())
}

fn collect_refs<'a>(composite: &'a CompositeType, out: &mut Vec<&'a str>) {
    for element in &composite.elements {
        match element {
            CompositeElement::Ref(r) => out.push(&r.type_name),
            CompositeElement::Composite(inner) => collect_refs(inner, out),
            _ => {}
        }
    }
}

// ── Versions ──────────────────────────────────────────────────────────

/// Members must not outlive the schema, and within one list a member may
/// not be declared before an older one: older readers see only a prefix
/// of each block.
fn check_versions(schema: &MessageSchema) -> Result<(), SchemaError> {
    let limit = schema.version;
    for def in &schema.types {
        check_since(def.name(), def.since_version(), limit)?;
        match def {
            TypeDef::Composite(c) => check_composite_versions(c, limit)?,
            TypeDef::Enum(e) => check_enum_versions(e, limit)?,
            TypeDef::Set(s) => check_set_versions(s, limit)?,
            TypeDef::Type(_) => {}
        }
    }
    for message in &schema.messages {
        check_since(&message.name, message.since_version, limit)?;
        check_block_versions(&message.fields, &message.groups, &message.data, limit)?;
    }
    Ok(())
}

fn check_since(name: &str, since_version: u32, schema_version: u32) -> Result<(), SchemaError> {
    if since_version > schema_version {
        return Err(SchemaError::SinceVersionExceedsSchema {
            name: name.to_owned(),
            since_version,
            schema_version,
        });
    }
    Ok(())
}

fn check_ordered<'a>(members: impl IntoIterator<Item = (&'a str, u32)>, limit: u32) -> Result<(), SchemaError> {
    let mut newest: Option<(&str, u32)> = None;
    for (name, since_version) in members {
        check_since(name, since_version, limit)?;
        if let Some((previous, previous_version)) = newest {
            if since_version < previous_version {
                return Err(SchemaError::SinceVersionOutOfOrder {
                    name: name.to_owned(),
                    since_version,
                    previous: previous.to_owned(),
                    previous_version,
                });
            }
        }
        newest = Some((name, since_version));
    }
    Ok(())
}

fn check_composite_versions(composite: &CompositeType, limit: u32) -> Result<(), SchemaError> {
    check_ordered(
        composite.elements.iter().map(|e| (e.name(), e.since_version())),
        limit,
    )?;
    for element in &composite.elements {
        match element {
            CompositeElement::Composite(c) => check_composite_versions(c, limit)?,
            CompositeElement::Enum(e) => check_enum_versions(e, limit)?,
            CompositeElement::Set(s) => check_set_versions(s, limit)?,
            CompositeElement::Type(_) | CompositeElement::Ref(_) => {}
        }
    }
    Ok(())
}

fn check_enum_versions(e: &EnumType, limit: u32) -> Result<(), SchemaError> {
    e.valid_values
        .iter()
        .try_for_each(|v| check_since(&v.name, v.since_version, limit))
}

fn check_set_versions(s: &SetType, limit: u32) -> Result<(), SchemaError> {
    s.choices
        .iter()
        .try_for_each(|c| check_since(&c.name, c.since_version, limit))
}

fn check_block_versions(fields: &[Field], groups: &[Group], data: &[VarData], limit: u32) -> Result<(), SchemaError> {
    check_ordered(fields.iter().map(|f| (f.name.as_str(), f.since_version)), limit)?;
    check_ordered(groups.iter().map(|g| (g.name.as_str(), g.since_version)), limit)?;
    check_ordered(data.iter().map(|d| (d.name.as_str(), d.since_version)), limit)?;
    for group in groups {
        check_block_versions(&group.fields, &group.groups, &group.data, limit)?;
    }
    Ok(())
}

// ── Structural composites ─────────────────────────────────────────────

fn is_unsigned_integer(t: PrimitiveType) -> bool {
    t.is_unsigned() && t.is_integer()
}

fn unsigned_member(registry: &TypeRegistry<'_>, composite: &CompositeType, name: &str) -> bool {
    registry
        .scalar_member(composite, name)
        .is_some_and(|t| t.length == 1 && is_unsigned_integer(t.primitive_type))
}

fn check_header(schema: &MessageSchema, registry: &TypeRegistry<'_>) -> Result<(), SchemaError> {
    let header = registry.composite(&schema.header_type, "message header", "schema")?;
    for field in [
        HeaderStructure::BLOCK_LENGTH,
        HeaderStructure::TEMPLATE_ID,
        HeaderStructure::SCHEMA_ID,
        HeaderStructure::VERSION,
    ] {
        if !unsigned_member(registry, header, field) {
            return Err(SchemaError::MissingHeaderField {
                type_name: header.name.clone(),
                field,
            });
        }
    }
    Ok(())
}

fn check_dimension(type_name: &str, group: &str, registry: &TypeRegistry<'_>) -> Result<(), SchemaError> {
    let dimension = registry.composite(type_name, "group dimension", group)?;
    for field in [DIMENSION_BLOCK_LENGTH, DIMENSION_NUM_IN_GROUP] {
        if !unsigned_member(registry, dimension, field) {
            return Err(SchemaError::MissingDimensionField {
                type_name: type_name.to_owned(),
                field,
            });
        }
    }
    Ok(())
}

fn check_var_data_type(type_name: &str, var: &str, registry: &TypeRegistry<'_>) -> Result<(), SchemaError> {
    let composite = registry.composite(type_name, "var data", var)?;
    if !unsigned_member(registry, composite, VAR_DATA_LENGTH) {
        return Err(SchemaError::MissingVarDataField {
            type_name: type_name.to_owned(),
            field: VAR_DATA_LENGTH,
        });
    }
    let payload = registry.scalar_member(composite, VAR_DATA_PAYLOAD);
    if !payload.is_some_and(EncodedType::is_variable_length) {
        return Err(SchemaError::MissingVarDataField {
            type_name: type_name.to_owned(),
            field: VAR_DATA_PAYLOAD,
        });
    }
    Ok(())
}

// ── Types ─────────────────────────────────────────────────────────────

fn check_type(def: &TypeDef, registry: &TypeRegistry<'_>) -> Result<(), SchemaError> {
    match def {
        TypeDef::Type(t) => check_encoded(t),
        TypeDef::Composite(c) => check_composite(c, registry),
        TypeDef::Enum(e) => check_enum(e, registry),
        TypeDef::Set(s) => check_set(s, registry),
    }
}

pub(crate) fn parse_value(name: &str, t: PrimitiveType, text: &str) -> Result<PrimitiveValue, SchemaError> {
    PrimitiveValue::parse(t, text).map_err(|source| SchemaError::InvalidValue {
        name: name.to_owned(),
        source,
    })
}

fn check_encoded(t: &EncodedType) -> Result<(), SchemaError> {
    if t.presence == sbe_types::Presence::Constant && t.const_value.is_none() {
        return Err(SchemaError::MissingConstValue { name: t.name.clone() });
    }
    // Char array constants are strings, so only scalar literals are parsed.
    let char_array = t.primitive_type == PrimitiveType::Char && t.length != 1;
    for text in [&t.const_value, &t.min_value, &t.max_value, &t.null_value]
        .into_iter()
        .flatten()
    {
        if !char_array {
            parse_value(&t.name, t.primitive_type, text)?;
        }
    }
    Ok(())
}

fn check_composite(composite: &CompositeType, registry: &TypeRegistry<'_>) -> Result<(), SchemaError> {
    check_unique_names(
        &format!("composite {}", composite.name),
        composite.elements.iter().map(CompositeElement::name),
    )?;
    registry.composite_length(composite)?;
    for element in &composite.elements {
        match element {
            CompositeElement::Type(t) => check_encoded(t)?,
            CompositeElement::Composite(c) => check_composite(c, registry)?,
            CompositeElement::Enum(e) => check_enum(e, registry)?,
            CompositeElement::Set(s) => check_set(s, registry)?,
            CompositeElement::Ref(_) => {}
        }
    }
    Ok(())
}

fn check_enum(e: &EnumType, registry: &TypeRegistry<'_>) -> Result<(), SchemaError> {
    let t = registry.encoding_primitive(&e.encoding_type, &e.name)?;
    if !t.is_integer() {
        return Err(SchemaError::InvalidEncodingType {
            name: e.name.clone(),
            encoding_type: e.encoding_type.clone(),
        });
    }
    check_unique_names(
        &format!("enum {}", e.name),
        e.valid_values.iter().map(|v| v.name.as_str()),
    )?;
    if let Some(null) = &e.null_value {
        parse_value(&e.name, t, null)?;
    }
    for ValidValue { name, value, .. } in &e.valid_values {
        parse_value(name, t, value)?;
    }
    Ok(())
}

fn check_set(s: &SetType, registry: &TypeRegistry<'_>) -> Result<(), SchemaError> {
    let t = registry.encoding_primitive(&s.encoding_type, &s.name)?;
    if !is_unsigned_integer(t) {
        return Err(SchemaError::InvalidEncodingType {
            name: s.name.clone(),
            encoding_type: s.encoding_type.clone(),
        });
    }
    check_unique_names(&format!("set {}", s.name), s.choices.iter().map(|c| c.name.as_str()))?;
    let width_bits = primitive_width(t) * 8;
    for choice in &s.choices {
        if choice.bit >= width_bits {
            return Err(SchemaError::InvalidChoiceBit {
                set: s.name.clone(),
                choice: choice.name.clone(),
                bit: choice.bit,
                width_bits,
            });
        }
    }
    Ok(())
}

fn check_unique_names<'a>(scope: &str, names: impl IntoIterator<Item = &'a str>) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(SchemaError::DuplicateName {
                scope: scope.to_owned(),
                name: name.to_owned(),
            });
        }
    }
    Ok(())
}

fn check_unique_ids(scope: &str, ids: impl IntoIterator<Item = i32>) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SchemaError::DuplicateId {
                scope: scope.to_owned(),
                id,
            });
        }
    }
    Ok(())
}

// ── Messages ──────────────────────────────────────────────────────────

fn check_messages(
    schema: &MessageSchema,
    registry: &TypeRegistry<'_>,
    config: &GeneratorConfig,
) -> Result<(), SchemaError> {
    check_unique_ids("schema", schema.messages.iter().map(|m| m.id))?;
    check_unique_names("schema", schema.messages.iter().map(|m| m.name.as_str()))?;
    for message in &schema.messages {
        check_message(message, registry, config)?;
    }
    Ok(())
}

fn check_message(message: &Message, registry: &TypeRegistry<'_>, config: &GeneratorConfig) -> Result<(), SchemaError> {
    check_block(
        &format!("message {}", message.name),
        &message.fields,
        &message.groups,
        &message.data,
        registry,
        config,
    )
}

fn check_block(
    scope: &str,
    fields: &[Field],
    groups: &[Group],
    data: &[VarData],
    registry: &TypeRegistry<'_>,
    config: &GeneratorConfig,
) -> Result<(), SchemaError> {
    let ids = fields
        .iter()
        .map(|f| f.id)
        .chain(groups.iter().map(|g| g.id))
        .chain(data.iter().map(|d| d.id));
    check_unique_ids(scope, ids)?;
    let names = fields
        .iter()
        .map(|f| f.name.as_str())
        .chain(groups.iter().map(|g| g.name.as_str()))
        .chain(data.iter().map(|d| d.name.as_str()));
    check_unique_names(scope, names)?;

    for field in fields {
        check_field(field, registry)?;
    }
    for group in groups {
        let dimension = group.dimension_type.as_deref().unwrap_or(&config.default_dimension_type);
        check_dimension(dimension, &group.name, registry)?;
        check_block(
            &format!("{scope}.{}", group.name),
            &group.fields,
            &group.groups,
            &group.data,
            registry,
            config,
        )?;
    }
    for var in data {
        let type_name = var.type_name.as_deref().unwrap_or(&config.default_var_data_type);
        check_var_data_type(type_name, &var.name, registry)?;
    }
    Ok(())
}

fn check_field(field: &Field, registry: &TypeRegistry<'_>) -> Result<(), SchemaError> {
    let resolved = registry.resolve(&field.type_name, &field.name)?;
    if let ResolvedType::Named(def) = resolved {
        if registry.length(def)?.is_none() {
            return Err(SchemaError::VarDataInBlock {
                name: field.name.clone(),
            });
        }
    }

    let referenced = match &field.value_ref {
        Some(value_ref) => Some(resolve_value_ref(field, value_ref, registry)?),
        None => None,
    };

    if !field.is_constant() {
        return Ok(());
    }

    let mismatch = |reason| SchemaError::InvalidValueRef {
        field: field.name.clone(),
        value_ref: field.value_ref.clone().unwrap_or_default(),
        reason,
    };
    match (resolved, referenced) {
        (ResolvedType::Named(TypeDef::Type(t)), None) if t.const_value.is_some() => Ok(()),
        (_, None) => Err(SchemaError::MissingConstValue {
            name: field.name.clone(),
        }),
        (ResolvedType::Named(TypeDef::Enum(e)), Some((target, _))) if e.name == target.name => Ok(()),
        (ResolvedType::Named(TypeDef::Enum(_)), Some(_)) => Err(mismatch("names a different enum")),
        (ResolvedType::Primitive(t), Some((target, _))) => {
            let encoding = registry.encoding_primitive(&target.encoding_type, &target.name)?;
            if t == encoding {
                Ok(())
            } else {
                Err(mismatch("enum encoding does not match the field type"))
            }
        }
        (ResolvedType::Named(TypeDef::Type(t)), Some((target, _))) => {
            let encoding = registry.encoding_primitive(&target.encoding_type, &target.name)?;
            if t.primitive_type == encoding && t.length == 1 {
                Ok(())
            } else {
                Err(mismatch("enum encoding does not match the field type"))
            }
        }
        (ResolvedType::Named(_), Some(_)) => Err(mismatch("field type cannot hold an enum value")),
    }
}

/// Split `"Enum.Value"` and find both halves.
///
/// # Errors
///
/// [`SchemaError::InvalidValueRef`] describing what is wrong.
pub(crate) fn resolve_value_ref<'a>(
    field: &Field,
    value_ref: &str,
    registry: &TypeRegistry<'a>,
) -> Result<(&'a EnumType, &'a ValidValue), SchemaError> {
    let invalid = |reason| SchemaError::InvalidValueRef {
        field: field.name.clone(),
        value_ref: value_ref.to_owned(),
        reason,
    };
    let (enum_name, value_name) = value_ref
        .split_once('.')
        .filter(|(e, v)| !e.is_empty() && !v.is_empty())
        .ok_or_else(|| invalid("expected EnumName.ValueName"))?;
    let Some(def) = registry.get(enum_name) else {
        return Err(invalid("enum not found"));
    };
    let TypeDef::Enum(e) = def else {
        return Err(invalid("not an enum"));
    };
    let value = e.valid_value(value_name).ok_or_else(|| invalid("valid value not found"))?;
    Ok((e, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> MessageSchema {
        serde_json::from_value(value).unwrap()
    }

    fn run(value: serde_json::Value) -> Result<(), SchemaError> {
        let schema = schema(value);
        let registry = TypeRegistry::new(&schema.types)?;
        validate(&schema, &registry, &GeneratorConfig::default())
    }

    fn header() -> serde_json::Value {
        json!({ "kind": "composite", "name": "messageHeader", "elements": [
            { "kind": "type", "name": "blockLength", "primitiveType": "uint16" },
            { "kind": "type", "name": "templateId", "primitiveType": "uint16" },
            { "kind": "type", "name": "schemaId", "primitiveType": "uint16" },
            { "kind": "type", "name": "version", "primitiveType": "uint16" }
        ]})
    }

    #[test]
    fn accepts_minimal_schema() {
        run(json!({ "package": "p", "id": 1, "types": [header()],
            "messages": [{ "name": "M", "id": 1,
                "fields": [{ "name": "a", "id": 1, "type": "int32" }] }] }))
        .unwrap();
    }

    #[test]
    fn missing_header_field_named() {
        let result = run(json!({ "package": "p", "id": 1, "types": [
            { "kind": "composite", "name": "messageHeader", "elements": [
                { "kind": "type", "name": "blockLength", "primitiveType": "uint16" },
                { "kind": "type", "name": "templateId", "primitiveType": "uint16" },
                { "kind": "type", "name": "version", "primitiveType": "uint16" }
            ]}] }));
        assert!(matches!(
            result,
            Err(SchemaError::MissingHeaderField { field: "schemaId", .. })
        ));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let result = run(json!({ "package": "p", "id": 1, "types": [header(),
            { "kind": "composite", "name": "Loop", "elements": [
                { "kind": "ref", "name": "inner", "type": "Loop" } ] } ] }));
        assert!(matches!(
            result,
            Err(SchemaError::CyclicTypeReference { path }) if path == ["Loop", "Loop"]
        ));
    }

    #[test]
    fn cycle_through_inline_composite() {
        let result = run(json!({ "package": "p", "id": 1, "types": [header(),
            { "kind": "composite", "name": "A", "elements": [
                { "kind": "composite", "name": "wrapper", "elements": [
                    { "kind": "ref", "name": "b", "type": "B" } ] } ] },
            { "kind": "composite", "name": "B", "elements": [
                { "kind": "ref", "name": "a", "type": "A" } ] } ] }));
        assert!(matches!(
            result,
            Err(SchemaError::CyclicTypeReference { path }) if path == ["A", "B", "A"]
        ));
    }

    #[test]
    fn out_of_order_versions_rejected() {
        let result = run(json!({ "package": "p", "id": 1, "version": 2, "types": [header()],
            "messages": [{ "name": "M", "id": 1, "fields": [
                { "name": "a", "id": 1, "type": "int32", "sinceVersion": 2 },
                { "name": "b", "id": 2, "type": "int32", "sinceVersion": 1 } ] }] }));
        assert!(matches!(
            result,
            Err(SchemaError::SinceVersionOutOfOrder { name, previous, .. }) if name == "b" && previous == "a"
        ));
    }

    #[test]
    fn duplicate_ids_across_fields_and_groups() {
        let result = run(json!({ "package": "p", "id": 1, "types": [header(),
            { "kind": "composite", "name": "groupSizeEncoding", "elements": [
                { "kind": "type", "name": "blockLength", "primitiveType": "uint16" },
                { "kind": "type", "name": "numInGroup", "primitiveType": "uint16" } ] } ],
            "messages": [{ "name": "M", "id": 1,
                "fields": [{ "name": "a", "id": 5, "type": "int32" }],
                "groups": [{ "name": "g", "id": 5 }] }] }));
        assert!(matches!(
            result,
            Err(SchemaError::DuplicateId { id: 5, scope }) if scope == "message M"
        ));
    }

    #[test]
    fn since_version_beyond_schema_rejected() {
        let result = run(json!({ "package": "p", "id": 1, "version": 1, "types": [header()],
            "messages": [{ "name": "M", "id": 1, "fields": [
                { "name": "a", "id": 1, "type": "int32", "sinceVersion": 3 } ] }] }));
        assert!(matches!(
            result,
            Err(SchemaError::SinceVersionExceedsSchema { name, since_version: 3, schema_version: 1 }) if name == "a"
        ));
    }

    #[test]
    fn dimension_without_num_in_group_rejected() {
        let result = run(json!({ "package": "p", "id": 1, "types": [header(),
            { "kind": "composite", "name": "groupSizeEncoding", "elements": [
                { "kind": "type", "name": "blockLength", "primitiveType": "uint16" } ] } ],
            "messages": [{ "name": "M", "id": 1,
                "groups": [{ "name": "g", "id": 1 }] }] }));
        assert!(matches!(
            result,
            Err(SchemaError::MissingDimensionField { type_name, field: "numInGroup" }) if type_name == "groupSizeEncoding"
        ));
    }

    #[test]
    fn choice_bit_must_fit() {
        let result = run(json!({ "package": "p", "id": 1, "types": [header(),
            { "kind": "set", "name": "Flags", "encodingType": "uint8",
              "choices": [{ "name": "high", "bit": 8 }] } ] }));
        assert!(matches!(
            result,
            Err(SchemaError::InvalidChoiceBit { bit: 8, width_bits: 8, .. })
        ));
    }

    #[test]
    fn value_ref_must_name_a_valid_value() {
        let result = run(json!({ "package": "p", "id": 1, "types": [header(),
            { "kind": "enum", "name": "Model", "encodingType": "char",
              "validValues": [{ "name": "A", "value": "A" }] } ],
            "messages": [{ "name": "M", "id": 1, "fields": [
                { "name": "m", "id": 1, "type": "Model", "presence": "constant",
                  "valueRef": "Model.Z" } ] }] }));
        assert!(matches!(
            result,
            Err(SchemaError::InvalidValueRef { reason: "valid value not found", .. })
        ));
    }

    #[test]
    fn constant_enum_field_needs_value_ref() {
        let result = run(json!({ "package": "p", "id": 1, "types": [header(),
            { "kind": "enum", "name": "Model", "encodingType": "char",
              "validValues": [{ "name": "A", "value": "A" }] } ],
            "messages": [{ "name": "M", "id": 1, "fields": [
                { "name": "m", "id": 1, "type": "Model", "presence": "constant" } ] }] }));
        assert!(matches!(result, Err(SchemaError::MissingConstValue { name }) if name == "m"));
    }

    #[test]
    fn var_data_type_cannot_be_a_field() {
        let result = run(json!({ "package": "p", "id": 1, "types": [header(),
            { "kind": "composite", "name": "varDataEncoding", "elements": [
                { "kind": "type", "name": "length", "primitiveType": "uint16" },
                { "kind": "type", "name": "varData", "primitiveType": "uint8", "length": 0 } ] } ],
            "messages": [{ "name": "M", "id": 1, "fields": [
                { "name": "blob", "id": 1, "type": "varDataEncoding" } ] }] }));
        assert!(matches!(result, Err(SchemaError::VarDataInBlock { name }) if name == "blob"));
    }

    #[test]
    fn out_of_range_literal_rejected() {
        let result = run(json!({ "package": "p", "id": 1, "types": [header(),
            { "kind": "type", "name": "Small", "primitiveType": "uint8", "maxValue": "300" } ] }));
        assert!(matches!(result, Err(SchemaError::InvalidValue { name, .. }) if name == "Small"));
    }
}
