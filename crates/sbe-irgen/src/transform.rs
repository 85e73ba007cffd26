use tracing::debug;

use crate::schema::{CompositeElement, CompositeType, EnumType, Group, Message, MessageSchema, SetType, TypeDef};

/// Rewrites a schema as it stood at an earlier version.
///
/// Every type, composite member, valid value, choice, message, field,
/// group and var-data entry introduced after the target version is
/// dropped, and the schema version becomes the target. Generating IR from
/// the result yields what a writer at that version would have used.
pub struct SinceVersionTransform;

impl SinceVersionTransform {
    pub fn apply(schema: &MessageSchema, version: u32) -> MessageSchema {
        debug!(from = schema.version, to = version, "applying since-version transform");
        MessageSchema {
            package: schema.package.clone(),
            namespace: schema.namespace.clone(),
            id: schema.id,
            version,
            semantic_version: schema.semantic_version.clone(),
            byte_order: schema.byte_order,
            header_type: schema.header_type.clone(),
            description: schema.description.clone(),
            types: schema
                .types
                .iter()
                .filter(|t| t.since_version() <= version)
                .map(|t| type_def(t, version))
                .collect(),
            messages: schema
                .messages
                .iter()
                .filter(|m| m.since_version <= version)
                .map(|m| message(m, version))
                .collect(),
        }
    }
}

fn type_def(def: &TypeDef, version: u32) -> TypeDef {
    match def {
        TypeDef::Type(t) => TypeDef::Type(t.clone()),
        TypeDef::Composite(c) => TypeDef::Composite(composite(c, version)),
        TypeDef::Enum(e) => TypeDef::Enum(enum_type(e, version)),
        TypeDef::Set(s) => TypeDef::Set(set_type(s, version)),
    }
}

fn composite(c: &CompositeType, version: u32) -> CompositeType {
    CompositeType {
        elements: c
            .elements
            .iter()
            .filter(|e| e.since_version() <= version)
            .map(|e| match e {
                CompositeElement::Composite(inner) => CompositeElement::Composite(composite(inner, version)),
                CompositeElement::Enum(inner) => CompositeElement::Enum(enum_type(inner, version)),
                CompositeElement::Set(inner) => CompositeElement::Set(set_type(inner, version)),
                other => other.clone(),
            })
            .collect(),
        ..c.clone()
    }
}

fn enum_type(e: &EnumType, version: u32) -> EnumType {
    let mut e = e.clone();
    e.valid_values.retain(|v| v.since_version <= version);
    e
}

fn set_type(s: &SetType, version: u32) -> SetType {
    let mut s = s.clone();
    s.choices.retain(|c| c.since_version <= version);
    s
}

fn message(m: &Message, version: u32) -> Message {
    let mut m = m.clone();
    m.fields.retain(|f| f.since_version <= version);
    m.groups = groups(&m.groups, version);
    m.data.retain(|d| d.since_version <= version);
    m
}

fn groups(list: &[Group], version: u32) -> Vec<Group> {
    list.iter()
        .filter(|g| g.since_version <= version)
        .map(|g| {
            let mut g = g.clone();
            g.fields.retain(|f| f.since_version <= version);
            g.groups = groups(&g.groups, version);
            g.data.retain(|d| d.since_version <= version);
            g
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_newer_members_everywhere() {
        let schema: MessageSchema = serde_json::from_value(json!({
            "package": "p", "id": 1, "version": 2,
            "types": [
                { "kind": "type", "name": "New", "primitiveType": "int8", "sinceVersion": 2 },
                { "kind": "enum", "name": "E", "encodingType": "uint8", "validValues": [
                    { "name": "a", "value": "0" },
                    { "name": "b", "value": "1", "sinceVersion": 1 } ] }
            ],
            "messages": [
                { "name": "M", "id": 1,
                  "fields": [
                    { "name": "old", "id": 1, "type": "int32" },
                    { "name": "new", "id": 2, "type": "int32", "sinceVersion": 2 } ],
                  "groups": [
                    { "name": "g", "id": 3, "fields": [
                        { "name": "x", "id": 1, "type": "int8", "sinceVersion": 1 } ] } ],
                  "data": [ { "name": "d", "id": 4, "sinceVersion": 1 } ] },
                { "name": "Later", "id": 2, "sinceVersion": 1 }
            ]
        }))
        .unwrap();

        let v0 = SinceVersionTransform::apply(&schema, 0);
        assert_eq!(v0.version, 0);
        assert_eq!(v0.types.len(), 1);
        let TypeDef::Enum(e) = &v0.types[0] else {
            panic!("expected enum");
        };
        assert_eq!(e.valid_values.len(), 1);
        assert_eq!(v0.messages.len(), 1);
        assert_eq!(v0.messages[0].fields.len(), 1);
        assert!(v0.messages[0].groups[0].fields.is_empty());
        assert!(v0.messages[0].data.is_empty());

        let v1 = SinceVersionTransform::apply(&schema, 1);
        assert_eq!(v1.messages.len(), 2);
        assert_eq!(v1.messages[0].groups[0].fields.len(), 1);
        assert_eq!(v1.messages[0].data.len(), 1);
    }
}
