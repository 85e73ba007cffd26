use sbe_ir::{Ir, SchemaInfo};
use sbe_types::tokens::compute_component_token_counts;
use sbe_types::value::DEFAULT_CHARACTER_ENCODING;
use sbe_types::{ByteOrder, Encoding, Presence, PrimitiveType, PrimitiveValue, Signal, Token};
use tracing::{debug, instrument};

use crate::config::GeneratorConfig;
use crate::error::SchemaError;
use crate::registry::{ResolvedType, TypeRegistry, advance, encoded_length, place, primitive_width};
use crate::schema::{
    CompositeElement, CompositeType, EncodedType, EnumType, Field, Group, Message, MessageSchema, SetType, TypeDef,
    VarData,
};
use crate::transform::SinceVersionTransform;
use crate::validate::{parse_value, resolve_value_ref, validate};

/// Turns a [`MessageSchema`] into an [`Ir`].
///
/// Generation is a pure function of the schema and the config: the same
/// input always yields the same token lists, so the serialized IR is
/// byte-for-byte reproducible.
///
/// ```text
///   MessageSchema
///        │  SinceVersionTransform   (only with target_version)
///        ▼
///   TypeRegistry ──► validate
///        │
///        ▼
///   header tokens ──► Ir::new
///   message tokens ──► Ir::add_message   (one per message, in order)
/// ```
#[derive(Clone, Debug, Default)]
pub struct IrGenerator {
    config: GeneratorConfig,
}

impl IrGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Validate `schema` and emit its IR.
    ///
    /// # Errors
    ///
    /// The first [`SchemaError`] found. Nothing is emitted for an invalid
    /// schema.
    #[instrument(skip_all, fields(package = %schema.package, version = schema.version))]
    pub fn generate(&self, schema: &MessageSchema) -> Result<Ir, SchemaError> {
        let transformed;
        let schema = match self.config.target_version {
            Some(version) => {
                transformed = SinceVersionTransform::apply(schema, version);
                &transformed
            }
            None => schema,
        };

        let registry = TypeRegistry::new(&schema.types)?;
        validate(schema, &registry, &self.config)?;

        let mut emitter = Emitter {
            registry: &registry,
            config: &self.config,
            byte_order: schema.byte_order,
            tokens: Vec::new(),
        };
        let header = emitter.header(&schema.header_type)?;
        let info = SchemaInfo {
            package_name: schema.package.clone(),
            namespace_name: schema.namespace.clone(),
            id: schema.id,
            version: schema.version,
            semantic_version: schema.semantic_version.clone(),
            byte_order: schema.byte_order,
        };
        let mut ir = Ir::new(info, header)?;

        for message in &schema.messages {
            let tokens = emitter.message(message)?;
            debug!(
                name = %message.name,
                id = message.id,
                block_length = tokens[0].encoded_length,
                tokens = tokens.len(),
                "generated message"
            );
            ir.add_message(message.id, tokens)?;
        }
        Ok(ir)
    }
}

// ── Emission ──────────────────────────────────────────────────────────

/// Where a type is being expanded: the name its tokens carry, its offset
/// relative to the enclosing block or composite, the inherited version,
/// and the field it sits under (if any).
#[derive(Clone, Copy)]
struct Site<'a> {
    name: &'a str,
    referenced_name: Option<&'a str>,
    offset: u32,
    version: u32,
    field: Option<&'a Field>,
}

impl<'a> Site<'a> {
    fn deprecated(&self, own: u32) -> u32 {
        self.field.map_or(own, |f| f.deprecated)
    }

    fn description(&self, own: &Option<String>) -> Option<String> {
        self.field
            .and_then(|f| f.description.clone())
            .filter(|d| !d.is_empty())
            .or_else(|| own.clone())
    }

    fn semantic_type(&self, own: &Option<String>) -> Option<String> {
        own.clone().or_else(|| self.field.and_then(|f| f.semantic_type.clone()))
    }

    fn is_constant_field(&self) -> bool {
        self.field.is_some_and(Field::is_constant)
    }

    fn builder(&self, signal: Signal) -> sbe_types::TokenBuilder {
        Token::builder(signal, self.name).referenced_name(self.referenced_name.map(str::to_owned))
    }
}

struct Emitter<'r, 'a> {
    registry: &'r TypeRegistry<'a>,
    config: &'r GeneratorConfig,
    byte_order: ByteOrder,
    tokens: Vec<Token>,
}

impl<'a> Emitter<'_, 'a> {
    fn header(&mut self, header_type: &str) -> Result<Vec<Token>, SchemaError> {
        let composite = self.registry.composite(header_type, "message header", "schema")?;
        self.composite(
            composite,
            Site {
                name: &composite.name,
                referenced_name: None,
                offset: 0,
                version: 0,
                field: None,
            },
        )?;
        self.finish()
    }

    fn message(&mut self, message: &'a Message) -> Result<Vec<Token>, SchemaError> {
        self.tokens.push(
            Token::builder(Signal::BeginMessage, &message.name)
                .id(message.id)
                .version(message.since_version)
                .deprecated(message.deprecated)
                .description(message.description.clone())
                .encoding(self.structural(&message.semantic_type))
                .build(),
        );
        let computed = self.block(&message.fields, &message.groups, &message.data, message.since_version)?;
        let block_length = block_length(&message.name, message.block_length, computed)?;
        self.close(0, Signal::EndMessage, block_length);
        self.finish()
    }

    fn finish(&mut self) -> Result<Vec<Token>, SchemaError> {
        let mut tokens = std::mem::take(&mut self.tokens);
        compute_component_token_counts(&mut tokens)?;
        Ok(tokens)
    }

    /// Set the BEGIN token's length and push its END twin.
    fn close(&mut self, begin: usize, end: Signal, encoded_length: i32) {
        self.tokens[begin].encoded_length = encoded_length;
        let mut token = self.tokens[begin].clone();
        token.signal = end;
        self.tokens.push(token);
    }

    fn structural(&self, semantic_type: &Option<String>) -> Encoding {
        Encoding {
            byte_order: self.byte_order,
            semantic_type: semantic_type.clone(),
            ..Encoding::default()
        }
    }

    // ── Blocks ────────────────────────────────────────────────────────

    /// Emit fields, then groups, then var data. Returns the end of the
    /// last field, which is the computed block length.
    fn block(
        &mut self,
        fields: &'a [Field],
        groups: &'a [Group],
        data: &'a [VarData],
        parent_version: u32,
    ) -> Result<u32, SchemaError> {
        let mut cursor = 0u32;
        for field in fields {
            let width = self.field_width(field)?;
            let offset = place(&field.name, field.offset, cursor)?;
            self.field(field, offset, width, parent_version)?;
            cursor = advance(&field.name, offset, width)?;
        }
        for group in groups {
            self.group(group, parent_version)?;
        }
        for var in data {
            self.var_data(var, parent_version)?;
        }
        Ok(cursor)
    }

    fn field_width(&self, field: &Field) -> Result<u32, SchemaError> {
        if field.is_constant() {
            return Ok(0);
        }
        let width = match self.registry.resolve(&field.type_name, &field.name)? {
            ResolvedType::Primitive(t) => Some(primitive_width(t)),
            ResolvedType::Named(def) => self.registry.length(def)?,
        };
        width.ok_or_else(|| SchemaError::VarDataInBlock {
            name: field.name.clone(),
        })
    }

    fn field(&mut self, field: &'a Field, offset: u32, width: u32, parent_version: u32) -> Result<(), SchemaError> {
        let version = field.since_version.max(parent_version);
        let begin = self.tokens.len();
        self.tokens.push(
            Token::builder(Signal::BeginField, &field.name)
                .id(field.id)
                .offset(to_i32(&field.name, offset)?)
                .encoded_length(to_i32(&field.name, width)?)
                .version(version)
                .deprecated(field.deprecated)
                .description(field.description.clone())
                .encoding(self.field_encoding(field))
                .build(),
        );

        let site = Site {
            name: &field.type_name,
            referenced_name: None,
            offset,
            version,
            field: Some(field),
        };
        match self.registry.resolve(&field.type_name, &field.name)? {
            ResolvedType::Primitive(t) => self.primitive_field(t, field, site)?,
            ResolvedType::Named(def) => self.type_def(def, site)?,
        }

        let mut end = self.tokens[begin].clone();
        end.signal = Signal::EndField;
        self.tokens.push(end);
        Ok(())
    }

    /// The BEGIN_FIELD encoding. A constant field naming an enum value
    /// carries the reference as a string.
    fn field_encoding(&self, field: &Field) -> Encoding {
        let mut encoding = Encoding {
            byte_order: self.byte_order,
            presence: field.presence.unwrap_or_default(),
            epoch: field.epoch.clone(),
            time_unit: field.time_unit.clone(),
            semantic_type: field.semantic_type.clone(),
            ..Encoding::default()
        };
        if let (true, Some(value_ref)) = (field.is_constant(), &field.value_ref) {
            encoding.primitive_type = Some(PrimitiveType::Char);
            encoding.const_value = Some(PrimitiveValue::bytes(value_ref.as_bytes(), "UTF-8"));
        }
        encoding
    }

    /// A field typed directly by a primitive name.
    fn primitive_field(&mut self, t: PrimitiveType, field: &'a Field, site: Site<'a>) -> Result<(), SchemaError> {
        let mut encoding = Encoding {
            presence: field.presence.unwrap_or_default(),
            epoch: field.epoch.clone(),
            time_unit: field.time_unit.clone(),
            semantic_type: field.semantic_type.clone(),
            ..Encoding::scalar(t, self.byte_order)
        };
        if t == PrimitiveType::Char {
            encoding.character_encoding = Some(DEFAULT_CHARACTER_ENCODING.to_owned());
        }
        let length = if field.is_constant() {
            encoding.const_value = Some(self.value_ref_constant(field, t)?);
            0
        } else {
            primitive_width(t)
        };
        self.tokens.push(
            site.builder(Signal::Encoding)
                .offset(to_i32(&field.name, site.offset)?)
                .encoded_length(to_i32(&field.name, length)?)
                .version(site.version)
                .deprecated(field.deprecated)
                .description(field.description.clone())
                .encoding(encoding)
                .build(),
        );
        Ok(())
    }

    /// The constant a field's `value_ref` points at, parsed as `t`.
    fn value_ref_constant(&self, field: &Field, t: PrimitiveType) -> Result<PrimitiveValue, SchemaError> {
        let Some(value_ref) = &field.value_ref else {
            return Err(SchemaError::MissingConstValue {
                name: field.name.clone(),
            });
        };
        let (_, value) = resolve_value_ref(field, value_ref, self.registry)?;
        parse_value(&field.name, t, &value.value)
    }

    // ── Types ─────────────────────────────────────────────────────────

    fn type_def(&mut self, def: &'a TypeDef, site: Site<'a>) -> Result<(), SchemaError> {
        match def {
            TypeDef::Type(t) => self.encoded(t, site),
            TypeDef::Composite(c) => self.composite(c, site),
            TypeDef::Enum(e) => self.enum_type(e, site),
            TypeDef::Set(s) => self.set_type(s, site),
        }
    }

    fn encoded(&mut self, t: &'a EncodedType, site: Site<'a>) -> Result<(), SchemaError> {
        let pt = t.primitive_type;
        let field_presence = site.field.and_then(|f| f.presence);
        let presence = if t.presence == Presence::Constant || field_presence == Some(Presence::Constant) {
            Presence::Constant
        } else {
            field_presence.unwrap_or(t.presence)
        };

        let character_encoding = t
            .character_encoding
            .clone()
            .or_else(|| (pt == PrimitiveType::Char).then(|| DEFAULT_CHARACTER_ENCODING.to_owned()));
        let char_array = pt == PrimitiveType::Char && t.length != 1;
        let parse = |text: &str| -> Result<PrimitiveValue, SchemaError> {
            if char_array {
                let charset = character_encoding.as_deref().unwrap_or(DEFAULT_CHARACTER_ENCODING);
                Ok(PrimitiveValue::bytes(text.as_bytes(), charset))
            } else {
                parse_value(&t.name, pt, text)
            }
        };

        let mut encoding = Encoding {
            presence,
            character_encoding: character_encoding.clone(),
            epoch: site.field.and_then(|f| f.epoch.clone()),
            time_unit: site.field.and_then(|f| f.time_unit.clone()),
            semantic_type: site.semantic_type(&t.semantic_type),
            ..Encoding::scalar(pt, self.byte_order)
        };
        match presence {
            Presence::Constant => {
                let value = match (site.field, t.const_value.as_deref()) {
                    (Some(field), _) if field.value_ref.is_some() => self.value_ref_constant(field, pt)?,
                    (_, Some(text)) => parse(text)?,
                    (_, None) => {
                        return Err(SchemaError::MissingConstValue {
                            name: site.field.map_or_else(|| t.name.clone(), |f| f.name.clone()),
                        });
                    }
                };
                encoding.const_value = Some(value);
            }
            Presence::Required | Presence::Optional => {
                encoding.min_value = t.min_value.as_deref().map(parse).transpose()?;
                encoding.max_value = t.max_value.as_deref().map(parse).transpose()?;
                if presence == Presence::Optional {
                    encoding.null_value = t.null_value.as_deref().map(parse).transpose()?;
                }
            }
        }

        let length = if presence == Presence::Constant {
            0
        } else {
            match encoded_length(t)? {
                Some(len) => to_i32(&t.name, len)?,
                None => Token::VARIABLE_LENGTH,
            }
        };

        self.tokens.push(
            site.builder(Signal::Encoding)
                .offset(to_i32(&t.name, site.offset)?)
                .encoded_length(length)
                .version(site.version.max(t.since_version))
                .deprecated(site.deprecated(t.deprecated))
                .description(site.description(&t.description))
                .encoding(encoding)
                .build(),
        );
        Ok(())
    }

    fn composite(&mut self, composite: &'a CompositeType, site: Site<'a>) -> Result<(), SchemaError> {
        let version = site.version.max(composite.since_version);
        let length = match self.registry.composite_length(composite)? {
            Some(len) => to_i32(&composite.name, len)?,
            None => Token::VARIABLE_LENGTH,
        };
        let begin = self.tokens.len();
        self.tokens.push(
            site.builder(Signal::BeginComposite)
                .offset(to_i32(&composite.name, site.offset)?)
                .encoded_length(length)
                .version(version)
                .deprecated(site.deprecated(composite.deprecated))
                .description(site.description(&composite.description))
                .encoding(self.structural(&site.semantic_type(&composite.semantic_type)))
                .build(),
        );

        let mut cursor = 0u32;
        for element in &composite.elements {
            let offset = place(element.name(), element.offset(), cursor)?;
            let inner = Site {
                name: element.name(),
                referenced_name: None,
                offset,
                version,
                field: None,
            };
            match element {
                CompositeElement::Type(t) => self.encoded(t, inner)?,
                CompositeElement::Composite(c) => self.composite(c, inner)?,
                CompositeElement::Enum(e) => self.enum_type(e, inner)?,
                CompositeElement::Set(s) => self.set_type(s, inner)?,
                CompositeElement::Ref(r) => {
                    let def = self.registry.named(&r.type_name, &r.name)?;
                    let site = Site {
                        referenced_name: Some(&r.type_name),
                        version: version.max(r.since_version),
                        ..inner
                    };
                    self.type_def(def, site)?;
                }
            }
            if let Some(len) = self.registry.element_length(element)? {
                cursor = advance(element.name(), offset, len)?;
            }
        }

        self.close(begin, Signal::EndComposite, length);
        Ok(())
    }

    fn enum_type(&mut self, e: &'a EnumType, site: Site<'a>) -> Result<(), SchemaError> {
        let pt = self.registry.encoding_primitive(&e.encoding_type, &e.name)?;
        let version = site.version.max(e.since_version);

        let mut encoding = Encoding {
            presence: e.presence,
            semantic_type: site.semantic_type(&e.semantic_type),
            ..Encoding::scalar(pt, self.byte_order)
        };
        if site.is_constant_field() {
            encoding.presence = Presence::Constant;
            if let Some(field) = site.field {
                encoding.const_value = Some(self.value_ref_constant(field, pt)?);
            }
        } else if e.presence == Presence::Optional {
            encoding.null_value = Some(match &e.null_value {
                Some(text) => parse_value(&e.name, pt, text)?,
                None => pt.null_value(),
            });
        }

        let begin = self.tokens.len();
        self.tokens.push(
            site.builder(Signal::BeginEnum)
                .offset(to_i32(&e.name, site.offset)?)
                .version(version)
                .deprecated(site.deprecated(e.deprecated))
                .description(site.description(&e.description))
                .encoding(encoding)
                .build(),
        );
        for value in &e.valid_values {
            self.tokens.push(
                Token::builder(Signal::ValidValue, &value.name)
                    .version(version.max(value.since_version))
                    .deprecated(value.deprecated)
                    .description(value.description.clone())
                    .encoding(Encoding {
                        const_value: Some(parse_value(&value.name, pt, &value.value)?),
                        ..Encoding::scalar(pt, self.byte_order)
                    })
                    .build(),
            );
        }
        self.close(begin, Signal::EndEnum, to_i32(&e.name, primitive_width(pt))?);
        Ok(())
    }

    fn set_type(&mut self, s: &'a SetType, site: Site<'a>) -> Result<(), SchemaError> {
        let pt = self.registry.encoding_primitive(&s.encoding_type, &s.name)?;
        let version = site.version.max(s.since_version);

        let begin = self.tokens.len();
        self.tokens.push(
            site.builder(Signal::BeginSet)
                .offset(to_i32(&s.name, site.offset)?)
                .version(version)
                .deprecated(site.deprecated(s.deprecated))
                .description(site.description(&s.description))
                .encoding(Encoding {
                    semantic_type: site.semantic_type(&s.semantic_type),
                    ..Encoding::scalar(pt, self.byte_order)
                })
                .build(),
        );
        for choice in &s.choices {
            self.tokens.push(
                Token::builder(Signal::Choice, &choice.name)
                    .version(version.max(choice.since_version))
                    .deprecated(choice.deprecated)
                    .description(choice.description.clone())
                    .encoding(Encoding {
                        const_value: Some(PrimitiveValue::Long(i64::from(choice.bit))),
                        ..Encoding::scalar(pt, self.byte_order)
                    })
                    .build(),
            );
        }
        self.close(begin, Signal::EndSet, to_i32(&s.name, primitive_width(pt))?);
        Ok(())
    }

    // ── Repeating and variable parts ──────────────────────────────────

    fn group(&mut self, group: &'a Group, parent_version: u32) -> Result<(), SchemaError> {
        let version = group.since_version.max(parent_version);
        let begin = self.tokens.len();
        self.tokens.push(
            Token::builder(Signal::BeginGroup, &group.name)
                .id(group.id)
                .offset(Token::UNKNOWN_OFFSET)
                .version(version)
                .deprecated(group.deprecated)
                .description(group.description.clone())
                .encoding(self.structural(&group.semantic_type))
                .build(),
        );

        let dimension_type = group
            .dimension_type
            .as_deref()
            .unwrap_or(&self.config.default_dimension_type);
        let dimension = self.registry.composite(dimension_type, "group dimension", &group.name)?;
        self.composite(
            dimension,
            Site {
                name: &dimension.name,
                referenced_name: None,
                offset: 0,
                version,
                field: None,
            },
        )?;

        let computed = self.block(&group.fields, &group.groups, &group.data, version)?;
        let block_length = block_length(&group.name, group.block_length, computed)?;
        self.close(begin, Signal::EndGroup, block_length);
        Ok(())
    }

    fn var_data(&mut self, var: &'a VarData, parent_version: u32) -> Result<(), SchemaError> {
        let version = var.since_version.max(parent_version);
        let begin = self.tokens.len();
        self.tokens.push(
            Token::builder(Signal::BeginVarData, &var.name)
                .id(var.id)
                .offset(Token::UNKNOWN_OFFSET)
                .version(version)
                .deprecated(var.deprecated)
                .description(var.description.clone())
                .encoding(self.structural(&var.semantic_type))
                .build(),
        );

        let type_name = var.type_name.as_deref().unwrap_or(&self.config.default_var_data_type);
        let composite = self.registry.composite(type_name, "var data", &var.name)?;
        self.composite(
            composite,
            Site {
                name: &composite.name,
                referenced_name: None,
                offset: 0,
                version,
                field: None,
            },
        )?;

        self.close(begin, Signal::EndVarData, Token::VARIABLE_LENGTH);
        Ok(())
    }
}

fn block_length(name: &str, declared: Option<u32>, computed: u32) -> Result<i32, SchemaError> {
    match declared {
        Some(declared) if declared < computed => Err(SchemaError::BlockLengthTooSmall {
            name: name.to_owned(),
            declared,
            computed,
        }),
        Some(declared) => to_i32(name, declared),
        None => to_i32(name, computed),
    }
}

fn to_i32(name: &str, value: u32) -> Result<i32, SchemaError> {
    i32::try_from(value).map_err(|_| SchemaError::LayoutOverflow { name: name.to_owned() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(messages: serde_json::Value, extra_types: serde_json::Value) -> MessageSchema {
        let mut types = vec![
            json!({ "kind": "composite", "name": "messageHeader", "elements": [
                { "kind": "type", "name": "blockLength", "primitiveType": "uint16" },
                { "kind": "type", "name": "templateId", "primitiveType": "uint16" },
                { "kind": "type", "name": "schemaId", "primitiveType": "uint16" },
                { "kind": "type", "name": "version", "primitiveType": "uint16" } ]}),
            json!({ "kind": "composite", "name": "groupSizeEncoding", "elements": [
                { "kind": "type", "name": "blockLength", "primitiveType": "uint16" },
                { "kind": "type", "name": "numInGroup", "primitiveType": "uint16" } ]}),
            json!({ "kind": "composite", "name": "varDataEncoding", "elements": [
                { "kind": "type", "name": "length", "primitiveType": "uint32" },
                { "kind": "type", "name": "varData", "primitiveType": "uint8", "length": 0 } ]}),
        ];
        if let serde_json::Value::Array(extra) = extra_types {
            types.extend(extra);
        }
        serde_json::from_value(json!({
            "package": "test", "id": 7, "version": 3,
            "types": types, "messages": messages,
        }))
        .unwrap()
    }

    fn generate(messages: serde_json::Value, extra_types: serde_json::Value) -> Result<Ir, SchemaError> {
        IrGenerator::default().generate(&schema(messages, extra_types))
    }

    fn field_offsets(tokens: &[Token]) -> Vec<i32> {
        tokens
            .iter()
            .filter(|t| t.signal == Signal::BeginField)
            .map(|t| t.offset)
            .collect()
    }

    #[test]
    fn fields_are_laid_out_back_to_back() {
        let ir = generate(
            json!([{ "name": "M", "id": 1, "fields": [
                { "name": "a", "id": 1, "type": "Six" },
                { "name": "b", "id": 2, "type": "Twenty" },
                { "name": "c", "id": 3, "type": "uint8" },
                { "name": "d", "id": 4, "type": "uint32" },
                { "name": "e", "id": 5, "type": "uint64" } ] }]),
            json!([
                { "kind": "type", "name": "Six", "primitiveType": "char", "length": 6 },
                { "kind": "type", "name": "Twenty", "primitiveType": "char", "length": 20 } ]),
        )
        .unwrap();
        let tokens = ir.message(1).unwrap();
        assert_eq!(field_offsets(tokens), [0, 6, 26, 27, 31]);
        assert_eq!(tokens[0].encoded_length, 39);
        assert_eq!(tokens.last().unwrap().signal, Signal::EndMessage);
        assert_eq!(tokens.last().unwrap().encoded_length, 39);
    }

    #[test]
    fn explicit_offset_pads_and_block_length_extends() {
        let ir = generate(
            json!([{ "name": "M", "id": 1, "blockLength": 16, "fields": [
                { "name": "a", "id": 1, "type": "uint8" },
                { "name": "b", "id": 2, "type": "uint32", "offset": 4 } ] }]),
            json!([]),
        )
        .unwrap();
        let tokens = ir.message(1).unwrap();
        assert_eq!(field_offsets(tokens), [0, 4]);
        assert_eq!(tokens[0].encoded_length, 16);
    }

    #[test]
    fn declared_block_length_below_fields_rejected() {
        let result = generate(
            json!([{ "name": "M", "id": 1, "blockLength": 3, "fields": [
                { "name": "a", "id": 1, "type": "uint32" } ] }]),
            json!([]),
        );
        assert!(matches!(
            result,
            Err(SchemaError::BlockLengthTooSmall { declared: 3, computed: 4, .. })
        ));
    }

    #[test]
    fn group_block_starts_at_zero() {
        let ir = generate(
            json!([{ "name": "M", "id": 1,
                "fields": [{ "name": "a", "id": 1, "type": "uint64" }],
                "groups": [{ "name": "g", "id": 2, "fields": [
                    { "name": "x", "id": 1, "type": "uint16" },
                    { "name": "y", "id": 2, "type": "int32" } ] }] }]),
            json!([]),
        )
        .unwrap();
        let tokens = ir.message(1).unwrap();
        assert_eq!(tokens[0].encoded_length, 8);

        let group = tokens.iter().position(|t| t.signal == Signal::BeginGroup).unwrap();
        assert_eq!(tokens[group].offset, Token::UNKNOWN_OFFSET);
        assert_eq!(tokens[group].encoded_length, 6);
        assert_eq!(tokens[group + 1].signal, Signal::BeginComposite);
        assert_eq!(tokens[group + 1].name, "groupSizeEncoding");
        assert_eq!(tokens[group + 1].encoded_length, 4);
        assert_eq!(field_offsets(&tokens[group..]), [0, 2]);
    }

    #[test]
    fn var_data_is_variable_and_unplaced() {
        let ir = generate(
            json!([{ "name": "M", "id": 1, "data": [{ "name": "blob", "id": 9 }] }]),
            json!([]),
        )
        .unwrap();
        let tokens = ir.message(1).unwrap();
        assert_eq!(tokens[1].signal, Signal::BeginVarData);
        assert_eq!(tokens[1].offset, Token::UNKNOWN_OFFSET);
        assert_eq!(tokens[1].encoded_length, Token::VARIABLE_LENGTH);
        assert_eq!(tokens[2].encoded_length, Token::VARIABLE_LENGTH);
        let payload = tokens.iter().find(|t| t.name == "varData").unwrap();
        assert_eq!(payload.offset, 4);
        assert_eq!(payload.encoded_length, Token::VARIABLE_LENGTH);
    }

    #[test]
    fn constant_field_takes_no_space() {
        let ir = generate(
            json!([{ "name": "M", "id": 1, "fields": [
                { "name": "k", "id": 1, "type": "Answer" },
                { "name": "a", "id": 2, "type": "uint16" } ] }]),
            json!([{ "kind": "type", "name": "Answer", "primitiveType": "int8",
                     "presence": "constant", "constValue": "42" }]),
        )
        .unwrap();
        let tokens = ir.message(1).unwrap();
        assert_eq!(field_offsets(tokens), [0, 0]);
        assert_eq!(tokens[0].encoded_length, 2);
        let answer = tokens.iter().find(|t| t.name == "Answer").unwrap();
        assert_eq!(answer.encoded_length, 0);
        assert_eq!(answer.encoding.const_value, Some(PrimitiveValue::Long(42)));
    }

    #[test]
    fn value_ref_becomes_field_and_enum_constant() {
        let ir = generate(
            json!([{ "name": "M", "id": 1, "fields": [
                { "name": "kind", "id": 1, "type": "Kind", "presence": "constant",
                  "valueRef": "Kind.B" } ] }]),
            json!([{ "kind": "enum", "name": "Kind", "encodingType": "char", "validValues": [
                { "name": "A", "value": "A" }, { "name": "B", "value": "B" } ] }]),
        )
        .unwrap();
        let tokens = ir.message(1).unwrap();
        let field = &tokens[1];
        assert_eq!(field.encoded_length, 0);
        assert_eq!(field.encoding.presence, Presence::Constant);
        assert_eq!(field.encoding.const_value.as_ref().and_then(PrimitiveValue::as_bytes), Some(&b"Kind.B"[..]));
        let begin_enum = &tokens[2];
        assert_eq!(begin_enum.signal, Signal::BeginEnum);
        assert_eq!(begin_enum.encoding.presence, Presence::Constant);
        assert_eq!(begin_enum.encoding.const_value, Some(PrimitiveValue::Long(i64::from(b'B'))));
    }

    #[test]
    fn versions_inherit_from_parents() {
        let ir = generate(
            json!([{ "name": "M", "id": 1, "sinceVersion": 1,
                "fields": [{ "name": "a", "id": 1, "type": "uint8" },
                           { "name": "b", "id": 2, "type": "uint8", "sinceVersion": 2 }],
                "groups": [{ "name": "g", "id": 3, "sinceVersion": 3, "fields": [
                    { "name": "x", "id": 1, "type": "uint8" } ] }] }]),
            json!([]),
        )
        .unwrap();
        let tokens = ir.message(1).unwrap();
        let version_of = |name: &str| tokens.iter().find(|t| t.name == name).unwrap().version;
        assert_eq!(version_of("a"), 1);
        assert_eq!(version_of("b"), 2);
        assert_eq!(version_of("g"), 3);
        assert_eq!(version_of("x"), 3);
    }

    #[test]
    fn optional_enum_gets_sentinel_null() {
        let ir = generate(
            json!([{ "name": "M", "id": 1, "fields": [{ "name": "s", "id": 1, "type": "Side" }] }]),
            json!([{ "kind": "enum", "name": "Side", "encodingType": "uint8", "presence": "optional",
                     "validValues": [{ "name": "Buy", "value": "1" }] }]),
        )
        .unwrap();
        let side = ir.type_by_name("Side").unwrap();
        assert_eq!(side[0].encoded_length, 1);
        assert_eq!(side[0].encoding.null_value, Some(PrimitiveValue::Long(255)));
        assert_eq!(side[1].encoding.const_value, Some(PrimitiveValue::Long(1)));
    }

    #[test]
    fn ref_keeps_member_name_and_type_name() {
        let ir = generate(
            json!([{ "name": "M", "id": 1, "fields": [{ "name": "p", "id": 1, "type": "Pair" }] }]),
            json!([
                { "kind": "type", "name": "Code", "primitiveType": "char", "length": 3 },
                { "kind": "composite", "name": "Pair", "elements": [
                    { "kind": "type", "name": "n", "primitiveType": "uint8" },
                    { "kind": "ref", "name": "code", "type": "Code" } ] } ]),
        )
        .unwrap();
        let pair = ir.type_by_name("Pair").unwrap();
        assert_eq!(pair[0].encoded_length, 4);
        let code = pair.iter().find(|t| t.name == "code").unwrap();
        assert_eq!(code.referenced_name.as_deref(), Some("Code"));
        assert_eq!(code.offset, 1);
        assert_eq!(code.encoding.character_encoding.as_deref(), Some(DEFAULT_CHARACTER_ENCODING));
    }

    #[test]
    fn target_version_strips_newer_fields() {
        let schema = schema(
            json!([{ "name": "M", "id": 1, "fields": [
                { "name": "a", "id": 1, "type": "uint8" },
                { "name": "b", "id": 2, "type": "uint8", "sinceVersion": 2 } ] }]),
            json!([]),
        );
        let ir = IrGenerator::new(GeneratorConfig::default().with_target_version(1))
            .generate(&schema)
            .unwrap();
        assert_eq!(ir.version(), 1);
        assert_eq!(field_offsets(ir.message(1).unwrap()), [0]);
    }

    #[test]
    fn generation_is_deterministic() {
        let messages = json!([{ "name": "M", "id": 1,
            "fields": [{ "name": "a", "id": 1, "type": "uint32" }],
            "data": [{ "name": "d", "id": 2 }] }]);
        let first = generate(messages.clone(), json!([])).unwrap();
        let second = generate(messages, json!([])).unwrap();
        assert_eq!(first, second);
    }
}
