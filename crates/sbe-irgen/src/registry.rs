use std::collections::HashMap;

use sbe_types::{Presence, PrimitiveType};

use crate::error::SchemaError;
use crate::schema::{CompositeElement, CompositeType, EncodedType, TypeDef};

/// What a type name in the schema points at.
#[derive(Clone, Copy, Debug)]
pub enum ResolvedType<'a> {
    Primitive(PrimitiveType),
    Named(&'a TypeDef),
}

/// Name lookup over a schema's declared types.
///
/// Declared names shadow primitive names, so a schema may define its own
/// `"char"` type without surprising anyone who reads it.
#[derive(Debug)]
pub struct TypeRegistry<'a> {
    defs: &'a [TypeDef],
    by_name: HashMap<&'a str, &'a TypeDef>,
}

impl<'a> TypeRegistry<'a> {
    /// # Errors
    ///
    /// [`SchemaError::DuplicateType`] if two types share a name.
    pub fn new(defs: &'a [TypeDef]) -> Result<Self, SchemaError> {
        let mut by_name = HashMap::with_capacity(defs.len());
        for def in defs {
            if by_name.insert(def.name(), def).is_some() {
                return Err(SchemaError::DuplicateType {
                    name: def.name().to_owned(),
                });
            }
        }
        Ok(Self { defs, by_name })
    }

    pub fn get(&self, name: &str) -> Option<&'a TypeDef> {
        self.by_name.get(name).copied()
    }

    /// Declared types in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &'a TypeDef> + '_ {
        self.defs.iter()
    }

    /// # Errors
    ///
    /// [`SchemaError::UnknownType`] naming `referenced_by`.
    pub fn resolve(&self, name: &str, referenced_by: &str) -> Result<ResolvedType<'a>, SchemaError> {
        if let Some(def) = self.get(name) {
            return Ok(ResolvedType::Named(def));
        }
        PrimitiveType::from_name(name)
            .map(ResolvedType::Primitive)
            .ok_or_else(|| SchemaError::UnknownType {
                name: name.to_owned(),
                referenced_by: referenced_by.to_owned(),
            })
    }

    /// Look up a named type, refusing primitive names.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownType`] naming `referenced_by`.
    pub fn named(&self, name: &str, referenced_by: &str) -> Result<&'a TypeDef, SchemaError> {
        self.get(name).ok_or_else(|| SchemaError::UnknownType {
            name: name.to_owned(),
            referenced_by: referenced_by.to_owned(),
        })
    }

    /// Look up a composite used in a structural role (header, dimension,
    /// var data).
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownType`] or [`SchemaError::NotComposite`].
    pub fn composite(
        &self,
        name: &str,
        role: &'static str,
        referenced_by: &str,
    ) -> Result<&'a CompositeType, SchemaError> {
        match self.named(name, referenced_by)? {
            TypeDef::Composite(c) => Ok(c),
            _ => Err(SchemaError::NotComposite {
                name: name.to_owned(),
                role,
            }),
        }
    }

    /// Primitive behind an enum or set `encodingType`: a primitive name or
    /// a named scalar type.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownType`] or [`SchemaError::InvalidEncodingType`]
    /// for composites, enums, sets and arrays.
    pub fn encoding_primitive(&self, encoding_type: &str, owner: &str) -> Result<PrimitiveType, SchemaError> {
        match self.resolve(encoding_type, owner)? {
            ResolvedType::Primitive(t) => Ok(t),
            ResolvedType::Named(TypeDef::Type(t)) if t.length == 1 => Ok(t.primitive_type),
            ResolvedType::Named(_) => Err(SchemaError::InvalidEncodingType {
                name: owner.to_owned(),
                encoding_type: encoding_type.to_owned(),
            }),
        }
    }

    /// Scalar type declared directly inside `composite` under `name`,
    /// following refs.
    pub fn scalar_member(&self, composite: &'a CompositeType, name: &str) -> Option<&'a EncodedType> {
        composite
            .elements
            .iter()
            .find(|e| e.name() == name)
            .and_then(|e| match e {
                CompositeElement::Type(t) => Some(t),
                CompositeElement::Ref(r) => match self.get(&r.type_name) {
                    Some(TypeDef::Type(t)) => Some(t),
                    _ => None,
                },
                _ => None,
            })
    }

    // ── Lengths ───────────────────────────────────────────────────────

    /// Encoded width of a named type; `None` when variable.
    ///
    /// Must only be called once cycles have been ruled out.
    ///
    /// # Errors
    ///
    /// Unknown references, bad encoding types, overlapping offsets and
    /// overflow inside composites.
    pub fn length(&self, def: &'a TypeDef) -> Result<Option<u32>, SchemaError> {
        match def {
            TypeDef::Type(t) => encoded_length(t),
            TypeDef::Composite(c) => self.composite_length(c),
            TypeDef::Enum(e) => Ok(Some(self.width(&e.encoding_type, &e.name)?)),
            TypeDef::Set(s) => Ok(Some(self.width(&s.encoding_type, &s.name)?)),
        }
    }

    /// # Errors
    ///
    /// As for [`length`](Self::length).
    pub fn element_length(&self, element: &'a CompositeElement) -> Result<Option<u32>, SchemaError> {
        match element {
            CompositeElement::Type(t) => encoded_length(t),
            CompositeElement::Composite(c) => self.composite_length(c),
            CompositeElement::Enum(e) => Ok(Some(self.width(&e.encoding_type, &e.name)?)),
            CompositeElement::Set(s) => Ok(Some(self.width(&s.encoding_type, &s.name)?)),
            CompositeElement::Ref(r) => self.length(self.named(&r.type_name, &r.name)?),
        }
    }

    /// Width of a composite: the end of its last member, honouring
    /// explicit member offsets.
    ///
    /// # Errors
    ///
    /// As for [`length`](Self::length).
    pub fn composite_length(&self, composite: &'a CompositeType) -> Result<Option<u32>, SchemaError> {
        let mut cursor = 0u32;
        for element in &composite.elements {
            let offset = place(element.name(), element.offset(), cursor)?;
            let Some(len) = self.element_length(element)? else {
                return Ok(None);
            };
            cursor = advance(element.name(), offset, len)?;
        }
        Ok(Some(cursor))
    }

    fn width(&self, encoding_type: &str, owner: &str) -> Result<u32, SchemaError> {
        let t = self.encoding_primitive(encoding_type, owner)?;
        Ok(primitive_width(t))
    }
}

/// Width of a scalar or array type; constants take no space.
///
/// # Errors
///
/// [`SchemaError::LayoutOverflow`] for absurd array lengths.
pub fn encoded_length(t: &EncodedType) -> Result<Option<u32>, SchemaError> {
    if t.presence == Presence::Constant {
        return Ok(Some(0));
    }
    if t.is_variable_length() {
        return Ok(None);
    }
    primitive_width(t.primitive_type)
        .checked_mul(t.length)
        .map(Some)
        .ok_or_else(|| SchemaError::LayoutOverflow { name: t.name.clone() })
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn primitive_width(t: PrimitiveType) -> u32 {
    t.size() as u32
}

/// Resolve a member's offset against the running cursor.
pub(crate) fn place(name: &str, explicit: Option<u32>, cursor: u32) -> Result<u32, SchemaError> {
    match explicit {
        Some(offset) if offset < cursor => Err(SchemaError::OverlappingOffset {
            name: name.to_owned(),
            offset,
            cursor,
        }),
        Some(offset) => Ok(offset),
        None => Ok(cursor),
    }
}

pub(crate) fn advance(name: &str, offset: u32, len: u32) -> Result<u32, SchemaError> {
    offset
        .checked_add(len)
        .filter(|end| i32::try_from(*end).is_ok())
        .ok_or_else(|| SchemaError::LayoutOverflow { name: name.to_owned() })
}
