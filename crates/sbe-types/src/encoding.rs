use sbe_wire::ByteOrder;

use crate::enums::Presence;
use crate::primitive::PrimitiveType;
use crate::value::PrimitiveValue;

/// How a token's bytes are laid out and interpreted.
///
/// Structural tokens (BEGIN/END of messages, groups, var data) leave
/// `primitive_type` empty and carry only metadata such as
/// `semantic_type`. Only the values the schema actually states are
/// populated; the `applicable_*` accessors fill the gaps from the
/// primitive type's sentinels.
///
/// ```text
/// ┌────────────────────┬──────────────────────────────────────────────┐
/// │ Field              │ Meaning                                      │
/// ├────────────────────┼──────────────────────────────────────────────┤
/// │ primitive_type     │ scalar kind, None for structural tokens      │
/// │ byte_order         │ schema byte order                            │
/// │ presence           │ required / optional / constant               │
/// │ const_value        │ set iff presence is constant                 │
/// │ min/max/null_value │ schema overrides of the type's sentinels     │
/// │ character_encoding │ char and byte arrays                         │
/// │ epoch, time_unit   │ timestamp metadata                           │
/// │ semantic_type      │ e.g. "Price", "UTCTimestamp"                 │
/// └────────────────────┴──────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Encoding {
    pub primitive_type: Option<PrimitiveType>,
    pub byte_order: ByteOrder,
    pub presence: Presence,
    pub const_value: Option<PrimitiveValue>,
    pub min_value: Option<PrimitiveValue>,
    pub max_value: Option<PrimitiveValue>,
    pub null_value: Option<PrimitiveValue>,
    pub character_encoding: Option<String>,
    pub epoch: Option<String>,
    pub time_unit: Option<String>,
    pub semantic_type: Option<String>,
}

impl Encoding {
    /// A scalar encoding of `primitive_type` with everything else default.
    pub fn scalar(primitive_type: PrimitiveType, byte_order: ByteOrder) -> Self {
        Self {
            primitive_type: Some(primitive_type),
            byte_order,
            ..Self::default()
        }
    }

    /// The schema minimum, or the type's minimum.
    pub fn applicable_min_value(&self) -> Option<PrimitiveValue> {
        self.min_value
            .clone()
            .or_else(|| self.primitive_type.map(PrimitiveType::min_value))
    }

    /// The schema maximum, or the type's maximum.
    pub fn applicable_max_value(&self) -> Option<PrimitiveValue> {
        self.max_value
            .clone()
            .or_else(|| self.primitive_type.map(PrimitiveType::max_value))
    }

    /// The schema null sentinel, or the type's null sentinel.
    pub fn applicable_null_value(&self) -> Option<PrimitiveValue> {
        self.null_value
            .clone()
            .or_else(|| self.primitive_type.map(PrimitiveType::null_value))
    }

    /// `true` when `value` is this encoding's "absent" marker.
    pub fn is_null(&self, value: &PrimitiveValue) -> bool {
        self.applicable_null_value().as_ref() == Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applicable_values_fall_back_to_type() {
        let encoding = Encoding::scalar(PrimitiveType::Uint16, ByteOrder::LittleEndian);
        assert_eq!(encoding.applicable_null_value(), Some(PrimitiveValue::Long(65535)));
        assert_eq!(encoding.applicable_max_value(), Some(PrimitiveValue::Long(65534)));
    }

    #[test]
    fn schema_override_wins() {
        let encoding = Encoding {
            null_value: Some(PrimitiveValue::Long(0)),
            ..Encoding::scalar(PrimitiveType::Uint16, ByteOrder::LittleEndian)
        };
        assert!(encoding.is_null(&PrimitiveValue::Long(0)));
        assert!(!encoding.is_null(&PrimitiveValue::Long(65535)));
    }

    #[test]
    fn structural_encoding_has_no_sentinels() {
        assert_eq!(Encoding::default().applicable_null_value(), None);
    }
}
