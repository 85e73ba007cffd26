use std::fmt;

use crate::enums::wire_enum;
use crate::error::TypeError;
use crate::value::PrimitiveValue;

wire_enum! {
  /// Fixed-size scalar kinds a message field can be built from.
  ///
  /// Wire byte 0x00 is reserved for "no primitive type" (structural
  /// tokens) and is handled by the frame codec, not by this enum.
  ///
  /// ```text
  /// ┌──────┬────────┬──────┬─────────────┬─────────────┬────────────┐
  /// │ Wire │ Type   │ Size │ Min         │ Max         │ Null       │
  /// ├──────┼────────┼──────┼─────────────┼─────────────┼────────────┤
  /// │ 0x01 │ char   │ 1    │ 0x20        │ 0x7E        │ 0          │
  /// │ 0x02 │ int8   │ 1    │ -127        │ 127         │ -128       │
  /// │ 0x03 │ int16  │ 2    │ -32767      │ 32767       │ -32768     │
  /// │ 0x04 │ int32  │ 4    │ -(2^31 - 1) │ 2^31 - 1    │ -2^31      │
  /// │ 0x05 │ int64  │ 8    │ -(2^63 - 1) │ 2^63 - 1    │ -2^63      │
  /// │ 0x06 │ uint8  │ 1    │ 0           │ 254         │ 255        │
  /// │ 0x07 │ uint16 │ 2    │ 0           │ 65534       │ 65535      │
  /// │ 0x08 │ uint32 │ 4    │ 0           │ 2^32 - 2    │ 2^32 - 1   │
  /// │ 0x09 │ uint64 │ 8    │ 0           │ 2^64 - 2    │ 2^64 - 1   │
  /// │ 0x0A │ float  │ 4    │ -f32::MAX   │ f32::MAX    │ NaN        │
  /// │ 0x0B │ double │ 8    │ -f64::MAX   │ f64::MAX    │ NaN        │
  /// └──────┴────────┴──────┴─────────────┴─────────────┴────────────┘
  /// ```
  ///
  /// The null sentinel of an integer type sits just outside its valid
  /// range, so an optional field can always be told apart from a real
  /// value.
  #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
  #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
  #[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
  pub enum PrimitiveType {
    Char = 0x01,
    Int8 = 0x02,
    Int16 = 0x03,
    Int32 = 0x04,
    Int64 = 0x05,
    Uint8 = 0x06,
    Uint16 = 0x07,
    Uint32 = 0x08,
    Uint64 = 0x09,
    Float = 0x0A,
    Double = 0x0B,
  }
}

impl PrimitiveType {
  pub const ALL: [Self; 11] = [
    Self::Char,
    Self::Int8,
    Self::Int16,
    Self::Int32,
    Self::Int64,
    Self::Uint8,
    Self::Uint16,
    Self::Uint32,
    Self::Uint64,
    Self::Float,
    Self::Double,
  ];

  /// Encoded size in bytes.
  pub fn size(self) -> usize {
    match self {
      Self::Char | Self::Int8 | Self::Uint8 => 1,
      Self::Int16 | Self::Uint16 => 2,
      Self::Int32 | Self::Uint32 | Self::Float => 4,
      Self::Int64 | Self::Uint64 | Self::Double => 8,
    }
  }

  /// Schema spelling of the type.
  pub fn name(self) -> &'static str {
    match self {
      Self::Char => "char",
      Self::Int8 => "int8",
      Self::Int16 => "int16",
      Self::Int32 => "int32",
      Self::Int64 => "int64",
      Self::Uint8 => "uint8",
      Self::Uint16 => "uint16",
      Self::Uint32 => "uint32",
      Self::Uint64 => "uint64",
      Self::Float => "float",
      Self::Double => "double",
    }
  }

  /// Look a type up by its schema spelling.
  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|t| t.name() == name)
  }

  pub fn is_unsigned(self) -> bool {
    matches!(self, Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64)
  }

  pub fn is_integer(self) -> bool {
    !matches!(self, Self::Float | Self::Double)
  }

  pub fn min_value(self) -> PrimitiveValue {
    match self {
      Self::Char => PrimitiveValue::Long(0x20),
      Self::Int8 => PrimitiveValue::Long(-127),
      Self::Int16 => PrimitiveValue::Long(-32767),
      Self::Int32 => PrimitiveValue::Long(-i64::from(i32::MAX)),
      Self::Int64 => PrimitiveValue::Long(-i64::MAX),
      Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64 => PrimitiveValue::Long(0),
      Self::Float => PrimitiveValue::Double(f64::from(-f32::MAX)),
      Self::Double => PrimitiveValue::Double(-f64::MAX),
    }
  }

  pub fn max_value(self) -> PrimitiveValue {
    match self {
      Self::Char => PrimitiveValue::Long(0x7E),
      Self::Int8 => PrimitiveValue::Long(127),
      Self::Int16 => PrimitiveValue::Long(32767),
      Self::Int32 => PrimitiveValue::Long(i64::from(i32::MAX)),
      Self::Int64 => PrimitiveValue::Long(i64::MAX),
      Self::Uint8 => PrimitiveValue::Long(254),
      Self::Uint16 => PrimitiveValue::Long(65534),
      Self::Uint32 => PrimitiveValue::Long(i64::from(u32::MAX) - 1),
      Self::Uint64 => PrimitiveValue::from_u64(u64::MAX - 1),
      Self::Float => PrimitiveValue::Double(f64::from(f32::MAX)),
      Self::Double => PrimitiveValue::Double(f64::MAX),
    }
  }

  pub fn null_value(self) -> PrimitiveValue {
    match self {
      Self::Char => PrimitiveValue::Long(0),
      Self::Int8 => PrimitiveValue::Long(i64::from(i8::MIN)),
      Self::Int16 => PrimitiveValue::Long(i64::from(i16::MIN)),
      Self::Int32 => PrimitiveValue::Long(i64::from(i32::MIN)),
      Self::Int64 => PrimitiveValue::Long(i64::MIN),
      Self::Uint8 => PrimitiveValue::Long(i64::from(u8::MAX)),
      Self::Uint16 => PrimitiveValue::Long(i64::from(u16::MAX)),
      Self::Uint32 => PrimitiveValue::Long(i64::from(u32::MAX)),
      Self::Uint64 => PrimitiveValue::from_u64(u64::MAX),
      Self::Float | Self::Double => PrimitiveValue::Double(f64::NAN),
    }
  }

  /// Inclusive range of integers the type can physically hold, used to
  /// reject out-of-range schema literals. `None` for floating point.
  pub(crate) fn integer_range(self) -> Option<(i128, i128)> {
    let range = match self {
      Self::Char | Self::Uint8 => (0, i128::from(u8::MAX)),
      Self::Int8 => (i128::from(i8::MIN), i128::from(i8::MAX)),
      Self::Int16 => (i128::from(i16::MIN), i128::from(i16::MAX)),
      Self::Int32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
      Self::Int64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
      Self::Uint16 => (0, i128::from(u16::MAX)),
      Self::Uint32 => (0, i128::from(u32::MAX)),
      Self::Uint64 => (0, i128::from(u64::MAX)),
      Self::Float | Self::Double => return None,
    };
    Some(range)
  }
}

impl fmt::Display for PrimitiveType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl std::str::FromStr for PrimitiveType {
  type Err = TypeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::from_name(s).ok_or(TypeError::InvalidValue {
      primitive_type: "primitive type",
      text: s.to_owned(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sizes() {
    assert_eq!(PrimitiveType::Char.size(), 1);
    assert_eq!(PrimitiveType::Uint16.size(), 2);
    assert_eq!(PrimitiveType::Float.size(), 4);
    assert_eq!(PrimitiveType::Uint64.size(), 8);
  }

  #[test]
  fn names_resolve_both_ways() {
    for t in PrimitiveType::ALL {
      assert_eq!(PrimitiveType::from_name(t.name()), Some(t));
    }
    assert_eq!(PrimitiveType::from_name("float32"), None);
    assert!("uint128".parse::<PrimitiveType>().is_err());
  }

  #[test]
  fn null_sentinels_sit_outside_valid_range() {
    assert_eq!(PrimitiveType::Uint8.null_value(), PrimitiveValue::Long(255));
    assert_eq!(PrimitiveType::Uint8.max_value(), PrimitiveValue::Long(254));
    assert_eq!(PrimitiveType::Int8.null_value(), PrimitiveValue::Long(-128));
    assert_eq!(PrimitiveType::Int8.min_value(), PrimitiveValue::Long(-127));
    assert_eq!(PrimitiveType::Uint64.null_value().as_u64(), Some(u64::MAX));
  }

  #[test]
  fn float_null_is_nan() {
    match PrimitiveType::Double.null_value() {
      PrimitiveValue::Double(v) => assert!(v.is_nan()),
      other => panic!("unexpected {other:?}"),
    }
  }
}
