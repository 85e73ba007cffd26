use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use sbe_wire::buffer;
use sbe_wire::{ByteOrder, WireError};

use crate::error::TypeError;
use crate::primitive::PrimitiveType;

/// Character encoding assumed for `char` data when a schema names none.
pub const DEFAULT_CHARACTER_ENCODING: &str = "US-ASCII";

/// An immutable constant, bound or sentinel carried by an [`Encoding`].
///
/// Integers of every width are held sign- or zero-extended in an `i64`.
/// `uint64` values above `i64::MAX` keep their bit pattern; use
/// [`from_u64`](Self::from_u64) and [`as_u64`](Self::as_u64) to cross that
/// boundary. `float` values are widened to `f64` exactly.
///
/// Ordering is total: every `Long` sorts before every `Double`, which
/// sorts before every `Bytes`. Doubles compare with [`f64::total_cmp`] and
/// are equal only when their bit patterns are, so a NaN null value equals
/// itself and survives serialization unchanged.
///
/// [`Encoding`]: crate::Encoding
#[derive(Clone, Debug)]
pub enum PrimitiveValue {
    Long(i64),
    Double(f64),
    Bytes {
        bytes: Vec<u8>,
        character_encoding: String,
    },
}

impl PrimitiveValue {
    /// Store a `uint64` by bit pattern.
    #[allow(clippy::cast_possible_wrap)]
    pub fn from_u64(value: u64) -> Self {
        Self::Long(value as i64)
    }

    /// A byte sequence tagged with its character encoding.
    pub fn bytes(bytes: impl Into<Vec<u8>>, character_encoding: impl Into<String>) -> Self {
        Self::Bytes {
            bytes: bytes.into(),
            character_encoding: character_encoding.into(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// The integer reinterpreted as unsigned.
    #[allow(clippy::cast_sign_loss)]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().map(|v| v as u64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes { bytes, .. } => Some(bytes),
            _ => None,
        }
    }

    /// Parse a schema literal as a value of `primitive_type`.
    ///
    /// A single character becomes the `Long` of its code for `char`;
    /// longer `char` literals become `US-ASCII` byte sequences. Integer
    /// literals must fit the physical width of the type (sentinels
    /// included).
    ///
    /// # Errors
    ///
    /// [`TypeError::InvalidValue`] for malformed or out-of-range text.
    pub fn parse(primitive_type: PrimitiveType, text: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidValue {
            primitive_type: primitive_type.name(),
            text: text.to_owned(),
        };

        match primitive_type {
            PrimitiveType::Char if text.len() == 1 => Ok(Self::Long(i64::from(text.as_bytes()[0]))),
            PrimitiveType::Char => Ok(Self::bytes(text.as_bytes(), DEFAULT_CHARACTER_ENCODING)),
            PrimitiveType::Float => {
                let v: f32 = text.trim().parse().map_err(|_| invalid())?;
                Ok(Self::Double(f64::from(v)))
            }
            PrimitiveType::Double => text.trim().parse().map(Self::Double).map_err(|_| invalid()),
            integer => {
                let v: i128 = text.trim().parse().map_err(|_| invalid())?;
                let (lo, hi) = integer.integer_range().ok_or_else(invalid)?;
                if v < lo || v > hi {
                    return Err(invalid());
                }
                if integer == PrimitiveType::Uint64 {
                    let unsigned = u64::try_from(v).map_err(|_| invalid())?;
                    Ok(Self::from_u64(unsigned))
                } else {
                    i64::try_from(v).map(Self::Long).map_err(|_| invalid())
                }
            }
        }
    }

    /// Read one scalar of `primitive_type` from a message buffer.
    ///
    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] if the value crosses the end of `buf`.
    pub fn read(
        buf: &[u8],
        offset: usize,
        primitive_type: PrimitiveType,
        order: ByteOrder,
    ) -> Result<Self, WireError> {
        let value = match primitive_type {
            PrimitiveType::Char | PrimitiveType::Uint8 => {
                Self::Long(i64::from(buffer::read_u8(buf, offset)?))
            }
            PrimitiveType::Int8 => Self::Long(i64::from(buffer::read_i8(buf, offset)?)),
            PrimitiveType::Int16 => Self::Long(i64::from(buffer::read_i16(buf, offset, order)?)),
            PrimitiveType::Uint16 => Self::Long(i64::from(buffer::read_u16(buf, offset, order)?)),
            PrimitiveType::Int32 => Self::Long(i64::from(buffer::read_i32(buf, offset, order)?)),
            PrimitiveType::Uint32 => Self::Long(i64::from(buffer::read_u32(buf, offset, order)?)),
            PrimitiveType::Int64 => Self::Long(buffer::read_i64(buf, offset, order)?),
            PrimitiveType::Uint64 => Self::from_u64(buffer::read_u64(buf, offset, order)?),
            PrimitiveType::Float => Self::Double(f64::from(buffer::read_f32(buf, offset, order)?)),
            PrimitiveType::Double => Self::Double(buffer::read_f64(buf, offset, order)?),
        };
        Ok(value)
    }

    /// Write this value as one scalar of `primitive_type`, truncating to
    /// the type's width. Byte sequences are copied verbatim.
    ///
    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] if the value crosses the end of `buf`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn write(
        &self,
        buf: &mut [u8],
        offset: usize,
        primitive_type: PrimitiveType,
        order: ByteOrder,
    ) -> Result<(), WireError> {
        let long = match self {
            Self::Long(v) => *v,
            Self::Double(v) => *v as i64,
            Self::Bytes { bytes, .. } => {
                buffer::slice_at_mut(buf, offset, bytes.len())?.copy_from_slice(bytes);
                return Ok(());
            }
        };
        #[allow(clippy::cast_precision_loss)]
        let double = match self {
            Self::Double(v) => *v,
            _ => long as f64,
        };

        match primitive_type {
            PrimitiveType::Char | PrimitiveType::Uint8 => buffer::write_u8(buf, offset, long as u8),
            PrimitiveType::Int8 => buffer::write_i8(buf, offset, long as i8),
            PrimitiveType::Int16 => buffer::write_i16(buf, offset, long as i16, order),
            PrimitiveType::Uint16 => buffer::write_u16(buf, offset, long as u16, order),
            PrimitiveType::Int32 => buffer::write_i32(buf, offset, long as i32, order),
            PrimitiveType::Uint32 => buffer::write_u32(buf, offset, long as u32, order),
            PrimitiveType::Int64 => buffer::write_i64(buf, offset, long, order),
            PrimitiveType::Uint64 => buffer::write_u64(buf, offset, long as u64, order),
            PrimitiveType::Float => buffer::write_f32(buf, offset, double as f32, order),
            PrimitiveType::Double => buffer::write_f64(buf, offset, double, order),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Long(_) => 0,
            Self::Double(_) => 1,
            Self::Bytes { .. } => 2,
        }
    }
}

impl PartialEq for PrimitiveValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PrimitiveValue {}

impl PartialOrd for PrimitiveValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrimitiveValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Long(a), Self::Long(b)) => a.cmp(b),
            (Self::Double(a), Self::Double(b)) => a.total_cmp(b),
            (
                Self::Bytes {
                    bytes: a,
                    character_encoding: ea,
                },
                Self::Bytes {
                    bytes: b,
                    character_encoding: eb,
                },
            ) => a.cmp(b).then_with(|| ea.cmp(eb)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for PrimitiveValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Long(v) => v.hash(state),
            Self::Double(v) => v.to_bits().hash(state),
            Self::Bytes {
                bytes,
                character_encoding,
            } => {
                bytes.hash(state);
                character_encoding.hash(state);
            }
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Bytes { bytes, .. } => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}
