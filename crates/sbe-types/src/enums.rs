use std::fmt;

use crate::error::TypeError;

// ── Macro for wire-byte enum boilerplate ──────────────────────────────
//
// Fieldless enums stored as a single byte in the IR frame share the same
// conversion pair. Doc comments and derives stay at the call site.

macro_rules! wire_enum {
  (
    $(#[$meta:meta])*
    pub enum $name:ident {
      $( $(#[$vmeta:meta])* $variant:ident = $wire:expr ),+ $(,)?
    }
  ) => {
    $(#[$meta])*
    pub enum $name {
      $( $(#[$vmeta])* $variant ),+
    }

    impl $name {
      /// Encode this variant as a single wire byte.
      pub fn to_wire_byte(self) -> u8 {
        match self {
          $( Self::$variant => $wire ),+
        }
      }

      /// Decode a wire byte into this enum.
      ///
      /// # Errors
      ///
      /// [`TypeError::InvalidEnumValue`] if the byte matches no variant.
      pub fn from_wire_byte(value: u8) -> Result<Self, TypeError> {
        match value {
          $( $wire => Ok(Self::$variant), )+
          other => Err(TypeError::InvalidEnumValue {
            enum_name: stringify!($name),
            value: other,
          }),
        }
      }
    }
  };
}

pub(crate) use wire_enum;

// ── Presence ──────────────────────────────────────────────────────────

wire_enum! {
  /// Whether a value must be present, may carry the null sentinel, or is
  /// fixed by the schema and absent from the wire.
  ///
  /// ```text
  /// ┌──────┬──────────┬───────────────────────────────────────┐
  /// │ Wire │ Presence │ On the wire                           │
  /// ├──────┼──────────┼───────────────────────────────────────┤
  /// │ 0x00 │ Required │ always encoded                        │
  /// │ 0x01 │ Optional │ encoded; null sentinel means "absent" │
  /// │ 0x02 │ Constant │ not encoded; value lives in the IR    │
  /// └──────┴──────────┴───────────────────────────────────────┘
  /// ```
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
  #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
  #[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
  pub enum Presence {
    #[default]
    Required = 0x00,
    Optional = 0x01,
    Constant = 0x02,
  }
}

impl Presence {
  pub fn name(self) -> &'static str {
    match self {
      Self::Required => "required",
      Self::Optional => "optional",
      Self::Constant => "constant",
    }
  }
}

// ── Signal ────────────────────────────────────────────────────────────

wire_enum! {
  /// Structural marker carried by every token.
  ///
  /// BEGIN/END pairs bracket a region of the flat token list; the three
  /// leaf signals never have a partner.
  ///
  /// ```text
  /// ┌──────┬────────────────┬──────┬────────────────┐
  /// │ Wire │ Signal         │ Wire │ Signal         │
  /// ├──────┼────────────────┼──────┼────────────────┤
  /// │ 0x01 │ BeginMessage   │ 0x0A │ ValidValue     │
  /// │ 0x02 │ EndMessage     │ 0x0B │ EndEnum        │
  /// │ 0x03 │ BeginComposite │ 0x0C │ BeginSet       │
  /// │ 0x04 │ EndComposite   │ 0x0D │ Choice         │
  /// │ 0x05 │ BeginField     │ 0x0E │ EndSet         │
  /// │ 0x06 │ EndField       │ 0x0F │ BeginVarData   │
  /// │ 0x07 │ BeginGroup     │ 0x10 │ EndVarData     │
  /// │ 0x08 │ EndGroup       │ 0x11 │ Encoding       │
  /// │ 0x09 │ BeginEnum      │      │                │
  /// └──────┴────────────────┴──────┴────────────────┘
  /// ```
  #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
  pub enum Signal {
    BeginMessage = 0x01,
    EndMessage = 0x02,
    BeginComposite = 0x03,
    EndComposite = 0x04,
    BeginField = 0x05,
    EndField = 0x06,
    BeginGroup = 0x07,
    EndGroup = 0x08,
    BeginEnum = 0x09,
    ValidValue = 0x0A,
    EndEnum = 0x0B,
    BeginSet = 0x0C,
    Choice = 0x0D,
    EndSet = 0x0E,
    BeginVarData = 0x0F,
    EndVarData = 0x10,
    Encoding = 0x11,
  }
}

impl Signal {
  /// The END signal that closes this BEGIN signal, or `None` for END and
  /// leaf signals.
  pub fn matching_end(self) -> Option<Self> {
    match self {
      Self::BeginMessage => Some(Self::EndMessage),
      Self::BeginComposite => Some(Self::EndComposite),
      Self::BeginField => Some(Self::EndField),
      Self::BeginGroup => Some(Self::EndGroup),
      Self::BeginEnum => Some(Self::EndEnum),
      Self::BeginSet => Some(Self::EndSet),
      Self::BeginVarData => Some(Self::EndVarData),
      _ => None,
    }
  }

  pub fn is_begin(self) -> bool {
    self.matching_end().is_some()
  }

  pub fn is_end(self) -> bool {
    matches!(
      self,
      Self::EndMessage
        | Self::EndComposite
        | Self::EndField
        | Self::EndGroup
        | Self::EndEnum
        | Self::EndSet
        | Self::EndVarData
    )
  }

  /// Upper snake case name, as printed in token dumps.
  pub fn name(self) -> &'static str {
    match self {
      Self::BeginMessage => "BEGIN_MESSAGE",
      Self::EndMessage => "END_MESSAGE",
      Self::BeginComposite => "BEGIN_COMPOSITE",
      Self::EndComposite => "END_COMPOSITE",
      Self::BeginField => "BEGIN_FIELD",
      Self::EndField => "END_FIELD",
      Self::BeginGroup => "BEGIN_GROUP",
      Self::EndGroup => "END_GROUP",
      Self::BeginEnum => "BEGIN_ENUM",
      Self::ValidValue => "VALID_VALUE",
      Self::EndEnum => "END_ENUM",
      Self::BeginSet => "BEGIN_SET",
      Self::Choice => "CHOICE",
      Self::EndSet => "END_SET",
      Self::BeginVarData => "BEGIN_VAR_DATA",
      Self::EndVarData => "END_VAR_DATA",
      Self::Encoding => "ENCODING",
    }
  }
}

impl fmt::Display for Signal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn signal_wire_bytes_roundtrip() {
    for byte in 0x01..=0x11 {
      let signal = Signal::from_wire_byte(byte).unwrap();
      assert_eq!(signal.to_wire_byte(), byte);
    }
  }

  #[test]
  fn unknown_signal_byte_rejected() {
    assert!(matches!(
      Signal::from_wire_byte(0x00),
      Err(TypeError::InvalidEnumValue { enum_name: "Signal", value: 0x00 })
    ));
    assert!(Signal::from_wire_byte(0x12).is_err());
  }

  #[test]
  fn begin_end_classification() {
    assert!(Signal::BeginGroup.is_begin());
    assert_eq!(Signal::BeginGroup.matching_end(), Some(Signal::EndGroup));
    assert!(Signal::EndVarData.is_end());
    assert!(!Signal::Encoding.is_begin());
    assert!(!Signal::Choice.is_end());
  }

  #[test]
  fn presence_default_is_required() {
    assert_eq!(Presence::default(), Presence::Required);
    assert_eq!(Presence::from_wire_byte(2).unwrap(), Presence::Constant);
  }
}
