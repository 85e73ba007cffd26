use sbe_types::Token;

use crate::error::DecodeError;

/// Callbacks fired by [`MessageDecoder`](crate::MessageDecoder) as it
/// walks a buffer.
///
/// Every method defaults to doing nothing, so a listener implements only
/// what it needs. Returning an error stops the decode at once; the error
/// is handed back to the caller unchanged.
///
/// Offsets are absolute positions in `buffer` and have already been
/// bounds-checked against the width the token declares. Token ranges are
/// sub-slices of the message token list, BEGIN through END inclusive.
///
/// ```text
/// on_begin_message
///   on_encoding / on_enum / on_bit_set         (block fields)
///   on_begin_composite .. on_end_composite     (composite fields)
///   on_group_header
///     on_begin_group .. on_end_group           (once per element)
///   on_var_data
/// on_end_message
/// ```
#[allow(unused_variables)]
pub trait TokenListener {
    fn on_begin_message(&mut self, token: &Token) -> Result<(), DecodeError> {
        Ok(())
    }

    fn on_end_message(&mut self, token: &Token) -> Result<(), DecodeError> {
        Ok(())
    }

    /// A scalar or fixed array. `field` is the BEGIN_FIELD token for block
    /// fields and the member token itself inside composites.
    fn on_encoding(
        &mut self,
        field: &Token,
        buffer: &[u8],
        offset: usize,
        type_token: &Token,
        acting_version: u32,
    ) -> Result<(), DecodeError> {
        Ok(())
    }

    /// An enum value. `tokens` runs from BEGIN_ENUM to END_ENUM. For a
    /// constant field nothing is read from `buffer`.
    fn on_enum(
        &mut self,
        field: &Token,
        buffer: &[u8],
        offset: usize,
        tokens: &[Token],
        acting_version: u32,
    ) -> Result<(), DecodeError> {
        Ok(())
    }

    /// A bit set. `tokens` runs from BEGIN_SET to END_SET.
    fn on_bit_set(
        &mut self,
        field: &Token,
        buffer: &[u8],
        offset: usize,
        tokens: &[Token],
        acting_version: u32,
    ) -> Result<(), DecodeError> {
        Ok(())
    }

    fn on_begin_composite(&mut self, field: &Token, tokens: &[Token]) -> Result<(), DecodeError> {
        Ok(())
    }

    fn on_end_composite(&mut self, field: &Token, tokens: &[Token]) -> Result<(), DecodeError> {
        Ok(())
    }

    /// Fired once per group before its elements, even when empty.
    fn on_group_header(&mut self, token: &Token, num_in_group: u64) -> Result<(), DecodeError> {
        Ok(())
    }

    /// An empty group still gets one begin/end pair with index 0 and
    /// count 0.
    fn on_begin_group(&mut self, token: &Token, index: u64, num_in_group: u64) -> Result<(), DecodeError> {
        Ok(())
    }

    fn on_end_group(&mut self, token: &Token, index: u64, num_in_group: u64) -> Result<(), DecodeError> {
        Ok(())
    }

    /// A var-data payload of `length` bytes at `offset`. `type_token` is
    /// the `varData` member describing the element type.
    fn on_var_data(
        &mut self,
        field: &Token,
        buffer: &[u8],
        offset: usize,
        length: usize,
        type_token: &Token,
    ) -> Result<(), DecodeError> {
        Ok(())
    }
}
