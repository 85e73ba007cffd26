use std::collections::HashMap;

use sbe_ir::Ir;
use sbe_types::tokens::{check_balanced, children, end_index};
use sbe_types::{Signal, Token, TypeError};
use sbe_wire::buffer::check_range;
use tracing::trace;

use crate::error::DecodeError;
use crate::group::{GroupSizeDecoder, VarDataDecoder};
use crate::header::HeaderDecoder;
use crate::listener::TokenListener;
use crate::scalar::{offset, to_usize};

/// Replays encoded messages of one template against a [`TokenListener`].
///
/// Building the decoder checks the token list once and caches a
/// [`GroupSizeDecoder`] for every group and a [`VarDataDecoder`] for
/// every var-data field. After that the decoder is read-only: one
/// instance may serve any number of buffers, from any number of threads.
///
/// Walk order inside each block (the message root and every group
/// element):
///
/// ```text
///   fixed fields   at block_start + token offset
///   groups         starting at block_start + block_length
///   var data       after the last group
/// ```
///
/// Members whose version is newer than the acting version were never
/// written, so they are skipped without callbacks and without consuming
/// bytes.
#[derive(Debug)]
pub struct MessageDecoder<'t> {
    tokens: &'t [Token],
    groups: HashMap<usize, GroupSizeDecoder>,
    var_data: HashMap<usize, VarDataDecoder>,
}

impl<'t> MessageDecoder<'t> {
    /// # Errors
    ///
    /// [`DecodeError::MalformedTokens`] if the list is not one balanced
    /// BEGIN_MESSAGE..END_MESSAGE region, or a group or var-data entry
    /// lacks its sub-fields.
    pub fn new(tokens: &'t [Token]) -> Result<Self, DecodeError> {
        if tokens.first().map(|t| t.signal) != Some(Signal::BeginMessage) {
            return Err(DecodeError::MalformedTokens {
                index: 0,
                reason: "first token is not BEGIN_MESSAGE",
            });
        }
        check_balanced(tokens).map_err(|e| match e {
            TypeError::UnbalancedTokens { index, reason } => DecodeError::MalformedTokens { index, reason },
            other => DecodeError::Type(other),
        })?;
        if end_index(tokens, 0) != tokens.len() - 1 {
            return Err(DecodeError::MalformedTokens {
                index: end_index(tokens, 0),
                reason: "tokens follow END_MESSAGE",
            });
        }

        let mut groups = HashMap::new();
        let mut var_data = HashMap::new();
        for (i, token) in tokens.iter().enumerate() {
            match token.signal {
                Signal::BeginGroup => {
                    groups.insert(i, GroupSizeDecoder::new(tokens, i)?);
                }
                Signal::BeginVarData => {
                    var_data.insert(i, VarDataDecoder::new(tokens, i)?);
                }
                _ => {}
            }
        }
        Ok(Self {
            tokens,
            groups,
            var_data,
        })
    }

    pub fn tokens(&self) -> &'t [Token] {
        self.tokens
    }

    /// Decode one message body starting at `start`.
    ///
    /// `block_length` is the root block width from the message header,
    /// which may differ from the token list's own when the writer used a
    /// different schema version.
    ///
    /// Returns the number of bytes consumed from `start`.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Wire`] if any read would cross the end of `buffer`.
    /// - [`DecodeError::InvalidLength`] for unusable counts or lengths.
    /// - [`DecodeError::MalformedTokens`] if a field has no type token.
    /// - Whatever the listener returns.
    pub fn decode<L: TokenListener + ?Sized>(
        &self,
        buffer: &[u8],
        start: usize,
        acting_version: u32,
        block_length: usize,
        listener: &mut L,
    ) -> Result<usize, DecodeError> {
        let tokens = self.tokens;
        trace!(message = %tokens[0].name, start, acting_version, block_length, "decoding message");
        listener.on_begin_message(&tokens[0])?;
        let end = self.decode_block(buffer, start, acting_version, block_length, 0, listener)?;
        listener.on_end_message(&tokens[tokens.len() - 1])?;
        Ok(end - start)
    }

    // ── Blocks ────────────────────────────────────────────────────────

    /// Decode the fields, groups and var data directly inside the
    /// message or group at `begin`. Returns the position after the last
    /// byte consumed.
    fn decode_block<L: TokenListener + ?Sized>(
        &self,
        buffer: &[u8],
        block_start: usize,
        acting_version: u32,
        block_length: usize,
        begin: usize,
        listener: &mut L,
    ) -> Result<usize, DecodeError> {
        check_range(buffer.len(), block_start, block_length)?;
        let mut cursor = block_start + block_length;

        for child in children(self.tokens, begin) {
            let token = &self.tokens[child];
            if token.version > acting_version {
                continue;
            }
            match token.signal {
                Signal::BeginField => self.decode_field(buffer, block_start, child, acting_version, listener)?,
                Signal::BeginGroup => cursor = self.decode_group(buffer, cursor, child, acting_version, listener)?,
                Signal::BeginVarData => cursor = self.decode_var_data(buffer, cursor, child, listener)?,
                // The dimension composite of a group element.
                _ => {}
            }
        }
        Ok(cursor)
    }

    fn decode_field<L: TokenListener + ?Sized>(
        &self,
        buffer: &[u8],
        block_start: usize,
        begin: usize,
        acting_version: u32,
        listener: &mut L,
    ) -> Result<(), DecodeError> {
        let field = &self.tokens[begin];
        let type_index = begin + 1;
        let Some(type_token) = self.tokens.get(type_index).filter(|t| t.signal != Signal::EndField) else {
            return Err(DecodeError::MalformedTokens {
                index: begin,
                reason: "field has no type",
            });
        };
        let at = offset(block_start, self.static_offset(type_index)?, buffer.len())?;

        match type_token.signal {
            Signal::Encoding => {
                self.check_width(buffer, at, type_index)?;
                listener.on_encoding(field, buffer, at, type_token, acting_version)
            }
            Signal::BeginEnum => {
                if !field.is_constant_encoding() {
                    self.check_width(buffer, at, type_index)?;
                }
                listener.on_enum(field, buffer, at, self.region(type_index), acting_version)
            }
            Signal::BeginSet => {
                self.check_width(buffer, at, type_index)?;
                listener.on_bit_set(field, buffer, at, self.region(type_index), acting_version)
            }
            Signal::BeginComposite => self.decode_composite(field, buffer, at, type_index, acting_version, listener),
            _ => Err(DecodeError::MalformedTokens {
                index: type_index,
                reason: "unexpected signal inside a field",
            }),
        }
    }

    /// Walk a composite at any depth. `base` is the composite's absolute
    /// offset; members are placed relative to it.
    fn decode_composite<L: TokenListener + ?Sized>(
        &self,
        field: &Token,
        buffer: &[u8],
        base: usize,
        begin: usize,
        acting_version: u32,
        listener: &mut L,
    ) -> Result<(), DecodeError> {
        let region = self.region(begin);
        listener.on_begin_composite(field, region)?;

        for child in children(self.tokens, begin) {
            let member = &self.tokens[child];
            if member.version > acting_version {
                continue;
            }
            let at = offset(base, self.static_offset(child)?, buffer.len())?;
            match member.signal {
                Signal::Encoding => {
                    self.check_width(buffer, at, child)?;
                    listener.on_encoding(member, buffer, at, member, acting_version)?;
                }
                Signal::BeginEnum => {
                    self.check_width(buffer, at, child)?;
                    listener.on_enum(member, buffer, at, self.region(child), acting_version)?;
                }
                Signal::BeginSet => {
                    self.check_width(buffer, at, child)?;
                    listener.on_bit_set(member, buffer, at, self.region(child), acting_version)?;
                }
                Signal::BeginComposite => {
                    self.decode_composite(member, buffer, at, child, acting_version, listener)?;
                }
                _ => {
                    return Err(DecodeError::MalformedTokens {
                        index: child,
                        reason: "unexpected signal inside a composite",
                    });
                }
            }
        }

        listener.on_end_composite(field, region)
    }

    // ── Groups and var data ───────────────────────────────────────────

    fn decode_group<L: TokenListener + ?Sized>(
        &self,
        buffer: &[u8],
        at: usize,
        begin: usize,
        acting_version: u32,
        listener: &mut L,
    ) -> Result<usize, DecodeError> {
        let group = &self.tokens[begin];
        let dimension = self.groups.get(&begin).ok_or(DecodeError::MalformedTokens {
            index: begin,
            reason: "group was not cached",
        })?;
        let size = dimension.decode(buffer, at)?;
        let mut cursor = offset(at, dimension.encoded_length(), buffer.len())?;
        trace!(
            group = %group.name,
            num_in_group = size.num_in_group,
            block_length = size.block_length,
            "decoding group"
        );

        // A block narrower than its fields, or a count the remaining bytes
        // cannot hold, fails before any group callbacks.
        let (extent, has_members) = self.fixed_extent(begin, acting_version)?;
        if size.block_length < extent {
            return Err(DecodeError::InvalidLength {
                offset: at,
                value: i64::try_from(size.block_length).unwrap_or(i64::MAX),
            });
        }
        if has_members || size.block_length > 0 {
            let remaining = buffer.len().saturating_sub(cursor);
            let fits = u64::try_from(remaining / size.block_length.max(1)).unwrap_or(u64::MAX);
            if size.num_in_group > fits {
                return Err(DecodeError::InvalidLength {
                    offset: at,
                    value: i64::try_from(size.num_in_group).unwrap_or(i64::MAX),
                });
            }
        }

        listener.on_group_header(group, size.num_in_group)?;
        if size.num_in_group == 0 {
            listener.on_begin_group(group, 0, 0)?;
            listener.on_end_group(group, 0, 0)?;
            return Ok(cursor);
        }

        for index in 0..size.num_in_group {
            listener.on_begin_group(group, index, size.num_in_group)?;
            cursor = self.decode_block(buffer, cursor, acting_version, size.block_length, begin, listener)?;
            listener.on_end_group(group, index, size.num_in_group)?;
        }
        Ok(cursor)
    }

    fn decode_var_data<L: TokenListener + ?Sized>(
        &self,
        buffer: &[u8],
        at: usize,
        begin: usize,
        listener: &mut L,
    ) -> Result<usize, DecodeError> {
        let var = self.var_data.get(&begin).ok_or(DecodeError::MalformedTokens {
            index: begin,
            reason: "var data was not cached",
        })?;
        let length = var.byte_length(buffer, at)?;
        let payload = var.payload_at(buffer, at)?;
        if check_range(buffer.len(), payload, length).is_err() {
            return Err(DecodeError::InvalidLength {
                offset: at,
                value: i64::try_from(length).unwrap_or(i64::MAX),
            });
        }
        trace!(name = %self.tokens[begin].name, length, "decoding var data");

        listener.on_var_data(
            &self.tokens[begin],
            buffer,
            payload,
            length,
            &self.tokens[var.payload_index()],
        )?;
        Ok(payload + length)
    }

    // ── Helpers ───────────────────────────────────────────────────────

    /// End of the furthest fixed field of the group at `begin` that the
    /// acting version wrote, and whether any member was written at all.
    /// Nested groups and var data each consume at least a header, so an
    /// element with members always takes at least one byte.
    fn fixed_extent(&self, begin: usize, acting_version: u32) -> Result<(usize, bool), DecodeError> {
        let mut extent = 0;
        let mut has_members = false;
        for child in children(self.tokens, begin) {
            let token = &self.tokens[child];
            if token.version > acting_version {
                continue;
            }
            match token.signal {
                Signal::BeginField => {
                    has_members = true;
                    let width = usize::try_from(token.encoded_length).unwrap_or_default();
                    extent = extent.max(offset(self.static_offset(child)?, width, usize::MAX)?);
                }
                Signal::BeginGroup | Signal::BeginVarData => has_members = true,
                _ => {}
            }
        }
        Ok((extent, has_members))
    }

    /// BEGIN through END of the region starting at `begin`.
    fn region(&self, begin: usize) -> &'t [Token] {
        &self.tokens[begin..=end_index(self.tokens, begin)]
    }

    fn static_offset(&self, index: usize) -> Result<usize, DecodeError> {
        usize::try_from(self.tokens[index].offset).map_err(|_| DecodeError::MalformedTokens {
            index,
            reason: "member has no static offset",
        })
    }

    /// Fail unless the token's declared width fits at `at`.
    fn check_width(&self, buffer: &[u8], at: usize, index: usize) -> Result<(), DecodeError> {
        let token = &self.tokens[index];
        if token.is_constant_encoding() {
            return Ok(());
        }
        let width = usize::try_from(token.encoded_length).map_err(|_| DecodeError::MalformedTokens {
            index,
            reason: "variable-length member in a fixed block",
        })?;
        check_range(buffer.len(), at, width)?;
        Ok(())
    }
}

/// One-shot decode of a message body against its token list.
///
/// # Errors
///
/// As for [`MessageDecoder::new`] and [`MessageDecoder::decode`].
pub fn decode<L: TokenListener + ?Sized>(
    buffer: &[u8],
    start: usize,
    acting_version: u32,
    block_length: usize,
    tokens: &[Token],
    listener: &mut L,
) -> Result<usize, DecodeError> {
    MessageDecoder::new(tokens)?.decode(buffer, start, acting_version, block_length, listener)
}

/// Decode a framed message: read the header at `start`, find the
/// template in `ir`, and decode the body that follows.
///
/// Returns the bytes consumed, header included.
///
/// # Errors
///
/// [`DecodeError::UnknownTemplate`] if `ir` has no such message, plus
/// everything [`decode`] can return.
pub fn decode_message<L: TokenListener + ?Sized>(
    ir: &Ir,
    buffer: &[u8],
    start: usize,
    listener: &mut L,
) -> Result<usize, DecodeError> {
    let header_decoder = HeaderDecoder::for_ir(ir);
    let header = header_decoder.decode(buffer, start)?;
    let tokens = i32::try_from(header.template_id)
        .ok()
        .and_then(|id| ir.message(id))
        .ok_or(DecodeError::UnknownTemplate {
            id: header.template_id,
        })?;

    let body = offset(start, header_decoder.encoded_length(), buffer.len())?;
    let block_length = to_usize(header.block_length, start)?;
    let acting_version = u32::try_from(header.version).unwrap_or(u32::MAX);
    let consumed = decode(buffer, body, acting_version, block_length, tokens, listener)?;
    Ok(header_decoder.encoded_length() + consumed)
}
