#![warn(clippy::pedantic)]

//! On-the-fly decoding of encoded messages driven only by their IR.
//!
//! ```text
//!   buffer ──► HeaderDecoder ──► template id ──► Ir::message(id)
//!                                                     │
//!   buffer ──────────────────────► MessageDecoder ◄───┘
//!                                       │
//!                                       ▼
//!                               TokenListener callbacks
//! ```
//!
//! The decoder never looks at type names except to find the dimension
//! and length sub-fields of groups and var data. Everything else comes
//! from signals and the offsets baked into the tokens.

pub mod decoder;
pub mod error;
pub mod group;
pub mod header;
pub mod json;
pub mod listener;

mod scalar;

pub use decoder::{MessageDecoder, decode, decode_message};
pub use error::DecodeError;
pub use group::{GroupSize, GroupSizeDecoder, VarDataDecoder};
pub use header::{HeaderDecoder, MessageHeader};
pub use json::{JsonConfig, JsonPrinter};
pub use listener::TokenListener;
