#![warn(clippy::pedantic)]

pub mod buffer;
pub mod cursor;
pub mod error;
pub mod header;
pub mod varint;

pub use buffer::ByteOrder;
pub use cursor::{FrameReader, FrameWriter};
pub use error::WireError;
pub use header::{FrameFlags, FrameHeader};
