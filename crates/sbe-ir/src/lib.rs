#![warn(clippy::pedantic)]

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod header;
pub mod ir;

mod compression;

pub use decoder::IrDecoder;
pub use encoder::IrEncoder;
pub use error::{CodecError, IrError};
pub use header::{HeaderField, HeaderStructure};
pub use ir::{Ir, SchemaInfo};
