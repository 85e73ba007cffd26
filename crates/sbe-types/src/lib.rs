#![warn(clippy::pedantic)]

pub mod encoding;
pub mod enums;
pub mod error;
pub mod primitive;
pub mod token;
pub mod tokens;
pub mod value;

pub use encoding::Encoding;
pub use enums::{Presence, Signal};
pub use error::TypeError;
pub use primitive::PrimitiveType;
pub use sbe_wire::ByteOrder;
pub use token::{Token, TokenBuilder};
pub use value::PrimitiveValue;
