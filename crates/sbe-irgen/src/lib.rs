#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod generator;
pub mod registry;
pub mod schema;
pub mod transform;
pub mod validate;

pub use config::GeneratorConfig;
pub use error::SchemaError;
pub use generator::IrGenerator;
pub use registry::{ResolvedType, TypeRegistry};
pub use schema::MessageSchema;
pub use transform::SinceVersionTransform;
