/// Implementation of `sbe generate`.
///
/// Reads a JSON schema, generates its IR, and writes the encoded frame.
/// A one-line summary goes to stdout:
///
/// ```text
/// car.sbeir: schema 1 v1, 2 messages, 12 types, 4812 bytes
/// ```
use std::fs;

use anyhow::{Context, Result};
use sbe_ir::IrEncoder;
use sbe_irgen::{GeneratorConfig, IrGenerator, MessageSchema};

use crate::GenerateArgs;

/// Run the `sbe generate` command.
///
/// # Errors
///
/// Returns an error if the schema cannot be read or parsed, fails
/// validation, or the output cannot be written.
pub fn run(args: &GenerateArgs) -> Result<()> {
    let text = fs::read_to_string(&args.schema)
        .with_context(|| format!("cannot read {}", args.schema.display()))?;
    let schema: MessageSchema = serde_json::from_str(&text)
        .with_context(|| format!("invalid schema JSON in {}", args.schema.display()))?;

    let config = GeneratorConfig {
        target_version: args.target_version,
        ..GeneratorConfig::default()
    };
    let ir = IrGenerator::new(config)
        .generate(&schema)
        .with_context(|| format!("cannot generate IR for {}", args.schema.display()))?;

    let mut encoder = IrEncoder::new();
    if args.compress {
        encoder.compress_body();
    }
    let frame = encoder.encode(&ir);
    fs::write(&args.output, &frame).with_context(|| format!("cannot write {}", args.output.display()))?;

    println!(
        "{}: schema {} v{}, {} message{}, {} types, {} bytes",
        args.output.display(),
        ir.id(),
        ir.version(),
        ir.message_count(),
        if ir.message_count() == 1 { "" } else { "s" },
        ir.types().count(),
        frame.len()
    );
    Ok(())
}
