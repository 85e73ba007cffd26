/// Implementation of `sbe inspect`.
///
/// Decodes an IR file and prints the schema summary followed by the
/// indented token list of each message (and of each named type with
/// `--types`).
///
/// # Output format
///
/// ```text
/// Schema: baseline id=1 version=1 byte order=littleEndian
/// Header: block_length@0 template_id@2 schema_id@4 version@6 (8 bytes)
///
/// Message 1:
/// BEGIN_MESSAGE name=Car id=1 version=0 offset=0 length=44 count=...
///   BEGIN_FIELD name=serialNumber id=1 ...
/// ...
/// ```
use std::fs;

use anyhow::{Context, Result, bail};
use sbe_ir::{HeaderField, Ir, IrDecoder};
use sbe_types::tokens::dump;

use crate::InspectArgs;

/// Run the `sbe inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, or `--message`
/// names a template the IR does not hold.
pub fn run(args: &InspectArgs) -> Result<()> {
    let bytes = fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let ir = IrDecoder::new()
        .decode(&bytes)
        .with_context(|| format!("failed to decode {}", args.file.display()))?;

    print_summary(&ir);

    match args.message {
        Some(id) => {
            let Some(tokens) = ir.message(id) else {
                bail!("no message with template id {id}");
            };
            println!("\nMessage {id}:");
            print!("{}", dump(tokens));
        }
        None => {
            for (id, tokens) in ir.messages() {
                println!("\nMessage {id}:");
                print!("{}", dump(tokens));
            }
        }
    }

    if args.types {
        for (name, tokens) in ir.types() {
            println!("\nType {name}:");
            print!("{}", dump(tokens));
        }
    }
    Ok(())
}

fn print_summary(ir: &Ir) {
    let info = ir.info();
    println!(
        "Schema: {} id={} version={} byte order={}",
        info.package_name,
        info.id,
        info.version,
        info.byte_order.name()
    );
    let h = ir.header_structure();
    println!(
        "Header: block_length{} template_id{} schema_id{} version{} ({} bytes)",
        at(&h.block_length),
        at(&h.template_id),
        at(&h.schema_id),
        at(&h.version),
        h.encoded_length
    );
}

fn at(field: &HeaderField) -> String {
    format!("@{}", field.offset)
}
