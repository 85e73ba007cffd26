/// Implementation of `sbe decode`.
///
/// Loads an IR file, reads the message header at the start of the
/// message file to pick the template, and prints the body as JSON:
///
/// ```text
/// {"serialNumber":1234,"modelYear":2013,"available":"T", ...}
/// ```
///
/// Bytes left over after the message are reported as a warning, not an
/// error.
use std::fs;

use anyhow::{Context, Result, anyhow};
use sbe_ir::IrDecoder;
use sbe_otf::{JsonConfig, JsonPrinter, decode_message};
use tracing::{debug, warn};

use crate::DecodeArgs;

/// Run the `sbe decode` command.
///
/// # Errors
///
/// Returns an error if either file cannot be read, the IR is invalid,
/// or the message does not decode against it.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let frame = fs::read(&args.ir).with_context(|| format!("cannot read {}", args.ir.display()))?;
    let ir = IrDecoder::new()
        .decode(&frame)
        .with_context(|| format!("failed to decode {}", args.ir.display()))?;
    let message = fs::read(&args.message).with_context(|| format!("cannot read {}", args.message.display()))?;

    let mut printer = JsonPrinter::new(JsonConfig {
        pretty: args.pretty,
        include_message_name: false,
    });
    let consumed = decode_message(&ir, &message, 0, &mut printer)
        .with_context(|| format!("failed to decode message {}", args.message.display()))?;
    debug!(consumed, total = message.len(), "message decoded");
    if consumed < message.len() {
        warn!(trailing = message.len() - consumed, "bytes after the message were ignored");
    }

    let json = printer
        .render()
        .context("cannot render JSON")?
        .ok_or_else(|| anyhow!("decoder produced no message"))?;
    println!("{json}");
    Ok(())
}
