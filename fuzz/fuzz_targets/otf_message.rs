#![no_main]

use std::sync::OnceLock;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sbe_ir::Ir;
use sbe_otf::{JsonConfig, JsonPrinter, decode_message};

#[derive(Debug, Arbitrary)]
struct Input {
    /// Start from a valid Car and overwrite these positions.
    patches: Vec<(u8, u8)>,
    version: bool,
    /// Raw bytes appended after the patched Car.
    tail: Vec<u8>,
}

fn ir() -> &'static Ir {
    static IR: OnceLock<Ir> = OnceLock::new();
    IR.get_or_init(sbe_tests::car_ir)
}

// Fuzz target: on-the-fly decoding of a mutated Car message into JSON.
//
// Catches bugs in:
// - Header and group size bounds checks
// - Var data lengths larger than the buffer
// - Acting version handling when the header version is damaged
// - Enum and set lookups for values outside the schema
fuzz_target!(|input: Input| {
    let mut buffer = sbe_tests::car_message(u16::from(input.version));
    for (index, value) in input.patches {
        let index = usize::from(index) % buffer.len();
        buffer[index] = value;
    }
    buffer.extend_from_slice(&input.tail);

    let mut printer = JsonPrinter::new(JsonConfig::default());
    if decode_message(ir(), &buffer, 0, &mut printer).is_ok() {
        let _ = printer.render();
    }
});
