#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: IR frame decoder entry point.
//
// Catches bugs in:
// - Frame header validation (magic, format version, flags)
// - Body decompression and its size limit
// - Token and encoding field parsing
// - Token list structure checks
// - Trailing data detection
fuzz_target!(|data: &[u8]| {
    let mut decoder = sbe_ir::IrDecoder::new();
    decoder.max_body_size(1 << 20);
    let _ = decoder.decode(data);
});
