#![no_main]

use libfuzzer_sys::fuzz_target;
use sbe_ir::{IrDecoder, IrEncoder};

// Fuzz target: any frame that decodes must re-encode to a frame that
// decodes to the same container.
fuzz_target!(|data: &[u8]| {
    let Ok(ir) = IrDecoder::new().decode(data) else {
        return;
    };
    let frame = IrEncoder::new().encode(&ir);
    let back = IrDecoder::new().decode(&frame).expect("re-encoded IR decodes");
    assert_eq!(back, ir);
});
