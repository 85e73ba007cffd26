#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: LEB128 reads used for IR string and list lengths.
//
// Catches bugs in:
// - Overlong encodings (more than 10 bytes)
// - Reads starting at a non-zero offset
// - Zero-length input
fuzz_target!(|data: &[u8]| {
    let offset = data.first().map_or(0, |b| usize::from(*b) % 4);
    let _ = sbe_wire::varint::read_varint(data, offset);
});
