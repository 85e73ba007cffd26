#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: every u64 written as a varint reads back unchanged and
// consumes exactly the bytes written.
fuzz_target!(|value: u64| {
    let mut out = Vec::new();
    let written = sbe_wire::varint::write_varint(value, &mut out);
    let (back, read) = sbe_wire::varint::read_varint(&out, 0).expect("own varint decodes");
    assert_eq!(back, value);
    assert_eq!(read, written);
    assert_eq!(written, out.len());
});
