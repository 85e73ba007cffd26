//! IR frame round trips and rejection of damaged frames.
//!
//! The property tests generate small random schemas, push them through
//! generator → encoder → decoder, and require the container to come back
//! equal. A second property feeds arbitrary bytes to the decoder, which
//! must fail cleanly rather than panic.

use proptest::prelude::*;
use sbe_ir::{CodecError, IrDecoder, IrEncoder};
use sbe_irgen::{IrGenerator, MessageSchema};
use sbe_tests::car_ir;
use sbe_wire::WireError;
use serde_json::{Value, json};

// ── Car round trips ───────────────────────────────────────────────────────────

#[test]
fn car_round_trips() {
    let ir = car_ir();
    let frame = IrEncoder::new().encode(&ir);
    assert_eq!(&frame[..4], b"SBIR");
    let back = IrDecoder::new().decode(&frame).unwrap();
    assert_eq!(back, ir);
    assert_eq!(back.types().count(), ir.types().count());
}

#[test]
fn compressed_car_round_trips_and_is_smaller() {
    let ir = car_ir();
    let plain = IrEncoder::new().encode(&ir);
    let compressed = IrEncoder::new().compress_body().encode(&ir);
    assert!(compressed.len() < plain.len());
    assert_eq!(IrDecoder::new().decode(&compressed).unwrap(), ir);
}

#[test]
fn encoding_twice_gives_identical_frames() {
    let ir = car_ir();
    assert_eq!(IrEncoder::new().encode(&ir), IrEncoder::new().encode(&ir));
}

// ── Damaged frames ────────────────────────────────────────────────────────────

#[test]
fn truncated_car_frame_always_fails() {
    let frame = IrEncoder::new().encode(&car_ir());
    for len in [0, 3, 8, 9, frame.len() / 2, frame.len() - 1] {
        assert!(
            IrDecoder::new().decode(&frame[..len]).is_err(),
            "prefix of {len} bytes decoded"
        );
    }
}

#[test]
fn wrong_magic_rejected() {
    let mut frame = IrEncoder::new().encode(&car_ir());
    frame[0] = b'X';
    assert!(matches!(
        IrDecoder::new().decode(&frame),
        Err(CodecError::Wire(WireError::InvalidMagic { .. }))
    ));
}

#[test]
fn trailing_bytes_reported_with_count() {
    let mut frame = IrEncoder::new().encode(&car_ir());
    frame.extend_from_slice(&[0, 0, 0]);
    assert!(matches!(
        IrDecoder::new().decode(&frame),
        Err(CodecError::TrailingData { extra_bytes: 3, .. })
    ));
}

#[test]
fn decompression_limit_enforced() {
    let frame = IrEncoder::new().compress_body().encode(&car_ir());
    let mut decoder = IrDecoder::new();
    decoder.max_body_size(16);
    assert!(matches!(
        decoder.decode(&frame),
        Err(CodecError::DecompressionBomb { limit: 16 })
    ));
}

// ── Generated schemas ─────────────────────────────────────────────────────────

const PRIMITIVES: &[&str] = &[
    "char", "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32", "uint64", "float", "double",
];

fn header_and_dimensions() -> Vec<Value> {
    vec![
        json!({ "kind": "composite", "name": "messageHeader", "elements": [
            { "kind": "type", "name": "blockLength", "primitiveType": "uint16" },
            { "kind": "type", "name": "templateId", "primitiveType": "uint16" },
            { "kind": "type", "name": "schemaId", "primitiveType": "uint16" },
            { "kind": "type", "name": "version", "primitiveType": "uint16" } ] }),
        json!({ "kind": "composite", "name": "groupSizeEncoding", "elements": [
            { "kind": "type", "name": "blockLength", "primitiveType": "uint16" },
            { "kind": "type", "name": "numInGroup", "primitiveType": "uint16" } ] }),
        json!({ "kind": "composite", "name": "varDataEncoding", "elements": [
            { "kind": "type", "name": "length", "primitiveType": "uint16" },
            { "kind": "type", "name": "varData", "primitiveType": "uint8", "length": 0 } ] }),
    ]
}

/// One field: primitive index, array length, optional.
type FieldSpec = (usize, u32, bool);

fn fields(specs: &[FieldSpec], types: &mut Vec<Value>, prefix: &str) -> Vec<Value> {
    specs
        .iter()
        .enumerate()
        .map(|(i, &(p, length, optional))| {
            let type_name = format!("{prefix}T{i}");
            types.push(json!({
                "kind": "type",
                "name": type_name,
                "primitiveType": PRIMITIVES[p],
                "length": length,
                "presence": if optional { "optional" } else { "required" },
            }));
            json!({ "name": format!("f{i}"), "id": i + 1, "type": type_name })
        })
        .collect()
}

fn schema_strategy() -> impl Strategy<Value = MessageSchema> {
    let field = (0..PRIMITIVES.len(), 1u32..4, any::<bool>());
    let message = (
        prop::collection::vec(field.clone(), 0..6),
        prop::collection::vec(field, 0..3),
        any::<bool>(),
        0usize..3,
    );
    (prop::collection::vec(message, 1..4), any::<bool>()).prop_map(|(messages, big_endian)| {
        let mut types = header_and_dimensions();
        let messages: Vec<Value> = messages
            .iter()
            .enumerate()
            .map(|(m, (root, group_fields, has_group, data))| {
                let root = fields(root, &mut types, &format!("M{m}"));
                let mut groups = Vec::new();
                if *has_group {
                    let group_fields = fields(group_fields, &mut types, &format!("M{m}G"));
                    groups.push(json!({ "name": "g", "id": 100, "fields": group_fields }));
                }
                let data: Vec<Value> = (0..*data)
                    .map(|d| json!({ "name": format!("d{d}"), "id": 200 + d }))
                    .collect();
                json!({ "name": format!("M{m}"), "id": m + 1, "fields": root, "groups": groups, "data": data })
            })
            .collect();
        serde_json::from_value(json!({
            "package": "generated",
            "id": 7,
            "byteOrder": if big_endian { "bigEndian" } else { "littleEndian" },
            "types": types,
            "messages": messages,
        }))
        .unwrap()
    })
}

proptest! {
    #[test]
    fn generated_schemas_round_trip(schema in schema_strategy(), compress in any::<bool>()) {
        let ir = IrGenerator::default().generate(&schema).unwrap();
        let mut encoder = IrEncoder::new();
        if compress {
            encoder.compress_body();
        }
        let frame = encoder.encode(&ir);
        let back = IrDecoder::new().decode(&frame).unwrap();
        prop_assert_eq!(back, ir);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = IrDecoder::new().decode(&bytes);
    }

    #[test]
    fn corrupted_car_frame_never_panics(index in 8usize..2000, value in any::<u8>()) {
        let mut frame = IrEncoder::new().encode(&car_ir());
        let index = index % frame.len();
        frame[index] = value;
        let _ = IrDecoder::new().decode(&frame);
    }
}
