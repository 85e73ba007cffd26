//! Shared fixtures for the integration tests and benches.
//!
//! `fixtures/car.json` is the schema; [`car_message`] writes one framed
//! `Car` by hand, byte for byte, so the decoder is checked against an
//! encoding that does not come from the code under test.
//!
//! ```text
//! Car (block 44 at version 1, 43 at version 0)
//! ├── serialNumber .. engine           fixed fields
//! ├── cupHolderCount                   since version 1
//! ├── fuelFigures[]                    speed, mpg, usageDescription
//! ├── performanceFigures[]             octaneRating, acceleration[]
//! └── manufacturer, model, activationCode
//! ```

#![warn(clippy::pedantic)]

use sbe_ir::Ir;
use sbe_irgen::{IrGenerator, MessageSchema};

/// The Car schema as JSON text.
pub const CAR_SCHEMA: &str = include_str!("../fixtures/car.json");

pub const CAR_TEMPLATE_ID: i32 = 1;
pub const PING_TEMPLATE_ID: i32 = 2;

/// # Panics
///
/// If the fixture does not parse.
pub fn car_schema() -> MessageSchema {
    serde_json::from_str(CAR_SCHEMA).expect("car.json parses")
}

/// # Panics
///
/// If the fixture does not generate.
pub fn car_ir() -> Ir {
    IrGenerator::default().generate(&car_schema()).expect("car.json generates")
}

/// Little-endian byte sink used to hand-encode messages.
#[derive(Debug, Default)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.0.push(v);
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn raw(&mut self, v: &[u8]) -> &mut Self {
        self.0.extend_from_slice(v);
        self
    }

    /// A `varStringEncoding`: u32 length then the bytes.
    ///
    /// # Panics
    ///
    /// If `v` is longer than `u32::MAX`.
    pub fn var(&mut self, v: &[u8]) -> &mut Self {
        self.u32(u32::try_from(v.len()).expect("short var data")).raw(v)
    }

    /// Message header: block length, template id, schema id, version.
    pub fn header(&mut self, block_length: u16, template_id: u16, version: u16) -> &mut Self {
        self.u16(block_length).u16(template_id).u16(1).u16(version)
    }
}

/// One framed Car as a writer at `version` (0 or 1) would encode it.
///
/// At version 0 the root block is one byte shorter and `cupHolderCount`
/// is absent.
pub fn car_message(version: u16) -> Vec<u8> {
    let mut b = Bytes::default();
    b.header(if version == 0 { 43 } else { 44 }, 1, version);

    b.u64(1234)
        .u16(2013)
        .u8(1) // available = T
        .u8(b'A')
        .u32(1)
        .u32(2)
        .u32(3)
        .u32(4)
        .raw(b"abcdef")
        .u8(0b101) // sunRoof | cruiseControl
        // engine
        .u16(2000)
        .u8(4)
        .raw(b"123")
        .u8(b'N')
        .u8(200);
    if version > 0 {
        b.u8(2);
    }

    b.u16(6).u16(2);
    b.u16(30).f32(35.5).var(b"Urban Cycle");
    b.u16(55).f32(49.0).var(b"Highway Cycle");

    b.u16(1).u16(1);
    b.u8(95);
    b.u16(6).u16(2);
    b.u16(30).f32(4.0);
    b.u16(60).f32(7.5);

    b.var(b"Honda").var(b"Civic VTi").var(&[0xFF, 0xFE]);
    b.0
}

/// A framed Ping with `sentAt` left at its null sentinel.
pub fn ping_message(sequence: u32) -> Vec<u8> {
    let mut b = Bytes::default();
    b.header(12, 2, 1).u32(sequence).raw(&i64::MIN.to_le_bytes());
    b.0
}
