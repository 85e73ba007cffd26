use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use sbe_otf::{JsonConfig, JsonPrinter, MessageDecoder, TokenListener, decode_message};
use sbe_tests::{CAR_TEMPLATE_ID, car_ir, car_message};

/// Accepts every callback; measures the walk alone.
struct Nothing;

impl TokenListener for Nothing {}

fn bench_walk(c: &mut Criterion) {
    let ir = car_ir();
    let buffer = car_message(1);
    let decoder = MessageDecoder::new(ir.message(CAR_TEMPLATE_ID).unwrap()).unwrap();

    let mut group = c.benchmark_group("otf_car");
    group.throughput(Throughput::Bytes(buffer.len() as u64));
    group.bench_function("cached_decoder", |b| {
        b.iter(|| decoder.decode(&buffer, 8, 1, 44, &mut Nothing).unwrap());
    });
    group.bench_function("framed", |b| {
        b.iter(|| decode_message(&ir, &buffer, 0, &mut Nothing).unwrap());
    });
    group.finish();
}

fn bench_json(c: &mut Criterion) {
    let ir = car_ir();
    let buffer = car_message(1);
    c.bench_function("otf_car_json", |b| {
        b.iter(|| {
            let mut printer = JsonPrinter::new(JsonConfig::default());
            decode_message(&ir, &buffer, 0, &mut printer).unwrap();
            printer.render().unwrap()
        });
    });
}

criterion_group!(benches, bench_walk, bench_json);
criterion_main!(benches);
