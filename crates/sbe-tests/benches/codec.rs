use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use sbe_ir::{IrDecoder, IrEncoder};
use sbe_irgen::IrGenerator;
use sbe_tests::{car_ir, car_schema};

fn bench_generate(c: &mut Criterion) {
    let schema = car_schema();
    let generator = IrGenerator::default();
    c.bench_function("generate_car", |b| {
        b.iter(|| generator.generate(&schema).unwrap());
    });
}

fn bench_encode(c: &mut Criterion) {
    let ir = car_ir();
    let mut group = c.benchmark_group("ir_encode");
    group.bench_function("plain", |b| {
        b.iter(|| IrEncoder::new().encode(&ir));
    });
    group.bench_function("compressed", |b| {
        b.iter(|| IrEncoder::new().compress_body().encode(&ir));
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let ir = car_ir();
    let plain = IrEncoder::new().encode(&ir);
    let compressed = IrEncoder::new().compress_body().encode(&ir);

    let mut group = c.benchmark_group("ir_decode");
    group.throughput(Throughput::Bytes(plain.len() as u64));
    group.bench_function("plain", |b| {
        b.iter(|| IrDecoder::new().decode(&plain).unwrap());
    });
    group.bench_function("compressed", |b| {
        b.iter(|| IrDecoder::new().decode(&compressed).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_generate, bench_encode, bench_decode);
criterion_main!(benches);
