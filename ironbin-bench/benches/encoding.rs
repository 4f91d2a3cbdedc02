//! Buffer primitive benchmarks.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ironbin_core::buffer::{ByteCursorBuffer, ReadBuffer, WriteBuffer};
use std::hint::black_box;

fn benchmark_primitive_writes(c: &mut Criterion) {
    let mut buffer = ByteCursorBuffer::new(64);

    c.bench_function("write_i32_be", |b| {
        b.iter(|| {
            buffer.reset_write_cursor();
            buffer.write_i32(black_box(0x1234_5678)).unwrap();
        })
    });

    c.bench_function("write_i16_be", |b| {
        b.iter(|| {
            buffer.reset_write_cursor();
            buffer.write_i16(black_box(-1234)).unwrap();
        })
    });

    c.bench_function("put_i32_be", |b| {
        b.iter(|| buffer.put_i32_be(black_box(8), black_box(42)).unwrap())
    });
}

fn benchmark_primitive_reads(c: &mut Criterion) {
    let mut buffer = ByteCursorBuffer::new(64);
    buffer.write_i32(0x1234_5678).unwrap();
    buffer.write_i16(-1234).unwrap();

    c.bench_function("read_i32_be", |b| {
        b.iter(|| {
            buffer.reset_read_cursor();
            black_box(buffer.read_i32().unwrap())
        })
    });

    c.bench_function("get_i16_be", |b| {
        b.iter(|| black_box(buffer.get_i16_be(black_box(4)).unwrap()))
    });
}

fn benchmark_utf8(c: &mut Criterion) {
    let mut group = c.benchmark_group("utf8");

    for text in ["A", "ORDER-00000000000001", "Zoë 日本語 テキスト"] {
        let mut buffer = ByteCursorBuffer::new(128);
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_function(format!("write/{}", text.len()), |b| {
            b.iter(|| {
                buffer.reset_write_cursor();
                buffer.write_utf8(black_box(text)).unwrap();
            })
        });

        group.bench_function(format!("read/{}", text.len()), |b| {
            b.iter(|| {
                buffer.reset_read_cursor();
                black_box(buffer.read_utf8().unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_primitive_writes,
    benchmark_primitive_reads,
    benchmark_utf8,
);
criterion_main!(benches);
