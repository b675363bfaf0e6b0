// In benches/factorize_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tabula::algorithms::factorize_array;
use tabula::{ArrayValues, IndexOpsMixin, Operand, Series};

/// Repeating integers with a small number of distinct values.
fn generate_low_cardinality(size: usize) -> Vec<i64> {
    (0..size).map(|i| (i % 97) as i64).collect()
}

/// Strings drawn from a fixed vocabulary.
fn generate_labels(size: usize) -> Vec<String> {
    (0..size).map(|i| format!("label-{}", i % 251)).collect()
}

const BENCH_DATA_SIZE: usize = 65536;

fn bench_factorize(c: &mut Criterion) {
    let ints = ArrayValues::from_i64(generate_low_cardinality(BENCH_DATA_SIZE));
    let labels = ArrayValues::from_strs(&generate_labels(BENCH_DATA_SIZE));
    let range = ArrayValues::range(0, BENCH_DATA_SIZE as i64, 1).unwrap();

    let mut group = c.benchmark_group("Factorize");
    group.throughput(criterion::Throughput::Elements(BENCH_DATA_SIZE as u64));

    group.bench_function("int64 (unsorted)", |b| {
        b.iter(|| black_box(factorize_array(black_box(&ints), false, true)))
    });
    group.bench_function("int64 (sorted)", |b| {
        b.iter(|| black_box(factorize_array(black_box(&ints), true, true)))
    });
    group.bench_function("object strings", |b| {
        b.iter(|| black_box(factorize_array(black_box(&labels), false, true)))
    });
    group.bench_function("range fast path", |b| {
        b.iter(|| black_box(factorize_array(black_box(&range), true, true)))
    });

    group.finish();
}

fn bench_arith_dispatch(c: &mut Criterion) {
    let left = Series::from_i64(generate_low_cardinality(BENCH_DATA_SIZE)).with_name("x");
    let right = Series::from_f64(vec![1.5; BENCH_DATA_SIZE]).with_name("x");
    let right_operand = right.to_operand();
    let scalar = Operand::from(3);

    let mut group = c.benchmark_group("Arithmetic Dispatch");
    group.throughput(criterion::Throughput::Elements(BENCH_DATA_SIZE as u64));

    group.bench_function("series + scalar", |b| {
        b.iter(|| black_box(left.arith_method(black_box(&scalar), tabula::ArithOp::Add)))
    });
    group.bench_function("series / series", |b| {
        b.iter(|| black_box(left.arith_method(black_box(&right_operand), tabula::ArithOp::TrueDiv)))
    });

    group.finish();
}

criterion_group!(benches, bench_factorize, bench_arith_dispatch);
criterion_main!(benches);
