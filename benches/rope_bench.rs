// Synthetic insert/delete workloads at a handful of rope sizes. Unlike a from-scratch
// random-position microbenchmark, insertions here are weighted towards nearby positions
// (typing-like locality) since that is the access pattern the skip list's caching of recent
// cursors is meant to help with; pure uniform-random access is included too, for contrast.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use skiprope::Rope;

const SIZES: &[usize] = &[100, 10_000, 1_000_000];

fn build_rope(rng: &mut SmallRng, chars: usize) -> Rope {
    let mut rope = Rope::new();
    while rope.char_len() < chars {
        let pos = rng.gen_range(0..=rope.char_len());
        rope.insert(pos, "the quick brown fox ");
    }
    rope
}

fn random_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_insert");
    for &size in SIZES {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = SmallRng::seed_from_u64(size as u64);
            let base = build_rope(&mut rng, size);
            b.iter(|| {
                let mut rope = base.clone();
                let pos = rng.gen_range(0..=rope.char_len());
                rope.insert(pos, black_box("x"));
                black_box(rope.char_len());
            });
        });
    }
    group.finish();
}

fn local_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_insert");
    for &size in SIZES {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = SmallRng::seed_from_u64(size as u64);
            let mut rope = build_rope(&mut rng, size);
            let mut pos = rope.char_len() / 2;
            b.iter(|| {
                rope.insert(pos, black_box("x"));
                pos += 1;
            });
        });
    }
    group.finish();
}

fn random_deletes(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_delete");
    for &size in SIZES {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = SmallRng::seed_from_u64(size as u64);
            let base = build_rope(&mut rng, size);
            b.iter(|| {
                let mut rope = base.clone();
                let pos = rng.gen_range(0..rope.char_len());
                rope.delete(pos, 1);
                black_box(rope.char_len());
            });
        });
    }
    group.finish();
}

fn to_string_cost(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_string");
    for &size in SIZES {
        let mut rng = SmallRng::seed_from_u64(size as u64);
        let rope = build_rope(&mut rng, size);
        group.throughput(Throughput::Bytes(rope.len_bytes() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &rope, |b, rope| {
            b.iter(|| black_box(rope.to_string()));
        });
    }
    group.finish();
}

criterion_group!(benches, random_inserts, local_inserts, random_deletes, to_string_cost);
criterion_main!(benches);
