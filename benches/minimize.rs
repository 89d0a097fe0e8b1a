use automata_transform::{prelude::*, random};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn minimization(c: &mut Criterion) {
    let markers = Markers::default();
    let mut rng = fastrand::Rng::with_seed(42);
    let mut group = c.benchmark_group("minimize");
    for size in [10, 100, 500] {
        let moore = random::generate_random_moore(&mut rng, size, 3, 2).trim();
        group.bench_with_input(BenchmarkId::new("moore", size), &moore, |b, moore| {
            b.iter(|| black_box(moore.minimize(&markers)))
        });
        let mealy = random::generate_random_mealy(&mut rng, size, 3, 2).trim();
        group.bench_with_input(BenchmarkId::new("mealy", size), &mealy, |b, mealy| {
            b.iter(|| black_box(mealy.minimize(&markers)))
        });
    }
    group.finish();
}

fn conversion(c: &mut Criterion) {
    let markers = Markers::default();
    let mut rng = fastrand::Rng::with_seed(7);
    let mealy = random::generate_random_mealy(&mut rng, 200, 3, 4).trim();
    c.bench_function("mealy to moore", |b| {
        b.iter(|| black_box(mealy.to_moore(&markers)))
    });
}

criterion_group!(benches, minimization, conversion);
criterion_main!(benches);
