use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use delve::{GenerationConfig, Generator, GridSegmenter, LevelGenerator, RandomSource};

fn bench_segmenter(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmenter");
    for size in [20, 30, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let config = GenerationConfig::grid_size(size);
            b.iter(|| {
                let mut rng = RandomSource::from_seed(1234);
                GridSegmenter::segment(&config, &mut rng).unwrap()
            });
        });
    }
    group.finish();
}

fn bench_full_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("level");
    for size in [20, 30] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let config = GenerationConfig::grid_size(size);
            let generator = LevelGenerator::new();
            b.iter(|| {
                let mut rng = RandomSource::from_seed(1234);
                generator.generate(&config, &mut rng)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_segmenter, bench_full_level);
criterion_main!(benches);
