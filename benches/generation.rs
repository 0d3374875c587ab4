// Generation benchmarks - series synthesis and aggregation cost per timeframe

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use webvitals::{
    p75, synthesize, AnalyticsGenerator, MetricKind, SeededRandomSource, Timeframe,
};

/// Benchmark full generation for every timeframe
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let generator = AnalyticsGenerator::seeded(42);

    for timeframe in Timeframe::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(timeframe),
            &timeframe,
            |b, &timeframe| {
                b.iter(|| black_box(generator.generate(MetricKind::Lcp, timeframe)));
            },
        );
    }

    group.finish();
}

/// Benchmark synthesis alone
fn bench_synthesize(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesize");
    let random = SeededRandomSource::new(7);
    let now = Utc::now();

    for timeframe in Timeframe::ALL {
        let shape = timeframe.shape();
        group.bench_with_input(
            BenchmarkId::from_parameter(timeframe),
            &shape,
            |b, &shape| {
                b.iter(|| black_box(synthesize(shape, 1800.0, 400.0, now, &random)));
            },
        );
    }

    group.finish();
}

/// Benchmark the percentile over series of growing size
fn bench_p75(c: &mut Criterion) {
    let mut group = c.benchmark_group("p75");
    let generator = AnalyticsGenerator::new(Arc::new(SeededRandomSource::new(9)));

    for timeframe in Timeframe::ALL {
        let result = generator.generate(MetricKind::Cls, timeframe);
        group.bench_with_input(
            BenchmarkId::from_parameter(result.points().len()),
            result.points(),
            |b, points| {
                b.iter(|| black_box(p75(points, 0.1, 3)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_generate, bench_synthesize, bench_p75);
criterion_main!(benches);
