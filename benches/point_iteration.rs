//! Criterion benchmarks for point generation hot paths.
//!
//! These benchmarks establish baselines for the per-point cost of the
//! generators, which bounds how fast a scan can be planned and streamed to
//! acquisition hardware.
//!
//! Key metrics:
//! - Dense drain throughput (points/sec) for grid scans of various sizes
//! - Gating overhead when a region filter is attached
//! - Compound odometer overhead per emitted position
//!
//! Run with: cargo bench --bench point_iteration

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scangen::models::{BoundingBox, CompoundModel, GridModel, ScanPathModel, SpiralModel, StepModel};
use scangen::region::Roi;
use scangen::registry::RegistryBuilder;

/// Benchmark draining dense grid scans of increasing size.
///
/// This is the core production path: every position of the scan is computed,
/// named and indexed exactly once.
fn grid_drain_throughput(c: &mut Criterion) {
    let registry = RegistryBuilder::with_builtins().build();
    let mut group = c.benchmark_group("grid_drain");

    for side in [32u64, 64, 128] {
        let model = ScanPathModel::Grid(GridModel::new(
            "x",
            "y",
            side,
            side,
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
        ));
        group.throughput(Throughput::Elements(side * side));
        group.bench_with_input(BenchmarkId::new("dense", side), &model, |b, model| {
            b.iter(|| {
                let generator = registry.create_generator(black_box(model)).unwrap();
                let mut last = None;
                for position in generator {
                    last = Some(position.step_index());
                }
                black_box(last)
            });
        });
    }

    group.finish();
}

/// Benchmark the cost of region gating on top of the dense grid.
///
/// The inscribed circle keeps roughly pi/4 of the points, so the filter is
/// exercised on every point and rejects a realistic share.
fn gated_grid_drain(c: &mut Criterion) {
    let registry = RegistryBuilder::with_builtins().build();
    let model = ScanPathModel::Grid(GridModel::new(
        "x",
        "y",
        64,
        64,
        BoundingBox::new(-1.0, -1.0, 2.0, 2.0),
    ));
    let roi = Roi::elliptical(0.0, 0.0, 1.0, 1.0);

    c.bench_function("gated_grid_drain", |b| {
        b.iter(|| {
            let generator = registry
                .create_generator_with_regions(black_box(&model), vec![roi.clone()])
                .unwrap();
            black_box(generator.count())
        });
    });
}

/// Benchmark a three-level compound scan.
///
/// Measures the odometer overhead of composing positions across levels
/// relative to the flat grid drains above.
fn compound_drain(c: &mut Criterion) {
    let registry = RegistryBuilder::with_builtins().build();
    let compound = CompoundModel::new(vec![
        ScanPathModel::Step(StepModel::new("z", 0.0, 9.0, 1.0)),
        ScanPathModel::Step(StepModel::new("y", 0.0, 31.0, 1.0)),
        ScanPathModel::Step(StepModel::new("x", 0.0, 31.0, 1.0)),
    ]);

    let mut group = c.benchmark_group("compound_drain");
    group.throughput(Throughput::Elements(10 * 32 * 32));
    group.bench_function("three_level", |b| {
        b.iter(|| {
            let generator = registry.create_compound(black_box(&compound)).unwrap();
            black_box(generator.count())
        });
    });
    group.finish();
}

/// Benchmark spiral point arithmetic, the most trig-heavy kernel.
fn spiral_drain(c: &mut Criterion) {
    let registry = RegistryBuilder::with_builtins().build();
    let model = ScanPathModel::Spiral(SpiralModel::new(
        "x",
        "y",
        0.05,
        BoundingBox::new(-2.0, -2.0, 4.0, 4.0),
    ));

    c.bench_function("spiral_drain", |b| {
        b.iter(|| {
            let generator = registry.create_generator(black_box(&model)).unwrap();
            black_box(generator.count())
        });
    });
}

/// Benchmark model decoding from the JSON wire format.
fn model_decode(c: &mut Criterion) {
    let model = ScanPathModel::Grid(GridModel::new(
        "x",
        "y",
        64,
        64,
        BoundingBox::new(0.0, 0.0, 1.0, 1.0),
    ));
    let wire = serde_json::to_string(&model).unwrap();

    c.bench_function("model_decode", |b| {
        b.iter(|| {
            let decoded: ScanPathModel = serde_json::from_str(black_box(&wire)).unwrap();
            black_box(decoded)
        });
    });
}

criterion_group!(
    benches,
    grid_drain_throughput,
    gated_grid_drain,
    compound_drain,
    spiral_drain,
    model_decode
);
criterion_main!(benches);
