//! Criterion benchmarks for the per-frame telemetry path.
//!
//! Every inbound position frame is decoded and then mapped into
//! visualization space before a redraw, so both run once per telemetry
//! update.
//!
//! Run with:
//! ```bash
//! cargo bench --package tank-core --bench mapper_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tank_core::{decode_inbound, Bounds, CoordinateMapper, Position};

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// Positions sweeping the rig envelope in a coarse raster.
fn raster(n: usize) -> Vec<Position> {
    let b = Bounds::RIG;
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            Position::new(
                b.x.min + t * b.x.span(),
                b.y.min + (1.0 - t) * b.y.span(),
                b.z.min + (t * 7.0).fract() * b.z.span(),
            )
        })
        .collect()
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_to_normalized(c: &mut Criterion) {
    let mapper = CoordinateMapper::new(Bounds::RIG);
    let p = Position::new(12.5, -20.0, 160.0);

    c.bench_function("to_normalized", |b| {
        b.iter(|| mapper.to_normalized(black_box(p)))
    });
}

fn bench_round_trip_raster(c: &mut Criterion) {
    let mapper = CoordinateMapper::new(Bounds::RIG);
    let mut group = c.benchmark_group("round_trip_raster");

    for n in [100usize, 10_000] {
        let points = raster(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &points, |b, pts| {
            b.iter(|| {
                for p in pts {
                    black_box(mapper.to_device(mapper.to_normalized(*p)));
                }
            })
        });
    }
    group.finish();
}

fn bench_decode_position_frame(c: &mut Criterion) {
    let frame = r#"{"type":"position","position":{"x":-12.3,"y":-40.1,"z":171.9}}"#;

    c.bench_function("decode_position_frame", |b| {
        b.iter(|| decode_inbound(black_box(frame)))
    });
}

criterion_group!(
    benches,
    bench_to_normalized,
    bench_round_trip_raster,
    bench_decode_position_frame
);
criterion_main!(benches);
