//! Criterion benchmarks for Pixelgrid critical paths
//!
//! Benchmarks the operations that run on every user action:
//! - Downsample: source image to grid, both samplers
//! - Filters: whole-grid color transforms
//! - History: snapshot push and undo
//! - Export: composite and encode
//! - Color: CSS color parsing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};
use pixelgrid::color::parse_color;
use pixelgrid::downsample::{downsample, Sampling, SourceImage};
use pixelgrid::export::{export_grid, ExportFormat, ExportOptions};
use pixelgrid::filters::{apply_filter, Filter};
use pixelgrid::history::History;
use pixelgrid::Grid;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Generate a photo-like source with a gradient and a transparent band
fn make_source(width: u32, height: u32) -> SourceImage {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if y % 64 < 8 { 0 } else { 255 };
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, alpha])
    });
    SourceImage::from_image(img).expect("non-empty source")
}

fn make_grid(size: u32) -> Grid {
    downsample(&make_source(size * 4, size * 4), size, Sampling::Nearest).expect("valid grid")
}

// =============================================================================
// Downsample Benchmarks
// =============================================================================

fn bench_downsample(c: &mut Criterion) {
    let mut group = c.benchmark_group("downsample");
    let source = make_source(1920, 1080);

    for target in [32u32, 128, 512].iter() {
        group.throughput(Throughput::Elements(*target as u64 * *target as u64));
        group.bench_with_input(BenchmarkId::new("area", target), target, |b, &t| {
            b.iter(|| downsample(black_box(&source), t, Sampling::Area))
        });
        group.bench_with_input(BenchmarkId::new("nearest", target), target, |b, &t| {
            b.iter(|| downsample(black_box(&source), t, Sampling::Nearest))
        });
    }

    group.finish();
}

// =============================================================================
// Filter Benchmarks
// =============================================================================

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");
    let grid = make_grid(256);

    let filters = [
        Filter::Grayscale,
        Filter::Sepia,
        Filter::Invert,
        Filter::tint(),
        Filter::Tint { color: Rgba([255, 0, 0, 255]), strength: 1.0 },
        Filter::saturate(),
    ];
    for (i, filter) in filters.iter().enumerate() {
        group.bench_function(format!("{}_{}", filter.name(), i), |b| {
            b.iter_batched(
                || (grid.clone(), History::new()),
                |(mut g, mut h)| apply_filter(&mut g, &mut h, black_box(filter)),
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

// =============================================================================
// History Benchmarks
// =============================================================================

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");
    let grid = make_grid(128);

    group.bench_function("push_undo_redo_128", |b| {
        b.iter(|| {
            let mut history = History::new();
            history.push_undo(grid.snapshot());
            let previous = history.undo(grid.snapshot());
            black_box(history.redo(grid.snapshot()));
            previous
        })
    });

    group.bench_function("push_bounded_100", |b| {
        let mut history = History::with_limit(100);
        b.iter(|| history.push_undo(black_box(grid.snapshot())))
    });

    group.finish();
}

// =============================================================================
// Export Benchmarks
// =============================================================================

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    let mut grid = make_grid(128);
    grid.set_background(Some(Rgba([255, 255, 255, 255])));

    for format in [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Bmp] {
        let options = ExportOptions { format, ..ExportOptions::default() };
        group.bench_function(format.label(), |b| {
            b.iter(|| export_grid(black_box(&grid), &options, "bench"))
        });
    }

    let scaled = ExportOptions { scale: 8, ..ExportOptions::default() };
    group.bench_function("png_scale_8", |b| {
        b.iter(|| export_grid(black_box(&grid), &scaled, "bench"))
    });

    group.finish();
}

// =============================================================================
// Color Benchmarks
// =============================================================================

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");

    group.bench_function("parse_hex_6", |b| b.iter(|| parse_color(black_box("#FF0000"))));
    group.bench_function("parse_named", |b| b.iter(|| parse_color(black_box("steelblue"))));
    group.bench_function("parse_hsl", |b| {
        b.iter(|| parse_color(black_box("hsl(0, 100%, 50%)")))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_downsample,
    bench_filters,
    bench_history,
    bench_export,
    bench_color
);
criterion_main!(benches);
