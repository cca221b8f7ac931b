use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_barcode::binarizer::{Binarizer, GlobalHistogramBinarizer, HybridBinarizer};
use rust_barcode::luminance::{GrayLuminanceSource, LuminanceSource};
use rust_barcode::models::BitArray;

/// Checkerboard of 8px cells under a left-to-right lighting ramp
fn shaded_checkerboard(width: usize, height: usize) -> Arc<dyn LuminanceSource> {
    let data = (0..width * height)
        .map(|i| {
            let (x, y) = (i % width, i / width);
            let base = if (x / 8 + y / 8) % 2 == 0 { 40 } else { 220 };
            (base * (50 + x * 50 / width) / 100) as u8
        })
        .collect();
    Arc::new(GrayLuminanceSource::new(data, width, height).unwrap())
}

fn bench_global_matrix_medium(c: &mut Criterion) {
    let source = shaded_checkerboard(640, 480);
    c.bench_function("global_histogram_matrix_640x480", |b| {
        b.iter(|| GlobalHistogramBinarizer::new(black_box(Arc::clone(&source))).black_matrix())
    });
}

fn bench_global_row_medium(c: &mut Criterion) {
    let source = shaded_checkerboard(640, 480);
    let binarizer = GlobalHistogramBinarizer::new(source);
    c.bench_function("global_histogram_row_640", |b| {
        b.iter(|| binarizer.black_row(black_box(240), BitArray::new(640)))
    });
}

fn bench_hybrid_matrix_medium(c: &mut Criterion) {
    let source = shaded_checkerboard(640, 480);
    c.bench_function("hybrid_matrix_640x480", |b| {
        b.iter(|| HybridBinarizer::new(black_box(Arc::clone(&source))).black_matrix())
    });
}

fn bench_hybrid_matrix_large(c: &mut Criterion) {
    let source = shaded_checkerboard(1920, 1080);
    c.bench_function("hybrid_matrix_1920x1080", |b| {
        b.iter(|| HybridBinarizer::new(black_box(Arc::clone(&source))).black_matrix())
    });
}

criterion_group!(
    benches,
    bench_global_matrix_medium,
    bench_global_row_medium,
    bench_hybrid_matrix_medium,
    bench_hybrid_matrix_large
);
criterion_main!(benches);
