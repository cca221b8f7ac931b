use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_barcode::utils::grayscale::{BitmapFormat, to_luminance};

fn bench_rgb24_small(c: &mut Criterion) {
    let image = vec![128u8; 100 * 100 * 3];
    c.bench_function("rgb24_to_luminance_100x100", |b| {
        b.iter(|| to_luminance(black_box(&image), 100, 100, BitmapFormat::Rgb24))
    });
}

fn bench_rgb24_large(c: &mut Criterion) {
    let image = vec![128u8; 1920 * 1080 * 3];
    c.bench_function("rgb24_to_luminance_1920x1080", |b| {
        b.iter(|| to_luminance(black_box(&image), 1920, 1080, BitmapFormat::Rgb24))
    });
}

fn bench_bgra32_medium(c: &mut Criterion) {
    let image = vec![128u8; 640 * 480 * 4];
    c.bench_function("bgra32_to_luminance_640x480", |b| {
        b.iter(|| to_luminance(black_box(&image), 640, 480, BitmapFormat::Bgra32))
    });
}

fn bench_yuyv_medium(c: &mut Criterion) {
    let image = vec![128u8; 640 * 480 * 2];
    c.bench_function("yuyv_to_luminance_640x480", |b| {
        b.iter(|| to_luminance(black_box(&image), 640, 480, BitmapFormat::Yuyv))
    });
}

criterion_group!(
    benches,
    bench_rgb24_small,
    bench_rgb24_large,
    bench_bgra32_medium,
    bench_yuyv_medium
);
criterion_main!(benches);
