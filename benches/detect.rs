use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use snapcode::{assess_quality, region, ScanOptions, Scanner};

fn noise_image(width: u32, height: u32) -> DynamicImage {
    let mut state = 42u32;
    let mut canvas = RgbImage::new(width, height);
    for pixel in canvas.pixels_mut() {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        let v = (state >> 24) as u8;
        *pixel = Rgb([v, v, v]);
    }
    DynamicImage::ImageRgb8(canvas)
}

// Worst case for the orchestrator: every attempt runs and none decodes.
fn bench_scan_noise_full_plan(c: &mut Criterion) {
    let image = noise_image(320, 240);
    let options = ScanOptions::default().with_region_hints(false);
    let scanner = Scanner::with_options(options);
    let mut group = c.benchmark_group("scan");
    group.sample_size(10);
    group.bench_function("scan_noise_320x240_full_plan", |b| {
        b.iter(|| scanner.scan_image(black_box(&image)))
    });
    group.finish();
}

fn bench_scan_flat_frame(c: &mut Criterion) {
    let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(320, 240, Luma([128])));
    let options = ScanOptions::default().with_region_hints(false);
    let scanner = Scanner::with_options(options);
    let mut group = c.benchmark_group("scan");
    group.sample_size(10);
    group.bench_function("scan_flat_320x240_full_plan", |b| {
        b.iter(|| scanner.scan_image(black_box(&image)))
    });
    group.finish();
}

fn bench_assess_quality_medium(c: &mut Criterion) {
    let image = noise_image(640, 480);
    c.bench_function("assess_quality_640x480", |b| {
        b.iter(|| assess_quality(black_box(&image)))
    });
}

fn bench_stripe_hints_medium(c: &mut Criterion) {
    let gray = GrayImage::from_fn(320, 240, |x, _| {
        Luma([if x % 5 < 2 { 0 } else { 255 }])
    });
    c.bench_function("stripe_hints_320x240", |b| {
        b.iter(|| region::stripe_hints(black_box(&gray)))
    });
}

fn bench_contour_hints_medium(c: &mut Criterion) {
    let mut gray = GrayImage::from_pixel(320, 240, Luma([255]));
    for y in 100..140 {
        for x in 60..260 {
            gray.put_pixel(x, y, Luma([0]));
        }
    }
    c.bench_function("contour_hints_320x240", |b| {
        b.iter(|| region::contour_hints(black_box(&gray)))
    });
}

criterion_group!(
    benches,
    bench_scan_noise_full_plan,
    bench_scan_flat_frame,
    bench_assess_quality_medium,
    bench_stripe_hints_medium,
    bench_contour_hints_medium
);
criterion_main!(benches);
