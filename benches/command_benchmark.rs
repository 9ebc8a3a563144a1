use criterion::{black_box, criterion_group, criterion_main, Criterion};
use magick_convert::processing::geometry::ratio_crop_dimensions;
use magick_convert::ConversionRequest;

fn benchmark_ratio_crop(c: &mut Criterion) {
    c.bench_function("ratio_crop_dimensions", |b| {
        b.iter(|| ratio_crop_dimensions(black_box((4000, 3000)), black_box(16.0 / 9.0)))
    });
}

fn benchmark_compose(c: &mut Criterion) {
    let dir = tempfile::TempDir::new().unwrap();
    let src = dir.path().join("photo.png");
    image::RgbImage::new(64, 48).save(&src).unwrap();
    let dest = dir.path().join("out.jpg");

    let request = ConversionRequest::with_source("convert", &src)
        .crop_by_coordinates(32, 24, 4, 4)
        .width(16)
        .height(12)
        .quality(80);

    c.bench_function("compose_command", |b| {
        b.iter(|| request.command(black_box(&dest)).unwrap())
    });
}

criterion_group!(benches, benchmark_ratio_crop, benchmark_compose);
criterion_main!(benches);
