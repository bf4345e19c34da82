use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use rsquant::{cluster, Method};

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width) as u8,
            (y * 255 / height) as u8,
            ((x ^ y) & 0xff) as u8,
        ])
    })
}

fn criterion_benchmark(c: &mut Criterion) {
    let img = gradient(256, 256);

    c.bench_function("median_cut 256x256 k=256", |b| {
        b.iter(|| cluster(black_box(&img), 256, Method::MedianCut).map(|c| c.palette()))
    });
    c.bench_function("mean_cut 256x256 k=256", |b| {
        b.iter(|| cluster(black_box(&img), 256, Method::MeanCut).map(|c| c.palette()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
