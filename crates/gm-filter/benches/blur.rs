use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gm_core::GrayImage;
use gm_filter::blur;

fn ramp(width: usize, height: usize) -> GrayImage {
    let mut data = Vec::with_capacity(width * height);
    for i in 0..(width * height) {
        data.push((i % 251) as u8);
    }
    GrayImage::from_vec(width, height, 255, data).expect("valid image")
}

fn bench_blur(c: &mut Criterion) {
    let src = ramp(1280, 1024);

    for (dx, dy) in [(1usize, 1usize), (7, 7), (31, 31)] {
        c.bench_function(&format!("blur_{dx}x{dy}_1280x1024"), |b| {
            b.iter_batched(
                || src.clone(),
                |mut img| {
                    blur(black_box(&mut img), dx, dy).expect("blur");
                    black_box(img);
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
}

criterion_group!(benches, bench_blur);
criterion_main!(benches);
