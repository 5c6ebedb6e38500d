use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gm_core::GrayImage;
use gm_search::locate;

fn bench_locate_worst_case(c: &mut Criterion) {
    let width = 320usize;
    let height = 240usize;
    let mut data = Vec::with_capacity(width * height);
    for i in 0..(width * height) {
        data.push((i % 251) as u8);
    }
    let hay = GrayImage::from_vec(width, height, 255, data).expect("valid image");
    // Uniform needle never matches the ramp, so every offset is tried.
    let needle = GrayImage::new(16, 16, 255).expect("valid image");

    c.bench_function("locate_miss_16x16_in_320x240", |b| {
        b.iter(|| {
            let found = locate(black_box(&hay), black_box(&needle));
            black_box(found);
        });
    });
}

criterion_group!(benches, bench_locate_worst_case);
criterion_main!(benches);
