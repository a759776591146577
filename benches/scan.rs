#[macro_use]
extern crate criterion;

use criterion::Criterion;
use seammask::canvas::Layer;
use seammask::mask::{scan, Direction, DiscardMask};
use seammask::pixelbuffer::PixelBuffer;
use seammask::progress::NoProgress;
use seammask::seammap::{composite, Colour, VisibilityMap};

fn striped_mask(size: u32) -> Layer {
    let data = (0..size * size * 4)
        .map(|i| if (i / 4) % 7 < 3 { 255 } else { 0 })
        .collect();
    Layer::from_buffer("mask", PixelBuffer::from_raw(size, size, 4, data).unwrap())
}

fn scan_benchmark(c: &mut Criterion) {
    let layer = striped_mask(512);
    c.bench_function("scan 512 rows", move |b| {
        let mask = DiscardMask::new(&layer, (0, 0), 512, 512);
        b.iter(|| scan(&mask, Direction::Horizontal, &mut NoProgress).unwrap())
    });

    let layer = striped_mask(512);
    c.bench_function("scan 512 columns", move |b| {
        let mask = DiscardMask::new(&layer, (0, 0), 512, 512);
        b.iter(|| scan(&mask, Direction::Vertical, &mut NoProgress).unwrap())
    });
}

fn composite_benchmark(c: &mut Criterion) {
    let steps = (0..512 * 512).map(|i| i % 64).collect();
    let vmap = VisibilityMap::new(512, 512, 63, steps).unwrap();
    c.bench_function("composite 512x512", move |b| {
        let (start, end) = (Colour::from_rgb8(255, 0, 0), Colour::from_rgb8(0, 0, 255));
        b.iter(|| composite(&vmap, &start, &end, &mut NoProgress).unwrap())
    });
}

criterion_group!(benches, scan_benchmark, composite_benchmark);
criterion_main!(benches);
