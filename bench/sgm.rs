use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sgm_disparity::prelude::*;

const WIDTH: usize = 320;
const HEIGHT: usize = 96;

fn synthetic_frame() -> StereoFrame {
    // Deterministic texture, the right view is the left shifted by 5 columns
    let left: Vec<u8> = (0..WIDTH * HEIGHT)
        .map(|i| {
            let hash = (i as u32).wrapping_mul(2654435761) >> 24;
            ((i % WIDTH) as u32 * 7 + (i / WIDTH) as u32 * 13 + hash) as u8
        })
        .collect();
    let right: Vec<u8> = left
        .chunks(WIDTH)
        .flat_map(|row| (0..WIDTH).map(move |x| row[(x + 5).min(WIDTH - 1)]))
        .collect();

    StereoFrame::from_raw(WIDTH as u32, HEIGHT as u32, left, right).unwrap()
}

fn sgm_bench(c: &mut Criterion) {
    let frame = synthetic_frame();

    for (name, metric, directions) in [
        ("sad forward", CostMetric::Sad, DirectionSet::FORWARD),
        ("sad all", CostMetric::Sad, DirectionSet::ALL),
        ("census forward", CostMetric::Census, DirectionSet::FORWARD),
        ("census all", CostMetric::Census, DirectionSet::ALL)
    ].iter() {
        // Build disparity alg
        let mut disp = SgmEngine::new(Params {
            width: WIDTH,
            height: HEIGHT,
            max_disparity: 64,
            metric: *metric,
            directions: *directions,
            ..Params::default()
        }).unwrap();

        c.bench_function(name, |b| b.iter(|| disp.compute(black_box(&frame))));
    }
}

criterion_group!(benches, sgm_bench);
criterion_main!(benches);
