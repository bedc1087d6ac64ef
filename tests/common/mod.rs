//! Synthetic stereo pairs shared by the integration tests.

#![allow(dead_code)]

use rand::{rngs::StdRng, Rng, SeedableRng};
use sgm_disparity::prelude::*;

/// Row-major random image.
pub fn noise(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height).map(|_| rng.gen()).collect()
}

/// Horizontal ramp with added texture, so no region of the image is flat.
pub fn textured_gradient(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut img = Vec::with_capacity(width * height);

    for _ in 0..height {
        for x in 0..width {
            let v = x + rng.gen_range(0..128);
            img.push(v.min(255) as u8);
        }
    }

    img
}

/// The view of `left` from a camera `k` columns to the right: scene content appears `k`
/// columns further left, so `left(r, c)` matches `right(r, c - k)`.
pub fn shift_view(left: &[u8], width: usize, k: usize) -> Vec<u8> {
    left.chunks(width)
        .flat_map(|row| (0..width).map(move |x| row[(x + k).min(width - 1)]))
        .collect()
}

/// Checkerboard of 0 and 255, the worst case for unsaturated SAD sums.
pub fn checkerboard(width: usize, height: usize) -> Vec<u8> {
    (0..width * height)
        .map(|i| if (i % width + i / width) % 2 == 0 { 0 } else { 255 })
        .collect()
}

pub fn frame(width: usize, left: Vec<u8>, right: Vec<u8>) -> StereoFrame {
    let height = left.len() / width;
    StereoFrame::from_raw(width as u32, height as u32, left, right)
        .expect("buffers match the frame shape")
}

pub fn params(width: usize, height: usize, num_disp: usize) -> Params {
    Params {
        width,
        height,
        max_disparity: num_disp,
        ..Params::default()
    }
}

/// Every combination of metric and pass mode.
pub fn all_configs(width: usize, height: usize, num_disp: usize) -> Vec<Params> {
    let mut out = Vec::new();

    for metric in [CostMetric::Sad, CostMetric::Census].iter() {
        for directions in [DirectionSet::FORWARD, DirectionSet::ALL].iter() {
            out.push(Params {
                metric: *metric,
                directions: *directions,
                ..params(width, height, num_disp)
            });
        }
    }

    out
}

pub fn compute(params: Params, frame: &StereoFrame) -> DisparityMap {
    let mut engine = SgmEngine::new(params).expect("valid parameters");
    engine.compute(frame).expect("frame is complete")
}
