//! # Engine invariants
//!
//! Warm-up masking, cost saturation and out-of-image taps, checked on random and adversarial
//! inputs.

mod common;

use common::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use sgm_disparity::aggregation::PathAggregator;
use sgm_disparity::cost::{fuse_into, Cost, MAX_COST};
use sgm_disparity::matching::MatchCostEngine;
use sgm_disparity::prelude::*;
use sgm_disparity::window::FramePixelBuffer;

// -----------------------------------------------------------------------------------------------
// HELPERS
// -----------------------------------------------------------------------------------------------

fn buffer(width: usize, left: &[u8], right: &[u8]) -> FramePixelBuffer {
    let mut buf = FramePixelBuffer::new(width, left.len() / width);
    for (l, r) in left.iter().zip(right.iter()) {
        buf.push(*l, *r);
    }
    buf
}

/// Sample with explicit zero substitution outside the image.
fn tap(img: &[u8], width: usize, row: usize, col: isize) -> u8 {
    if col < 0 || col as usize >= width {
        0
    }
    else {
        img[row * width + col as usize]
    }
}

fn reference_sad(
    left: &[u8],
    right: &[u8],
    width: usize,
    win: usize,
    row: usize,
    col: usize,
    d: usize
) -> u32 {
    let half = (win / 2) as isize;
    let mut acc = 0;

    for y in (row + 1 - win)..=row {
        for dx in -half..=half {
            let c = col as isize + dx;
            let l = tap(left, width, y, c) as i32;
            let r = tap(right, width, y, c - d as isize) as i32;
            acc += (l - r).abs() as u32;
        }
    }

    acc
}

fn reference_census(img: &[u8], width: usize, win: usize, row: usize, col: isize) -> Vec<bool> {
    let half = (win / 2) as isize;
    let top = row + 1 - win;
    let centre_row = top + half as usize;
    let centre = tap(img, width, centre_row, col);

    let mut bits = Vec::new();
    for y in top..=row {
        for dx in -half..=half {
            if y != centre_row || dx != 0 {
                bits.push(tap(img, width, y, col + dx) < centre);
            }
        }
    }

    bits
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[test]
fn warm_up_region_is_zero() {
    let (width, height, num_disp) = (40, 20, 16);
    let frame = frame(width, noise(width, height, 21), noise(width, height, 22));

    for params in all_configs(width, height, num_disp) {
        let window = params.window();
        let map = compute(params, &frame);

        for y in 0..height {
            for x in 0..width {
                let d = map.get(x, y);
                assert!((d as usize) < num_disp);
                if y < window - 1 || x < num_disp - 1 {
                    assert_eq!(d, 0, "warm-up pixel ({}, {}) is {}", x, y, d);
                }
            }
        }
    }
}

#[test]
fn sad_taps_outside_image_are_zero() {
    let (width, height, num_disp) = (12, 5, 8);
    let left = noise(width, height, 31);
    let right = noise(width, height, 32);
    let buf = buffer(width, &left, &right);

    for win in [1, 3, 5].iter().copied() {
        let params = Params {
            sad_window: win,
            ..common::params(width, height, num_disp)
        };
        let mut engine = MatchCostEngine::new(&params);
        let mut out = vec![0; num_disp];

        for row in (win - 1)..height {
            engine.begin_row(&buf, row);
            for col in 0..width {
                engine.compute(&buf, row, col, &mut out);
                for d in 0..num_disp {
                    let expected = reference_sad(&left, &right, width, win, row, col, d);
                    assert_eq!(out[d] as u32, expected.min(MAX_COST as u32));
                }
            }
        }
    }
}

#[test]
fn census_taps_outside_image_are_zero() {
    let (width, height, num_disp, win) = (12, 7, 8, 5);
    let left = noise(width, height, 41);
    let right = noise(width, height, 42);
    let buf = buffer(width, &left, &right);

    let params = Params {
        metric: CostMetric::Census,
        census_window: win,
        ..common::params(width, height, num_disp)
    };
    let mut engine = MatchCostEngine::new(&params);
    let mut out = vec![0; num_disp];

    for row in (win - 1)..height {
        engine.begin_row(&buf, row);
        for col in 0..width {
            engine.compute(&buf, row, col, &mut out);

            let l = reference_census(&left, width, win, row, col as isize);
            for d in 0..num_disp {
                let r = reference_census(&right, width, win, row, col as isize - d as isize);
                let hamming = l.iter().zip(r.iter()).filter(|(a, b)| a != b).count();
                assert_eq!(out[d] as usize, hamming, "({}, {}) d={}", col, row, d);
            }
        }
    }
}

#[test]
fn large_sad_windows_saturate() {
    let (width, height) = (20, 15);
    let left = checkerboard(width, height);
    let right: Vec<u8> = left.iter().map(|v| 255 - v).collect();
    let buf = buffer(width, &left, &right);

    let params = Params { sad_window: 15, ..common::params(width, height, 2) };
    let mut engine = MatchCostEngine::new(&params);
    let mut out = vec![0; 2];

    engine.begin_row(&buf, 14);
    engine.compute(&buf, 14, 10, &mut out);

    // 225 taps of 255 would be 57375 unsaturated
    assert_eq!(out[0], MAX_COST);
}

#[test]
fn costs_stay_bounded_under_adversarial_input() {
    let mut rng = StdRng::seed_from_u64(51);
    let num_disp = 32;
    let mut forward = PathAggregator::new(Direction::LeftToRight, 1, num_disp, 10, 150);
    let mut vertical = PathAggregator::new(Direction::TopToBottom, 4, num_disp, 10, 150);
    let mut path = vec![0; num_disp];
    let mut fused = vec![0; num_disp];

    for i in 0..5000 {
        // Alternate between random extremes and maximal costs
        let costs: Vec<Cost> = (0..num_disp)
            .map(|_| if rng.gen_bool(0.5) { MAX_COST } else { rng.gen_range(0..=MAX_COST) })
            .collect();

        for f in fused.iter_mut() {
            *f = 0;
        }

        forward.step(0, &costs, &mut path);
        assert!(path.iter().all(|c| *c <= MAX_COST));
        fuse_into(&mut fused, &path);

        vertical.step(i % 4, &costs, &mut path);
        assert!(path.iter().all(|c| *c <= MAX_COST));
        fuse_into(&mut fused, &path);

        assert!(fused.iter().all(|c| *c <= MAX_COST));
    }
}

#[test]
fn high_contrast_frames_stay_in_range() {
    let (width, height, num_disp) = (48, 24, 32);
    let left = checkerboard(width, height);
    let right: Vec<u8> = noise(width, height, 61)
        .into_iter()
        .map(|v| if v > 127 { 255 } else { 0 })
        .collect();
    let frame = frame(width, left, right);

    for params in all_configs(width, height, num_disp) {
        let params = Params {
            sad_window: 11,
            penalty_small: MAX_COST,
            penalty_large: MAX_COST,
            ..params
        };
        let window = params.window();
        let map = compute(params, &frame);

        for y in 0..height {
            for x in 0..width {
                let d = map.get(x, y) as usize;
                assert!(d < num_disp);
                if y < window - 1 || x < num_disp - 1 {
                    assert_eq!(d, 0);
                }
            }
        }
    }
}

#[test]
fn direction_sets_are_consistent() {
    let (width, height, num_disp) = (40, 16, 12);
    let frame = frame(width, noise(width, height, 71), noise(width, height, 72));

    let sets = [
        DirectionSet::FORWARD,
        DirectionSet::ALL,
        DirectionSet::empty().with(Direction::LeftToRight),
        DirectionSet::empty().with(Direction::RightToLeft).with(Direction::BottomToTop)
    ];

    for set in sets.iter() {
        let params = Params { directions: *set, ..common::params(width, height, num_disp) };
        let map = compute(params, &frame);

        assert_eq!(map.as_raw().len(), width * height);
        for y in 0..height {
            for x in 0..width {
                let d = map.get(x, y) as usize;
                assert!(d < num_disp);
                if y < 2 || x < num_disp - 1 {
                    assert_eq!(d, 0);
                }
            }
        }
    }
}
