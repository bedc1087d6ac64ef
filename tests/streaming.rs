//! # Streaming interface
//!
//! Frame accounting of the pixel streams: underrun, overrun and back-to-back frames.

mod common;

use std::cell::Cell;

use common::*;
use sgm_disparity::prelude::*;

#[test]
fn underrun_aborts_single_pass_frame() {
    let mut engine = SgmEngine::new(params(8, 4, 4)).unwrap();
    let mut out = Vec::new();

    let res = engine.process(vec![1u8; 20], vec![2u8; 32], |d| out.push(d));

    match res {
        Err(Error::InputUnderrun { consumed, expected, produced }) => {
            assert_eq!(consumed, 20);
            assert_eq!(expected, 32);
            // Two complete rows and the first three pixels of row 2 were streamed out
            assert_eq!(produced, 19);
        },
        other => panic!("expected underrun, got {:?}", other)
    }

    assert_eq!(out.len(), 19);
    assert_eq!(engine.state(), SchedulerState::Idle);
}

#[test]
fn single_pass_emits_half_a_window_behind_the_input() {
    let (width, height) = (8, 4);
    let mut engine = SgmEngine::new(params(width, height, 4)).unwrap();
    let left = noise(width, height, 11);
    let right = noise(width, height, 12);

    let consumed = Cell::new(0);
    let mut seen = Vec::new();
    let produced = engine.process(
        left.iter().copied().inspect(|_| consumed.set(consumed.get() + 1)),
        right.iter().copied(),
        |_| seen.push(consumed.get())
    ).unwrap();

    // A 3 wide window reaches one column ahead, the last column waits for the end of its row
    let expected: Vec<usize> = (0..height)
        .flat_map(|r| (0..width).map(move |c| r * width + (c + 2).min(width)))
        .collect();

    assert_eq!(produced, width * height);
    assert_eq!(seen, expected);
}

#[test]
fn underrun_aborts_two_pass_frame() {
    let params = Params { directions: DirectionSet::ALL, ..params(8, 4, 4) };
    let mut engine = SgmEngine::new(params).unwrap();
    let mut out = Vec::new();

    let res = engine.process(vec![1u8; 32], vec![2u8; 5], |d| out.push(d));

    match res {
        Err(Error::InputUnderrun { consumed, expected, produced }) => {
            assert_eq!(consumed, 5);
            assert_eq!(expected, 32);
            assert_eq!(produced, 0);
        },
        other => panic!("expected underrun, got {:?}", other)
    }

    assert!(out.is_empty());
    assert_eq!(engine.state(), SchedulerState::Idle);
}

#[test]
fn oversized_frame_is_rejected() {
    let mut engine = SgmEngine::new(params(8, 4, 4)).unwrap();
    let frame = frame(8, vec![0; 40], vec![0; 40]);

    match engine.compute(&frame) {
        Err(Error::InputOverrun { supplied, expected }) => {
            assert_eq!(supplied, 40);
            assert_eq!(expected, 32);
        },
        Err(e) => panic!("expected overrun, got {}", e),
        Ok(_) => panic!("expected overrun")
    }
}

#[test]
fn consecutive_frames_share_a_stream() {
    let (width, height) = (24, 8);
    let a_left = noise(width, height, 81);
    let a_right = noise(width, height, 82);
    let b_left = noise(width, height, 83);
    let b_right = noise(width, height, 84);

    for params in all_configs(width, height, 6) {
        let mut left = a_left.iter().chain(b_left.iter()).copied();
        let mut right = a_right.iter().chain(b_right.iter()).copied();

        let mut engine = SgmEngine::new(params.clone()).unwrap();
        let mut first = Vec::new();
        let mut second = Vec::new();

        assert_eq!(engine.process(&mut left, &mut right, |d| first.push(d)).unwrap(), 192);
        assert_eq!(engine.process(&mut left, &mut right, |d| second.push(d)).unwrap(), 192);
        assert!(left.next().is_none());

        let expected_a = compute(params.clone(), &frame(width, a_left.clone(), a_right.clone()));
        let expected_b = compute(params, &frame(width, b_left.clone(), b_right.clone()));
        assert_eq!(first.as_slice(), expected_a.as_raw());
        assert_eq!(second.as_slice(), expected_b.as_raw());
    }
}

#[test]
fn invalid_params_are_rejected() {
    let params = Params { sad_window: 2, ..params(8, 4, 4) };
    assert!(matches!(SgmEngine::new(params), Err(Error::InvalidParams(_))));

    let params = Params { directions: DirectionSet::empty(), ..common::params(8, 4, 4) };
    assert!(matches!(SgmEngine::new(params), Err(Error::InvalidParams(_))));
}

#[test]
fn two_pass_mode_is_reported() {
    let single = SgmEngine::new(params(8, 4, 4)).unwrap();
    assert!(!single.is_two_pass());

    let params = Params {
        directions: DirectionSet::FORWARD.with(Direction::BottomToTop),
        ..common::params(8, 4, 4)
    };
    let double = SgmEngine::new(params).unwrap();
    assert!(double.is_two_pass());
}
