//! # Semi-global matching
//!
//! This module provides a streaming implementation of Hirschmüller's semi-global matching from
//! ("Stereo Processing by Semiglobal Matching and Mutual Information")[https://core.ac.uk/download/pdf/11134866.pdf]
//!
//! Pixels are consumed in raster order. The causal directions (left to right, top to bottom)
//! are aggregated in a single forward pass. If a reverse direction is enabled the forward pass
//! only stores its fused costs, and a second pass runs bottom to top, right to left over a copy
//! of the frame, adds the reverse path costs and selects the disparities.
//!
//! ```text
//!  Idle --> ForwardScan --+-----------------------> Emit --> Idle
//!                         |                          ^
//!                         +-----> ReverseScan -------+
//! ```

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use log::{debug, trace, warn};

use crate::aggregation::PathAggregator;
use crate::cost::{fuse_into, Cost};
use crate::disparity::{DisparityAlgorithm, DisparityMap, StereoFrame};
use crate::error::*;
use crate::matching::MatchCostEngine;
use crate::params::{Axis, Params, Pass};
use crate::select::DisparitySelector;
use crate::window::{FramePixelBuffer, PixelWindowFeed};

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Frame scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    ForwardScan,
    ReverseScan,
    Emit
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Forward pass fused costs for every pixel of the frame.
pub struct PartialCostVolume {
    width: usize,
    num_disp: usize,
    data: Vec<Cost>
}

/// The SGM engine and its frame scheduler.
pub struct SgmEngine {
    params: Params,
    state: SchedulerState,

    feed: PixelWindowFeed,
    costs: MatchCostEngine,
    selector: DisparitySelector,
    forward: Vec<PathAggregator>,
    reverse: Vec<PathAggregator>,

    // Per-pixel scratch, one entry per disparity
    match_buf: Vec<Cost>,
    path_buf: Vec<Cost>,
    fused: Vec<Cost>,
    reverse_sum: Vec<Cost>
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl PartialCostVolume {
    pub fn new(width: usize, height: usize, num_disp: usize) -> Self {
        Self {
            width,
            num_disp,
            data: vec![0; width * height * num_disp]
        }
    }

    pub fn slot(&self, row: usize, col: usize) -> &[Cost] {
        let start = (row * self.width + col) * self.num_disp;
        &self.data[start..start + self.num_disp]
    }

    pub fn slot_mut(&mut self, row: usize, col: usize) -> &mut [Cost] {
        let start = (row * self.width + col) * self.num_disp;
        &mut self.data[start..start + self.num_disp]
    }
}

impl SgmEngine {
    /// Create a new engine with the given parameters.
    pub fn new(params: Params) -> Result<Self> {
        params.validate()?;

        let window = params.window();
        let num_disp = params.max_disparity;
        let build = |pass: Pass| -> Vec<PathAggregator> {
            params.directions
                .in_pass(pass)
                .into_iter()
                .map(|dir| PathAggregator::new(
                    dir,
                    params.width,
                    num_disp,
                    params.penalty_small,
                    params.penalty_large
                ))
                .collect()
        };
        let forward = build(Pass::Forward);
        let reverse = build(Pass::Reverse);

        Ok(Self {
            feed: PixelWindowFeed::new(params.width, params.height, window),
            costs: MatchCostEngine::new(&params),
            selector: DisparitySelector::new(window, num_disp),
            forward,
            reverse,
            match_buf: vec![0; num_disp],
            path_buf: vec![0; num_disp],
            fused: vec![0; num_disp],
            reverse_sum: vec![0; num_disp],
            state: SchedulerState::Idle,
            params
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// True when the frame needs a reverse pass and the frame-sized buffers.
    pub fn is_two_pass(&self) -> bool {
        !self.reverse.is_empty()
    }

    /// Process one frame from the two pixel streams, passing every disparity to `sink` in
    /// raster order. Exactly `width * height` samples are taken from each stream, so a pair of
    /// `&mut` iterators can be reused for consecutive frames.
    ///
    /// In single pass mode each disparity is emitted as soon as the column half a window to its
    /// right has streamed in. In two pass mode they are emitted once the reverse pass is
    /// complete.
    ///
    /// Returns the number of disparities emitted. If a stream runs dry the frame is aborted with
    /// [`Error::InputUnderrun`].
    pub fn process<L, R, F>(&mut self, left: L, right: R, mut sink: F) -> Result<usize>
    where
        L: IntoIterator<Item = u8>,
        R: IntoIterator<Item = u8>,
        F: FnMut(u8)
    {
        let mut left = left.into_iter();
        let mut right = right.into_iter();

        let result = self.run_frame(&mut left, &mut right, &mut sink);
        if let Err(ref e) = result {
            warn!("Frame aborted: {}", e);
            self.transition(SchedulerState::Idle);
        }

        result
    }

    fn run_frame<L, R, F>(&mut self, left: &mut L, right: &mut R, sink: &mut F) -> Result<usize>
    where
        L: Iterator<Item = u8>,
        R: Iterator<Item = u8>,
        F: FnMut(u8)
    {
        let (width, height) = (self.params.width, self.params.height);
        let num_disp = self.params.max_disparity;

        self.transition(SchedulerState::ForwardScan);
        self.feed.reset();
        for agg in self.forward.iter_mut().chain(self.reverse.iter_mut()) {
            agg.reset();
        }

        if !self.is_two_pass() {
            let produced = self.forward_scan(left, right, None, None, sink)?;

            // Everything was streamed during the scan
            self.transition(SchedulerState::Emit);
            self.transition(SchedulerState::Idle);
            return Ok(produced);
        }

        debug!(
            "Allocating frame buffers: {} pixel pairs, {} partial costs",
            width * height,
            width * height * num_disp
        );
        let mut frame_buf = FramePixelBuffer::new(width, height);
        let mut partial = PartialCostVolume::new(width, height, num_disp);

        self.forward_scan(
            left,
            right,
            Some(&mut frame_buf),
            Some(&mut partial),
            &mut |_: u8| ()
        )?;

        self.transition(SchedulerState::ReverseScan);
        let map = self.reverse_scan(&frame_buf, &partial);
        drop(partial);
        drop(frame_buf);

        self.transition(SchedulerState::Emit);
        for d in map.as_raw() {
            sink(*d);
        }

        self.transition(SchedulerState::Idle);
        Ok(width * height)
    }

    /// Raster pass over the incoming streams. With a partial cost volume the fused costs are
    /// stored in it, otherwise disparities are selected and sent to `sink` directly. Returns
    /// the number of disparities sent.
    ///
    /// Pixel `(row, col)` is processed as soon as `(row, col + half)` has been pushed, the last
    /// `half` columns of a row once the row is complete.
    fn forward_scan<L, R, F>(
        &mut self,
        left: &mut L,
        right: &mut R,
        mut frame_buf: Option<&mut FramePixelBuffer>,
        mut partial: Option<&mut PartialCostVolume>,
        sink: &mut F
    ) -> Result<usize>
    where
        L: Iterator<Item = u8>,
        R: Iterator<Item = u8>,
        F: FnMut(u8)
    {
        let (width, height) = (self.params.width, self.params.height);
        let half = self.params.window() / 2;
        let expected = width * height;
        let mut produced = 0;

        for row in 0..height {
            for agg in self.forward.iter_mut() {
                if agg.direction().axis() == Axis::Row {
                    agg.reset();
                }
            }

            for col in 0..width {
                let (l, r) = match (left.next(), right.next()) {
                    (Some(l), Some(r)) => (l, r),
                    _ => return Err(Error::InputUnderrun {
                        consumed: self.feed.pushed(),
                        expected,
                        produced
                    })
                };

                self.feed.push(l, r)?;
                if let Some(buf) = frame_buf.as_deref_mut() {
                    buf.push(l, r);
                }

                if col >= half {
                    produced += self.forward_pixel(row, col - half, partial.as_deref_mut(), sink);
                }
            }

            // Columns whose window reaches past the right edge
            for col in width.saturating_sub(half)..width {
                produced += self.forward_pixel(row, col, partial.as_deref_mut(), sink);
            }

            trace!("Forward pass row {}", row);
        }

        debug_assert!(self.feed.is_complete());

        Ok(produced)
    }

    /// Forward pass work for one pixel whose window is fully buffered. Returns the number of
    /// disparities sent to `sink`.
    fn forward_pixel<F>(
        &mut self,
        row: usize,
        col: usize,
        partial: Option<&mut PartialCostVolume>,
        sink: &mut F
    ) -> usize
    where
        F: FnMut(u8)
    {
        // Warm-up rows only leave zeros, with a partial volume they are already there
        if !self.feed.is_warm() || self.forward.is_empty() {
            if partial.is_some() {
                return 0;
            }
            sink(0);
            return 1;
        }

        self.costs.prepare_column(&self.feed, row, col);
        self.costs.compute(&self.feed, row, col, &mut self.match_buf);

        for f in self.fused.iter_mut() {
            *f = 0;
        }
        for agg in self.forward.iter_mut() {
            agg.step(col, &self.match_buf, &mut self.path_buf);
            fuse_into(&mut self.fused, &self.path_buf);
        }

        match partial {
            Some(volume) => {
                volume.slot_mut(row, col).copy_from_slice(&self.fused);
                0
            },
            None => {
                sink(self.selector.select(row, col, &self.fused));
                1
            }
        }
    }

    /// Reverse raster pass over the buffered frame, producing the final disparity map.
    fn reverse_scan(
        &mut self,
        frame_buf: &FramePixelBuffer,
        partial: &PartialCostVolume
    ) -> DisparityMap {
        let (width, height) = (self.params.width, frame_buf.height());
        let first_row = self.params.window() - 1;
        let mut map = DisparityMap::new(width, height, self.params.max_disparity);

        // Warm-up rows stay at 0
        for row in (first_row..height).rev() {
            trace!("Reverse pass row {}", row);

            // Same cost path as the forward pass, read from the whole frame
            self.costs.begin_row(frame_buf, row);
            for agg in self.reverse.iter_mut() {
                if agg.direction().axis() == Axis::Row {
                    agg.reset();
                }
            }

            for col in (0..width).rev() {
                self.costs.compute(frame_buf, row, col, &mut self.match_buf);

                for s in self.reverse_sum.iter_mut() {
                    *s = 0;
                }
                for agg in self.reverse.iter_mut() {
                    agg.step(col, &self.match_buf, &mut self.path_buf);
                    fuse_into(&mut self.reverse_sum, &self.path_buf);
                }

                self.fused.copy_from_slice(partial.slot(row, col));
                fuse_into(&mut self.fused, &self.reverse_sum);

                map.put(col, row, self.selector.select(row, col, &self.fused));
            }
        }

        map
    }

    fn transition(&mut self, next: SchedulerState) {
        debug!("Scheduler {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl DisparityAlgorithm for SgmEngine {
    /// Compute the disparity map for the given frame.
    fn compute(&mut self, frame: &StereoFrame) -> Result<DisparityMap> {
        let expected = self.params.frame_len();
        let supplied = frame.left.as_raw().len().max(frame.right.as_raw().len());
        if supplied > expected {
            return Err(Error::InputOverrun { supplied, expected });
        }

        let width = self.params.width;
        let mut disp_map = DisparityMap::new(width, self.params.height, self.params.max_disparity);

        let mut idx = 0;
        self.process(
            frame.left.as_raw().iter().copied(),
            frame.right.as_raw().iter().copied(),
            |d| {
                disp_map.put(idx % width, idx / width, d);
                idx += 1;
            }
        )?;

        disp_map.update_range();

        Ok(disp_map)
    }
}
