//! # Path cost aggregation
//!
//! One [`PathAggregator`] per enabled direction. It owns the running path costs of that
//! direction: a single lane for row paths, restarted at every row, or one lane per column for
//! column paths, restarted once per frame.
//!
//! The recurrence for disparity `k`, with `P` the previous path costs along the direction and
//! `C` the current matching costs, is
//!
//! ```text
//! L[k] = sat(C[k] + min(P[k], sat(P[k-1] + P1), sat(P[k+1] + P1), sat(min(P) + P2)) - min(P))
//! ```
//!
//! where missing neighbours at the ends of the range count as `MAX_COST`.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::cost::{sat_add, saturate, Cost, MAX_COST};
use crate::params::{Axis, Direction};

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct PathAggregator {
    direction: Direction,
    num_disp: usize,
    penalty_small: Cost,
    penalty_large: Cost,

    /// `lanes * num_disp` path costs.
    state: Vec<Cost>
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl PathAggregator {
    /// Create an aggregator for `direction` over a frame `width` pixels wide.
    pub fn new(
        direction: Direction,
        width: usize,
        num_disp: usize,
        penalty_small: Cost,
        penalty_large: Cost
    ) -> Self {
        let lanes = match direction.axis() {
            Axis::Row => 1,
            Axis::Column => width
        };

        Self {
            direction,
            num_disp,
            penalty_small,
            penalty_large,
            state: vec![0; lanes * num_disp]
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Zero every lane. Called at the start of each row for row paths, and at the start of
    /// each frame for column paths.
    pub fn reset(&mut self) {
        for p in self.state.iter_mut() {
            *p = 0;
        }
    }

    /// Lane of the path through column `col`.
    #[inline]
    pub fn lane(&self, col: usize) -> usize {
        match self.direction.axis() {
            Axis::Row => 0,
            Axis::Column => col
        }
    }

    /// Path costs currently held for the lane through column `col`.
    pub fn path(&self, col: usize) -> &[Cost] {
        let start = self.lane(col) * self.num_disp;
        &self.state[start..start + self.num_disp]
    }

    /// Advance the path through column `col` by one pixel with matching costs `costs`. The
    /// aggregated costs are written to `out` and become the lane's new path state.
    pub fn step(&mut self, col: usize, costs: &[Cost], out: &mut [Cost]) {
        debug_assert_eq!(costs.len(), self.num_disp);
        debug_assert_eq!(out.len(), self.num_disp);

        let start = self.lane(col) * self.num_disp;
        let prev = &mut self.state[start..start + self.num_disp];
        let last = self.num_disp - 1;

        let min_prev = prev.iter().copied().min().unwrap_or(0);
        let jump = sat_add(min_prev, self.penalty_large);

        for k in 0..self.num_disp {
            let lower = if k > 0 {
                sat_add(prev[k - 1], self.penalty_small)
            }
            else {
                MAX_COST
            };
            let upper = if k < last {
                sat_add(prev[k + 1], self.penalty_small)
            }
            else {
                MAX_COST
            };

            let neighbour = prev[k].min(lower).min(upper).min(jump);

            // neighbour >= min_prev always holds, so the subtraction cannot wrap
            out[k] = saturate(costs[k] as u32 + (neighbour - min_prev) as u32, MAX_COST);
        }

        prev.copy_from_slice(out);
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
