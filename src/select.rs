//! # Disparity selection
//!
//! Winner-takes-all over the fused cost vector, masked by the warm-up region.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::cost::Cost;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct DisparitySelector {
    min_row: usize,
    min_col: usize
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl DisparitySelector {
    /// A pixel is valid once its `window` tall matching window and all `num_disp` candidates
    /// are inside the frame.
    pub fn new(window: usize, num_disp: usize) -> Self {
        Self {
            min_row: window.saturating_sub(1),
            min_col: num_disp.saturating_sub(1)
        }
    }

    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        row >= self.min_row && col >= self.min_col
    }

    /// Disparity with the lowest cost, the lowest index on ties. Pixels in the warm-up region
    /// always yield 0.
    pub fn select(&self, row: usize, col: usize, costs: &[Cost]) -> u8 {
        if !self.is_valid(row, col) {
            return 0;
        }

        let mut best = 0;
        let mut best_cost = Cost::MAX;
        for (d, c) in costs.iter().enumerate() {
            if *c < best_cost {
                best_cost = *c;
                best = d;
            }
        }

        best as u8
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
