//! # Matching costs
//!
//! Per-pixel cost vectors for every candidate disparity. The window for the output pixel at
//! `(row, col)` covers rows `row + 1 - window ..= row` (the newest rows of the line buffer) and
//! columns `col - half ..= col + half`. Its centre tap is therefore `(row - half, col)`.
//!
//! Output rows are named after the newest window row, so the census centre `(r, c)` of a pixel
//! and its right reference `(r, c - d)` are read from frame row `r - half`: the left centre is
//! `left(r - half, c)` and the right centre is `right(r - half, c - d)`.
//!
//! Pixel `(row, col)` only reads columns up to `col + half`, so the forward pass can compute it
//! as soon as that column has streamed in.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::cost::{saturate, Cost, MAX_COST};
use crate::params::{CensusRightCentre, CostMetric, Params};
use crate::window::{PixelSource, Side};

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Computes the matching cost vector of a pixel.
pub struct MatchCostEngine {
    metric: CostMetric,
    window: usize,
    half: isize,
    num_disp: usize,
    right_centre: CensusRightCentre,

    /// Census codes of the current row, one per column.
    census_left: Vec<u128>,
    census_right: Vec<u128>
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl MatchCostEngine {
    pub fn new(params: &Params) -> Self {
        let window = params.window();
        let census_len = match params.metric {
            CostMetric::Census => params.width,
            CostMetric::Sad => 0
        };

        Self {
            metric: params.metric,
            window,
            half: (window / 2) as isize,
            num_disp: params.max_disparity,
            right_centre: params.census_right_centre,
            census_left: vec![0; census_len],
            census_right: vec![0; census_len]
        }
    }

    /// Prepare every column of `row` at once, for sources holding the whole row. `row` must be
    /// at least `window - 1`.
    pub fn begin_row<S: PixelSource>(&mut self, src: &S, row: usize) {
        for col in 0..src.width() {
            self.prepare_column(src, row, col);
        }
    }

    /// Prepare column `col` of `row`. Streaming callers go left to right and call this before
    /// [`compute`](Self::compute) on the same pixel, census costs also read the columns left of
    /// `col` prepared earlier in the row.
    pub fn prepare_column<S: PixelSource>(&mut self, src: &S, row: usize, col: usize) {
        if self.metric != CostMetric::Census {
            return;
        }

        let top = row + 1 - self.window;
        self.census_left[col] = self.census_code(src, Side::Left, top, col as isize);
        self.census_right[col] = match self.right_centre {
            CensusRightCentre::RightPixel => self.census_code(src, Side::Right, top, col as isize),
            CensusRightCentre::Zero => 0
        };
    }

    /// Compute the cost of every disparity for the pixel at `(row, col)` into `out`.
    pub fn compute<S: PixelSource>(&self, src: &S, row: usize, col: usize, out: &mut [Cost]) {
        debug_assert_eq!(out.len(), self.num_disp);

        match self.metric {
            CostMetric::Sad => self.sad(src, row, col, out),
            CostMetric::Census => self.census(col, out)
        }
    }

    fn sad<S: PixelSource>(&self, src: &S, row: usize, col: usize, out: &mut [Cost]) {
        let top = row + 1 - self.window;

        for (d, cost) in out.iter_mut().enumerate() {
            let mut acc = 0u32;

            for y in top..=row {
                for dx in -self.half..=self.half {
                    let col_l = col as isize + dx;
                    let col_r = col_l - d as isize;
                    let l = src.sample(Side::Left, y, col_l) as i32;
                    let r = src.sample(Side::Right, y, col_r) as i32;
                    acc += (l - r).abs() as u32;
                }
            }

            *cost = saturate(acc, MAX_COST);
        }
    }

    fn census(&self, col: usize, out: &mut [Cost]) {
        let left = self.census_left[col];

        for (d, cost) in out.iter_mut().enumerate() {
            // A right centre left of the image reads as 0 and no tap is below 0. The reverse
            // pass shares this path, its upper column bound is the `<` width comparison in
            // `PixelSource::sample`.
            let right = if d <= col { self.census_right[col - d] } else { 0 };
            *cost = saturate((left ^ right).count_ones(), MAX_COST);
        }
    }

    /// Census pattern of the window whose top row is `top`, centred on column `col`. Bit is set
    /// when the tap is darker than the centre. The centre tap itself is skipped.
    fn census_code<S: PixelSource>(&self, src: &S, side: Side, top: usize, col: isize) -> u128 {
        let centre_row = top + self.half as usize;
        let centre = src.sample(side, centre_row, col);

        let mut code = 0u128;
        for y in top..top + self.window {
            for dx in -self.half..=self.half {
                if y == centre_row && dx == 0 {
                    continue;
                }

                code <<= 1;
                if src.sample(side, y, col + dx) < centre {
                    code |= 1;
                }
            }
        }

        code
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
