//! # Pixel windows
//!
//! Sample access for the matching cost computation. The forward pass reads from a
//! [`PixelWindowFeed`], a line buffer holding only the last `window` rows of the streams, while
//! the reverse pass reads the whole frame back from a [`FramePixelBuffer`]. Both implement
//! [`PixelSource`] so the cost engine does not care which pass it serves.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::error::*;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Value substituted for any tap outside the image.
pub const NEUTRAL_PIXEL: u8 = 0;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Which image of the stereo pair a sample comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right
}

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

/// Random access to the pixels of a frame.
pub trait PixelSource {
    /// Width of the frame in pixels.
    fn width(&self) -> usize;

    /// Sample at absolute frame coordinates. Columns outside `0..width` yield [`NEUTRAL_PIXEL`].
    fn sample(&self, side: Side, row: usize, col: isize) -> u8;
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Rolling line buffer over the left and right pixel streams.
///
/// Row `r` of the frame lives in slot `r % rows`. While row `r` is being filled, column `c` of
/// that slot holds row `r` for the columns already pushed and row `r - rows` beyond them, so a
/// window ending at row `r` may only reach up to the last pushed column.
pub struct PixelWindowFeed {
    width: usize,
    height: usize,
    rows: usize,
    left: Vec<u8>,
    right: Vec<u8>,
    pushed: usize
}

/// Full frame copies of both images, filled as the forward pass streams through.
pub struct FramePixelBuffer {
    width: usize,
    height: usize,
    left: Vec<u8>,
    right: Vec<u8>
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl PixelWindowFeed {
    /// Create a feed for a `width` x `height` frame buffering `rows` lines.
    pub fn new(width: usize, height: usize, rows: usize) -> Self {
        Self {
            width,
            height,
            rows,
            left: vec![NEUTRAL_PIXEL; rows * width],
            right: vec![NEUTRAL_PIXEL; rows * width],
            pushed: 0
        }
    }

    /// Start a new frame. Stale rows are never read, so the buffers are not cleared.
    pub fn reset(&mut self) {
        self.pushed = 0;
    }

    /// Accept the next pixel pair in raster order.
    pub fn push(&mut self, left: u8, right: u8) -> Result<()> {
        let expected = self.width * self.height;
        if self.pushed >= expected {
            return Err(Error::InputOverrun {
                supplied: self.pushed + 1,
                expected
            });
        }

        let row = self.pushed / self.width;
        let col = self.pushed % self.width;
        let idx = (row % self.rows) * self.width + col;

        self.left[idx] = left;
        self.right[idx] = right;
        self.pushed += 1;

        Ok(())
    }

    /// Number of pixel pairs accepted in the current frame.
    pub fn pushed(&self) -> usize {
        self.pushed
    }

    /// Number of rows with at least one pixel accepted in the current frame.
    pub fn rows_started(&self) -> usize {
        (self.pushed + self.width - 1) / self.width
    }

    /// True once the row being filled has a full window of rows above and including it.
    pub fn is_warm(&self) -> bool {
        self.rows_started() >= self.rows
    }

    /// True when every pixel of the frame has been accepted.
    pub fn is_complete(&self) -> bool {
        self.pushed == self.width * self.height
    }
}

impl PixelSource for PixelWindowFeed {
    fn width(&self) -> usize {
        self.width
    }

    fn sample(&self, side: Side, row: usize, col: isize) -> u8 {
        debug_assert!(
            row < self.rows_started() && row + self.rows >= self.rows_started(),
            "row {} is not in the line buffer", row
        );

        if col < 0 || col as usize >= self.width {
            return NEUTRAL_PIXEL;
        }

        let idx = (row % self.rows) * self.width + col as usize;
        match side {
            Side::Left => self.left[idx],
            Side::Right => self.right[idx]
        }
    }
}

impl FramePixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            left: Vec::with_capacity(width * height),
            right: Vec::with_capacity(width * height)
        }
    }

    /// Append the next pixel pair in raster order.
    pub fn push(&mut self, left: u8, right: u8) {
        debug_assert!(self.left.len() < self.width * self.height);
        self.left.push(left);
        self.right.push(right);
    }

    /// Number of rows held, complete once the forward pass has finished.
    pub fn height(&self) -> usize {
        self.height
    }
}

impl PixelSource for FramePixelBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn sample(&self, side: Side, row: usize, col: isize) -> u8 {
        if col < 0 || col as usize >= self.width || row >= self.height {
            return NEUTRAL_PIXEL;
        }

        let idx = row * self.width + col as usize;
        let data = match side {
            Side::Left => &self.left,
            Side::Right => &self.right
        };

        data.get(idx).copied().unwrap_or(NEUTRAL_PIXEL)
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
