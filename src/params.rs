//! # Engine parameters
//!
//! Named, validated configuration for the SGM engine. Parameters deserialise from JSON, missing
//! fields fall back to the reference configuration (a 1242x375 frame with 128 disparities).

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::Path;

use serde::Deserialize;

use crate::cost::{Cost, MAX_COST};
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Largest supported disparity range, disparities are emitted as 8-bit samples.
pub const MAX_DISPARITY_RANGE: usize = 256;

/// Largest census window, `11 * 11 - 1` pattern bits fit into a `u128`.
pub const MAX_CENSUS_WINDOW: usize = 11;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Matching cost metric.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CostMetric {
    /// Sum of absolute differences over a `sad_window` square.
    Sad,

    /// Hamming distance between census patterns over a `census_window` square.
    Census
}

/// Which pixel the right image's census pattern is compared against.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CensusRightCentre {
    /// The right image's own pixel at the shifted window centre.
    RightPixel,

    /// A constant zero centre. No tap is ever below zero so every right pattern is empty and
    /// the cost degenerates to the left pattern's popcount.
    Zero
}

/// A scan direction along which path costs are aggregated.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    #[serde(rename = "lr")]
    LeftToRight,
    #[serde(rename = "tb")]
    TopToBottom,
    #[serde(rename = "rl")]
    RightToLeft,
    #[serde(rename = "bt")]
    BottomToTop
}

/// Orientation of a direction's scan line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The path runs along a row and restarts at every row.
    Row,

    /// The path runs down a column and persists for the whole frame.
    Column
}

/// The raster pass a direction is causal in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Forward,
    Reverse
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Set of enabled aggregation directions.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(from = "Vec<Direction>")]
pub struct DirectionSet(u8);

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {
    /// Frame width in pixels.
    pub width: usize,

    /// Frame height in pixels.
    pub height: usize,

    /// Number of candidate disparities (DISP), candidates are `0..max_disparity`.
    pub max_disparity: usize,

    /// Side length of the SAD window.
    pub sad_window: usize,

    /// Side length of the census window.
    pub census_window: usize,

    /// Penalty for a one step disparity change along a path.
    pub penalty_small: Cost,

    /// Penalty for any larger disparity jump along a path.
    pub penalty_large: Cost,

    pub directions: DirectionSet,

    pub metric: CostMetric,

    pub census_right_centre: CensusRightCentre
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::LeftToRight,
        Direction::TopToBottom,
        Direction::RightToLeft,
        Direction::BottomToTop
    ];

    pub fn axis(self) -> Axis {
        match self {
            Direction::LeftToRight | Direction::RightToLeft => Axis::Row,
            Direction::TopToBottom | Direction::BottomToTop => Axis::Column
        }
    }

    pub fn pass(self) -> Pass {
        match self {
            Direction::LeftToRight | Direction::TopToBottom => Pass::Forward,
            Direction::RightToLeft | Direction::BottomToTop => Pass::Reverse
        }
    }

    fn bit(self) -> u8 {
        match self {
            Direction::LeftToRight => 0b0001,
            Direction::TopToBottom => 0b0010,
            Direction::RightToLeft => 0b0100,
            Direction::BottomToTop => 0b1000
        }
    }

    /// Parse the short form used in configuration files (`lr`, `tb`, `rl`, `bt`).
    pub fn from_short(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lr" => Some(Direction::LeftToRight),
            "tb" => Some(Direction::TopToBottom),
            "rl" => Some(Direction::RightToLeft),
            "bt" => Some(Direction::BottomToTop),
            _ => None
        }
    }
}

impl DirectionSet {
    /// The causal pair, runs in a single raster pass.
    pub const FORWARD: DirectionSet = DirectionSet(0b0011);

    /// All four directions, needs a second reverse pass.
    pub const ALL: DirectionSet = DirectionSet(0b1111);

    pub fn empty() -> Self {
        DirectionSet(0)
    }

    pub fn with(mut self, dir: Direction) -> Self {
        self.0 |= dir.bit();
        self
    }

    pub fn contains(&self, dir: Direction) -> bool {
        self.0 & dir.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Enabled directions in the given pass, in `Direction::ALL` order.
    pub fn in_pass(&self, pass: Pass) -> Vec<Direction> {
        Direction::ALL
            .iter()
            .copied()
            .filter(|d| self.contains(*d) && d.pass() == pass)
            .collect()
    }

    /// True when any reverse direction is enabled, i.e. the frame needs two passes.
    pub fn needs_reverse_pass(&self) -> bool {
        self.contains(Direction::RightToLeft) || self.contains(Direction::BottomToTop)
    }

    /// Parse a comma separated list such as `lr,tb,rl,bt`.
    pub fn parse_list(s: &str) -> Option<Self> {
        s.split(',')
            .filter(|p| !p.trim().is_empty())
            .try_fold(DirectionSet::empty(), |set, p| Direction::from_short(p).map(|d| set.with(d)))
    }
}

impl From<Vec<Direction>> for DirectionSet {
    fn from(dirs: Vec<Direction>) -> Self {
        dirs.into_iter().fold(DirectionSet::empty(), DirectionSet::with)
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            width: 1242,
            height: 375,
            max_disparity: 128,
            sad_window: 3,
            census_window: 5,
            penalty_small: 10,
            penalty_large: 150,
            directions: DirectionSet::FORWARD,
            metric: CostMetric::Sad,
            census_right_centre: CensusRightCentre::RightPixel
        }
    }
}

impl Params {
    /// Load parameters from a JSON file. Missing fields take their default values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let params: Params = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(params)
    }

    /// Side length of the active metric's window. Rows above `window() - 1` are warm-up rows.
    pub fn window(&self) -> usize {
        match self.metric {
            CostMetric::Sad => self.sad_window,
            CostMetric::Census => self.census_window
        }
    }

    /// Number of samples per image in one frame.
    pub fn frame_len(&self) -> usize {
        self.width * self.height
    }

    /// Check every parameter, returning the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid(format!(
                "frame must be non-empty, got {}x{}", self.width, self.height
            )));
        }

        if self.max_disparity == 0 || self.max_disparity > MAX_DISPARITY_RANGE {
            return Err(invalid(format!(
                "max_disparity must be in 1..={}, got {}",
                MAX_DISPARITY_RANGE, self.max_disparity
            )));
        }

        if self.sad_window % 2 == 0 || self.sad_window > self.height {
            return Err(invalid(format!(
                "sad_window must be odd and no taller than the frame, got {}", self.sad_window
            )));
        }

        if self.census_window % 2 == 0
            || self.census_window < 3
            || self.census_window > MAX_CENSUS_WINDOW
        {
            return Err(invalid(format!(
                "census_window must be odd and in 3..={}, got {}",
                MAX_CENSUS_WINDOW, self.census_window
            )));
        }

        if self.metric == CostMetric::Census && self.census_window > self.height {
            return Err(invalid(format!(
                "census_window {} is taller than the frame ({})",
                self.census_window, self.height
            )));
        }

        if self.penalty_small > MAX_COST || self.penalty_large > MAX_COST {
            return Err(invalid(format!(
                "penalties must not exceed {}, got {} and {}",
                MAX_COST, self.penalty_small, self.penalty_large
            )));
        }

        if self.directions.is_empty() {
            return Err(invalid("at least one direction must be enabled".to_string()));
        }

        Ok(())
    }
}

fn invalid(msg: String) -> Error {
    Error::InvalidParams(msg)
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
