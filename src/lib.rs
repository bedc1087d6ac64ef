//! # Semi-Global Matching Disparity
//!
//! This crate provides streaming semi-global matching (SGM) disparity computation for rectified
//! stereo pairs, with bounded 12-bit cost arithmetic.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod adapter;
pub mod aggregation;
pub mod cost;
mod disparity;
mod error;
pub mod matching;
pub mod params;
pub mod select;
pub mod sgm;
pub mod window;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub mod prelude {
    pub use crate::disparity::{DisparityAlgorithm, DisparityMap, StereoFrame};
    pub use crate::error::{Error, Result};
    pub use crate::params::{CensusRightCentre, CostMetric, Direction, DirectionSet, Params};
    pub use crate::sgm::{SchedulerState, SgmEngine};
}
