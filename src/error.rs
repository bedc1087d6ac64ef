//! # Error standards
//!
//! This module provides a standardised error enum and result type for this crate.

// -----------------------------------------------------------------------------------------------
// TYPES
// -----------------------------------------------------------------------------------------------

/// Standard result type used in the disparity crate.
pub type Result<T> = std::result::Result<T, Error>;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// One of the pixel streams ran dry before the frame completed. The frame is aborted.
    #[error(
        "Input stream underrun: consumed {consumed} of {expected} samples, \
        {produced} disparity outputs produced"
    )]
    InputUnderrun {
        consumed: usize,
        expected: usize,
        produced: usize
    },

    /// More samples were supplied than a single frame holds.
    #[error("Input stream overrun: {supplied} samples supplied for a {expected} sample frame")]
    InputOverrun {
        supplied: usize,
        expected: usize
    },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Raised by the image adapter only, the engine assumes a correctly shaped frame.
    #[error("Frame shape mismatch: expected {expected:?}, found {found:?}")]
    FrameShapeMismatch {
        expected: (u32, u32),
        found: (u32, u32)
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[cfg(feature = "statistics")]
    #[error("Plotting error: {0}")]
    Plot(String)
}
