//! # General disparity objects
//!
//! This module provides generic disparity traits and structures for use by different algorithms.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::{GrayImage, Luma};
use imageproc::map::map_colors;
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// A rectified grayscale stereo pair.
#[derive(Clone)]
pub struct StereoFrame {
    pub left: GrayImage,
    pub right: GrayImage
}

/// A dense integer disparity map, one 8-bit disparity per pixel in `0..num_disparities`.
#[derive(Clone)]
pub struct DisparityMap {
    data: GrayImage,
    num_disp: usize,
    pub max_disp: Option<u8>,
    pub min_disp: Option<u8>
}

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

pub trait DisparityAlgorithm {
    /// Compute the disparity map of the given stereo frame.
    fn compute(&mut self, frame: &StereoFrame) -> Result<DisparityMap>;
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl StereoFrame {
    pub fn new(left: GrayImage, right: GrayImage) -> Self {
        Self { left, right }
    }

    /// Build a frame from row-major sample buffers. Returns `None` if either buffer does not
    /// hold exactly `width * height` samples.
    pub fn from_raw(width: u32, height: u32, left: Vec<u8>, right: Vec<u8>) -> Option<Self> {
        Some(Self {
            left: GrayImage::from_raw(width, height, left)?,
            right: GrayImage::from_raw(width, height, right)?
        })
    }

    pub fn width(&self) -> u32 {
        self.left.width()
    }

    pub fn height(&self) -> u32 {
        self.left.height()
    }
}

impl DisparityMap {
    pub fn new(width: usize, height: usize, num_disp: usize) -> Self {
        DisparityMap {
            data: GrayImage::new(width as u32, height as u32),
            num_disp,
            min_disp: None,
            max_disp: None
        }
    }

    pub fn put(&mut self, x: usize, y: usize, val: u8) {
        debug_assert!((val as usize) < self.num_disp);
        self.data.put_pixel(x as u32, y as u32, Luma([val]));
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data.get_pixel(x as u32, y as u32)[0]
    }

    pub fn width(&self) -> usize {
        self.data.width() as usize
    }

    pub fn height(&self) -> usize {
        self.data.height() as usize
    }

    /// Number of candidate disparities the map was computed with.
    pub fn num_disparities(&self) -> usize {
        self.num_disp
    }

    /// Row-major disparity samples.
    pub fn as_raw(&self) -> &[u8] {
        self.data.as_raw()
    }

    /// Record the observed disparity range over the whole map.
    pub fn update_range(&mut self) {
        let data = self.data.as_raw();
        self.min_disp = data.iter().copied().min();
        self.max_disp = data.iter().copied().max();
    }

    /// Raw disparities as a luma image, one grey level per disparity.
    pub fn to_luma(&self) -> GrayImage {
        self.data.clone()
    }

    /// Converts the map to a GrayImage scaled so the full disparity range spans 0..=255.
    pub fn to_luma_normalised(&self) -> GrayImage {
        let mult = if self.num_disp > 1 {
            255.0 / (self.num_disp - 1) as f32
        }
        else {
            1.0
        };

        map_colors(&self.data, |p: Luma<u8>| {
            let val = (p[0] as f32 * mult).round();
            Luma([val.min(255.0) as u8])
        })
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
