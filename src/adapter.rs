//! # Image adapter
//!
//! Glue between image files and the engine: loading and shaping a stereo pair, and writing the
//! disparity map out as raw, normalised and colour mapped images.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::{Path, PathBuf};

use image::{imageops::FilterType, GrayImage, Luma, Rgb, RgbImage};
use imageproc::map::map_colors;
use log::debug;

use crate::disparity::{DisparityMap, StereoFrame};
use crate::error::*;

#[cfg(feature = "statistics")]
use plotters::prelude::*;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Paths written by [`save_outputs`].
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub raw: PathBuf,
    pub normalised: PathBuf,
    pub colour: PathBuf
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Load a stereo pair as grayscale, resized to `width` x `height` if needed.
pub fn load_stereo_pair<P, Q>(left: P, right: Q, width: u32, height: u32) -> Result<StereoFrame>
where
    P: AsRef<Path>,
    Q: AsRef<Path>
{
    let left = load_gray(left.as_ref(), width, height)?;
    let right = load_gray(right.as_ref(), width, height)?;

    Ok(StereoFrame::new(left, right))
}

fn load_gray(path: &Path, width: u32, height: u32) -> Result<GrayImage> {
    let mut img = image::open(path)?.to_luma();

    if img.dimensions() != (width, height) {
        debug!(
            "Resizing {} from {:?} to {:?}",
            path.display(), img.dimensions(), (width, height)
        );
        img = image::imageops::resize(&img, width, height, FilterType::Triangle);
    }

    check_shape(&img, width, height)?;

    Ok(img)
}

/// Verify an image has the configured frame shape.
pub fn check_shape(img: &GrayImage, width: u32, height: u32) -> Result<()> {
    if img.dimensions() != (width, height) {
        return Err(Error::FrameShapeMismatch {
            expected: (width, height),
            found: img.dimensions()
        });
    }

    Ok(())
}

/// Write `disp.png`, `disp_vis.png` and `disp_color.png` into `dir`.
pub fn save_outputs<P: AsRef<Path>>(map: &DisparityMap, dir: P) -> Result<OutputPaths> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let paths = OutputPaths {
        raw: dir.join("disp.png"),
        normalised: dir.join("disp_vis.png"),
        colour: dir.join("disp_color.png")
    };

    let normalised = map.to_luma_normalised();

    map.to_luma().save(&paths.raw)?;
    normalised.save(&paths.normalised)?;
    to_colour(&normalised).save(&paths.colour)?;

    Ok(paths)
}

/// Apply the [`jet`] colour map to a normalised disparity image.
pub fn to_colour(normalised: &GrayImage) -> RgbImage {
    map_colors(normalised, |p: Luma<u8>| jet(p[0]))
}

/// Jet colour map: dark blue at 0 through cyan, yellow and red to dark red at 255.
pub fn jet(v: u8) -> Rgb<u8> {
    let x = v as f32 / 255.0;

    let channel = |offset: f32| -> u8 {
        let c = 1.5 - (4.0 * x - offset).abs();
        (c.max(0.0).min(1.0) * 255.0).round() as u8
    };

    Rgb([channel(3.0), channel(2.0), channel(1.0)])
}

/// Plot the per-row range of valid disparities.
#[cfg(feature = "statistics")]
pub fn plot_row_ranges<P: AsRef<Path>>(map: &DisparityMap, path: P) -> Result<()> {
    let mut min_history: Vec<(usize, usize)> = Vec::with_capacity(map.height());
    let mut max_history: Vec<(usize, usize)> = Vec::with_capacity(map.height());

    for y in 0..map.height() {
        let row = (0..map.width()).map(|x| map.get(x, y) as usize);
        min_history.push((row.clone().min().unwrap_or(0), y));
        max_history.push((row.max().unwrap_or(0), y));
    }

    let plot_err = |e: &dyn std::fmt::Display| Error::Plot(e.to_string());

    let area = BitMapBackend::new(path.as_ref(), (800, 600)).into_drawing_area();
    area.fill(&WHITE).map_err(|e| plot_err(&e))?;

    let mut chart = ChartBuilder::on(&area)
        .caption("Disparity range per row", ("sans-serif", 20).into_font())
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(30)
        .build_ranged(0..map.num_disparities(), 0..map.height())
        .map_err(|e| plot_err(&e))?;

    chart.configure_mesh().draw().map_err(|e| plot_err(&e))?;

    chart
        .draw_series(LineSeries::new(min_history, &RED))
        .map_err(|e| plot_err(&e))?
        .label("Min disparity")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    chart
        .draw_series(LineSeries::new(max_history, &BLUE))
        .map_err(|e| plot_err(&e))?
        .label("Max disparity")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| plot_err(&e))?;

    Ok(())
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jet_endpoints() {
        assert_eq!(jet(0), Rgb([0, 0, 128]));
        assert_eq!(jet(255), Rgb([128, 0, 0]));

        let mid = jet(128);
        assert!(mid[1] > 250);
    }

    #[test]
    fn shape_check() {
        let img = GrayImage::new(4, 3);
        assert!(check_shape(&img, 4, 3).is_ok());
        assert!(matches!(
            check_shape(&img, 3, 4),
            Err(Error::FrameShapeMismatch { expected: (3, 4), found: (4, 3) })
        ));
    }

    #[test]
    fn save_writes_scaled_outputs() {
        let dir = std::env::temp_dir().join(format!("sgm-disparity-save-{}", std::process::id()));

        let mut map = DisparityMap::new(3, 1, 4);
        map.put(0, 0, 0);
        map.put(1, 0, 1);
        map.put(2, 0, 3);

        let paths = save_outputs(&map, &dir).unwrap();

        assert_eq!(paths.raw, dir.join("disp.png"));
        assert_eq!(paths.normalised, dir.join("disp_vis.png"));
        assert_eq!(paths.colour, dir.join("disp_color.png"));
        assert!(paths.raw.exists() && paths.colour.exists());

        let raw = image::open(&paths.raw).unwrap().to_luma();
        assert_eq!(raw.as_raw(), &vec![0, 1, 3]);

        // 255 / (4 - 1) per disparity step
        let vis = image::open(&paths.normalised).unwrap().to_luma();
        assert_eq!(vis.as_raw(), &vec![0, 85, 255]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
