//! Compute a disparity map from a rectified stereo pair.
//!
//! Usage: sgm [LEFT] [RIGHT] [OPTIONS]

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info};

use sgm_disparity::adapter::{load_stereo_pair, save_outputs};
use sgm_disparity::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "sgm")]
#[command(about = "Semi-global matching disparity from a rectified stereo pair", long_about = None)]
struct Args {
    /// Left image of the rectified pair
    #[arg(default_value = "left.png")]
    left: PathBuf,

    /// Right image of the rectified pair
    #[arg(default_value = "right.png")]
    right: PathBuf,

    /// JSON parameter file, missing fields use the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the disparity images are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Cost metric override (sad or census)
    #[arg(long, value_parser = parse_metric)]
    metric: Option<CostMetric>,

    /// Direction set override, e.g. lr,tb,rl,bt
    #[arg(long, value_parser = parse_directions)]
    directions: Option<DirectionSet>,

    /// Number of candidate disparities override
    #[arg(long)]
    max_disparity: Option<usize>
}

fn parse_metric(s: &str) -> std::result::Result<CostMetric, String> {
    match s.to_ascii_lowercase().as_str() {
        "sad" => Ok(CostMetric::Sad),
        "census" => Ok(CostMetric::Census),
        _ => Err(format!("'{}' is not a cost metric, expected sad or census", s))
    }
}

fn parse_directions(s: &str) -> std::result::Result<DirectionSet, String> {
    DirectionSet::parse_list(s)
        .ok_or_else(|| format!("'{}' is not a direction list, expected e.g. lr,tb,rl,bt", s))
}

/// Process exit code for each failure class.
fn exit_code(e: &Error) -> i32 {
    match e {
        Error::FrameShapeMismatch { .. } => 2,
        Error::InputUnderrun { .. } | Error::InputOverrun { .. } => 3,
        Error::InvalidParams(_) => 4,
        _ => 1
    }
}

fn run(args: Args) -> Result<()> {
    let mut params = match &args.config {
        Some(path) => Params::from_json_file(path)?,
        None => Params::default()
    };

    if let Some(metric) = args.metric {
        params.metric = metric;
    }
    if let Some(directions) = args.directions {
        params.directions = directions;
    }
    if let Some(max_disparity) = args.max_disparity {
        params.max_disparity = max_disparity;
    }

    let mut engine = SgmEngine::new(params)?;
    let (width, height) = (engine.params().width, engine.params().height);

    let frame = load_stereo_pair(&args.left, &args.right, width as u32, height as u32)?;
    let disp_map = engine.compute(&frame)?;

    let paths = save_outputs(&disp_map, &args.out_dir)?;
    info!(
        "Disparity map written to {} ({}x{})",
        paths.raw.display(), width, height
    );
    info!(
        "disp min={} max={}",
        disp_map.min_disp.unwrap_or(0),
        disp_map.max_disp.unwrap_or(0)
    );

    #[cfg(feature = "statistics")]
    sgm_disparity::adapter::plot_row_ranges(&disp_map, args.out_dir.join("disp_range.png"))?;

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(exit_code(&e));
    }
}
