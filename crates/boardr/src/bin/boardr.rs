//! boardr CLI: collect chessboard views from a frame directory and isolate the
//! board in the calibration frame.

use boardr::{BoardrConfig, BoardrError, CalibrationSession, CaptureStatus, ImageDirSource};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "boardr")]
#[command(about = "Collect chessboard calibration views and extract the board region")]
#[command(version)]
struct Cli {
    /// Directory of frames, consumed in file-name order.
    #[arg(long)]
    frames: PathBuf,

    /// JSON config; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write intermediate images to the debug directory.
    #[arg(long)]
    debug: bool,

    /// Directory for debug images.
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Where to save the calibration frame.
    #[arg(long)]
    image_path: Option<PathBuf>,

    /// Number of chessboard views to collect.
    #[arg(long)]
    n_boards: Option<usize>,

    /// Image scale factor applied before corner finding, in (0, 1].
    #[arg(long)]
    image_sf: Option<f32>,

    /// Seconds between captures (recorded only).
    #[arg(long)]
    delay: Option<f64>,

    /// Inner corners per row.
    #[arg(long)]
    board_w: Option<u32>,

    /// Inner corners per column.
    #[arg(long)]
    board_h: Option<u32>,

    /// Give up after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Re-extract the boundary from Canny edges at this threshold.
    #[arg(long)]
    canny_thresh: Option<f32>,

    /// Write a JSON report with the collected correspondences.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn build_config(&self) -> Result<BoardrConfig, BoardrError> {
        let mut cfg = match &self.config {
            Some(path) => BoardrConfig::load_json(path)?,
            None => BoardrConfig::default(),
        };
        if self.debug {
            cfg.debug = true;
        }
        if let Some(v) = &self.debug_dir {
            cfg.debug_dir = v.clone();
        }
        if let Some(v) = &self.image_path {
            cfg.image_path = v.clone();
        }
        if let Some(v) = self.n_boards {
            cfg.target_count = v;
        }
        if let Some(v) = self.image_sf {
            cfg.image_scale_factor = v;
        }
        if let Some(v) = self.delay {
            cfg.delay = v;
        }
        if let Some(v) = self.board_w {
            cfg.board_width = v;
        }
        if let Some(v) = self.board_h {
            cfg.board_height = v;
        }
        if let Some(v) = self.max_frames {
            cfg.max_frames = Some(v);
        }
        if let Some(v) = self.canny_thresh {
            cfg.canny_threshold = v;
        }
        if let Some(v) = &self.report {
            cfg.report_path = Some(v.clone());
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn init_logging(verbose: u8) {
    #[cfg(feature = "tracing")]
    {
        let _ = verbose;
        boardr::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = boardr::core::init_with_level(boardr::core::level_from_verbosity(verbose));
    }
}

fn run(cli: &Cli) -> Result<(), BoardrError> {
    let config = cli.build_config()?;
    info!(
        "looking for {}x{} board, {} view(s), scale {}",
        config.board_width, config.board_height, config.target_count, config.image_scale_factor
    );
    let mut source = ImageDirSource::open(&cli.frames)?;
    let mut session = CalibrationSession::new(config)?;

    match session.run(&mut source)? {
        CaptureStatus::Complete => info!("found board in {} frames", session.frames_seen()),
        status => info!(
            "stopped ({status:?}) with {} of {} views",
            session.accumulator().len(),
            session.accumulator().target_count()
        ),
    }

    if cli.canny_thresh.is_some() && session.calibration_frame().is_some() {
        let threshold = session.threshold();
        let polygon = session.reprocess(threshold)?;
        info!(
            "canny threshold {threshold}: boundary with {} vertices",
            polygon.len()
        );
    }

    let report = session.finish()?;
    println!(
        "{}",
        serde_json::json!({
            "complete": report.complete,
            "views": report.sets.len(),
            "frames": report.frames_seen,
            "boundary_vertices": report.boundary.as_ref().map(|b| b.len()),
        })
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}
