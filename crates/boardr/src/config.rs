//! JSON session configuration.

use crate::error::BoardrIoError;
use boardr_chessboard::{ChessCornerParams, ChessboardParams, GridGraphParams};
use boardr_core::PatternSize;
use boardr_region::{EdgeMapParams, RegionError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("target_count must be >= 1")]
    InvalidTargetCount,
    #[error("image_scale_factor must be in (0, 1], got {0}")]
    InvalidScaleFactor(f32),
    #[error("board dimensions must both be >= 2, got {0}")]
    InvalidBoardSize(PatternSize),
    #[error("canny_threshold must be in [0, 255], got {0}")]
    InvalidCannyThreshold(f32),
    #[error("delay must be finite and >= 0, got {0}")]
    InvalidDelay(f64),
    #[error("max_frames must be >= 1 when set")]
    InvalidFrameBudget,
    #[error(transparent)]
    EdgeMap(#[from] RegionError),
}

/// Everything a [`crate::CalibrationSession`] needs. Every field has a
/// default, so a partial JSON file is enough.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardrConfig {
    /// Persist intermediate images under `debug_dir`.
    pub debug: bool,
    /// Where the calibration frame is saved.
    pub image_path: PathBuf,
    /// Number of chessboard views to collect.
    pub target_count: usize,
    /// Downsampling applied before corner finding.
    pub image_scale_factor: f32,
    /// Inner corners per row.
    pub board_width: u32,
    /// Inner corners per column.
    pub board_height: u32,
    /// Seconds between captures. Frame sources are pulled as fast as they
    /// deliver; the value is kept for compatibility and reported only.
    pub delay: f64,
    pub debug_dir: PathBuf,
    /// Optional JSON report with the collected correspondences.
    pub report_path: Option<PathBuf>,
    /// Stop after this many frames even if the session is incomplete.
    pub max_frames: Option<usize>,
    /// Canny threshold for boundary re-extraction.
    pub canny_threshold: f32,
    pub edge_map: EdgeMapParams,
    pub chess: ChessCornerParams,
    pub chessboard: ChessboardParams,
    pub grid: GridGraphParams,
}

impl Default for BoardrConfig {
    fn default() -> Self {
        Self {
            debug: false,
            image_path: PathBuf::from("board.png"),
            target_count: 1,
            image_scale_factor: 0.5,
            board_width: 9,
            board_height: 6,
            delay: 1.0,
            debug_dir: PathBuf::from("."),
            report_path: None,
            max_frames: None,
            canny_threshold: 100.0,
            edge_map: EdgeMapParams::default(),
            chess: ChessCornerParams::default(),
            chessboard: ChessboardParams::default(),
            grid: GridGraphParams::default(),
        }
    }
}

impl BoardrConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, BoardrIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), BoardrIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn pattern(&self) -> PatternSize {
        PatternSize::new(self.board_width, self.board_height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_count < 1 {
            return Err(ConfigError::InvalidTargetCount);
        }
        let sf = self.image_scale_factor;
        if !sf.is_finite() || sf <= 0.0 || sf > 1.0 {
            return Err(ConfigError::InvalidScaleFactor(sf));
        }
        if !self.pattern().is_valid() {
            return Err(ConfigError::InvalidBoardSize(self.pattern()));
        }
        if !(0.0..=255.0).contains(&self.canny_threshold) {
            return Err(ConfigError::InvalidCannyThreshold(self.canny_threshold));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(ConfigError::InvalidDelay(self.delay));
        }
        if self.max_frames == Some(0) {
            return Err(ConfigError::InvalidFrameBudget);
        }
        self.edge_map.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = BoardrConfig::default();
        assert!(!cfg.debug);
        assert_eq!(PathBuf::from("board.png"), cfg.image_path);
        assert_eq!(1, cfg.target_count);
        assert_eq!(0.5, cfg.image_scale_factor);
        assert_eq!(PatternSize::new(9, 6), cfg.pattern());
        assert_eq!(1.0, cfg.delay);
        assert_eq!(125, cfg.edge_map.block_size);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: BoardrConfig =
            serde_json::from_str(r#"{ "board_width": 7, "edge_map": { "offset": 3.0 } }"#)
                .unwrap();
        assert_eq!(PatternSize::new(7, 6), cfg.pattern());
        assert_eq!(3.0, cfg.edge_map.offset);
        assert_eq!(125, cfg.edge_map.block_size);
        assert_eq!(1, cfg.target_count);
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let mut cfg = BoardrConfig {
            target_count: 0,
            ..BoardrConfig::default()
        };
        assert_eq!(Err(ConfigError::InvalidTargetCount), cfg.validate());

        cfg.target_count = 2;
        cfg.image_scale_factor = 1.5;
        assert_eq!(Err(ConfigError::InvalidScaleFactor(1.5)), cfg.validate());

        cfg.image_scale_factor = 1.0;
        cfg.board_height = 1;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidBoardSize(_))
        ));

        cfg.board_height = 6;
        cfg.max_frames = Some(0);
        assert_eq!(Err(ConfigError::InvalidFrameBudget), cfg.validate());

        cfg.max_frames = None;
        cfg.edge_map.block_size = 10;
        assert!(matches!(cfg.validate(), Err(ConfigError::EdgeMap(_))));
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boardr.json");
        let cfg = BoardrConfig {
            target_count: 4,
            max_frames: Some(50),
            ..BoardrConfig::default()
        };
        cfg.write_json(&path).unwrap();
        let loaded = BoardrConfig::load_json(&path).unwrap();
        assert_eq!(4, loaded.target_count);
        assert_eq!(Some(50), loaded.max_frames);
    }
}
