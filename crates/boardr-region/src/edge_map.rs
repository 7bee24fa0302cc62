use crate::debug::DebugSink;
use crate::error::RegionError;
use crate::threshold::adaptive_mean_threshold;
use image::{DynamicImage, GrayImage};
use imageproc::{edges, filter};
use log::debug;
use serde::{Deserialize, Serialize};

/// Adaptive threshold settings for the edge map.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeMapParams {
    /// Side of the square neighbourhood used for the local mean (odd).
    pub block_size: u32,
    /// Constant subtracted from the local mean.
    pub offset: f64,
}

impl Default for EdgeMapParams {
    fn default() -> Self {
        Self {
            block_size: 125,
            offset: 1.0,
        }
    }
}

impl EdgeMapParams {
    pub fn validate(&self) -> Result<(), RegionError> {
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(RegionError::InvalidBlockSize(self.block_size));
        }
        if !self.offset.is_finite() {
            return Err(RegionError::InvalidOffset(self.offset));
        }
        Ok(())
    }
}

/// Turns a grayscale frame into a binary edge/threshold map.
#[derive(Clone, Debug)]
pub struct EdgeMapBuilder {
    params: EdgeMapParams,
}

impl Default for EdgeMapBuilder {
    fn default() -> Self {
        Self {
            params: EdgeMapParams::default(),
        }
    }
}

impl EdgeMapBuilder {
    pub fn new(params: EdgeMapParams) -> Result<Self, RegionError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &EdgeMapParams {
        &self.params
    }

    /// 3x3 mean blur followed by the adaptive mean threshold.
    ///
    /// Output has the input dimensions and only the values 0 and 255. With a
    /// sink the map is also emitted as `adapt_board`.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, gray, sink)))]
    pub fn build(&self, gray: &GrayImage, sink: Option<&dyn DebugSink>) -> GrayImage {
        let blurred = blur(gray);
        let map = adaptive_mean_threshold(&blurred, self.params.block_size, self.params.offset);
        debug!(
            "edge map {}x{} (block {}, offset {})",
            map.width(),
            map.height(),
            self.params.block_size,
            self.params.offset
        );
        if let Some(sink) = sink {
            sink.emit("adapt_board", &DynamicImage::ImageLuma8(map.clone()));
        }
        map
    }

    /// Canny edges of the blurred frame with hysteresis bounds
    /// `(threshold, 2 * threshold)`.
    pub fn canny(&self, gray: &GrayImage, threshold: f32) -> Result<GrayImage, RegionError> {
        if !(0.0..=255.0).contains(&threshold) {
            return Err(RegionError::InvalidCannyThreshold(threshold));
        }
        Ok(edges::canny(&blur(gray), threshold, 2.0 * threshold))
    }
}

fn blur(gray: &GrayImage) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    filter::box_filter(gray, 1, 1)
}
