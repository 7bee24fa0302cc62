//! File-backed diagnostics and the calibration overlay.

use boardr_core::PatternSize;
use boardr_region::DebugSink;
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use log::{debug, warn};
use nalgebra::Point2;
use std::path::PathBuf;

/// Writes each diagnostic image as `<dir>/<name>.png`.
#[derive(Clone, Debug)]
pub struct FileDebugSink {
    dir: PathBuf,
}

impl FileDebugSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.png"))
    }
}

impl DebugSink for FileDebugSink {
    fn emit(&self, name: &str, image: &DynamicImage) {
        let path = self.path_for(name);
        match image.save(&path) {
            Ok(()) => debug!("wrote {}", path.display()),
            Err(e) => warn!("failed to write {}: {e}", path.display()),
        }
    }
}

const ROW_COLORS: [[u8; 3]; 6] = [
    [255, 0, 0],
    [255, 128, 0],
    [200, 200, 0],
    [0, 200, 0],
    [0, 128, 255],
    [160, 0, 255],
];

/// Inverted frame with the detected corners marked and each row joined,
/// one colour per row.
pub fn draw_calibration(
    frame: &GrayImage,
    corners: &[Point2<f32>],
    pattern: PatternSize,
) -> RgbImage {
    let mut img = RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        let v = 255 - frame.get_pixel(x, y)[0];
        Rgb([v, v, v])
    });
    let w = pattern.width.max(1) as usize;
    for (row, chunk) in corners.chunks(w).enumerate() {
        let color = Rgb(ROW_COLORS[row % ROW_COLORS.len()]);
        for (k, p) in chunk.iter().enumerate() {
            let (x, y) = (p.x.round() as i32, p.y.round() as i32);
            draw_cross_mut(&mut img, color, x, y);
            draw_hollow_circle_mut(&mut img, (x, y), 4, color);
            if let Some(next) = chunk.get(k + 1) {
                draw_line_segment_mut(&mut img, (p.x, p.y), (next.x, next.y), color);
            }
        }
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn file_sink_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileDebugSink::new(dir.path());
        sink.emit("adapt_board", &DynamicImage::ImageLuma8(GrayImage::new(8, 8)));
        assert!(dir.path().join("adapt_board.png").is_file());
    }

    #[test]
    fn file_sink_swallows_write_errors() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileDebugSink::new(dir.path().join("missing"));
        sink.emit("contours", &DynamicImage::new_rgb8(4, 4));
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn calibration_overlay_inverts_and_marks() {
        let frame = GrayImage::from_pixel(40, 30, Luma([200]));
        let corners = vec![Point2::new(10.0, 10.0), Point2::new(20.0, 10.0)];
        let img = draw_calibration(&frame, &corners, PatternSize::new(2, 1));
        assert_eq!(&Rgb([55, 55, 55]), img.get_pixel(35, 25));
        assert_eq!(&Rgb(ROW_COLORS[0]), img.get_pixel(10, 10));
        assert_eq!(&Rgb(ROW_COLORS[0]), img.get_pixel(15, 10));
    }
}
