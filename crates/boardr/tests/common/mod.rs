#![allow(dead_code)]

use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;
use nalgebra::Point2;

pub const DARK: u8 = 30;
pub const LIGHT: u8 = 225;

/// Renders a chessboard of `squares_x x squares_y` squares with a light
/// margin around it, lightly blurred like a camera frame.
///
/// The board has `(squares_x - 1) x (squares_y - 1)` inner corners.
pub fn render_chessboard(squares_x: u32, squares_y: u32, square: u32, margin: u32) -> GrayImage {
    let w = squares_x * square + 2 * margin;
    let h = squares_y * square + 2 * margin;
    let img = GrayImage::from_fn(w, h, |x, y| {
        if x < margin || y < margin || x >= w - margin || y >= h - margin {
            return Luma([LIGHT]);
        }
        let cx = (x - margin) / square;
        let cy = (y - margin) / square;
        if (cx + cy) % 2 == 0 {
            Luma([DARK])
        } else {
            Luma([LIGHT])
        }
    });
    gaussian_blur_f32(&img, 1.0)
}

/// Ground-truth inner corners of [`render_chessboard`], row-major from the
/// top-left.
pub fn inner_corners(squares_x: u32, squares_y: u32, square: u32, margin: u32) -> Vec<Point2<f32>> {
    let mut out = Vec::new();
    for r in 1..squares_y {
        for c in 1..squares_x {
            out.push(Point2::new(
                (margin + c * square) as f32 - 0.5,
                (margin + r * square) as f32 - 0.5,
            ));
        }
    }
    out
}

/// Frame with no pattern at all.
pub fn blank(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([128]))
}
