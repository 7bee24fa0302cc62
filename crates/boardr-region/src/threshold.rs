//! Local adaptive thresholding.

use image::{GrayImage, Luma};
use imageproc::integral_image::{integral_image, sum_image_pixels};

/// Copy of `img` with `r` pixels of replicated border on every side.
fn replicate_border(img: &GrayImage, r: u32) -> GrayImage {
    let (w, h) = img.dimensions();
    GrayImage::from_fn(w + 2 * r, h + 2 * r, |x, y| {
        let sx = x.saturating_sub(r).min(w - 1);
        let sy = y.saturating_sub(r).min(h - 1);
        *img.get_pixel(sx, sy)
    })
}

/// Adaptive mean threshold.
///
/// A pixel becomes 255 when it is brighter than the mean of its
/// `block_size x block_size` neighbourhood minus `offset`, else 0. Near the
/// border the image is extended by replicating its edge pixels, so every
/// neighbourhood holds `block_size^2` samples. `block_size` must be odd;
/// callers validate it.
pub fn adaptive_mean_threshold(img: &GrayImage, block_size: u32, offset: f64) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut out = GrayImage::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }

    let r = block_size / 2;
    let integral = integral_image::<_, u64>(&replicate_border(img, r));
    let count = (block_size as f64) * (block_size as f64);

    for y in 0..h {
        for x in 0..w {
            let [sum] = sum_image_pixels(&integral, x, y, x + 2 * r, y + 2 * r);
            let mean = sum as f64 / count;
            let v = img.get_pixel(x, y)[0] as f64;
            if v > mean - offset {
                out.put_pixel(x, y, Luma([255]));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_image_is_foreground_with_positive_offset() {
        let img = GrayImage::from_pixel(20, 10, Luma([90]));
        let out = adaptive_mean_threshold(&img, 5, 1.0);
        assert!(out.pixels().all(|p| p[0] == 255));

        let out = adaptive_mean_threshold(&img, 5, 0.0);
        assert!(out.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn separates_dark_square_under_gradient() {
        // Horizontal lighting ramp with a dark square in the middle.
        let mut img = GrayImage::from_fn(60, 40, |x, _| Luma([(80 + 2 * x) as u8]));
        for y in 15..25 {
            for x in 25..35 {
                let v = img.get_pixel(x, y)[0];
                img.put_pixel(x, y, Luma([v / 3]));
            }
        }
        let out = adaptive_mean_threshold(&img, 15, 1.0);
        assert_eq!(0, out.get_pixel(30, 20)[0]);
        assert_eq!(255, out.get_pixel(20, 5)[0]);
        assert_eq!(255, out.get_pixel(55, 35)[0]);
    }

    #[test]
    fn border_window_replicates_edge_pixels() {
        // Bright first column, the rest dark, a slightly brighter pixel at x = 10.
        let mut img = GrayImage::from_fn(40, 21, |x, _| Luma([if x == 0 { 255 } else { 90 }]));
        img.put_pixel(10, 10, Luma([100]));
        let out = adaptive_mean_threshold(&img, 21, 1.0);
        // The window reaches 10 px past the left edge, all copies of column 0:
        // mean = (11 * 255 + 10 * 90) / 21 ~ 176.4, so 100 is background.
        assert_eq!(0, out.get_pixel(10, 10)[0]);
        // Far from the edge the bright column is out of reach.
        img.put_pixel(30, 10, Luma([100]));
        let out = adaptive_mean_threshold(&img, 21, 1.0);
        assert_eq!(255, out.get_pixel(30, 10)[0]);
    }

    #[test]
    fn single_pixel_image_compares_against_itself() {
        let img = GrayImage::from_pixel(1, 1, Luma([7]));
        assert_eq!(255, adaptive_mean_threshold(&img, 125, 1.0).get_pixel(0, 0)[0]);
        assert_eq!(0, adaptive_mean_threshold(&img, 125, -1.0).get_pixel(0, 0)[0]);
    }
}
