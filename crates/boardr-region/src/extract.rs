use crate::polygon::BoundaryPolygon;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Pixel};
use imageproc::drawing::draw_polygon_mut;

/// Filled polygon mask: 255 inside the polygon (and on its edges), 0 elsewhere.
///
/// Polygons with fewer than three vertices produce an all-zero mask.
pub fn build_mask(width: u32, height: u32, polygon: &BoundaryPolygon) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    if !polygon.encloses_area() || width == 0 || height == 0 {
        return mask;
    }
    draw_polygon_mut(&mut mask, &polygon.points(), Luma([255u8]));
    mask
}

/// Copy of `frame` with everything outside `polygon` set to zero.
pub fn extract_board<P: Pixel>(
    frame: &ImageBuffer<P, Vec<P::Subpixel>>,
    polygon: &BoundaryPolygon,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let (w, h) = frame.dimensions();
    let mask = build_mask(w, h, polygon);
    let mut out = ImageBuffer::<P, Vec<P::Subpixel>>::new(w, h);
    for (x, y, m) in mask.enumerate_pixels() {
        if m[0] > 0 {
            out.put_pixel(x, y, *frame.get_pixel(x, y));
        }
    }
    out
}

/// [`extract_board`] for any decoded frame; the pixel layout is kept for
/// 8-bit gray, RGB and RGBA and converted to RGB otherwise.
pub fn extract_frame(frame: &DynamicImage, polygon: &BoundaryPolygon) -> DynamicImage {
    match frame {
        DynamicImage::ImageLuma8(img) => DynamicImage::ImageLuma8(extract_board(img, polygon)),
        DynamicImage::ImageRgb8(img) => DynamicImage::ImageRgb8(extract_board(img, polygon)),
        DynamicImage::ImageRgba8(img) => DynamicImage::ImageRgba8(extract_board(img, polygon)),
        other => DynamicImage::ImageRgb8(extract_board(&other.to_rgb8(), polygon)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn rect_polygon() -> BoundaryPolygon {
        BoundaryPolygon {
            vertices: vec![[10, 10], [50, 10], [50, 40], [10, 40]],
        }
    }

    fn textured(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| Rgb([(x * 3) as u8 + 1, (y * 5) as u8 + 1, 77]))
    }

    #[test]
    fn keeps_inside_and_zeroes_outside() {
        let frame = textured(64, 48);
        let out = extract_board(&frame, &rect_polygon());
        assert_eq!(frame.dimensions(), out.dimensions());
        assert_eq!(frame.get_pixel(30, 25), out.get_pixel(30, 25));
        assert_eq!(frame.get_pixel(11, 39), out.get_pixel(11, 39));
        assert_eq!(&Rgb([0, 0, 0]), out.get_pixel(5, 5));
        assert_eq!(&Rgb([0, 0, 0]), out.get_pixel(60, 45));
        assert_eq!(&Rgb([0, 0, 0]), out.get_pixel(30, 2));
    }

    #[test]
    fn degenerate_polygon_gives_black_frame() {
        let frame = textured(32, 32);
        let line = BoundaryPolygon {
            vertices: vec![[2, 2], [20, 20]],
        };
        let out = extract_board(&frame, &line);
        assert!(out.pixels().all(|p| p.0 == [0, 0, 0]));
        assert!(build_mask(32, 32, &BoundaryPolygon::default())
            .pixels()
            .all(|p| p[0] == 0));
    }

    #[test]
    fn dynamic_frame_keeps_layout() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 48, Luma([9])));
        let out = extract_frame(&gray, &rect_polygon());
        let out = out.as_luma8().unwrap();
        assert_eq!(9, out.get_pixel(30, 25)[0]);
        assert_eq!(0, out.get_pixel(0, 0)[0]);
    }
}
