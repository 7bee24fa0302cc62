//! Diagnostic renderings of the contour stage.

use crate::contour::BoardContour;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use rand::Rng;

fn draw_closed_chain(img: &mut RgbImage, pts: &[Point<i32>], color: Rgb<u8>) {
    if pts.len() == 1 {
        let p = pts[0];
        if p.x >= 0 && p.y >= 0 && (p.x as u32) < img.width() && (p.y as u32) < img.height() {
            img.put_pixel(p.x as u32, p.y as u32, color);
        }
        return;
    }
    for (i, p) in pts.iter().enumerate() {
        let q = pts[(i + 1) % pts.len()];
        draw_line_segment_mut(
            img,
            (p.x as f32, p.y as f32),
            (q.x as f32, q.y as f32),
            color,
        );
    }
}

/// Every contour outlined in a random colour on a black canvas.
pub fn draw_contours<R: Rng>(
    width: u32,
    height: u32,
    contours: &[Vec<Point<i32>>],
    rng: &mut R,
) -> RgbImage {
    let mut img = RgbImage::new(width, height);
    for pts in contours {
        let color = Rgb([rng.gen(), rng.gen(), rng.gen()]);
        draw_closed_chain(&mut img, pts, color);
    }
    img
}

/// Largest contour filled green and its bounding box in red, on top of `frame`.
pub fn draw_components(frame: &RgbImage, board: &BoardContour) -> RgbImage {
    let mut img = frame.clone();
    let largest = &board.contours[board.largest];
    let mut poly = largest.clone();
    if poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    if poly.len() >= 3 {
        draw_polygon_mut(&mut img, &poly, Rgb([0, 255, 0]));
    } else {
        draw_closed_chain(&mut img, &poly, Rgb([0, 255, 0]));
    }
    let bb = board.bounding_box;
    draw_hollow_rect_mut(
        &mut img,
        Rect::at(bb.x, bb.y).of_size(bb.width, bb.height),
        Rgb([255, 0, 0]),
    );
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::ContourAnalyzer;
    use image::{GrayImage, Luma};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board() -> BoardContour {
        let mut map = GrayImage::new(50, 40);
        for y in 10..30 {
            for x in 8..42 {
                map.put_pixel(x, y, Luma([255]));
            }
        }
        ContourAnalyzer::default().find_board_contour(&map).unwrap()
    }

    #[test]
    fn seeded_contour_colours_repeat() {
        let b = board();
        let a = draw_contours(50, 40, &b.contours, &mut StdRng::seed_from_u64(12345));
        let c = draw_contours(50, 40, &b.contours, &mut StdRng::seed_from_u64(12345));
        assert_eq!(a, c);
        assert_eq!(&Rgb([0, 0, 0]), a.get_pixel(25, 20));
    }

    #[test]
    fn components_mark_largest_region() {
        let b = board();
        let out = draw_components(&RgbImage::new(50, 40), &b);
        assert_eq!(&Rgb([0, 255, 0]), out.get_pixel(25, 20));
        assert_eq!(&Rgb([255, 0, 0]), out.get_pixel(8, 10));
        assert_eq!(&Rgb([0, 0, 0]), out.get_pixel(2, 2));
    }
}
