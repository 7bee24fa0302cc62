use crate::edge_map::EdgeMapBuilder;
use crate::error::RegionError;
use crate::polygon::{BoundaryPolygon, BoundingBox};
use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::geometry::{approximate_polygon_dp, arc_length, contour_area};
use imageproc::point::Point;
use log::{debug, warn};

/// Per-contour measurements handed to a [`BoundarySelector`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContourStats {
    /// Index into the analyzer's contour list.
    pub index: usize,
    pub area: f64,
    /// Closed arc length in pixels.
    pub perimeter: f64,
}

impl ContourStats {
    pub fn ratio(&self) -> f64 {
        self.area / self.perimeter
    }
}

/// Chooses the board boundary among candidate contours.
///
/// Candidates always have a positive perimeter. Returning `None` means no
/// candidate qualifies.
pub trait BoundarySelector {
    fn select(&self, candidates: &[ContourStats]) -> Option<usize>;
}

/// Highest area/perimeter ratio wins; the first candidate wins ties.
#[derive(Clone, Copy, Debug, Default)]
pub struct AreaPerimeterRatio;

impl BoundarySelector for AreaPerimeterRatio {
    fn select(&self, candidates: &[ContourStats]) -> Option<usize> {
        first_max_by(candidates, ContourStats::ratio)
    }
}

/// Largest enclosed area wins; the first candidate wins ties.
#[derive(Clone, Copy, Debug, Default)]
pub struct LargestArea;

impl BoundarySelector for LargestArea {
    fn select(&self, candidates: &[ContourStats]) -> Option<usize> {
        first_max_by(candidates, |c| c.area)
    }
}

fn first_max_by(candidates: &[ContourStats], key: impl Fn(&ContourStats) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for c in candidates {
        let k = key(c);
        if best.map_or(true, |(_, bk)| k > bk) {
            best = Some((c.index, k));
        }
    }
    best.map(|(i, _)| i)
}

/// Result of a successful boundary search.
#[derive(Clone, Debug)]
pub struct BoardContour {
    /// Every contour found in the edge map, in discovery order.
    pub contours: Vec<Vec<Point<i32>>>,
    /// Index of the chosen boundary contour.
    pub selected: usize,
    pub selected_stats: ContourStats,
    /// Simplified outline of the chosen contour.
    pub polygon: BoundaryPolygon,
    /// Index of the largest-area contour; reported for diagnostics.
    pub largest: usize,
    /// Bounding box of the largest-area contour.
    pub bounding_box: BoundingBox,
}

impl BoardContour {
    pub fn contour(&self) -> &[Point<i32>] {
        &self.contours[self.selected]
    }
}

/// Finds the board outline in a binary edge map.
#[derive(Clone, Debug)]
pub struct ContourAnalyzer<S = AreaPerimeterRatio> {
    selector: S,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    epsilon_rel: f64,
}

impl Default for ContourAnalyzer<AreaPerimeterRatio> {
    fn default() -> Self {
        Self {
            selector: AreaPerimeterRatio,
            epsilon_rel: 0.1,
        }
    }
}

impl<S: BoundarySelector> ContourAnalyzer<S> {
    pub fn new(selector: S, epsilon_rel: f64) -> Result<Self, RegionError> {
        if !(epsilon_rel > 0.0 && epsilon_rel <= 1.0) {
            return Err(RegionError::InvalidEpsilon(epsilon_rel));
        }
        Ok(Self {
            selector,
            epsilon_rel,
        })
    }

    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// Extract all contours, pick the boundary and simplify it.
    ///
    /// Fails with [`RegionError::BoundaryNotFound`] when no contour has a
    /// positive perimeter (or the selector declines every candidate).
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
    pub fn find_board_contour(&self, edge_map: &GrayImage) -> Result<BoardContour, RegionError> {
        let contours: Vec<Vec<Point<i32>>> = find_contours::<i32>(edge_map)
            .into_iter()
            .map(|c| c.points)
            .collect();
        debug!("found {} contours", contours.len());

        let stats: Vec<ContourStats> = contours
            .iter()
            .enumerate()
            .map(|(index, pts)| ContourStats {
                index,
                area: contour_area(pts),
                perimeter: if pts.len() < 2 {
                    0.0
                } else {
                    arc_length(pts, true)
                },
            })
            .collect();

        let candidates: Vec<ContourStats> =
            stats.iter().copied().filter(|s| s.perimeter > 0.0).collect();
        let selected = self
            .selector
            .select(&candidates)
            .ok_or(RegionError::BoundaryNotFound)?;
        let selected_stats = stats[selected];

        let largest = first_max_by(&stats, |s| s.area).ok_or(RegionError::BoundaryNotFound)?;
        let bounding_box =
            BoundingBox::from_points(&contours[largest]).ok_or(RegionError::BoundaryNotFound)?;

        let epsilon = self.epsilon_rel * selected_stats.perimeter;
        let simplified = approximate_polygon_dp(&contours[selected], epsilon, true);
        let polygon = BoundaryPolygon::from_points(&simplified);
        if !polygon.encloses_area() {
            warn!(
                "board boundary simplified to {} vertices; mask will be empty",
                polygon.len()
            );
        }
        debug!(
            "selected contour {} (area {:.1}, perimeter {:.1}, {} vertices)",
            selected,
            selected_stats.area,
            selected_stats.perimeter,
            polygon.len()
        );

        Ok(BoardContour {
            contours,
            selected,
            selected_stats,
            polygon,
            largest,
            bounding_box,
        })
    }
}

/// Re-run boundary extraction on Canny edges at `threshold`.
///
/// Pure function of its inputs; this is what an interactive threshold control
/// calls on every change.
pub fn reprocess<S: BoundarySelector>(
    gray: &GrayImage,
    threshold: f32,
    analyzer: &ContourAnalyzer<S>,
) -> Result<BoundaryPolygon, RegionError> {
    reprocess_board(gray, threshold, analyzer).map(|b| b.polygon)
}

/// [`reprocess`] keeping every contour, for callers that draw them.
pub fn reprocess_board<S: BoundarySelector>(
    gray: &GrayImage,
    threshold: f32,
    analyzer: &ContourAnalyzer<S>,
) -> Result<BoardContour, RegionError> {
    let edges = EdgeMapBuilder::default().canny(gray, threshold)?;
    analyzer.find_board_contour(&edges)
}
