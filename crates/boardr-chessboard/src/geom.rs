use nalgebra::Vector2;
use std::f32::consts::FRAC_PI_4;

/// Dominant orientation of a set of edge vectors whose directions cluster on
/// two orthogonal, undirected axes.
///
/// Angles are accumulated in quadruple-angle space so that `a`, `a + π/2`,
/// `a + π` and `a + 3π/2` all vote for the same axis pair. Returns the axis
/// angle in `(-π/4, π/4]`, i.e. the axis closest to image +x, or `None` when
/// the votes cancel out.
pub(crate) fn dominant_axis_angle<I>(edges: I) -> Option<f32>
where
    I: IntoIterator<Item = Vector2<f32>>,
{
    let mut sum = Vector2::<f32>::zeros();
    let mut weight_sum = 0.0f32;

    for e in edges {
        let norm = e.norm();
        if norm <= f32::EPSILON {
            continue;
        }
        let four_theta = 4.0 * e.y.atan2(e.x);
        sum += Vector2::new(four_theta.cos(), four_theta.sin());
        weight_sum += 1.0;
    }

    if weight_sum <= 0.0 {
        return None;
    }

    let mean = sum / weight_sum;
    if mean.norm_squared() < 1e-6 {
        return None;
    }

    let theta = 0.25 * mean.y.atan2(mean.x);
    // atan2 yields [-π, π], so theta is in [-π/4, π/4]; fold the lower end.
    if theta <= -FRAC_PI_4 {
        Some(theta + 2.0 * FRAC_PI_4)
    } else {
        Some(theta)
    }
}

/// Convert angle (radians) to unit 2D vector.
#[inline]
pub(crate) fn angle_to_unit(theta: f32) -> Vector2<f32> {
    Vector2::new(theta.cos(), theta.sin())
}
