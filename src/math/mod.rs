pub mod arc_2d;
pub mod area_2d;
pub mod intersect_2d;

use std::f64::consts::TAU;

/// 2D point type (plane-local sketch coordinates).
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Distance under which two sketch points are the same graph node.
///
/// Matches three decimal places of coordinate precision.
pub const POINT_MERGE_TOLERANCE: f64 = 1e-3;

/// Normalizes an angle to `[0, 2π)`.
#[must_use]
pub fn normalize_angle(a: f64) -> f64 {
    let r = a.rem_euclid(TAU);
    // Tiny negative inputs land on (or just under) TAU.
    if r >= TAU - TOLERANCE {
        0.0
    } else {
        r
    }
}

/// Angle of `p` as seen from `center`, normalized to `[0, 2π)`.
#[must_use]
pub fn angle_of(center: &Point2, p: &Point2) -> f64 {
    normalize_angle((p.y - center.y).atan2(p.x - center.x))
}

/// Point on the circle `(center, radius)` at `angle`.
#[must_use]
pub fn point_on_circle(center: &Point2, radius: f64, angle: f64) -> Point2 {
    Point2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}
