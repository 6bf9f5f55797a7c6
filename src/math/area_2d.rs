use std::f64::consts::PI;

use super::Point2;

/// Contribution of the straight edge `p0 → p1` to a boundary's signed area.
///
/// Summing this term around a closed loop gives the shoelace area: positive
/// for counter-clockwise loops, negative for clockwise ones.
#[must_use]
pub fn segment_area_term(p0: &Point2, p1: &Point2) -> f64 {
    0.5 * (p0.x * p1.y - p1.x * p0.y)
}

/// Contribution of a circular edge to a boundary's signed area.
///
/// The edge starts at `start_angle` on the circle `(center, radius)` and
/// sweeps by the signed angle `sweep`. This is `½∮(x dy − y dx)` evaluated in
/// closed form, so it includes the circular segment beyond the chord.
#[must_use]
pub fn arc_area_term(center: &Point2, radius: f64, start_angle: f64, sweep: f64) -> f64 {
    let end_angle = start_angle + sweep;
    let r = radius;
    0.5 * (r * r * sweep + center.x * r * (end_angle.sin() - start_angle.sin())
        - center.y * r * (end_angle.cos() - start_angle.cos()))
}

/// Area enclosed by a full circle.
#[must_use]
pub fn circle_area(radius: f64) -> f64 {
    PI * radius * radius
}
