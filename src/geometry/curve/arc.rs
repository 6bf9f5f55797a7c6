use std::f64::consts::TAU;

use crate::error::GeometryError;
use crate::math::arc_2d::signed_sweep;
use crate::math::intersect_2d::angle_to_arc_param;
use crate::math::{angle_of, normalize_angle, point_on_circle, Point2, TOLERANCE};

use super::{Bounds2, Curve};

/// A circular arc in the sketch plane.
///
/// Stored as a start angle plus a signed sweep (positive = counter-clockwise),
/// so a full-circle arc (`|sweep| = 2π`) is representable without ambiguity.
/// The parametric form is `P(t) = center + r * (cos θ, sin θ)` with
/// `θ = start_angle + t * sweep`, `t ∈ [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    center: Point2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
}

impl Arc {
    /// Creates a new arc from a start angle and signed sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive or the sweep is zero.
    pub fn new(
        center: Point2,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    ) -> Result<Self, GeometryError> {
        if radius < TOLERANCE {
            return Err(GeometryError::NonPositiveRadius {
                operation: "arc",
                radius,
            });
        }
        if sweep.abs() < TOLERANCE {
            return Err(GeometryError::ZeroLength { operation: "arc" });
        }
        Ok(Self {
            center,
            radius,
            start_angle: normalize_angle(start_angle),
            sweep: sweep.clamp(-TAU, TAU),
        })
    }

    /// Full counter-clockwise turn starting at `seam_angle`, for an already
    /// validated radius.
    pub(crate) fn full(center: Point2, radius: f64, seam_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle: normalize_angle(seam_angle),
            sweep: TAU,
        }
    }

    /// Creates an arc from start/end angles and an orientation flag.
    ///
    /// Coincident angles produce a full-circle arc.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive.
    pub fn from_angles(
        center: Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        ccw: bool,
    ) -> Result<Self, GeometryError> {
        Self::new(
            center,
            radius,
            start_angle,
            signed_sweep(start_angle, end_angle, !ccw),
        )
    }

    /// Returns the arc center.
    #[must_use]
    pub fn center(&self) -> &Point2 {
        &self.center
    }

    /// Returns the arc radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Start angle in `[0, 2π)`.
    #[must_use]
    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    /// End angle in `[0, 2π)`.
    #[must_use]
    pub fn end_angle(&self) -> f64 {
        normalize_angle(self.start_angle + self.sweep)
    }

    /// Signed sweep (positive = counter-clockwise).
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    /// Whether the arc sweeps counter-clockwise.
    #[must_use]
    pub fn is_ccw(&self) -> bool {
        self.sweep > 0.0
    }

    /// Whether the arc covers the whole circle.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.sweep.abs() > TAU - TOLERANCE
    }

    #[must_use]
    pub fn start_point(&self) -> Point2 {
        point_on_circle(&self.center, self.radius, self.start_angle)
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        point_on_circle(&self.center, self.radius, self.start_angle + self.sweep)
    }

    /// Point on the arc path halfway between start and end.
    #[must_use]
    pub fn midpoint(&self) -> Point2 {
        self.point_at(0.5)
    }

    /// Arc parameter of `p`, if its angle falls inside the arc.
    #[must_use]
    pub fn param_of(&self, p: &Point2) -> Option<f64> {
        let angle = (p.y - self.center.y).atan2(p.x - self.center.x);
        angle_to_arc_param(angle, self.start_angle, self.sweep)
    }

    /// Length of the arc path.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }

    /// Splits the arc at `point`.
    ///
    /// Returns `None` when `point` is within `tol` (measured along the arc)
    /// of either endpoint, or when it does not lie on the arc.
    #[must_use]
    pub fn split_at(&self, point: &Point2, tol: f64) -> Option<(Self, Self)> {
        if ((point - self.center).norm() - self.radius).abs() > tol {
            return None;
        }
        let t = self.param_of(point)?;
        let length = self.length();
        if t * length <= tol || (1.0 - t) * length <= tol {
            return None;
        }
        let split_angle = angle_of(&self.center, point);
        let head_sweep = self.sweep * t;
        Some((
            Self {
                center: self.center,
                radius: self.radius,
                start_angle: self.start_angle,
                sweep: head_sweep,
            },
            Self {
                center: self.center,
                radius: self.radius,
                start_angle: split_angle,
                sweep: self.sweep - head_sweep,
            },
        ))
    }
}

impl Curve for Arc {
    fn point_at(&self, t: f64) -> Point2 {
        point_on_circle(&self.center, self.radius, self.start_angle + self.sweep * t)
    }

    fn is_closed(&self) -> bool {
        self.is_full()
    }

    fn endpoints(&self) -> Option<(Point2, Point2)> {
        Some((self.start_point(), self.end_point()))
    }

    fn bounds(&self) -> Bounds2 {
        Bounds2::around(&self.center, self.radius)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn from_angles_clockwise() {
        let arc = Arc::from_angles(Point2::origin(), 1.0, FRAC_PI_2, 0.0, false).unwrap();
        assert!(!arc.is_ccw());
        assert_abs_diff_eq!(arc.sweep(), -FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(arc.end_angle(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn coincident_angles_make_full_arc() {
        let arc = Arc::from_angles(Point2::origin(), 2.0, 1.0, 1.0, true).unwrap();
        assert!(arc.is_full());
        assert!(arc.is_closed());
    }

    #[test]
    fn split_covers_original_range() {
        let arc = Arc::new(Point2::new(1.0, 1.0), 2.0, 0.0, PI).unwrap();
        let p = point_on_circle(arc.center(), 2.0, PI / 3.0);
        let (head, tail) = arc.split_at(&p, 1e-3).unwrap();
        assert_abs_diff_eq!(head.start_angle(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(head.sweep() + tail.sweep(), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(tail.start_angle(), PI / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(tail.end_angle(), PI, epsilon = 1e-9);
        assert!((head.end_point() - p).norm() < 1e-9);
        assert!((tail.start_point() - p).norm() < 1e-9);
    }

    #[test]
    fn split_clockwise_arc() {
        let arc = Arc::new(Point2::origin(), 1.0, PI, -PI).unwrap();
        let (head, tail) = arc.split_at(&Point2::new(0.0, 1.0), 1e-3).unwrap();
        assert_abs_diff_eq!(head.sweep(), -FRAC_PI_2, epsilon = 1e-9);
        assert_abs_diff_eq!(tail.sweep(), -FRAC_PI_2, epsilon = 1e-9);
        assert_abs_diff_eq!(tail.start_angle(), FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn split_at_endpoint_or_outside_is_none() {
        let arc = Arc::new(Point2::origin(), 1.0, 0.0, FRAC_PI_2).unwrap();
        assert!(arc.split_at(&Point2::new(1.0, 0.0), 1e-3).is_none());
        assert!(arc.split_at(&Point2::new(0.0, 1.0), 1e-3).is_none());
        assert!(arc.split_at(&Point2::new(-1.0, 0.0), 1e-3).is_none());
        assert!(arc.split_at(&Point2::new(0.5, 0.5), 1e-3).is_none());
    }

    #[test]
    fn full_arc_splits_anywhere_but_its_seam() {
        let arc = Arc::new(Point2::origin(), 1.0, 0.0, TAU).unwrap();
        assert!(arc.split_at(&Point2::new(1.0, 0.0), 1e-3).is_none());
        let (head, tail) = arc.split_at(&Point2::new(-1.0, 0.0), 1e-3).unwrap();
        assert_abs_diff_eq!(head.sweep(), PI, epsilon = 1e-9);
        assert_abs_diff_eq!(tail.sweep(), PI, epsilon = 1e-9);
    }
}
