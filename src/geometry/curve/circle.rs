use crate::error::GeometryError;
use crate::math::{point_on_circle, Point2, TOLERANCE};

use super::{Arc, Bounds2, Curve};

/// A full circle in the sketch plane.
///
/// A circle has no natural start point; it only gets one when it is cut,
/// at which point it becomes a full-circle [`Arc`] seamed at the first cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    center: Point2,
    radius: f64,
}

impl Circle {
    /// Creates a new circle.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive.
    pub fn new(center: Point2, radius: f64) -> Result<Self, GeometryError> {
        if radius < TOLERANCE {
            return Err(GeometryError::NonPositiveRadius {
                operation: "circle",
                radius,
            });
        }
        Ok(Self { center, radius })
    }

    /// Returns the center of the circle.
    #[must_use]
    pub fn center(&self) -> &Point2 {
        &self.center
    }

    /// Returns the radius of the circle.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Converts the circle to a counter-clockwise full-circle arc seamed at `seam_angle`.
    #[must_use]
    pub fn to_full_arc(&self, seam_angle: f64) -> Arc {
        Arc::full(self.center, self.radius, seam_angle)
    }
}

impl Curve for Circle {
    fn point_at(&self, t: f64) -> Point2 {
        point_on_circle(&self.center, self.radius, t)
    }

    fn is_closed(&self) -> bool {
        true
    }

    fn endpoints(&self) -> Option<(Point2, Point2)> {
        None
    }

    fn bounds(&self) -> Bounds2 {
        Bounds2::around(&self.center, self.radius)
    }
}
