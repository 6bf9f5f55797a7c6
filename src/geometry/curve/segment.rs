use crate::error::GeometryError;
use crate::math::{Point2, TOLERANCE};

use super::{Bounds2, Curve};

/// A bounded straight segment between two sketch points.
///
/// The parametric form is `P(t) = start + t * (end - start)` for `t ∈ [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start: Point2,
    end: Point2,
}

impl Segment {
    /// Creates a new segment.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroLength`] if the endpoints coincide.
    pub fn new(start: Point2, end: Point2) -> Result<Self, GeometryError> {
        if (end - start).norm() < TOLERANCE {
            return Err(GeometryError::ZeroLength { operation: "segment" });
        }
        Ok(Self { start, end })
    }

    /// Returns the start point.
    #[must_use]
    pub fn start(&self) -> &Point2 {
        &self.start
    }

    /// Returns the end point.
    #[must_use]
    pub fn end(&self) -> &Point2 {
        &self.end
    }

    /// Returns the segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Parameter of the orthogonal projection of `p` onto the supporting line.
    #[must_use]
    pub fn param_of(&self, p: &Point2) -> f64 {
        let d = self.end - self.start;
        (p - self.start).dot(&d) / d.norm_squared()
    }

    /// Splits the segment at `point`.
    ///
    /// Returns `None` when `point` is within `tol` of either endpoint or lies
    /// off the segment; otherwise both halves share `point` as an endpoint.
    #[must_use]
    pub fn split_at(&self, point: &Point2, tol: f64) -> Option<(Self, Self)> {
        if (point - self.start).norm() <= tol || (point - self.end).norm() <= tol {
            return None;
        }
        let t = self.param_of(point);
        if t <= 0.0 || t >= 1.0 {
            return None;
        }
        let foot = self.start + (self.end - self.start) * t;
        if (point - foot).norm() > tol {
            return None;
        }
        Some((
            Self {
                start: self.start,
                end: *point,
            },
            Self {
                start: *point,
                end: self.end,
            },
        ))
    }
}

impl Curve for Segment {
    fn point_at(&self, t: f64) -> Point2 {
        self.start + (self.end - self.start) * t
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn endpoints(&self) -> Option<(Point2, Point2)> {
        Some((self.start, self.end))
    }

    fn bounds(&self) -> Bounds2 {
        Bounds2::from_points(&self.start, &self.end)
    }
}
