mod arc;
mod circle;
mod segment;

pub use arc::Arc;
pub use circle::Circle;
pub use segment::Segment;

use std::f64::consts::TAU;

use crate::math::intersect_2d::{
    arc_arc_intersect_2d, segment_arc_intersect_2d, segment_segment_intersect_2d,
};
use crate::math::{angle_of, Point2};

/// Axis-aligned bounding box in the sketch plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2 {
    pub min: Point2,
    pub max: Point2,
}

impl Bounds2 {
    /// Box spanning two corner points in any order.
    #[must_use]
    pub fn from_points(a: &Point2, b: &Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Box enclosing the circle `(center, radius)`.
    #[must_use]
    pub fn around(center: &Point2, radius: f64) -> Self {
        Self {
            min: Point2::new(center.x - radius, center.y - radius),
            max: Point2::new(center.x + radius, center.y + radius),
        }
    }

    /// Whether the two boxes overlap once each is grown by `tol`.
    #[must_use]
    pub fn overlaps(&self, other: &Self, tol: f64) -> bool {
        self.min.x <= other.max.x + tol
            && other.min.x <= self.max.x + tol
            && self.min.y <= other.max.y + tol
            && other.min.y <= self.max.y + tol
    }
}

/// Trait for bounded parametric curves in the sketch plane.
pub trait Curve {
    /// Evaluates the curve at parameter `t`.
    fn point_at(&self, t: f64) -> Point2;

    /// Returns whether the curve is closed.
    fn is_closed(&self) -> bool;

    /// Declared start and end points, `None` for curves without a seam.
    fn endpoints(&self) -> Option<(Point2, Point2)>;

    /// Conservative bounding box.
    fn bounds(&self) -> Bounds2;
}

/// One sketch primitive: a segment, a full circle, or an arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Segment(Segment),
    Circle(Circle),
    Arc(Arc),
}

impl Primitive {
    fn as_curve(&self) -> &dyn Curve {
        match self {
            Self::Segment(s) => s,
            Self::Circle(c) => c,
            Self::Arc(a) => a,
        }
    }

    /// Declared endpoints; circles have none.
    #[must_use]
    pub fn endpoints(&self) -> Option<(Point2, Point2)> {
        self.as_curve().endpoints()
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds2 {
        self.as_curve().bounds()
    }

    /// Whether the primitive returns to its own start: circles and
    /// full-turn arcs.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.as_curve().is_closed()
    }

    /// Whether `p` lies within `tol` of one of this primitive's own endpoints.
    #[must_use]
    pub fn has_endpoint_near(&self, p: &Point2, tol: f64) -> bool {
        self.endpoints()
            .is_some_and(|(a, b)| (p - a).norm() <= tol || (p - b).norm() <= tol)
    }

    /// Position of `p` along the primitive's natural parameter.
    ///
    /// Segments use the projection parameter, arcs their arc parameter, and
    /// circles the absolute angle. Used only to order split points.
    #[must_use]
    pub fn sort_key(&self, p: &Point2) -> f64 {
        match self {
            Self::Segment(s) => s.param_of(p),
            Self::Circle(c) => angle_of(c.center(), p),
            Self::Arc(a) => a.param_of(p).unwrap_or(f64::INFINITY),
        }
    }
}

/// Circle-like view of a primitive as `(center, radius, start_angle, sweep)`.
fn as_arc_params(p: &Primitive) -> Option<(Point2, f64, f64, f64)> {
    match p {
        Primitive::Segment(_) => None,
        Primitive::Circle(c) => Some((*c.center(), c.radius(), 0.0, TAU)),
        Primitive::Arc(a) => Some((*a.center(), a.radius(), a.start_angle(), a.sweep())),
    }
}

/// Computes all intersection points between two primitives.
///
/// Commutative up to point order. Returns 0 or 1 point for two segments and
/// up to 2 points for every pairing that involves a circle or arc.
#[must_use]
pub fn intersect(a: &Primitive, b: &Primitive) -> Vec<Point2> {
    match (a, b) {
        (Primitive::Segment(sa), Primitive::Segment(sb)) => {
            segment_segment_intersect_2d(sa.start(), sa.end(), sb.start(), sb.end())
                .map(|(p, _, _)| vec![p])
                .unwrap_or_default()
        }
        (Primitive::Segment(s), other) | (other, Primitive::Segment(s)) => {
            let Some((center, radius, start, sweep)) = as_arc_params(other) else {
                return Vec::new();
            };
            segment_arc_intersect_2d(s.start(), s.end(), &center, radius, start, sweep)
                .into_iter()
                .map(|(p, _, _)| p)
                .collect()
        }
        _ => {
            let (Some((c1, r1, s1, w1)), Some((c2, r2, s2, w2))) =
                (as_arc_params(a), as_arc_params(b))
            else {
                return Vec::new();
            };
            arc_arc_intersect_2d(&c1, r1, s1, w1, &c2, r2, s2, w2)
                .into_iter()
                .map(|(p, _, _)| p)
                .collect()
        }
    }
}
