use std::f64::consts::{PI, TAU};

use super::{angle_of, normalize_angle, point_on_circle, Point2, Vector2, TOLERANCE};
use crate::error::GeometryError;

/// Result of a three-point arc construction.
///
/// Angles are normalized to `[0, 2π)`. The arc runs from `start_angle` to
/// `end_angle`, clockwise when `clockwise` is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcThroughPoints {
    pub center: Point2,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub clockwise: bool,
}

impl ArcThroughPoints {
    /// Signed sweep from start to end (positive = counter-clockwise).
    #[must_use]
    pub fn sweep(&self) -> f64 {
        signed_sweep(self.start_angle, self.end_angle, self.clockwise)
    }

    /// Point on the arc path halfway between the start and end angles.
    #[must_use]
    pub fn arc_midpoint(&self) -> Point2 {
        point_on_circle(
            &self.center,
            self.radius,
            self.start_angle + self.sweep() * 0.5,
        )
    }
}

/// Builds the arc through `start`, `middle` and `end`.
///
/// The circle center is the intersection of the perpendicular bisectors of
/// the two chords; the radius is measured from that center to `start`. The
/// arc runs counter-clockwise exactly when the increasing-angle sweep from
/// `start` to `end` passes through `middle`. The other constructors here all
/// end in this one.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroLength`] if any two points coincide and
/// [`GeometryError::Collinear`] if the three points lie on one line.
pub fn arc_from_three_points(
    start: &Point2,
    middle: &Point2,
    end: &Point2,
) -> Result<ArcThroughPoints, GeometryError> {
    const OPERATION: &str = "arc_from_three_points";

    let ab = middle - start;
    let ac = end - start;
    let bc = end - middle;
    let (lab, lac, lbc) = (ab.norm(), ac.norm(), bc.norm());
    if lab < TOLERANCE || lac < TOLERANCE || lbc < TOLERANCE {
        return Err(GeometryError::ZeroLength {
            operation: OPERATION,
        });
    }

    let cross = ab.x * ac.y - ab.y * ac.x;
    if cross.abs() <= 1e-12 * lab * lac {
        return Err(GeometryError::Collinear {
            operation: OPERATION,
        });
    }

    // Circumcenter relative to `start`.
    let d = 2.0 * cross;
    let ab_sq = ab.norm_squared();
    let ac_sq = ac.norm_squared();
    let ux = (ac.y * ab_sq - ab.y * ac_sq) / d;
    let uy = (ab.x * ac_sq - ac.x * ab_sq) / d;
    let center = Point2::new(start.x + ux, start.y + uy);
    let radius = (start - center).norm();

    let start_angle = angle_of(&center, start);
    let end_angle = angle_of(&center, end);
    let middle_angle = angle_of(&center, middle);

    let clockwise = !ccw_sweep_contains(start_angle, end_angle, middle_angle);

    Ok(ArcThroughPoints {
        center,
        radius,
        start_angle,
        end_angle,
        clockwise,
    })
}

/// Builds the arc around `center` from `start` to `end`.
///
/// `hint_angle` picks which of the two candidate arcs is meant: the result
/// passes through that angle. Without a hint the minor arc is chosen. `end`
/// is projected onto the circle through `start`.
///
/// # Errors
///
/// Returns an error if `start` coincides with `center`, if `start` and `end`
/// sit at the same angle, or if the hint lands on an endpoint.
pub fn arc_from_center(
    center: &Point2,
    start: &Point2,
    end: &Point2,
    hint_angle: Option<f64>,
) -> Result<ArcThroughPoints, GeometryError> {
    const OPERATION: &str = "arc_from_center";

    let radius = (start - center).norm();
    if radius < TOLERANCE || (end - center).norm() < TOLERANCE {
        return Err(GeometryError::CoincidentCenters {
            operation: OPERATION,
        });
    }

    let start_angle = angle_of(center, start);
    let end_angle = angle_of(center, end);
    let mut delta = normalize_angle(end_angle - start_angle);
    if delta < TOLERANCE || delta > TAU - TOLERANCE {
        return Err(GeometryError::Degenerate(format!(
            "{OPERATION}: start and end share an angle"
        )));
    }

    let middle_angle = if let Some(hint) = hint_angle {
        normalize_angle(hint)
    } else {
        if delta > PI {
            delta -= TAU;
        }
        start_angle + delta * 0.5
    };

    let middle = point_on_circle(center, radius, middle_angle);
    let end = point_on_circle(center, radius, end_angle);
    arc_from_three_points(start, &middle, &end)
}

/// Builds the arc leaving `start` along `direction` and ending at `end`.
///
/// The circle is the unique one tangent to `direction` at `start` that also
/// passes through `end`.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroLength`] for a zero direction or coincident
/// endpoints, and [`GeometryError::Collinear`] when `end` lies on the tangent
/// line (the arc degenerates to a segment).
pub fn arc_from_tangent(
    start: &Point2,
    direction: &Vector2,
    end: &Point2,
) -> Result<ArcThroughPoints, GeometryError> {
    const OPERATION: &str = "arc_from_tangent";

    let dir_len = direction.norm();
    let chord = end - start;
    if dir_len < TOLERANCE || chord.norm() < TOLERANCE {
        return Err(GeometryError::ZeroLength {
            operation: OPERATION,
        });
    }
    let dir = direction / dir_len;
    let normal = Vector2::new(-dir.y, dir.x);

    let denom = 2.0 * normal.dot(&chord);
    if denom.abs() <= 1e-12 * chord.norm() {
        return Err(GeometryError::Collinear {
            operation: OPERATION,
        });
    }
    // Signed distance along the left normal from start to the center.
    let t = chord.norm_squared() / denom;
    let center = start + normal * t;
    let radius = t.abs();

    let start_angle = angle_of(&center, start);
    let end_angle = angle_of(&center, end);
    // Center on the left of the travel direction means counter-clockwise.
    let sweep = signed_sweep(start_angle, end_angle, t < 0.0);

    let middle = point_on_circle(&center, radius, start_angle + sweep * 0.5);
    arc_from_three_points(start, &middle, end)
}

/// Whether the counter-clockwise sweep from `start` to `end` passes `angle`.
#[must_use]
pub fn ccw_sweep_contains(start: f64, end: f64, angle: f64) -> bool {
    let span = normalize_angle(end - start);
    let offset = normalize_angle(angle - start);
    if span < TOLERANCE {
        // Coincident endpoints: the full circle.
        return true;
    }
    offset <= span
}

/// Signed sweep from `start` to `end` in the given orientation.
///
/// Coincident angles yield a full turn.
#[must_use]
pub fn signed_sweep(start: f64, end: f64, clockwise: bool) -> f64 {
    if clockwise {
        let s = normalize_angle(start - end);
        if s < TOLERANCE {
            -TAU
        } else {
            -s
        }
    } else {
        let s = normalize_angle(end - start);
        if s < TOLERANCE {
            TAU
        } else {
            s
        }
    }
}
