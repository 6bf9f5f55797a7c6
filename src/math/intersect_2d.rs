use std::f64::consts::TAU;

use super::{Point2, TOLERANCE};

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are the parameters
/// along `a0→a1` and `b0→b1`, both in `[0, 1]`. Parallel and collinear
/// segments report no intersection.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;

    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() <= TOLERANCE * da.norm() * db.norm() {
        return None;
    }

    let d = b0 - a0;
    let t = (d.x * db.y - d.y * db.x) / cross;
    let u = (d.x * da.y - d.y * da.x) / cross;

    // Small epsilon so touching endpoints still count.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t = t.clamp(0.0, 1.0);
        Some((a0 + da * t, t, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Intersection of a line segment with a circular arc in 2D.
///
/// The arc has `center`, `radius`, `start_angle` and signed `sweep`
/// (positive = counter-clockwise). A full circle is an arc with `|sweep| = 2π`.
///
/// Returns `(point, t_seg, t_arc)` triples where both parameters lie in `[0, 1]`.
#[must_use]
pub fn segment_arc_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    center: &Point2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
) -> Vec<(Point2, f64, f64)> {
    let mut results = Vec::new();
    if radius < TOLERANCE || sweep.abs() < TOLERANCE {
        return results;
    }

    let d = a1 - a0;
    let seg_len_sq = d.norm_squared();
    if seg_len_sq < TOLERANCE * TOLERANCE {
        return results;
    }

    // Substitute the parametric segment into the circle equation:
    // |a0 + t*d - c|² = r²
    let f = a0 - center;
    let a = seg_len_sq;
    let b = 2.0 * f.dot(&d);
    let c = f.norm_squared() - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < -TOLERANCE * a {
        return results;
    }
    let disc_sqrt = discriminant.max(0.0).sqrt();

    let t_roots = if disc_sqrt < TOLERANCE * 100.0 * a.sqrt() {
        // Tangent: single root.
        vec![-b / (2.0 * a)]
    } else {
        vec![(-b - disc_sqrt) / (2.0 * a), (-b + disc_sqrt) / (2.0 * a)]
    };

    let eps = TOLERANCE;
    for t_seg in t_roots {
        if t_seg < -eps || t_seg > 1.0 + eps {
            continue;
        }
        let t_seg = t_seg.clamp(0.0, 1.0);
        let p = a0 + d * t_seg;

        let angle = (p.y - center.y).atan2(p.x - center.x);
        if let Some(t_arc) = angle_to_arc_param(angle, start_angle, sweep) {
            results.push((p, t_seg, t_arc));
        }
    }

    results
}

/// Intersection of two circular arcs in 2D.
///
/// Each arc is given as `(center, radius, start_angle, sweep)`. Concentric
/// arcs report no intersection, including the overlapping same-radius case.
///
/// Returns `(point, t1, t2)` triples where `t1` and `t2` are arc parameters in `[0, 1]`.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn arc_arc_intersect_2d(
    c1: &Point2,
    r1: f64,
    start1: f64,
    sweep1: f64,
    c2: &Point2,
    r2: f64,
    start2: f64,
    sweep2: f64,
) -> Vec<(Point2, f64, f64)> {
    let mut results = Vec::new();
    if r1 < TOLERANCE || r2 < TOLERANCE {
        return results;
    }

    let delta = c2 - c1;
    let dist_sq = delta.norm_squared();
    let dist = dist_sq.sqrt();
    if dist < TOLERANCE {
        return results;
    }

    let scale = r1.max(r2).max(1.0);
    let eps = TOLERANCE * 100.0 * scale;

    let sum = r1 + r2;
    let diff = (r1 - r2).abs();
    if dist > sum + eps || dist < diff - eps {
        return results;
    }

    // Distance from c1 along c1→c2 to the radical line.
    let a = (r1 * r1 - r2 * r2 + dist_sq) / (2.0 * dist);
    let h_sq = r1 * r1 - a * a;
    if h_sq < -eps * scale {
        return results;
    }
    let h = h_sq.max(0.0).sqrt();

    let dir = delta / dist;
    let mid = c1 + dir * a;
    let perp = nalgebra::Vector2::new(-dir.y, dir.x);

    let candidates = if h < eps {
        vec![mid]
    } else {
        vec![mid + perp * h, mid - perp * h]
    };

    for p in candidates {
        let angle1 = (p.y - c1.y).atan2(p.x - c1.x);
        let angle2 = (p.y - c2.y).atan2(p.x - c2.x);

        let t1 = angle_to_arc_param(angle1, start1, sweep1);
        let t2 = angle_to_arc_param(angle2, start2, sweep2);

        if let (Some(t1), Some(t2)) = (t1, t2) {
            let d1 = (p - c1).norm();
            let d2 = (p - c2).norm();
            if (d1 - r1).abs() < eps && (d2 - r2).abs() < eps {
                results.push((p, t1, t2));
            }
        }
    }

    results
}

/// Converts an absolute angle to an arc parameter `t` in `[0, 1]`.
///
/// Returns `None` if the angle is not within the arc's angular range.
#[must_use]
pub fn angle_to_arc_param(angle: f64, start_angle: f64, sweep: f64) -> Option<f64> {
    if sweep.abs() < TOLERANCE {
        return None;
    }
    let eps = TOLERANCE * 100.0;

    // Angular offset from start in the sweep direction, in [0, 2π).
    let mut delta = (angle - start_angle).rem_euclid(TAU);
    if sweep < 0.0 {
        delta = (TAU - delta).rem_euclid(TAU);
    }
    // Points just before the start wrap to ~2π; pull them back.
    if delta > TAU - eps && sweep.abs() < TAU - eps {
        delta -= TAU;
    }

    let t = delta / sweep.abs();
    if t >= -eps && t <= 1.0 + eps {
        Some(t.clamp(0.0, 1.0))
    } else {
        None
    }
}
