use slotmap::SlotMap;

use crate::error::KernelError;
use crate::math::{Point3, Vector3, POINT_MERGE_TOLERANCE, TOLERANCE};

use super::{KernelResult, SolidKernel};

slotmap::new_key_type! {
    /// Unique identifier for an edge in the topology store.
    pub struct EdgeId;
}

slotmap::new_key_type! {
    /// Unique identifier for a wire in the topology store.
    pub struct WireId;
}

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
}

/// The geometric curve of an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeCurve {
    Line {
        start: Point3,
        end: Point3,
    },
    /// Arc through three points; `center` and `radius` are derived.
    Arc {
        start: Point3,
        middle: Point3,
        end: Point3,
        center: Point3,
        radius: f64,
    },
    Circle {
        center: Point3,
        radius: f64,
        normal: Vector3,
    },
}

impl EdgeCurve {
    /// Start and end points; `None` for closed curves.
    #[must_use]
    pub fn endpoints(&self) -> Option<(Point3, Point3)> {
        match self {
            Self::Line { start, end } | Self::Arc { start, end, .. } => Some((*start, *end)),
            Self::Circle { .. } => None,
        }
    }

    /// Points that pin down the curve's plane.
    fn support_points(&self) -> Vec<Point3> {
        match self {
            Self::Line { start, end } => vec![*start, *end],
            Self::Arc {
                start,
                middle,
                end,
                center,
                ..
            } => vec![*start, *middle, *end, *center],
            Self::Circle { center, .. } => vec![*center],
        }
    }
}

/// Data associated with a topological edge.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub curve: EdgeCurve,
}

/// Data associated with a topological wire.
///
/// Only closed wires are stored.
#[derive(Debug, Clone)]
pub struct WireData {
    pub edges: Vec<EdgeId>,
}

/// Data associated with a planar face.
#[derive(Debug, Clone)]
pub struct FaceData {
    pub outer_wire: WireId,
    /// Unit normal of the face plane.
    pub normal: Vector3,
}

/// Central arena that owns all kernel entities.
///
/// Entities reference each other via typed IDs (generational indices).
#[derive(Debug)]
pub struct TopologyStore {
    edges: SlotMap<EdgeId, EdgeData>,
    wires: SlotMap<WireId, WireData>,
    faces: SlotMap<FaceId, FaceData>,
    tolerance: f64,
}

impl Default for TopologyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyStore {
    /// Creates a new, empty store that joins wire endpoints within the
    /// sketch merge tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tolerance(POINT_MERGE_TOLERANCE)
    }

    #[must_use]
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            edges: SlotMap::with_key(),
            wires: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            tolerance,
        }
    }

    /// Returns the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> KernelResult<&EdgeData> {
        self.edges
            .get(id)
            .ok_or_else(|| KernelError::EntityNotFound("edge".into()))
    }

    /// Returns the wire data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wire(&self, id: WireId) -> KernelResult<&WireData> {
        self.wires
            .get(id)
            .ok_or_else(|| KernelError::EntityNotFound("wire".into()))
    }

    /// Returns the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> KernelResult<&FaceData> {
        self.faces
            .get(id)
            .ok_or_else(|| KernelError::EntityNotFound("face".into()))
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn same_point(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() <= self.tolerance
    }

    /// Whether every endpoint is shared by an even number of edge ends.
    fn is_closed_loop(&self, curves: &[&EdgeCurve]) -> bool {
        let mut ends: Vec<(Point3, usize)> = Vec::new();
        for curve in curves {
            let Some((a, b)) = curve.endpoints() else {
                continue;
            };
            for p in [a, b] {
                if let Some(entry) = ends.iter_mut().find(|(q, _)| self.same_point(q, &p)) {
                    entry.1 += 1;
                } else {
                    ends.push((p, 1));
                }
            }
        }
        !ends.is_empty() && ends.iter().all(|(_, n)| n % 2 == 0)
    }

    /// Normal of the plane through `points`, if they span one and all lie in it.
    fn fit_plane(&self, points: &[Point3], hint: Option<Vector3>) -> Option<Vector3> {
        let origin = *points.first()?;
        let normal = match hint {
            Some(n) => n,
            None => {
                let spread = points
                    .iter()
                    .map(|p| p - origin)
                    .find(|d| d.norm() > self.tolerance)?;
                points
                    .iter()
                    .map(|p| spread.cross(&(p - origin)))
                    .find(|n| n.norm() > TOLERANCE)?
            }
        }
        .try_normalize(TOLERANCE)?;
        points
            .iter()
            .all(|p| (p - origin).dot(&normal).abs() <= self.tolerance)
            .then_some(normal)
    }
}

impl SolidKernel for TopologyStore {
    type Edge = EdgeId;
    type Wire = WireId;
    type Face = FaceId;

    fn make_line_edge(&mut self, start: &Point3, end: &Point3) -> KernelResult<EdgeId> {
        if (end - start).norm() < TOLERANCE {
            return Err(KernelError::Rejected("zero-length line edge".into()));
        }
        Ok(self.edges.insert(EdgeData {
            curve: EdgeCurve::Line {
                start: *start,
                end: *end,
            },
        }))
    }

    fn make_arc_edge(
        &mut self,
        start: &Point3,
        middle: &Point3,
        end: &Point3,
    ) -> KernelResult<EdgeId> {
        // Circumcenter of the triangle (start, middle, end).
        let a = start - end;
        let b = middle - end;
        let axb = a.cross(&b);
        let denom = 2.0 * axb.norm_squared();
        if denom <= TOLERANCE * a.norm_squared() * b.norm_squared() {
            return Err(KernelError::Rejected("arc edge points are collinear".into()));
        }
        let center = end + (b * a.norm_squared() - a * b.norm_squared()).cross(&axb) / denom;
        let radius = (start - center).norm();
        Ok(self.edges.insert(EdgeData {
            curve: EdgeCurve::Arc {
                start: *start,
                middle: *middle,
                end: *end,
                center,
                radius,
            },
        }))
    }

    fn make_circle_edge(
        &mut self,
        radius: f64,
        center: &Point3,
        direction: &Vector3,
    ) -> KernelResult<EdgeId> {
        if radius.is_nan() || radius < TOLERANCE {
            return Err(KernelError::Rejected(format!(
                "circle edge radius {radius} must be positive"
            )));
        }
        let normal = direction
            .try_normalize(TOLERANCE)
            .ok_or_else(|| KernelError::Rejected("circle edge direction is zero".into()))?;
        Ok(self.edges.insert(EdgeData {
            curve: EdgeCurve::Circle {
                center: *center,
                radius,
                normal,
            },
        }))
    }

    fn combine_edges_into_wire(&mut self, edges: &[EdgeId]) -> KernelResult<WireId> {
        if edges.is_empty() {
            return Err(KernelError::EmptyWire);
        }
        let curves = edges
            .iter()
            .map(|&id| self.edge(id).map(|e| &e.curve))
            .collect::<KernelResult<Vec<_>>>()?;

        let closed_edges = curves.iter().filter(|c| c.endpoints().is_none()).count();
        if closed_edges > 0 {
            if curves.len() > 1 {
                return Err(KernelError::MixedClosedEdge);
            }
        } else if !self.is_closed_loop(&curves) {
            return Err(KernelError::WireNotClosed);
        }

        Ok(self.wires.insert(WireData {
            edges: edges.to_vec(),
        }))
    }

    fn create_face_from_wire(&mut self, wire: &WireId, planar: bool) -> KernelResult<FaceId> {
        if !planar {
            return Err(KernelError::Rejected(
                "only planar faces are supported".into(),
            ));
        }
        let data = self.wire(*wire)?;
        let mut points = Vec::new();
        let mut hint = None;
        for &id in &data.edges {
            let curve = &self.edge(id)?.curve;
            if let EdgeCurve::Circle { normal, .. } = curve {
                hint = Some(*normal);
            }
            points.extend(curve.support_points());
        }
        let normal = self.fit_plane(&points, hint).ok_or(KernelError::NonPlanar)?;
        Ok(self.faces.insert(FaceData {
            outer_wire: *wire,
            normal,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn closed_triangle_makes_face() {
        let mut store = TopologyStore::new();
        let e1 = store.make_line_edge(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0)).unwrap();
        let e2 = store.make_line_edge(&p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0)).unwrap();
        let e3 = store.make_line_edge(&p(0.0, 1.0, 0.0), &p(0.0, 0.0, 0.0)).unwrap();
        let wire = store.combine_edges_into_wire(&[e1, e2, e3]).unwrap();
        let face = store.create_face_from_wire(&wire, true).unwrap();
        let normal = store.face(face).unwrap().normal;
        assert_abs_diff_eq!(normal.z.abs(), 1.0, epsilon = 1e-12);
        assert_eq!(store.face_count(), 1);
    }

    #[test]
    fn edges_may_be_listed_in_any_direction() {
        let mut store = TopologyStore::new();
        let e1 = store.make_line_edge(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0)).unwrap();
        let e2 = store.make_line_edge(&p(0.0, 1.0, 0.0), &p(1.0, 0.0, 0.0)).unwrap();
        let e3 = store.make_line_edge(&p(0.0, 0.0, 0.0), &p(0.0, 1.0, 0.0)).unwrap();
        assert!(store.combine_edges_into_wire(&[e1, e2, e3]).is_ok());
    }

    #[test]
    fn open_wire_is_rejected() {
        let mut store = TopologyStore::new();
        let e1 = store.make_line_edge(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0)).unwrap();
        let e2 = store.make_line_edge(&p(1.0, 0.0, 0.0), &p(1.0, 1.0, 0.0)).unwrap();
        assert!(matches!(
            store.combine_edges_into_wire(&[e1, e2]),
            Err(KernelError::WireNotClosed)
        ));
        assert!(matches!(
            store.combine_edges_into_wire(&[]),
            Err(KernelError::EmptyWire)
        ));
    }

    #[test]
    fn arc_edge_center_is_derived() {
        let mut store = TopologyStore::new();
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let e = store
            .make_arc_edge(&p(1.0, 0.0, 2.0), &p(h, h, 2.0), &p(0.0, 1.0, 2.0))
            .unwrap();
        let EdgeCurve::Arc { center, radius, .. } = store.edge(e).unwrap().curve else {
            panic!("expected arc");
        };
        assert_abs_diff_eq!(center, p(0.0, 0.0, 2.0), epsilon = 1e-12);
        assert_abs_diff_eq!(radius, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn collinear_arc_edge_is_rejected() {
        let mut store = TopologyStore::new();
        assert!(matches!(
            store.make_arc_edge(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(2.0, 0.0, 0.0)),
            Err(KernelError::Rejected(_))
        ));
    }

    #[test]
    fn half_disc_wire() {
        let mut store = TopologyStore::new();
        let arc = store
            .make_arc_edge(&p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0), &p(-1.0, 0.0, 0.0))
            .unwrap();
        let line = store.make_line_edge(&p(-1.0, 0.0, 0.0), &p(1.0, 0.0, 0.0)).unwrap();
        let wire = store.combine_edges_into_wire(&[arc, line]).unwrap();
        assert!(store.create_face_from_wire(&wire, true).is_ok());
    }

    #[test]
    fn circle_wire_stands_alone() {
        let mut store = TopologyStore::new();
        let c = store
            .make_circle_edge(2.0, &p(0.0, 0.0, 0.0), &Vector3::y())
            .unwrap();
        let wire = store.combine_edges_into_wire(&[c]).unwrap();
        let face = store.create_face_from_wire(&wire, true).unwrap();
        assert_eq!(store.face(face).unwrap().normal, Vector3::y());

        let l = store.make_line_edge(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0)).unwrap();
        assert!(matches!(
            store.combine_edges_into_wire(&[c, l]),
            Err(KernelError::MixedClosedEdge)
        ));
    }

    #[test]
    fn non_planar_wire_has_no_face() {
        let mut store = TopologyStore::new();
        let pts = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 1.0),
            p(0.0, 1.0, 0.0),
        ];
        let edges: Vec<EdgeId> = (0..4)
            .map(|i| store.make_line_edge(&pts[i], &pts[(i + 1) % 4]).unwrap())
            .collect();
        let wire = store.combine_edges_into_wire(&edges).unwrap();
        assert!(matches!(
            store.create_face_from_wire(&wire, true),
            Err(KernelError::NonPlanar)
        ));
        assert!(matches!(
            store.create_face_from_wire(&wire, false),
            Err(KernelError::Rejected(_))
        ));
    }

    #[test]
    fn stale_ids_are_not_found() {
        let store = TopologyStore::new();
        assert!(matches!(
            store.wire(WireId::default()),
            Err(KernelError::EntityNotFound(_))
        ));
    }
}
