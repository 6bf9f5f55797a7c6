use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{Result, SketchError};
use crate::geometry::{PlaneOrientation, WorkingPlane};
use crate::math::{Point3, TOLERANCE};

use super::{EntityId, Sketch, SketchArc, SketchCircle, SketchId, SketchLine, SketchPoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub id: u64,
    pub p1_id: u64,
    pub p2_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
}

/// Circle record; `mid_pt_id` is the center point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleRecord {
    pub id: u64,
    pub mid_pt_id: u64,
    pub radius: f64,
}

/// Arc record; `mid_pt_id` is the center point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcRecord {
    pub id: u64,
    pub mid_pt_id: u64,
    pub start_id: u64,
    pub end_id: u64,
    #[serde(default)]
    pub clockwise: bool,
}

/// Serialized form of a sketch as the editor persists it.
///
/// Point coordinates are world-space; they are projected into the working
/// plane on load and lifted back on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SketchSnapshot {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub plane: PlaneOrientation,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub points: Vec<PointRecord>,
    #[serde(default)]
    pub lines: Vec<LineRecord>,
    #[serde(default)]
    pub circles: Vec<CircleRecord>,
    #[serde(default)]
    pub arcs: Vec<ArcRecord>,
    #[serde(default, rename = "entityIdCounter", alias = "entity_id_counter")]
    pub entity_id_counter: u64,
}

impl SketchSnapshot {
    /// Parses a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Snapshot`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SketchError::Snapshot(e).into())
    }

    /// Serializes the snapshot to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Snapshot`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| SketchError::Snapshot(e).into())
    }

    /// Builds a sketch from this snapshot.
    ///
    /// Entities that reference a missing point, or a point referenced twice,
    /// are logged and skipped. So are circles with a non-positive radius.
    #[must_use]
    pub fn to_sketch(&self) -> Sketch {
        let plane = WorkingPlane::new(self.plane, self.offset);
        let mut sketch = Sketch::new(SketchId(self.id), plane);

        let mut points = BTreeMap::new();
        for record in &self.points {
            let id = EntityId(record.id);
            let position = plane.to_2d(&Point3::new(record.x, record.y, record.z));
            points.insert(id, SketchPoint { id, position });
        }

        let resolve = |owner: u64, refs: &[u64]| -> bool {
            for (i, r) in refs.iter().enumerate() {
                if !points.contains_key(&EntityId(*r)) {
                    error!(entity = owner, point = r, "dangling point reference, entity skipped");
                    return false;
                }
                if refs[..i].contains(r) {
                    error!(entity = owner, point = r, "point referenced twice, entity skipped");
                    return false;
                }
            }
            true
        };

        let mut lines = BTreeMap::new();
        for record in &self.lines {
            if resolve(record.id, &[record.p1_id, record.p2_id]) {
                let id = EntityId(record.id);
                lines.insert(
                    id,
                    SketchLine {
                        id,
                        start: EntityId(record.p1_id),
                        end: EntityId(record.p2_id),
                        length: record.length,
                    },
                );
            }
        }

        let mut circles = BTreeMap::new();
        for record in &self.circles {
            if record.radius.is_nan() || record.radius < TOLERANCE {
                error!(
                    entity = record.id,
                    radius = record.radius,
                    "non-positive circle radius, entity skipped"
                );
                continue;
            }
            if resolve(record.id, &[record.mid_pt_id]) {
                let id = EntityId(record.id);
                circles.insert(
                    id,
                    SketchCircle {
                        id,
                        center: EntityId(record.mid_pt_id),
                        radius: record.radius,
                    },
                );
            }
        }

        let mut arcs = BTreeMap::new();
        for record in &self.arcs {
            if resolve(record.id, &[record.mid_pt_id, record.start_id, record.end_id]) {
                let id = EntityId(record.id);
                arcs.insert(
                    id,
                    SketchArc {
                        id,
                        center: EntityId(record.mid_pt_id),
                        start: EntityId(record.start_id),
                        end: EntityId(record.end_id),
                        clockwise: record.clockwise,
                    },
                );
            }
        }

        let max_seen = points
            .keys()
            .chain(lines.keys())
            .chain(circles.keys())
            .chain(arcs.keys())
            .map(|id| id.0)
            .max()
            .unwrap_or(0);

        sketch.points = points;
        sketch.lines = lines;
        sketch.circles = circles;
        sketch.arcs = arcs;
        sketch.entity_id_counter = self.entity_id_counter.max(max_seen);
        sketch
    }
}

impl From<&Sketch> for SketchSnapshot {
    fn from(sketch: &Sketch) -> Self {
        let plane = sketch.plane();
        Self {
            id: sketch.id().0,
            plane: plane.orientation,
            offset: plane.offset,
            points: sketch
                .points()
                .map(|p| {
                    let w = plane.to_3d(&p.position);
                    PointRecord {
                        id: p.id.0,
                        x: w.x,
                        y: w.y,
                        z: w.z,
                    }
                })
                .collect(),
            lines: sketch
                .lines()
                .map(|l| LineRecord {
                    id: l.id.0,
                    p1_id: l.start.0,
                    p2_id: l.end.0,
                    length: l.length,
                })
                .collect(),
            circles: sketch
                .circles()
                .map(|c| CircleRecord {
                    id: c.id.0,
                    mid_pt_id: c.center.0,
                    radius: c.radius,
                })
                .collect(),
            arcs: sketch
                .arcs()
                .map(|a| ArcRecord {
                    id: a.id.0,
                    mid_pt_id: a.center.0,
                    start_id: a.start.0,
                    end_id: a.end.0,
                    clockwise: a.clockwise,
                })
                .collect(),
            entity_id_counter: sketch.max_entity_id(),
        }
    }
}

impl Sketch {
    /// Parses a JSON snapshot into a sketch.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Snapshot`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(SketchSnapshot::from_json(json)?.to_sketch())
    }

    #[must_use]
    pub fn snapshot(&self) -> SketchSnapshot {
        SketchSnapshot::from(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SketchfaceError;
    use crate::math::Point2;

    const SQUARE_XZ: &str = r#"{
        "id": 7,
        "plane": "xz",
        "offset": 2.0,
        "points": [
            {"id": 1, "x": 0.0, "y": 2.0, "z": 0.0},
            {"id": 2, "x": 1.0, "y": 2.0, "z": 0.0},
            {"id": 3, "x": 1.0, "y": 2.0, "z": 1.0},
            {"id": 4, "x": 0.0, "y": 2.0, "z": 1.0}
        ],
        "lines": [
            {"id": 5, "p1_id": 1, "p2_id": 2},
            {"id": 6, "p1_id": 2, "p2_id": 3, "length": 1.0},
            {"id": 8, "p1_id": 3, "p2_id": 4},
            {"id": 9, "p1_id": 4, "p2_id": 1}
        ],
        "entityIdCounter": 9
    }"#;

    #[test]
    fn loads_points_projected_into_plane() {
        let sketch = Sketch::from_json(SQUARE_XZ).unwrap();
        assert_eq!(sketch.id(), SketchId(7));
        assert_eq!(sketch.plane().orientation, PlaneOrientation::Xz);
        assert_eq!(sketch.position(EntityId(3)).unwrap(), Point2::new(1.0, 1.0));
        assert_eq!(sketch.lines().count(), 4);
        assert_eq!(sketch.line(EntityId(6)).unwrap().length, Some(1.0));
        assert_eq!(sketch.max_entity_id(), 9);
    }

    #[test]
    fn dangling_references_are_skipped() {
        let json = r#"{
            "points": [{"id": 1, "x": 0.0, "y": 0.0}],
            "lines": [{"id": 2, "p1_id": 1, "p2_id": 40}],
            "circles": [{"id": 3, "mid_pt_id": 1, "radius": 1.5}],
            "arcs": [{"id": 4, "mid_pt_id": 1, "start_id": 1, "end_id": 1}]
        }"#;
        let sketch = Sketch::from_json(json).unwrap();
        assert_eq!(sketch.lines().count(), 0);
        assert_eq!(sketch.circles().count(), 1);
        assert_eq!(sketch.arcs().count(), 0);
        assert_eq!(sketch.max_entity_id(), 3);
    }

    #[test]
    fn snapshot_survives_json() {
        let mut sketch = Sketch::new(SketchId(3), WorkingPlane::new(PlaneOrientation::Yz, 1.0));
        let c = sketch.add_point(Point2::new(0.0, 0.0));
        let a = sketch.add_point(Point2::new(1.0, 0.0));
        let b = sketch.add_point(Point2::new(0.0, 1.0));
        sketch.add_arc(c, a, b, true).unwrap();
        sketch.add_circle(c, 4.0).unwrap();

        let json = sketch.snapshot().to_json().unwrap();
        assert!(json.contains("\"entityIdCounter\":5"));
        let restored = Sketch::from_json(&json).unwrap();
        assert_eq!(restored.snapshot(), sketch.snapshot());
        assert!(restored.arc(EntityId(4)).unwrap().clockwise);
    }

    #[test]
    fn malformed_json_is_a_snapshot_error() {
        assert!(matches!(
            Sketch::from_json("{\"points\": 3}").unwrap_err(),
            SketchfaceError::Sketch(SketchError::Snapshot(_))
        ));
    }
}
