mod snapshot;

pub use snapshot::{ArcRecord, CircleRecord, LineRecord, PointRecord, SketchSnapshot};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result, SketchError};
use crate::geometry::WorkingPlane;
use crate::math::arc_2d::{
    arc_from_center, arc_from_tangent, arc_from_three_points, ArcThroughPoints,
};
use crate::math::{Point2, Vector2, TOLERANCE};

/// Identity of a sketch entity, unique within one sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SketchId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchPoint {
    pub id: EntityId,
    pub position: Point2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchLine {
    pub id: EntityId,
    pub start: EntityId,
    pub end: EntityId,
    /// User-authored length annotation.
    pub length: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchCircle {
    pub id: EntityId,
    pub center: EntityId,
    pub radius: f64,
}

/// An arc around `center` from `start` to `end`.
///
/// The radius is the distance from center to start; the solver keeps `end`
/// on the same circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchArc {
    pub id: EntityId,
    pub center: EntityId,
    pub start: EntityId,
    pub end: EntityId,
    pub clockwise: bool,
}

/// Borrowed view of any sketch entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SketchEntity<'a> {
    Point(&'a SketchPoint),
    Line(&'a SketchLine),
    Circle(&'a SketchCircle),
    Arc(&'a SketchArc),
}

impl SketchEntity<'_> {
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            Self::Point(p) => p.id,
            Self::Line(l) => l.id,
            Self::Circle(c) => c.id,
            Self::Arc(a) => a.id,
        }
    }
}

/// A 2D sketch on a working plane.
///
/// Points carry plane-local coordinates; lines, circles and arcs reference
/// them by id. Edits come from the editor and solved coordinates from the
/// constraint solver. Every mutation bumps [`Sketch::revision`].
#[derive(Debug, Clone)]
pub struct Sketch {
    id: SketchId,
    plane: WorkingPlane,
    points: BTreeMap<EntityId, SketchPoint>,
    lines: BTreeMap<EntityId, SketchLine>,
    circles: BTreeMap<EntityId, SketchCircle>,
    arcs: BTreeMap<EntityId, SketchArc>,
    entity_id_counter: u64,
    revision: u64,
}

impl Sketch {
    /// Creates an empty sketch.
    #[must_use]
    pub fn new(id: SketchId, plane: WorkingPlane) -> Self {
        Self {
            id,
            plane,
            points: BTreeMap::new(),
            lines: BTreeMap::new(),
            circles: BTreeMap::new(),
            arcs: BTreeMap::new(),
            entity_id_counter: 0,
            revision: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> SketchId {
        self.id
    }

    #[must_use]
    pub fn plane(&self) -> &WorkingPlane {
        &self.plane
    }

    /// Counter bumped on every mutation; used to spot stale results.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Highest entity id ever assigned in this sketch.
    #[must_use]
    pub fn max_entity_id(&self) -> u64 {
        self.entity_id_counter
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
            && self.lines.is_empty()
            && self.circles.is_empty()
            && self.arcs.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &SketchPoint> {
        self.points.values()
    }

    pub fn lines(&self) -> impl Iterator<Item = &SketchLine> {
        self.lines.values()
    }

    pub fn circles(&self) -> impl Iterator<Item = &SketchCircle> {
        self.circles.values()
    }

    pub fn arcs(&self) -> impl Iterator<Item = &SketchArc> {
        self.arcs.values()
    }

    #[must_use]
    pub fn point(&self, id: EntityId) -> Option<&SketchPoint> {
        self.points.get(&id)
    }

    #[must_use]
    pub fn line(&self, id: EntityId) -> Option<&SketchLine> {
        self.lines.get(&id)
    }

    #[must_use]
    pub fn circle(&self, id: EntityId) -> Option<&SketchCircle> {
        self.circles.get(&id)
    }

    #[must_use]
    pub fn arc(&self, id: EntityId) -> Option<&SketchArc> {
        self.arcs.get(&id)
    }

    /// Looks up any entity by id.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<SketchEntity<'_>> {
        self.points
            .get(&id)
            .map(SketchEntity::Point)
            .or_else(|| self.lines.get(&id).map(SketchEntity::Line))
            .or_else(|| self.circles.get(&id).map(SketchEntity::Circle))
            .or_else(|| self.arcs.get(&id).map(SketchEntity::Arc))
    }

    /// Plane-local position of a point entity.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::EntityNotFound`] or [`SketchError::WrongEntityKind`]
    /// if `id` is not a point of this sketch.
    pub fn position(&self, id: EntityId) -> std::result::Result<Point2, SketchError> {
        if let Some(p) = self.points.get(&id) {
            return Ok(p.position);
        }
        if self.entity(id).is_some() {
            Err(SketchError::WrongEntityKind {
                id: id.0,
                expected: "point",
            })
        } else {
            Err(SketchError::EntityNotFound {
                kind: "point",
                id: id.0,
            })
        }
    }

    fn next_id(&mut self) -> EntityId {
        self.entity_id_counter += 1;
        EntityId(self.entity_id_counter)
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Adds a point and returns its id.
    pub fn add_point(&mut self, position: Point2) -> EntityId {
        let id = self.next_id();
        self.points.insert(id, SketchPoint { id, position });
        self.touch();
        id
    }

    /// Adds a line between two existing points.
    ///
    /// # Errors
    ///
    /// Returns an error if either point is missing or both ids are the same.
    pub fn add_line(&mut self, start: EntityId, end: EntityId) -> Result<EntityId> {
        self.position(start)?;
        self.position(end)?;
        if start == end {
            return Err(SketchError::DuplicateReference { id: start.0 }.into());
        }
        let id = self.next_id();
        self.lines.insert(
            id,
            SketchLine {
                id,
                start,
                end,
                length: None,
            },
        );
        self.touch();
        Ok(id)
    }

    /// Adds a circle around an existing center point.
    ///
    /// # Errors
    ///
    /// Returns an error if the center is missing or the radius is not positive.
    pub fn add_circle(&mut self, center: EntityId, radius: f64) -> Result<EntityId> {
        self.position(center)?;
        if radius.is_nan() || radius < TOLERANCE {
            return Err(GeometryError::NonPositiveRadius {
                operation: "add_circle",
                radius,
            }
            .into());
        }
        let id = self.next_id();
        self.circles.insert(id, SketchCircle { id, center, radius });
        self.touch();
        Ok(id)
    }

    /// Adds an arc around an existing center from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if a point is missing, referenced twice, or the
    /// start coincides with the center.
    pub fn add_arc(
        &mut self,
        center: EntityId,
        start: EntityId,
        end: EntityId,
        clockwise: bool,
    ) -> Result<EntityId> {
        let c = self.position(center)?;
        if center == start || center == end {
            return Err(SketchError::DuplicateReference { id: center.0 }.into());
        }
        self.check_arc_ends(&c, start, end)?;
        Ok(self.insert_arc(center, start, end, clockwise))
    }

    /// Validates arc endpoints against a center position.
    fn check_arc_ends(&self, center: &Point2, start: EntityId, end: EntityId) -> Result<()> {
        let s = self.position(start)?;
        self.position(end)?;
        if start == end {
            return Err(SketchError::DuplicateReference { id: start.0 }.into());
        }
        if (s - center).norm() < TOLERANCE {
            return Err(GeometryError::CoincidentCenters {
                operation: "add_arc",
            }
            .into());
        }
        Ok(())
    }

    fn insert_arc(
        &mut self,
        center: EntityId,
        start: EntityId,
        end: EntityId,
        clockwise: bool,
    ) -> EntityId {
        let id = self.next_id();
        self.arcs.insert(
            id,
            SketchArc {
                id,
                center,
                start,
                end,
                clockwise,
            },
        );
        self.touch();
        id
    }

    /// Adds the arc from `start` through `via` to `end`.
    ///
    /// A new point entity is created at the computed circle center.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint is missing or the three positions are
    /// collinear.
    pub fn add_arc_through(
        &mut self,
        start: EntityId,
        via: Point2,
        end: EntityId,
    ) -> Result<EntityId> {
        let s = self.position(start)?;
        let e = self.position(end)?;
        let arc = arc_from_three_points(&s, &via, &e)?;
        self.add_constructed_arc(start, end, &arc)
    }

    /// Adds the arc that leaves `start` along `direction` and ends at `end`.
    ///
    /// A new point entity is created at the computed circle center.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint is missing or `end` lies on the
    /// tangent line.
    pub fn add_arc_tangent(
        &mut self,
        start: EntityId,
        direction: &Vector2,
        end: EntityId,
    ) -> Result<EntityId> {
        let arc = arc_from_tangent(&self.position(start)?, direction, &self.position(end)?)?;
        self.add_constructed_arc(start, end, &arc)
    }

    fn add_constructed_arc(
        &mut self,
        start: EntityId,
        end: EntityId,
        arc: &ArcThroughPoints,
    ) -> Result<EntityId> {
        self.check_arc_ends(&arc.center, start, end)?;
        let center = self.add_point(arc.center);
        Ok(self.insert_arc(center, start, end, arc.clockwise))
    }

    /// Adds the arc around `center` from `start` to `end`.
    ///
    /// `hint_angle` selects which of the two candidate arcs is meant; without
    /// it the minor arc is used.
    ///
    /// # Errors
    ///
    /// Returns an error if a point is missing or the arc is degenerate.
    pub fn add_arc_around(
        &mut self,
        center: EntityId,
        start: EntityId,
        end: EntityId,
        hint_angle: Option<f64>,
    ) -> Result<EntityId> {
        let arc = arc_from_center(
            &self.position(center)?,
            &self.position(start)?,
            &self.position(end)?,
            hint_angle,
        )?;
        self.add_arc(center, start, end, arc.clockwise)
    }

    /// Moves a point, e.g. after a constraint solve.
    ///
    /// # Errors
    ///
    /// Returns an error if the point does not exist.
    pub fn move_point(&mut self, id: EntityId, position: Point2) -> Result<()> {
        let point = self.points.get_mut(&id).ok_or(SketchError::EntityNotFound {
            kind: "point",
            id: id.0,
        })?;
        point.position = position;
        self.touch();
        Ok(())
    }

    /// Applies a batch of solved point positions.
    ///
    /// # Errors
    ///
    /// Returns an error on the first unknown point; earlier moves stay applied.
    pub fn apply_solution<I>(&mut self, positions: I) -> Result<()>
    where
        I: IntoIterator<Item = (EntityId, Point2)>,
    {
        for (id, position) in positions {
            self.move_point(id, position)?;
        }
        Ok(())
    }

    /// Sets or clears a line's length annotation.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist.
    pub fn set_line_length(&mut self, id: EntityId, length: Option<f64>) -> Result<()> {
        let line = self.lines.get_mut(&id).ok_or(SketchError::EntityNotFound {
            kind: "line",
            id: id.0,
        })?;
        line.length = length;
        self.touch();
        Ok(())
    }

    /// Removes a point and every line, circle and arc that references it.
    ///
    /// Returns the ids of the dependents removed alongside the point.
    ///
    /// # Errors
    ///
    /// Returns an error if the point does not exist.
    pub fn remove_point(&mut self, id: EntityId) -> Result<Vec<EntityId>> {
        if self.points.remove(&id).is_none() {
            return Err(SketchError::EntityNotFound {
                kind: "point",
                id: id.0,
            }
            .into());
        }
        let mut removed = Vec::new();
        self.lines.retain(|&lid, l| {
            let keep = l.start != id && l.end != id;
            if !keep {
                removed.push(lid);
            }
            keep
        });
        self.circles.retain(|&cid, c| {
            let keep = c.center != id;
            if !keep {
                removed.push(cid);
            }
            keep
        });
        self.arcs.retain(|&aid, a| {
            let keep = a.center != id && a.start != id && a.end != id;
            if !keep {
                removed.push(aid);
            }
            keep
        });
        self.touch();
        Ok(removed)
    }

    /// Removes a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist.
    pub fn remove_line(&mut self, id: EntityId) -> Result<()> {
        self.lines.remove(&id).ok_or(SketchError::EntityNotFound {
            kind: "line",
            id: id.0,
        })?;
        self.touch();
        Ok(())
    }

    /// Removes a circle. Its center point stays.
    ///
    /// # Errors
    ///
    /// Returns an error if the circle does not exist.
    pub fn remove_circle(&mut self, id: EntityId) -> Result<()> {
        self.circles.remove(&id).ok_or(SketchError::EntityNotFound {
            kind: "circle",
            id: id.0,
        })?;
        self.touch();
        Ok(())
    }

    /// Removes an arc. Its points stay.
    ///
    /// # Errors
    ///
    /// Returns an error if the arc does not exist.
    pub fn remove_arc(&mut self, id: EntityId) -> Result<()> {
        self.arcs.remove(&id).ok_or(SketchError::EntityNotFound {
            kind: "arc",
            id: id.0,
        })?;
        self.touch();
        Ok(())
    }
}
