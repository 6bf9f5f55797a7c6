use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::{
    intersect, Arc, Circle, FlattenedShape, Primitive, Segment, ShapeId, ShapeIdAllocator,
};
use crate::math::{angle_of, Point2, POINT_MERGE_TOLERANCE};
use crate::sketch::{Sketch, SketchArc, SketchCircle, SketchLine};

/// Which shape of an intersecting pair checks its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointFilter {
    /// Each shape ignores intersection points at its own endpoints, so a
    /// T-junction splits the crossed shape but not the touching one.
    #[default]
    Symmetric,
    /// Only the lower-id shape of a pair is checked, and only when it is a
    /// segment; a point it rejects is dropped for both shapes.
    LegacyFirstSegment,
}

/// Parameters for [`BuildArrangement`].
#[derive(Debug, Clone, Copy)]
pub struct ArrangementParams {
    /// Distance under which an intersection counts as an existing endpoint.
    pub merge_tolerance: f64,
    pub endpoint_filter: EndpointFilter,
}

impl Default for ArrangementParams {
    fn default() -> Self {
        Self {
            merge_tolerance: POINT_MERGE_TOLERANCE,
            endpoint_filter: EndpointFilter::default(),
        }
    }
}

/// Splits every sketch primitive at its intersections with the others.
///
/// Shapes without interior intersections pass through unchanged with their
/// original id. Split shapes are replaced by an ordered run of pieces that
/// cover the original exactly; each piece gets a fresh id above the sketch's
/// entity counter.
#[derive(Debug)]
pub struct BuildArrangement {
    shapes: Vec<FlattenedShape>,
    id_seed: u64,
    params: ArrangementParams,
}

impl BuildArrangement {
    /// Creates the operation for all lines, circles and arcs of `sketch`.
    #[must_use]
    pub fn new(sketch: &Sketch) -> Self {
        Self::from_shapes(flatten_sketch(sketch), sketch.max_entity_id())
    }

    /// Creates the operation for pre-flattened shapes.
    ///
    /// Fresh ids start above both `id_seed` and the largest input id.
    #[must_use]
    pub fn from_shapes(mut shapes: Vec<FlattenedShape>, id_seed: u64) -> Self {
        shapes.sort_by_key(|s| s.id);
        let max_id = shapes.last().map_or(0, |s| s.id.0);
        Self {
            shapes,
            id_seed: id_seed.max(max_id),
            params: ArrangementParams::default(),
        }
    }

    /// Sets custom merge tolerance and endpoint filtering.
    #[must_use]
    pub fn with_params(mut self, params: ArrangementParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the arrangement pass.
    #[must_use]
    pub fn execute(&self) -> Vec<FlattenedShape> {
        let index = self.collect_intersections();
        let mut ids = ShapeIdAllocator::new(self.id_seed);
        let mut out = Vec::with_capacity(self.shapes.len());

        for shape in &self.shapes {
            match index.get(&shape.id) {
                Some(points) => {
                    out.extend(split_shape(shape, points, self.params.merge_tolerance, &mut ids));
                }
                None => out.push(*shape),
            }
        }
        out
    }

    /// Intersection points recorded against each affected shape.
    fn collect_intersections(&self) -> BTreeMap<ShapeId, Vec<Point2>> {
        let tol = self.params.merge_tolerance;
        let mut index: BTreeMap<ShapeId, Vec<Point2>> = BTreeMap::new();

        for (i, a) in self.shapes.iter().enumerate() {
            let a_bounds = a.primitive.bounds();
            for b in &self.shapes[i + 1..] {
                if !a_bounds.overlaps(&b.primitive.bounds(), tol) {
                    continue;
                }
                let hits = intersect(&a.primitive, &b.primitive);
                if hits.is_empty() {
                    continue;
                }
                let (for_a, for_b): (Vec<Point2>, Vec<Point2>) = match self.params.endpoint_filter {
                    EndpointFilter::Symmetric => (
                        hits.iter()
                            .filter(|p| !a.primitive.has_endpoint_near(p, tol))
                            .copied()
                            .collect(),
                        hits.iter()
                            .filter(|p| !b.primitive.has_endpoint_near(p, tol))
                            .copied()
                            .collect(),
                    ),
                    EndpointFilter::LegacyFirstSegment => {
                        let kept: Vec<Point2> = hits
                            .into_iter()
                            .filter(|p| {
                                !matches!(a.primitive, Primitive::Segment(_))
                                    || !a.primitive.has_endpoint_near(p, tol)
                            })
                            .collect();
                        (kept.clone(), kept)
                    }
                };
                if !for_a.is_empty() {
                    index.entry(a.id).or_default().extend(for_a);
                }
                if !for_b.is_empty() {
                    index.entry(b.id).or_default().extend(for_b);
                }
            }
        }
        index
    }
}

/// Converts the sketch's lines, circles and arcs into flattened shapes.
///
/// Entities whose geometry is degenerate are logged and skipped. The result
/// is ordered by entity id.
#[must_use]
pub fn flatten_sketch(sketch: &Sketch) -> Vec<FlattenedShape> {
    let mut shapes = Vec::new();

    for line in sketch.lines() {
        match segment_of(sketch, line) {
            Ok(s) => shapes.push(FlattenedShape::new(ShapeId(line.id.0), Primitive::Segment(s))),
            Err(e) => warn!(entity = %line.id, error = %e, "skipping line"),
        }
    }
    for circle in sketch.circles() {
        match circle_of(sketch, circle) {
            Ok(c) => shapes.push(FlattenedShape::new(ShapeId(circle.id.0), Primitive::Circle(c))),
            Err(e) => warn!(entity = %circle.id, error = %e, "skipping circle"),
        }
    }
    for arc in sketch.arcs() {
        match arc_of(sketch, arc) {
            Ok(a) => shapes.push(FlattenedShape::new(ShapeId(arc.id.0), Primitive::Arc(a))),
            Err(e) => warn!(entity = %arc.id, error = %e, "skipping arc"),
        }
    }

    shapes.sort_by_key(|s| s.id);
    shapes
}

fn segment_of(sketch: &Sketch, line: &SketchLine) -> Result<Segment> {
    Ok(Segment::new(
        sketch.position(line.start)?,
        sketch.position(line.end)?,
    )?)
}

fn circle_of(sketch: &Sketch, circle: &SketchCircle) -> Result<Circle> {
    Ok(Circle::new(sketch.position(circle.center)?, circle.radius)?)
}

/// The arc's radius is taken from its start point; the end point only
/// contributes its angle.
fn arc_of(sketch: &Sketch, arc: &SketchArc) -> Result<Arc> {
    let center = sketch.position(arc.center)?;
    let start = sketch.position(arc.start)?;
    let end = sketch.position(arc.end)?;
    Ok(Arc::from_angles(
        center,
        (start - center).norm(),
        angle_of(&center, &start),
        angle_of(&center, &end),
        !arc.clockwise,
    )?)
}

/// Splits one affected shape at its recorded points.
fn split_shape(
    shape: &FlattenedShape,
    points: &[Point2],
    tol: f64,
    ids: &mut ShapeIdAllocator,
) -> Vec<FlattenedShape> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| {
        shape
            .primitive
            .sort_key(a)
            .total_cmp(&shape.primitive.sort_key(b))
    });
    sorted.dedup_by(|a, b| (*a - *b).norm() <= tol);

    let pieces = match shape.primitive {
        Primitive::Segment(s) => {
            fold_splits(shape.id, s, &sorted, tol, Segment::split_at, Primitive::Segment)
        }
        Primitive::Arc(a) => fold_splits(shape.id, a, &sorted, tol, Arc::split_at, Primitive::Arc),
        Primitive::Circle(c) => {
            // A circle has no natural start; seam it at the first point.
            let Some(first) = sorted.first() else {
                return vec![*shape];
            };
            let full = c.to_full_arc(angle_of(c.center(), first));
            fold_splits(shape.id, full, &sorted[1..], tol, Arc::split_at, Primitive::Arc)
        }
    };

    pieces
        .into_iter()
        .map(|p| FlattenedShape::new(ids.next_id(), p))
        .collect()
}

/// Repeatedly splits the trailing piece at each point in order.
fn fold_splits<T: Copy>(
    id: ShapeId,
    first: T,
    points: &[Point2],
    tol: f64,
    split: fn(&T, &Point2, f64) -> Option<(T, T)>,
    wrap: fn(T) -> Primitive,
) -> Vec<Primitive> {
    let mut pieces = Vec::with_capacity(points.len() + 1);
    let mut rest = first;
    for point in points {
        if let Some((head, tail)) = split(&rest, point, tol) {
            pieces.push(wrap(head));
            rest = tail;
        } else if wrap(rest).has_endpoint_near(point, tol) {
            debug!(shape = %id, point = ?point, "split point at piece endpoint");
        } else {
            warn!(shape = %id, point = ?point, "intersection not interior to shape, split skipped");
        }
    }
    pieces.push(wrap(rest));
    pieces
}
