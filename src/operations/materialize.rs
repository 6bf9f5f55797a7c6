use serde::Serialize;

use crate::geometry::{Arc, FlattenedShape, Primitive, Segment, WorkingPlane};
use crate::math::{Point2, Point3};
use crate::sketch::{Sketch, SketchId};

use super::cycles::Cycle;

/// One boundary piece of a region, lifted into world space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrientedShape3D {
    Line {
        start: Point3,
        end: Point3,
    },
    /// `center` is the circle center; `arc_midpoint` lies on the arc path,
    /// halfway between start and end.
    Arc {
        start: Point3,
        end: Point3,
        center: Point3,
        center_2d: Point2,
        arc_midpoint: Point3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        clockwise: bool,
    },
    Circle {
        center: Point3,
        center_2d: Point2,
        radius: f64,
    },
}

impl OrientedShape3D {
    fn from_segment(plane: &WorkingPlane, s: &Segment) -> Self {
        Self::Line {
            start: plane.to_3d(s.start()),
            end: plane.to_3d(s.end()),
        }
    }

    fn from_arc(plane: &WorkingPlane, a: &Arc) -> Self {
        Self::Arc {
            start: plane.to_3d(&a.start_point()),
            end: plane.to_3d(&a.end_point()),
            center: plane.to_3d(a.center()),
            center_2d: *a.center(),
            arc_midpoint: plane.to_3d(&a.midpoint()),
            radius: a.radius(),
            start_angle: a.start_angle(),
            end_angle: a.end_angle(),
            clockwise: !a.is_ccw(),
        }
    }

    fn from_turn(plane: &WorkingPlane, center: &Point2, radius: f64) -> Self {
        Self::Circle {
            center: plane.to_3d(center),
            center_2d: *center,
            radius,
        }
    }

    /// Lifts a flattened shape through `plane`.
    #[must_use]
    pub fn from_shape(plane: &WorkingPlane, shape: &FlattenedShape) -> Self {
        match &shape.primitive {
            Primitive::Segment(s) => Self::from_segment(plane, s),
            // An unsplit full turn has no distinct endpoints for an arc edge.
            Primitive::Arc(a) if shape.primitive.is_closed() => {
                Self::from_turn(plane, a.center(), a.radius())
            }
            Primitive::Arc(a) => Self::from_arc(plane, a),
            Primitive::Circle(c) => Self::from_turn(plane, c.center(), c.radius()),
        }
    }
}

/// A closed region of a sketch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    /// Boundary pieces in discovery order, each independently oriented.
    pub boundary: Vec<OrientedShape3D>,
    /// Hole boundaries; always empty, nested cycles are reported as separate
    /// regions.
    pub inner_cycles: Vec<Vec<OrientedShape3D>>,
    /// Unsigned enclosed area.
    pub area: f64,
    pub sketch_ref: SketchId,
    /// Position of the region in the sketch's region list.
    pub index: usize,
}

/// Turns cycles into world-space regions.
pub struct Materialize<'a> {
    sketch_ref: SketchId,
    plane: WorkingPlane,
    cycles: &'a [Cycle],
}

impl<'a> Materialize<'a> {
    #[must_use]
    pub fn new(sketch: &Sketch, cycles: &'a [Cycle]) -> Self {
        Self {
            sketch_ref: sketch.id(),
            plane: *sketch.plane(),
            cycles,
        }
    }

    #[must_use]
    pub fn execute(&self) -> Vec<Region> {
        self.cycles
            .iter()
            .enumerate()
            .map(|(index, cycle)| Region {
                boundary: cycle
                    .shapes
                    .iter()
                    .map(|s| OrientedShape3D::from_shape(&self.plane, s))
                    .collect(),
                inner_cycles: Vec::new(),
                area: cycle.area.abs(),
                sketch_ref: self.sketch_ref,
                index,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, PlaneOrientation, ShapeId};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn quarter_arc() -> FlattenedShape {
        FlattenedShape::new(
            ShapeId(3),
            Primitive::Arc(Arc::new(Point2::origin(), 1.0, 0.0, FRAC_PI_2).unwrap()),
        )
    }

    #[test]
    fn quarter_arc_fields() {
        let shape = OrientedShape3D::from_shape(&WorkingPlane::default(), &quarter_arc());
        let OrientedShape3D::Arc {
            start,
            end,
            center,
            arc_midpoint,
            radius,
            start_angle,
            end_angle,
            clockwise,
            ..
        } = shape
        else {
            panic!("expected arc");
        };
        assert_abs_diff_eq!(radius, 1.0);
        assert!(!clockwise);
        assert_abs_diff_eq!(start_angle, 0.0);
        assert_abs_diff_eq!(end_angle, FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(start, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(end, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_eq!(center, Point3::origin());
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert_abs_diff_eq!(arc_midpoint, Point3::new(h, h, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn reversed_quarter_arc_is_clockwise() {
        let arc = Arc::new(Point2::origin(), 1.0, FRAC_PI_2, -FRAC_PI_2).unwrap();
        let shape = OrientedShape3D::from_shape(
            &WorkingPlane::default(),
            &FlattenedShape::new(ShapeId(1), Primitive::Arc(arc)),
        );
        let OrientedShape3D::Arc {
            start_angle,
            end_angle,
            clockwise,
            ..
        } = shape
        else {
            panic!("expected arc");
        };
        assert!(clockwise);
        assert_abs_diff_eq!(start_angle, FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(end_angle, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn full_arc_is_emitted_as_circle() {
        let full = Circle::new(Point2::new(1.0, 2.0), 3.0).unwrap().to_full_arc(0.4);
        let shape = OrientedShape3D::from_shape(
            &WorkingPlane::new(PlaneOrientation::Xz, 1.0),
            &FlattenedShape::new(ShapeId(1), Primitive::Arc(full)),
        );
        assert_eq!(
            shape,
            OrientedShape3D::Circle {
                center: Point3::new(1.0, 1.0, 2.0),
                center_2d: Point2::new(1.0, 2.0),
                radius: 3.0,
            }
        );
    }

    #[test]
    fn regions_are_indexed_contiguously() {
        let sketch = Sketch::new(SketchId(11), WorkingPlane::default());
        let cycles = vec![
            Cycle {
                nodes: vec![],
                shapes: vec![FlattenedShape::new(
                    ShapeId(1),
                    Primitive::Circle(Circle::new(Point2::origin(), 1.0).unwrap()),
                )],
                area: PI,
            },
            Cycle {
                nodes: vec![1, 2, 3],
                shapes: vec![quarter_arc()],
                area: -0.25,
            },
        ];
        let regions = Materialize::new(&sketch, &cycles).execute();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].index, 0);
        assert_eq!(regions[1].index, 1);
        assert_eq!(regions[1].sketch_ref, SketchId(11));
        assert_abs_diff_eq!(regions[1].area, 0.25);
        assert!(regions.iter().all(|r| r.inner_cycles.is_empty()));
    }

    #[test]
    fn region_serializes_tagged_shapes() {
        let plane = WorkingPlane::default();
        let region = Region {
            boundary: vec![OrientedShape3D::from_shape(&plane, &quarter_arc())],
            inner_cycles: vec![],
            area: 1.0,
            sketch_ref: SketchId(1),
            index: 0,
        };
        let json = serde_json::to_string(&region).unwrap();
        assert!(json.contains("\"type\":\"arc\""));
        assert!(json.contains("\"arc_midpoint\""));
    }
}
