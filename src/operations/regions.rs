use tracing::debug;

use crate::sketch::Sketch;

use super::arrangement::{ArrangementParams, BuildArrangement};
use super::cycles::{CycleParams, ExtractCycles};
use super::materialize::{Materialize, Region};

/// Parameters for the whole region pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionParams {
    pub arrangement: ArrangementParams,
    pub cycles: CycleParams,
}

/// Finds every closed region of a sketch.
///
/// Runs the arrangement, cycle extraction and materialization passes in
/// sequence. Malformed input yields fewer regions, never an error.
pub struct FindRegions<'a> {
    sketch: &'a Sketch,
    params: RegionParams,
}

impl<'a> FindRegions<'a> {
    #[must_use]
    pub fn new(sketch: &'a Sketch) -> Self {
        Self {
            sketch,
            params: RegionParams::default(),
        }
    }

    /// Sets custom parameters for every pass.
    #[must_use]
    pub fn with_params(mut self, params: RegionParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn execute(&self) -> Vec<Region> {
        let shapes = BuildArrangement::new(self.sketch)
            .with_params(self.params.arrangement)
            .execute();
        let cycles = ExtractCycles::new(&shapes)
            .with_params(self.params.cycles)
            .execute();
        debug!(
            sketch = self.sketch.id().0,
            shapes = shapes.len(),
            regions = cycles.len(),
            "regions extracted"
        );
        Materialize::new(self.sketch, &cycles).execute()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::WorkingPlane;
    use crate::math::Point2;
    use crate::operations::{CycleSearch, EndpointFilter, OrientedShape3D};
    use crate::sketch::{SketchId, SketchSnapshot};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn sketch() -> Sketch {
        Sketch::new(SketchId(1), WorkingPlane::default())
    }

    #[test]
    fn empty_sketch_has_no_regions() {
        init_tracing();
        assert!(FindRegions::new(&sketch()).execute().is_empty());
    }

    #[test]
    fn square_region() {
        init_tracing();
        let mut s = sketch();
        let p = [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]
            .map(|(x, y)| s.add_point(Point2::new(x, y)));
        for i in 0..4 {
            s.add_line(p[i], p[(i + 1) % 4]).unwrap();
        }
        let regions = FindRegions::new(&s).execute();
        assert_eq!(regions.len(), 1);
        assert_abs_diff_eq!(regions[0].area, 4.0, epsilon = 1e-12);
        assert_eq!(regions[0].boundary.len(), 4);
        assert!(regions[0]
            .boundary
            .iter()
            .all(|b| matches!(b, OrientedShape3D::Line { .. })));
    }

    #[test]
    fn arc_closed_by_line() {
        init_tracing();
        let mut s = sketch();
        let a = s.add_point(Point2::new(1.0, 0.0));
        let b = s.add_point(Point2::new(-1.0, 0.0));
        s.add_arc_through(a, Point2::new(0.0, 1.0), b).unwrap();
        s.add_line(b, a).unwrap();
        let regions = FindRegions::new(&s).execute();
        assert_eq!(regions.len(), 1);
        assert_abs_diff_eq!(regions[0].area, PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn cross_inside_circle() {
        init_tracing();
        let mut s = sketch();
        let c = s.add_point(Point2::origin());
        s.add_circle(c, 1.0).unwrap();
        let ends = [(-2.0, 0.0), (2.0, 0.0), (0.0, -2.0), (0.0, 2.0)]
            .map(|(x, y)| s.add_point(Point2::new(x, y)));
        s.add_line(ends[0], ends[1]).unwrap();
        s.add_line(ends[2], ends[3]).unwrap();
        let regions = FindRegions::new(&s).execute();
        // Cycle rank is 4. Each cycle encloses whole quadrants and together
        // they touch every quadrant.
        assert_eq!(regions.len(), 4);
        let quarter = PI / 4.0;
        for r in &regions {
            let quadrants = (r.area / quarter).round();
            assert!((1.0..=4.0).contains(&quadrants));
            assert_abs_diff_eq!(r.area, quadrants * quarter, epsilon = 1e-9);
        }
        let total: f64 = regions.iter().map(|r| r.area).sum();
        assert!(total >= PI - 1e-9);
        for (i, r) in regions.iter().enumerate() {
            assert_eq!(r.index, i);
        }
    }

    #[test]
    fn disconnected_squares_need_all_components() {
        init_tracing();
        let mut s = sketch();
        for offset in [0.0, 10.0] {
            let p = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
                .map(|(x, y)| s.add_point(Point2::new(x + offset, y)));
            for i in 0..4 {
                s.add_line(p[i], p[(i + 1) % 4]).unwrap();
            }
        }
        assert_eq!(FindRegions::new(&s).execute().len(), 2);

        let legacy = RegionParams {
            arrangement: ArrangementParams {
                endpoint_filter: EndpointFilter::LegacyFirstSegment,
                ..ArrangementParams::default()
            },
            cycles: CycleParams {
                search: CycleSearch::FirstNodeOnly,
                ..CycleParams::default()
            },
        };
        assert_eq!(FindRegions::new(&s).with_params(legacy).execute().len(), 1);
    }

    #[test]
    fn snapshot_of_three_circles() {
        init_tracing();
        let json = r#"{
            "id": 4,
            "plane": "xy",
            "points": [
                {"id": 1, "x": 0.0, "y": 0.0, "z": 0.0},
                {"id": 2, "x": 2.0, "y": 0.0, "z": 0.0},
                {"id": 3, "x": 1.0, "y": 1.5, "z": 0.0}
            ],
            "circles": [
                {"id": 4, "mid_pt_id": 1, "radius": 2.0},
                {"id": 5, "mid_pt_id": 2, "radius": 2.0},
                {"id": 6, "mid_pt_id": 3, "radius": 2.0}
            ],
            "entityIdCounter": 6
        }"#;
        let s = SketchSnapshot::from_json(json).unwrap().to_sketch();
        let regions = FindRegions::new(&s).execute();
        assert_eq!(regions.len(), 7);
        assert!(regions.iter().all(|r| r.sketch_ref == SketchId(4)));
        assert!(regions.iter().all(|r| r.area > 0.0));
    }

    #[test]
    fn degenerate_entities_are_skipped() {
        init_tracing();
        let mut s = sketch();
        let a = s.add_point(Point2::new(0.0, 0.0));
        let b = s.add_point(Point2::new(1.0, 0.0));
        s.add_line(a, b).unwrap();
        // Solver collapses the line onto one point.
        s.move_point(b, Point2::new(0.0, 0.0)).unwrap();
        let c = s.add_point(Point2::new(3.0, 3.0));
        s.add_circle(c, 0.5).unwrap();
        let regions = FindRegions::new(&s).execute();
        assert_eq!(regions.len(), 1);
        assert!(matches!(
            regions[0].boundary[0],
            OrientedShape3D::Circle { .. }
        ));
    }
}
