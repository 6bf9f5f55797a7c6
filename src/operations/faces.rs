use tracing::warn;

use crate::error::KernelError;
use crate::kernel::{KernelResult, SolidKernel};
use crate::math::Vector3;
use crate::sketch::{Sketch, SketchId};

use super::materialize::{OrientedShape3D, Region};

/// A region together with the face built for it.
#[derive(Debug, Clone)]
pub struct RegionFace<F> {
    pub region: Region,
    pub face: F,
}

/// A region the kernel could not turn into a face.
#[derive(Debug)]
pub struct RegionFailure {
    pub index: usize,
    pub error: KernelError,
}

/// Outcome of one face-building pass.
#[derive(Debug)]
pub struct FaceBuild<F> {
    pub sketch_ref: SketchId,
    /// Sketch revision the pass was computed from.
    pub revision: u64,
    pub faces: Vec<RegionFace<F>>,
    pub failures: Vec<RegionFailure>,
}

impl<F> FaceBuild<F> {
    /// Whether `sketch` is still the snapshot this pass was built from.
    ///
    /// Results from an older revision should be discarded.
    #[must_use]
    pub fn is_current(&self, sketch: &Sketch) -> bool {
        sketch.id() == self.sketch_ref && sketch.revision() == self.revision
    }
}

/// Builds one planar face per region through a [`SolidKernel`].
///
/// Each region issues one edge call per boundary shape, one wire call and one
/// face call. A kernel failure only drops the affected region.
pub struct BuildFaces<'a> {
    regions: &'a [Region],
    sketch_ref: SketchId,
    revision: u64,
    normal: Vector3,
}

impl<'a> BuildFaces<'a> {
    #[must_use]
    pub fn new(sketch: &Sketch, regions: &'a [Region]) -> Self {
        Self {
            regions,
            sketch_ref: sketch.id(),
            revision: sketch.revision(),
            normal: sketch.plane().normal(),
        }
    }

    pub fn execute<K: SolidKernel>(&self, kernel: &mut K) -> FaceBuild<K::Face> {
        let mut faces = Vec::with_capacity(self.regions.len());
        let mut failures = Vec::new();

        for region in self.regions {
            match self.build_region(kernel, region) {
                Ok(face) => faces.push(RegionFace {
                    region: region.clone(),
                    face,
                }),
                Err(error) => {
                    warn!(region = region.index, error = %error, "face construction failed");
                    failures.push(RegionFailure {
                        index: region.index,
                        error,
                    });
                }
            }
        }

        FaceBuild {
            sketch_ref: self.sketch_ref,
            revision: self.revision,
            faces,
            failures,
        }
    }

    fn build_region<K: SolidKernel>(
        &self,
        kernel: &mut K,
        region: &Region,
    ) -> KernelResult<K::Face> {
        let edges = region
            .boundary
            .iter()
            .map(|shape| match shape {
                OrientedShape3D::Line { start, end } => kernel.make_line_edge(start, end),
                OrientedShape3D::Arc {
                    start,
                    arc_midpoint,
                    end,
                    ..
                } => kernel.make_arc_edge(start, arc_midpoint, end),
                OrientedShape3D::Circle { center, radius, .. } => {
                    kernel.make_circle_edge(*radius, center, &self.normal)
                }
            })
            .collect::<KernelResult<Vec<_>>>()?;
        let wire = kernel.combine_edges_into_wire(&edges)?;
        kernel.create_face_from_wire(&wire, true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{PlaneOrientation, WorkingPlane};
    use crate::kernel::{FaceId, TopologyStore};
    use crate::math::{Point2, Point3};
    use crate::operations::FindRegions;

    /// Delegates to a store but rejects every circle edge.
    struct NoCircles(TopologyStore);

    impl SolidKernel for NoCircles {
        type Edge = <TopologyStore as SolidKernel>::Edge;
        type Wire = <TopologyStore as SolidKernel>::Wire;
        type Face = FaceId;

        fn make_line_edge(&mut self, start: &Point3, end: &Point3) -> KernelResult<Self::Edge> {
            self.0.make_line_edge(start, end)
        }

        fn make_arc_edge(
            &mut self,
            start: &Point3,
            middle: &Point3,
            end: &Point3,
        ) -> KernelResult<Self::Edge> {
            self.0.make_arc_edge(start, middle, end)
        }

        fn make_circle_edge(
            &mut self,
            _radius: f64,
            _center: &Point3,
            _direction: &Vector3,
        ) -> KernelResult<Self::Edge> {
            Err(KernelError::Rejected("circles unsupported".into()))
        }

        fn combine_edges_into_wire(&mut self, edges: &[Self::Edge]) -> KernelResult<Self::Wire> {
            self.0.combine_edges_into_wire(edges)
        }

        fn create_face_from_wire(
            &mut self,
            wire: &Self::Wire,
            planar: bool,
        ) -> KernelResult<Self::Face> {
            self.0.create_face_from_wire(wire, planar)
        }
    }

    /// A unit square next to a detached circle.
    fn square_and_circle(plane: WorkingPlane) -> Sketch {
        let mut sketch = Sketch::new(SketchId(2), plane);
        let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .map(|(x, y)| sketch.add_point(Point2::new(x, y)));
        for i in 0..4 {
            sketch.add_line(corners[i], corners[(i + 1) % 4]).unwrap();
        }
        let c = sketch.add_point(Point2::new(5.0, 5.0));
        sketch.add_circle(c, 1.0).unwrap();
        sketch
    }

    #[test]
    fn every_region_gets_a_face() {
        let sketch = square_and_circle(WorkingPlane::new(PlaneOrientation::Xz, 3.0));
        let regions = FindRegions::new(&sketch).execute();
        assert_eq!(regions.len(), 2);

        let mut store = TopologyStore::new();
        let build = BuildFaces::new(&sketch, &regions).execute(&mut store);
        assert_eq!(build.faces.len(), 2);
        assert!(build.failures.is_empty());
        for rf in &build.faces {
            let normal = store.face(rf.face).unwrap().normal;
            assert!((normal.y.abs() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn kernel_failure_is_isolated_to_its_region() {
        let sketch = square_and_circle(WorkingPlane::default());
        let regions = FindRegions::new(&sketch).execute();

        let mut kernel = NoCircles(TopologyStore::new());
        let build = BuildFaces::new(&sketch, &regions).execute(&mut kernel);
        assert_eq!(build.faces.len(), 1);
        assert_eq!(build.failures.len(), 1);
        assert!(matches!(build.failures[0].error, KernelError::Rejected(_)));
        assert_eq!(build.faces[0].region.boundary.len(), 4);
    }

    #[test]
    fn edits_make_results_stale() {
        let mut sketch = square_and_circle(WorkingPlane::default());
        let regions = FindRegions::new(&sketch).execute();
        let build = BuildFaces::new(&sketch, &regions).execute(&mut TopologyStore::new());
        assert!(build.is_current(&sketch));

        sketch.add_point(Point2::new(9.0, 9.0));
        assert!(!build.is_current(&sketch));
    }
}
