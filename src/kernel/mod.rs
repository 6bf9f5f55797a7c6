mod store;

pub use store::{EdgeCurve, EdgeData, EdgeId, FaceData, FaceId, TopologyStore, WireData, WireId};

use crate::error::KernelError;
use crate::math::{Point3, Vector3};

/// Result type for kernel calls.
pub type KernelResult<T> = std::result::Result<T, KernelError>;

/// Edge, wire and face construction as the region pass needs it.
///
/// Handles are opaque to the caller. Each call is independent; a failure is
/// reported for that call only and leaves earlier handles valid.
pub trait SolidKernel {
    type Edge;
    type Wire;
    type Face;

    /// Straight edge between two points.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel rejects the edge.
    fn make_line_edge(&mut self, start: &Point3, end: &Point3) -> KernelResult<Self::Edge>;

    /// Circular edge from `start` through `middle` to `end`.
    ///
    /// `middle` lies on the arc path, it is not the circle center.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel rejects the edge.
    fn make_arc_edge(
        &mut self,
        start: &Point3,
        middle: &Point3,
        end: &Point3,
    ) -> KernelResult<Self::Edge>;

    /// Closed circular edge around `direction`.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel rejects the edge.
    fn make_circle_edge(
        &mut self,
        radius: f64,
        center: &Point3,
        direction: &Vector3,
    ) -> KernelResult<Self::Edge>;

    /// Joins edges into one wire.
    ///
    /// # Errors
    ///
    /// Returns an error if the edges do not form a closed loop.
    fn combine_edges_into_wire(&mut self, edges: &[Self::Edge]) -> KernelResult<Self::Wire>;

    /// Fills a wire with a face.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel cannot build the face.
    fn create_face_from_wire(&mut self, wire: &Self::Wire, planar: bool)
        -> KernelResult<Self::Face>;
}
