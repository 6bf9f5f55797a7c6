pub mod curve;
pub mod plane;
pub mod shape;

pub use curve::{intersect, Arc, Bounds2, Circle, Curve, Primitive, Segment};
pub use plane::{PlaneOrientation, WorkingPlane};
pub use shape::{FlattenedShape, ShapeId, ShapeIdAllocator};
