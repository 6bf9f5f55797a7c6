mod arrangement;
pub mod cycles;
mod faces;
mod materialize;
mod regions;

pub use arrangement::{flatten_sketch, ArrangementParams, BuildArrangement, EndpointFilter};
pub use cycles::{Cycle, CycleParams, CycleSearch, ExtractCycles};
pub use faces::{BuildFaces, FaceBuild, RegionFace, RegionFailure};
pub use materialize::{Materialize, OrientedShape3D, Region};
pub use regions::{FindRegions, RegionParams};
