use thiserror::Error;

/// Top-level error type for sketch face extraction.
#[derive(Debug, Error)]
pub enum SketchfaceError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Sketch(#[from] SketchError),

    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Errors raised while constructing geometric primitives.
///
/// Every variant names the operation that failed so callers can log and skip
/// the offending candidate.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("{operation}: points are collinear")]
    Collinear { operation: &'static str },

    #[error("{operation}: zero-length input")]
    ZeroLength { operation: &'static str },

    #[error("{operation}: center coincides with a point on the circle")]
    CoincidentCenters { operation: &'static str },

    #[error("{operation}: radius {radius} must be positive")]
    NonPositiveRadius {
        operation: &'static str,
        radius: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors related to the editable sketch model.
#[derive(Debug, Error)]
pub enum SketchError {
    #[error("{kind} {id} not found")]
    EntityNotFound { kind: &'static str, id: u64 },

    #[error("entity {id} is not a {expected}")]
    WrongEntityKind { id: u64, expected: &'static str },

    #[error("entity {id} referenced twice by the same primitive")]
    DuplicateReference { id: u64 },

    #[error("invalid sketch snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Errors reported by a solid-modelling kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("kernel entity not found: {0}")]
    EntityNotFound(String),

    #[error("wire has no edges")]
    EmptyWire,

    #[error("wire is not closed")]
    WireNotClosed,

    #[error("closed edge cannot be combined with other edges")]
    MixedClosedEdge,

    #[error("wire does not lie in a single plane")]
    NonPlanar,

    #[error("kernel rejected operation: {0}")]
    Rejected(String),
}

/// Convenience type alias for results using [`SketchfaceError`].
pub type Result<T> = std::result::Result<T, SketchfaceError>;
