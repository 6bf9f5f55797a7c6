pub mod error;
pub mod geometry;
pub mod kernel;
pub mod math;
pub mod operations;
pub mod sketch;

pub use error::{Result, SketchfaceError};
