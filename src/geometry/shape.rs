use std::fmt;

use serde::{Deserialize, Serialize};

use super::curve::Primitive;

/// Identity of a flattened shape.
///
/// Shapes that survive the arrangement untouched keep their sketch entity id;
/// split pieces get synthetic ids allocated above the sketch's id counter, so
/// the two ranges never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out synthetic shape ids above a seed value.
#[derive(Debug, Clone)]
pub struct ShapeIdAllocator {
    last: u64,
}

impl ShapeIdAllocator {
    /// Creates an allocator whose first id is `seed + 1`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { last: seed }
    }

    pub fn next_id(&mut self) -> ShapeId {
        self.last += 1;
        ShapeId(self.last)
    }
}

/// A primitive tagged with a shape id.
///
/// After the arrangement pass, no two flattened shapes cross except at shared
/// endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlattenedShape {
    pub id: ShapeId,
    pub primitive: Primitive,
}

impl FlattenedShape {
    #[must_use]
    pub fn new(id: ShapeId, primitive: Primitive) -> Self {
        Self { id, primitive }
    }
}
