use std::collections::HashMap;

use tracing::warn;

use crate::geometry::{Arc, FlattenedShape, Primitive};
use crate::math::area_2d::{arc_area_term, segment_area_term};
use crate::math::Point2;

/// Tolerance-aware point deduplication.
///
/// Points are bucketed in a uniform grid whose cell size equals the merge
/// tolerance, so any point within tolerance of a stored one lives in the same
/// or a neighbouring cell. Node ids start at 1 and the first inserted point
/// of a cluster wins.
#[derive(Debug)]
pub struct PointIndex {
    tolerance: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
    points: Vec<Point2>,
}

impl PointIndex {
    /// Creates an empty index merging points closer than `tolerance`.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            cells: HashMap::new(),
            points: Vec::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_of(&self, p: &Point2) -> (i64, i64) {
        (
            (p.x / self.tolerance).floor() as i64,
            (p.y / self.tolerance).floor() as i64,
        )
    }

    /// Returns the node id of a stored point within tolerance of `p`, or
    /// stores `p` under a new id.
    pub fn find_or_insert(&mut self, p: &Point2) -> usize {
        let (cx, cy) = self.cell_of(p);
        let mut best: Option<usize> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let cell = (cx.saturating_add(dx), cy.saturating_add(dy));
                let Some(ids) = self.cells.get(&cell) else {
                    continue;
                };
                for &id in ids {
                    if (self.points[id - 1] - p).norm() <= self.tolerance
                        && best.is_none_or(|b| id < b)
                    {
                        best = Some(id);
                    }
                }
            }
        }
        if let Some(id) = best {
            return id;
        }
        self.points.push(*p);
        let id = self.points.len();
        self.cells.entry((cx, cy)).or_default().push(id);
        id
    }

    /// Position of a node; `id` must come from this index.
    #[must_use]
    pub fn point(&self, id: usize) -> Option<&Point2> {
        id.checked_sub(1).and_then(|i| self.points.get(i))
    }

    /// Number of distinct nodes stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Path an edge follows between its two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgePath {
    Line,
    /// Circular path leaving the origin node at `start_angle`.
    Arc {
        center: Point2,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
}

impl EdgePath {
    fn reversed(self) -> Self {
        match self {
            Self::Line => Self::Line,
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => Self::Arc {
                center,
                radius,
                start_angle: start_angle + sweep,
                sweep: -sweep,
            },
        }
    }
}

/// A directed view of an undirected edge, stored in the origin's adjacency.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// Shared by both directions of the same edge.
    pub edge: usize,
    pub to: usize,
    /// Index of the realizing shape in the graph's shape list.
    pub shape: usize,
    pub path: EdgePath,
}

/// Node/edge graph of an arrangement.
///
/// Segments contribute one edge; arcs contribute two, joined at a node placed
/// halfway along the arc. Whole circles contribute nothing and are kept aside.
#[derive(Debug)]
pub struct ArrangementGraph {
    nodes: PointIndex,
    adjacency: Vec<Vec<HalfEdge>>,
    edge_count: usize,
    shapes: Vec<FlattenedShape>,
    circles: Vec<FlattenedShape>,
}

impl ArrangementGraph {
    /// Builds the graph for the given shapes, merging endpoints within
    /// `tolerance`.
    #[must_use]
    pub fn build(shapes: &[FlattenedShape], tolerance: f64) -> Self {
        let mut graph = Self {
            nodes: PointIndex::new(tolerance),
            // Slot 0 is unused so node ids index directly.
            adjacency: vec![Vec::new()],
            edge_count: 0,
            shapes: Vec::with_capacity(shapes.len()),
            circles: Vec::new(),
        };
        for shape in shapes {
            match shape.primitive {
                Primitive::Circle(_) => graph.circles.push(*shape),
                Primitive::Segment(s) => {
                    let index = graph.push_shape(shape);
                    graph.add_edge(s.start(), s.end(), index, EdgePath::Line);
                }
                Primitive::Arc(a) => {
                    let index = graph.push_shape(shape);
                    graph.add_arc(&a, index);
                }
            }
        }
        graph
    }

    fn push_shape(&mut self, shape: &FlattenedShape) -> usize {
        self.shapes.push(*shape);
        self.shapes.len() - 1
    }

    fn node(&mut self, p: &Point2) -> usize {
        let id = self.nodes.find_or_insert(p);
        if id >= self.adjacency.len() {
            self.adjacency.resize_with(id + 1, Vec::new);
        }
        id
    }

    fn add_arc(&mut self, arc: &Arc, shape: usize) {
        let half = arc.sweep() * 0.5;
        let center = *arc.center();
        let radius = arc.radius();
        let first = EdgePath::Arc {
            center,
            radius,
            start_angle: arc.start_angle(),
            sweep: half,
        };
        let second = EdgePath::Arc {
            center,
            radius,
            start_angle: arc.start_angle() + half,
            sweep: half,
        };
        let mid = arc.midpoint();
        self.add_edge(&arc.start_point(), &mid, shape, first);
        self.add_edge(&mid, &arc.end_point(), shape, second);
    }

    fn add_edge(&mut self, a: &Point2, b: &Point2, shape: usize, path: EdgePath) {
        let from = self.node(a);
        let to = self.node(b);
        if from == to {
            warn!(shape = %self.shapes[shape].id, "edge collapses to one node, skipped");
            return;
        }
        let edge = self.edge_count;
        self.edge_count += 1;
        self.adjacency[from].push(HalfEdge {
            edge,
            to,
            shape,
            path,
        });
        self.adjacency[to].push(HalfEdge {
            edge,
            to: from,
            shape,
            path: path.reversed(),
        });
    }

    /// Number of nodes; ids run from 1 to this value.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Outgoing half-edges of `node`, empty for unknown ids.
    #[must_use]
    pub fn neighbors(&self, node: usize) -> &[HalfEdge] {
        self.adjacency.get(node).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn shape(&self, index: usize) -> Option<&FlattenedShape> {
        self.shapes.get(index)
    }

    /// Whole circles, which form regions on their own.
    #[must_use]
    pub fn circles(&self) -> &[FlattenedShape] {
        &self.circles
    }

    /// Signed area contribution of walking `half` away from `from`.
    #[must_use]
    pub fn area_term(&self, from: usize, half: &HalfEdge) -> f64 {
        match half.path {
            EdgePath::Line => match (self.nodes.point(from), self.nodes.point(half.to)) {
                (Some(a), Some(b)) => segment_area_term(a, b),
                _ => 0.0,
            },
            EdgePath::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => arc_area_term(&center, radius, start_angle, sweep),
        }
    }
}
