mod graph;

pub use graph::{ArrangementGraph, EdgePath, HalfEdge, PointIndex};

use std::collections::HashSet;

use crate::geometry::{FlattenedShape, Primitive};
use crate::math::area_2d::circle_area;
use crate::math::POINT_MERGE_TOLERANCE;

/// Where the depth-first search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleSearch {
    /// Restart from every unvisited node, covering disconnected arrangements.
    #[default]
    AllComponents,
    /// Search only the component containing node 1.
    FirstNodeOnly,
}

/// Parameters for [`ExtractCycles`].
#[derive(Debug, Clone, Copy)]
pub struct CycleParams {
    /// Distance under which two endpoints become one graph node.
    pub merge_tolerance: f64,
    pub search: CycleSearch,
}

impl Default for CycleParams {
    fn default() -> Self {
        Self {
            merge_tolerance: POINT_MERGE_TOLERANCE,
            search: CycleSearch::default(),
        }
    }
}

/// One closed boundary found in the arrangement.
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    /// Graph nodes in traversal order; empty for a whole circle.
    pub nodes: Vec<usize>,
    /// Realizing shapes, deduplicated, in traversal order.
    pub shapes: Vec<FlattenedShape>,
    /// Signed enclosed area, positive for counter-clockwise traversal.
    pub area: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    InProgress,
    Done,
}

/// Finds closed regions in a split arrangement.
///
/// Runs a depth-first search over the arrangement graph and reports one cycle
/// per back edge, i.e. a fundamental cycle basis. Whole circles are appended
/// as single-shape cycles after the graph cycles.
#[derive(Debug)]
pub struct ExtractCycles<'a> {
    shapes: &'a [FlattenedShape],
    params: CycleParams,
}

impl<'a> ExtractCycles<'a> {
    #[must_use]
    pub fn new(shapes: &'a [FlattenedShape]) -> Self {
        Self {
            shapes,
            params: CycleParams::default(),
        }
    }

    /// Sets custom cycle search parameters.
    #[must_use]
    pub fn with_params(mut self, params: CycleParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the search.
    #[must_use]
    pub fn execute(&self) -> Vec<Cycle> {
        let graph = ArrangementGraph::build(self.shapes, self.params.merge_tolerance);
        let mut cycles = Vec::new();

        let roots: Vec<usize> = match self.params.search {
            CycleSearch::AllComponents => (1..=graph.node_count()).collect(),
            CycleSearch::FirstNodeOnly => (1..=graph.node_count()).take(1).collect(),
        };

        let mut color = vec![Color::Unvisited; graph.node_count() + 1];
        let mut parent: Vec<Option<(usize, HalfEdge)>> = vec![None; graph.node_count() + 1];
        for root in roots {
            if color[root] == Color::Unvisited {
                search_from(&graph, root, &mut color, &mut parent, &mut cycles);
            }
        }

        for circle in graph.circles() {
            if let Primitive::Circle(c) = circle.primitive {
                cycles.push(Cycle {
                    nodes: Vec::new(),
                    shapes: vec![*circle],
                    area: circle_area(c.radius()),
                });
            }
        }
        cycles
    }
}

/// Iterative depth-first search from `root`.
///
/// Each stack frame holds a node, the edge it was entered by and the next
/// neighbour to visit. Only the entering edge is skipped, so parallel edges
/// between two nodes still close a cycle.
fn search_from(
    graph: &ArrangementGraph,
    root: usize,
    color: &mut [Color],
    parent: &mut [Option<(usize, HalfEdge)>],
    cycles: &mut Vec<Cycle>,
) {
    let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];
    color[root] = Color::InProgress;

    while let Some(frame) = stack.last_mut() {
        let (node, entry, next) = *frame;
        let Some(half) = graph.neighbors(node).get(next) else {
            color[node] = Color::Done;
            stack.pop();
            continue;
        };
        frame.2 += 1;
        if Some(half.edge) == entry {
            continue;
        }
        match color[half.to] {
            Color::Unvisited => {
                parent[half.to] = Some((node, *half));
                color[half.to] = Color::InProgress;
                stack.push((half.to, Some(half.edge), 0));
            }
            Color::InProgress => cycles.push(close_cycle(graph, parent, node, half)),
            Color::Done => {}
        }
    }
}

/// Builds the cycle closed by the back edge `closing` from `node` to one of
/// its ancestors.
fn close_cycle(
    graph: &ArrangementGraph,
    parent: &[Option<(usize, HalfEdge)>],
    node: usize,
    closing: &HalfEdge,
) -> Cycle {
    let ancestor = closing.to;

    // Walk up from `node` to the ancestor, then flip into traversal order.
    let mut path: Vec<(usize, HalfEdge)> = Vec::new();
    let mut current = node;
    while current != ancestor {
        let Some((up, half)) = parent[current] else {
            break;
        };
        path.push((up, half));
        current = up;
    }
    path.reverse();
    path.push((node, *closing));

    let mut nodes = Vec::with_capacity(path.len());
    let mut shapes = Vec::new();
    let mut seen = HashSet::new();
    let mut area = 0.0;
    for (from, half) in &path {
        nodes.push(*from);
        area += graph.area_term(*from, half);
        if let Some(shape) = graph.shape(half.shape) {
            if seen.insert(shape.id) {
                shapes.push(*shape);
            }
        }
    }

    Cycle {
        nodes,
        shapes,
        area,
    }
}
