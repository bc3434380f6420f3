use super::candidates::{Part, PlaneScorer};
use super::mcts::{MonteCarloTree, SearchConfig};
use super::{
    ApproximationMode, ConcavityMetric, DecompositionError, DecompositionParameters, Diagnostics,
};
use crate::math::Real;
use crate::shape::TriMesh;
use crate::transformation::convex_hull_mesh;
use crate::utils;
use arrayvec::ArrayVec;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Parts deeper than this in the cut tree are never cut.
pub const MAX_CUT_DEPTH: usize = 32;
/// Parts whose largest extent is smaller than this fraction of the input's are never cut.
pub const MIN_EXTENT_RATIO: Real = 0.005;
const MIN_TRIANGLES: usize = 4;

/// The state of a node of the cut tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeState {
    /// The node still has to be examined.
    Pending,
    /// The node is a part of the final decomposition.
    Leaf,
    /// The node was cut into its children.
    Split,
}

/// A node of the cut tree.
#[derive(Clone, Debug)]
pub struct CutNode {
    /// The mesh fragment, its hull and its concavity.
    pub part: Part,
    /// The number of cuts from the root.
    pub depth: usize,
    /// The node this one was cut from.
    pub parent: Option<usize>,
    /// The halves this node was cut into.
    pub children: ArrayVec<usize, 2>,
    /// Whether this node is pending, a leaf, or was cut.
    pub state: NodeState,
    stream: u64,
}

enum Outcome {
    Leaf(&'static str),
    Cut(Box<[Part; 2]>),
}

/// Recursively cuts a mesh into parts that are close enough to their convex hulls.
pub struct Decomposer<'a> {
    params: &'a DecompositionParameters,
    diagnostics: &'a Diagnostics,
    cancel: Option<&'a AtomicBool>,
    metric: ConcavityMetric,
    scorer: PlaneScorer,
    min_extent: Real,
    nodes: Vec<CutNode>,
}

impl<'a> Decomposer<'a> {
    /// Creates a decomposer of meshes with the given characteristic length.
    pub fn new(
        params: &'a DecompositionParameters,
        diagnostics: &'a Diagnostics,
        cancel: Option<&'a AtomicBool>,
        characteristic_length: Real,
    ) -> Self {
        Self {
            params,
            diagnostics,
            cancel,
            metric: ConcavityMetric::new(params, characteristic_length),
            scorer: PlaneScorer::new(params, characteristic_length).with_diagnostics(*diagnostics),
            min_extent: 0.0,
            nodes: vec![],
        }
    }

    /// The concavity measure used by this decomposer.
    pub fn metric(&self) -> &ConcavityMetric {
        &self.metric
    }

    /// The nodes of the cut tree built by the last call to [`Decomposer::decompose`].
    pub fn nodes(&self) -> &[CutNode] {
        &self.nodes
    }

    /// Wraps `mesh` into a part with its convex hull.
    pub fn hull_part(&self, mesh: TriMesh) -> Result<Part, DecompositionError> {
        let approximation = convex_hull_mesh(&mesh)?;
        let concavity = self.metric.concavity(&mesh, &approximation);
        Ok(Part {
            mesh,
            approximation,
            concavity,
        })
    }

    /// Decomposes `mesh` and returns the leaves of the cut tree, in arena order.
    pub fn decompose(&mut self, mesh: TriMesh) -> Result<Vec<Part>, DecompositionError> {
        self.min_extent = mesh.aabb().max_extent() * MIN_EXTENT_RATIO;
        let root = self.hull_part(mesh)?;
        self.diagnostics
            .info(format_args!("initial concavity: {:.6}", root.concavity));

        self.nodes.clear();
        self.nodes.push(CutNode {
            part: root,
            depth: 0,
            parent: None,
            children: ArrayVec::new(),
            state: NodeState::Pending,
            stream: self.params.seed,
        });

        match self.params.max_convex_hulls {
            None => self.process_levels()?,
            Some(budget) => self.process_budgeted(budget)?,
        }

        Ok(self
            .nodes
            .iter()
            .filter(|node| node.state == NodeState::Leaf)
            .map(|node| node.part.clone())
            .collect())
    }

    fn check_cancelled(&self) -> Result<(), DecompositionError> {
        if self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            self.diagnostics.warn(format_args!("decomposition cancelled"));
            Err(DecompositionError::Cancelled)
        } else {
            Ok(())
        }
    }

    // Each level of the tree is examined in parallel.
    fn process_levels(&mut self) -> Result<(), DecompositionError> {
        let mut frontier = vec![0];

        while !frontier.is_empty() {
            self.check_cancelled()?;

            let outcomes = utils::ordered_map(&frontier, |_, id| self.examine(*id));
            let mut next = vec![];

            for (id, outcome) in frontier.iter().zip(outcomes) {
                next.extend(self.apply(*id, outcome?).into_iter().flatten());
            }

            frontier = next;
        }

        Ok(())
    }

    // The most concave pending part is examined first, until the budget is reached.
    fn process_budgeted(&mut self, budget: usize) -> Result<(), DecompositionError> {
        let mut heap = BinaryHeap::new();
        heap.push((OrderedFloat(self.nodes[0].part.concavity), Reverse(0)));
        let mut num_leaves = 0;

        while let Some((_, Reverse(id))) = heap.pop() {
            self.check_cancelled()?;

            if num_leaves + heap.len() + 1 >= budget {
                let mut forced = 0;

                for id in std::iter::once(id).chain(heap.drain().map(|(_, Reverse(id))| id)) {
                    if self.nodes[id].part.concavity > self.params.threshold {
                        forced += 1;
                    }
                    self.nodes[id].state = NodeState::Leaf;
                }

                if forced > 0 {
                    self.diagnostics.warn(format_args!(
                        "part budget of {budget} reached: {forced} parts above the concavity threshold were kept as they are"
                    ));
                }

                break;
            }

            let outcome = self.examine(id)?;

            match self.apply(id, outcome) {
                Some(children) => {
                    for child in children {
                        let concavity = self.nodes[child].part.concavity;
                        heap.push((OrderedFloat(concavity), Reverse(child)));
                    }
                }
                None => num_leaves += 1,
            }
        }

        Ok(())
    }

    fn leaf_reason(&self, node: &CutNode) -> Option<&'static str> {
        if node.part.concavity <= self.params.threshold {
            Some("concavity under threshold")
        } else if node.part.mesh.num_triangles() < MIN_TRIANGLES {
            Some("too few triangles")
        } else if node.part.mesh.aabb().max_extent() < self.min_extent {
            Some("too small")
        } else if node.depth >= MAX_CUT_DEPTH {
            Some("maximum depth reached")
        } else {
            None
        }
    }

    fn examine(&self, id: usize) -> Result<Outcome, DecompositionError> {
        self.check_cancelled()?;

        let node = &self.nodes[id];

        if let Some(reason) = self.leaf_reason(node) {
            return Ok(Outcome::Leaf(reason));
        }

        let config = SearchConfig::new(self.params, node.stream);
        let tree = MonteCarloTree::new(node.part.mesh.clone(), &self.scorer, config)?;

        let Some(cut) = tree.search() else {
            return Ok(Outcome::Leaf("no viable cutting plane"));
        };

        self.diagnostics.debug(format_args!(
            "part {id} (depth {}, concavity {:.6}): cut by ({:.6}, {:.6}, {:.6}, {:.6}), score {:.6}",
            node.depth,
            node.part.concavity,
            cut.plane.a,
            cut.plane.b,
            cut.plane.c,
            cut.plane.d,
            cut.plane.score,
        ));

        let halves = match self.scorer.mode {
            ApproximationMode::ConvexHull => [cut.below, cut.above],
            ApproximationMode::Box => [
                self.hull_part(cut.below.mesh)?,
                self.hull_part(cut.above.mesh)?,
            ],
        };

        Ok(Outcome::Cut(Box::new(halves)))
    }

    // Returns the new pending children, if any.
    fn apply(&mut self, id: usize, outcome: Outcome) -> Option<ArrayVec<usize, 2>> {
        match outcome {
            Outcome::Leaf(reason) => {
                self.diagnostics.debug(format_args!(
                    "part {id} is a leaf ({reason}), concavity {:.6}",
                    self.nodes[id].part.concavity
                ));
                self.nodes[id].state = NodeState::Leaf;
                None
            }
            Outcome::Cut(halves) => {
                let depth = self.nodes[id].depth + 1;
                let parent_stream = self.nodes[id].stream;
                let mut children = ArrayVec::new();

                for (k, part) in IntoIterator::into_iter(*halves).enumerate() {
                    if part.mesh.is_empty() {
                        continue;
                    }

                    let child = self.nodes.len();
                    self.nodes.push(CutNode {
                        part,
                        depth,
                        parent: Some(id),
                        children: ArrayVec::new(),
                        state: NodeState::Pending,
                        stream: utils::derive_seed(parent_stream, &[k as u64]),
                    });
                    children.push(child);
                }

                self.nodes[id].children = children.clone();

                if children.is_empty() {
                    self.nodes[id].state = NodeState::Leaf;
                    None
                } else {
                    self.nodes[id].state = NodeState::Split;
                    Some(children)
                }
            }
        }
    }
}
