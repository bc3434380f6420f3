//! Monte-Carlo tree search of cutting planes.
//!
//! Each node of the tree is a set of parts obtained by successive cuts of the
//! initial part. A move cuts the worst part of a node with one of its candidate
//! planes. Rollouts greedily cut the worst part with its best mid-plane, and the
//! cost of a trajectory is the average, over `mcts_max_depth` rounds, of the
//! worst concavity plus a penalty per extra part. Lower costs are better.
//!
//! Each node accumulates the costs of the rollouts that went through it. The
//! committed plane is the one of the root child with the lowest mean cost, refined
//! along its axis by replaying the cheapest trajectory found below that child.

use super::candidates::{self, Part, PlaneScorer, ScoredCut, MIN_INTERVAL};
use super::DecompositionParameters;
use crate::math::Real;
use crate::shape::{CuttingPlane, TriMesh};
use crate::transformation::ConvexHullError;
use crate::utils;
use rand::seq::SliceRandom;

/// The penalty added to a round score for each part beyond the first, relative to the
/// concavity threshold.
pub const PART_PENALTY: Real = 0.1;

const TERNARY_STEPS: usize = 10;

/// The index of a node in a [`MonteCarloTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    #[inline]
    fn get(self) -> usize {
        self.0 as usize
    }
}

/// The search settings, extracted from the decomposition parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Candidate planes per axis.
    pub nodes: usize,
    /// Number of iterations.
    pub iterations: usize,
    /// Number of cuts of a trajectory.
    pub max_depth: usize,
    /// Parts under this concavity are not cut further.
    pub threshold: Real,
    /// Seed of the candidate shuffling.
    pub seed: u64,
}

impl SearchConfig {
    /// The settings of `params`, with the given seed.
    pub fn new(params: &DecompositionParameters, seed: u64) -> Self {
        Self {
            nodes: params.mcts_nodes,
            iterations: params.mcts_iterations,
            max_depth: params.mcts_max_depth.max(1),
            threshold: params.threshold,
            seed,
        }
    }

    fn part_penalty(&self) -> Real {
        PART_PENALTY * self.threshold
    }
}

#[derive(Clone, Debug)]
struct SearchState {
    parts: Vec<Part>,
    worst: usize,
    round: usize,
    // Sum of the round scores so far.
    cost: Real,
}

impl SearchState {
    fn new(parts: Vec<Part>, round: usize, cost: Real) -> Self {
        let mut worst = 0;

        for (i, part) in parts.iter().enumerate() {
            if part.concavity > parts[worst].concavity {
                worst = i;
            }
        }

        Self {
            parts,
            worst,
            round,
            cost,
        }
    }

    fn worst_part(&self) -> &Part {
        &self.parts[self.worst]
    }

    fn score(&self, config: &SearchConfig) -> Real {
        self.worst_part().concavity + config.part_penalty() * (self.parts.len() - 1) as Real
    }

    fn split_worst(&self, cut: ScoredCut, config: &SearchConfig) -> Self {
        let mut parts = self.parts.clone();
        let _ = parts.remove(self.worst);
        parts.push(cut.below);
        parts.push(cut.above);

        let mut next = Self::new(parts, self.round + 1, 0.0);
        next.cost = self.cost + next.score(config);
        next
    }

    fn is_terminal(&self, config: &SearchConfig) -> bool {
        self.round >= config.max_depth || self.worst_part().concavity <= config.threshold
    }

    // Rounds that were not played count the score of the final state.
    fn final_cost(&self, config: &SearchConfig) -> Real {
        let remaining = config.max_depth.saturating_sub(self.round) as Real;
        (self.cost + remaining * self.score(config)) / config.max_depth as Real
    }
}

struct Node {
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    state: SearchState,
    // The plane that led from the parent to this node.
    mv: Option<CuttingPlane>,
    untried: Vec<CuttingPlane>,
    next_untried: usize,
    visits: u32,
    total_cost: Real,
    // The cheapest trajectory through this node. Only tracked on root children.
    best_path: Option<BestPath>,
}

impl Node {
    fn new(
        parent: Option<NodeIndex>,
        state: SearchState,
        mv: Option<CuttingPlane>,
        untried: Vec<CuttingPlane>,
    ) -> Self {
        Self {
            parent,
            children: vec![],
            state,
            mv,
            untried,
            next_untried: 0,
            visits: 0,
            total_cost: 0.0,
            best_path: None,
        }
    }

    fn is_fully_expanded(&self) -> bool {
        self.next_untried >= self.untried.len()
    }

    fn mean_cost(&self) -> Real {
        if self.visits == 0 {
            Real::MAX
        } else {
            self.total_cost / self.visits as Real
        }
    }
}

struct BestPath {
    cost: Real,
    planes: Vec<CuttingPlane>,
}

/// A Monte-Carlo tree searching the best cutting plane of a part.
pub struct MonteCarloTree<'a> {
    nodes: Vec<Node>,
    scorer: &'a PlaneScorer,
    config: SearchConfig,
}

impl<'a> MonteCarloTree<'a> {
    /// Creates a tree rooted at `mesh`.
    pub fn new(
        mesh: TriMesh,
        scorer: &'a PlaneScorer,
        config: SearchConfig,
    ) -> Result<Self, ConvexHullError> {
        let root = scorer.part(mesh)?;
        let untried = candidates::candidate_planes(&root.mesh.aabb(), config.nodes, scorer.mode);
        let root = Node::new(None, SearchState::new(vec![root], 0, 0.0), None, untried);

        Ok(Self {
            nodes: vec![root],
            scorer,
            config,
        })
    }

    /// Runs the search and returns the best cut of the root part, refined by a
    /// ternary search along its axis.
    ///
    /// Returns `None` if no candidate plane cuts the root part.
    pub fn search(mut self) -> Option<ScoredCut> {
        let root = NodeIndex(0);
        let config = self.config;
        let initial_cost = self.nodes[0].state.worst_part().concavity / config.max_depth as Real;

        // Every root candidate is evaluated at once.
        let planes = std::mem::take(&mut self.nodes[0].untried);
        let root_mesh = self.nodes[0].state.parts[0].mesh.clone();

        for cut in self.scorer.evaluate_all(&root_mesh, &planes) {
            let plane = cut.plane;
            let state = self.nodes[0].state.split_worst(cut, &config);
            let _ = self.add_node(root, plane, state);
        }

        if self.nodes[0].children.is_empty() {
            return None;
        }

        // Then each root child gets one rollout, on its own.
        let children = self.nodes[0].children.clone();
        let rollouts = utils::ordered_map(&children, |_, child| {
            self.rollout(&self.nodes[child.get()].state)
        });

        for (child, (cost, path)) in children.iter().zip(rollouts) {
            self.backpropagate(*child, cost, path);
        }

        for _ in children.len()..config.iterations {
            let selected = self.tree_policy(initial_cost);
            let (cost, path) = self.rollout(&self.nodes[selected.get()].state);
            self.backpropagate(selected, cost, path);
        }

        let chosen = &self.nodes[self.committed_child()?.get()];

        if let Some(refined) = chosen.best_path.as_ref().and_then(|path| self.refine(path)) {
            return Some(refined);
        }

        Some(ScoredCut {
            plane: chosen.mv?,
            below: chosen.state.parts[0].clone(),
            above: chosen.state.parts[1].clone(),
        })
    }

    // The visited root child with the lowest mean cost. Ties keep the first child in
    // candidate order.
    fn committed_child(&self) -> Option<NodeIndex> {
        self.nodes[0]
            .children
            .iter()
            .copied()
            .filter(|child| self.nodes[child.get()].visits > 0)
            .min_by(|a, b| {
                self.nodes[a.get()]
                    .mean_cost()
                    .total_cmp(&self.nodes[b.get()].mean_cost())
            })
    }

    fn add_node(&mut self, parent: NodeIndex, mv: CuttingPlane, state: SearchState) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        let mut untried = candidates::candidate_planes(
            &state.worst_part().mesh.aabb(),
            self.config.nodes,
            self.scorer.mode,
        );
        untried.shuffle(&mut utils::seeded_rng(self.config.seed, &[index.0 as u64]));

        self.nodes.push(Node::new(Some(parent), state, Some(mv), untried));
        self.nodes[parent.get()].children.push(index);
        index
    }

    // Cuts the worst part of the node with its next viable untried plane.
    fn expand(&mut self, index: NodeIndex) -> Option<NodeIndex> {
        while !self.nodes[index.get()].is_fully_expanded() {
            let node = &mut self.nodes[index.get()];
            let plane = node.untried[node.next_untried];
            node.next_untried += 1;

            let node = &self.nodes[index.get()];

            if let Some(cut) = self.scorer.evaluate(&node.state.worst_part().mesh, &plane) {
                let state = node.state.split_worst(cut, &self.config);
                return Some(self.add_node(index, plane, state));
            }
        }

        None
    }

    fn tree_policy(&mut self, initial_cost: Real) -> NodeIndex {
        let mut current = NodeIndex(0);

        loop {
            let node = &self.nodes[current.get()];

            if node.state.is_terminal(&self.config) {
                return current;
            }

            if !node.is_fully_expanded() {
                if let Some(child) = self.expand(current) {
                    return child;
                }
            }

            match self.best_child(current, initial_cost) {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    // Lower confidence bound on the mean cost: Q - c * sqrt(2 ln(N) / n).
    fn best_child(&self, index: NodeIndex, initial_cost: Real) -> Option<NodeIndex> {
        let node = &self.nodes[index.get()];
        let c = initial_cost * std::f64::consts::FRAC_1_SQRT_2;
        let mut best = None;
        let mut best_value = Real::MAX;

        for child_id in &node.children {
            let child = &self.nodes[child_id.get()];

            if child.visits == 0 {
                return Some(*child_id);
            }

            let exploration =
                c * (2.0 * (node.visits.max(1) as Real).ln() / child.visits as Real).sqrt();
            let value = child.mean_cost() - exploration;

            if value < best_value {
                best_value = value;
                best = Some(*child_id);
            }
        }

        best
    }

    fn rollout(&self, state: &SearchState) -> (Real, Vec<CuttingPlane>) {
        let mut state = state.clone();
        let mut path = vec![];

        while !state.is_terminal(&self.config) {
            let worst = state.worst_part();
            let planes = candidates::mid_planes(&worst.mesh.aabb());

            let Some(cut) = self.scorer.best(&worst.mesh, &planes) else {
                break;
            };

            path.push(cut.plane);
            state = state.split_worst(cut, &self.config);
        }

        (state.final_cost(&self.config), path)
    }

    fn backpropagate(&mut self, index: NodeIndex, cost: Real, rollout_path: Vec<CuttingPlane>) {
        let mut tree_path = vec![];
        let mut root_child = None;
        let mut current = Some(index);

        while let Some(id) = current {
            let node = &mut self.nodes[id.get()];
            node.visits += 1;
            node.total_cost += cost;

            if let Some(mv) = node.mv {
                tree_path.push(mv);
            }

            if node.parent == Some(NodeIndex(0)) {
                root_child = Some(id);
            }

            current = node.parent;
        }

        let Some(root_child) = root_child else {
            return;
        };

        let best = &mut self.nodes[root_child.get()].best_path;

        if best.as_ref().map(|b| cost < b.cost).unwrap_or(true) {
            tree_path.reverse();
            tree_path.extend(rollout_path);
            *best = Some(BestPath {
                cost,
                planes: tree_path,
            });
        }
    }

    // The cost of cutting the root part with `first` then replaying `rest` on the
    // successive worst parts.
    fn path_cost(&self, first: &CuttingPlane, rest: &[CuttingPlane]) -> Option<Real> {
        let root = &self.nodes[0].state;
        let cut = self.scorer.evaluate(&root.parts[0].mesh, first)?;

        let mut state = root.split_worst(cut, &self.config);

        for plane in rest {
            if state.is_terminal(&self.config) {
                break;
            }

            match self.scorer.evaluate(&state.worst_part().mesh, plane) {
                Some(cut) => state = state.split_worst(cut, &self.config),
                None => break,
            }
        }

        Some(state.final_cost(&self.config))
    }

    // Ternary search of the offset of the first plane of the best path, along its axis.
    fn refine(&self, best: &BestPath) -> Option<ScoredCut> {
        let (first, rest) = best.planes.split_first()?;
        let axis = first.axis()?;

        let root_mesh = &self.nodes[0].state.parts[0].mesh;
        let aabb = root_mesh.aabb();
        let offset = -first.d / first.normal()[axis];
        let interval = (aabb.extents()[axis] / (self.config.nodes + 1) as Real).max(MIN_INTERVAL);

        let mut left = (aabb.mins[axis] + MIN_INTERVAL).max(offset - interval);
        let mut right = (aabb.maxs[axis] - MIN_INTERVAL).min(offset + interval);

        if left >= right {
            return None;
        }

        let mut best_cost = best.cost;
        let mut best_offset = None;

        for _ in 0..TERNARY_STEPS {
            let third = (right - left) / 3.0;
            let mid1 = left + third;
            let mid2 = right - third;

            let cost1 = self
                .path_cost(&CuttingPlane::axis_aligned(axis, mid1), rest)
                .unwrap_or(Real::MAX);
            let cost2 = self
                .path_cost(&CuttingPlane::axis_aligned(axis, mid2), rest)
                .unwrap_or(Real::MAX);

            for (cost, mid) in [(cost1, mid1), (cost2, mid2)] {
                if cost < best_cost {
                    best_cost = cost;
                    best_offset = Some(mid);
                }
            }

            if cost1 < cost2 {
                right = mid2;
            } else {
                left = mid1;
            }
        }

        let offset = best_offset?;
        self.scorer
            .evaluate(root_mesh, &CuttingPlane::axis_aligned(axis, offset))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bounding_volume::Aabb;
    use crate::math::Point;

    fn params() -> DecompositionParameters {
        DecompositionParameters {
            resolution: 64,
            mcts_nodes: 5,
            mcts_iterations: 20,
            mcts_max_depth: 2,
            ..Default::default()
        }
    }

    // Two unit cubes side by side along x, sharing no vertex, joined by a thin bar.
    fn dumbbell() -> TriMesh {
        let left = TriMesh::from_aabb(&Aabb::new(
            Point::new(-2.0, -0.5, -0.5),
            Point::new(-1.0, 0.5, 0.5),
        ));
        let right = TriMesh::from_aabb(&Aabb::new(
            Point::new(1.0, -0.5, -0.5),
            Point::new(2.0, 0.5, 0.5),
        ));
        let bar = TriMesh::from_aabb(&Aabb::new(
            Point::new(-1.0, -0.1, -0.1),
            Point::new(1.0, 0.1, 0.1),
        ));
        left.concatenated(&bar).concatenated(&right)
    }

    #[test]
    fn search_cuts_dumbbell_across_its_length() {
        let params = params();
        let mesh = dumbbell();
        let scorer = PlaneScorer::new(&params, mesh.characteristic_length());
        let tree = MonteCarloTree::new(mesh.clone(), &scorer, SearchConfig::new(&params, 0)).unwrap();
        let cut = tree.search().unwrap();

        assert_eq!(cut.plane.axis(), Some(0));
        assert_relative_eq!(
            cut.below.mesh.volume() + cut.above.mesh.volume(),
            mesh.volume(),
            epsilon = 1.0e-6
        );
        assert!(cut.max_concavity() < scorer.part(mesh).unwrap().concavity);
    }

    #[test]
    fn search_is_deterministic() {
        let params = params();
        let mesh = dumbbell();
        let scorer = PlaneScorer::new(&params, mesh.characteristic_length());
        let run = || {
            MonteCarloTree::new(mesh.clone(), &scorer, SearchConfig::new(&params, 3))
                .unwrap()
                .search()
                .map(|cut| cut.plane)
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn flat_mesh_has_no_cut() {
        let params = params();
        let mesh = TriMesh::new(
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(0.01, 0.0, 0.0),
                Point::new(0.0, 0.01, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let scorer = PlaneScorer::new(&params, 1.0);
        let tree = MonteCarloTree::new(mesh, &scorer, SearchConfig::new(&params, 0)).unwrap();
        assert!(tree.search().is_none());
    }

    #[test]
    fn selection_uses_mean_cost() {
        let params = params();
        let mesh = dumbbell();
        let scorer = PlaneScorer::new(&params, mesh.characteristic_length());
        let mut tree = MonteCarloTree::new(mesh.clone(), &scorer, SearchConfig::new(&params, 0)).unwrap();
        let root = NodeIndex(0);

        let mut children = vec![];
        for offset in [-0.5, 0.5] {
            let plane = CuttingPlane::axis_aligned(0, offset);
            let cut = scorer.evaluate(&mesh, &plane).unwrap();
            let state = tree.nodes[0].state.split_worst(cut, &tree.config);
            children.push(tree.add_node(root, plane, state));
        }

        // The first child has the single cheapest trajectory, the second the lowest mean.
        tree.backpropagate(children[0], 0.1, vec![]);
        tree.backpropagate(children[0], 0.9, vec![]);
        tree.backpropagate(children[1], 0.3, vec![]);
        tree.backpropagate(children[1], 0.3, vec![]);

        assert_relative_eq!(tree.nodes[children[0].get()].mean_cost(), 0.5);
        assert_relative_eq!(tree.nodes[children[1].get()].mean_cost(), 0.3);
        assert_eq!(tree.best_child(root, 0.0), Some(children[1]));
        assert_eq!(tree.committed_child(), Some(children[1]));
        assert_relative_eq!(
            tree.nodes[children[0].get()].best_path.as_ref().unwrap().cost,
            0.1
        );
    }
}
