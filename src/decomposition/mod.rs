//! Approximate convex decomposition of triangle meshes.
//!
//! The entry point is [`ConvexDecomposition`]. The building blocks (concavity
//! measure, candidate planes, tree search, cut tree and merging pass) are exposed
//! for finer control.

pub use self::candidates::{
    candidate_planes, mid_planes, Part, PlaneScorer, ScoredCut, CUT_AREA_WEIGHT,
};
pub use self::concavity::{volume_gap_radius, ConcavityMetric};
pub use self::decomposer::{CutNode, Decomposer, NodeState, MAX_CUT_DEPTH, MIN_EXTENT_RATIO};
pub use self::diagnostics::{parse_log_level, Diagnostics};
pub use self::engine::{
    clip, convex_hull, decompose, merge, ConvexDecomposition, ConvexHullResult, MeshScore,
};
pub use self::error::DecompositionError;
pub use self::mcts::{MonteCarloTree, NodeIndex, SearchConfig, PART_PENALTY};
pub use self::merging::{merge_parts, MergeConfig};
pub use self::parameters::{
    ApproximationMode, DecompositionParameters, PreprocessMode, ResourceLimits,
};

mod candidates;
mod concavity;
mod decomposer;
mod diagnostics;
mod engine;
mod error;
pub mod mcts;
mod merging;
mod parameters;
