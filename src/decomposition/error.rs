use crate::shape::InvalidMeshError;
use crate::transformation::ConvexHullError;

/// Errors returned by the decomposition operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DecompositionError {
    /// The input mesh is malformed.
    #[error(transparent)]
    InvalidMesh(#[from] InvalidMeshError),
    /// A parameter is outside of its valid range, or could not be parsed.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// The name of the parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The computation would exceed one of the configured resource limits.
    #[error("{resource} limit exceeded: {requested} requested, at most {limit} allowed")]
    ResourceExhausted {
        /// The exhausted resource.
        resource: &'static str,
        /// The amount the computation needed.
        requested: usize,
        /// The configured limit.
        limit: usize,
    },
    /// The convex hull engine failed.
    #[error(transparent)]
    ConvexHull(#[from] ConvexHullError),
    /// The computation was cancelled through its cancel flag.
    #[error("the decomposition was cancelled")]
    Cancelled,
}

impl DecompositionError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
