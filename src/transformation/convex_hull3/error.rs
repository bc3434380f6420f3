/// Errors that can occur during convex hull computation.
///
/// Degenerate inputs (a single point, collinear or coplanar points) are not
/// errors: they produce a flat hull. These variants report inputs that cannot
/// be processed at all, or numerical breakdowns of the incremental algorithm.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConvexHullError {
    /// An internal invariant of the incremental algorithm was broken.
    #[error("internal error: {0}")]
    InternalError(&'static str),
    /// The input contains NaN or infinite coordinates.
    #[error("input point {0} has a non-finite coordinate")]
    NonFiniteInput(usize),
    /// No point was given to the convex-hull algorithm.
    #[error("no point was given to the convex-hull algorithm")]
    IncompleteInput,
    /// The horizon of a point could not be computed because of rounding errors.
    #[error("the silhouette of point {0} could not be computed")]
    UnfinishedSilhouette(usize),
    /// An edge of the hull is shared by more than two triangles.
    #[error("detected t-junction for triangle {0}, edge: ({1}, {2})")]
    TJunction(usize, u32, u32),
    /// An edge of the hull is used by a single triangle.
    #[error("detected unfinished triangle")]
    UnfinishedTriangle,
    /// Two output vertices are identical.
    #[error("detected duplicate points {0} and {1}")]
    DuplicatePoints(usize, usize),
}
