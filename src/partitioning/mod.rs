//! Spatial partitioning tools.

pub use self::bvh::{PointProjection, TriangleBvh};

mod bvh;
