//! Transformation and simplification of meshes: convex hulls, normalization,
//! voxel-based repair, surface sampling, decimation and extrusion.

pub(crate) use self::convex_hull2::convex_hull2_idx;
pub use self::convex_hull3::{check_convex_hull, convex_hull, convex_hull_mesh, ConvexHullError};
pub use self::decimation::decimate;
pub use self::extrusion::extrude;
pub use self::normalization::{normalize, principal_rotation, NormalizationFrame};
pub use self::sampling::sample_surface;

mod convex_hull2;
mod convex_hull3;
pub(crate) mod convex_hull_utils;
mod decimation;
mod extrusion;
mod normalization;
mod sampling;
/// Voxelization of triangle meshes and voxel-based mesh repair.
pub mod voxelization;
