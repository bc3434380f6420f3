//! Splitting a mesh by a plane.

pub use self::split_trimesh::{split_trimesh, TriMeshSplit};

mod split_trimesh;
