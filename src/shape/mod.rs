//! Shapes manipulated by the decomposition: triangle meshes, triangles and cutting planes.

pub use self::cutting_plane::CuttingPlane;
pub use self::triangle::Triangle;
pub use self::trimesh::{InvalidMeshError, TriMesh};

mod cutting_plane;
mod triangle;
mod trimesh;
