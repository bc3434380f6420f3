//! Non-persistent geometric queries: point projection, overlap tests and mesh splitting.

pub use self::intersection_test_aabb_triangle::intersection_test_aabb_triangle;
pub use self::point::{project_point_on_segment, project_point_on_triangle};
pub use self::split::{split_trimesh, TriMeshSplit};

mod intersection_test_aabb_triangle;
pub mod point;
pub mod split;
