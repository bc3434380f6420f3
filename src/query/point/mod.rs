//! Point projection on triangles and triangle meshes.

pub use self::point_triangle::{project_point_on_segment, project_point_on_triangle};

mod point_triangle;
