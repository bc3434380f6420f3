//! Various unsorted geometrical and logical operators.

pub use self::center::center;
pub use self::cleanup::{remove_unused_points, weld_vertices};
pub use self::cov::{center_cov, cov};
pub use self::parallel::ordered_map;
pub use self::point_cloud_support_point::{
    point_cloud_support_point, point_cloud_support_point_id,
};
pub use self::point_in_poly2d::point_in_segment_soup2d;
pub use self::rng::{derive_seed, seeded_rng, SeededRng};
pub use self::sorted_pair::SortedPair;

mod center;
mod cleanup;
mod cov;
pub mod hashmap;
mod parallel;
mod point_cloud_support_point;
mod point_in_poly2d;
mod rng;
mod sorted_pair;
