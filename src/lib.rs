/*!
acd3d
=====

**acd3d** computes approximate convex decompositions of 3D triangle meshes.
A mesh is recursively cut by planes chosen through a Monte-Carlo tree search
guided by a concavity metric, until every part is close enough to its own
convex hull. The resulting hulls are then merged, simplified or inflated
depending on the [`DecompositionParameters`](crate::decomposition::DecompositionParameters).

```no_run
use acd3d::decomposition::{ConvexDecomposition, DecompositionParameters};
use acd3d::shape::TriMesh;
# fn load() -> TriMesh { unimplemented!() }

let mesh = load();
let parts = ConvexDecomposition::new(DecompositionParameters::default())
    .decompose(&mesh)
    .unwrap();
println!("{} convex parts", parts.len());
```
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)] // This usually makes it way more verbose that it could be.
#![deny(unused_qualifications)]

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod decomposition;
pub mod partitioning;
pub mod query;
pub mod shape;
pub mod transformation;
pub mod utils;

/// Compilation flags dependent aliases for mathematical types.
pub mod math {
    pub use na::{Matrix3, Point2, Point3, Rotation3, UnitVector3, Vector3};

    /// The scalar type used throughout this crate.
    pub use f64 as Real;

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;

    /// The unit vector type.
    pub use UnitVector3 as UnitVector;

    /// The matrix type.
    pub use Matrix3 as Matrix;

    /// The rotation matrix type.
    pub type Rotation = Rotation3<Real>;
}

pub use decomposition::{
    clip, convex_hull, decompose, merge, parse_log_level, ConvexDecomposition,
    DecompositionError, DecompositionParameters,
};
pub use shape::{CuttingPlane, InvalidMeshError, TriMesh};
pub use transformation::{normalize, NormalizationFrame};
