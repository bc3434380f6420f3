//! Voxelization of triangle meshes and voxel-based mesh repair.

pub use self::mesh_repair::{extract_boundary, make_well_composed, repair};
pub use self::voxelized_volume::{VoxelValue, VoxelizedVolume};

mod mesh_repair;
mod voxelized_volume;
