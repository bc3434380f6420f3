use crate::shapes::{dumbbell, open_box};
use acd3d::decomposition::{
    ConvexDecomposition, DecompositionError, DecompositionParameters, Diagnostics, PreprocessMode,
    ResourceLimits,
};
use acd3d::transformation::voxelization::repair;
use approx::assert_relative_eq;

#[test]
fn open_box_is_closed() {
    let mesh = open_box();
    assert!(!mesh.is_manifold());

    let repaired = repair(&mesh, PreprocessMode::Auto, 20, &ResourceLimits::default()).unwrap();
    assert!(repaired.is_manifold());
    assert!(repaired.volume() > 0.0);

    let aabb = repaired.aabb();
    assert_relative_eq!(aabb.extents().x, 1.0, epsilon = 0.2);
    assert_relative_eq!(aabb.extents().z, 1.0, epsilon = 0.2);
}

#[test]
fn manifold_mesh_is_left_alone_in_auto_mode() {
    let mesh = dumbbell();
    assert!(mesh.is_manifold());

    let repaired = repair(&mesh, PreprocessMode::Auto, 20, &ResourceLimits::default()).unwrap();
    assert_eq!(repaired, mesh);
}

#[test]
fn voxel_limit_is_enforced() {
    let params = DecompositionParameters {
        preprocess_mode: PreprocessMode::On,
        limits: ResourceLimits {
            max_voxels: 1000,
            ..ResourceLimits::default()
        },
        ..DecompositionParameters::default()
    };
    let result = ConvexDecomposition::new(params)
        .with_diagnostics(Diagnostics::silent())
        .decompose(&open_box());

    assert!(matches!(
        result,
        Err(DecompositionError::ResourceExhausted {
            resource: "voxels",
            limit: 1000,
            ..
        })
    ));
}

#[test]
fn open_box_is_decomposed_after_repair() {
    let params = DecompositionParameters {
        preprocess_resolution: 10,
        resolution: 300,
        mcts_nodes: 8,
        mcts_iterations: 12,
        mcts_max_depth: 2,
        ..DecompositionParameters::default()
    };
    let hulls = ConvexDecomposition::new(params)
        .with_diagnostics(Diagnostics::silent())
        .decompose(&open_box())
        .unwrap();

    assert!(!hulls.is_empty());
    assert!(hulls.iter().all(|hull| hull.volume() > 0.0));
}
