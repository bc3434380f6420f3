use crate::shapes::{cuboid, dumbbell, l_prism};
use acd3d::decomposition::{
    ApproximationMode, ConvexDecomposition, DecompositionError, DecompositionParameters,
    Diagnostics, PreprocessMode, ResourceLimits,
};
use acd3d::TriMesh;
use approx::assert_relative_eq;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

fn fast_parameters() -> DecompositionParameters {
    DecompositionParameters {
        resolution: 300,
        mcts_nodes: 8,
        mcts_iterations: 12,
        mcts_max_depth: 2,
        ..DecompositionParameters::default()
    }
}

fn run(mesh: &TriMesh, params: DecompositionParameters) -> Vec<TriMesh> {
    ConvexDecomposition::new(params)
        .with_diagnostics(Diagnostics::silent())
        .decompose(mesh)
        .unwrap()
}

#[test]
fn convex_mesh_is_its_own_hull() {
    let cube = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
    let hulls = run(&cube, fast_parameters());

    assert_eq!(hulls.len(), 1);
    assert_relative_eq!(hulls[0].volume(), 1.0, epsilon = 1.0e-6);
    assert_relative_eq!(hulls[0].aabb().mins, cube.aabb().mins, epsilon = 1.0e-9);
    assert_relative_eq!(hulls[0].aabb().maxs, cube.aabb().maxs, epsilon = 1.0e-9);
}

#[test]
fn dumbbell_is_cut_at_low_threshold() {
    let mesh = dumbbell();
    let hulls = run(&mesh, fast_parameters());
    assert!(hulls.len() >= 2, "{} hulls", hulls.len());

    // Every hull lies within the input bounds.
    let aabb = mesh.aabb().loosened(1.0e-6);
    for hull in &hulls {
        assert!(hull.vertices().iter().all(|pt| aabb.contains_local_point(pt)));
    }
}

#[test]
fn dumbbell_is_kept_whole_at_high_threshold() {
    let params = DecompositionParameters {
        threshold: 1.0,
        ..fast_parameters()
    };
    assert_eq!(run(&dumbbell(), params).len(), 1);
}

#[test]
fn hull_budget_is_honored() {
    let params = DecompositionParameters {
        max_convex_hulls: Some(1),
        ..fast_parameters()
    };
    assert_eq!(run(&dumbbell(), params).len(), 1);
}

#[test]
fn decomposition_is_deterministic() {
    let mesh = l_prism();
    let params = DecompositionParameters {
        seed: 42,
        ..fast_parameters()
    };

    assert_eq!(run(&mesh, params), run(&mesh, params));
}

#[test]
fn l_prism_hulls_cover_the_shape() {
    let mesh = l_prism();
    let hulls = run(&mesh, fast_parameters());
    assert!(hulls.len() >= 2);

    // The hulls cover the prism, and overlap little once merged.
    let total: f64 = hulls.iter().map(|h| h.volume()).sum();
    assert!(total >= mesh.volume() - 1.0e-6, "{total}");
    assert!(total <= 1.2 * mesh.volume(), "{total}");
}

#[test]
fn box_mode_decomposition() {
    let mesh = l_prism();
    let params = DecompositionParameters {
        approximation_mode: ApproximationMode::Box,
        ..fast_parameters()
    };
    let hulls = run(&mesh, params);
    assert!(hulls.len() >= 2);

    let total: f64 = hulls.iter().map(|h| h.volume()).sum();
    assert!(total >= mesh.volume() - 1.0e-6, "{total}");
    assert!(total <= 1.2 * mesh.volume(), "{total}");
}

#[test]
fn principal_axes_decomposition() {
    let mesh = l_prism();
    let params = DecompositionParameters {
        pca: true,
        ..fast_parameters()
    };
    let hulls = run(&mesh, params);
    assert!(hulls.len() >= 2);

    // Hulls are mapped back to the input frame.
    let aabb = mesh.aabb().loosened(1.0e-6);
    for hull in &hulls {
        assert!(hull.vertices().iter().all(|pt| aabb.contains_local_point(pt)));
    }

    let total: f64 = hulls.iter().map(|h| h.volume()).sum();
    assert!(total >= mesh.volume() - 1.0e-6, "{total}");
}

#[test]
fn bounded_hull_count() {
    let params = DecompositionParameters {
        threshold: 0.01,
        max_convex_hulls: Some(3),
        ..fast_parameters()
    };
    let hulls = run(&l_prism(), params);
    assert!(!hulls.is_empty() && hulls.len() <= 3);
}

#[test]
fn decimated_hulls_have_few_vertices() {
    let params = DecompositionParameters {
        decimate: true,
        max_ch_vertex: 8,
        ..fast_parameters()
    };

    for hull in run(&l_prism(), params) {
        assert!(hull.vertices().len() <= 8);
    }
}

#[test]
fn flat_hulls_are_extruded() {
    let square = TriMesh::from_buffers(
        &[
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
        ],
        &[0, 1, 2, 0, 2, 3],
    )
    .unwrap();
    let params = DecompositionParameters {
        preprocess_mode: PreprocessMode::Off,
        extrude: true,
        extrude_margin: 0.01,
        ..fast_parameters()
    };

    let hulls = run(&square, params);
    assert_eq!(hulls.len(), 1);
    // The margin applies in the normalized frame, where the square spans [-1, 1]².
    assert_relative_eq!(hulls[0].volume(), 0.01, epsilon = 1.0e-6);
}

#[test]
fn raised_cancel_flag_aborts() {
    let cancel = Arc::new(AtomicBool::new(true));
    let result = ConvexDecomposition::new(fast_parameters())
        .with_diagnostics(Diagnostics::silent())
        .with_cancel_flag(cancel)
        .decompose(&dumbbell());

    assert_eq!(result, Err(DecompositionError::Cancelled));
}

#[test]
fn triangle_limit_is_enforced() {
    let params = DecompositionParameters {
        limits: ResourceLimits {
            max_triangles: 4,
            ..ResourceLimits::default()
        },
        ..fast_parameters()
    };
    let result = ConvexDecomposition::new(params)
        .with_diagnostics(Diagnostics::silent())
        .decompose(&cuboid([0.0; 3], [1.0; 3]));

    assert_eq!(
        result,
        Err(DecompositionError::ResourceExhausted {
            resource: "triangles",
            requested: 12,
            limit: 4,
        })
    );
}

#[test]
fn mesh_score_of_convex_mesh() {
    let score = ConvexDecomposition::new(fast_parameters())
        .with_diagnostics(Diagnostics::silent())
        .mesh_score(&cuboid([0.0; 3], [2.0, 1.0, 1.0]))
        .unwrap();

    assert_eq!(score.part_count, 1);
    assert!(score.avg_concavity < 1.0e-3);
}

#[test]
fn mesh_score_of_dumbbell() {
    let score = ConvexDecomposition::new(fast_parameters())
        .with_diagnostics(Diagnostics::silent())
        .mesh_score(&dumbbell())
        .unwrap();

    assert!(score.part_count >= 2);
    assert!(score.avg_concavity < 0.1, "{}", score.avg_concavity);
}
