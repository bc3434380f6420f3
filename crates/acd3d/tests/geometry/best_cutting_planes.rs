use crate::shapes::dumbbell;
use acd3d::decomposition::{ConvexDecomposition, DecompositionParameters, Diagnostics};

fn engine() -> ConvexDecomposition {
    ConvexDecomposition::new(DecompositionParameters {
        resolution: 300,
        mcts_nodes: 8,
        mcts_iterations: 12,
        mcts_max_depth: 2,
        ..DecompositionParameters::default()
    })
    .with_diagnostics(Diagnostics::silent())
}

#[test]
fn dumbbell_is_best_cut_through_its_bar() {
    let planes = engine().best_cutting_planes(&dumbbell(), 3).unwrap();
    assert_eq!(planes.len(), 3);

    for pair in planes.windows(2) {
        assert!(pair[0].score <= pair[1].score);
    }

    let best = planes[0];
    assert_eq!(best.axis(), Some(0));
    // The plane crosses the bar, which spans x in [-1, 1].
    let x = -best.d / best.a;
    assert!(x > -1.0 && x < 1.0, "{x}");
}

#[test]
fn zero_planes_requested() {
    assert!(engine().best_cutting_planes(&dumbbell(), 0).unwrap().is_empty());
}

#[test]
fn best_cutting_plane_is_deterministic() {
    let mesh = dumbbell();
    let first = engine().best_cutting_plane(&mesh).unwrap();
    let second = engine().best_cutting_plane(&mesh).unwrap();

    assert!(first.is_some());
    assert_eq!(first, second);
}
