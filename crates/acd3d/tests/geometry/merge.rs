use crate::shapes::cuboid;
use acd3d::decomposition::{ConvexDecomposition, DecompositionParameters, Diagnostics};
use acd3d::{clip, merge, CuttingPlane};

#[test]
fn single_part_is_returned_as_is() {
    let cube = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
    let merged = merge(&cube, &[cube.clone()], &[cube.clone()]).unwrap();
    assert_eq!(merged, vec![cube]);
}

#[test]
fn halves_of_a_box_are_merged() {
    let slab = cuboid([0.0, 0.0, 0.0], [2.0, 1.0, 1.0]);
    let [left, right] = clip(&slab, &CuttingPlane::axis_aligned(0, 1.0)).unwrap();
    let parts = [left.clone(), right.clone()];

    let merged = ConvexDecomposition::new(DecompositionParameters {
        resolution: 300,
        ..DecompositionParameters::default()
    })
    .with_diagnostics(Diagnostics::silent())
    .merge(&slab, &parts, &parts)
    .unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].aabb(), slab.aabb());
}

#[test]
fn distant_boxes_are_kept_apart() {
    let a = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
    let b = cuboid([4.0, 0.0, 0.0], [5.0, 1.0, 1.0]);
    let mesh = a.concatenated(&b);
    let parts = [a, b];

    let merged = merge(&mesh, &parts, &parts).unwrap();
    assert_eq!(merged.len(), 2);
}
