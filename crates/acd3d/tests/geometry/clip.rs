use crate::shapes::{cuboid, l_prism};
use acd3d::{clip, CuttingPlane};
use approx::assert_relative_eq;

#[test]
fn clip_preserves_volume() {
    let cube = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
    let [below, above] = clip(&cube, &CuttingPlane::axis_aligned(0, 0.3)).unwrap();

    assert_relative_eq!(below.volume(), 0.3, epsilon = 1.0e-9);
    assert_relative_eq!(above.volume(), 0.7, epsilon = 1.0e-9);
}

#[test]
fn oblique_clip_preserves_volume() {
    let mesh = l_prism();
    let plane = CuttingPlane::new(1.0, 1.0, 0.2, -1.7);
    let [below, above] = clip(&mesh, &plane).unwrap();

    assert_relative_eq!(below.volume() + above.volume(), mesh.volume(), epsilon = 1.0e-9);
    for idx in below.indices().iter().flatten() {
        assert!(plane.side(&below.vertices()[*idx as usize]) <= 1.0e-6);
    }
    for idx in above.indices().iter().flatten() {
        assert!(plane.side(&above.vertices()[*idx as usize]) >= -1.0e-6);
    }
}

#[test]
fn missing_plane_leaves_mesh_whole() {
    let cube = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
    let [below, above] = clip(&cube, &CuttingPlane::axis_aligned(2, 5.0)).unwrap();

    assert!(above.is_empty());
    assert_relative_eq!(below.volume(), 1.0, epsilon = 1.0e-9);
}
