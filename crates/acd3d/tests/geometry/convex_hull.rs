use crate::shapes::{cuboid, l_prism};
use acd3d::convex_hull;
use approx::assert_relative_eq;

#[test]
fn hull_of_convex_mesh() {
    let cube = cuboid([-1.0, 0.0, 2.0], [1.0, 3.0, 2.5]);
    let result = convex_hull(&cube).unwrap();

    assert_relative_eq!(result.hull.volume(), cube.volume(), epsilon = 1.0e-9);
    assert!(result.concavity < 1.0e-3);
}

#[test]
fn hull_of_concave_mesh() {
    let mesh = l_prism();
    let result = convex_hull(&mesh).unwrap();

    assert_relative_eq!(result.hull.volume(), 3.5, epsilon = 1.0e-9);
    assert!(result.hull.is_manifold());
    assert!(result.concavity > 0.05);
}
