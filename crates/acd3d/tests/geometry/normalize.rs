use crate::shapes::l_prism;
use acd3d::na::{Point3, Rotation3, Vector3};
use acd3d::{normalize, TriMesh};
use approx::assert_relative_eq;

fn tilted_prism() -> TriMesh {
    let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), 0.4);
    l_prism().map_vertices(|pt| rotation * pt + Vector3::new(10.0, -3.0, 2.0))
}

#[test]
fn canonical_frame_fits_unit_cube() {
    let mesh = tilted_prism();

    for use_pca in [false, true] {
        let (_, canonical) = normalize(&mesh, use_pca).unwrap();
        let aabb = canonical.aabb();

        assert_relative_eq!(aabb.max_extent(), 2.0, epsilon = 1.0e-9);
        assert_relative_eq!(aabb.center(), Point3::origin(), epsilon = 1.0e-9);
    }
}

#[test]
fn frame_round_trip() {
    let mesh = tilted_prism();

    for use_pca in [false, true] {
        let (frame, canonical) = normalize(&mesh, use_pca).unwrap();
        let restored = frame.mesh_to_original(&canonical);

        for (a, b) in restored.vertices().iter().zip(mesh.vertices()) {
            assert_relative_eq!(*a, *b, epsilon = 1.0e-9);
        }

        let bounds = frame.original_bounds();
        let aabb = mesh.aabb();
        assert_eq!(
            bounds,
            [
                aabb.mins.x, aabb.maxs.x, aabb.mins.y, aabb.maxs.y, aabb.mins.z, aabb.maxs.z
            ]
        );
    }
}
