use acd3d::bounding_volume::Aabb;
use acd3d::na::Point3;
use acd3d::TriMesh;

pub fn cuboid(mins: [f64; 3], maxs: [f64; 3]) -> TriMesh {
    TriMesh::from_aabb(&Aabb::new(Point3::from(mins), Point3::from(maxs)))
}

/// Two unit cubes joined by a thin bar along `x`.
///
/// The three boxes are only concatenated, so the mesh isn't manifold.
pub fn dumbbell() -> TriMesh {
    let left = cuboid([-2.0, -0.5, -0.5], [-1.0, 0.5, 0.5]);
    let bar = cuboid([-1.0, -0.1, -0.1], [1.0, 0.1, 0.1]);
    let right = cuboid([1.0, -0.5, -0.5], [2.0, 0.5, 0.5]);
    left.concatenated(&bar).concatenated(&right)
}

/// The square `[0, 2]²` minus its upper right quarter, extruded along `z`.
pub fn l_prism() -> TriMesh {
    let profile = [
        [0.0, 0.0],
        [2.0, 0.0],
        [2.0, 1.0],
        [1.0, 1.0],
        [1.0, 2.0],
        [0.0, 2.0],
    ];
    let mut vertices = vec![];
    for z in [0.0, 1.0] {
        vertices.extend(profile.iter().map(|p| Point3::new(p[0], p[1], z)));
    }

    let mut indices = vec![
        [0, 3, 1],
        [1, 3, 2],
        [0, 5, 3],
        [3, 5, 4],
        [6, 7, 9],
        [7, 8, 9],
        [6, 9, 11],
        [9, 10, 11],
    ];
    for i in 0..6u32 {
        let j = (i + 1) % 6;
        indices.push([i, j, j + 6]);
        indices.push([i, j + 6, i + 6]);
    }

    TriMesh::new(vertices, indices).unwrap()
}

/// A closed cube `[0, 1]³` with its top face removed.
pub fn open_box() -> TriMesh {
    let cube = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
    let (vertices, indices) = cube.into_parts();
    let indices = indices
        .into_iter()
        .filter(|tri| !tri.iter().all(|i| vertices[*i as usize].z == 1.0))
        .collect();
    TriMesh::new(vertices, indices).unwrap()
}
