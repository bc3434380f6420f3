use super::VoxelizedVolume;
use crate::decomposition::{DecompositionError, PreprocessMode, ResourceLimits};
use crate::math::{Point, Real};
use crate::shape::TriMesh;
use crate::utils::hashmap::HashMap;

// Pairs of voxels sharing only an edge: the diagonal offset, followed by its
// two axis-aligned components.
const EDGE_DIAGONALS: [[[i64; 3]; 3]; 6] = [
    [[1, 1, 0], [1, 0, 0], [0, 1, 0]],
    [[1, -1, 0], [1, 0, 0], [0, -1, 0]],
    [[1, 0, 1], [1, 0, 0], [0, 0, 1]],
    [[1, 0, -1], [1, 0, 0], [0, 0, -1]],
    [[0, 1, 1], [0, 1, 0], [0, 0, 1]],
    [[0, 1, -1], [0, 1, 0], [0, 0, -1]],
];

// Pairs of voxels sharing only a vertex.
const VERTEX_DIAGONALS: [[i64; 3]; 4] = [[1, 1, 1], [1, 1, -1], [1, -1, 1], [1, -1, -1]];

/// Repairs `mesh` so that it becomes a closed, oriented, manifold surface.
///
/// With [`PreprocessMode::Off`] the mesh is returned unchanged. With
/// [`PreprocessMode::Auto`] only meshes failing [`TriMesh::is_manifold`] are
/// repaired. A repaired mesh is the boundary of the voxelization of the input,
/// made well-composed, with `resolution` voxels along its longest side.
pub fn repair(
    mesh: &TriMesh,
    mode: PreprocessMode,
    resolution: u32,
    limits: &ResourceLimits,
) -> Result<TriMesh, DecompositionError> {
    match mode {
        PreprocessMode::Off => return Ok(mesh.clone()),
        PreprocessMode::Auto if mesh.is_manifold() => return Ok(mesh.clone()),
        _ => {}
    }

    let dims = VoxelizedVolume::grid_dimensions(&mesh.aabb(), resolution);
    let num_voxels = dims.iter().map(|d| *d as usize).product::<usize>();

    if num_voxels > limits.max_voxels {
        return Err(DecompositionError::ResourceExhausted {
            resource: "voxels",
            requested: num_voxels,
            limit: limits.max_voxels,
        });
    }

    let mut volume = VoxelizedVolume::voxelize(mesh, resolution);
    make_well_composed(&mut volume);
    Ok(extract_boundary(&volume))
}

/// Fills voxels until no two solid (or two empty) voxels touch through an edge
/// or a vertex only. The boundary of a well-composed voxel set is a manifold.
pub fn make_well_composed(volume: &mut VoxelizedVolume) {
    let [ni, nj, nk] = volume.resolution();
    let at = |v: [i64; 3], d: [i64; 3]| [v[0] + d[0], v[1] + d[1], v[2] + d[2]];

    loop {
        let mut to_fill = vec![];

        for k in 0..nk as i64 {
            for j in 0..nj as i64 {
                for i in 0..ni as i64 {
                    let v = [i, j, k];
                    let solid = volume.is_solid(v);

                    for [d, da, db] in EDGE_DIAGONALS {
                        let (a, b) = (at(v, da), at(v, db));

                        if solid
                            && volume.is_solid(at(v, d))
                            && !volume.is_solid(a)
                            && !volume.is_solid(b)
                        {
                            to_fill.push(a);
                        }
                    }

                    for d in VERTEX_DIAGONALS {
                        let opposite = at(v, d);
                        let others = [
                            [d[0], 0, 0],
                            [0, d[1], 0],
                            [0, 0, d[2]],
                            [d[0], d[1], 0],
                            [d[0], 0, d[2]],
                            [0, d[1], d[2]],
                        ];

                        if volume.is_solid(opposite) != solid {
                            continue;
                        }

                        if others.iter().all(|o| volume.is_solid(at(v, *o)) != solid) {
                            // Two solid voxels touching through a vertex: connect them.
                            // Two empty voxels touching through a vertex: fill one of them.
                            to_fill.push(if solid { at(v, others[0]) } else { v });
                        }
                    }
                }
            }
        }

        let mut changed = false;

        for v in to_fill {
            if (0..3).all(|c| v[c] >= 0 && v[c] < volume.resolution()[c] as i64)
                && !volume.is_solid(v)
            {
                volume.fill(v[0] as u32, v[1] as u32, v[2] as u32);
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }
}

/// Extracts the boundary of the solid voxels as an outward-oriented triangle mesh.
///
/// Each exposed voxel face becomes two triangles; vertices are shared between
/// adjacent faces.
pub fn extract_boundary(volume: &VoxelizedVolume) -> TriMesh {
    let [ni, nj, nk] = volume.resolution();
    let mut corner_ids = HashMap::default();
    let mut vertices = vec![];
    let mut indices = vec![];
    let origin = volume.origin();
    let scale = volume.scale();

    let mut corner = |c: [i64; 3], vertices: &mut Vec<Point<Real>>| -> u32 {
        let key = (c[0] as u64) | ((c[1] as u64) << 21) | ((c[2] as u64) << 42);
        *corner_ids.entry(key).or_insert_with(|| {
            vertices.push(Point::new(
                origin.x + (c[0] as Real - 0.5) * scale,
                origin.y + (c[1] as Real - 0.5) * scale,
                origin.z + (c[2] as Real - 0.5) * scale,
            ));
            vertices.len() as u32 - 1
        })
    };

    for k in 0..nk as i64 {
        for j in 0..nj as i64 {
            for i in 0..ni as i64 {
                let v = [i, j, k];

                if !volume.is_solid(v) {
                    continue;
                }

                for axis in 0..3 {
                    let u = (axis + 1) % 3;
                    let w = (axis + 2) % 3;

                    for positive in [false, true] {
                        let mut neighbor = v;
                        neighbor[axis] += if positive { 1 } else { -1 };

                        if volume.is_solid(neighbor) {
                            continue;
                        }

                        // The face lies on the corner layer `v[axis] + 1` for the positive side.
                        let mut base = v;
                        base[axis] += positive as i64;

                        let quad = [[0, 0], [1, 0], [1, 1], [0, 1]].map(|[du, dw]| {
                            let mut c = base;
                            c[u] += du;
                            c[w] += dw;
                            corner(c, &mut vertices)
                        });

                        // `e_u × e_w = e_axis`, so this order faces the positive side.
                        if positive {
                            indices.push([quad[0], quad[1], quad[2]]);
                            indices.push([quad[0], quad[2], quad[3]]);
                        } else {
                            indices.push([quad[0], quad[2], quad[1]]);
                            indices.push([quad[0], quad[3], quad[2]]);
                        }
                    }
                }
            }
        }
    }

    TriMesh::new_unchecked(vertices, indices)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bounding_volume::Aabb;

    #[test]
    fn repair_open_box() {
        // A cube with its top face removed.
        let cube = TriMesh::from_aabb(&Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0)));
        let (vertices, indices) = cube.into_parts();
        let indices: Vec<_> = indices
            .into_iter()
            .filter(|tri| !tri.iter().all(|i| vertices[*i as usize].z == 1.0))
            .collect();
        let open = TriMesh::new(vertices, indices).unwrap();
        assert!(!open.is_manifold());

        let repaired = repair(&open, PreprocessMode::Auto, 20, &ResourceLimits::default()).unwrap();
        assert!(repaired.is_manifold());
        assert!(repaired.volume() > 0.0);
    }

    #[test]
    fn repair_respects_modes_and_limits() {
        let cube = TriMesh::from_aabb(&Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0)));
        let limits = ResourceLimits::default();
        assert_eq!(repair(&cube, PreprocessMode::Auto, 20, &limits).unwrap(), cube);
        assert_eq!(repair(&cube, PreprocessMode::Off, 20, &limits).unwrap(), cube);

        let repaired = repair(&cube, PreprocessMode::On, 20, &limits).unwrap();
        assert!(repaired.is_manifold());
        assert_relative_eq!(repaired.volume(), 1.0, epsilon = 0.5);

        let tiny = ResourceLimits {
            max_voxels: 10,
            ..limits
        };
        assert!(matches!(
            repair(&cube, PreprocessMode::On, 20, &tiny),
            Err(DecompositionError::ResourceExhausted { .. })
        ));
    }

    #[test]
    fn vertex_touching_voxels_become_well_composed() {
        // Two cubes touching through a single corner.
        let a = TriMesh::from_aabb(&Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0)));
        let b = TriMesh::from_aabb(&Aabb::new(Point::new(1.0, 1.0, 1.0), Point::new(2.0, 2.0, 2.0)));
        let mesh = a.concatenated(&b);

        let repaired = repair(&mesh, PreprocessMode::On, 8, &ResourceLimits::default()).unwrap();
        assert!(repaired.is_manifold());
    }
}
