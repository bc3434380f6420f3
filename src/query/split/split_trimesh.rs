use crate::math::{Point, Point2, Real, Vector};
use crate::shape::{CuttingPlane, TriMesh};
use crate::utils::hashmap::HashMap;
use crate::utils::{self, SortedPair};
use arrayvec::ArrayVec;
use spade::{ConstrainedDelaunayTriangulation, Point2 as Pt2, Triangulation};

/// The result of splitting a triangle mesh by a plane.
#[derive(Clone, Debug)]
pub struct TriMeshSplit {
    /// The part of the mesh where `a·x + b·y + c·z + d < 0`, closed by a cap facing the plane normal.
    pub below: TriMesh,
    /// The part of the mesh where `a·x + b·y + c·z + d > 0`, closed by a cap facing away from the plane normal.
    pub above: TriMesh,
    /// The area of the cross-section closing each side.
    pub cut_area: Real,
}

impl TriMeshSplit {
    /// Did the plane actually separate the mesh into two non-empty parts?
    pub fn is_cut(&self) -> bool {
        !self.below.is_empty() && !self.above.is_empty()
    }
}

// Color 1 = on negative half-space.
//       2 = on positive half-space.
//       0 = on the plane (only the new intersection vertices).
const ON_PLANE: u8 = 0;
const BELOW: u8 = 1;
const ABOVE: u8 = 2;
const MAX_NUDGES: usize = 16;

/// Splits `mesh` by `plane` into two closed meshes.
///
/// Triangles crossing the plane are split along it, and the cross-section is
/// re-triangulated with a constrained Delaunay triangulation to close both sides.
/// If the plane does not cross the mesh, one side is the whole mesh and the
/// other one is [`TriMesh::empty`].
///
/// When some vertices lie (almost) exactly on the plane, the plane is slightly
/// shifted along its normal so that no vertex sits on it.
pub fn split_trimesh(mesh: &TriMesh, plane: &CuttingPlane) -> TriMeshSplit {
    let vertices = mesh.vertices();

    let Some(plane) = plane.normalized() else {
        return TriMeshSplit {
            below: mesh.clone(),
            above: TriMesh::empty(),
            cut_area: 0.0,
        };
    };
    let normal = plane.normal();

    // 1. Partition the vertices.
    let aabb = mesh.aabb();
    let scale = aabb.mins.coords.abs().sup(&aabb.maxs.coords.abs()).max().max(1.0);
    let step = scale * 1.0e-9;
    let epsilon = step * 0.25;

    let mut bias = plane.d;
    let mut dists = vec![0.0; vertices.len()];

    for k in 0..=MAX_NUDGES {
        if k > 0 {
            // Alternate sides with increasing amplitudes: +1, -1, +2, -2…
            let amplitude = k.div_ceil(2) as Real;
            let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
            bias = plane.d + sign * amplitude * step;
        }

        let mut on_plane = false;

        for (dist, pt) in dists.iter_mut().zip(vertices.iter()) {
            *dist = normal.dot(&pt.coords) + bias;
            on_plane = on_plane || dist.abs() <= epsilon;
        }

        if !on_plane {
            break;
        }
    }

    let mut colors: Vec<u8> = dists
        .iter()
        .map(|d| if *d < 0.0 { BELOW } else { ABOVE })
        .collect();

    let used_colors = mesh.indices().iter().flatten().fold((false, false), |acc, i| {
        let c = colors[*i as usize];
        (acc.0 || c == BELOW, acc.1 || c == ABOVE)
    });

    // Exit early if `mesh` isn’t crossed by the plane.
    match used_colors {
        (true, false) | (false, false) => {
            return TriMeshSplit {
                below: mesh.clone(),
                above: TriMesh::empty(),
                cut_area: 0.0,
            }
        }
        (false, true) => {
            return TriMeshSplit {
                below: TriMesh::empty(),
                above: mesh.clone(),
                cut_area: 0.0,
            }
        }
        (true, true) => {}
    }

    // 2. Split the triangles.
    let mut intersections_found = HashMap::default();
    let mut new_vertices = vertices.to_vec();
    let mut new_indices = Vec::with_capacity(mesh.num_triangles() + mesh.num_triangles() / 4);
    let mut cut_segments = vec![];

    let mut intersection = |ia: u32, ib: u32, new_vertices: &mut Vec<Point<Real>>, colors: &mut Vec<u8>| {
        *intersections_found
            .entry(SortedPair::new(ia, ib))
            .or_insert_with(|| {
                // Always interpolate from the same endpoint so both adjacent triangles agree.
                let (ia, ib) = (ia.min(ib) as usize, ia.max(ib) as usize);
                let t = dists[ia] / (dists[ia] - dists[ib]);
                let pt = new_vertices[ia] + (new_vertices[ib] - new_vertices[ia]) * t;
                new_vertices.push(pt);
                colors.push(ON_PLANE);
                new_vertices.len() as u32 - 1
            })
    };

    for idx in mesh.indices() {
        let tri_colors = idx.map(|i| colors[i as usize]);

        if tri_colors[0] == tri_colors[1] && tri_colors[1] == tri_colors[2] {
            new_indices.push(*idx);
            continue;
        }

        // Rotate the triangle so that its lone vertex comes first, preserving the orientation.
        let lone = (0..3)
            .find(|i| tri_colors[(i + 1) % 3] == tri_colors[(i + 2) % 3])
            .unwrap_or(0);
        let [v0, v1, v2] = [idx[lone], idx[(lone + 1) % 3], idx[(lone + 2) % 3]];

        let p01 = intersection(v0, v1, &mut new_vertices, &mut colors);
        let p02 = intersection(v0, v2, &mut new_vertices, &mut colors);

        new_indices.extend([[v0, p01, p02], [p01, v1, v2], [p01, v2, p02]]);
        cut_segments.push([p01, p02]);
    }

    // 3. Partition the new triangles into two trimeshes.
    let mut vertices_lhs = vec![];
    let mut vertices_rhs = vec![];
    let mut indices_lhs = vec![];
    let mut indices_rhs = vec![];
    let mut remap = vec![];

    for (i, pt) in new_vertices.iter().enumerate() {
        match colors[i] {
            ON_PLANE => {
                remap.push((vertices_lhs.len() as u32, vertices_rhs.len() as u32));
                vertices_lhs.push(*pt);
                vertices_rhs.push(*pt);
            }
            BELOW => {
                remap.push((vertices_lhs.len() as u32, u32::MAX));
                vertices_lhs.push(*pt);
            }
            _ => {
                remap.push((u32::MAX, vertices_rhs.len() as u32));
                vertices_rhs.push(*pt);
            }
        }
    }

    for idx in new_indices {
        let tri_colors = idx.map(|i| colors[i as usize]);
        let tri_remap = idx.map(|i| remap[i as usize]);

        if tri_colors.contains(&BELOW) {
            indices_lhs.push(tri_remap.map(|r| r.0));
        } else {
            indices_rhs.push(tri_remap.map(|r| r.1));
        }
    }

    // 4. Close both sides with the triangulated cross-section.
    let cap = triangulate_cross_section(&new_vertices, &cut_segments, &normal, bias);

    for pt in &cap.new_points {
        remap.push((vertices_lhs.len() as u32, vertices_rhs.len() as u32));
        vertices_lhs.push(*pt);
        vertices_rhs.push(*pt);
    }

    for tri in &cap.triangles {
        let tri_remap = tri.map(|i| remap[i as usize]);
        // The cap of the lower part faces `+normal`, the cap of the upper part faces `-normal`.
        indices_lhs.push(tri_remap.map(|r| r.0));
        indices_rhs.push([tri_remap[0].1, tri_remap[2].1, tri_remap[1].1]);
    }

    utils::remove_unused_points(&mut vertices_lhs, &mut indices_lhs);
    utils::remove_unused_points(&mut vertices_rhs, &mut indices_rhs);

    TriMeshSplit {
        below: TriMesh::new_unchecked(vertices_lhs, indices_lhs),
        above: TriMesh::new_unchecked(vertices_rhs, indices_rhs),
        cut_area: cap.area,
    }
}

struct CrossSection {
    // Indices refer to the split vertex buffer, followed by `new_points`.
    triangles: Vec<[u32; 3]>,
    new_points: Vec<Point<Real>>,
    area: Real,
}

/// An orthonormal basis `(u, v)` of the plane with normal `n`, such that `u × v = n`.
fn plane_basis(n: &Vector<Real>) -> (Vector<Real>, Vector<Real>) {
    let helper = if n.x.abs() < 0.6 {
        Vector::x()
    } else if n.y.abs() < 0.6 {
        Vector::y()
    } else {
        Vector::z()
    };
    let u = n.cross(&helper).normalize();
    let v = n.cross(&u);
    (u, v)
}

fn triangulate_cross_section(
    vertices: &[Point<Real>],
    segments: &[[u32; 2]],
    normal: &Vector<Real>,
    bias: Real,
) -> CrossSection {
    let mut result = CrossSection {
        triangles: vec![],
        new_points: vec![],
        area: 0.0,
    };

    if segments.len() < 3 {
        return result;
    }

    let (u, v) = plane_basis(normal);
    let project = |pt: &Point<Real>| Point2::new(pt.coords.dot(&u), pt.coords.dot(&v));
    let origin = Point::from(-*normal * bias);
    let lift = |pt: &Point2<Real>| origin + u * pt.x + v * pt.y;

    let mut cdt = ConstrainedDelaunayTriangulation::<Pt2<Real>>::new();
    // Maps a CDT vertex index to the mesh vertex it was created from.
    let mut handle_to_vertex: HashMap<usize, u32> = HashMap::default();
    let mut vertex_to_handle = HashMap::default();
    let mut soup = Vec::with_capacity(segments.len());

    for seg in segments {
        let mut handles: ArrayVec<_, 2> = ArrayVec::new();

        for vid in seg {
            let pt = project(&vertices[*vid as usize]);
            let handle = match vertex_to_handle.get(vid) {
                Some(handle) => Some(*handle),
                None => match cdt.insert(Pt2::new(pt.x, pt.y)) {
                    Ok(handle) => {
                        let _ = handle_to_vertex.entry(handle.index()).or_insert(*vid);
                        let _ = vertex_to_handle.insert(*vid, handle);
                        Some(handle)
                    }
                    Err(_) => None,
                },
            };
            handles.push(handle);
        }

        if let (Some(a), Some(b)) = (handles[0], handles[1]) {
            if a != b {
                let _ = cdt.add_constraint_and_split(a, b, |v| v);
                soup.push([
                    project(&vertices[seg[0] as usize]),
                    project(&vertices[seg[1] as usize]),
                ]);
            }
        }
    }

    let base = vertices.len() as u32;
    let mut handle_to_pt_id = vec![None; cdt.num_vertices()];

    for face in cdt.inner_faces() {
        let tri_pts = face.vertices().map(|v| {
            let pt = v.data();
            Point2::new(pt.x, pt.y)
        });
        let tri_center = Point2::from((tri_pts[0].coords + tri_pts[1].coords + tri_pts[2].coords) / 3.0);

        if !utils::point_in_segment_soup2d(&tri_center, &soup) {
            continue;
        }

        let tri_idx = face.vertices().map(|v| {
            let index = v.fix().index();

            if let Some(id) = handle_to_pt_id[index] {
                id
            } else {
                let id = match handle_to_vertex.get(&index) {
                    Some(vid) => *vid,
                    None => {
                        // Created by a constraint intersection.
                        let pt = v.data();
                        result.new_points.push(lift(&Point2::new(pt.x, pt.y)));
                        base + result.new_points.len() as u32 - 1
                    }
                };
                handle_to_pt_id[index] = Some(id);
                id
            }
        });

        let ab = tri_pts[1] - tri_pts[0];
        let ac = tri_pts[2] - tri_pts[0];
        result.area += ab.perp(&ac).abs() * 0.5;
        // spade faces are counter-clockwise in the `(u, v)` frame, i.e., they face `+normal`.
        result.triangles.push(tri_idx);
    }

    result
}
