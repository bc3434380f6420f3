use super::{convex_hull, ConvexHullError};
use crate::math::{Point, Real};
use crate::shape::TriMesh;

/// Reduces the number of vertices of a convex hull to at most `max_vertices`.
///
/// Vertices are removed one at a time, always picking the one whose removal
/// loses the least volume, and the hull is recomputed after each removal. The
/// result never has fewer than 4 vertices.
pub fn decimate(hull: &TriMesh, max_vertices: usize) -> Result<TriMesh, ConvexHullError> {
    let max_vertices = max_vertices.max(4);
    let mut vertices = hull.vertices().to_vec();
    let mut indices = hull.indices().to_vec();

    while vertices.len() > max_vertices {
        let Some(worst) = least_significant_vertex(&vertices, &indices) else {
            break;
        };

        let _ = vertices.swap_remove(worst);
        (vertices, indices) = convex_hull(&vertices)?;
    }

    Ok(TriMesh::new_unchecked(vertices, indices))
}

// The vertex with the smallest cap, i.e., the volume between the vertex and its
// ring of neighbors, fanned around their centroid.
fn least_significant_vertex(vertices: &[Point<Real>], indices: &[[u32; 3]]) -> Option<usize> {
    let mut rings = vec![vec![]; vertices.len()];

    for tri in indices {
        for k in 0..3 {
            rings[tri[k] as usize].push([tri[(k + 1) % 3], tri[(k + 2) % 3]]);
        }
    }

    let mut best = None;
    let mut best_cost = Real::MAX;

    for (i, ring) in rings.iter().enumerate() {
        if ring.is_empty() {
            continue;
        }

        let centroid = ring
            .iter()
            .map(|[a, _]| vertices[*a as usize].coords)
            .sum::<na::Vector3<Real>>()
            / ring.len() as Real;
        let apex = vertices[i].coords - centroid;
        let cost: Real = ring
            .iter()
            .map(|[a, b]| {
                let a = vertices[*a as usize].coords - centroid;
                let b = vertices[*b as usize].coords - centroid;
                apex.dot(&a.cross(&b)).abs() / 6.0
            })
            .sum();

        if cost < best_cost {
            best_cost = cost;
            best = Some(i);
        }
    }

    best
}
