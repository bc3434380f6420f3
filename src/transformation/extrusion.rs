use super::{convex_hull, ConvexHullError};
use crate::math::{Point, Real, Vector};
use crate::shape::TriMesh;

/// Thickens a flat convex part.
///
/// If the thickness of `part` (`2 · volume / area`) is smaller than `margin`,
/// each vertex is offset by `margin` along both directions of the normals of its
/// incident triangles, and the convex hull of the offset points is returned.
/// Parts without any valid triangle (points, segments) are offset along the
/// coordinate axes instead. Thick enough parts are returned unchanged.
pub fn extrude(part: &TriMesh, margin: Real) -> Result<TriMesh, ConvexHullError> {
    if margin <= 0.0 || part.vertices().is_empty() {
        return Ok(part.clone());
    }

    let area = part.area();
    let thickness = if area > 0.0 {
        2.0 * part.volume().abs() / area
    } else {
        0.0
    };

    if thickness >= margin {
        return Ok(part.clone());
    }

    let mut normals = vec![vec![]; part.vertices().len()];

    for (tri, idx) in part.triangles().zip(part.indices()) {
        if let Some(n) = tri.normal() {
            for i in idx {
                normals[*i as usize].push(n.into_inner());
            }
        }
    }

    let axes = [Vector::x(), Vector::y(), Vector::z()];
    let mut points: Vec<Point<Real>> = vec![];

    for (pt, normals) in part.vertices().iter().zip(&normals) {
        let dirs = if normals.is_empty() { &axes[..] } else { &normals[..] };

        for dir in dirs {
            points.push(pt + dir * margin);
            points.push(pt - dir * margin);
        }
    }

    let (vertices, indices) = convex_hull(&points)?;
    Ok(TriMesh::new_unchecked(vertices, indices))
}
