use crate::bounding_volume::Aabb;
use crate::math::{Real, Vector};
use crate::shape::Triangle;

/// Tests if a triangle intersects an AABB.
///
/// This is a separating-axis test on the 13 candidate axes: the three AABB face
/// normals, the triangle normal, and the nine cross products between the AABB
/// axes and the triangle edges.
pub fn intersection_test_aabb_triangle(aabb: &Aabb, triangle: &Triangle) -> bool {
    let center = aabb.center();
    let half_extents = aabb.half_extents();
    let v = [
        triangle.a - center,
        triangle.b - center,
        triangle.c - center,
    ];
    let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];

    // The AABB face normals.
    for i in 0..3 {
        let min = v[0][i].min(v[1][i]).min(v[2][i]);
        let max = v[0][i].max(v[1][i]).max(v[2][i]);

        if min > half_extents[i] || max < -half_extents[i] {
            return false;
        }
    }

    // Edge-edge cross products.
    for edge in &edges {
        for i in 0..3 {
            let mut axis = Vector::zeros();
            axis[i] = 1.0;
            let axis = axis.cross(edge);

            if axis.norm_squared() <= crate::math::DEFAULT_EPSILON {
                continue;
            }

            if is_separating_axis(&axis, &v, &half_extents) {
                return false;
            }
        }
    }

    // The triangle normal.
    let normal = edges[0].cross(&edges[1]);
    !is_separating_axis(&normal, &v, &half_extents)
}

fn is_separating_axis(axis: &Vector<Real>, v: &[Vector<Real>; 3], half_extents: &Vector<Real>) -> bool {
    let p0 = axis.dot(&v[0]);
    let p1 = axis.dot(&v[1]);
    let p2 = axis.dot(&v[2]);
    let radius = half_extents.dot(&axis.abs());
    p0.min(p1).min(p2) > radius || p0.max(p1).max(p2) < -radius
}
