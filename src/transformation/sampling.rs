use crate::math::{Point, Real};
use crate::shape::TriMesh;
use rand::Rng;

/// Samples points on the surface of a mesh.
///
/// Returns every vertex of the mesh followed by `num_samples` points drawn
/// uniformly (area-weighted) on its triangles. Meshes with a zero area only
/// yield their vertices.
pub fn sample_surface(mesh: &TriMesh, num_samples: usize, rng: &mut impl Rng) -> Vec<Point<Real>> {
    let mut samples = mesh.vertices().to_vec();

    // Cumulative area, used to select triangles proportionally to their area.
    let mut cdf = Vec::with_capacity(mesh.num_triangles());
    let mut total_area = 0.0;

    for tri in mesh.triangles() {
        total_area += tri.area();
        cdf.push(total_area);
    }

    if total_area <= 0.0 || !total_area.is_finite() {
        return samples;
    }

    samples.reserve(num_samples);

    for _ in 0..num_samples {
        let target = rng.gen::<Real>() * total_area;
        let tri_id = cdf.partition_point(|a| *a <= target).min(cdf.len() - 1);
        samples.push(mesh.triangle(tri_id).sample(rng.gen(), rng.gen()));
    }

    samples
}
