use super::DecompositionParameters;
use crate::math::{Point, Real};
use crate::partitioning::TriangleBvh;
use crate::shape::TriMesh;
use crate::transformation::sample_surface;
use crate::utils::seeded_rng;
use std::f64::consts::PI;

// Identifies the sampling sub-stream, so concavities never share random numbers
// with the tree search.
const SAMPLING_STREAM: u64 = 0x5a3b;

/// Measures how far a mesh is from its convex approximation.
///
/// The concavity is the larger of the (sampled) symmetric Hausdorff distance
/// between both surfaces and `rv_k` times the radius of a sphere with the same
/// volume as the volume gap between them, divided by a characteristic length.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConcavityMetric {
    /// The number of random samples drawn on each surface, in addition to its vertices.
    pub resolution: usize,
    /// The weight of the volume-gap term.
    pub rv_k: Real,
    /// The seed of the surface sampling.
    pub seed: u64,
    /// The length concavities are divided by.
    pub characteristic_length: Real,
}

impl ConcavityMetric {
    /// The metric configured by `params`, for meshes of the given characteristic length.
    pub fn new(params: &DecompositionParameters, characteristic_length: Real) -> Self {
        Self {
            resolution: params.resolution,
            rv_k: params.rv_k,
            seed: params.seed,
            characteristic_length: if characteristic_length > 0.0 {
                characteristic_length
            } else {
                1.0
            },
        }
    }

    /// The concavity of `part` relative to `hull`.
    ///
    /// Returns zero if either mesh is empty.
    pub fn concavity(&self, part: &TriMesh, hull: &TriMesh) -> Real {
        if part.is_empty() || hull.is_empty() {
            return 0.0;
        }

        let distance = self.hausdorff_distance(part, hull);
        let gap = self.rv_k * volume_gap_radius(part, hull);
        distance.max(gap) / self.characteristic_length
    }

    /// The symmetric Hausdorff distance between the surfaces of `a` and `b`,
    /// estimated from a seeded set of surface samples.
    pub fn hausdorff_distance(&self, a: &TriMesh, b: &TriMesh) -> Real {
        let mut rng = seeded_rng(self.seed, &[SAMPLING_STREAM]);
        let samples_a = sample_surface(a, self.resolution, &mut rng);
        let samples_b = sample_surface(b, self.resolution, &mut rng);

        let bvh_a = TriangleBvh::new(a);
        let bvh_b = TriangleBvh::new(b);

        one_sided_distance(&samples_a, &bvh_b).max(one_sided_distance(&samples_b, &bvh_a))
    }

    /// The concavity of the union of two parts relative to `hull`, the hull of both.
    ///
    /// Only the distance from the hull surface to the parts is measured, since the
    /// faces along which both parts touch lie inside the hull.
    pub fn merged_concavity(&self, a: &TriMesh, b: &TriMesh, hull: &TriMesh) -> Real {
        if hull.is_empty() {
            return 0.0;
        }

        let union = a.concatenated(b);
        let mut rng = seeded_rng(self.seed, &[SAMPLING_STREAM]);
        let samples = sample_surface(hull, self.resolution, &mut rng);
        let distance = one_sided_distance(&samples, &TriangleBvh::new(&union));

        let gap = (hull.volume() - a.volume() - b.volume()).abs();
        let radius = (3.0 * gap / (4.0 * PI)).cbrt();

        distance.max(self.rv_k * radius) / self.characteristic_length
    }
}

fn one_sided_distance(samples: &[Point<Real>], target: &TriangleBvh) -> Real {
    samples
        .iter()
        .filter_map(|pt| target.distance_to_point(pt))
        .fold(0.0, Real::max)
}

/// The radius of the sphere whose volume equals the volume difference between
/// `part` and `hull`.
pub fn volume_gap_radius(part: &TriMesh, hull: &TriMesh) -> Real {
    let gap = (hull.volume() - part.volume()).abs();
    (3.0 * gap / (4.0 * PI)).cbrt()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bounding_volume::Aabb;
    use crate::transformation::convex_hull_mesh;

    fn metric() -> ConcavityMetric {
        ConcavityMetric {
            resolution: 300,
            rv_k: 0.3,
            seed: 0,
            characteristic_length: 1.0,
        }
    }

    // An L-shaped prism: the unit square minus its upper right quarter, extruded along z.
    fn l_shape() -> TriMesh {
        let profile = [
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 0.5],
            [0.5, 0.5],
            [0.5, 1.0],
            [0.0, 1.0],
        ];
        let mut vertices = vec![];
        for z in [0.0, 1.0] {
            vertices.extend(profile.iter().map(|p| Point::new(p[0], p[1], z)));
        }

        let mut indices = vec![
            // Bottom (facing -z) and top (facing +z).
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

    #[test]
    fn convex_mesh_has_zero_concavity() {
        let cube = TriMesh::from_aabb(&Aabb::new(Point::origin(), Point::new(1.0, 2.0, 1.0)));
        let hull = convex_hull_mesh(&cube).unwrap();
        assert_relative_eq!(metric().concavity(&cube, &hull), 0.0, epsilon = 1.0e-4);
    }

    #[test]
    fn l_shape_is_concave() {
        let mesh = l_shape();
        assert!(mesh.is_manifold());
        assert_relative_eq!(mesh.volume(), 0.75, epsilon = 1.0e-9);

        let hull = convex_hull_mesh(&mesh).unwrap();
        assert_relative_eq!(hull.volume(), 0.875, epsilon = 1.0e-9);

        let concavity = metric().concavity(&mesh, &hull);
        // The notch corner is at distance sqrt(2)/4 from the hull.
        assert!(concavity > 0.2 && concavity <= 0.36, "{concavity}");
        assert_eq!(concavity, metric().concavity(&mesh, &hull));
    }

    #[test]
    fn merged_halves_are_convex() {
        let left = TriMesh::from_aabb(&Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0)));
        let right = TriMesh::from_aabb(&Aabb::new(Point::new(1.0, 0.0, 0.0), Point::new(2.0, 1.0, 1.0)));
        let hull = convex_hull_mesh(&left.concatenated(&right)).unwrap();
        assert_relative_eq!(metric().merged_concavity(&left, &right, &hull), 0.0, epsilon = 1.0e-4);

        let far = TriMesh::from_aabb(&Aabb::new(Point::new(3.0, 0.0, 0.0), Point::new(4.0, 1.0, 1.0)));
        let hull = convex_hull_mesh(&left.concatenated(&far)).unwrap();
        assert!(metric().merged_concavity(&left, &far, &hull) > 0.4);
    }

    #[test]
    fn volume_gap() {
        let small = TriMesh::from_aabb(&Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0)));
        let big = TriMesh::from_aabb(&Aabb::new(Point::origin(), Point::new(2.0, 1.0, 1.0)));
        let expected = (3.0 / (4.0 * PI)).cbrt();
        assert_relative_eq!(volume_gap_radius(&small, &big), expected, epsilon = 1.0e-9);
    }
}
