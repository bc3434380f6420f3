use crate::bounding_volume::Aabb;
use crate::math::{Matrix, Point, Real, Rotation, Vector};
use crate::shape::{CuttingPlane, InvalidMeshError, TriMesh};
use crate::utils;
use std::cmp::Ordering;

/// The similarity transform between a mesh and its canonical, normalized, frame.
///
/// A point `p` of the original frame maps to `R · (p - t) / s` in the canonical
/// frame, where `R` is a rotation (the identity unless principal-axis alignment
/// was requested), `t` a translation and `s` a uniform scale.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NormalizationFrame {
    /// The rotation applied after translation.
    pub rotation: Rotation,
    /// The point of the original frame mapped to the canonical origin.
    pub translation: Vector<Real>,
    /// The uniform scale factor dividing the translated coordinates.
    pub scale: Real,
    /// The bounding box of the mesh in its original frame.
    pub original_aabb: Aabb,
    /// The bounding box of the mesh in the canonical frame.
    pub canonical_aabb: Aabb,
}

impl NormalizationFrame {
    /// The identity frame of a mesh with the given bounding box.
    pub fn identity(aabb: Aabb) -> Self {
        Self {
            rotation: Rotation::identity(),
            translation: Vector::zeros(),
            scale: 1.0,
            original_aabb: aabb,
            canonical_aabb: aabb,
        }
    }

    /// Maps a point from the original frame to the canonical frame.
    #[inline]
    pub fn to_canonical(&self, pt: &Point<Real>) -> Point<Real> {
        Point::from(self.rotation * (pt.coords - self.translation) / self.scale)
    }

    /// Maps a point from the canonical frame back to the original frame.
    #[inline]
    pub fn to_original(&self, pt: &Point<Real>) -> Point<Real> {
        Point::from(self.rotation.inverse_transform_vector(&(pt.coords * self.scale)) + self.translation)
    }

    /// Maps every vertex of a canonical-frame mesh back to the original frame.
    pub fn mesh_to_original(&self, mesh: &TriMesh) -> TriMesh {
        mesh.map_vertices(|pt| self.to_original(pt))
    }

    /// Maps every vertex of an original-frame mesh to the canonical frame.
    pub fn mesh_to_canonical(&self, mesh: &TriMesh) -> TriMesh {
        mesh.map_vertices(|pt| self.to_canonical(pt))
    }

    /// Maps a plane expressed in the canonical frame back to the original frame.
    ///
    /// The score is preserved. The normal keeps its norm.
    pub fn plane_to_original(&self, plane: &CuttingPlane) -> CuttingPlane {
        let normal = self.rotation.inverse_transform_vector(&plane.normal());
        let d = plane.d * self.scale - normal.dot(&self.translation);
        CuttingPlane::from_normal_and_offset(normal, d).with_score(plane.score)
    }

    /// The original bounding box as `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub fn original_bounds(&self) -> [Real; 6] {
        let (mins, maxs) = (self.original_aabb.mins, self.original_aabb.maxs);
        [mins.x, maxs.x, mins.y, maxs.y, mins.z, maxs.z]
    }

    /// The frame obtained by applying `self`, then `inner`.
    ///
    /// `inner` must map the canonical frame of `self` to a new canonical frame.
    pub fn then(&self, inner: &NormalizationFrame) -> NormalizationFrame {
        // inner(self(p)) = R2 R1 (p - t1 - s1 R1ᵀ t2) / (s1 s2)
        Self {
            rotation: inner.rotation * self.rotation,
            translation: self.translation
                + self.rotation.inverse_transform_vector(&inner.translation) * self.scale,
            scale: self.scale * inner.scale,
            original_aabb: self.original_aabb,
            canonical_aabb: inner.canonical_aabb,
        }
    }
}

/// The rotation aligning the principal axes of a point cloud with the coordinate axes.
///
/// The rows of the rotation are the eigenvectors of the covariance matrix sorted
/// by decreasing eigenvalue. Each eigenvector is oriented so that its largest
/// component is positive, and the last one is chosen to make the frame right-handed.
pub fn principal_rotation(points: &[Point<Real>]) -> Rotation {
    let eig = utils::cov(points).symmetric_eigen();

    if eig.eigenvalues.iter().any(|e| !e.is_finite()) {
        return Rotation::identity();
    }

    let mut order = [0, 1, 2];
    order.sort_by(|a, b| {
        eig.eigenvalues[*b]
            .partial_cmp(&eig.eigenvalues[*a])
            .unwrap_or(Ordering::Equal)
    });

    let orient = |v: Vector<Real>| {
        if v[v.iamax()] < 0.0 {
            -v
        } else {
            v
        }
    };

    let e0 = orient(eig.eigenvectors.column(order[0]).into_owned());
    let e1 = orient(eig.eigenvectors.column(order[1]).into_owned());
    let e2 = e0.cross(&e1);

    if e2.norm() < 0.5 {
        return Rotation::identity();
    }

    let rows = Matrix::from_rows(&[e0.transpose(), e1.transpose(), e2.normalize().transpose()]);
    Rotation::from_matrix_unchecked(rows)
}

/// Normalizes a mesh into its canonical frame.
///
/// If `use_pca` is `true`, the mesh is first rotated into its principal-axis
/// frame (see [`principal_rotation`]). It is then translated so that its
/// bounding box is centered at the origin, and scaled uniformly by half its
/// largest extent, so that its bounding box fits in `[-1, 1]³` with its longest
/// side spanning exactly `[-1, 1]`. A mesh with a zero extent is only translated.
pub fn normalize(
    mesh: &TriMesh,
    use_pca: bool,
) -> Result<(NormalizationFrame, TriMesh), InvalidMeshError> {
    if mesh.vertices().is_empty() {
        return Err(InvalidMeshError::EmptyVertices);
    }

    let original_aabb = mesh.aabb();
    let rotation = if use_pca {
        principal_rotation(mesh.vertices())
    } else {
        Rotation::identity()
    };

    let rotated_aabb = Aabb::from_points(&mesh.vertices().iter().map(|pt| rotation * *pt).collect::<Vec<_>>());
    let half_extent = rotated_aabb.half_extents().max();
    let scale = if half_extent > 0.0 { half_extent } else { 1.0 };
    let translation = rotation.inverse_transform_vector(&rotated_aabb.center().coords);

    let mut frame = NormalizationFrame {
        rotation,
        translation,
        scale,
        original_aabb,
        canonical_aabb: original_aabb,
    };
    let canonical = frame.mesh_to_canonical(mesh);
    frame.canonical_aabb = canonical.aabb();

    Ok((frame, canonical))
}

#[cfg(test)]
mod test {
    use super::*;

    fn box_mesh() -> TriMesh {
        TriMesh::from_aabb(&Aabb::new(
            Point::new(1.0, -2.0, 3.0),
            Point::new(5.0, 0.0, 4.0),
        ))
    }

    #[test]
    fn normalize_round_trip() {
        let mesh = box_mesh();

        for use_pca in [false, true] {
            let (frame, canonical) = normalize(&mesh, use_pca).unwrap();
            let aabb = canonical.aabb();
            assert_relative_eq!(aabb.max_extent(), 2.0, epsilon = 1.0e-9);
            assert_relative_eq!(aabb.center(), Point::origin(), epsilon = 1.0e-9);

            let restored = frame.mesh_to_original(&canonical);
            let restored_aabb = restored.aabb();
            assert_relative_eq!(restored_aabb.mins, mesh.aabb().mins, epsilon = 1.0e-9);
            assert_relative_eq!(restored_aabb.maxs, mesh.aabb().maxs, epsilon = 1.0e-9);
        }
    }

    #[test]
    fn pca_aligns_the_longest_axis_with_x() {
        // A box elongated along `y`.
        let mesh = TriMesh::from_aabb(&Aabb::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 10.0, 2.0),
        ));
        let (_, canonical) = normalize(&mesh, true).unwrap();
        let extents = canonical.aabb().extents();
        assert_relative_eq!(extents.x, 2.0, epsilon = 1.0e-9);
        assert!(extents.y > extents.z);
        assert_relative_eq!(principal_rotation(mesh.vertices()).matrix().determinant(), 1.0, epsilon = 1.0e-9);
    }

    #[test]
    fn planes_and_composed_frames() {
        let mesh = box_mesh();
        let (f1, c1) = normalize(&mesh, false).unwrap();
        let (f2, _) = normalize(&c1, true).unwrap();
        let composed = f1.then(&f2);

        for pt in mesh.vertices() {
            assert_relative_eq!(composed.to_canonical(pt), f2.to_canonical(&f1.to_canonical(pt)), epsilon = 1.0e-9);
            assert_relative_eq!(composed.to_original(&composed.to_canonical(pt)), *pt, epsilon = 1.0e-9);
        }

        // The plane `x = 0` of the canonical frame is the plane `x = 3` of the original frame.
        let plane = f1.plane_to_original(&CuttingPlane::axis_aligned(0, 0.0));
        assert_relative_eq!(plane.side(&Point::new(3.0, 7.0, -1.0)), 0.0, epsilon = 1.0e-9);
        assert!(plane.side(&Point::new(4.0, 0.0, 0.0)) > 0.0);
    }

    #[test]
    fn normalize_empty_mesh() {
        assert_eq!(
            normalize(&TriMesh::empty(), false).unwrap_err(),
            InvalidMeshError::EmptyVertices
        );
    }
}
