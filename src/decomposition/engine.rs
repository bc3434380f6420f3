use super::candidates::{candidate_planes, PlaneScorer};
use super::decomposer::Decomposer;
use super::mcts::{MonteCarloTree, SearchConfig};
use super::merging::{merge_parts, MergeConfig};
use super::{
    ApproximationMode, ConcavityMetric, DecompositionError, DecompositionParameters, Diagnostics,
    Part, PreprocessMode, ResourceLimits,
};
use crate::math::Real;
use crate::query::split_trimesh;
use crate::shape::{CuttingPlane, InvalidMeshError, TriMesh};
use crate::transformation::voxelization::repair;
use crate::transformation::{convex_hull_mesh, decimate, extrude, normalize, NormalizationFrame};
use crate::utils;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// The convex hull of a mesh, and the concavity of the mesh relative to it.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexHullResult {
    /// The convex hull.
    pub hull: TriMesh,
    /// The concavity of the mesh relative to `hull`.
    pub concavity: Real,
}

/// How well a mesh decomposes.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshScore {
    /// The number of parts of the decomposition.
    pub part_count: usize,
    /// The average concavity of the parts relative to their approximations.
    pub avg_concavity: Real,
}

struct PreparedMesh {
    frame: NormalizationFrame,
    mesh: TriMesh,
}

/// Approximate convex decomposition of triangle meshes.
///
/// This holds the parameters, the log verbosity and the cancel flag shared by
/// every operation. All the meshes it returns are expressed in the frame of the
/// input mesh.
#[derive(Clone, Debug, Default)]
pub struct ConvexDecomposition {
    params: DecompositionParameters,
    diagnostics: Diagnostics,
    cancel: Option<Arc<AtomicBool>>,
}

impl ConvexDecomposition {
    /// A decomposition with the given parameters, logging at the info level.
    pub fn new(params: DecompositionParameters) -> Self {
        Self {
            params,
            diagnostics: Diagnostics::default(),
            cancel: None,
        }
    }

    /// Sets the log verbosity.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Sets a flag that aborts the running operation with
    /// [`DecompositionError::Cancelled`] once raised.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The parameters of this decomposition.
    pub fn parameters(&self) -> &DecompositionParameters {
        &self.params
    }

    /// The log verbosity of this decomposition.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Decomposes `mesh` into convex hulls.
    ///
    /// The mesh is normalized, repaired, recursively cut until every part is
    /// convex enough, and the hulls of the parts are then merged, decimated and
    /// extruded as configured.
    pub fn decompose(&self, mesh: &TriMesh) -> Result<Vec<TriMesh>, DecompositionError> {
        self.log_parameters();
        let prepared = self.prepare(mesh)?;
        let params = &self.params;

        let mut decomposer = Decomposer::new(
            params,
            &self.diagnostics,
            self.cancel.as_deref(),
            prepared.mesh.characteristic_length(),
        );
        let leaves = decomposer.decompose(prepared.mesh)?;
        self.diagnostics
            .info(format_args!("{} parts after decomposition", leaves.len()));

        let parts = if params.merge && leaves.len() > 1 {
            let config = MergeConfig {
                metric: *decomposer.metric(),
                threshold: params.threshold,
                max_parts: params.max_convex_hulls,
                diagnostics: &self.diagnostics,
                cancel: self.cancel.as_deref(),
            };
            merge_parts(leaves, &config)?
        } else {
            leaves
        };

        let mut hulls = Vec::with_capacity(parts.len());

        for part in parts {
            let mut hull = part.approximation;

            if params.decimate {
                hull = decimate(&hull, params.max_ch_vertex)?;
            }

            if params.extrude {
                hull = extrude(&hull, params.extrude_margin)?;
            }

            hulls.push(prepared.frame.mesh_to_original(&hull));
        }

        self.diagnostics.info(format_args!("{} convex hulls", hulls.len()));
        Ok(hulls)
    }

    /// Scores every candidate cutting plane of `mesh` and returns the `num_planes`
    /// best ones, by increasing score.
    pub fn best_cutting_planes(
        &self,
        mesh: &TriMesh,
        num_planes: usize,
    ) -> Result<Vec<CuttingPlane>, DecompositionError> {
        let prepared = self.prepare(mesh)?;
        let scorer = PlaneScorer::new(&self.params, prepared.mesh.characteristic_length())
            .with_diagnostics(self.diagnostics);
        let planes = candidate_planes(
            &prepared.mesh.aabb(),
            self.params.mcts_nodes,
            self.params.approximation_mode,
        );
        let ranked = scorer.rank(&prepared.mesh, &planes);

        self.diagnostics.debug(format_args!(
            "{} viable cutting planes out of {}",
            ranked.len(),
            planes.len()
        ));

        Ok(ranked
            .into_iter()
            .take(num_planes)
            .map(|cut| prepared.frame.plane_to_original(&cut.plane))
            .collect())
    }

    /// Runs the tree search on `mesh` and returns the plane of its first cut.
    ///
    /// Returns `None` if no plane cuts the mesh.
    pub fn best_cutting_plane(
        &self,
        mesh: &TriMesh,
    ) -> Result<Option<CuttingPlane>, DecompositionError> {
        let prepared = self.prepare(mesh)?;
        let scorer = PlaneScorer::new(&self.params, prepared.mesh.characteristic_length())
            .with_diagnostics(self.diagnostics);
        let config = SearchConfig::new(&self.params, self.params.seed);
        let cut = MonteCarloTree::new(prepared.mesh, &scorer, config)?.search();

        Ok(cut.map(|cut| prepared.frame.plane_to_original(&cut.plane)))
    }

    /// Decomposes `mesh`, without merging, and measures the result.
    pub fn mesh_score(&self, mesh: &TriMesh) -> Result<MeshScore, DecompositionError> {
        let prepared = self.prepare(mesh)?;
        let length = prepared.mesh.characteristic_length();
        let mut decomposer = Decomposer::new(
            &self.params,
            &self.diagnostics,
            self.cancel.as_deref(),
            length,
        );
        let leaves = decomposer.decompose(prepared.mesh)?;

        let concavities: Vec<Real> = match self.params.approximation_mode {
            ApproximationMode::ConvexHull => leaves.iter().map(|leaf| leaf.concavity).collect(),
            ApproximationMode::Box => {
                let scorer = PlaneScorer::new(&self.params, length);
                let mut concavities = vec![];
                for leaf in leaves.iter() {
                    concavities.push(scorer.part(leaf.mesh.clone())?.concavity);
                }
                concavities
            }
        };

        let avg_concavity = if concavities.is_empty() {
            0.0
        } else {
            concavities.iter().sum::<Real>() / concavities.len() as Real
        };

        Ok(MeshScore {
            part_count: leaves.len(),
            avg_concavity,
        })
    }

    /// Merges convex parts of `mesh` whose union is still convex enough.
    ///
    /// `parts[i]` is a piece of `mesh` and `hulls[i]` its convex hull. Concavities
    /// are measured relative to the size of `mesh`. Returns the merged hulls.
    pub fn merge(
        &self,
        mesh: &TriMesh,
        parts: &[TriMesh],
        hulls: &[TriMesh],
    ) -> Result<Vec<TriMesh>, DecompositionError> {
        self.params.validate()?;

        if parts.len() != hulls.len() {
            return Err(DecompositionError::invalid_parameter(
                "hulls",
                format!("{} hulls given for {} parts", hulls.len(), parts.len()),
            ));
        }

        if parts.len() <= 1 {
            return Ok(hulls.to_vec());
        }

        let metric = ConcavityMetric::new(&self.params, mesh.characteristic_length());
        let parts: Vec<Part> = utils::ordered_map(parts, |i, part| Part {
            mesh: part.clone(),
            approximation: hulls[i].clone(),
            concavity: metric.concavity(part, &hulls[i]),
        });

        let config = MergeConfig {
            metric,
            threshold: self.params.threshold,
            max_parts: self.params.max_convex_hulls,
            diagnostics: &self.diagnostics,
            cancel: self.cancel.as_deref(),
        };

        Ok(merge_parts(parts, &config)?
            .into_iter()
            .map(|part| part.approximation)
            .collect())
    }

    fn prepare(&self, mesh: &TriMesh) -> Result<PreparedMesh, DecompositionError> {
        self.params.validate()?;
        validate_mesh(mesh, &self.params.limits)?;

        self.diagnostics.info(format_args!(
            "input mesh: {} vertices, {} triangles ({} degenerate)",
            mesh.vertices().len(),
            mesh.num_triangles(),
            mesh.num_degenerate_triangles()
        ));

        let (frame, normalized) = normalize(mesh, false)?;

        let mode = match self.params.preprocess_mode {
            PreprocessMode::Auto => {
                let manifold = normalized.is_manifold();
                self.diagnostics
                    .info(format_args!("mesh manifoldness: {manifold}"));

                if manifold {
                    PreprocessMode::Off
                } else {
                    PreprocessMode::On
                }
            }
            mode => mode,
        };

        if mode == PreprocessMode::On {
            self.diagnostics.info(format_args!(
                "repairing the mesh at resolution {}",
                self.params.preprocess_resolution
            ));
        }

        let repaired = repair(
            &normalized,
            mode,
            self.params.preprocess_resolution,
            &self.params.limits,
        )?;

        if !self.params.pca {
            return Ok(PreparedMesh {
                frame,
                mesh: repaired,
            });
        }

        let (principal_frame, mesh) = normalize(&repaired, true)?;

        Ok(PreparedMesh {
            frame: frame.then(&principal_frame),
            mesh,
        })
    }

    fn log_parameters(&self) {
        let p = &self.params;
        let d = &self.diagnostics;

        d.info(format_args!("threshold: {}", p.threshold));
        match p.max_convex_hulls {
            Some(max) => d.info(format_args!("max_convex_hulls: {max}")),
            None => d.info(format_args!("max_convex_hulls: unlimited")),
        }
        d.info(format_args!("preprocess_mode: {}", p.preprocess_mode));
        d.info(format_args!("preprocess_resolution: {}", p.preprocess_resolution));
        d.info(format_args!("resolution: {}", p.resolution));
        d.info(format_args!("mcts_nodes: {}", p.mcts_nodes));
        d.info(format_args!("mcts_iterations: {}", p.mcts_iterations));
        d.info(format_args!("mcts_max_depth: {}", p.mcts_max_depth));
        d.info(format_args!("pca: {}", p.pca));
        d.info(format_args!("merge: {}", p.merge));
        d.info(format_args!("decimate: {}", p.decimate));
        d.info(format_args!("max_ch_vertex: {}", p.max_ch_vertex));
        d.info(format_args!("extrude: {}", p.extrude));
        d.info(format_args!("extrude_margin: {}", p.extrude_margin));
        d.info(format_args!("approximation_mode: {}", p.approximation_mode));
        d.info(format_args!("seed: {}", p.seed));
        d.info(format_args!("rv_k: {}", p.rv_k));
    }
}

fn validate_mesh(mesh: &TriMesh, limits: &ResourceLimits) -> Result<(), DecompositionError> {
    if mesh.vertices().is_empty() {
        return Err(InvalidMeshError::EmptyVertices.into());
    }

    if mesh.indices().is_empty() {
        return Err(InvalidMeshError::EmptyTriangles.into());
    }

    if mesh.num_triangles() > limits.max_triangles {
        return Err(DecompositionError::ResourceExhausted {
            resource: "triangles",
            requested: mesh.num_triangles(),
            limit: limits.max_triangles,
        });
    }

    Ok(())
}

/// Decomposes `mesh` with the given parameters.
///
/// This is a shortcut for `ConvexDecomposition::new(*params).decompose(mesh)`.
pub fn decompose(
    mesh: &TriMesh,
    params: &DecompositionParameters,
) -> Result<Vec<TriMesh>, DecompositionError> {
    ConvexDecomposition::new(*params).decompose(mesh)
}

/// Splits `mesh` by `plane` into `[below, above]`, both closed by a cap.
///
/// "Below" is the side where `a·x + b·y + c·z + d < 0`. If the plane does not
/// cross the mesh, one of the outputs is empty.
pub fn clip(mesh: &TriMesh, plane: &CuttingPlane) -> Result<[TriMesh; 2], DecompositionError> {
    if mesh.vertices().is_empty() {
        return Err(InvalidMeshError::EmptyVertices.into());
    }

    if plane.normalized().is_none() {
        return Err(DecompositionError::invalid_parameter(
            "plane",
            "the plane normal is zero",
        ));
    }

    let split = split_trimesh(mesh, plane);
    Ok([split.below, split.above])
}

/// The convex hull of `mesh`, and the concavity of `mesh` relative to it.
pub fn convex_hull(mesh: &TriMesh) -> Result<ConvexHullResult, DecompositionError> {
    if mesh.vertices().is_empty() {
        return Err(InvalidMeshError::EmptyVertices.into());
    }

    let hull = convex_hull_mesh(mesh)?;
    let metric = ConcavityMetric::new(
        &DecompositionParameters::default(),
        mesh.characteristic_length(),
    );
    let concavity = metric.concavity(mesh, &hull);

    Ok(ConvexHullResult { hull, concavity })
}

/// Merges convex parts of `mesh` with the default parameters.
///
/// See [`ConvexDecomposition::merge`].
pub fn merge(
    mesh: &TriMesh,
    parts: &[TriMesh],
    hulls: &[TriMesh],
) -> Result<Vec<TriMesh>, DecompositionError> {
    ConvexDecomposition::default().merge(mesh, parts, hulls)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bounding_volume::Aabb;
    use crate::math::Point;

    #[test]
    fn empty_meshes_are_rejected() {
        assert_eq!(
            clip(&TriMesh::empty(), &CuttingPlane::axis_aligned(0, 0.0)).unwrap_err(),
            DecompositionError::InvalidMesh(InvalidMeshError::EmptyVertices)
        );

        let engine = ConvexDecomposition::default().with_diagnostics(Diagnostics::silent());
        assert_eq!(
            engine.decompose(&TriMesh::empty()).unwrap_err(),
            DecompositionError::InvalidMesh(InvalidMeshError::EmptyVertices)
        );
    }

    #[test]
    fn degenerate_plane_is_rejected() {
        let cube = TriMesh::from_aabb(&Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0)));
        assert!(matches!(
            clip(&cube, &CuttingPlane::new(0.0, 0.0, 0.0, 1.0)),
            Err(DecompositionError::InvalidParameter { name: "plane", .. })
        ));
    }

    #[test]
    fn mismatched_hulls_are_rejected() {
        let cube = TriMesh::from_aabb(&Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0)));
        assert!(matches!(
            merge(&cube, &[cube.clone(), cube.clone()], &[cube.clone()]),
            Err(DecompositionError::InvalidParameter { name: "hulls", .. })
        ));
    }
}
