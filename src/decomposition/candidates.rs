use super::{ApproximationMode, ConcavityMetric, DecompositionParameters, Diagnostics};
use crate::bounding_volume::Aabb;
use crate::math::Real;
use crate::query::split_trimesh;
use crate::shape::{CuttingPlane, TriMesh};
use crate::transformation::{convex_hull_mesh, ConvexHullError};
use crate::utils;

/// The weight of the cross-section area in the score of a cutting plane.
pub const CUT_AREA_WEIGHT: Real = 0.002;

pub(crate) const MIN_INTERVAL: Real = 0.01;
const MIN_FACE_DISTANCE: Real = 0.015;

/// Generates the candidate cutting planes of a part with the given bounding box.
///
/// With [`ApproximationMode::ConvexHull`], `num_nodes` evenly spaced planes are
/// generated along each axis, spaced by `max(extent / (num_nodes + 1), 0.01)`
/// and kept away from the faces of the box. With [`ApproximationMode::Box`], only
/// the quarter, half and three-quarter planes of each axis are generated.
pub fn candidate_planes(aabb: &Aabb, num_nodes: usize, mode: ApproximationMode) -> Vec<CuttingPlane> {
    let mut planes = vec![];

    if !aabb.is_valid() {
        return planes;
    }

    let extents = aabb.extents();

    for axis in 0..3 {
        let (min, max) = (aabb.mins[axis], aabb.maxs[axis]);

        match mode {
            ApproximationMode::Box => {
                if extents[axis] > 2.0 * MIN_FACE_DISTANCE {
                    planes.extend(
                        [0.25, 0.5, 0.75]
                            .map(|t| CuttingPlane::axis_aligned(axis, min + extents[axis] * t)),
                    );
                }
            }
            ApproximationMode::ConvexHull => {
                let interval = (extents[axis] / (num_nodes + 1) as Real).max(MIN_INTERVAL);
                let margin = interval.max(MIN_FACE_DISTANCE);
                let last = max - margin + extents[axis] * 1.0e-12;

                for k in 0..num_nodes {
                    let offset = min + margin + k as Real * interval;

                    if offset > last {
                        break;
                    }

                    planes.push(CuttingPlane::axis_aligned(axis, offset));
                }
            }
        }
    }

    planes
}

/// The plane through the middle of each axis of the box, used by quick greedy searches.
pub fn mid_planes(aabb: &Aabb) -> Vec<CuttingPlane> {
    if !aabb.is_valid() {
        return vec![];
    }

    let center = aabb.center();
    let extents = aabb.extents();

    (0..3)
        .filter(|axis| extents[*axis] > 2.0 * MIN_FACE_DISTANCE)
        .map(|axis| CuttingPlane::axis_aligned(axis, center[axis]))
        .collect()
}

/// A part of a mesh together with its convex approximation and concavity.
#[derive(Clone, Debug)]
pub struct Part {
    /// The mesh of the part.
    pub mesh: TriMesh,
    /// Its convex hull, or its bounding box in box mode.
    pub approximation: TriMesh,
    /// The concavity of `mesh` relative to `approximation`.
    pub concavity: Real,
}

/// A plane that splits a part in two non-empty halves, with both halves evaluated.
#[derive(Clone, Debug)]
pub struct ScoredCut {
    /// The plane, with its score.
    pub plane: CuttingPlane,
    /// The part below the plane.
    pub below: Part,
    /// The part above the plane.
    pub above: Part,
}

impl ScoredCut {
    /// The largest concavity of both halves.
    pub fn max_concavity(&self) -> Real {
        self.below.concavity.max(self.above.concavity)
    }
}

/// Evaluates cutting planes on parts of a mesh.
#[derive(Copy, Clone, Debug)]
pub struct PlaneScorer {
    /// The concavity measure.
    pub metric: ConcavityMetric,
    /// How parts are approximated while scoring.
    pub mode: ApproximationMode,
    diagnostics: Diagnostics,
}

impl PlaneScorer {
    /// The scorer configured by `params`, for meshes of the given characteristic length.
    pub fn new(params: &DecompositionParameters, characteristic_length: Real) -> Self {
        Self {
            metric: ConcavityMetric::new(params, characteristic_length),
            mode: params.approximation_mode,
            diagnostics: Diagnostics::silent(),
        }
    }

    /// Reports planes discarded because of a hull failure to `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Wraps `mesh` into a [`Part`], computing its approximation and concavity.
    pub fn part(&self, mesh: TriMesh) -> Result<Part, ConvexHullError> {
        let approximation = match self.mode {
            ApproximationMode::ConvexHull => convex_hull_mesh(&mesh)?,
            ApproximationMode::Box => TriMesh::from_aabb(&mesh.aabb()),
        };
        let concavity = self.metric.concavity(&mesh, &approximation);

        Ok(Part {
            mesh,
            approximation,
            concavity,
        })
    }

    /// Splits `mesh` by `plane` and scores the result.
    ///
    /// Returns `None` if the plane does not separate the mesh in two non-empty parts,
    /// or if the hull of a half cannot be computed. The score is the largest concavity
    /// of both halves plus [`CUT_AREA_WEIGHT`] times the area of the cross-section.
    pub fn evaluate(&self, mesh: &TriMesh, plane: &CuttingPlane) -> Option<ScoredCut> {
        let split = split_trimesh(mesh, plane);

        if !split.is_cut() {
            return None;
        }

        let halves = self
            .part(split.below)
            .and_then(|below| Ok((below, self.part(split.above)?)));

        let (below, above) = match halves {
            Ok(halves) => halves,
            Err(err) => {
                self.diagnostics.debug(format_args!(
                    "plane ({:.6}, {:.6}, {:.6}, {:.6}) discarded: {err}",
                    plane.a, plane.b, plane.c, plane.d
                ));
                return None;
            }
        };

        let score = below.concavity.max(above.concavity) + CUT_AREA_WEIGHT * split.cut_area;

        Some(ScoredCut {
            plane: plane.with_score(score),
            below,
            above,
        })
    }

    /// Evaluates every plane of `planes` on `mesh` (in parallel when enabled) and
    /// returns the viable ones, in the order of `planes`.
    pub fn evaluate_all(&self, mesh: &TriMesh, planes: &[CuttingPlane]) -> Vec<ScoredCut> {
        utils::ordered_map(planes, |_, plane| self.evaluate(mesh, plane))
            .into_iter()
            .flatten()
            .collect()
    }

    /// The viable planes of `planes` on `mesh`, sorted by increasing score.
    ///
    /// Planes with identical scores keep their relative order.
    pub fn rank(&self, mesh: &TriMesh, planes: &[CuttingPlane]) -> Vec<ScoredCut> {
        let mut cuts = self.evaluate_all(mesh, planes);
        cuts.sort_by(|a, b| a.plane.score.total_cmp(&b.plane.score));
        cuts
    }

    /// The best viable plane of `planes` on `mesh`, if any.
    pub fn best(&self, mesh: &TriMesh, planes: &[CuttingPlane]) -> Option<ScoredCut> {
        self.rank(mesh, planes).into_iter().next()
    }
}
