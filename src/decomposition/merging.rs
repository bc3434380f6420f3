use super::candidates::Part;
use super::{ConcavityMetric, DecompositionError, Diagnostics};
use crate::math::{Point, Real};
use crate::shape::TriMesh;
use crate::transformation::convex_hull;
use crate::utils::{self, hashmap::HashMap, SortedPair};
use std::sync::atomic::{AtomicBool, Ordering};

/// Settings of the merging pass.
#[derive(Copy, Clone, Debug)]
pub struct MergeConfig<'a> {
    /// The concavity measure.
    pub metric: ConcavityMetric,
    /// Two parts are merged only if the concavity of their union is below this value.
    pub threshold: Real,
    /// If set, parts are merged regardless of the threshold until there are no more
    /// than this number of parts.
    pub max_parts: Option<usize>,
    /// Log sink.
    pub diagnostics: &'a Diagnostics,
    /// Aborts the merge when raised.
    pub cancel: Option<&'a AtomicBool>,
}

struct Candidate {
    id: usize,
    part: Part,
}

/// The union of two parts: both meshes and the convex hull of both hulls.
fn union_part(a: &Part, b: &Part, metric: &ConcavityMetric) -> Result<Part, DecompositionError> {
    let points: Vec<Point<Real>> = a
        .approximation
        .vertices()
        .iter()
        .chain(b.approximation.vertices())
        .copied()
        .collect();
    let (vertices, indices) = convex_hull(&points)?;
    let hull = TriMesh::new_unchecked(vertices, indices);
    let concavity = metric.merged_concavity(&a.mesh, &b.mesh, &hull);

    Ok(Part {
        mesh: a.mesh.concatenated(&b.mesh),
        approximation: hull,
        concavity,
    })
}

fn merged_concavity(
    a: &Part,
    b: &Part,
    metric: &ConcavityMetric,
) -> Result<Real, DecompositionError> {
    Ok(union_part(a, b, metric)?.concavity)
}

/// Greedily merges pairs of parts whose union is still convex enough.
///
/// At each step, the pair with the largest concavity reduction
/// `c_i + c_j - c_ij` among the pairs with `c_ij <= threshold` is replaced by its
/// union. Pair costs are evaluated in parallel. Returns the parts in their original
/// order, each merged part taking the place of the first part of its pair.
pub fn merge_parts(
    parts: Vec<Part>,
    config: &MergeConfig,
) -> Result<Vec<Part>, DecompositionError> {
    if parts.len() <= 1 {
        return Ok(parts);
    }

    let initial_len = parts.len();
    let mut candidates: Vec<_> = parts
        .into_iter()
        .enumerate()
        .map(|(id, part)| Candidate { id, part })
        .collect();
    let mut next_id = candidates.len();

    // Merged concavity of every pair, keyed by part ids.
    let mut costs = HashMap::default();
    let pairs: Vec<_> = (0..candidates.len())
        .flat_map(|i| (i + 1..candidates.len()).map(move |j| (i, j)))
        .collect();
    let pair_costs = utils::ordered_map(&pairs, |_, (i, j)| {
        merged_concavity(&candidates[*i].part, &candidates[*j].part, &config.metric)
    });

    for ((i, j), cost) in pairs.iter().zip(pair_costs) {
        let _ = costs.insert(SortedPair::new(candidates[*i].id, candidates[*j].id), cost?);
    }

    loop {
        if config.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            config.diagnostics.warn(format_args!("merge cancelled"));
            return Err(DecompositionError::Cancelled);
        }

        let Some((i, j)) = select_pair(&candidates, &costs, config) else {
            break;
        };

        let merged = union_part(&candidates[i].part, &candidates[j].part, &config.metric)?;
        config.diagnostics.debug(format_args!(
            "merging parts {} and {} (concavities {:.6} and {:.6}) into a part with concavity {:.6}",
            candidates[i].id,
            candidates[j].id,
            candidates[i].part.concavity,
            candidates[j].part.concavity,
            merged.concavity,
        ));

        let removed = candidates.remove(j);
        let replaced = std::mem::replace(
            &mut candidates[i],
            Candidate {
                id: next_id,
                part: merged,
            },
        );
        next_id += 1;
        costs.retain(|pair: &SortedPair<usize>, _| {
            let (a, b) = (pair.min(), pair.max());
            a != removed.id && b != removed.id && a != replaced.id && b != replaced.id
        });

        let new_costs = utils::ordered_map(&candidates, |k, other| {
            if k == i {
                Ok(None)
            } else {
                merged_concavity(&candidates[i].part, &other.part, &config.metric).map(Some)
            }
        });

        for (other, cost) in candidates.iter().zip(new_costs) {
            if let Some(cost) = cost? {
                let _ = costs.insert(SortedPair::new(candidates[i].id, other.id), cost);
            }
        }
    }

    config.diagnostics.info(format_args!(
        "merged {} parts into {}",
        initial_len,
        candidates.len()
    ));

    Ok(candidates.into_iter().map(|c| c.part).collect())
}

fn select_pair(
    candidates: &[Candidate],
    costs: &HashMap<SortedPair<usize>, Real>,
    config: &MergeConfig,
) -> Option<(usize, usize)> {
    let mut best = None;
    let mut best_gain = Real::MIN;
    let mut cheapest = None;
    let mut cheapest_cost = Real::MAX;

    for i in 0..candidates.len() {
        for j in i + 1..candidates.len() {
            let Some(cost) = costs
                .get(&SortedPair::new(candidates[i].id, candidates[j].id))
                .copied()
            else {
                continue;
            };

            if cost <= config.threshold {
                let gain = candidates[i].part.concavity + candidates[j].part.concavity - cost;

                if gain > best_gain {
                    best_gain = gain;
                    best = Some((i, j));
                }
            }

            if cost < cheapest_cost {
                cheapest_cost = cost;
                cheapest = Some((i, j));
            }
        }
    }

    if best.is_some() {
        return best;
    }

    match config.max_parts {
        Some(max) if candidates.len() > max => {
            config.diagnostics.debug(format_args!(
                "{} parts exceed the budget of {max}: merging the cheapest pair (concavity {:.6})",
                candidates.len(),
                cheapest_cost
            ));
            cheapest
        }
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bounding_volume::Aabb;
    use crate::transformation::convex_hull_mesh;

    fn metric() -> ConcavityMetric {
        ConcavityMetric {
            resolution: 100,
            rv_k: 0.3,
            seed: 0,
            characteristic_length: 1.0,
        }
    }

    fn box_part(mins: [Real; 3], maxs: [Real; 3]) -> Part {
        let mesh = TriMesh::from_aabb(&Aabb::new(mins.into(), maxs.into()));
        let approximation = convex_hull_mesh(&mesh).unwrap();
        Part {
            mesh,
            approximation,
            concavity: 0.0,
        }
    }

    fn config<'a>(diagnostics: &'a Diagnostics, max_parts: Option<usize>) -> MergeConfig<'a> {
        MergeConfig {
            metric: metric(),
            threshold: 0.05,
            max_parts,
            diagnostics,
            cancel: None,
        }
    }

    #[test]
    fn adjacent_boxes_are_merged() {
        let diagnostics = Diagnostics::silent();
        let parts = vec![
            box_part([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
            box_part([5.0, 0.0, 0.0], [6.0, 1.0, 1.0]),
            box_part([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]),
        ];

        let merged = merge_parts(parts, &config(&diagnostics, None)).unwrap();
        assert_eq!(merged.len(), 2);
        assert_relative_eq!(merged[0].approximation.volume(), 2.0, epsilon = 1.0e-9);
        assert_relative_eq!(merged[1].approximation.volume(), 1.0, epsilon = 1.0e-9);
    }

    #[test]
    fn budget_forces_merges() {
        let diagnostics = Diagnostics::silent();
        let parts = vec![
            box_part([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
            box_part([5.0, 0.0, 0.0], [6.0, 1.0, 1.0]),
            box_part([10.0, 0.0, 0.0], [11.0, 1.0, 1.0]),
        ];

        let merged = merge_parts(parts.clone(), &config(&diagnostics, None)).unwrap();
        assert_eq!(merged.len(), 3);

        let merged = merge_parts(parts, &config(&diagnostics, Some(2))).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn single_part_is_unchanged() {
        let diagnostics = Diagnostics::silent();
        let part = box_part([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let merged = merge_parts(vec![part.clone()], &config(&diagnostics, None)).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].approximation, part.approximation);
    }
}
