use super::{try_get_initial_mesh, InitialMesh, TriangleFacet};
use super::ConvexHullError;
use crate::math::{Point, Real};
use crate::shape::TriMesh;
use crate::transformation::convex_hull_utils::{
    indexed_support_point_id, indexed_support_point_nth, normalize,
};
use crate::utils;
use crate::utils::hashmap::HashSet;

/// Computes the convex hull of a set of 3d points.
///
/// Exact duplicates are removed first. Degenerate point sets produce a flat hull:
/// a single point or a segment (each with two degenerate triangles), or a convex
/// polygon triangulated on both sides.
pub fn convex_hull(points: &[Point<Real>]) -> Result<(Vec<Point<Real>>, Vec<[u32; 3]>), ConvexHullError> {
    if points.is_empty() {
        return Err(ConvexHullError::IncompleteInput);
    }

    if let Some(i) = points.iter().position(|pt| !pt.iter().all(|c| c.is_finite())) {
        return Err(ConvexHullError::NonFiniteInput(i));
    }

    let points = remove_duplicates(points);
    let mut normalized_points = points.clone();
    let _ = normalize(&mut normalized_points);

    let mut undecidable_points = Vec::new();
    let mut silhouette_loop_facets_and_idx = Vec::new();
    let mut removed_facets = Vec::new();

    let mut triangles = match try_get_initial_mesh(&points, &mut normalized_points, &mut undecidable_points)? {
        InitialMesh::Facets(facets) => facets,
        InitialMesh::ResultMesh(vertices, indices) => return Ok((vertices, indices)),
    };

    let mut i = 0;
    while i != triangles.len() {
        silhouette_loop_facets_and_idx.clear();

        if !triangles[i].valid || triangles[i].affinely_dependent {
            i += 1;
            continue;
        }

        let pt_id = indexed_support_point_id(
            &triangles[i].normal,
            &normalized_points,
            triangles[i].visible_points.iter().copied(),
        );

        if let Some(point) = pt_id {
            triangles[i].valid = false;

            removed_facets.clear();
            removed_facets.push(i);

            for j in 0usize..3 {
                compute_silhouette(
                    triangles[i].adj[j],
                    triangles[i].indirect_adj_id[j],
                    point,
                    &mut silhouette_loop_facets_and_idx,
                    &normalized_points,
                    &mut removed_facets,
                    &mut triangles,
                );
            }

            // In some degenerate cases (because of float rounding problems), the silhouette may:
            // 1. Contain self-intersections (i.e. a single vertex is used by more than two edges).
            // 2. Contain multiple disjoint (but nested) loops.
            fix_silhouette_topology(
                &normalized_points,
                &mut silhouette_loop_facets_and_idx,
                &mut removed_facets,
                &mut triangles,
            )?;

            if silhouette_loop_facets_and_idx.is_empty() {
                // Due to inaccuracies, the silhouette could not be computed
                // (the point seems to be visible from… every triangle).
                let any_valid = triangles[i + 1..]
                    .iter()
                    .any(|tri| tri.valid && !tri.affinely_dependent);

                if any_valid {
                    return Err(ConvexHullError::UnfinishedSilhouette(point));
                }

                triangles[i].valid = true;
                break;
            }

            attach_and_push_facets(
                &silhouette_loop_facets_and_idx,
                point,
                &normalized_points,
                &mut triangles,
                &removed_facets,
                &mut undecidable_points,
            )?;
        }

        i += 1;
    }

    let mut idx: Vec<_> = triangles
        .iter()
        .filter(|facet| facet.valid)
        .map(|facet| facet.pts.map(|i| i as u32))
        .collect();

    let mut points = points;
    utils::remove_unused_points(&mut points, &mut idx);

    if points.is_empty() {
        return Err(ConvexHullError::InternalError("empty output mesh"));
    }

    Ok((points, idx))
}

/// Computes the convex hull of the vertices of a triangle mesh.
pub fn convex_hull_mesh(mesh: &TriMesh) -> Result<TriMesh, ConvexHullError> {
    let (vertices, indices) = convex_hull(mesh.vertices())?;
    Ok(TriMesh::new_unchecked(vertices, indices))
}

fn remove_duplicates(points: &[Point<Real>]) -> Vec<Point<Real>> {
    let mut seen = HashSet::default();
    points
        .iter()
        // `+ 0.0` maps -0.0 to 0.0.
        .filter(|pt| seen.insert(pt.coords.map(|c| (c + 0.0).to_bits())))
        .copied()
        .collect()
}

fn compute_silhouette(
    facet: usize,
    indirect_id: usize,
    point: usize,
    out_facets_and_idx: &mut Vec<(usize, usize)>,
    points: &[Point<Real>],
    removed_facets: &mut Vec<usize>,
    triangles: &mut [TriangleFacet],
) {
    if triangles[facet].valid {
        if !triangles[facet].order_independent_can_be_seen_by_point(point, points) {
            out_facets_and_idx.push((facet, indirect_id));
        } else {
            triangles[facet].valid = false; // The facet must be removed from the convex hull.
            removed_facets.push(facet);

            for k in [1, 2] {
                compute_silhouette(
                    triangles[facet].adj[(indirect_id + k) % 3],
                    triangles[facet].indirect_adj_id[(indirect_id + k) % 3],
                    point,
                    out_facets_and_idx,
                    points,
                    removed_facets,
                    triangles,
                );
            }
        }
    }
}

fn fix_silhouette_topology(
    points: &[Point<Real>],
    out_facets_and_idx: &mut Vec<(usize, usize)>,
    removed_facets: &mut Vec<usize>,
    triangles: &mut [TriangleFacet],
) -> Result<(), ConvexHullError> {
    let mut workspace = vec![0; points.len()];
    let mut needs_fixing = false;

    // NOTE: we work with the second_point_from_edge instead
    // of the first one, because when we traverse the silhouette
    // we see the second edge point before the first.
    for (facet, adj_id) in &*out_facets_and_idx {
        let p = triangles[*facet].second_point_from_edge(*adj_id);
        workspace[p] += 1;

        if workspace[p] > 1 {
            needs_fixing = true;
        }
    }

    // We detected a topological problem, i.e., we have
    // multiple loops.
    if needs_fixing {
        // First, we need to know which loop is the one we
        // need to keep.
        let mut loop_start = 0;
        for (facet, adj_id) in &*out_facets_and_idx {
            let p1 = points[triangles[*facet].second_point_from_edge(*adj_id)];
            let p2 = points[triangles[*facet].first_point_from_edge(*adj_id)];
            let supp = indexed_support_point_nth(
                &(p2 - p1),
                points,
                out_facets_and_idx
                    .iter()
                    .map(|(f, ai)| triangles[*f].second_point_from_edge(*ai)),
            )
            .ok_or(ConvexHullError::InternalError("empty silhouette loop"))?;
            let selected = &out_facets_and_idx[supp];
            if workspace[triangles[selected.0].second_point_from_edge(selected.1)] == 1 {
                // This is a valid point to start with.
                loop_start = supp;
                break;
            }
        }

        let mut removing = None;
        let old_facets_and_idx = std::mem::take(out_facets_and_idx);

        for i in 0..old_facets_and_idx.len() {
            let facet_id = (loop_start + i) % old_facets_and_idx.len();
            let (facet, adj_id) = old_facets_and_idx[facet_id];
            let p1 = triangles[facet].second_point_from_edge(adj_id);

            match removing {
                Some(p) if p == p1 => removing = None,
                None if workspace[p1] > 1 => removing = Some(p1),
                _ => {}
            }

            if removing.is_some() {
                if triangles[facet].valid {
                    triangles[facet].valid = false;
                    removed_facets.push(facet);
                }
            } else {
                out_facets_and_idx.push((facet, adj_id));
            }
        }
    }

    Ok(())
}

fn attach_and_push_facets(
    silhouette_loop_facets_and_idx: &[(usize, usize)],
    point: usize,
    points: &[Point<Real>],
    triangles: &mut Vec<TriangleFacet>,
    removed_facets: &[usize],
    undecidable: &mut Vec<usize>,
) -> Result<(), ConvexHullError> {
    // The silhouette is built to be in CCW order.
    let mut new_facets: Vec<_> = silhouette_loop_facets_and_idx
        .iter()
        .map(|(adj_facet, indirect_id)| {
            TriangleFacet::new(
                point,
                triangles[*adj_facet].second_point_from_edge(*indirect_id),
                triangles[*adj_facet].first_point_from_edge(*indirect_id),
                points,
            )
        })
        .collect();

    // Link the facets together.
    let loop_len = silhouette_loop_facets_and_idx.len();
    for i in 0..loop_len {
        let prev_facet = triangles.len() + (i + loop_len - 1) % loop_len;
        let (middle_facet, middle_id) = silhouette_loop_facets_and_idx[i];
        let next_facet = triangles.len() + (i + 1) % loop_len;

        new_facets[i].set_facets_adjacency([prev_facet, middle_facet, next_facet], [2, middle_id, 0]);

        // Check that we are not overwriting a valid link.
        if triangles[triangles[middle_facet].adj[middle_id]].valid {
            return Err(ConvexHullError::InternalError("overwriting a valid facet link"));
        }

        triangles[middle_facet].adj[middle_id] = triangles.len() + i; // The future id of curr_facet.
        triangles[middle_facet].indirect_adj_id[middle_id] = 1;
    }

    // Assign to each facets some of the points which can see it.
    for curr_facet in removed_facets {
        for visible_point in &triangles[*curr_facet].visible_points {
            if points[*visible_point] == points[point] {
                continue;
            }

            let mut furthest = None;
            let mut furthest_dist = 0.0;

            for (i, curr_facet) in new_facets.iter().enumerate() {
                if !curr_facet.affinely_dependent {
                    let distance = curr_facet.distance_to_point(*visible_point, points);

                    if distance > furthest_dist {
                        furthest = Some(i);
                        furthest_dist = distance;
                    }
                }
            }

            // If none of the facet can be seen from the point, it is implicitly
            // deleted because it won't be referenced by any facet.
            if let Some(furthest) = furthest {
                if new_facets[furthest].can_see_point(*visible_point, points) {
                    new_facets[furthest].add_visible_point(*visible_point, points);
                }
            }
        }
    }

    // Try to assign collinear points to one of the new facets.
    let mut i = 0;

    while i != undecidable.len() {
        let mut furthest = None;
        let mut furthest_dist = 0.0;
        let undecidable_point = undecidable[i];

        for (j, curr_facet) in new_facets.iter().enumerate() {
            if curr_facet.can_see_point(undecidable_point, points) {
                let distance = curr_facet.distance_to_point(undecidable_point, points);

                if distance > furthest_dist {
                    furthest = Some(j);
                    furthest_dist = distance;
                }
            }
        }

        match furthest {
            Some(j) => {
                new_facets[j].add_visible_point(undecidable_point, points);
                let _ = undecidable.swap_remove(i);
            }
            None => i += 1,
        }
    }

    triangles.append(&mut new_facets);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transformation::check_convex_hull;
    use rand::{Rng, SeedableRng};
    use rand_isaac::Isaac64Rng;

    #[test]
    fn cube_convex_hull() {
        let mut points = vec![];
        for i in 0..8 {
            points.push(Point::new(
                (i & 1) as Real,
                ((i >> 1) & 1) as Real,
                ((i >> 2) & 1) as Real,
            ));
        }
        // Interior and duplicate points.
        points.push(Point::new(0.5, 0.5, 0.5));
        points.push(Point::new(1.0, 1.0, 1.0));

        let (vertices, indices) = convex_hull(&points).unwrap();
        assert_eq!(vertices.len(), 8);
        assert_eq!(indices.len(), 12);
        check_convex_hull(&vertices, &indices).unwrap();
        let hull = TriMesh::new(vertices, indices).unwrap();
        assert_relative_eq!(hull.volume(), 1.0, epsilon = 1.0e-9);
    }

    #[test]
    fn random_cloud_convex_hull() {
        let mut rng = Isaac64Rng::seed_from_u64(0);
        let points: Vec<_> = (0..500)
            .map(|_| {
                Point::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
            })
            .collect();

        let (vertices, indices) = convex_hull(&points).unwrap();
        check_convex_hull(&vertices, &indices).unwrap();

        // Every input point is inside the hull.
        let hull = TriMesh::new(vertices, indices).unwrap();
        for tri in hull.triangles() {
            let n = tri.scaled_normal();
            for pt in &points {
                assert!(n.dot(&(pt - tri.a)) <= 1.0e-9);
            }
        }
    }

    #[test]
    fn degenerate_convex_hulls() {
        let point = [Point::new(1.0, 2.0, 3.0); 3];
        let (vertices, indices) = convex_hull(&point).unwrap();
        assert_eq!(vertices.len(), 1);
        assert_eq!(indices.len(), 2);

        let segment: Vec<_> = (0..5).map(|i| Point::new(i as Real, 0.0, 0.0)).collect();
        let (vertices, indices) = convex_hull(&segment).unwrap();
        assert_eq!(vertices.len(), 2);
        assert_eq!(indices.len(), 2);

        let square = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.5, 0.5, 0.0),
        ];
        let (vertices, indices) = convex_hull(&square).unwrap();
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 4);

        assert_eq!(convex_hull(&[]), Err(ConvexHullError::IncompleteInput));
    }
}
