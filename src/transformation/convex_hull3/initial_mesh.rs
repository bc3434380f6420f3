use super::{check_facet_links, ConvexHullError, TriangleFacet};
use crate::math::{Point, Point2, Real, Vector};
use crate::shape::Triangle;
use crate::transformation::convex_hull2_idx;
use crate::transformation::convex_hull_utils::support_point_id;
use crate::utils;
use std::cmp::Ordering;

pub enum InitialMesh {
    Facets(Vec<TriangleFacet>),
    ResultMesh(Vec<Point<Real>>, Vec<[u32; 3]>),
}

fn build_degenerate_mesh_point(point: Point<Real>) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
    (vec![point], vec![[0; 3], [0; 3]])
}

fn build_degenerate_mesh_segment(
    dir: &Vector<Real>,
    points: &[Point<Real>],
) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
    let a = utils::point_cloud_support_point(dir, points);
    let b = utils::point_cloud_support_point(&-*dir, points);

    (vec![a, b], vec![[0, 1, 0], [1, 0, 0]])
}

pub fn try_get_initial_mesh(
    original_points: &[Point<Real>],
    normalized_points: &mut [Point<Real>],
    undecidable: &mut Vec<usize>,
) -> Result<InitialMesh, ConvexHullError> {
    /*
     * Compute the eigenvectors to see if the input data live on a subspace.
     */
    let eig = utils::cov(normalized_points).symmetric_eigen();
    let eigval = eig.eigenvalues;
    let mut eigpairs = [
        (eig.eigenvectors.column(0).into_owned(), eigval[0]),
        (eig.eigenvectors.column(1).into_owned(), eigval[1]),
        (eig.eigenvectors.column(2).into_owned(), eigval[2]),
    ];

    /*
     * Sort in decreasing order wrt. eigenvalues.
     */
    eigpairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    /*
     * Count the dimension the data lives in.
     */
    let dimension = eigpairs
        .iter()
        .take_while(|pair| !relative_eq!(pair.1, 0.0, epsilon = 1.0e-7))
        .count();

    match dimension {
        0 => {
            // The hull is a point.
            let (vtx, idx) = build_degenerate_mesh_point(original_points[0]);
            Ok(InitialMesh::ResultMesh(vtx, idx))
        }
        1 => {
            // The hull is a segment.
            let (vtx, idx) = build_degenerate_mesh_segment(&eigpairs[0].0, original_points);
            Ok(InitialMesh::ResultMesh(vtx, idx))
        }
        2 => {
            // The hull is a flat polygon.
            // Project into the principal plane…
            let axis1 = &eigpairs[0].0;
            let axis2 = &eigpairs[1].0;

            let subspace_points: Vec<_> = normalized_points
                .iter()
                .map(|pt| Point2::new(pt.coords.dot(axis1), pt.coords.dot(axis2)))
                .collect();

            // … and compute the 2d convex hull.
            let idx = convex_hull2_idx(&subspace_points);
            let npoints = idx.len();

            if npoints < 3 {
                let (vtx, idx) = build_degenerate_mesh_segment(axis1, original_points);
                return Ok(InitialMesh::ResultMesh(vtx, idx));
            }

            // Finalize the result, triangulating both sides of the polygon.
            let coords = idx.into_iter().map(|i| original_points[i]).collect();
            let mut triangles = Vec::with_capacity(npoints * 2 - 4);

            for id in 1u32..npoints as u32 - 1 {
                triangles.push([0, id, id + 1]);
            }

            // NOTE: the bottom fan starts from another vertex so that no edge
            // ends up shared by more than two triangles.
            let a = npoints as u32 - 1;
            for id in 0u32..npoints as u32 - 2 {
                triangles.push([a, id + 1, id]);
            }

            Ok(InitialMesh::ResultMesh(coords, triangles))
        }
        _ => {
            // The hull is a polyhedron.
            // Find an initial triangle lying on the principal plane…
            let center = utils::center(normalized_points);
            let max_eigval = eigval.amax();

            for point in normalized_points.iter_mut() {
                *point = Point::from((*point - center) / max_eigval);
            }

            let internal = || ConvexHullError::InternalError("no initial triangle found");
            let p1 = support_point_id(&eigpairs[0].0, normalized_points).ok_or_else(internal)?;
            let p2 = support_point_id(&-eigpairs[0].0, normalized_points).ok_or_else(internal)?;

            let mut max_area = 0.0;
            let mut p3 = None;

            for (i, point) in normalized_points.iter().enumerate() {
                let area =
                    Triangle::new(normalized_points[p1], normalized_points[p2], *point).area();

                if area > max_area {
                    max_area = area;
                    p3 = Some(i);
                }
            }

            let p3 = p3.ok_or_else(internal)?;

            // Build two facets with opposite normals.
            let mut f1 = TriangleFacet::new(p1, p2, p3, normalized_points);
            let mut f2 = TriangleFacet::new(p2, p1, p3, normalized_points);

            // Link the facets together.
            f1.set_facets_adjacency([1, 1, 1], [0, 2, 1]);
            f2.set_facets_adjacency([0, 0, 0], [0, 2, 1]);

            let mut facets = vec![f1, f2];

            // … and attribute visible points to each one of them.
            for point in 0..normalized_points.len() {
                let pt = normalized_points[point];

                if pt == normalized_points[p1]
                    || pt == normalized_points[p2]
                    || pt == normalized_points[p3]
                {
                    continue;
                }

                let mut furthest = None;
                let mut furthest_dist = 0.0;

                for (i, curr_facet) in facets.iter().enumerate() {
                    if curr_facet.can_see_point(point, normalized_points) {
                        let distance = curr_facet.distance_to_point(point, normalized_points);

                        if distance > furthest_dist {
                            furthest = Some(i);
                            furthest_dist = distance;
                        }
                    }
                }

                match furthest {
                    Some(i) => facets[i].add_visible_point(point, normalized_points),
                    None => undecidable.push(point),
                }
            }

            check_facet_links(0, &facets)?;
            check_facet_links(1, &facets)?;

            Ok(InitialMesh::Facets(facets))
        }
    }
}
