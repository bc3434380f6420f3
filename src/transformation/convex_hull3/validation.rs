use super::{ConvexHullError, TriangleFacet};
use crate::math::{Point, Real};
use crate::utils::hashmap::{Entry, HashMap};
use crate::utils::SortedPair;

pub fn check_facet_links(ifacet: usize, facets: &[TriangleFacet]) -> Result<(), ConvexHullError> {
    let facet = &facets[ifacet];

    for i in 0..3 {
        let adj_facet = &facets[facet.adj[i]];
        let adj_id = facet.indirect_adj_id[i];

        if !adj_facet.valid
            || adj_facet.adj[adj_id] != ifacet
            || adj_facet.indirect_adj_id[adj_id] != i
            || adj_facet.first_point_from_edge(adj_id) != facet.second_point_from_edge(i)
            || adj_facet.second_point_from_edge(adj_id) != facet.first_point_from_edge(i)
        {
            return Err(ConvexHullError::InternalError("inconsistent facet adjacency"));
        }
    }

    Ok(())
}

/// Checks if a convex hull is a properly formed closed triangle mesh.
///
/// Every edge must be shared by exactly two triangles, no two vertices may be
/// identical, and the Euler characteristic must be 2.
pub fn check_convex_hull(points: &[Point<Real>], triangles: &[[u32; 3]]) -> Result<(), ConvexHullError> {
    let mut edges = HashMap::default();

    for i in 0..points.len() {
        for j in i + 1..points.len() {
            if points[i] == points[j] {
                return Err(ConvexHullError::DuplicatePoints(i, j));
            }
        }
    }

    for (itri, tri) in triangles.iter().enumerate() {
        if tri[0] == tri[1] || tri[0] == tri[2] || tri[1] == tri[2] {
            return Err(ConvexHullError::InternalError("degenerate hull triangle"));
        }

        for i in 0..3 {
            let ivtx1 = tri[i];
            let ivtx2 = tri[(i + 1) % 3];

            match edges.entry(SortedPair::new(ivtx1, ivtx2)) {
                Entry::Vacant(e) => {
                    let _ = e.insert([itri, usize::MAX]);
                }
                Entry::Occupied(mut e) => {
                    if e.get()[1] != usize::MAX {
                        return Err(ConvexHullError::TJunction(itri, ivtx1, ivtx2));
                    }

                    e.get_mut()[1] = itri;
                }
            }
        }
    }

    if edges.values().any(|adj| adj[1] == usize::MAX) {
        return Err(ConvexHullError::UnfinishedTriangle);
    }

    // Check Euler characteristic.
    if points.len() + triangles.len() != edges.len() + 2 {
        return Err(ConvexHullError::InternalError("invalid Euler characteristic"));
    }

    Ok(())
}
