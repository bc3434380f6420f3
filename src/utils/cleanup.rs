use crate::math::{Point, Real};
use crate::utils::hashmap::{Entry, HashMap};

/// Given an index buffer, remove from `points` every point that is not indexed.
pub fn remove_unused_points(points: &mut Vec<Point<Real>>, idx: &mut [[u32; 3]]) {
    let mut used = vec![false; points.len()];
    let mut remap: Vec<usize> = (0..points.len()).collect();

    for i in idx.iter() {
        used[i[0] as usize] = true;
        used[i[1] as usize] = true;
        used[i[2] as usize] = true;
    }

    let mut i = 0;
    while i != points.len() {
        if !used[i] {
            let _ = points.swap_remove(i);
            remap[points.len()] = i;
            used[i] = used[points.len()];
        } else {
            i += 1;
        }
    }

    for id in idx.iter_mut() {
        id[0] = remap[id[0] as usize] as u32;
        id[1] = remap[id[1] as usize] as u32;
        id[2] = remap[id[2] as usize] as u32;
    }
}

fn point_key(pt: &Point<Real>) -> [u64; 3] {
    // `+ 0.0` folds negative zeros into positive ones.
    [
        (pt.x + 0.0).to_bits(),
        (pt.y + 0.0).to_bits(),
        (pt.z + 0.0).to_bits(),
    ]
}

/// Merges the vertices sharing exactly the same coordinates.
///
/// The first occurrence of each vertex is kept, so the output order follows the input order.
/// Triangles that become degenerate (two identical indices) are removed.
pub fn weld_vertices(
    points: &[Point<Real>],
    indices: &[[u32; 3]],
) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
    let mut vtx_to_id = HashMap::default();
    let mut new_vertices = Vec::with_capacity(points.len());
    let mut remap = Vec::with_capacity(points.len());

    for pt in points {
        let id = match vtx_to_id.entry(point_key(pt)) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                new_vertices.push(*pt);
                *e.insert(new_vertices.len() as u32 - 1)
            }
        };
        remap.push(id);
    }

    let new_indices = indices
        .iter()
        .map(|idx| {
            [
                remap[idx[0] as usize],
                remap[idx[1] as usize],
                remap[idx[2] as usize],
            ]
        })
        .filter(|idx| idx[0] != idx[1] && idx[0] != idx[2] && idx[1] != idx[2])
        .collect();

    (new_vertices, new_indices)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn weld_merges_exact_duplicates() {
        let points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(-0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
        ];
        let indices = [[0, 1, 2], [3, 4, 2], [0, 3, 1]];
        let (vertices, indices) = weld_vertices(&points, &indices);

        assert_eq!(vertices.len(), 3);
        assert_eq!(indices, vec![[0, 1, 2], [0, 1, 2]]);
    }

    #[test]
    fn unused_points_are_removed() {
        let mut points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(9.0, 9.0, 9.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        let mut idx = [[0, 2, 3]];
        remove_unused_points(&mut points, &mut idx);

        assert_eq!(points.len(), 3);
        for i in idx[0] {
            assert_ne!(points[i as usize], Point::new(9.0, 9.0, 9.0));
        }
    }
}
