use crate::math::{Point2, Real};
use std::cmp::Ordering;

/// Computes the convex hull of a set of 2d points.
///
/// Returns the indices of the hull vertices in counter-clockwise order, without
/// collinear vertices. Fewer than three indices are returned if all the points
/// are collinear.
pub fn convex_hull2_idx(points: &[Point2<Real>]) -> Vec<usize> {
    let mut sorted: Vec<usize> = (0..points.len()).collect();
    sorted.sort_by(|a, b| {
        let (pa, pb) = (points[*a], points[*b]);
        pa.x.partial_cmp(&pb.x)
            .and_then(|o| Some(o.then(pa.y.partial_cmp(&pb.y)?)))
            .unwrap_or(Ordering::Equal)
    });
    sorted.dedup_by(|a, b| points[*a] == points[*b]);

    if sorted.len() < 3 {
        return sorted;
    }

    let turn = |o: usize, a: usize, b: usize| (points[a] - points[o]).perp(&(points[b] - points[o]));
    let mut hull: Vec<usize> = Vec::with_capacity(sorted.len() + 1);

    // Lower hull.
    for i in &sorted {
        while hull.len() >= 2 && turn(hull[hull.len() - 2], hull[hull.len() - 1], *i) <= 0.0 {
            let _ = hull.pop();
        }
        hull.push(*i);
    }

    // Upper hull.
    let lower_len = hull.len() + 1;
    for i in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && turn(hull[hull.len() - 2], hull[hull.len() - 1], *i) <= 0.0
        {
            let _ = hull.pop();
        }
        hull.push(*i);
    }

    // The last point is the first one.
    let _ = hull.pop();
    hull
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn square_hull() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.5),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 0.0),
            Point2::new(0.0, 1.0),
        ];
        assert_eq!(convex_hull2_idx(&points), vec![0, 3, 2, 5]);
    }

    #[test]
    fn collinear_hull() {
        let points = [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)];
        assert!(convex_hull2_idx(&points).len() < 3);
    }
}
