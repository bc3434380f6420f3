use crate::math::{Point, Real, Vector, DEFAULT_EPSILON};
use crate::shape::Triangle;

#[derive(Debug)]
pub struct TriangleFacet {
    pub valid: bool,
    pub affinely_dependent: bool,
    pub normal: Vector<Real>,
    pub adj: [usize; 3],
    pub indirect_adj_id: [usize; 3],
    pub pts: [usize; 3],
    pub visible_points: Vec<usize>,
    pub furthest_point: usize,
    pub furthest_distance: Real,
}

impl TriangleFacet {
    pub fn new(p1: usize, p2: usize, p3: usize, points: &[Point<Real>]) -> TriangleFacet {
        let tri = Triangle::new(points[p1], points[p2], points[p3]);
        let affinely_dependent = tri.is_affinely_dependent();
        let normal = tri
            .normal()
            .map(|n| n.into_inner())
            .unwrap_or_else(Vector::zeros);

        TriangleFacet {
            valid: true,
            affinely_dependent,
            normal,
            adj: [0, 0, 0],
            indirect_adj_id: [0, 0, 0],
            pts: [p1, p2, p3],
            visible_points: Vec::new(),
            furthest_point: usize::MAX,
            furthest_distance: 0.0,
        }
    }

    pub fn add_visible_point(&mut self, pid: usize, points: &[Point<Real>]) {
        let distance = self.distance_to_point(pid, points);

        // Points on the facet plane can't make it grow.
        if distance <= DEFAULT_EPSILON {
            return;
        }

        if distance > self.furthest_distance {
            self.furthest_distance = distance;
            self.furthest_point = pid;
        }

        self.visible_points.push(pid);
    }

    pub fn distance_to_point(&self, point: usize, points: &[Point<Real>]) -> Real {
        self.normal.dot(&(points[point] - points[self.pts[0]]))
    }

    pub fn set_facets_adjacency(&mut self, adj: [usize; 3], id_adj: [usize; 3]) {
        self.adj = adj;
        self.indirect_adj_id = id_adj;
    }

    pub fn first_point_from_edge(&self, id: usize) -> usize {
        self.pts[id]
    }

    pub fn second_point_from_edge(&self, id: usize) -> usize {
        self.pts[(id + 1) % 3]
    }

    pub fn can_see_point(&self, point: usize, points: &[Point<Real>]) -> bool {
        // An affinely-dependent triangle cannot see any point.
        !self.affinely_dependent
            && (points[point] - points[self.pts[0]]).dot(&self.normal) >= DEFAULT_EPSILON * 100.0
    }

    // Same as `can_see_point`, but the result does not depend on the order of
    // the three vertices of this triangle.
    pub fn order_independent_can_be_seen_by_point(
        &self,
        point: usize,
        points: &[Point<Real>],
    ) -> bool {
        // An affinely-dependent triangle can be seen by any point.
        self.affinely_dependent
            || self
                .pts
                .iter()
                .any(|i| (points[point] - points[*i]).dot(&self.normal) >= 0.0)
    }
}
