//! Axis Aligned Bounding Box.

use crate::math::{Point, Real, Vector, DIM};

/// An Axis Aligned Bounding Box, defined by its minimum and maximum corners.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Aabb {
    /// The point with minimum coordinates.
    pub mins: Point<Real>,
    /// The point with maximum coordinates.
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates a new AABB from its two corners.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        Aabb { mins, maxs }
    }

    /// Creates an invalid AABB with `mins` components set to `Real::max_values` and `maxs`components set to `-Real::max_values`.
    ///
    /// This is often used as the initial values of some AABB merging algorithms.
    #[inline]
    pub fn new_invalid() -> Self {
        Self::new(
            Vector::repeat(Real::MAX).into(),
            Vector::repeat(-Real::MAX).into(),
        )
    }

    /// Creates a new AABB from its center and its half-extents.
    #[inline]
    pub fn from_half_extents(center: Point<Real>, half_extents: Vector<Real>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Creates the smallest AABB enclosing all the given points.
    ///
    /// Returns an invalid AABB (see [`Aabb::new_invalid`]) if `pts` is empty.
    pub fn from_points<'a, I>(pts: I) -> Self
    where
        I: IntoIterator<Item = &'a Point<Real>>,
    {
        let mut result = Self::new_invalid();

        for pt in pts {
            result.take_point(*pt);
        }

        result
    }

    /// Is this AABB valid, i.e., are its `mins` smaller or equal to its `maxs`?
    #[inline]
    pub fn is_valid(&self) -> bool {
        na::partial_le(&self.mins, &self.maxs)
    }

    /// The center of this AABB.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// The half extents of this AABB.
    #[inline]
    pub fn half_extents(&self) -> Vector<Real> {
        (self.maxs - self.mins) * 0.5
    }

    /// The extents of this AABB.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// The largest extent of this AABB.
    #[inline]
    pub fn max_extent(&self) -> Real {
        self.extents().max()
    }

    /// The index of the axis along which this AABB is the longest.
    #[inline]
    pub fn longest_axis(&self) -> usize {
        self.extents().imax()
    }

    /// The volume of this AABB.
    #[inline]
    pub fn volume(&self) -> Real {
        let extents = self.extents();
        extents.x * extents.y * extents.z
    }

    /// The length of the diagonal of this AABB.
    #[inline]
    pub fn diagonal_length(&self) -> Real {
        self.extents().norm()
    }

    /// Enlarges this AABB so it also contains the point `pt`.
    #[inline]
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.inf(&pt);
        self.maxs = self.maxs.sup(&pt);
    }

    /// The smallest AABB containing both `self` and `other`.
    #[inline]
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }

    /// Does this AABB intersect `other`?
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.maxs) && na::partial_ge(&self.maxs, &other.mins)
    }

    /// Does this AABB contain the given point?
    #[inline]
    pub fn contains_local_point(&self, point: &Point<Real>) -> bool {
        for i in 0..DIM {
            if point[i] < self.mins[i] || point[i] > self.maxs[i] {
                return false;
            }
        }

        true
    }

    /// The squared distance between this AABB and the given point (zero if the point is inside).
    #[inline]
    pub fn distance_squared_to_point(&self, point: &Point<Real>) -> Real {
        let mins_pt = self.mins - point;
        let pt_maxs = point - self.maxs;
        let shift = mins_pt.sup(&pt_maxs).sup(&Vector::zeros());
        shift.norm_squared()
    }

    /// Enlarges this AABB by `amount` along every direction.
    #[inline]
    pub fn loosened(&self, amount: Real) -> Aabb {
        Aabb {
            mins: self.mins - Vector::repeat(amount),
            maxs: self.maxs + Vector::repeat(amount),
        }
    }

    /// Computes the vertices of this AABB.
    ///
    /// The vertex `i` takes its `x` (resp. `y`, `z`) coordinate from `maxs` if the
    /// bit 0 (resp. 1, 2) of `i` is set.
    #[inline]
    pub fn vertices(&self) -> [Point<Real>; 8] {
        let mut result = [self.mins; 8];

        for (i, pt) in result.iter_mut().enumerate() {
            for d in 0..DIM {
                if i & (1 << d) != 0 {
                    pt[d] = self.maxs[d];
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn aabb_from_points() {
        let pts = [
            Point::new(1.0, -2.0, 0.5),
            Point::new(-1.0, 3.0, 0.0),
            Point::new(0.0, 0.0, 2.0),
        ];
        let aabb = Aabb::from_points(&pts);
        assert_eq!(aabb.mins, Point::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.maxs, Point::new(1.0, 3.0, 2.0));
        assert_eq!(aabb.longest_axis(), 1);
        assert_relative_eq!(aabb.volume(), 20.0);
        assert!(!Aabb::from_points(&[] as &[Point<Real>]).is_valid());
    }

    #[test]
    fn aabb_point_distance() {
        let aabb = Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.distance_squared_to_point(&Point::new(0.5, 0.5, 0.5)), 0.0);
        assert_relative_eq!(aabb.distance_squared_to_point(&Point::new(3.0, 0.5, 0.5)), 4.0);
    }
}
