use crate::math::{Point, Real, Vector};

/// A cutting plane `a·x + b·y + c·z + d = 0` together with its quality score.
///
/// The score is only meaningful relative to other planes evaluated on the same
/// mesh: lower is better.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CuttingPlane {
    /// The `x` coefficient of the plane equation.
    pub a: Real,
    /// The `y` coefficient of the plane equation.
    pub b: Real,
    /// The `z` coefficient of the plane equation.
    pub c: Real,
    /// The constant term of the plane equation.
    pub d: Real,
    /// The quality of this plane. Lower is better.
    pub score: Real,
}

impl CuttingPlane {
    /// Creates a plane from its equation coefficients, with a score of zero.
    #[inline]
    pub fn new(a: Real, b: Real, c: Real, d: Real) -> Self {
        Self {
            a,
            b,
            c,
            d,
            score: 0.0,
        }
    }

    /// The plane orthogonal to the `axis`-th coordinate axis at the coordinate `offset`.
    #[inline]
    pub fn axis_aligned(axis: usize, offset: Real) -> Self {
        let mut normal = Vector::zeros();
        normal[axis] = 1.0;
        Self::from_normal_and_offset(normal, -offset)
    }

    /// Creates a plane from its normal `(a, b, c)` and its constant term `d`.
    #[inline]
    pub fn from_normal_and_offset(normal: Vector<Real>, d: Real) -> Self {
        Self::new(normal.x, normal.y, normal.z, d)
    }

    /// Returns a copy of this plane with the given score.
    #[inline]
    pub fn with_score(mut self, score: Real) -> Self {
        self.score = score;
        self
    }

    /// The (not necessarily unit) normal `(a, b, c)` of this plane.
    #[inline]
    pub fn normal(&self) -> Vector<Real> {
        Vector::new(self.a, self.b, self.c)
    }

    /// If this plane is orthogonal to a coordinate axis, returns that axis.
    pub fn axis(&self) -> Option<usize> {
        let n = self.normal();
        let norm = n.norm();

        if norm == 0.0 {
            return None;
        }

        (0..3).find(|i| relative_eq!(n[*i].abs(), norm, epsilon = 1.0e-9))
    }

    /// Evaluates the plane equation at `pt`.
    ///
    /// This is the signed distance to the plane scaled by the norm of its normal.
    #[inline]
    pub fn side(&self, pt: &Point<Real>) -> Real {
        self.normal().dot(&pt.coords) + self.d
    }

    /// Returns this plane with a unit normal, or `None` if its normal is zero.
    pub fn normalized(&self) -> Option<Self> {
        let norm = self.normal().norm();

        if norm <= crate::math::DEFAULT_EPSILON {
            None
        } else {
            Some(Self {
                a: self.a / norm,
                b: self.b / norm,
                c: self.c / norm,
                d: self.d / norm,
                score: self.score,
            })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn axis_aligned_plane() {
        let plane = CuttingPlane::axis_aligned(1, 0.25);
        assert_eq!(plane.axis(), Some(1));
        assert_relative_eq!(plane.side(&Point::new(3.0, 0.25, -1.0)), 0.0);
        assert!(plane.side(&Point::new(0.0, 0.0, 0.0)) < 0.0);
        assert_eq!(CuttingPlane::new(1.0, 1.0, 0.0, 0.0).axis(), None);
    }
}
