//! Definition of the triangle shape.

use crate::math::{Point, Real, UnitVector, Vector};

/// A triangle shape.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Triangle {
    /// The triangle first point.
    pub a: Point<Real>,
    /// The triangle second point.
    pub b: Point<Real>,
    /// The triangle third point.
    pub c: Point<Real>,
}

impl From<[Point<Real>; 3]> for Triangle {
    fn from(arr: [Point<Real>; 3]) -> Self {
        Triangle::new(arr[0], arr[1], arr[2])
    }
}

impl Triangle {
    /// Creates a triangle from three points.
    #[inline]
    pub fn new(a: Point<Real>, b: Point<Real>, c: Point<Real>) -> Triangle {
        Triangle { a, b, c }
    }

    /// The vertices of this triangle.
    #[inline]
    pub fn vertices(&self) -> [Point<Real>; 3] {
        [self.a, self.b, self.c]
    }

    /// A vector normal of this triangle, with a norm equal to twice its area.
    ///
    /// The vector points toward the side from which `a, b, c` appear counter-clockwise.
    #[inline]
    pub fn scaled_normal(&self) -> Vector<Real> {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        ab.cross(&ac)
    }

    /// The normal of this triangle, or `None` if it is degenerate.
    #[inline]
    pub fn normal(&self) -> Option<UnitVector<Real>> {
        UnitVector::try_new(self.scaled_normal(), crate::math::DEFAULT_EPSILON)
    }

    /// The area of this triangle.
    #[inline]
    pub fn area(&self) -> Real {
        self.scaled_normal().norm() * 0.5
    }

    /// The geometric center of this triangle.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        Point::from((self.a.coords + self.b.coords + self.c.coords) / 3.0)
    }

    /// The signed volume of the tetrahedron formed by this triangle and the origin.
    #[inline]
    pub fn signed_volume_from_origin(&self) -> Real {
        self.a.coords.dot(&self.b.coords.cross(&self.c.coords)) / 6.0
    }

    /// Tests if this triangle is affinely dependent, i.e., its points are almost aligned.
    pub fn is_affinely_dependent(&self) -> bool {
        const EPS: Real = crate::math::DEFAULT_EPSILON * 100.0;

        let p1p2 = self.b - self.a;
        let p1p3 = self.c - self.a;
        relative_eq!(p1p2.cross(&p1p3).norm_squared(), 0.0, epsilon = EPS * EPS)
    }

    /// Samples the point of barycentric-like parameters `(r1, r2) ∈ [0, 1]²`.
    ///
    /// Uniformly distributed `(r1, r2)` yield points uniformly distributed on the triangle.
    #[inline]
    pub fn sample(&self, r1: Real, r2: Real) -> Point<Real> {
        let s = r1.sqrt();
        let u = 1.0 - s;
        let v = s * (1.0 - r2);
        let w = s * r2;
        Point::from(self.a.coords * u + self.b.coords * v + self.c.coords * w)
    }
}
