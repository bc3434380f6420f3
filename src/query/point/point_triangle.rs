use crate::math::{Point, Real};
use crate::shape::Triangle;

/// Projects `pt` on the segment `[a, b]`.
#[inline]
pub fn project_point_on_segment(a: &Point<Real>, b: &Point<Real>, pt: &Point<Real>) -> Point<Real> {
    let ab = b - a;
    let sqnab = ab.norm_squared();

    if sqnab == 0.0 {
        return *a;
    }

    let t = (ab.dot(&(pt - a)) / sqnab).clamp(0.0, 1.0);
    a + ab * t
}

/// Computes the point of the triangle `tri` closest to `pt`.
///
/// The triangle is treated as a surface: points behind or in front of the face
/// project on it the same way.
pub fn project_point_on_triangle(tri: &Triangle, pt: &Point<Real>) -> Point<Real> {
    let a = tri.a;
    let b = tri.b;
    let c = tri.c;

    let ab = b - a;
    let ac = c - a;
    let ap = pt - a;

    let ab_ap = ab.dot(&ap);
    let ac_ap = ac.dot(&ap);

    if ab_ap <= 0.0 && ac_ap <= 0.0 {
        // Voronoï region of `a`.
        return a;
    }

    let bp = pt - b;
    let ab_bp = ab.dot(&bp);
    let ac_bp = ac.dot(&bp);

    if ab_bp >= 0.0 && ac_bp <= ab_bp {
        // Voronoï region of `b`.
        return b;
    }

    let cp = pt - c;
    let ab_cp = ab.dot(&cp);
    let ac_cp = ac.dot(&cp);

    if ac_cp >= 0.0 && ab_cp <= ac_cp {
        // Voronoï region of `c`.
        return c;
    }

    let bc = c - b;
    let n = ab.cross(&ac);

    let vc = n.dot(&ab.cross(&ap));
    if vc < 0.0 && ab_ap >= 0.0 && ab_bp <= 0.0 {
        // Voronoï region of `ab`.
        let v = ab_ap / ab.norm_squared();
        return a + ab * v;
    }

    let vb = -n.dot(&ac.cross(&cp));
    if vb < 0.0 && ac_ap >= 0.0 && ac_cp <= 0.0 {
        // Voronoï region of `ac`.
        let w = ac_ap / ac.norm_squared();
        return a + ac * w;
    }

    let va = n.dot(&bc.cross(&bp));
    if va < 0.0 && ac_bp - ab_bp >= 0.0 && ab_cp - ac_cp >= 0.0 {
        // Voronoï region of `bc`.
        let w = bc.dot(&bp) / bc.norm_squared();
        return b + bc * w;
    }

    // NOTE: the denominator is zero when the triangle is degenerate.
    // Fall back to the closest of the three edges.
    let denom = va + vb + vc;
    if denom != 0.0 {
        let v = vb / denom;
        let w = vc / denom;
        return a + ab * v + ac * w;
    }

    let candidates = [
        project_point_on_segment(&a, &b, pt),
        project_point_on_segment(&b, &c, pt),
        project_point_on_segment(&a, &c, pt),
    ];

    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if na::distance_squared(candidate, pt) < na::distance_squared(&best, pt) {
            best = *candidate;
        }
    }

    best
}
