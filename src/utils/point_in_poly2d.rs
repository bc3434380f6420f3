use crate::math::{Point2, Real};

/// Tests if the given point is inside of the region bounded by an unordered set of 2D
/// segments, using the even-odd rule.
///
/// The segments don't need to be chained nor consistently oriented: this counts
/// how many of them cross the horizontal half-line starting at `pt` toward `+x`.
pub fn point_in_segment_soup2d(pt: &Point2<Real>, segments: &[[Point2<Real>; 2]]) -> bool {
    let mut crossings = 0u32;

    for [a, b] in segments {
        // Orient the segment upward so the half-open rule counts shared endpoints once.
        let (a, b) = if a.y <= b.y { (a, b) } else { (b, a) };

        if a.y <= pt.y && pt.y < b.y {
            let seg_dir = b - a;
            let dpt = pt - a;
            let perp = dpt.perp(&seg_dir);

            if perp < 0.0 {
                crossings += 1;
            }
        }
    }

    crossings % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_with_hole() {
        let square = |min: Real, max: Real| {
            let pts = [
                Point2::new(min, min),
                Point2::new(max, min),
                Point2::new(max, max),
                Point2::new(min, max),
            ];
            (0..4).map(move |i| [pts[i], pts[(i + 1) % 4]])
        };
        // Deliberately mix orientations.
        let mut segments: Vec<_> = square(0.0, 4.0).collect();
        segments.extend(square(1.0, 2.0).map(|[a, b]| [b, a]));

        assert!(point_in_segment_soup2d(&Point2::new(0.5, 0.5), &segments));
        assert!(point_in_segment_soup2d(&Point2::new(3.0, 3.0), &segments));
        assert!(!point_in_segment_soup2d(&Point2::new(1.5, 1.5), &segments));
        assert!(!point_in_segment_soup2d(&Point2::new(5.0, 1.5), &segments));
    }
}
