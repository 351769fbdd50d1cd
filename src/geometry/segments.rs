//! Straight-segment distance and intersection predicates

use super::point::Point;

/// Closest point to `p` on segment [a, b]
pub fn nearest_point_on_segment(p: Point, a: Point, b: Point) -> Point {
    let ab = b - a;
    let len2 = ab.squared_norm();

    if len2 < 1e-12 {
        // Degenerate segment
        return a;
    }

    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}

/// Point-to-segment minimum distance
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    p.distance(nearest_point_on_segment(p, a, b))
}

/// Closest pair of points between segments [a1, a2] and [b1, b2].
/// Returns (point on a, point on b); coincident when the segments intersect.
pub fn segment_segment_closest(a1: Point, a2: Point, b1: Point, b2: Point) -> (Point, Point) {
    if let Some(ip) = segment_intersection(a1, a2, b1, b2) {
        return (ip, ip);
    }

    // Disjoint segments: the closest pair involves at least one endpoint
    let mut best = (a1, nearest_point_on_segment(a1, b1, b2));
    let mut best_d = best.0.squared_distance(best.1);

    for (pa, pb) in [
        (a2, nearest_point_on_segment(a2, b1, b2)),
        (nearest_point_on_segment(b1, a1, a2), b1),
        (nearest_point_on_segment(b2, a1, a2), b2),
    ] {
        let d = pa.squared_distance(pb);
        if d < best_d {
            best_d = d;
            best = (pa, pb);
        }
    }

    best
}

/// Segment-to-segment minimum distance
pub fn segment_segment_distance(a1: Point, a2: Point, b1: Point, b2: Point) -> f64 {
    let (pa, pb) = segment_segment_closest(a1, a2, b1, b2);
    pa.distance(pb)
}

/// Intersection point of segments [p1, p2] and [q1, q2].
///
/// Collinear overlap reports no intersection: a probe running along a board
/// edge travels on the surface, it does not cross it.
pub fn segment_intersection(p1: Point, p2: Point, q1: Point, q2: Point) -> Option<Point> {
    let d1 = p2 - p1;
    let d2 = q2 - q1;
    let denom = d1.cross(d2);

    if denom.abs() < 1e-12 {
        return None;
    }

    let delta = q1 - p1;
    let t = delta.cross(d2) / denom;
    let u = delta.cross(d1) / denom;

    const T_EPS: f64 = 1e-9;
    if (-T_EPS..=1.0 + T_EPS).contains(&t) && (-T_EPS..=1.0 + T_EPS).contains(&u) {
        Some(p1 + d1 * t)
    } else {
        None
    }
}
