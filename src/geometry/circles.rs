//! Circle and arc geometry: tangent constructions, angular spans,
//! intersections
//!
//! Tangent points are where creepage paths meet a curved surface; a straight
//! probe that merely grazes a circle is treated as touching, not crossing.

use super::point::{ccw_sweep, normalize_angle, Point};
use super::segments::{nearest_point_on_segment, point_segment_distance};

const EPS: f64 = 1e-9;

/// Angular tolerance when testing whether a point sits on an arc sweep.
/// Generous enough to absorb the error of anchors computed through atan2.
const ANGLE_EPS: f64 = 1e-7;

/// Point on the circle of `center`/`radius` at `angle`
pub fn point_on_circle(center: Point, radius: f64, angle: f64) -> Point {
    center + Point::from_angle(angle) * radius
}

/// Tangent points on a circle as seen from an external point.
///
/// Returns `None` when the point is strictly inside the circle. A point on
/// the circle degenerates to the point itself, twice.
pub fn point_circle_tangents(p: Point, center: Point, radius: f64) -> Option<(Point, Point)> {
    let delta = p - center;
    let dist = delta.norm();

    if dist + EPS < radius {
        return None;
    }

    let dir = delta.resize(1.0);
    let perp = dir.perpendicular();

    // Tangent point projected along the center-to-point axis, then offset
    // perpendicular; standard r²/d construction.
    let along = radius * radius / dist.max(EPS);
    let across = (radius * radius - along * along).max(0.0).sqrt();

    let t1 = center + dir * along + perp * across;
    let t2 = center + dir * along - perp * across;
    Some((t1, t2))
}

/// A common tangent line between two circles, described by its touch points
#[derive(Debug, Clone, Copy)]
pub struct CircleTangent {
    pub on_first: Point,
    pub on_second: Point,
}

/// Common tangents of two circles: both external tangents, plus both
/// internal tangents when the circles are disjoint. Empty when one circle
/// encloses the other.
pub fn circle_circle_tangents(
    c1: Point,
    r1: f64,
    c2: Point,
    r2: f64,
) -> Vec<CircleTangent> {
    let mut result = Vec::new();
    let dist = c1.distance(c2);

    if dist < EPS || dist + EPS < (r1 - r2).abs() {
        return result;
    }

    let base = (c2 - c1).angle();

    // External tangents: both touch points at the same offset angle
    let cos_ext = ((r1 - r2) / dist).clamp(-1.0, 1.0);
    let alpha = cos_ext.acos();
    for sign in [1.0, -1.0] {
        let a = base + sign * alpha;
        result.push(CircleTangent {
            on_first: point_on_circle(c1, r1, a),
            on_second: point_on_circle(c2, r2, a),
        });
    }

    // Internal tangents: touch points on opposite sides of the center line
    if dist + EPS >= r1 + r2 {
        let cos_int = ((r1 + r2) / dist).clamp(-1.0, 1.0);
        let beta = cos_int.acos();
        for sign in [1.0, -1.0] {
            let a = base + sign * beta;
            result.push(CircleTangent {
                on_first: point_on_circle(c1, r1, a),
                on_second: point_on_circle(c2, r2, a + std::f64::consts::PI),
            });
        }
    }

    result
}

/// True when `angle` lies within the forward sweep starting at `start_angle`
pub fn arc_contains_angle(start_angle: f64, sweep: f64, angle: f64) -> bool {
    ccw_sweep(start_angle, normalize_angle(angle)) <= sweep + ANGLE_EPS
}

/// Closest point of an arc to `p`, clamping to the nearer endpoint when the
/// radial projection falls outside the sweep
pub fn nearest_point_on_arc(
    p: Point,
    center: Point,
    radius: f64,
    start_angle: f64,
    sweep: f64,
) -> Point {
    let angle = (p - center).angle();
    if arc_contains_angle(start_angle, sweep, angle) {
        return point_on_circle(center, radius, angle);
    }

    let s = point_on_circle(center, radius, start_angle);
    let e = point_on_circle(center, radius, start_angle + sweep);
    if p.squared_distance(s) <= p.squared_distance(e) {
        s
    } else {
        e
    }
}

/// Points where segment [p1, p2] crosses the circle boundary.
///
/// Grazing contact (tangency) reports nothing: a surface path may touch a
/// curved edge without crossing it.
pub fn segment_circle_intersections(
    p1: Point,
    p2: Point,
    center: Point,
    radius: f64,
) -> Vec<Point> {
    let d = p2 - p1;
    let f = p1 - center;

    let a = d.squared_norm();
    if a < 1e-12 {
        return Vec::new();
    }

    let b = 2.0 * f.dot(d);
    let c = f.squared_norm() - radius * radius;
    let disc = b * b - 4.0 * a * c;

    if disc <= 0.0 {
        return Vec::new();
    }

    let sqrt_disc = disc.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);

    // Near-coincident roots mean the chord is negligible: tangency
    if (t2 - t1) * a.sqrt() < 1e-6 {
        return Vec::new();
    }

    let mut out = Vec::new();
    for t in [t1, t2] {
        if (-1e-9..=1.0 + 1e-9).contains(&t) {
            out.push(p1 + d * t);
        }
    }
    out
}

/// Points where segment [p1, p2] crosses an arc
pub fn segment_arc_intersections(
    p1: Point,
    p2: Point,
    center: Point,
    radius: f64,
    start_angle: f64,
    sweep: f64,
) -> Vec<Point> {
    segment_circle_intersections(p1, p2, center, radius)
        .into_iter()
        .filter(|p| arc_contains_angle(start_angle, sweep, (*p - center).angle()))
        .collect()
}

/// Minimum distance between segment [p1, p2] and an arc.
///
/// Zero when they cross. Otherwise the minimum is realized at an arc
/// endpoint, a segment endpoint, or the radial projection of the segment's
/// closest approach to the center when that bearing lies on the sweep.
pub fn segment_arc_distance(
    p1: Point,
    p2: Point,
    center: Point,
    radius: f64,
    start_angle: f64,
    sweep: f64,
) -> f64 {
    if !segment_arc_intersections(p1, p2, center, radius, start_angle, sweep).is_empty() {
        return 0.0;
    }

    let mut best = f64::MAX;
    for ep in [
        point_on_circle(center, radius, start_angle),
        point_on_circle(center, radius, start_angle + sweep),
    ] {
        best = best.min(point_segment_distance(ep, p1, p2));
    }
    for p in [p1, p2] {
        best = best.min(p.distance(nearest_point_on_arc(p, center, radius, start_angle, sweep)));
    }

    let q = nearest_point_on_segment(center, p1, p2);
    let d = q.distance(center);
    if d > EPS && arc_contains_angle(start_angle, sweep, (q - center).angle()) {
        best = best.min((d - radius).abs());
    }
    best
}
