//! Candidate path generation between shape pairs
//!
//! `paths` enumerates every geometrically meaningful connection between two
//! shapes, before validity filtering. The 36 ordered kind pairs collapse to
//! 21 canonical cases: shapes carry a fixed rank, the dispatch computes the
//! rank-ordered direction and `reverse_paths` flips the result for the
//! other, so each geometric routine exists once. Same-rank pairs order by
//! position, so either argument order reaches the routine the same way
//! around and the result is symmetric down to the anchors.
//!
//! The underlying physics is a taut string: around a smooth convex obstacle
//! (a board-edge circle or arc) the optimal path meets the curve
//! tangentially, while a conductor is a terminal the path simply reaches by
//! nearest approach. Bare corners (edge points, arc endpoints) allow the
//! path to bend, so they connect by straight sight lines.

use std::cmp::Ordering;

use crate::geometry::{
    arc_contains_angle, circle_circle_tangents, point_circle_tangents, point_on_circle,
    segment_segment_closest, Point,
};

use super::shapes::CreepShape;

/// A candidate path between anchor `a1` on one shape and `a2` on another
#[derive(Debug, Clone)]
pub struct PathConnection {
    pub a1: Point,
    pub a2: Point,
    /// Path length; negative until computed. The solver skips connections
    /// that never received a weight.
    pub weight: f64,
    /// Anchor sits on a bare corner rather than a smooth curve; the
    /// (currently disabled) local-concavity validity test keys off these
    pub force_a1_concavity_check: bool,
    pub force_a2_concavity_check: bool,
}

impl PathConnection {
    pub fn new(a1: Point, a2: Point) -> Self {
        Self {
            a1,
            a2,
            weight: -1.0,
            force_a1_concavity_check: false,
            force_a2_concavity_check: false,
        }
    }

    /// Straight connection weighted by its length
    pub fn straight(a1: Point, a2: Point) -> Self {
        Self { weight: a1.distance(a2), ..Self::new(a1, a2) }
    }

    pub fn with_weight(a1: Point, a2: Point, weight: f64) -> Self {
        Self { weight, ..Self::new(a1, a2) }
    }

    fn flags(mut self, a1_corner: bool, a2_corner: bool) -> Self {
        self.force_a1_concavity_check = a1_corner;
        self.force_a2_concavity_check = a2_corner;
        self
    }

    /// Swap anchor roles; weight is direction-independent and not
    /// recomputed
    pub fn reversed(&self) -> Self {
        Self {
            a1: self.a2,
            a2: self.a1,
            weight: self.weight,
            force_a1_concavity_check: self.force_a2_concavity_check,
            force_a2_concavity_check: self.force_a1_concavity_check,
        }
    }
}

/// Flip a path set generated in the opposite shape order
pub fn reverse_paths(paths: Vec<PathConnection>) -> Vec<PathConnection> {
    paths.into_iter().map(|p| p.reversed()).collect()
}

/// Position order for same-rank pairs. The pairwise routines break distance
/// ties by candidate order, which inverts under argument swap; dispatching
/// same-rank shapes in one fixed order keeps `paths` symmetric.
fn same_rank_order(a: &CreepShape, b: &CreepShape) -> Ordering {
    let (pa, pb) = (a.pos(), b.pos());
    pa.x.total_cmp(&pb.x)
        .then_with(|| pa.y.total_cmp(&pb.y))
        .then_with(|| a.extent().total_cmp(&b.extent()))
        .then_with(|| a.net().cmp(&b.net()))
}

/// Every candidate connection from `a` to `b`, anchors in that order.
///
/// `max_weight`/`max_sq_weight` are pruning caps; zero or negative means
/// unbounded. Degenerate and enclosed configurations yield an empty set,
/// never an error.
pub fn paths(
    a: &CreepShape,
    b: &CreepShape,
    max_weight: f64,
    max_sq_weight: f64,
) -> Vec<PathConnection> {
    if a.rank() > b.rank()
        || (a.rank() == b.rank() && same_rank_order(a, b) == Ordering::Greater)
    {
        return reverse_paths(paths(b, a, max_weight, max_sq_weight));
    }

    // Cheap reject before any tangent math: even the closest possible
    // approach is over budget
    if max_weight > 0.0 {
        let lower_bound = a.pos().distance(b.pos()) - a.extent() - b.extent();
        if lower_bound > max_weight {
            return Vec::new();
        }
    }

    use CreepShape::*;
    let mut out = Vec::new();
    match (a, b) {
        (BePoint { pos: p, .. }, BePoint { pos: q, .. }) => {
            out.push(PathConnection::straight(*p, *q).flags(true, true));
        }
        (BePoint { pos: p, .. }, BeCircle { center, radius, .. }) => {
            point_to_circle(*p, *center, *radius, &mut out);
        }
        (BePoint { pos: p, .. }, BeArc { center, radius, start_angle, sweep, .. }) => {
            point_to_arc(*p, *center, *radius, *start_angle, *sweep, &mut out);
        }
        (BePoint { pos: p, .. }, CuSegment { .. } | CuCircle { .. } | CuArc { .. }) => {
            if let Some((anchor, gap)) = b.boundary_toward(*p) {
                out.push(PathConnection::with_weight(*p, anchor, gap).flags(true, false));
            }
        }
        (BeCircle { center: c1, radius: r1, .. }, BeCircle { center: c2, radius: r2, .. }) => {
            for t in circle_circle_tangents(*c1, *r1, *c2, *r2) {
                out.push(PathConnection::straight(t.on_first, t.on_second));
            }
        }
        (
            BeCircle { center: c, radius: r, .. },
            BeArc { center, radius, start_angle, sweep, .. },
        ) => {
            circle_to_arc(*c, *r, *center, *radius, *start_angle, *sweep, &mut out);
        }
        (BeCircle { center, radius, .. }, CuSegment { .. } | CuCircle { .. } | CuArc { .. }) => {
            conductor_to_circle(b, *center, *radius, &mut out);
        }
        (BeArc { .. }, BeArc { .. }) => {
            arc_to_arc(a, b, &mut out);
        }
        (
            BeArc { center, radius, start_angle, sweep, .. },
            CuSegment { .. } | CuCircle { .. } | CuArc { .. },
        ) => {
            conductor_to_arc(b, *center, *radius, *start_angle, *sweep, &mut out);
        }
        (
            CuSegment { .. } | CuCircle { .. } | CuArc { .. },
            CuSegment { .. } | CuCircle { .. } | CuArc { .. },
        ) => {
            conductor_pair(a, b, &mut out);
        }
        // Rank ordering leaves no other combination
        _ => unreachable!("shape pair not in canonical order"),
    }

    out.retain(|c| within_budget(c, max_weight, max_sq_weight));
    out
}

fn within_budget(c: &PathConnection, max_weight: f64, max_sq_weight: f64) -> bool {
    if c.weight < 0.0 {
        return false;
    }
    if max_weight > 0.0 && c.weight > max_weight {
        return false;
    }
    if max_sq_weight > 0.0 && c.weight * c.weight > max_sq_weight {
        return false;
    }
    true
}

/// Tangent pair from a corner point to a circle. A point on the circle
/// degenerates to zero-weight touches; a point inside yields nothing.
fn point_to_circle(p: Point, center: Point, radius: f64, out: &mut Vec<PathConnection>) {
    if let Some((t1, t2)) = point_circle_tangents(p, center, radius) {
        out.push(PathConnection::straight(p, t1).flags(true, false));
        out.push(PathConnection::straight(p, t2).flags(true, false));
    }
}

/// Corner point to an arc: tangents that land on the sweep, plus the arc
/// endpoints a path can leave the hug from
fn point_to_arc(
    p: Point,
    center: Point,
    radius: f64,
    start_angle: f64,
    sweep: f64,
    out: &mut Vec<PathConnection>,
) {
    if let Some((t1, t2)) = point_circle_tangents(p, center, radius) {
        for t in [t1, t2] {
            if arc_contains_angle(start_angle, sweep, (t - center).angle()) {
                out.push(PathConnection::straight(p, t).flags(true, false));
            }
        }
    }
    let s = point_on_circle(center, radius, start_angle);
    let e = point_on_circle(center, radius, start_angle + sweep);
    out.push(PathConnection::straight(p, s).flags(true, true));
    out.push(PathConnection::straight(p, e).flags(true, true));
}

/// Circle to arc: common tangents that land on the sweep, plus tangents
/// from the arc endpoints to the circle
fn circle_to_arc(
    c: Point,
    r: f64,
    arc_center: Point,
    arc_radius: f64,
    start_angle: f64,
    sweep: f64,
    out: &mut Vec<PathConnection>,
) {
    for t in circle_circle_tangents(c, r, arc_center, arc_radius) {
        if arc_contains_angle(start_angle, sweep, (t.on_second - arc_center).angle()) {
            out.push(PathConnection::straight(t.on_first, t.on_second));
        }
    }
    for ep in [
        point_on_circle(arc_center, arc_radius, start_angle),
        point_on_circle(arc_center, arc_radius, start_angle + sweep),
    ] {
        if let Some((t1, t2)) = point_circle_tangents(ep, c, r) {
            out.push(PathConnection::straight(t1, ep).flags(false, true));
            out.push(PathConnection::straight(t2, ep).flags(false, true));
        }
    }
}

/// Arc to arc: common tangents filtered by both sweeps, endpoint-to-curve
/// tangents in both directions, and all endpoint-to-endpoint sight lines
fn arc_to_arc(a: &CreepShape, b: &CreepShape, out: &mut Vec<PathConnection>) {
    let (
        CreepShape::BeArc { center: c1, radius: r1, start_angle: s1, sweep: w1, .. },
        CreepShape::BeArc { center: c2, radius: r2, start_angle: s2, sweep: w2, .. },
    ) = (a, b)
    else {
        return;
    };

    for t in circle_circle_tangents(*c1, *r1, *c2, *r2) {
        if arc_contains_angle(*s1, *w1, (t.on_first - *c1).angle())
            && arc_contains_angle(*s2, *w2, (t.on_second - *c2).angle())
        {
            out.push(PathConnection::straight(t.on_first, t.on_second));
        }
    }

    let ends_a = [
        point_on_circle(*c1, *r1, *s1),
        point_on_circle(*c1, *r1, *s1 + *w1),
    ];
    let ends_b = [
        point_on_circle(*c2, *r2, *s2),
        point_on_circle(*c2, *r2, *s2 + *w2),
    ];

    for ea in ends_a {
        if let Some((t1, t2)) = point_circle_tangents(ea, *c2, *r2) {
            for t in [t1, t2] {
                if arc_contains_angle(*s2, *w2, (t - *c2).angle()) {
                    out.push(PathConnection::straight(ea, t).flags(true, false));
                }
            }
        }
    }
    for eb in ends_b {
        if let Some((t1, t2)) = point_circle_tangents(eb, *c1, *r1) {
            for t in [t1, t2] {
                if arc_contains_angle(*s1, *w1, (t - *c1).angle()) {
                    out.push(PathConnection::straight(t, eb).flags(false, true));
                }
            }
        }
        for ea in ends_a {
            out.push(PathConnection::straight(ea, eb).flags(true, true));
        }
    }
}

/// Conductor to a board-edge circle: tangents at the circle, launched from
/// the conductor boundary. The launch point is seeded toward the circle
/// center and refined once per tangent. A conductor inside the circle sees
/// no tangents (a taut path inside a convex boundary never hugs it).
fn conductor_to_circle(
    cond: &CreepShape,
    center: Point,
    radius: f64,
    out: &mut Vec<PathConnection>,
) {
    let Some((launch, _)) = cond.boundary_toward(center) else {
        return;
    };
    let Some((t1, t2)) = point_circle_tangents(launch, center, radius) else {
        return;
    };
    for t in [t1, t2] {
        if let Some((anchor, _)) = cond.boundary_toward(t) {
            out.push(PathConnection::straight(t, anchor));
        }
    }
}

/// Conductor to a board-edge arc: tangents on the sweep plus nearest
/// approach to the arc endpoints
fn conductor_to_arc(
    cond: &CreepShape,
    center: Point,
    radius: f64,
    start_angle: f64,
    sweep: f64,
    out: &mut Vec<PathConnection>,
) {
    if let Some((launch, _)) = cond.boundary_toward(center) {
        if let Some((t1, t2)) = point_circle_tangents(launch, center, radius) {
            for t in [t1, t2] {
                if arc_contains_angle(start_angle, sweep, (t - center).angle()) {
                    if let Some((anchor, _)) = cond.boundary_toward(t) {
                        out.push(PathConnection::straight(t, anchor));
                    }
                }
            }
        }
    }
    for ep in [
        point_on_circle(center, radius, start_angle),
        point_on_circle(center, radius, start_angle + sweep),
    ] {
        if let Some((anchor, gap)) = cond.boundary_toward(ep) {
            out.push(PathConnection::with_weight(ep, anchor, gap).flags(true, false));
        }
    }
}

/// Nearest approach between two conductor boundaries. Overlapping copper
/// collapses to a single zero-weight touch.
fn conductor_pair(a: &CreepShape, b: &CreepShape, out: &mut Vec<PathConnection>) {
    let (sa, sb) = match (a, b) {
        (
            CreepShape::CuSegment { start: a1, end: a2, .. },
            CreepShape::CuSegment { start: b1, end: b2, .. },
        ) => segment_segment_closest(*a1, *a2, *b1, *b2),
        _ => {
            // Alternating projection between the spines; settles in a few
            // rounds for point and arc spines
            let Some(mut pb) = b.spine_nearest(a.pos()) else { return };
            let Some(mut pa) = a.spine_nearest(pb) else { return };
            for _ in 0..2 {
                pb = match b.spine_nearest(pa) {
                    Some(p) => p,
                    None => return,
                };
                pa = match a.spine_nearest(pb) {
                    Some(p) => p,
                    None => return,
                };
            }
            (pa, pb)
        }
    };

    let gap = sa.distance(sb) - a.half_width() - b.half_width();
    if gap <= 0.0 {
        let m = sa.midpoint(sb);
        out.push(PathConnection::with_weight(m, m, 0.0));
        return;
    }
    let a1 = sa + (sb - sa).resize(a.half_width());
    let a2 = sb + (sa - sb).resize(b.half_width());
    out.push(PathConnection::with_weight(a1, a2, gap));
}
