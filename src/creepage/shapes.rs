//! Geometric features participating in creepage analysis
//!
//! A `CreepShape` is either a board-edge feature (`Be*`, never conductive:
//! outline corners, cutout circles, edge arcs) or a conductor boundary
//! (`Cu*`: track stadiums, circular pads/vias, arc tracks). Board-edge
//! shapes act as obstacles a surface path can hug; conductors are the
//! terminals paths start and end on.
//!
//! Arc variants always store a counterclockwise sweep in [0, 2π); the
//! constructors normalize clockwise input so the end angle is reachable from
//! the start by forward sweep.

use std::f64::consts::TAU;

use crate::board::{NetCode, NET_UNASSIGNED};
use crate::geometry::{
    nearest_point_on_arc, nearest_point_on_segment, normalize_angle, point_on_circle, quantize_mm,
    Point,
};

/// Geometric kind of a shape, independent of conductivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Point,
    Circle,
    Arc,
    Segment,
}

/// One feature of the creepage model. Owned by the graph's shape arena;
/// `parent` is the originating board item id, used only for identity when
/// building ignore lists.
#[derive(Debug, Clone)]
pub enum CreepShape {
    BePoint {
        pos: Point,
        parent: Option<u64>,
    },
    BeCircle {
        center: Point,
        radius: f64,
        parent: Option<u64>,
    },
    BeArc {
        center: Point,
        radius: f64,
        start_angle: f64,
        sweep: f64,
        parent: Option<u64>,
    },
    CuSegment {
        start: Point,
        end: Point,
        width: f64,
        parent: Option<u64>,
        net: NetCode,
    },
    CuCircle {
        center: Point,
        radius: f64,
        parent: Option<u64>,
        net: NetCode,
    },
    CuArc {
        center: Point,
        radius: f64,
        start_angle: f64,
        sweep: f64,
        width: f64,
        parent: Option<u64>,
        net: NetCode,
    },
}

impl CreepShape {
    /// Board-edge arc with normalized angles. Clockwise input (negative
    /// sweep) is rewritten as the equivalent counterclockwise arc; a sweep
    /// of a full turn or more becomes a circle.
    pub fn be_arc(
        center: Point,
        radius: f64,
        start_angle: f64,
        sweep: f64,
        parent: Option<u64>,
    ) -> Self {
        let (start_angle, sweep) = normalize_arc(start_angle, sweep);
        if sweep >= TAU {
            return CreepShape::BeCircle { center, radius, parent };
        }
        CreepShape::BeArc { center, radius, start_angle, sweep, parent }
    }

    /// Conductive arc track with normalized angles
    pub fn cu_arc(
        center: Point,
        radius: f64,
        start_angle: f64,
        sweep: f64,
        width: f64,
        parent: Option<u64>,
        net: NetCode,
    ) -> Self {
        let (start_angle, sweep) = normalize_arc(start_angle, sweep);
        CreepShape::CuArc { center, radius, start_angle, sweep, width, parent, net }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            CreepShape::BePoint { .. } => ShapeKind::Point,
            CreepShape::BeCircle { .. } | CreepShape::CuCircle { .. } => ShapeKind::Circle,
            CreepShape::BeArc { .. } | CreepShape::CuArc { .. } => ShapeKind::Arc,
            CreepShape::CuSegment { .. } => ShapeKind::Segment,
        }
    }

    pub fn conductive(&self) -> bool {
        matches!(
            self,
            CreepShape::CuSegment { .. } | CreepShape::CuCircle { .. } | CreepShape::CuArc { .. }
        )
    }

    /// Representative position: the point itself, a circle/arc center, a
    /// segment midpoint
    pub fn pos(&self) -> Point {
        match self {
            CreepShape::BePoint { pos, .. } => *pos,
            CreepShape::BeCircle { center, .. }
            | CreepShape::BeArc { center, .. }
            | CreepShape::CuCircle { center, .. }
            | CreepShape::CuArc { center, .. } => *center,
            CreepShape::CuSegment { start, end, .. } => start.midpoint(*end),
        }
    }

    /// Originating board item id, for validity ignore lists
    pub fn parent_item(&self) -> Option<u64> {
        match self {
            CreepShape::BePoint { parent, .. }
            | CreepShape::BeCircle { parent, .. }
            | CreepShape::BeArc { parent, .. }
            | CreepShape::CuSegment { parent, .. }
            | CreepShape::CuCircle { parent, .. }
            | CreepShape::CuArc { parent, .. } => *parent,
        }
    }

    pub fn net(&self) -> NetCode {
        match self {
            CreepShape::CuSegment { net, .. }
            | CreepShape::CuCircle { net, .. }
            | CreepShape::CuArc { net, .. } => *net,
            _ => NET_UNASSIGNED,
        }
    }

    /// Upper bound on how far the shape reaches from `pos()`; used for
    /// cheap distance pruning
    pub fn extent(&self) -> f64 {
        match self {
            CreepShape::BePoint { .. } => 0.0,
            CreepShape::BeCircle { radius, .. } | CreepShape::CuCircle { radius, .. } => *radius,
            CreepShape::BeArc { radius, .. } => *radius,
            CreepShape::CuArc { radius, width, .. } => radius + width / 2.0,
            CreepShape::CuSegment { start, end, width, .. } => {
                start.distance(*end) / 2.0 + width / 2.0
            }
        }
    }

    /// Start and end points of an arc variant
    pub fn arc_endpoints(&self) -> Option<(Point, Point)> {
        match self {
            CreepShape::BeArc { center, radius, start_angle, sweep, .. }
            | CreepShape::CuArc { center, radius, start_angle, sweep, .. } => Some((
                point_on_circle(*center, *radius, *start_angle),
                point_on_circle(*center, *radius, *start_angle + *sweep),
            )),
            _ => None,
        }
    }

    /// Canonical ordering used by the path-generation dispatch
    pub(crate) fn rank(&self) -> u8 {
        match self {
            CreepShape::BePoint { .. } => 0,
            CreepShape::BeCircle { .. } => 1,
            CreepShape::BeArc { .. } => 2,
            CreepShape::CuSegment { .. } => 3,
            CreepShape::CuCircle { .. } => 4,
            CreepShape::CuArc { .. } => 5,
        }
    }

    /// Half-width of a conductor: the distance from its spine to its copper
    /// boundary. Zero for non-conductive shapes.
    pub(crate) fn half_width(&self) -> f64 {
        match self {
            CreepShape::CuSegment { width, .. } | CreepShape::CuArc { width, .. } => width / 2.0,
            CreepShape::CuCircle { radius, .. } => *radius,
            _ => 0.0,
        }
    }

    /// Closest point of a conductor's spine to `x`. `None` for
    /// non-conductive shapes.
    pub(crate) fn spine_nearest(&self, x: Point) -> Option<Point> {
        match self {
            CreepShape::CuSegment { start, end, .. } => {
                Some(nearest_point_on_segment(x, *start, *end))
            }
            CreepShape::CuCircle { center, .. } => Some(*center),
            CreepShape::CuArc { center, radius, start_angle, sweep, .. } => {
                Some(nearest_point_on_arc(x, *center, *radius, *start_angle, *sweep))
            }
            _ => None,
        }
    }

    /// Point of a conductor's copper boundary nearest to `x`, with the
    /// remaining gap. A point already inside the copper reports itself at
    /// gap zero.
    pub(crate) fn boundary_toward(&self, x: Point) -> Option<(Point, f64)> {
        let spine = self.spine_nearest(x)?;
        let half = self.half_width();
        let dist = spine.distance(x);
        if dist <= half {
            return Some((x, 0.0));
        }
        Some((spine + (x - spine).resize(half), dist - half))
    }

    /// Exact-identity key for collapsing coincident shapes, on the same
    /// 0.1 µm grid as node dedup
    pub(crate) fn dedup_key(&self) -> ShapeDedupKey {
        let q = |p: Point| (quantize_mm(p.x), quantize_mm(p.y));
        match self {
            CreepShape::BePoint { pos, .. } => (0, q(*pos), 0, 0, 0, NET_UNASSIGNED),
            CreepShape::BeCircle { center, radius, .. } => {
                (1, q(*center), quantize_mm(*radius), 0, 0, NET_UNASSIGNED)
            }
            CreepShape::BeArc { center, radius, start_angle, sweep, .. } => (
                2,
                q(*center),
                quantize_mm(*radius),
                quantize_angle(*start_angle),
                quantize_angle(*sweep),
                NET_UNASSIGNED,
            ),
            CreepShape::CuSegment { start, end, width, net, .. } => {
                (3, q(*start), quantize_mm(end.x), quantize_mm(end.y), quantize_mm(*width), *net)
            }
            CreepShape::CuCircle { center, radius, net, .. } => {
                (4, q(*center), quantize_mm(*radius), 0, 0, *net)
            }
            CreepShape::CuArc { center, radius, start_angle, sweep, net, .. } => (
                5,
                q(*center),
                quantize_mm(*radius),
                quantize_angle(*start_angle),
                quantize_angle(*sweep),
                *net,
            ),
        }
    }
}

pub(crate) type ShapeDedupKey = (u8, (i64, i64), i64, i64, i64, NetCode);

/// Rewrite an arc so the sweep is counterclockwise in [0, 2π]; full turns
/// saturate at 2π
fn normalize_arc(start_angle: f64, sweep: f64) -> (f64, f64) {
    let (start, sweep) = if sweep < 0.0 { (start_angle + sweep, -sweep) } else { (start_angle, sweep) };
    (normalize_angle(start), sweep.min(TAU))
}

/// Angles hashed at ~1e-7 rad, comfortably tighter than any board source
fn quantize_angle(angle: f64) -> i64 {
    (angle * 1e7).round() as i64
}
