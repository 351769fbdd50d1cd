//! Physical validity testing of candidate paths
//!
//! A geometrically sound path still has to live on the real board: it must
//! not cross a board edge (unless every slot it crosses is narrow enough to
//! bridge), its midpoint must stay on the routable area, and away from the
//! edge layer it must not run through copper. Tests run in that order and
//! short-circuit on the first failure; the whole module is free of side
//! effects.

use crate::board::{ArcTrack, Board, EdgeItem, EdgeShape, Layer, Track, TrackIndex, TrackShape};
use crate::geometry::{
    segment_arc_distance, segment_arc_intersections, segment_circle_intersections,
    segment_intersection, segment_segment_distance, Outline, Point,
};

use super::paths::PathConnection;

/// Containment tolerance for the outline midpoint test: 100 nm
pub const OUTLINE_TOL_MM: f64 = 1e-4;

/// Crossings this close to a probe endpoint are the probe's own anchor
/// sitting on an edge, not a blocking crossing
const ENDPOINT_EPS: f64 = 1e-6;

/// Rejects paths through locally convex edge regions. Kept off until the
/// intended semantics are settled; switching it on changes which paths
/// survive.
const CHECK_LOCAL_CONCAVITY: bool = false;

/// Read-only board state a validity query runs against
#[derive(Clone, Copy)]
pub struct ValidityContext<'a> {
    pub board: &'a Board,
    pub layer: Layer,
    pub edges: &'a [EdgeItem],
    /// Board item ids the probe may touch freely (its endpoints' parents)
    pub ignore: &'a [u64],
    pub outline: Option<&'a Outline>,
    pub min_groove_width: f64,
    pub track_index: Option<&'a TrackIndex>,
}

impl PathConnection {
    /// Whether the path is physically traversable on the board. Pure
    /// predicate; with no outline available it fails open so partial data
    /// does not suppress the rest of the analysis.
    pub fn is_valid(&self, ctx: &ValidityContext) -> bool {
        let Some(outline) = ctx.outline else {
            return true;
        };

        if segment_crosses_board_edge(self.a1, self.a2, ctx.edges, ctx.ignore, ctx.min_groove_width)
        {
            return false;
        }

        if !outline.contains(self.a1.midpoint(self.a2), OUTLINE_TOL_MM) {
            return false;
        }

        if CHECK_LOCAL_CONCAVITY
            && (self.force_a1_concavity_check || self.force_a2_concavity_check)
            && !self.passes_concavity(outline)
        {
            return false;
        }

        if ctx.layer != Layer::EdgeCuts && self.crosses_copper(ctx) {
            return false;
        }

        true
    }

    /// Flagged corner anchors must launch into the board, not off it
    fn passes_concavity(&self, outline: &Outline) -> bool {
        let step = (self.a2 - self.a1).resize(OUTLINE_TOL_MM * 10.0);
        let mut ok = true;
        if self.force_a1_concavity_check {
            ok &= outline.contains(self.a1 + step, OUTLINE_TOL_MM);
        }
        if self.force_a2_concavity_check {
            ok &= outline.contains(self.a2 - step, OUTLINE_TOL_MM);
        }
        ok
    }

    fn crosses_copper(&self, ctx: &ValidityContext) -> bool {
        if let Some(index) = ctx.track_index {
            let min = [self.a1.x.min(self.a2.x), self.a1.y.min(self.a2.y)];
            let max = [self.a1.x.max(self.a2.x), self.a1.y.max(self.a2.y)];
            index.tracks_near(min, max).any(|entry| match &entry.shape {
                TrackShape::Straight(t) => track_blocks(t, self.a1, self.a2, ctx),
                TrackShape::Curved(a) => arc_track_blocks(a, self.a1, self.a2, ctx),
            })
        } else {
            ctx.board
                .tracks
                .iter()
                .any(|t| track_blocks(t, self.a1, self.a2, ctx))
                || ctx
                    .board
                    .track_arcs
                    .iter()
                    .any(|a| arc_track_blocks(a, self.a1, self.a2, ctx))
        }
    }
}

/// A track blocks the probe when the probe cuts into the copper stadium;
/// grazing the boundary is allowed
fn track_blocks(track: &Track, p1: Point, p2: Point, ctx: &ValidityContext) -> bool {
    track.layer == ctx.layer
        && !ctx.ignore.contains(&track.id)
        && segment_segment_distance(p1, p2, track.start, track.end) + 1e-9 < track.width / 2.0
}

/// Stadium test against a curved track's spine
fn arc_track_blocks(arc: &ArcTrack, p1: Point, p2: Point, ctx: &ValidityContext) -> bool {
    arc.layer == ctx.layer
        && !ctx.ignore.contains(&arc.id)
        && segment_arc_distance(p1, p2, arc.center, arc.radius, arc.start_angle, arc.sweep) + 1e-9
            < arc.width / 2.0
}

/// Groove-aware board-edge crossing test.
///
/// Crossings at the probe's own endpoints are skipped (anchors legitimately
/// sit on edges). The rest are paired off along the probe as slot walls:
/// when every crossed slot is narrower than the groove threshold the
/// discharge bridges them all and the probe passes. An unpaired crossing
/// always blocks.
pub fn segment_crosses_board_edge(
    p1: Point,
    p2: Point,
    edges: &[EdgeItem],
    ignore: &[u64],
    min_groove_width: f64,
) -> bool {
    if p1.distance(p2) < 1e-12 {
        return false;
    }

    let mut hits: Vec<f64> = Vec::new();
    for item in edges {
        if ignore.contains(&item.id) {
            continue;
        }
        let points: Vec<Point> = match &item.shape {
            EdgeShape::Segment { start, end } => {
                segment_intersection(p1, p2, *start, *end).into_iter().collect()
            }
            EdgeShape::Arc { center, radius, start_angle, sweep } => {
                segment_arc_intersections(p1, p2, *center, *radius, *start_angle, *sweep)
            }
            EdgeShape::Circle { center, radius } => {
                segment_circle_intersections(p1, p2, *center, *radius)
            }
        };
        for ip in points {
            if ip.distance(p1) < ENDPOINT_EPS || ip.distance(p2) < ENDPOINT_EPS {
                continue;
            }
            hits.push(ip.distance(p1));
        }
    }

    if hits.is_empty() {
        return false;
    }
    if min_groove_width <= 0.0 || hits.len() % 2 != 0 {
        return true;
    }

    hits.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    hits.chunks(2).any(|wall| wall[1] - wall[0] >= min_groove_width)
}
