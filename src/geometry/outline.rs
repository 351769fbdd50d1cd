//! Board outline polygon with containment queries
//!
//! The outline is a snapshot of the routable board area: one outer ring and
//! any number of hole rings (cutouts). Queries carry an explicit tolerance
//! because creepage paths legitimately run exactly on the boundary.

use super::point::Point;
use super::segments::point_segment_distance;

/// Closed polygon with holes. Rings are implicitly closed (last vertex
/// connects back to the first).
#[derive(Debug, Clone, Default)]
pub struct Outline {
    pub outer: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
}

impl Outline {
    pub fn new(outer: Vec<Point>) -> Self {
        Self { outer, holes: Vec::new() }
    }

    /// Axis-aligned rectangle outline
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self::new(vec![
            Point::new(min.x, min.y),
            Point::new(max.x, min.y),
            Point::new(max.x, max.y),
            Point::new(min.x, max.y),
        ])
    }

    pub fn add_hole(&mut self, ring: Vec<Point>) {
        self.holes.push(ring);
    }

    /// True when `p` lies within `tol` of any ring edge
    pub fn point_on_edge(&self, p: Point, tol: f64) -> bool {
        ring_edge_within(&self.outer, p, tol)
            || self.holes.iter().any(|h| ring_edge_within(h, p, tol))
    }

    /// True when `p` is inside the outline (and outside every hole), or
    /// within `tol` of a boundary
    pub fn contains(&self, p: Point, tol: f64) -> bool {
        if self.point_on_edge(p, tol) {
            return true;
        }
        if !ring_contains(&self.outer, p) {
            return false;
        }
        !self.holes.iter().any(|h| ring_contains(h, p))
    }
}

/// Even-odd ray casting against one ring
fn ring_contains(ring: &[Point], p: Point) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_at = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x_at {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn ring_edge_within(ring: &[Point], p: Point, tol: f64) -> bool {
    if ring.len() < 2 {
        return false;
    }

    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        if point_segment_distance(p, ring[j], ring[i]) <= tol {
            return true;
        }
        j = i;
    }
    false
}
