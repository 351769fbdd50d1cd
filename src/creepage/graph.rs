//! Weighted creepage graph: deduplicated nodes, a tombstoning connection
//! arena, and the bounded shortest-path solver
//!
//! Nodes and connections live in owned vectors and reference each other by
//! index only, so a graph tears down in one drop with no back-pointer
//! bookkeeping. Trimming tombstones connection slots in place, which keeps
//! every stored id valid for the graph's lifetime.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use indexmap::IndexMap;

use crate::board::{EdgeItem, Layer, NetCode};
use crate::geometry::{ccw_sweep, quantize_point, Outline, Point};

use super::paths::PathConnection;
use super::shapes::{CreepShape, ShapeKind};

/// Index into the graph's shape arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub u32);

/// Index into the graph's node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Index into the graph's connection arena; stays valid across trims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Point,
    Circle,
    Arc,
    Segment,
    Virtual,
}

impl From<ShapeKind> for NodeKind {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Point => NodeKind::Point,
            ShapeKind::Circle => NodeKind::Circle,
            ShapeKind::Arc => NodeKind::Arc,
            ShapeKind::Segment => NodeKind::Segment,
        }
    }
}

/// A deduplicated graph vertex. Two nodes are the same vertex iff kind,
/// parent shape and quantized position all match.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub kind: NodeKind,
    pub parent: Option<ShapeId>,
    pub pos: Point,
    pub net: NetCode,
    pub connections: Vec<ConnectionId>,
}

impl GraphNode {
    /// Virtual nodes have no geometry; they only join electrically
    /// equivalent features and must never anchor a validity test
    pub fn is_virtual(&self) -> bool {
        matches!(self.kind, NodeKind::Virtual)
    }
}

/// An edge joining two nodes with the path that produced it
#[derive(Debug, Clone)]
pub struct GraphConnection {
    pub n1: NodeId,
    pub n2: NodeId,
    pub path: PathConnection,
    /// Render as a straight segment even between anchors on a curved
    /// shape; display-only, never consulted for weights
    pub force_straight_line: bool,
}

impl GraphConnection {
    pub fn other(&self, n: NodeId) -> NodeId {
        if n == self.n1 {
            self.n2
        } else {
            self.n1
        }
    }
}

type NodeKey = (NodeKind, Option<ShapeId>, (i64, i64));

/// Outcome of a shortest-path query
#[derive(Debug, Clone, PartialEq)]
pub enum SolveResult {
    /// No surface path connects the endpoints; creepage is unbounded
    NoPath,
    /// Every remaining route provably exceeds the configured target;
    /// `lower_bound` is the cheapest weight still reachable anywhere
    ExceedsTarget { lower_bound: f64 },
    /// Minimum-weight path, as an ordered connection sequence
    Path { distance: f64, connections: Vec<ConnectionId> },
}

/// One creepage analysis run: owns the shapes, nodes and connections it
/// builds plus the board snapshots validity testing consults. Never shared
/// across runs.
pub struct CreepageGraph {
    pub shapes: Vec<CreepShape>,
    pub nodes: Vec<GraphNode>,
    connections: Vec<Option<GraphConnection>>,
    node_index: IndexMap<NodeKey, NodeId>,
    /// Board-edge items consulted by validity testing
    pub edges: Vec<EdgeItem>,
    pub outline: Option<Outline>,
    pub layer: Layer,
    pub min_groove_width: f64,
    target: Option<f64>,
}

impl CreepageGraph {
    pub fn new(layer: Layer, min_groove_width: f64) -> Self {
        Self {
            shapes: Vec::new(),
            nodes: Vec::new(),
            connections: Vec::new(),
            node_index: IndexMap::new(),
            edges: Vec::new(),
            outline: None,
            layer,
            min_groove_width,
            target: None,
        }
    }

    pub fn set_outline(&mut self, outline: Outline) {
        self.outline = Some(outline);
    }

    /// Early-exit threshold for `solve`
    pub fn set_target(&mut self, target: f64) {
        self.target = Some(target);
    }

    pub fn target(&self) -> Option<f64> {
        self.target
    }

    pub fn add_shape(&mut self, shape: CreepShape) -> ShapeId {
        let id = ShapeId(self.shapes.len() as u32);
        self.shapes.push(shape);
        id
    }

    pub fn shape(&self, id: ShapeId) -> Option<&CreepShape> {
        self.shapes.get(id.0 as usize)
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&GraphConnection> {
        self.connections.get(id.0 as usize).and_then(|c| c.as_ref())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn live_connection_count(&self) -> usize {
        self.connections.iter().flatten().count()
    }

    /// Surviving connections with their ids
    pub fn live_connections(&self) -> impl Iterator<Item = (ConnectionId, &GraphConnection)> {
        self.connections
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (ConnectionId(i as u32), c)))
    }

    /// Deduplicating node creation: an identical `(kind, parent, pos)`
    /// lookup returns the existing node, leaving the arena untouched
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        parent: Option<ShapeId>,
        pos: Point,
        net: NetCode,
    ) -> NodeId {
        let key = (kind, parent, quantize_point(pos));
        if let Some(&id) = self.node_index.get(&key) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(GraphNode { kind, parent, pos, net, connections: Vec::new() });
        self.node_index.insert(key, id);
        id
    }

    /// Virtual terminal node; bypasses dedup and carries no geometry
    pub fn add_virtual_node(&mut self, net: NetCode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(GraphNode {
            kind: NodeKind::Virtual,
            parent: None,
            pos: Point::ZERO,
            net,
            connections: Vec::new(),
        });
        id
    }

    pub fn add_connection(
        &mut self,
        n1: NodeId,
        n2: NodeId,
        path: PathConnection,
        force_straight_line: bool,
    ) -> ConnectionId {
        let id = ConnectionId(self.connections.len() as u32);
        self.connections.push(Some(GraphConnection { n1, n2, path, force_straight_line }));
        self.nodes[n1.0 as usize].connections.push(id);
        self.nodes[n2.0 as usize].connections.push(id);
        id
    }

    /// Tombstone connections heavier than the limit. Node ids and surviving
    /// connection ids are untouched; orphaned nodes simply become
    /// unreachable.
    pub fn trim(&mut self, weight_limit: f64) {
        for slot in &mut self.connections {
            if let Some(conn) = slot {
                if conn.path.weight > weight_limit {
                    *slot = None;
                }
            }
        }
    }

    /// Dijkstra over live connections; edges are traversable in either
    /// direction. With a target set, returns `ExceedsTarget` as soon as the
    /// cheapest remaining route is already past it.
    pub fn solve(&self, from: NodeId, to: NodeId) -> SolveResult {
        if self.node(from).is_none() || self.node(to).is_none() {
            return SolveResult::NoPath;
        }
        if from == to {
            return SolveResult::Path { distance: 0.0, connections: Vec::new() };
        }

        let n = self.nodes.len();
        let mut best = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<(NodeId, ConnectionId)>> = vec![None; n];
        let mut heap = BinaryHeap::new();
        best[from.0 as usize] = 0.0;
        heap.push(QueueEntry { cost: 0.0, node: from });

        while let Some(QueueEntry { cost, node }) = heap.pop() {
            if cost > best[node.0 as usize] {
                continue; // stale entry
            }
            if let Some(target) = self.target {
                if cost > target {
                    return SolveResult::ExceedsTarget { lower_bound: cost };
                }
            }
            if node == to {
                return SolveResult::Path {
                    distance: cost,
                    connections: self.rebuild_path(from, to, &prev),
                };
            }
            for &cid in &self.nodes[node.0 as usize].connections {
                let Some(conn) = self.connection(cid) else {
                    continue; // trimmed
                };
                if conn.path.weight < 0.0 {
                    continue; // never validated
                }
                let next = conn.other(node);
                let next_cost = cost + conn.path.weight;
                if next_cost < best[next.0 as usize] {
                    best[next.0 as usize] = next_cost;
                    prev[next.0 as usize] = Some((node, cid));
                    heap.push(QueueEntry { cost: next_cost, node: next });
                }
            }
        }

        SolveResult::NoPath
    }

    fn rebuild_path(
        &self,
        from: NodeId,
        to: NodeId,
        prev: &[Option<(NodeId, ConnectionId)>],
    ) -> Vec<ConnectionId> {
        let mut out = Vec::new();
        let mut cur = to;
        while cur != from {
            match prev[cur.0 as usize] {
                Some((p, cid)) => {
                    out.push(cid);
                    cur = p;
                }
                None => break,
            }
        }
        out.reverse();
        out
    }

    /// Renderable polyline for one connection: anchors joined straight, or
    /// the hug sampled along its curve when both ends are anchors on the
    /// same curved shape
    pub fn connection_polyline(&self, id: ConnectionId) -> Vec<Point> {
        let Some(conn) = self.connection(id) else {
            return Vec::new();
        };
        let p1 = conn.path.a1;
        let p2 = conn.path.a2;
        if conn.force_straight_line {
            return vec![p1, p2];
        }
        let (Some(na), Some(nb)) = (self.node(conn.n1), self.node(conn.n2)) else {
            return vec![p1, p2];
        };
        let same_curve = na.parent.is_some()
            && na.parent == nb.parent
            && na.kind == NodeKind::Point
            && nb.kind == NodeKind::Point;
        if !same_curve {
            return vec![p1, p2];
        }
        let Some((center, radius)) = na.parent.and_then(|pid| self.shape(pid)).and_then(circle_geometry)
        else {
            return vec![p1, p2];
        };

        // Hug connections are stored counterclockwise n1 -> n2
        let ang1 = (p1 - center).angle();
        let sweep = ccw_sweep(ang1, (p2 - center).angle());
        let steps = ((sweep / 0.15).ceil() as usize).max(1);
        (0..=steps)
            .map(|i| {
                let a = ang1 + sweep * (i as f64) / (steps as f64);
                center + Point::from_angle(a) * radius
            })
            .collect()
    }

    /// Stitch an ordered connection sequence into one polyline for overlay
    /// rendering
    pub fn path_polyline(&self, connections: &[ConnectionId]) -> Vec<Point> {
        let mut out: Vec<Point> = Vec::new();
        for (i, &cid) in connections.iter().enumerate() {
            let mut piece = self.connection_polyline(cid);
            if piece.is_empty() {
                continue;
            }
            if let Some(&tail) = out.last() {
                let d_first = tail.distance(piece[0]);
                let d_last = tail.distance(piece[piece.len() - 1]);
                if d_last < d_first {
                    piece.reverse();
                }
                if tail.distance(piece[0]) < 1e-9 {
                    piece.remove(0);
                }
            } else if let Some(next) = connections.get(i + 1).and_then(|&c| self.connection(c)) {
                // Orient the first piece so its far end meets the second
                let head = piece[0];
                let tail_pt = piece[piece.len() - 1];
                let head_joint = head.distance(next.path.a1).min(head.distance(next.path.a2));
                let tail_joint = tail_pt.distance(next.path.a1).min(tail_pt.distance(next.path.a2));
                if head_joint < tail_joint {
                    piece.reverse();
                }
            }
            out.extend(piece);
        }
        out
    }
}

fn circle_geometry(shape: &CreepShape) -> Option<(Point, f64)> {
    match shape {
        CreepShape::BeCircle { center, radius, .. }
        | CreepShape::BeArc { center, radius, .. }
        | CreepShape::CuCircle { center, radius, .. }
        | CreepShape::CuArc { center, radius, .. } => Some((*center, *radius)),
        _ => None,
    }
}

/// Min-heap entry; `BinaryHeap` is a max-heap so the ordering is reversed
struct QueueEntry {
    cost: f64,
    node: NodeId,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.0.cmp(&self.node.0))
    }
}
