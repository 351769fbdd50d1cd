//! Graph construction from a board snapshot
//!
//! The build sequence for one analysis run:
//! - board-edge items become creep shapes (`transform_edge_to_creep_shapes`)
//! - coincident duplicates collapse (`remove_duplicated_shapes`)
//! - every shape gets its main node (`transform_creep_shapes_to_nodes`)
//! - each checked net's copper features join the graph behind a virtual
//!   terminal (`add_net_elements`)
//! - candidate paths between shape pairs are generated, validity-tested and
//!   turned into anchored connections (`generate_paths`), which finishes by
//!   wiring each shape's own anchors together

use indexmap::{IndexMap, IndexSet};

use crate::board::{Board, EdgeItem, EdgeShape, NetCode, Pad, PadShape, TrackIndex};
use crate::geometry::{ccw_sweep, Point};

use super::graph::{CreepageGraph, NodeId, NodeKind, ShapeId};
use super::paths::{paths, PathConnection};
use super::shapes::CreepShape;
use super::validity::ValidityContext;

/// Chain offsets this far past an arc's sweep are wrapped start anchors,
/// not far-end anchors. Wider than the angular slack tangent anchors get
/// when they are accepted onto a sweep.
const CHAIN_HEAD_SNAP: f64 = 1e-6;

impl CreepageGraph {
    /// Convert board-edge geometry into creep shapes and remember the edge
    /// items for later validity testing. Segments contribute their two
    /// endpoints; arcs and circles contribute themselves. Degenerate items
    /// (zero radius, zero sweep) are dropped.
    pub fn transform_edge_to_creep_shapes(&mut self, items: &[EdgeItem]) {
        for item in items {
            self.edges.push(item.clone());
            match item.shape {
                EdgeShape::Segment { start, end } => {
                    self.add_shape(CreepShape::BePoint { pos: start, parent: Some(item.id) });
                    self.add_shape(CreepShape::BePoint { pos: end, parent: Some(item.id) });
                }
                EdgeShape::Arc { center, radius, start_angle, sweep } => {
                    if radius <= 0.0 || sweep.abs() < 1e-9 {
                        continue;
                    }
                    self.add_shape(CreepShape::be_arc(
                        center,
                        radius,
                        start_angle,
                        sweep,
                        Some(item.id),
                    ));
                }
                EdgeShape::Circle { center, radius } => {
                    if radius <= 0.0 {
                        continue;
                    }
                    self.add_shape(CreepShape::BeCircle { center, radius, parent: Some(item.id) });
                }
            }
        }
    }

    /// Collapse shapes that quantize identically. Imported outlines often
    /// repeat primitives exactly; keeping them would multiply anchors and
    /// create zero-weight spurious routes. Must run before any node refers
    /// to a shape index.
    pub fn remove_duplicated_shapes(&mut self) {
        let mut seen = IndexSet::new();
        self.shapes.retain(|s| seen.insert(s.dedup_key()));
    }

    /// Materialize the main node of every shape
    pub fn transform_creep_shapes_to_nodes(&mut self) {
        for i in 0..self.shapes.len() {
            let shape = self.shapes[i].clone();
            self.add_node(
                NodeKind::from(shape.kind()),
                Some(ShapeId(i as u32)),
                shape.pos(),
                shape.net(),
            );
        }
    }

    /// Main node of an existing shape; node dedup makes this idempotent
    fn main_node_of(&mut self, sid: ShapeId) -> Option<NodeId> {
        let shape = self.shape(sid)?.clone();
        Some(self.add_node(NodeKind::from(shape.kind()), Some(sid), shape.pos(), shape.net()))
    }

    /// Inject one net's copper features on this graph's layer and return the
    /// virtual terminal that ties them together at zero weight. Features
    /// provably farther than `max_creepage` from every other-net conductor
    /// already present are skipped; the bound compares center distance minus
    /// both extents, so it never drops a feature that could still matter.
    pub fn add_net_elements(&mut self, board: &Board, net: NetCode, max_creepage: f64) -> NodeId {
        let terminal = self.add_virtual_node(net);

        let rivals: Vec<(Point, f64)> = self
            .shapes
            .iter()
            .filter(|s| s.conductive() && s.net() != net)
            .map(|s| (s.pos(), s.extent()))
            .collect();

        let mut features: Vec<CreepShape> = Vec::new();
        for track in board.tracks_on_layer(self.layer).filter(|t| t.net == net) {
            features.push(CreepShape::CuSegment {
                start: track.start,
                end: track.end,
                width: track.width,
                parent: Some(track.id),
                net,
            });
        }
        for arc in board.track_arcs.iter().filter(|a| a.net == net && a.layer == self.layer) {
            features.push(CreepShape::cu_arc(
                arc.center,
                arc.radius,
                arc.start_angle,
                arc.sweep,
                arc.width,
                Some(arc.id),
                net,
            ));
        }
        if self.layer.is_copper() {
            for via in board.vias.iter().filter(|v| v.net == net) {
                features.push(CreepShape::CuCircle {
                    center: via.pos,
                    radius: via.diameter / 2.0,
                    parent: Some(via.id),
                    net,
                });
            }
        }
        for pad in board.pads.iter().filter(|p| p.net == net && p.on_layer(self.layer)) {
            features.push(pad_shape(pad, net));
        }

        for shape in features {
            if out_of_reach(&shape, &rivals, max_creepage) {
                continue;
            }
            let pos = shape.pos();
            let kind = NodeKind::from(shape.kind());
            let sid = self.add_shape(shape);
            let main = self.add_node(kind, Some(sid), pos, net);
            self.add_connection(terminal, main, PathConnection::with_weight(pos, pos, 0.0), true);
        }

        terminal
    }

    /// Generate candidate paths between every plausible shape pair, keep the
    /// physically valid ones as connections, then wire each shape's anchors
    /// into its own structure
    pub fn generate_paths(
        &mut self,
        board: &Board,
        track_index: Option<&TrackIndex>,
        max_weight: f64,
    ) {
        let max_sq = max_weight * max_weight;
        let mut accepted: Vec<(ShapeId, ShapeId, PathConnection)> = Vec::new();

        for i in 0..self.shapes.len() {
            for j in (i + 1)..self.shapes.len() {
                let a = &self.shapes[i];
                let b = &self.shapes[j];
                // Same-net copper is already joined through its terminal
                if a.conductive() && b.conductive() && a.net() == b.net() {
                    continue;
                }
                let mut ignore: Vec<u64> = Vec::new();
                ignore.extend(a.parent_item());
                ignore.extend(b.parent_item());
                let ctx = ValidityContext {
                    board,
                    layer: self.layer,
                    edges: &self.edges,
                    ignore: &ignore,
                    outline: self.outline.as_ref(),
                    min_groove_width: self.min_groove_width,
                    track_index,
                };
                for path in paths(a, b, max_weight, max_sq) {
                    if path.is_valid(&ctx) {
                        accepted.push((ShapeId(i as u32), ShapeId(j as u32), path));
                    }
                }
            }
        }

        for (sa, sb, path) in accepted {
            let net_a = self.shapes[sa.0 as usize].net();
            let net_b = self.shapes[sb.0 as usize].net();
            let n1 = self.add_node(NodeKind::Point, Some(sa), path.a1, net_a);
            let n2 = self.add_node(NodeKind::Point, Some(sb), path.a2, net_b);
            if n1 == n2 {
                continue;
            }
            self.add_connection(n1, n2, path, false);
        }

        self.connect_shape_children();
    }

    /// Join each shape's anchor nodes to its own structure: hug rings on
    /// board-edge circles, hug chains on board-edge arcs, zero-weight stars
    /// from conductor anchors to their main node
    fn connect_shape_children(&mut self) {
        let mut main_ids: IndexMap<ShapeId, NodeId> = IndexMap::new();
        for i in 0..self.shapes.len() {
            if self.shapes[i].conductive() {
                let sid = ShapeId(i as u32);
                if let Some(nid) = self.main_node_of(sid) {
                    main_ids.insert(sid, nid);
                }
            }
        }

        let mut by_parent: IndexMap<ShapeId, Vec<NodeId>> = IndexMap::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if node.kind != NodeKind::Point {
                continue;
            }
            if let Some(pid) = node.parent {
                by_parent.entry(pid).or_default().push(NodeId(i as u32));
            }
        }

        let mut planned: Vec<(NodeId, NodeId, PathConnection, bool)> = Vec::new();
        for (pid, anchors) in &by_parent {
            let Some(shape) = self.shape(*pid) else {
                continue;
            };
            match *shape {
                CreepShape::BeCircle { center, radius, .. } => {
                    self.plan_hug_ring(center, radius, anchors, &mut planned);
                }
                CreepShape::BeArc { center, radius, start_angle, sweep, .. } => {
                    self.plan_hug_chain(center, radius, start_angle, sweep, anchors, &mut planned);
                }
                CreepShape::BePoint { .. } => {}
                _ => {
                    // Copper is equipotential: anchors reach the main node
                    // for free
                    let Some(&main) = main_ids.get(pid) else {
                        continue;
                    };
                    let main_pos = self.nodes[main.0 as usize].pos;
                    for &a in anchors {
                        if a == main {
                            continue;
                        }
                        let apos = self.nodes[a.0 as usize].pos;
                        planned.push((
                            a,
                            main,
                            PathConnection::with_weight(apos, main_pos, 0.0),
                            true,
                        ));
                    }
                }
            }
        }

        for (a, b, path, straight) in planned {
            self.add_connection(a, b, path, straight);
        }
    }

    /// Consecutive-anchor ring around a full circle, counterclockwise with
    /// wraparound; two anchors yield both arcs between them. Hug weights are
    /// radius times swept angle. On-surface by construction, so these skip
    /// validity testing.
    fn plan_hug_ring(
        &self,
        center: Point,
        radius: f64,
        anchors: &[NodeId],
        planned: &mut Vec<(NodeId, NodeId, PathConnection, bool)>,
    ) {
        if anchors.len() < 2 {
            return;
        }
        let mut ring: Vec<(f64, NodeId)> = anchors
            .iter()
            .map(|&n| ((self.nodes[n.0 as usize].pos - center).angle(), n))
            .collect();
        ring.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        for i in 0..ring.len() {
            let (aa, na) = ring[i];
            let (ab, nb) = ring[(i + 1) % ring.len()];
            if na == nb {
                continue;
            }
            let pa = self.nodes[na.0 as usize].pos;
            let pb = self.nodes[nb.0 as usize].pos;
            let sweep = ccw_sweep(aa, ab);
            planned.push((na, nb, PathConnection::with_weight(pa, pb, radius * sweep), false));
        }
    }

    /// Consecutive-anchor chain along an arc, ordered by counterclockwise
    /// travel from the arc start; never wraps across the arc's gap
    fn plan_hug_chain(
        &self,
        center: Point,
        radius: f64,
        start_angle: f64,
        sweep: f64,
        anchors: &[NodeId],
        planned: &mut Vec<(NodeId, NodeId, PathConnection, bool)>,
    ) {
        if anchors.len() < 2 {
            return;
        }
        let mut chain: Vec<(f64, NodeId)> = anchors
            .iter()
            .map(|&n| {
                let a = (self.nodes[n.0 as usize].pos - center).angle();
                let mut off = ccw_sweep(start_angle, a);
                // The atan2 round trip can land a start anchor a hair below
                // `start_angle`, wrapping its offset to almost a full turn.
                // Anything past the swept span belongs at the chain head.
                if off > sweep + CHAIN_HEAD_SNAP {
                    off = 0.0;
                }
                (off, n)
            })
            .collect();
        chain.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        for w in chain.windows(2) {
            let (sa, na) = w[0];
            let (sb, nb) = w[1];
            if na == nb {
                continue;
            }
            let pa = self.nodes[na.0 as usize].pos;
            let pb = self.nodes[nb.0 as usize].pos;
            planned.push((na, nb, PathConnection::with_weight(pa, pb, radius * (sb - sa)), false));
        }
    }
}

/// Copper shape of a pad. Ovals become a stadium whose spine runs along the
/// long axis; a square oval degenerates to a circle.
fn pad_shape(pad: &Pad, net: NetCode) -> CreepShape {
    match pad.shape {
        PadShape::Circle { diameter } => CreepShape::CuCircle {
            center: pad.pos,
            radius: diameter / 2.0,
            parent: Some(pad.id),
            net,
        },
        PadShape::Oval { width, height } => {
            if (width - height).abs() < 1e-9 {
                return CreepShape::CuCircle {
                    center: pad.pos,
                    radius: width / 2.0,
                    parent: Some(pad.id),
                    net,
                };
            }
            let (span, girth, axis) = if width > height {
                (width, height, Point::new(1.0, 0.0))
            } else {
                (height, width, Point::new(0.0, 1.0))
            };
            let half = (span - girth) / 2.0;
            CreepShape::CuSegment {
                start: pad.pos - axis * half,
                end: pad.pos + axis * half,
                width: girth,
                parent: Some(pad.id),
                net,
            }
        }
    }
}

/// True when the feature cannot possibly sit within `max_creepage` of any
/// rival conductor, so adding it would only bloat the graph
fn out_of_reach(shape: &CreepShape, rivals: &[(Point, f64)], max_creepage: f64) -> bool {
    if max_creepage <= 0.0 || rivals.is_empty() {
        return false;
    }
    let pos = shape.pos();
    let extent = shape.extent();
    rivals.iter().all(|&(rpos, rextent)| pos.distance(rpos) - extent - rextent > max_creepage)
}

#[cfg(test)]
mod tests {
    use super::super::graph::SolveResult;
    use super::*;
    use crate::board::{Layer, PadLayers, Track, Via};
    use crate::geometry::Outline;

    fn segment_item(id: u64, x1: f64, y1: f64, x2: f64, y2: f64) -> EdgeItem {
        EdgeItem {
            id,
            shape: EdgeShape::Segment { start: Point::new(x1, y1), end: Point::new(x2, y2) },
        }
    }

    #[test]
    fn test_transform_edge_items_to_shapes() {
        let mut g = CreepageGraph::new(Layer::Copper(0), 0.2);
        let items = vec![
            segment_item(1, 0.0, 0.0, 10.0, 0.0),
            EdgeItem {
                id: 2,
                shape: EdgeShape::Circle { center: Point::new(5.0, 5.0), radius: 2.0 },
            },
            EdgeItem {
                id: 3,
                shape: EdgeShape::Arc {
                    center: Point::ZERO,
                    radius: 4.0,
                    start_angle: 0.0,
                    sweep: 1.0,
                },
            },
            // Degenerate items contribute nothing
            EdgeItem { id: 4, shape: EdgeShape::Circle { center: Point::ZERO, radius: 0.0 } },
        ];
        g.transform_edge_to_creep_shapes(&items);
        assert_eq!(g.shapes.len(), 4); // 2 endpoints + circle + arc
        assert_eq!(g.edges.len(), 4);
        assert!(g.shapes.iter().all(|s| !s.conductive()));
    }

    #[test]
    fn test_remove_duplicated_shapes_collapses_repeats() {
        let mut g = CreepageGraph::new(Layer::Copper(0), 0.2);
        // The same outline segment imported twice
        g.transform_edge_to_creep_shapes(&[
            segment_item(1, 0.0, 0.0, 10.0, 0.0),
            segment_item(2, 0.0, 0.0, 10.0, 0.0),
            segment_item(3, 10.0, 0.0, 10.0, 5.0),
        ]);
        assert_eq!(g.shapes.len(), 6);
        g.remove_duplicated_shapes();
        // (0,0), (10,0), (10,5): the shared corner collapses too
        assert_eq!(g.shapes.len(), 3);
    }

    #[test]
    fn test_transform_shapes_to_nodes_is_idempotent() {
        let mut g = CreepageGraph::new(Layer::Copper(0), 0.2);
        g.transform_edge_to_creep_shapes(&[segment_item(1, 0.0, 0.0, 10.0, 0.0)]);
        g.transform_creep_shapes_to_nodes();
        assert_eq!(g.node_count(), 2);
        g.transform_creep_shapes_to_nodes();
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn test_add_net_elements_wires_features_to_terminal() {
        let mut board = Board::new();
        board.tracks.push(Track {
            id: 10,
            net: 1,
            layer: Layer::Copper(0),
            start: Point::new(0.0, 0.0),
            end: Point::new(5.0, 0.0),
            width: 0.3,
        });
        board.vias.push(Via { id: 11, net: 1, pos: Point::new(5.0, 0.0), diameter: 0.6 });
        board.pads.push(Pad {
            id: 12,
            net: 1,
            pos: Point::new(0.0, 0.0),
            shape: PadShape::Circle { diameter: 1.0 },
            layers: PadLayers::All,
        });
        // Wrong net and wrong layer stay out
        board.tracks.push(Track {
            id: 13,
            net: 2,
            layer: Layer::Copper(0),
            start: Point::new(20.0, 0.0),
            end: Point::new(25.0, 0.0),
            width: 0.3,
        });
        board.tracks.push(Track {
            id: 14,
            net: 1,
            layer: Layer::Copper(1),
            start: Point::new(0.0, 5.0),
            end: Point::new(5.0, 5.0),
            width: 0.3,
        });

        let mut g = CreepageGraph::new(Layer::Copper(0), 0.2);
        let terminal = g.add_net_elements(&board, 1, 0.0);
        assert_eq!(g.shapes.len(), 3);
        assert!(g.shapes.iter().all(|s| s.conductive() && s.net() == 1));
        assert_eq!(g.node(terminal).unwrap().connections.len(), 3);
        // Terminal reaches every feature at zero cost
        for &cid in &g.node(terminal).unwrap().connections {
            assert_eq!(g.connection(cid).unwrap().path.weight, 0.0);
        }
    }

    #[test]
    fn test_add_net_elements_prunes_unreachable_features() {
        let mut board = Board::new();
        board.vias.push(Via { id: 1, net: 1, pos: Point::new(0.0, 0.0), diameter: 0.6 });
        board.vias.push(Via { id: 2, net: 2, pos: Point::new(3.0, 0.0), diameter: 0.6 });
        board.vias.push(Via { id: 3, net: 2, pos: Point::new(500.0, 0.0), diameter: 0.6 });

        let mut g = CreepageGraph::new(Layer::Copper(0), 0.2);
        // First net sees no rivals, so nothing is pruned
        g.add_net_elements(&board, 1, 10.0);
        assert_eq!(g.shapes.len(), 1);
        // Second net keeps the nearby via, drops the distant one
        g.add_net_elements(&board, 2, 10.0);
        assert_eq!(g.shapes.len(), 2);
        assert!(g.shapes.iter().all(|s| s.pos().x < 100.0));

        // A zero cap disables pruning entirely
        let mut g2 = CreepageGraph::new(Layer::Copper(0), 0.2);
        g2.add_net_elements(&board, 1, 0.0);
        g2.add_net_elements(&board, 2, 0.0);
        assert_eq!(g2.shapes.len(), 3);
    }

    #[test]
    fn test_oval_pad_becomes_stadium_segment() {
        let pad = Pad {
            id: 7,
            net: 3,
            pos: Point::new(10.0, 10.0),
            shape: PadShape::Oval { width: 3.0, height: 1.0 },
            layers: PadLayers::All,
        };
        match pad_shape(&pad, 3) {
            CreepShape::CuSegment { start, end, width, .. } => {
                assert!((start.x - 9.0).abs() < 1e-12 && (end.x - 11.0).abs() < 1e-12);
                assert!((start.y - 10.0).abs() < 1e-12 && (end.y - 10.0).abs() < 1e-12);
                assert!((width - 1.0).abs() < 1e-12);
            }
            other => panic!("expected stadium segment, got {other:?}"),
        }

        let square = Pad { shape: PadShape::Oval { width: 2.0, height: 2.0 }, ..pad };
        assert!(matches!(pad_shape(&square, 3), CreepShape::CuCircle { radius, .. } if (radius - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_generate_paths_builds_a_solvable_graph() {
        // Two vias on opposite sides of a wide slot-free board
        let mut board = Board::new();
        board.outline = Some(Outline::rectangle(Point::new(-20.0, -20.0), Point::new(20.0, 20.0)));
        board.vias.push(Via { id: 1, net: 1, pos: Point::new(-5.0, 0.0), diameter: 1.0 });
        board.vias.push(Via { id: 2, net: 2, pos: Point::new(5.0, 0.0), diameter: 1.0 });

        let mut g = CreepageGraph::new(Layer::Copper(0), 0.2);
        g.set_outline(board.outline.clone().unwrap());
        let from = g.add_net_elements(&board, 1, 0.0);
        let to = g.add_net_elements(&board, 2, 0.0);
        g.generate_paths(&board, None, 100.0);

        match g.solve(from, to) {
            SolveResult::Path { distance, .. } => {
                // Boundary to boundary: 10 minus both radii
                assert!((distance - 9.0).abs() < 1e-9);
            }
            other => panic!("expected path, got {other:?}"),
        }
    }

    #[test]
    fn test_hug_chain_keeps_the_start_anchor_at_the_head() {
        let mut g = CreepageGraph::new(Layer::Copper(0), 0.0);
        let center = Point::new(-50.0, -80.0);
        let radius = 0.7;
        let start = 0.0006282;
        let sweep = std::f64::consts::FRAC_PI_2;
        let sid = g.add_shape(CreepShape::be_arc(center, radius, start, sweep, None));

        // The start-side anchor sits a hair below the start angle, within
        // the slack accepted anchors get; its offset must not wrap to a
        // full turn and push it to the chain tail
        let at = |angle: f64| center + Point::new(angle.cos(), angle.sin()) * radius;
        let head = g.add_node(NodeKind::Point, Some(sid), at(start - 5e-10), -1);
        let tail = g.add_node(NodeKind::Point, Some(sid), at(start + sweep), -1);
        g.connect_shape_children();

        let conns: Vec<_> = g.live_connections().collect();
        assert_eq!(conns.len(), 1);
        let hug = conns[0].1;
        assert_eq!((hug.n1, hug.n2), (head, tail));
        assert!((hug.path.weight - radius * sweep).abs() < 1e-6);
    }
}
