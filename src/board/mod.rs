//! Read-only board snapshot consumed by the creepage engine
//!
//! The engine does not own or edit a board; the surrounding DRC framework
//! hands it an immutable snapshot of the items relevant to one analysis:
//! board-edge geometry, copper tracks/arcs/vias/pads with their nets, and
//! the resolved outline polygon.
//!
//! # Submodules
//! - `spatial` - R-tree index over copper track bounding boxes

mod spatial;

pub use spatial::{IndexedTrack, TrackIndex, TrackShape};

use serde::Serialize;

use crate::geometry::{point_on_circle, Outline, Point};

/// Net code; −1 means unassigned
pub type NetCode = i32;

pub const NET_UNASSIGNED: NetCode = -1;

/// Board layer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Layer {
    /// The board-edge layer carrying outline and cutout geometry
    EdgeCuts,
    /// A copper layer, by index (0 = front)
    Copper(u8),
}

impl Layer {
    pub fn is_copper(&self) -> bool {
        matches!(self, Layer::Copper(_))
    }
}

/// Geometric primitive of a board-edge item
#[derive(Debug, Clone)]
pub enum EdgeShape {
    Segment { start: Point, end: Point },
    Arc { center: Point, radius: f64, start_angle: f64, sweep: f64 },
    Circle { center: Point, radius: f64 },
}

/// One item on the board-edge layer (outline or cutout boundary)
#[derive(Debug, Clone)]
pub struct EdgeItem {
    pub id: u64,
    pub shape: EdgeShape,
}

/// Straight copper track segment
#[derive(Debug, Clone)]
pub struct Track {
    pub id: u64,
    pub net: NetCode,
    pub layer: Layer,
    pub start: Point,
    pub end: Point,
    pub width: f64,
}

/// Curved copper track
#[derive(Debug, Clone)]
pub struct ArcTrack {
    pub id: u64,
    pub net: NetCode,
    pub layer: Layer,
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
    pub width: f64,
}

impl ArcTrack {
    pub fn start_point(&self) -> Point {
        point_on_circle(self.center, self.radius, self.start_angle)
    }

    pub fn end_point(&self) -> Point {
        point_on_circle(self.center, self.radius, self.start_angle + self.sweep)
    }
}

/// Plated through-hole via; copper on every copper layer
#[derive(Debug, Clone)]
pub struct Via {
    pub id: u64,
    pub net: NetCode,
    pub pos: Point,
    pub diameter: f64,
}

/// Pad copper shape. Shapes the engine cannot consume directly (rectangles,
/// custom polygons) are decomposed by the caller before snapshotting.
#[derive(Debug, Clone)]
pub enum PadShape {
    Circle { diameter: f64 },
    /// Stadium: the longer axis is the spine, the shorter the width
    Oval { width: f64, height: f64 },
}

/// Layers a pad is present on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadLayers {
    /// Through-hole: every copper layer
    All,
    /// SMD: a single copper layer
    Only(Layer),
}

#[derive(Debug, Clone)]
pub struct Pad {
    pub id: u64,
    pub net: NetCode,
    pub pos: Point,
    pub shape: PadShape,
    pub layers: PadLayers,
}

impl Pad {
    pub fn on_layer(&self, layer: Layer) -> bool {
        match self.layers {
            PadLayers::All => layer.is_copper(),
            PadLayers::Only(l) => l == layer,
        }
    }
}

/// Immutable board snapshot for one analysis run
#[derive(Debug, Clone, Default)]
pub struct Board {
    pub edge_items: Vec<EdgeItem>,
    pub tracks: Vec<Track>,
    pub track_arcs: Vec<ArcTrack>,
    pub vias: Vec<Via>,
    pub pads: Vec<Pad>,
    pub outline: Option<Outline>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks on one copper layer
    pub fn tracks_on_layer(&self, layer: Layer) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(move |t| t.layer == layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_layer_membership() {
        let pad = Pad {
            id: 1,
            net: 2,
            pos: Point::ZERO,
            shape: PadShape::Circle { diameter: 1.0 },
            layers: PadLayers::All,
        };
        assert!(pad.on_layer(Layer::Copper(0)));
        assert!(pad.on_layer(Layer::Copper(31)));
        assert!(!pad.on_layer(Layer::EdgeCuts));

        let smd = Pad { layers: PadLayers::Only(Layer::Copper(0)), ..pad };
        assert!(smd.on_layer(Layer::Copper(0)));
        assert!(!smd.on_layer(Layer::Copper(1)));
    }

    #[test]
    fn test_arc_track_endpoints() {
        let arc = ArcTrack {
            id: 1,
            net: 1,
            layer: Layer::Copper(0),
            center: Point::ZERO,
            radius: 2.0,
            start_angle: 0.0,
            sweep: std::f64::consts::FRAC_PI_2,
            width: 0.25,
        };
        assert!(arc.start_point().distance(Point::new(2.0, 0.0)) < 1e-9);
        assert!(arc.end_point().distance(Point::new(0.0, 2.0)) < 1e-9);
    }
}
