//! Spatial index over copper tracks
//!
//! Path validity testing probes every candidate connection against the
//! copper on its layer; an R-tree over track bounding boxes keeps that from
//! being quadratic on dense boards. Straight and curved tracks share one
//! tree covering all copper layers; queries filter by layer afterwards.

use std::f64::consts::FRAC_PI_2;

use rstar::{RTree, RTreeObject, AABB};

use super::{ArcTrack, Board, Track};
use crate::geometry::{arc_contains_angle, point_on_circle};

/// Straight or curved copper behind one index entry
#[derive(Debug, Clone)]
pub enum TrackShape {
    Straight(Track),
    Curved(ArcTrack),
}

/// A track widened to its bounding box for R-tree storage
#[derive(Debug, Clone)]
pub struct IndexedTrack {
    pub shape: TrackShape,
    bounds: AABB<[f64; 2]>,
}

impl IndexedTrack {
    pub fn straight(track: Track) -> Self {
        let half = track.width / 2.0;
        let min = [
            track.start.x.min(track.end.x) - half,
            track.start.y.min(track.end.y) - half,
        ];
        let max = [
            track.start.x.max(track.end.x) + half,
            track.start.y.max(track.end.y) + half,
        ];
        Self { shape: TrackShape::Straight(track), bounds: AABB::from_corners(min, max) }
    }

    /// The arc's box covers both endpoints plus every axis extreme its
    /// sweep passes through
    pub fn curved(arc: ArcTrack) -> Self {
        let mut pts = vec![arc.start_point(), arc.end_point()];
        for quarter in 0..4 {
            let angle = quarter as f64 * FRAC_PI_2;
            if arc_contains_angle(arc.start_angle, arc.sweep, angle) {
                pts.push(point_on_circle(arc.center, arc.radius, angle));
            }
        }
        let half = arc.width / 2.0;
        let min = [
            pts.iter().map(|p| p.x).fold(f64::MAX, f64::min) - half,
            pts.iter().map(|p| p.y).fold(f64::MAX, f64::min) - half,
        ];
        let max = [
            pts.iter().map(|p| p.x).fold(f64::MIN, f64::max) + half,
            pts.iter().map(|p| p.y).fold(f64::MIN, f64::max) + half,
        ];
        Self { shape: TrackShape::Curved(arc), bounds: AABB::from_corners(min, max) }
    }
}

impl RTreeObject for IndexedTrack {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

/// R-tree over every copper track on the board, straight and curved
#[derive(Debug)]
pub struct TrackIndex {
    tree: RTree<IndexedTrack>,
}

impl TrackIndex {
    pub fn build(board: &Board) -> Self {
        let mut items: Vec<IndexedTrack> = board
            .tracks
            .iter()
            .filter(|t| t.layer.is_copper())
            .cloned()
            .map(IndexedTrack::straight)
            .collect();
        items.extend(
            board
                .track_arcs
                .iter()
                .filter(|a| a.layer.is_copper())
                .cloned()
                .map(IndexedTrack::curved),
        );
        Self { tree: RTree::bulk_load(items) }
    }

    /// Tracks whose bounding box intersects the query envelope
    pub fn tracks_near(
        &self,
        min: [f64; 2],
        max: [f64; 2],
    ) -> impl Iterator<Item = &IndexedTrack> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_corners(min, max))
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
