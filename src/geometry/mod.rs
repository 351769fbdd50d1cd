//! Geometry primitives for creepage analysis
//!
//! Leaf utilities with no knowledge of boards or graphs.
//!
//! # Submodules
//! - `point` - 2D point/vector type and angle helpers
//! - `segments` - straight-segment distances and intersections
//! - `circles` - tangent constructions, arcs, circle intersections
//! - `outline` - board outline polygon with containment queries

mod circles;
mod outline;
mod point;
mod segments;

pub use point::{ccw_sweep, normalize_angle, quantize_mm, quantize_point, Point};

pub use segments::{
    nearest_point_on_segment, point_segment_distance, segment_intersection,
    segment_segment_closest, segment_segment_distance,
};

pub use circles::{
    arc_contains_angle, circle_circle_tangents, nearest_point_on_arc, point_circle_tangents,
    point_on_circle, segment_arc_distance, segment_arc_intersections,
    segment_circle_intersections, CircleTangent,
};

pub use outline::Outline;
