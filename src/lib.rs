//! Creepage distance engine for printed circuit boards
//!
//! Creepage is the shortest distance between two conductors measured along
//! the board surface, around cutouts and across the board edge, rather than
//! through the air. Safety standards set minimum creepage per working
//! voltage, so design-rule checking needs the true surface distance, not the
//! straight-line clearance.
//!
//! The engine models board-edge and copper features as creep shapes,
//! generates tangent and hugging paths between them, rejects paths the real
//! board geometry forbids, and runs a shortest-path solve per net pair.
//!
//! # Module Structure
//! - `geometry` - points, segments, circles, outline polygons
//! - `board` - board snapshot types and the track spatial index
//! - `creepage` - shapes, path generation, graph, solver, runners

pub mod board;
pub mod creepage;
pub mod geometry;

// Re-export the main entry points
pub use creepage::{
    run_creepage_check, CreepageGraph, CreepageRules, CreepageViolation, SolveResult,
};
