//! Creepage distance analysis
//!
//! Builds a weighted graph of candidate surface paths between conductive
//! features and solves it for the shortest distance along the board surface,
//! the quantity safety standards bound from below.
//!
//! # Submodules
//! - `shapes` - board-edge and conductive creep shapes
//! - `paths` - candidate path generation between shape pairs
//! - `validity` - physical validity testing against the real board
//! - `graph` - node/connection arenas and the shortest-path solver
//! - `builder` - graph construction from a board snapshot
//! - `runners` - per-net-pair checks and violation reporting
//! - `types` - rules and violation records

mod builder;
mod graph;
mod paths;
mod runners;
mod shapes;
mod types;
mod validity;

pub use graph::{
    ConnectionId, CreepageGraph, GraphConnection, GraphNode, NodeId, NodeKind, ShapeId,
    SolveResult,
};
pub use paths::{paths, reverse_paths, PathConnection};
pub use runners::run_creepage_check;
pub use shapes::{CreepShape, ShapeKind};
pub use types::{violations_to_json, CreepageRules, CreepageViolation};
pub use validity::{segment_crosses_board_edge, ValidityContext, OUTLINE_TOL_MM};
