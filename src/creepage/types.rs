//! Rule parameters and violation reporting for creepage checks

use serde::Serialize;

use crate::board::{Layer, NetCode};
use crate::geometry::Point;

/// Tunable parameters for a creepage analysis run
#[derive(Debug, Clone, Serialize)]
pub struct CreepageRules {
    /// Minimum required creepage distance between nets, in mm
    pub creepage_target_mm: f64,
    /// Candidate-generation and trim cap, in mm. Paths longer than this are
    /// never materialized; must be at least the target.
    pub max_search_mm: f64,
    /// Slots narrower than this are bridged by a discharge and do not block
    /// a surface path, in mm
    pub min_groove_width_mm: f64,
    /// Build an R-tree over copper tracks for validity testing
    pub use_track_index: bool,
}

impl Default for CreepageRules {
    fn default() -> Self {
        Self {
            creepage_target_mm: 2.5,
            max_search_mm: 10.0,
            min_groove_width_mm: 0.2,
            use_track_index: true,
        }
    }
}

/// One net pair whose creepage distance falls below the required minimum
#[derive(Debug, Clone, Serialize)]
pub struct CreepageViolation {
    pub net_a: NetCode,
    pub net_b: NetCode,
    pub layer: Layer,
    pub required_mm: f64,
    /// Measured creepage distance; `None` when no surface path connects the
    /// nets at all (unbounded creepage)
    pub actual_mm: Option<f64>,
    /// Winning path as a renderable polyline (arc hugs sampled); empty when
    /// no path exists
    pub path: Vec<Point>,
    pub message: String,
}

/// Serialize violations for report output
pub fn violations_to_json(violations: &[CreepageViolation]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(violations)
}
