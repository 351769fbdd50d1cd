//! Top-level creepage check over a board snapshot
//!
//! One graph is built and solved per net pair. Pairs are independent, so
//! they run in parallel; the board snapshot and track index are shared
//! read-only across workers.

use anyhow::{bail, Result};
use rayon::prelude::*;

use crate::board::{Board, Layer, NetCode, TrackIndex};

use super::graph::{CreepageGraph, SolveResult};
use super::types::{CreepageRules, CreepageViolation};

/// Check every net pair on one copper layer and collect the violations.
/// A missing surface path counts as a violation: it means the nets only
/// face each other across free air, which the creepage rule cannot accept.
pub fn run_creepage_check(
    board: &Board,
    layer: Layer,
    net_pairs: &[(NetCode, NetCode)],
    rules: &CreepageRules,
) -> Result<Vec<CreepageViolation>> {
    if !layer.is_copper() {
        bail!("creepage runs on copper layers, got {:?}", layer);
    }
    if rules.creepage_target_mm <= 0.0 {
        bail!("creepage target must be positive, got {}", rules.creepage_target_mm);
    }
    if rules.max_search_mm < rules.creepage_target_mm {
        bail!(
            "search cutoff {}mm is below the creepage target {}mm",
            rules.max_search_mm,
            rules.creepage_target_mm
        );
    }
    if let Some((a, _)) = net_pairs.iter().find(|(a, b)| a == b) {
        bail!("net pair ({}, {}) compares a net against itself", a, a);
    }

    let check_start = std::time::Instant::now();
    eprintln!(
        "[Creepage] Checking {} net pair(s) on {:?} (target {}mm)",
        net_pairs.len(),
        layer,
        rules.creepage_target_mm
    );

    let track_index = if rules.use_track_index { Some(TrackIndex::build(board)) } else { None };

    // Each pair owns its graph; the board and index are shared read-only
    let violations: Vec<CreepageViolation> = net_pairs
        .par_iter()
        .filter_map(|&(net_a, net_b)| {
            check_net_pair(board, layer, net_a, net_b, rules, track_index.as_ref())
        })
        .collect();

    eprintln!(
        "[Creepage] {} violation(s) in {:.2}ms",
        violations.len(),
        check_start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(violations)
}

fn check_net_pair(
    board: &Board,
    layer: Layer,
    net_a: NetCode,
    net_b: NetCode,
    rules: &CreepageRules,
    track_index: Option<&TrackIndex>,
) -> Option<CreepageViolation> {
    let mut graph = CreepageGraph::new(layer, rules.min_groove_width_mm);
    if let Some(outline) = &board.outline {
        graph.set_outline(outline.clone());
    }
    graph.transform_edge_to_creep_shapes(&board.edge_items);
    graph.remove_duplicated_shapes();
    graph.transform_creep_shapes_to_nodes();
    let from = graph.add_net_elements(board, net_a, rules.max_search_mm);
    let to = graph.add_net_elements(board, net_b, rules.max_search_mm);
    graph.generate_paths(board, track_index, rules.max_search_mm);
    graph.trim(rules.max_search_mm);
    graph.set_target(rules.creepage_target_mm);

    match graph.solve(from, to) {
        SolveResult::Path { distance, connections }
            if distance + 1e-9 < rules.creepage_target_mm =>
        {
            Some(CreepageViolation {
                net_a,
                net_b,
                layer,
                required_mm: rules.creepage_target_mm,
                actual_mm: Some(distance),
                path: graph.path_polyline(&connections),
                message: format!(
                    "creepage {:.3}mm < required {:.3}mm between nets {} and {}",
                    distance, rules.creepage_target_mm, net_a, net_b
                ),
            })
        }
        SolveResult::Path { .. } | SolveResult::ExceedsTarget { .. } => None,
        SolveResult::NoPath => Some(CreepageViolation {
            net_a,
            net_b,
            layer,
            required_mm: rules.creepage_target_mm,
            actual_mm: None,
            path: Vec::new(),
            message: format!(
                "no surface path between nets {} and {}; creepage is unbounded",
                net_a, net_b
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Via;
    use crate::geometry::{Outline, Point};

    fn two_via_board(gap: f64) -> Board {
        let mut board = Board::new();
        board.outline = Some(Outline::rectangle(Point::new(-50.0, -50.0), Point::new(50.0, 50.0)));
        board.vias.push(Via { id: 1, net: 1, pos: Point::new(0.0, 0.0), diameter: 1.0 });
        board.vias.push(Via { id: 2, net: 2, pos: Point::new(gap + 1.0, 0.0), diameter: 1.0 });
        board
    }

    #[test]
    fn test_close_vias_violate_far_vias_pass() {
        let rules = CreepageRules {
            creepage_target_mm: 2.5,
            max_search_mm: 10.0,
            min_groove_width_mm: 0.2,
            use_track_index: false,
        };

        // Boundary gap 1mm, well under the 2.5mm target
        let violations =
            run_creepage_check(&two_via_board(1.0), Layer::Copper(0), &[(1, 2)], &rules).unwrap();
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!((v.net_a, v.net_b), (1, 2));
        let actual = v.actual_mm.unwrap();
        assert!((actual - 1.0).abs() < 1e-9);
        assert!(!v.path.is_empty());

        // Boundary gap 5mm passes
        let violations =
            run_creepage_check(&two_via_board(5.0), Layer::Copper(0), &[(1, 2)], &rules).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_rejects_bad_configurations() {
        let board = two_via_board(5.0);
        let rules = CreepageRules::default();

        assert!(run_creepage_check(&board, Layer::EdgeCuts, &[(1, 2)], &rules).is_err());
        assert!(run_creepage_check(&board, Layer::Copper(0), &[(1, 1)], &rules).is_err());

        let bad_target = CreepageRules { creepage_target_mm: 0.0, ..rules.clone() };
        assert!(run_creepage_check(&board, Layer::Copper(0), &[(1, 2)], &bad_target).is_err());

        let short_search = CreepageRules { max_search_mm: 1.0, ..rules };
        assert!(run_creepage_check(&board, Layer::Copper(0), &[(1, 2)], &short_search).is_err());
    }

    #[test]
    fn test_disconnected_nets_report_unbounded_creepage() {
        let rules = CreepageRules {
            creepage_target_mm: 2.5,
            max_search_mm: 4.0,
            min_groove_width_mm: 0.2,
            use_track_index: false,
        };
        // Vias 20mm apart with a 4mm search cutoff: every candidate path is
        // trimmed, leaving the nets disconnected
        let violations =
            run_creepage_check(&two_via_board(19.0), Layer::Copper(0), &[(1, 2)], &rules).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].actual_mm, None);
        assert!(violations[0].message.contains("unbounded"));
    }
}
