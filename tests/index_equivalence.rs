// The spatial track index is an accelerator only: validity answers must be
// identical with and without it
use creepage::board::{ArcTrack, Board, Layer, Track, TrackIndex};
use creepage::creepage::{PathConnection, ValidityContext};
use creepage::geometry::{Outline, Point};

#[cfg(test)]
mod tests {
    use super::*;

    /// Small deterministic generator so failures reproduce exactly
    struct XorShift64(u64);

    impl XorShift64 {
        fn next_u64(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }

        fn next_f64(&mut self, lo: f64, hi: f64) -> f64 {
            let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
            lo + unit * (hi - lo)
        }
    }

    fn random_board(rng: &mut XorShift64, tracks: usize) -> Board {
        let mut board = Board::new();
        board.outline =
            Some(Outline::rectangle(Point::new(-10.0, -10.0), Point::new(110.0, 110.0)));
        for i in 0..tracks {
            let start = Point::new(rng.next_f64(0.0, 100.0), rng.next_f64(0.0, 100.0));
            let end = Point::new(
                start.x + rng.next_f64(-15.0, 15.0),
                start.y + rng.next_f64(-15.0, 15.0),
            );
            board.tracks.push(Track {
                id: i as u64,
                net: (i % 7) as i32,
                layer: Layer::Copper(0),
                start,
                end,
                width: rng.next_f64(0.2, 1.2),
            });
        }
        board
    }

    fn random_arcs(rng: &mut XorShift64, board: &mut Board, arcs: usize) {
        for i in 0..arcs {
            board.track_arcs.push(ArcTrack {
                id: 1000 + i as u64,
                net: (i % 5) as i32,
                layer: Layer::Copper(0),
                center: Point::new(rng.next_f64(0.0, 100.0), rng.next_f64(0.0, 100.0)),
                radius: rng.next_f64(1.0, 8.0),
                start_angle: rng.next_f64(0.0, std::f64::consts::TAU),
                sweep: rng.next_f64(0.3, 6.0),
                width: rng.next_f64(0.2, 1.2),
            });
        }
    }

    fn make_ctx<'a>(
        board: &'a Board,
        layer: Layer,
        index: Option<&'a TrackIndex>,
    ) -> ValidityContext<'a> {
        ValidityContext {
            board,
            layer,
            edges: &[],
            ignore: &[],
            outline: board.outline.as_ref(),
            min_groove_width: 0.2,
            track_index: index,
        }
    }

    #[test]
    fn test_indexed_and_linear_validity_agree() {
        let mut rng = XorShift64(0x9e3779b97f4a7c15);
        let board = random_board(&mut rng, 50);
        let index = TrackIndex::build(&board);
        assert_eq!(index.len(), 50);

        let mut blocked = 0usize;
        let mut passed = 0usize;
        for _ in 0..200 {
            let a = Point::new(rng.next_f64(0.0, 100.0), rng.next_f64(0.0, 100.0));
            let b = Point::new(
                a.x + rng.next_f64(-25.0, 25.0),
                a.y + rng.next_f64(-25.0, 25.0),
            );
            let conn = PathConnection::straight(a, b);

            let with_index = conn.is_valid(&make_ctx(&board, Layer::Copper(0), Some(&index)));
            let without_index = conn.is_valid(&make_ctx(&board, Layer::Copper(0), None));
            assert_eq!(
                with_index, without_index,
                "index changed the verdict for ({}, {}) -> ({}, {})",
                a.x, a.y, b.x, b.y
            );
            if with_index {
                passed += 1;
            } else {
                blocked += 1;
            }
        }

        // With 50 fat tracks in a 100x100 area both outcomes must occur,
        // otherwise the property test is vacuous
        assert!(blocked > 0, "no candidate ever hit a track");
        assert!(passed > 0, "every candidate hit a track");
        println!("✓ {passed} clear / {blocked} blocked, identical with and without index");
    }

    #[test]
    fn test_indexed_and_linear_agree_on_arc_tracks() {
        let mut rng = XorShift64(0x5851f42d4c957f2d);
        let mut board = random_board(&mut rng, 20);
        random_arcs(&mut rng, &mut board, 25);
        let index = TrackIndex::build(&board);
        assert_eq!(index.len(), 45);

        let mut blocked = 0usize;
        let mut passed = 0usize;
        for _ in 0..200 {
            let a = Point::new(rng.next_f64(0.0, 100.0), rng.next_f64(0.0, 100.0));
            let b = Point::new(
                a.x + rng.next_f64(-25.0, 25.0),
                a.y + rng.next_f64(-25.0, 25.0),
            );
            let conn = PathConnection::straight(a, b);

            let with_index = conn.is_valid(&make_ctx(&board, Layer::Copper(0), Some(&index)));
            let without_index = conn.is_valid(&make_ctx(&board, Layer::Copper(0), None));
            assert_eq!(
                with_index, without_index,
                "index changed the verdict for ({}, {}) -> ({}, {})",
                a.x, a.y, b.x, b.y
            );
            if with_index {
                passed += 1;
            } else {
                blocked += 1;
            }
        }

        assert!(blocked > 0, "no candidate ever hit an arc or track");
        assert!(passed > 0, "every candidate hit copper");
        println!("✓ {passed} clear / {blocked} blocked over mixed straight and arc copper");
    }

    #[test]
    fn test_index_ignores_other_layers_like_the_linear_scan() {
        let mut rng = XorShift64(0xdeadbeefcafef00d);
        let mut board = random_board(&mut rng, 30);
        // Retag half the tracks onto another copper layer
        for (i, track) in board.tracks.iter_mut().enumerate() {
            if i % 2 == 0 {
                track.layer = Layer::Copper(1);
            }
        }
        let index = TrackIndex::build(&board);

        for _ in 0..100 {
            let a = Point::new(rng.next_f64(0.0, 100.0), rng.next_f64(0.0, 100.0));
            let b = Point::new(a.x + rng.next_f64(-25.0, 25.0), a.y + rng.next_f64(-25.0, 25.0));
            let conn = PathConnection::straight(a, b);

            for layer in [Layer::Copper(0), Layer::Copper(1)] {
                let with_index = conn.is_valid(&make_ctx(&board, layer, Some(&index)));
                let without_index = conn.is_valid(&make_ctx(&board, layer, None));
                assert_eq!(with_index, without_index, "layer {layer:?} verdicts diverged");
            }
        }
    }
}
