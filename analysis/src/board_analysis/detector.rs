use cozy_chess::{Board, Color, Move};

use super::square_control::SquareControl;
use super::tactical_types::TacticalMotif;

/// Context passed to every tactical detector: the position before and after
/// a single move, the move itself, and both positions' square-control maps.
/// Detectors are only ever invoked on the engine's best move at full depth
/// (§4.5); suboptimal moves receive no motif analysis.
pub struct TacticalContext<'a> {
    pub before: &'a Board,
    pub after: &'a Board,
    pub mv: Move,
    /// Side to move in the *before* position — the side making the move.
    pub mover: Color,
    pub control_before: &'a SquareControl,
    pub control_after: &'a SquareControl,
}

/// A modular tactical pattern detector. Each detector inspects a
/// `TacticalContext` and returns at most one motif — the detector surface is
/// total: any internal error yields `None` rather than panicking (§4.5).
pub trait TacticalDetector {
    fn detect(&self, ctx: &TacticalContext) -> Option<TacticalMotif>;
}

#[cfg(test)]
mod tests {
    use cozy_chess::{Board, Square};

    use super::*;
    use crate::board_analysis::tactical_types::MotifKind;

    struct AlwaysForkDetector;

    impl TacticalDetector for AlwaysForkDetector {
        fn detect(&self, _ctx: &TacticalContext) -> Option<TacticalMotif> {
            Some(TacticalMotif {
                kind: MotifKind::Fork,
                attacking_piece: "N".to_string(),
                piece_square: "f6".to_string(),
                target_squares: vec!["e8".to_string(), "d7".to_string()],
                mv: "g4f6".to_string(),
                description: "test fork".to_string(),
            })
        }
    }

    struct NullDetector;

    impl TacticalDetector for NullDetector {
        fn detect(&self, _ctx: &TacticalContext) -> Option<TacticalMotif> {
            None
        }
    }

    fn make_context<'a>(
        before: &'a Board,
        after: &'a Board,
        control_before: &'a SquareControl,
        control_after: &'a SquareControl,
    ) -> TacticalContext<'a> {
        TacticalContext {
            before,
            after,
            mv: Move {
                from: Square::G4,
                to: Square::F6,
                promotion: None,
            },
            mover: before.side_to_move(),
            control_before,
            control_after,
        }
    }

    #[test]
    fn trait_impl_returns_motif() {
        let board = Board::default();
        let control = SquareControl::compute(&board);
        let ctx = make_context(&board, &board, &control, &control);

        let motif = AlwaysForkDetector.detect(&ctx);
        assert!(motif.is_some());
        assert_eq!(motif.unwrap().kind, MotifKind::Fork);
    }

    #[test]
    fn null_detector_returns_none() {
        let board = Board::default();
        let control = SquareControl::compute(&board);
        let ctx = make_context(&board, &board, &control, &control);

        assert!(NullDetector.detect(&ctx).is_none());
    }

    #[test]
    fn pipeline_collects_from_multiple_detectors() {
        let board = Board::default();
        let control = SquareControl::compute(&board);
        let ctx = make_context(&board, &board, &control, &control);

        let detectors: Vec<Box<dyn TacticalDetector>> = vec![
            Box::new(AlwaysForkDetector),
            Box::new(NullDetector),
            Box::new(AlwaysForkDetector),
        ];

        let motifs: Vec<TacticalMotif> = detectors.iter().filter_map(|d| d.detect(&ctx)).collect();
        assert_eq!(motifs.len(), 2);
    }
}
