//! Square-control calculation and tactical motif detection (§4.4, §4.5).

pub mod detector;
pub mod discovered_check_detector;
pub mod fork_detector;
pub mod helpers;
pub mod pin_detector;
pub mod skewer_detector;
pub mod square_control;
pub mod tactical_types;

pub use detector::{TacticalContext, TacticalDetector};
pub use square_control::SquareControl;
pub use tactical_types::{MotifKind, TacticalMotif};

use discovered_check_detector::DiscoveredCheckDetector;
use fork_detector::ForkDetector;
use pin_detector::PinDetector;
use skewer_detector::SkewerDetector;

/// Run every registered tactical detector over one move and return whatever
/// motifs survive (§4.5). At most one motif per detector; a position can
/// legitimately produce several distinct motifs for the same move (e.g. a
/// knight move that is both a fork and, incidentally, a discovered check).
pub fn detect_tactics(ctx: &TacticalContext) -> Vec<TacticalMotif> {
    let detectors: Vec<Box<dyn TacticalDetector>> = vec![
        Box::new(ForkDetector),
        Box::new(PinDetector),
        Box::new(SkewerDetector),
        Box::new(DiscoveredCheckDetector),
    ];

    detectors.iter().filter_map(|d| d.detect(ctx)).collect()
}

#[cfg(test)]
mod tests {
    use cozy_chess::{Board, Move, Square};

    use super::*;

    #[test]
    fn starting_position_quiet_move_produces_no_motifs() {
        let before = Board::default();
        let mut after = before.clone();
        let mv = Move {
            from: Square::G1,
            to: Square::F3,
            promotion: None,
        };
        after.play_unchecked(mv);

        let control_before = SquareControl::compute(&before);
        let control_after = SquareControl::compute(&after);
        let ctx = TacticalContext {
            before: &before,
            after: &after,
            mv,
            mover: before.side_to_move(),
            control_before: &control_before,
            control_after: &control_after,
        };

        assert!(detect_tactics(&ctx).is_empty());
    }

    #[test]
    fn knight_fork_is_detected_through_the_pipeline() {
        let before: Board = "4k3/3r4/8/8/8/8/8/4K1N1 w - - 0 1".parse().unwrap();
        let mut after = before.clone();
        let mv = Move {
            from: Square::G1,
            to: Square::F6,
            promotion: None,
        };
        after.play_unchecked(mv);

        let control_before = SquareControl::compute(&before);
        let control_after = SquareControl::compute(&after);
        let ctx = TacticalContext {
            before: &before,
            after: &after,
            mv,
            mover: before.side_to_move(),
            control_before: &control_before,
            control_after: &control_after,
        };

        let motifs = detect_tactics(&ctx);
        assert!(motifs.iter().any(|m| m.kind == MotifKind::Fork));
    }
}
