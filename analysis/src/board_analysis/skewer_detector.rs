//! Skewer detection per §4.5: same ray geometry as a pin, but with the value
//! ordering inverted (the front piece outvalues the one behind it) and a
//! different legal-move fingerprint (the front piece *can* recapture but has
//! no better escape).

use chess::types::PieceKind;
use chess::uci::format_uci_move;
use cozy_chess::Piece;

use super::detector::{TacticalContext, TacticalDetector};
use super::helpers::{piece_value, ray_first_two_occupied, sliding_directions};
use super::tactical_types::{MotifKind, TacticalMotif};

pub struct SkewerDetector;

impl TacticalDetector for SkewerDetector {
    fn detect(&self, ctx: &TacticalContext) -> Option<TacticalMotif> {
        // Condition 1: the move does not deliver check.
        if !ctx.after.checkers().is_empty() {
            return None;
        }

        let mover = ctx.mover;
        let opponent = !mover;
        let to = ctx.mv.to;

        // Condition 2: the moving piece is bishop, rook, or queen.
        let piece = ctx.after.piece_on(to)?;
        if !matches!(piece, Piece::Bishop | Piece::Rook | Piece::Queen) {
            return None;
        }

        for dir in sliding_directions(piece) {
            let (Some(first_sq), Some(second_sq)) = ray_first_two_occupied(ctx.after, to, *dir)
            else {
                continue;
            };

            if !ctx.after.colors(opponent).has(first_sq) || !ctx.after.colors(opponent).has(second_sq) {
                continue;
            }

            let Some(first_piece) = ctx.after.piece_on(first_sq) else {
                continue;
            };
            let Some(second_piece) = ctx.after.piece_on(second_sq) else {
                continue;
            };

            // Condition 3: inverted value ordering — the piece behind is
            // worth strictly less than the one in front.
            if piece_value(second_piece) >= piece_value(first_piece) {
                continue;
            }

            // Condition 4: first loses legal moves as a result of the skewer.
            let moves_before = ctx.control_before.legal_move_count(first_sq);
            let moves_after = ctx.control_after.legal_move_count(first_sq);
            if moves_after >= moves_before {
                continue;
            }

            // Condition 5: first CAN legally capture the attacker — this is
            // what distinguishes a skewer from a pin.
            if !ctx
                .control_after
                .legal_destinations(first_sq)
                .contains(&to)
            {
                continue;
            }

            // Condition 6: no destination escapes the attacker's control any
            // better than simply taking and being retaken.
            let safe_destinations = ctx
                .control_after
                .legal_destinations(first_sq)
                .iter()
                .filter(|&&dest| ctx.control_after.control(dest, mover) == 0)
                .count();
            if safe_destinations > moves_before {
                continue;
            }

            // Condition 7: the front piece outvalues the mover (the skewer
            // forces a losing trade if it moves, or loses material if not).
            if piece_value(first_piece) <= piece_value(piece) {
                continue;
            }

            let piece_char = PieceKind::from(piece).to_char_upper();
            return Some(TacticalMotif {
                kind: MotifKind::Skewer,
                attacking_piece: piece_char.to_string(),
                piece_square: to.to_string(),
                description: format!(
                    "{} on {} skewers the {} on {} to the {} on {}",
                    piece_name(piece),
                    to,
                    piece_name(first_piece),
                    first_sq,
                    piece_name(second_piece),
                    second_sq
                ),
                target_squares: vec![first_sq.to_string(), second_sq.to_string()],
                mv: format_uci_move(ctx.mv),
            });
        }

        None
    }
}

fn piece_name(piece: Piece) -> &'static str {
    match piece {
        Piece::Pawn => "pawn",
        Piece::Knight => "knight",
        Piece::Bishop => "bishop",
        Piece::Rook => "rook",
        Piece::Queen => "queen",
        Piece::King => "king",
    }
}

#[cfg(test)]
mod tests {
    use cozy_chess::{Board, Move, Square};

    use super::*;
    use crate::board_analysis::square_control::SquareControl;

    #[test]
    fn rook_skewers_queen_to_rook() {
        // Black queen e7 in front, black rook e8 behind it on the e-file.
        // The white rook steps to e2, attacking the queen first and the
        // lower-value rook through it.
        let before: Board = "4r2k/4q3/8/8/8/8/8/4R1K1 w - - 0 1".parse().unwrap();
        let mut after = before.clone();
        let mv = Move {
            from: Square::E1,
            to: Square::E2,
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

        let motif = SkewerDetector.detect(&ctx);
        assert!(motif.is_some(), "expected a skewer to be detected");
        let motif = motif.unwrap();
        assert_eq!(motif.kind, MotifKind::Skewer);
    }

    #[test]
    fn no_skewer_on_quiet_move() {
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

        assert!(SkewerDetector.detect(&ctx).is_none());
    }
}
