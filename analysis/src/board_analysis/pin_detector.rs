//! Pin detection per §4.5: a sliding piece restricts an opponent piece's
//! movement because moving it away would expose a higher-value piece behind.

use chess::types::PieceKind;
use chess::uci::format_uci_move;
use cozy_chess::Piece;

use super::detector::{TacticalContext, TacticalDetector};
use super::helpers::{piece_value, ray_first_two_occupied, sliding_directions};
use super::tactical_types::{MotifKind, TacticalMotif};

pub struct PinDetector;

impl TacticalDetector for PinDetector {
    fn detect(&self, ctx: &TacticalContext) -> Option<TacticalMotif> {
        // Condition 1: the move does not deliver check.
        if !ctx.after.checkers().is_empty() {
            return None;
        }

        let mover = ctx.mover;
        let opponent = !mover;
        let to = ctx.mv.to;

        // Condition 2: the moving piece is a sliding long-range piece.
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

            // Condition 3: second strictly outvalues first along this ray.
            if piece_value(second_piece) <= piece_value(first_piece) {
                continue;
            }

            // Condition 4: first loses legal moves as a result of the pin.
            let moves_before = ctx.control_before.legal_move_count(first_sq);
            let moves_after = ctx.control_after.legal_move_count(first_sq);
            if moves_after >= moves_before {
                continue;
            }

            // Condition 5: first cannot legally capture the pinning piece
            // (a pin is unbreakable; a piece that can just take isn't pinned).
            if ctx
                .control_after
                .legal_destinations(first_sq)
                .contains(&to)
            {
                continue;
            }

            // Condition 6: the pin traps rather than trades.
            if piece_value(first_piece) > piece_value(piece) {
                continue;
            }

            let piece_char = PieceKind::from(piece).to_char_upper();
            return Some(TacticalMotif {
                kind: MotifKind::Pin,
                attacking_piece: piece_char.to_string(),
                piece_square: to.to_string(),
                description: format!(
                    "{} on {} pins the {} on {} to the {} on {}",
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
