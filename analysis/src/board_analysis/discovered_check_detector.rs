//! Discovered check detection per §4.5: a move delivers check, and the
//! control delta on the opponent king's square identifies whether the check
//! comes from a piece revealed by the move (as opposed to, or in addition
//! to, the moved piece itself).

use chess::types::PieceKind;
use chess::uci::format_uci_move;
use cozy_chess::Piece;

use super::detector::{TacticalContext, TacticalDetector};
use super::helpers::piece_attacks;
use super::tactical_types::{MotifKind, TacticalMotif};

pub struct DiscoveredCheckDetector;

impl TacticalDetector for DiscoveredCheckDetector {
    fn detect(&self, ctx: &TacticalContext) -> Option<TacticalMotif> {
        // Condition 1: the move delivers check.
        if ctx.after.checkers().is_empty() {
            return None;
        }

        let mover = ctx.mover;
        let opponent = !mover;
        let king_sq = ctx.after.king(opponent);

        // Condition 2: the control delta on the king square.
        let delta = ctx.control_after.control(king_sq, mover) as i32
            - ctx.control_before.control(king_sq, mover) as i32;

        let moved_piece = ctx.after.piece_on(ctx.mv.to)?;
        let moved_attacks_king = piece_attacks(ctx.after, ctx.mv.to, moved_piece, mover).has(king_sq);

        // Condition 3: the required delta depends on whether the moved piece
        // itself is giving check.
        let required = if moved_attacks_king { 2 } else { 1 };
        if delta < required {
            return None;
        }

        // Condition 4: identify the discovered attacker among the mover's
        // other pieces.
        let discovered = ctx.after.colors(mover).into_iter().find_map(|sq| {
            if sq == ctx.mv.to {
                return None;
            }
            let piece = ctx.after.piece_on(sq)?;
            piece_attacks(ctx.after, sq, piece, mover)
                .has(king_sq)
                .then_some((sq, piece))
        });

        let (disc_sq, disc_piece) = discovered?;

        let piece_char = PieceKind::from(disc_piece).to_char_upper();
        Some(TacticalMotif {
            kind: MotifKind::DiscoveredCheck,
            attacking_piece: piece_char.to_string(),
            piece_square: disc_sq.to_string(),
            target_squares: vec![king_sq.to_string()],
            description: format!(
                "{} on {} delivers discovered check to the king on {}",
                piece_name(disc_piece),
                disc_sq,
                king_sq
            ),
            mv: format_uci_move(ctx.mv),
        })
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
