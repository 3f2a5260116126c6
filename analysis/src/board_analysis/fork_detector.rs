//! Fork detection per §4.5: landing-square safety, multiple new targets,
//! and per-target favorability (including the knight-forks-queen exception).

use chess::types::PieceKind;
use chess::uci::format_uci_move;
use cozy_chess::Piece;

use super::detector::{TacticalContext, TacticalDetector};
use super::helpers::{piece_attacks, piece_value};
use super::tactical_types::{MotifKind, TacticalMotif};

pub struct ForkDetector;

impl TacticalDetector for ForkDetector {
    fn detect(&self, ctx: &TacticalContext) -> Option<TacticalMotif> {
        let mover = ctx.mover;
        let opponent = !mover;
        let to = ctx.mv.to;
        let from = ctx.mv.from;

        let piece = ctx.after.piece_on(to)?;

        // Condition 1: landing-square safety.
        let a = ctx.control_after.control(to, mover) as u32;
        let d = ctx.control_after.control(to, opponent) as u32;
        let a_mat = ctx.control_after.material(to, mover);
        let d_mat = ctx.control_after.material(to, opponent);
        let landing_safe = d == 0 || a > d || (a == d && a_mat >= d_mat);
        if !landing_safe {
            return None;
        }

        // Condition 2: multiple new targets attacked from the new square
        // that were not already attacked by this piece from its old square.
        let attacks_from_to = piece_attacks(ctx.after, to, piece, mover);
        let attacks_from_from = piece_attacks(ctx.before, from, piece, mover);

        let mut qualifying = Vec::new();
        for target in attacks_from_to & ctx.after.colors(opponent) {
            let already_attacked =
                attacks_from_from.has(target) && ctx.before.colors(opponent).has(target);
            if already_attacked {
                continue;
            }

            // Condition 3: per-target favorability.
            let ta = ctx.control_after.control(target, mover);
            let td = ctx.control_after.control(target, opponent);
            let favorable = ta > td || {
                let target_piece = ctx.after.piece_on(target);
                target_piece
                    .map(|tp| piece_value(tp) > piece_value(piece))
                    .unwrap_or(false)
            };

            if favorable {
                qualifying.push(target);
            }
        }

        if qualifying.len() < 2 {
            return None;
        }

        let piece_char = PieceKind::from(piece).to_char_upper();
        let target_names: Vec<String> = qualifying.iter().map(|sq| sq.to_string()).collect();

        Some(TacticalMotif {
            kind: MotifKind::Fork,
            attacking_piece: piece_char.to_string(),
            piece_square: to.to_string(),
            description: format!(
                "{} on {} forks {}",
                piece_name(piece),
                to,
                target_names.join(" and ")
            ),
            target_squares: target_names,
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

#[cfg(test)]
mod tests {
    use cozy_chess::{Board, Move, Square};

    use super::*;
    use crate::board_analysis::square_control::SquareControl;

    #[test]
    fn knight_forks_king_and_rook() {
        // Knight lands on f6, forking the king on e8 and rook on d7.
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

        let motif = ForkDetector.detect(&ctx).expect("fork expected");
        assert_eq!(motif.kind, MotifKind::Fork);
        assert_eq!(motif.target_squares.len(), 2);
    }

    #[test]
    fn no_fork_on_quiet_developing_move() {
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

        assert!(ForkDetector.detect(&ctx).is_none());
    }
}
