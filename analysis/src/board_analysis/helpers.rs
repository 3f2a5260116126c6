use cozy_chess::{BitBoard, Board, Color, File, Piece, Square};

/// Returns all pieces of `color` that attack the given square.
pub fn attackers_of(board: &Board, sq: Square, color: Color) -> BitBoard {
    let occupied = board.occupied();
    let color_pieces = board.colors(color);

    let mut attackers = BitBoard::EMPTY;

    // Pawn attacks: a pawn of `color` attacks `sq` if `sq` is in the pawn's attack set.
    // Equivalently, we look from `sq` as if it were the opposite color's pawn.
    let pawn_attacks = cozy_chess::get_pawn_attacks(sq, !color);
    attackers |= pawn_attacks & board.pieces(Piece::Pawn) & color_pieces;

    // Knight attacks
    let knight_attacks = cozy_chess::get_knight_moves(sq);
    attackers |= knight_attacks & board.pieces(Piece::Knight) & color_pieces;

    // Bishop/Queen (diagonal)
    let bishop_attacks = cozy_chess::get_bishop_moves(sq, occupied);
    attackers |= bishop_attacks & (board.pieces(Piece::Bishop) | board.pieces(Piece::Queen)) & color_pieces;

    // Rook/Queen (orthogonal)
    let rook_attacks = cozy_chess::get_rook_moves(sq, occupied);
    attackers |= rook_attacks & (board.pieces(Piece::Rook) | board.pieces(Piece::Queen)) & color_pieces;

    // King attacks
    let king_attacks = cozy_chess::get_king_moves(sq);
    attackers |= king_attacks & board.pieces(Piece::King) & color_pieces;

    attackers
}

/// Piece values per §3/§4.5: pawn=1, knight=bishop=3, rook=5, queen=9, king=0.
/// Used for material-weighted square control and every tactical threshold.
pub fn piece_value(piece: Piece) -> u32 {
    match piece {
        Piece::Pawn => 1,
        Piece::Knight => 3,
        Piece::Bishop => 3,
        Piece::Rook => 5,
        Piece::Queen => 9,
        Piece::King => 0,
    }
}

/// Returns the attack bitboard for a specific piece on a square.
pub fn piece_attacks(board: &Board, sq: Square, piece: Piece, color: Color) -> BitBoard {
    let occupied = board.occupied();
    match piece {
        Piece::Pawn => cozy_chess::get_pawn_attacks(sq, color),
        Piece::Knight => cozy_chess::get_knight_moves(sq),
        Piece::Bishop => cozy_chess::get_bishop_moves(sq, occupied),
        Piece::Rook => cozy_chess::get_rook_moves(sq, occupied),
        Piece::Queen => {
            cozy_chess::get_bishop_moves(sq, occupied) | cozy_chess::get_rook_moves(sq, occupied)
        }
        Piece::King => cozy_chess::get_king_moves(sq),
    }
}

/// The four orthogonal and four diagonal compass directions, as
/// `(file_delta, rank_delta)` pairs.
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Ray directions a sliding piece moves along; empty for non-sliders.
pub fn sliding_directions(piece: Piece) -> &'static [(i8, i8)] {
    match piece {
        Piece::Rook => &ROOK_DIRECTIONS,
        Piece::Bishop => &BISHOP_DIRECTIONS,
        Piece::Queen => &[
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ],
        _ => &[],
    }
}

/// Walk a ray from `from` in direction `dir` and return the first two
/// occupied squares encountered, in order. Used by the pin and skewer
/// detectors to find the "first" and "second" piece along a mover's attack
/// ray (§4.5).
pub fn ray_first_two_occupied(board: &Board, from: Square, dir: (i8, i8)) -> (Option<Square>, Option<Square>) {
    let mut file = from.file() as i8;
    let mut rank = from.rank() as i8;
    let mut first = None;
    let mut second = None;

    loop {
        file += dir.0;
        rank += dir.1;
        if !(0..8).contains(&file) || !(0..8).contains(&rank) {
            break;
        }
        let Some(f) = File::try_index(file as usize) else {
            break;
        };
        let Some(r) = cozy_chess::Rank::try_index(rank as usize) else {
            break;
        };
        let sq = Square::new(f, r);
        if board.occupied().has(sq) {
            if first.is_none() {
                first = Some(sq);
            } else {
                second = Some(sq);
                break;
            }
        }
    }

    (first, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_values() {
        assert_eq!(piece_value(Piece::Pawn), 1);
        assert_eq!(piece_value(Piece::Knight), 3);
        assert_eq!(piece_value(Piece::Bishop), 3);
        assert_eq!(piece_value(Piece::Rook), 5);
        assert_eq!(piece_value(Piece::Queen), 9);
        assert_eq!(piece_value(Piece::King), 0);
    }

    #[test]
    fn test_attackers_of_center() {
        let board: Board = Board::default();
        // e4 square — no white pieces attack it directly from starting position
        // except the pawn on d2 and f2 don't attack e4 (they attack d3/f3 and e3/g3)
        // Actually d2 pawn attacks e3, not e4. Let's check a simpler case.
        // In starting position, e3 is attacked by the d2 and f2 pawns
        let e3 = Square::E3;
        let white_attackers = attackers_of(&board, e3, Color::White);
        // d2 pawn attacks e3, f2 pawn attacks e3
        assert!(white_attackers.len() >= 2);
    }

    #[test]
    fn test_piece_attacks_knight() {
        let board: Board = Board::default();
        let g1 = Square::G1;
        let attacks = piece_attacks(&board, g1, Piece::Knight, Color::White);
        // Knight on g1 attacks f3 and h3
        assert!(attacks.has(Square::F3));
        assert!(attacks.has(Square::H3));
    }
}
