//! Character-level conversions between cozy-chess types and their
//! single-character UCI/FEN representations.

use cozy_chess::{Piece, Square};

/// Format a square in algebraic notation, e.g. `e4`.
pub fn format_square(sq: Square) -> String {
    sq.to_string()
}

/// Parse a square from algebraic notation.
pub fn parse_square(s: &str) -> Option<Square> {
    s.parse().ok()
}

/// Format a piece as its lowercase UCI promotion letter, e.g. `q`.
pub fn format_piece(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}

/// Parse a promotion letter (case-insensitive) into a piece.
pub fn parse_piece(c: char) -> Option<Piece> {
    match c.to_ascii_lowercase() {
        'p' => Some(Piece::Pawn),
        'n' => Some(Piece::Knight),
        'b' => Some(Piece::Bishop),
        'r' => Some(Piece::Rook),
        'q' => Some(Piece::Queen),
        'k' => Some(Piece::King),
        _ => None,
    }
}
