//! Long algebraic (UCI coordinate) move parsing and formatting shared by
//! the `chess` and `engine` crates.

use cozy_chess::{Move, Square};

use crate::converters::{format_piece, format_square, parse_piece};

#[derive(Debug, thiserror::Error)]
pub enum CoordMoveError {
    #[error("malformed coordinate move: {0}")]
    Malformed(String),
    #[error("invalid square: {0}")]
    InvalidSquare(String),
    #[error("invalid promotion letter: {0}")]
    InvalidPromotion(char),
}

/// Parse a long algebraic move such as `e2e4` or `e7e8q`.
///
/// This is a pure coordinate decode: it does not check legality against any
/// board, and does not resolve UCI's two-square castling notation to
/// cozy-chess's king-takes-rook notation (see `chess::uci` for that).
pub fn parse_long_algebraic(s: &str) -> Result<Move, CoordMoveError> {
    if s.len() != 4 && s.len() != 5 {
        return Err(CoordMoveError::Malformed(s.to_string()));
    }

    let from: Square = s[0..2]
        .parse()
        .map_err(|_| CoordMoveError::InvalidSquare(s[0..2].to_string()))?;
    let to: Square = s[2..4]
        .parse()
        .map_err(|_| CoordMoveError::InvalidSquare(s[2..4].to_string()))?;

    let promotion = if s.len() == 5 {
        let c = s.as_bytes()[4] as char;
        Some(parse_piece(c).ok_or(CoordMoveError::InvalidPromotion(c))?)
    } else {
        None
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

/// Format a move in long algebraic notation, e.g. `e2e4`, `e7e8q`.
pub fn format_long_algebraic(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(format_piece(promo));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozy_chess::{File, Piece, Rank};

    #[test]
    fn parses_plain_move() {
        let mv = parse_long_algebraic("e2e4").unwrap();
        assert_eq!(mv.from, Square::new(File::E, Rank::Second));
        assert_eq!(mv.to, Square::new(File::E, Rank::Fourth));
        assert_eq!(mv.promotion, None);
    }

    #[test]
    fn parses_promotion_move() {
        let mv = parse_long_algebraic("e7e8q").unwrap();
        assert_eq!(mv.promotion, Some(Piece::Queen));
    }

    #[test]
    fn round_trips_through_format() {
        let mv = parse_long_algebraic("a7a8n").unwrap();
        assert_eq!(format_long_algebraic(mv), "a7a8n");
    }

    #[test]
    fn rejects_malformed_length() {
        assert!(parse_long_algebraic("e2e").is_err());
        assert!(parse_long_algebraic("e2e4qq").is_err());
    }

    #[test]
    fn rejects_bad_promotion_letter() {
        assert!(parse_long_algebraic("e7e8x").is_err());
    }
}
