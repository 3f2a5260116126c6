//! Standard Algebraic Notation: the presentation format used alongside the
//! long-algebraic coordinate notation that the rest of the core works in.
//! SAN is produced for display only (§4 MoveAnnotation.move_san); nothing
//! downstream parses SAN back into a board position except PGN ingestion.

use cozy_chess::{Board, Color, File, Move, Piece, Square};

/// Parse a single SAN token (e.g. `Nf3`, `exd5`, `O-O`, `e8=Q+`) against the
/// board it is played on, by generating legal moves and matching.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let trimmed = strip_annotations(san);
    if trimmed.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    if trimmed == "O-O" || trimmed == "0-0" {
        return castling_move(board, CastleSide::King).ok_or(SanError::NoLegalMove(san.to_string()));
    }
    if trimmed == "O-O-O" || trimmed == "0-0-0" {
        return castling_move(board, CastleSide::Queen)
            .ok_or(SanError::NoLegalMove(san.to_string()));
    }

    let (piece, rest) = match trimmed.chars().next() {
        Some('K') => (Piece::King, &trimmed[1..]),
        Some('Q') => (Piece::Queen, &trimmed[1..]),
        Some('R') => (Piece::Rook, &trimmed[1..]),
        Some('B') => (Piece::Bishop, &trimmed[1..]),
        Some('N') => (Piece::Knight, &trimmed[1..]),
        _ => (Piece::Pawn, trimmed.as_str()),
    };

    let (rest, promotion) = match rest.split_once('=') {
        Some((head, promo)) => {
            let c = promo.chars().next().ok_or(SanError::InvalidPromotion(san.to_string()))?;
            let piece = char_to_piece(c).ok_or(SanError::InvalidPromotion(san.to_string()))?;
            (head, Some(piece))
        }
        None => (rest, None),
    };

    let rest = rest.replace('x', "");
    if rest.len() < 2 {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let (disambiguator, dest) = rest.split_at(rest.len() - 2);
    let to = parse_square(dest)?;

    let (from_file, from_rank) = parse_disambiguator(disambiguator)?;

    let mut candidates = Vec::new();
    board.generate_moves(|mvs| {
        if board.piece_on(mvs.from) == Some(piece) {
            for mv in mvs {
                if mv.to != to || mv.promotion != promotion {
                    continue;
                }
                if let Some(f) = from_file {
                    if mv.from.file() != f {
                        continue;
                    }
                }
                if let Some(r) = from_rank {
                    if mv.from.rank() != r {
                        continue;
                    }
                }
                candidates.push(mv);
            }
        }
        false
    });

    match candidates.len() {
        0 => Err(SanError::NoLegalMove(san.to_string())),
        1 => Ok(candidates[0]),
        _ => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

enum CastleSide {
    King,
    Queen,
}

fn castling_move(board: &Board, side: CastleSide) -> Option<Move> {
    let color = board.side_to_move();
    let rank = match color {
        Color::White => cozy_chess::Rank::First,
        Color::Black => cozy_chess::Rank::Eighth,
    };
    let rook_file = board.castle_rights(color).long.filter(|_| matches!(side, CastleSide::Queen))
        .or_else(|| board.castle_rights(color).short.filter(|_| matches!(side, CastleSide::King)))?;
    let king_sq = board.king(color);
    let rook_sq = Square::new(rook_file, rank);

    let mut found = None;
    board.generate_moves(|mvs| {
        if mvs.from == king_sq {
            for mv in mvs {
                if mv.to == rook_sq {
                    found = Some(mv);
                }
            }
        }
        false
    });
    found
}

/// Format a legal move as SAN for the position it is played from.
///
/// `mv` must be legal in `board`; disambiguation, check, and checkmate
/// suffixes are computed by trying the move and inspecting the resulting
/// position.
pub fn format_san(board: &Board, mv: Move) -> String {
    let piece = match board.piece_on(mv.from) {
        Some(p) => p,
        None => return fallback_coordinate(mv),
    };

    let is_castle = piece == Piece::King
        && board.colors(board.side_to_move()).has(mv.to)
        && board.piece_on(mv.to) == Some(Piece::Rook);

    let mut san = String::new();
    if is_castle {
        let king_file = mv.from.file() as i8;
        let rook_file = mv.to.file() as i8;
        san.push_str(if rook_file > king_file { "O-O" } else { "O-O-O" });
    } else {
        let is_capture = board.piece_on(mv.to).is_some()
            || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

        match piece {
            Piece::Pawn => {
                if is_capture {
                    san.push(file_char(mv.from.file()));
                    san.push('x');
                }
            }
            other => {
                san.push(piece_char(other));
                san.push_str(&disambiguation(board, mv, other));
                if is_capture {
                    san.push('x');
                }
            }
        }

        san.push(file_char(mv.to.file()));
        san.push(rank_char(mv.to.rank()));

        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(piece_char(promo));
        }
    }

    let mut after = board.clone();
    after.play_unchecked(mv);
    match after.status() {
        cozy_chess::GameStatus::Won => san.push('#'),
        _ if !after.checkers().is_empty() => san.push('+'),
        _ => {}
    }

    san
}

/// Disambiguation fragment (file, rank, or both) needed when more than one
/// like piece can legally reach the same destination square.
fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let mut same_file = false;
    let mut same_rank = false;
    let mut other_found = false;

    let pieces_of_kind = board.pieces(piece) & board.colors(board.side_to_move());
    for from in pieces_of_kind {
        if from == mv.from {
            continue;
        }
        let mut reaches = false;
        board.generate_moves(|mvs| {
            if mvs.from == from {
                for candidate in mvs {
                    if candidate.to == mv.to {
                        reaches = true;
                    }
                }
            }
            false
        });
        if reaches {
            other_found = true;
            if from.file() == mv.from.file() {
                same_file = true;
            }
            if from.rank() == mv.from.rank() {
                same_rank = true;
            }
        }
    }

    if !other_found {
        String::new()
    } else if !same_file {
        file_char(mv.from.file()).to_string()
    } else if !same_rank {
        rank_char(mv.from.rank()).to_string()
    } else {
        format!("{}{}", file_char(mv.from.file()), rank_char(mv.from.rank()))
    }
}

fn fallback_coordinate(mv: Move) -> String {
    format!(
        "{}{}{}{}",
        file_char(mv.from.file()),
        rank_char(mv.from.rank()),
        file_char(mv.to.file()),
        rank_char(mv.to.rank())
    )
}

fn parse_disambiguator(s: &str) -> Result<(Option<File>, Option<cozy_chess::Rank>), SanError> {
    match s.len() {
        0 => Ok((None, None)),
        1 => {
            let c = s.chars().next().unwrap();
            if let Some(f) = char_to_file(c) {
                Ok((Some(f), None))
            } else if let Some(r) = char_to_rank(c) {
                Ok((None, Some(r)))
            } else {
                Err(SanError::InvalidFormat(s.to_string()))
            }
        }
        2 => {
            let mut chars = s.chars();
            let f = char_to_file(chars.next().unwrap()).ok_or(SanError::InvalidFile(s.chars().next().unwrap()))?;
            let r = char_to_rank(chars.next().unwrap()).ok_or(SanError::InvalidRank(s.chars().nth(1).unwrap()))?;
            Ok((Some(f), Some(r)))
        }
        _ => Err(SanError::InvalidFormat(s.to_string())),
    }
}

fn parse_square(s: &str) -> Result<Square, SanError> {
    if s.len() != 2 {
        return Err(SanError::InvalidSquare(s.to_string()));
    }
    let mut chars = s.chars();
    let file = char_to_file(chars.next().unwrap()).ok_or(SanError::InvalidSquare(s.to_string()))?;
    let rank = char_to_rank(chars.next().unwrap()).ok_or(SanError::InvalidSquare(s.to_string()))?;
    Ok(Square::new(file, rank))
}

fn strip_annotations(san: &str) -> String {
    san.trim_end_matches(['+', '#', '!', '?']).to_string()
}

fn char_to_piece(c: char) -> Option<Piece> {
    match c {
        'Q' => Some(Piece::Queen),
        'R' => Some(Piece::Rook),
        'B' => Some(Piece::Bishop),
        'N' => Some(Piece::Knight),
        _ => None,
    }
}

fn piece_char(piece: Piece) -> char {
    match piece {
        Piece::King => 'K',
        Piece::Queen => 'Q',
        Piece::Rook => 'R',
        Piece::Bishop => 'B',
        Piece::Knight => 'N',
        Piece::Pawn => unreachable!("pawns have no SAN letter"),
    }
}

fn char_to_file(c: char) -> Option<File> {
    match c {
        'a' => Some(File::A),
        'b' => Some(File::B),
        'c' => Some(File::C),
        'd' => Some(File::D),
        'e' => Some(File::E),
        'f' => Some(File::F),
        'g' => Some(File::G),
        'h' => Some(File::H),
        _ => None,
    }
}

fn char_to_rank(c: char) -> Option<cozy_chess::Rank> {
    use cozy_chess::Rank::*;
    match c {
        '1' => Some(First),
        '2' => Some(Second),
        '3' => Some(Third),
        '4' => Some(Fourth),
        '5' => Some(Fifth),
        '6' => Some(Sixth),
        '7' => Some(Seventh),
        '8' => Some(Eighth),
        _ => None,
    }
}

fn file_char(f: File) -> char {
    match f {
        File::A => 'a',
        File::B => 'b',
        File::C => 'c',
        File::D => 'd',
        File::E => 'e',
        File::F => 'f',
        File::G => 'g',
        File::H => 'h',
    }
}

fn rank_char(r: cozy_chess::Rank) -> char {
    (b'1' + r as u8) as char
}

#[derive(Debug, thiserror::Error)]
pub enum SanError {
    #[error("no legal move found for: {0}")]
    NoLegalMove(String),
    #[error("ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("invalid SAN format: {0}")]
    InvalidFormat(String),
    #[error("invalid square: {0}")]
    InvalidSquare(String),
    #[error("invalid file: {0}")]
    InvalidFile(char),
    #[error("invalid rank: {0}")]
    InvalidRank(char),
    #[error("invalid promotion: {0}")]
    InvalidPromotion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_simple_pawn_push() {
        let board = Board::default();
        let mv = Move {
            from: Square::E2,
            to: Square::E4,
            promotion: None,
        };
        assert_eq!(format_san(&board, mv), "e4");
    }

    #[test]
    fn formats_knight_development() {
        let board = Board::default();
        let mv = Move {
            from: Square::G1,
            to: Square::F3,
            promotion: None,
        };
        assert_eq!(format_san(&board, mv), "Nf3");
    }

    #[test]
    fn formats_capture_with_x() {
        let board: Board = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2"
            .parse()
            .unwrap();
        let mv = Move {
            from: Square::E4,
            to: Square::D5,
            promotion: None,
        };
        assert_eq!(format_san(&board, mv), "exd5");
    }

    #[test]
    fn formats_disambiguated_rook_move() {
        let board: Board = "4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1".parse().unwrap();
        let mv = Move {
            from: Square::A1,
            to: Square::D1,
            promotion: None,
        };
        assert_eq!(format_san(&board, mv), "Rad1");
    }

    #[test]
    fn formats_castling() {
        let board: Board = "4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1".parse().unwrap();
        let mv = Move {
            from: Square::E1,
            to: Square::H1,
            promotion: None,
        };
        assert_eq!(format_san(&board, mv), "O-O");
    }

    #[test]
    fn formats_check_suffix() {
        let board: Board = "4k3/8/8/8/8/8/8/4KR2 w - - 0 1".parse().unwrap();
        let mv = Move {
            from: Square::F1,
            to: Square::F8,
            promotion: None,
        };
        assert_eq!(format_san(&board, mv), "Rf8+");
    }

    #[test]
    fn parses_simple_pawn_push() {
        let board = Board::default();
        let mv = parse_san(&board, "e4").unwrap();
        assert_eq!(mv.from, Square::E2);
        assert_eq!(mv.to, Square::E4);
    }

    #[test]
    fn parses_knight_move() {
        let board = Board::default();
        let mv = parse_san(&board, "Nf3").unwrap();
        assert_eq!(mv.from, Square::G1);
        assert_eq!(mv.to, Square::F3);
    }

    #[test]
    fn parses_castling_round_trip() {
        let board: Board = "4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1".parse().unwrap();
        let mv = parse_san(&board, "O-O").unwrap();
        assert_eq!(format_san(&board, mv), "O-O");
    }

    #[test]
    fn rejects_illegal_move() {
        let board = Board::default();
        assert!(parse_san(&board, "Nf6").is_err());
    }
}
