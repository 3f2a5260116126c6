use cozy_chess::Board;

/// Parse a FEN string into a Board.
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    if fen.split_whitespace().next().is_none() {
        return Err(FenError::InvalidFormat);
    }
    fen.parse().map_err(|_| FenError::InvalidFormat)
}

/// Format a Board as a FEN string.
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

/// Extract the cache key portion of a position's FEN: piece placement plus
/// active color and castling rights. The en-passant square, halfmove clock,
/// and fullmove number are deliberately excluded so that positions which
/// only differ by move-count bookkeeping share one cache entry.
pub fn cache_key(board: &Board) -> String {
    let full = format_fen(board);
    let mut fields = full.split_whitespace();
    let placement = fields.next().unwrap_or_default();
    let active_color = fields.next().unwrap_or_default();
    let castling = fields.next().unwrap_or_default();
    format!("{placement} {active_color} {castling}")
}

#[derive(Debug, thiserror::Error)]
pub enum FenError {
    #[error("invalid FEN format")]
    InvalidFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_starting_position() {
        let board = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        assert_eq!(board, Board::default());
    }

    #[test]
    fn rejects_empty_string() {
        assert!(matches!(parse_fen(""), Err(FenError::InvalidFormat)));
    }

    #[test]
    fn cache_key_excludes_move_counters() {
        let a = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        let b = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 3 7").unwrap();
        assert_eq!(cache_key(&a), cache_key(&b));
    }

    #[test]
    fn cache_key_distinguishes_side_to_move() {
        let white: Board = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            .parse()
            .unwrap();
        let black: Board = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1"
            .parse()
            .unwrap();
        assert_ne!(cache_key(&white), cache_key(&black));
    }

    proptest! {
        /// Round-trip law (§8): for any position reachable by a short random
        /// walk of legal moves from the start, formatting then reparsing the
        /// FEN yields the identical board.
        #[test]
        fn fen_round_trips_along_random_walks(choices in proptest::collection::vec(0u32..32, 0..20)) {
            let mut board = Board::default();
            for choice in choices {
                let mut moves = Vec::new();
                board.generate_moves(|mvs| {
                    moves.extend(mvs);
                    false
                });
                if moves.is_empty() {
                    break;
                }
                let mv = moves[choice as usize % moves.len()];
                board.play(mv);
            }

            let fen = format_fen(&board);
            let reparsed = parse_fen(&fen).expect("formatted FEN must reparse");
            prop_assert_eq!(reparsed, board);
        }
    }
}
