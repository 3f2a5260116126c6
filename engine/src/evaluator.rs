//! The single funnel the Game Analyzer calls through (§4.3): every position
//! evaluation goes `evaluator -> cache -> pool -> adapter`, never around the
//! cache. Terminal positions (checkmate, stalemate) are handled here, before
//! the pool is touched at all — a mating or stalemated position has no
//! `bestmove` for the engine to report, so asking `cozy-chess` first avoids
//! ever sending `go depth N` on a position with no legal replies, mirroring
//! the terminal-position check the original review worker does before
//! invoking its engine.

use cozy_chess::{Board, Color, GameStatus, Move};

use chess::score::{Score, SideRelativeEval};

use crate::adapter::EngineEvaluation;
use crate::cache::{CacheKey, EvaluationCache};
use crate::error::EngineError;
use crate::pool::EnginePool;

pub struct PositionEvaluator {
    pool: EnginePool,
    cache: EvaluationCache,
}

impl PositionEvaluator {
    pub fn new(pool: EnginePool, cache: EvaluationCache) -> Self {
        Self { pool, cache }
    }

    /// Evaluate `board` at `depth`, consulting the cache first and filling
    /// it on miss. `slot_hint` is forwarded to the pool unchanged so callers
    /// analyzing independent games can fan out across adapters.
    #[tracing::instrument(level = "debug", skip(self, board))]
    pub async fn evaluate(
        &self,
        board: &Board,
        depth: u32,
        slot_hint: usize,
    ) -> Result<EngineEvaluation, EngineError> {
        if let Some(terminal) = terminal_evaluation(board) {
            return Ok(terminal);
        }

        let key = CacheKey {
            fen_key: chess::cache_key(board),
            depth,
        };

        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let evaluation = self.pool.evaluate(board, depth, slot_hint).await?;
        self.cache.insert(key, evaluation);
        Ok(evaluation)
    }

    pub async fn set_skill(&self, level: u8) -> Result<(), EngineError> {
        self.pool.set_skill(level).await
    }

    pub async fn close(&self) {
        self.pool.close_all().await;
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache.hits()
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache.misses()
    }
}

/// A position with no legal moves has a well-defined score that no search
/// can improve on: checkmate is the worst possible side-to-move-relative
/// score, stalemate is exactly equal. Returns `None` for any position with
/// legal moves remaining.
fn terminal_evaluation(board: &Board) -> Option<EngineEvaluation> {
    match board.status() {
        GameStatus::Won => Some(EngineEvaluation {
            score: SideRelativeEval::from_side_to_move_relative(Score::Mate(0)),
            best_move: null_move(board),
            depth: 0,
        }),
        GameStatus::Drawn => Some(EngineEvaluation {
            score: SideRelativeEval::from_side_to_move_relative(Score::Centipawns(0)),
            best_move: null_move(board),
            depth: 0,
        }),
        GameStatus::Ongoing => None,
    }
}

/// Terminal positions have no legal move to report; callers must check
/// `is_mate()`/`score` before trusting `best_move` on a terminal result.
/// `cozy-chess` has no sentinel `Move`, so we synthesize a same-square move
/// purely as a placeholder — it is never sent to the engine or played.
fn null_move(board: &Board) -> Move {
    let king = board.king(side_to_move(board));
    Move {
        from: king,
        to: king,
        promotion: None,
    }
}

fn side_to_move(board: &Board) -> Color {
    board.side_to_move()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkmate_is_detected_as_terminal() {
        // Fool's mate: 1. f3 e5 2. g4 Qh4#
        let board: Board = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"
            .parse()
            .unwrap();
        let eval = terminal_evaluation(&board).expect("checkmate is terminal");
        assert!(eval.is_mate());
        assert_eq!(eval.mate_in(), Some(0));
    }

    #[test]
    fn stalemate_is_detected_as_terminal() {
        let board: Board = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().unwrap();
        let eval = terminal_evaluation(&board).expect("stalemate is terminal");
        assert!(!eval.is_mate());
    }

    #[test]
    fn ongoing_position_is_not_terminal() {
        let board = Board::default();
        assert!(terminal_evaluation(&board).is_none());
    }
}
