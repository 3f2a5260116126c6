//! The UCI Engine Adapter (§4.1): owns one engine subprocess, serializes
//! concurrent callers behind a mutex, and normalizes scores to
//! side-to-move-positive centipawns. The state machine (§9) is explicit
//! rather than implicit in field nullability: `Fresh -> Idle -> Evaluating
//! -> Idle -> Closing`, with `Evaluating -> Broken` on any transport fault
//! or timeout. A broken adapter is discarded and respawned on next use —
//! the pool (not this module) owns that decision.

use std::time::Duration;

use cozy_chess::{Board, Move};

use chess::score::{Score, SideRelativeEval};

use crate::error::EngineError;
use crate::stockfish::{EngineConfig, StockfishProcess};
use crate::uci::{parse_uci_message, UciMessage};

/// Explicit adapter lifecycle state (§9). Never inferred from `Option`
/// nullability — every transition is a deliberate match arm below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Fresh,
    Idle,
    Evaluating,
    Broken,
    Closing,
}

/// The result of one `evaluate` call, normalized to side-to-move-positive
/// centipawns per §4.1. Callers that want a white-positive value must
/// negate when the side to move is black — see `chess::score`.
#[derive(Debug, Clone, Copy)]
pub struct EngineEvaluation {
    pub score: SideRelativeEval,
    pub best_move: Move,
    pub depth: u32,
}

impl EngineEvaluation {
    pub fn is_mate(&self) -> bool {
        self.score.raw().is_mate()
    }

    pub fn mate_in(&self) -> Option<i32> {
        match self.score.raw() {
            Score::Mate(n) => Some(n),
            Score::Centipawns(_) => None,
        }
    }
}

struct AdapterInner {
    state: AdapterState,
    process: Option<StockfishProcess>,
}

pub struct EngineAdapter {
    config: EngineConfig,
    inner: tokio::sync::Mutex<AdapterInner>,
}

impl EngineAdapter {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            inner: tokio::sync::Mutex::new(AdapterInner {
                state: AdapterState::Fresh,
                process: None,
            }),
        }
    }

    pub async fn state(&self) -> AdapterState {
        self.inner.lock().await.state
    }

    /// Evaluate `board` at a fixed `depth`, returning the engine's principal
    /// move and its score. Concurrent callers on this adapter are serialized
    /// by the internal mutex — only one `position`/`go`/`bestmove` round
    /// trip happens at a time (§4.1, §5).
    #[tracing::instrument(level = "debug", skip(self, board))]
    pub async fn evaluate(&self, board: &Board, depth: u32) -> Result<EngineEvaluation, EngineError> {
        let mut guard = self.inner.lock().await;

        if guard.process.is_none() || guard.state == AdapterState::Broken {
            guard.process = Some(StockfishProcess::spawn(&self.config).await?);
            guard.state = AdapterState::Idle;
        }

        guard.state = AdapterState::Evaluating;

        let result = run_search(guard.process.as_mut().expect("process just ensured"), board, depth).await;

        match result {
            Ok(eval) => {
                guard.state = AdapterState::Idle;
                Ok(eval)
            }
            Err(e) => {
                guard.state = AdapterState::Broken;
                if let Some(process) = guard.process.take() {
                    // Drain-and-restart per §4.1: don't wait on a process
                    // that may already be wedged.
                    tokio::spawn(process.close());
                }
                Err(e)
            }
        }
    }

    /// Convenience wrapper returning just the principal move alongside the
    /// full evaluation (§4.1).
    pub async fn best_move_at_depth(
        &self,
        board: &Board,
        depth: u32,
    ) -> Result<(Move, EngineEvaluation), EngineError> {
        let eval = self.evaluate(board, depth).await?;
        Ok((eval.best_move, eval))
    }

    /// Engine-side strength knob, `0..=20` per the UCI `Skill Level` option.
    pub async fn set_skill(&self, level: u8) -> Result<(), EngineError> {
        let mut guard = self.inner.lock().await;
        if guard.process.is_none() || guard.state == AdapterState::Broken {
            guard.process = Some(StockfishProcess::spawn(&self.config).await?);
            guard.state = AdapterState::Idle;
        }
        let level = level.min(20);
        guard
            .process
            .as_mut()
            .expect("process just ensured")
            .send_line(&format!("setoption name Skill Level value {level}"))
            .await
    }

    /// `quit` command plus process reap (§4.1).
    pub async fn close(&self) {
        let mut guard = self.inner.lock().await;
        guard.state = AdapterState::Closing;
        if let Some(process) = guard.process.take() {
            process.close().await;
        }
    }
}

/// Timeout per call, proportional to depth (§5). A shallow depth-10 scan
/// gets a few seconds; a full depth-20+ search gets proportionally longer.
fn timeout_for_depth(depth: u32) -> Duration {
    Duration::from_millis(1_500 + u64::from(depth) * 400)
}

async fn run_search(
    process: &mut StockfishProcess,
    board: &Board,
    depth: u32,
) -> Result<EngineEvaluation, EngineError> {
    let fen = board.to_string();
    process.send_line(&format!("position fen {fen}")).await?;
    process.send_line(&format!("go depth {depth}")).await?;

    let timeout = timeout_for_depth(depth);
    let deadline = tokio::time::Instant::now() + timeout;

    let mut last_score: Option<Score> = None;
    let mut last_depth = depth;

    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            return Err(EngineError::Timeout(timeout));
        }
        let line = process.recv_line(remaining).await?;
        let message = parse_uci_message(&line).map_err(|e| EngineError::Transport(e.to_string()))?;

        match message {
            UciMessage::Info(info) => {
                if let Some(score) = info.score {
                    last_score = Some(score);
                }
                if let Some(d) = info.depth {
                    last_depth = d;
                }
            }
            UciMessage::BestMove { mv, .. } => {
                let score = last_score.unwrap_or(Score::Centipawns(0));
                return Ok(EngineEvaluation {
                    score: SideRelativeEval::from_side_to_move_relative(score),
                    best_move: mv,
                    depth: last_depth,
                });
            }
            _ => continue,
        }
    }
}
