//! The engine-level error taxonomy (§7): transport faults and timeouts are
//! the two kinds an adapter can raise. Both mark the adapter `Broken`
//! (§9 state machine) so the pool respawns it on next access rather than
//! retrying a process that may be wedged.

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine transport error: {0}")]
    Transport(String),

    #[error("engine timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("illegal move for engine: {0}")]
    InvalidMove(String),

    #[error("engine process io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stockfish binary not found")]
    BinaryNotFound,
}
