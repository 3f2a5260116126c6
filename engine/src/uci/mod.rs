pub mod parser;

pub use parser::{parse_uci_message, UciInfo, UciMessage};

#[derive(Debug, thiserror::Error)]
pub enum UciError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed UCI message: {0}")]
    MalformedMessage(String),
    #[error("invalid move: {0}")]
    InvalidMove(String),
}
