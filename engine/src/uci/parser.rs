//! Line-level UCI protocol parsing (§6): `id`, `uciok`, `readyok`,
//! `bestmove`, and `info` lines carrying `score cp`/`score mate` and `pv`.

use chess::score::Score;
use chess_common::parse_long_algebraic;
use cozy_chess::Move;

use crate::uci::UciError;

/// A parsed message from the engine.
#[derive(Debug, Clone)]
pub enum UciMessage {
    Id { name: String, value: String },
    UciOk,
    ReadyOk,
    BestMove { mv: Move, ponder: Option<Move> },
    Info(UciInfo),
    /// A line the parser doesn't assign meaning to (`info string`, copyright
    /// banners, etc). Not an error — engines emit plenty of these.
    Unrecognized,
}

/// The subset of an `info` line's fields the adapter cares about: depth
/// reached, the score for that depth, and the principal variation.
#[derive(Debug, Clone, Default)]
pub struct UciInfo {
    pub depth: Option<u32>,
    pub score: Option<Score>,
    pub pv: Vec<Move>,
}

pub fn parse_uci_message(line: &str) -> Result<UciMessage, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.first().copied() {
        Some("uciok") => Ok(UciMessage::UciOk),
        Some("readyok") => Ok(UciMessage::ReadyOk),
        Some("id") => {
            if tokens.len() < 3 {
                return Ok(UciMessage::Unrecognized);
            }
            Ok(UciMessage::Id {
                name: tokens[1].to_string(),
                value: tokens[2..].join(" "),
            })
        }
        Some("bestmove") => {
            let Some(mv_str) = tokens.get(1) else {
                return Err(UciError::MalformedMessage(line.to_string()));
            };
            if *mv_str == "(none)" {
                return Err(UciError::InvalidMove("no legal moves".to_string()));
            }
            let mv = parse_long_algebraic(mv_str)
                .map_err(|e| UciError::InvalidMove(e.to_string()))?;
            let ponder = if tokens.len() >= 4 && tokens[2] == "ponder" && tokens[3] != "(none)" {
                Some(
                    parse_long_algebraic(tokens[3])
                        .map_err(|e| UciError::InvalidMove(e.to_string()))?,
                )
            } else {
                None
            };
            Ok(UciMessage::BestMove { mv, ponder })
        }
        Some("info") => Ok(UciMessage::Info(parse_info_line(&tokens[1..]))),
        _ => Ok(UciMessage::Unrecognized),
    }
}

fn parse_info_line(tokens: &[&str]) -> UciInfo {
    let mut info = UciInfo::default();
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                info.depth = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "score" => {
                i += 1;
                if let Some(&kind) = tokens.get(i) {
                    i += 1;
                    if let Some(value_str) = tokens.get(i) {
                        info.score = match kind {
                            "cp" => value_str.parse().ok().map(Score::Centipawns),
                            "mate" => value_str.parse().ok().map(Score::Mate),
                            _ => None,
                        };
                    }
                }
            }
            "pv" => {
                i += 1;
                while i < tokens.len() && !is_info_keyword(tokens[i]) {
                    if let Ok(mv) = parse_long_algebraic(tokens[i]) {
                        info.pv.push(mv);
                    }
                    i += 1;
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    info
}

fn is_info_keyword(token: &str) -> bool {
    matches!(
        token,
        "depth"
            | "seldepth"
            | "time"
            | "nodes"
            | "score"
            | "pv"
            | "multipv"
            | "currmove"
            | "currmovenumber"
            | "hashfull"
            | "nps"
            | "tbhits"
            | "cpuload"
            | "string"
    )
}
