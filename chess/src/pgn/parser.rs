//! Portable Game Notation parsing: mainline extraction only. Variations,
//! comments, and NAGs are recognized well enough to be skipped cleanly (per
//! §6) but are not retained beyond an optional per-move comment string.

use cozy_chess::Board;
use std::collections::HashMap;

use super::san::{parse_san, SanError};

/// A parsed PGN game.
#[derive(Debug, Clone)]
pub struct PgnGame {
    pub tags: HashMap<String, String>,
    pub moves: Vec<PgnMove>,
    pub result: GameResult,
}

/// A single mainline move with its board-legal form and display metadata.
#[derive(Debug, Clone)]
pub struct PgnMove {
    pub mv: cozy_chess::Move,
    pub san: String,
    pub comment: Option<String>,
    pub nags: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Ongoing,
}

impl GameResult {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "1-0" => Some(Self::WhiteWins),
            "0-1" => Some(Self::BlackWins),
            "1/2-1/2" => Some(Self::Draw),
            "*" => Some(Self::Ongoing),
            _ => None,
        }
    }
}

/// Parse a PGN string into tag pairs plus the replayed mainline.
///
/// The starting position is taken from the `FEN` tag when present (and
/// `SetUp` is `1`), otherwise the standard starting position. A parse
/// failure is always a bounded `PgnError`, never a panic, per §7's input
/// error contract.
pub fn parse_pgn(input: &str) -> Result<PgnGame, PgnError> {
    if input.trim().is_empty() {
        return Err(PgnError::InvalidFormat);
    }

    let (tags, movetext) = split_tags_and_movetext(input);

    let mut board = match tags.get("FEN") {
        Some(fen) => fen
            .parse::<Board>()
            .map_err(|_| PgnError::InvalidTag(fen.clone()))?,
        None => Board::default(),
    };

    let tokens = tokenize_movetext(&movetext);

    let mut moves = Vec::new();
    let mut result = GameResult::Ongoing;
    let mut pending_comment: Option<String> = None;

    for token in tokens {
        match token {
            Token::MoveNumber => continue,
            Token::Comment(text) => {
                pending_comment = Some(text);
            }
            Token::Nag(n) => {
                if let Some(last) = moves.last_mut() {
                    last.nags.push(n);
                }
            }
            Token::Result(r) => result = r,
            Token::San(san) => {
                let mv = parse_san(&board, &san)?;
                let mut new_board = board.clone();
                new_board.play(mv);
                moves.push(PgnMove {
                    mv,
                    san,
                    comment: pending_comment.take(),
                    nags: Vec::new(),
                });
                board = new_board;
            }
        }
    }

    Ok(PgnGame {
        tags,
        moves,
        result,
    })
}

fn split_tags_and_movetext(input: &str) -> (HashMap<String, String>, String) {
    let mut tags = HashMap::new();
    let mut rest_start = 0;
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'[' {
            break;
        }
        let Some(end) = input[i..].find(']') else {
            break;
        };
        let tag_body = &input[i + 1..i + end];
        if let Some((key, value)) = parse_tag_body(tag_body) {
            tags.insert(key, value);
        }
        i += end + 1;
        rest_start = i;
    }

    (tags, input[rest_start..].to_string())
}

fn parse_tag_body(body: &str) -> Option<(String, String)> {
    let body = body.trim();
    let space = body.find(char::is_whitespace)?;
    let key = body[..space].to_string();
    let value_part = body[space..].trim();
    let value = value_part.trim_matches('"').to_string();
    Some((key, value))
}

enum Token {
    MoveNumber,
    San(String),
    Comment(String),
    Nag(u8),
    Result(GameResult),
}

/// Tokenize movetext, stripping variations (parenthesized sub-lines) and
/// turning `{...}` comments and `$N` NAGs into their own tokens.
fn tokenize_movetext(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    let mut depth = 0usize;

    while i < chars.len() {
        let c = chars[i];

        if c == '(' {
            depth += 1;
            i += 1;
            continue;
        }
        if c == ')' {
            depth = depth.saturating_sub(1);
            i += 1;
            continue;
        }
        if depth > 0 {
            i += 1;
            continue;
        }

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '{' {
            let start = i + 1;
            let mut end = start;
            while end < chars.len() && chars[end] != '}' {
                end += 1;
            }
            let comment: String = chars[start..end].iter().collect();
            tokens.push(Token::Comment(comment.trim().to_string()));
            i = end + 1;
            continue;
        }

        if c == ';' {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        if c == '$' {
            let start = i + 1;
            let mut end = start;
            while end < chars.len() && chars[end].is_ascii_digit() {
                end += 1;
            }
            let nag: String = chars[start..end].iter().collect();
            if let Ok(n) = nag.parse() {
                tokens.push(Token::Nag(n));
            }
            i = end;
            continue;
        }

        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '(' && chars[i] != '{' {
            i += 1;
        }
        let word: String = chars[start..i].iter().collect();

        if let Some(result) = GameResult::from_token(&word) {
            tokens.push(Token::Result(result));
            continue;
        }

        if is_move_number(&word) {
            tokens.push(Token::MoveNumber);
            continue;
        }

        let san = word.trim_end_matches('.').to_string();
        if !san.is_empty() {
            tokens.push(Token::San(san));
        }
    }

    tokens
}

fn is_move_number(word: &str) -> bool {
    let digits = word.trim_end_matches('.');
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) && word.ends_with('.')
}

#[derive(Debug, thiserror::Error)]
pub enum PgnError {
    #[error("invalid PGN format")]
    InvalidFormat,
    #[error("invalid tag: {0}")]
    InvalidTag(String),
    #[error("SAN parse error: {0}")]
    SanError(#[from] SanError),
}
