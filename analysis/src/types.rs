//! The §3 data model produced by a completed game analysis.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use chess::types::PieceColor;

use crate::board_analysis::{SquareControl, TacticalMotif};
use crate::classifier::ClassificationTag;

/// The four weakness buckets a blunder or mistake can be attributed to
/// (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaknessCategory {
    Tactical,
    Positional,
    Opening,
    Endgame,
}

/// One annotated ply of a game (§3 MoveAnnotation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveAnnotation {
    pub move_index: usize,
    pub side_to_move: PieceColor,
    pub long_algebraic: String,
    pub san: String,
    pub fen_before: String,
    pub fen_after: String,
    /// White-positive pawn evaluation before the move.
    pub evaluation_before: f64,
    /// White-positive pawn evaluation after the move.
    pub evaluation_after: f64,
    /// `evaluation_after - evaluation_before`, white-positive (§3 invariant).
    pub evaluation_change: f64,
    pub classification: ClassificationTag,
    pub was_best_move: bool,
    pub engine_best_move: String,
    pub tactical_motifs: Vec<TacticalMotif>,
    pub square_control_before: SquareControl,
    pub square_control_after: SquareControl,
    pub improvement_suggestion: Option<String>,
}

/// The complete analysis of one game (§3 GameAnalysis).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameAnalysis {
    pub game_id: String,
    pub move_count: usize,
    pub annotations: Vec<MoveAnnotation>,
    pub weaknesses: HashMap<WeaknessCategory, Vec<usize>>,
    /// Move indices whose white-positive `|Δ|` crossed the critical-swing
    /// threshold (§4.7).
    pub critical_positions: Vec<usize>,
    pub transaction_successful: bool,
    pub error: Option<String>,
}

impl GameAnalysis {
    /// Verify the chain-integrity invariant from §3/§8: each annotation's
    /// `fen_after` must equal the next annotation's `fen_before`.
    pub fn chain_is_intact(&self) -> bool {
        self.annotations
            .windows(2)
            .all(|pair| pair[0].fen_after == pair[1].fen_before)
    }
}
