//! The tactical motif vocabulary (§3 TacticalMotif, §4.5): the four
//! recognized patterns and the shape every detector emits.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotifKind {
    Fork,
    Pin,
    Skewer,
    DiscoveredCheck,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticalMotif {
    pub kind: MotifKind,
    /// Identifier of the attacking piece, e.g. "N" for knight.
    pub attacking_piece: String,
    /// Square the attacking piece stands on after the move.
    pub piece_square: String,
    /// Squares of the pieces the motif targets.
    pub target_squares: Vec<String>,
    /// The move, in long algebraic notation, that produced this motif.
    pub mv: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tactical_motif_round_trip_serialization() {
        let motif = TacticalMotif {
            kind: MotifKind::Fork,
            attacking_piece: "N".to_string(),
            piece_square: "f6".to_string(),
            target_squares: vec!["e8".to_string(), "d7".to_string()],
            mv: "g4f6".to_string(),
            description: "Knight on f6 forks the king on e8 and rook on d7".to_string(),
        };

        let serialized = serde_json::to_string(&motif).expect("serialize tactical motif");
        let restored: TacticalMotif =
            serde_json::from_str(&serialized).expect("deserialize tactical motif");

        assert_eq!(motif, restored);
    }
}
