//! Evaluation scores, and the perspective-normalization wrapper directed by
//! the design notes: two separate evaluation values per move (white-positive
//! stored, mover-positive for classification) are the most error-prone area
//! of this kind of pipeline, so the two perspectives are distinct types and
//! conversion between them requires an explicit side-to-move.

use cozy_chess::Color;

/// Mate scores are reduced to this many centipawns when a caller needs a
/// single signed magnitude (e.g. for pawn-unit swing thresholds).
pub const MATE_CENTIPAWN_SENTINEL: i32 = 10_000;

/// An engine evaluation: either a centipawn score or a forced mate in N
/// (positive N favors the side the score is relative to).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    Mate(i32),
}

impl Score {
    pub fn is_mate(self) -> bool {
        matches!(self, Score::Mate(_))
    }

    /// Centipawns, with mate scores collapsed to the sentinel magnitude.
    pub fn to_centipawns(self) -> i32 {
        match self {
            Score::Centipawns(cp) => cp,
            Score::Mate(n) if n >= 0 => MATE_CENTIPAWN_SENTINEL,
            Score::Mate(_) => -MATE_CENTIPAWN_SENTINEL,
        }
    }

    /// Pawn units (centipawns / 100), with mate scores collapsed.
    pub fn to_pawns(self) -> f64 {
        self.to_centipawns() as f64 / 100.0
    }

    /// Flip perspective: a score relative to one side becomes the score
    /// relative to the other side.
    pub fn negate(self) -> Score {
        match self {
            Score::Centipawns(cp) => Score::Centipawns(-cp),
            Score::Mate(n) => Score::Mate(-n),
        }
    }
}

/// A score known to be relative to the side to move at the position it was
/// computed for. This is what a UCI engine reports natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideRelativeEval(Score);

/// A score known to be relative to White, regardless of who was to move.
/// This is the convention used for storage in `MoveAnnotation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhiteRelativeEval(Score);

impl SideRelativeEval {
    pub fn from_side_to_move_relative(score: Score) -> Self {
        Self(score)
    }

    pub fn raw(self) -> Score {
        self.0
    }

    /// Convert to White's perspective, given who was actually to move.
    pub fn to_white_positive(self, side_to_move: Color) -> WhiteRelativeEval {
        match side_to_move {
            Color::White => WhiteRelativeEval(self.0),
            Color::Black => WhiteRelativeEval(self.0.negate()),
        }
    }
}

impl WhiteRelativeEval {
    pub fn new(score: Score) -> Self {
        Self(score)
    }

    pub fn raw(self) -> Score {
        self.0
    }

    /// Convert back to side-to-move perspective, e.g. to classify a move
    /// from the mover's point of view.
    pub fn to_side_to_move_relative(self, side_to_move: Color) -> SideRelativeEval {
        match side_to_move {
            Color::White => SideRelativeEval(self.0),
            Color::Black => SideRelativeEval(self.0.negate()),
        }
    }

    pub fn to_pawns(self) -> f64 {
        self.0.to_pawns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_to_move_does_not_flip() {
        let side = SideRelativeEval::from_side_to_move_relative(Score::Centipawns(120));
        let white = side.to_white_positive(Color::White);
        assert_eq!(white.raw(), Score::Centipawns(120));
    }

    #[test]
    fn black_to_move_flips() {
        let side = SideRelativeEval::from_side_to_move_relative(Score::Centipawns(120));
        let white = side.to_white_positive(Color::Black);
        assert_eq!(white.raw(), Score::Centipawns(-120));
    }

    #[test]
    fn round_trip_is_identity() {
        let original = Score::Centipawns(-45);
        let side = SideRelativeEval::from_side_to_move_relative(original);
        let white = side.to_white_positive(Color::Black);
        let back = white.to_side_to_move_relative(Color::Black);
        assert_eq!(back.raw(), original);
    }

    #[test]
    fn mate_score_collapses_to_sentinel() {
        assert_eq!(Score::Mate(3).to_centipawns(), MATE_CENTIPAWN_SENTINEL);
        assert_eq!(Score::Mate(-2).to_centipawns(), -MATE_CENTIPAWN_SENTINEL);
        assert!(Score::Mate(1).is_mate());
        assert!(!Score::Centipawns(50).is_mate());
    }

    #[test]
    fn pawns_conversion_divides_by_100() {
        assert_eq!(Score::Centipawns(250).to_pawns(), 2.5);
    }
}
