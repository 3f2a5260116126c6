//! The Move Classifier (§4.6): maps a perspective-adjusted evaluation delta
//! to a coarse quality tag. Perspective handling itself lives in
//! `chess::score` — this module only ever sees the mover-relative pawn
//! delta, already negated for black by the caller.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationTag {
    Blunder,
    Mistake,
    Inaccuracy,
    Good,
    Great,
    Excellent,
}

impl ClassificationTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blunder => "blunder",
            Self::Mistake => "mistake",
            Self::Inaccuracy => "inaccuracy",
            Self::Good => "good",
            Self::Great => "great",
            Self::Excellent => "excellent",
        }
    }

    pub fn is_weakness(self) -> bool {
        matches!(self, Self::Blunder | Self::Mistake)
    }
}

/// Classify a perspective-adjusted delta in pawns, positive meaning the
/// mover improved their own position (§4.6 table).
pub fn classify(delta_pawns: f64) -> ClassificationTag {
    if delta_pawns < -2.0 {
        ClassificationTag::Blunder
    } else if delta_pawns < -1.0 {
        ClassificationTag::Mistake
    } else if delta_pawns < -0.5 {
        ClassificationTag::Inaccuracy
    } else if delta_pawns < 0.1 {
        ClassificationTag::Good
    } else if delta_pawns < 0.5 {
        ClassificationTag::Great
    } else {
        ClassificationTag::Excellent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_band() {
        assert_eq!(classify(-3.0), ClassificationTag::Blunder);
        assert_eq!(classify(-2.0), ClassificationTag::Mistake);
        assert_eq!(classify(-1.5), ClassificationTag::Mistake);
        assert_eq!(classify(-1.0), ClassificationTag::Inaccuracy);
        assert_eq!(classify(-0.7), ClassificationTag::Inaccuracy);
        assert_eq!(classify(-0.5), ClassificationTag::Good);
        assert_eq!(classify(0.0), ClassificationTag::Good);
        assert_eq!(classify(0.1), ClassificationTag::Great);
        assert_eq!(classify(0.4), ClassificationTag::Great);
        assert_eq!(classify(0.5), ClassificationTag::Excellent);
        assert_eq!(classify(5.0), ClassificationTag::Excellent);
    }

    #[test]
    fn boundary_values_fall_on_the_lower_band() {
        // Half-open bands: the lower bound belongs to the higher-scoring tag.
        assert_eq!(classify(-2.0), ClassificationTag::Mistake);
        assert_eq!(classify(-1.0), ClassificationTag::Inaccuracy);
        assert_eq!(classify(-0.5), ClassificationTag::Good);
        assert_eq!(classify(0.1), ClassificationTag::Great);
        assert_eq!(classify(0.5), ClassificationTag::Excellent);
    }

    #[test]
    fn weakness_tags_are_blunder_and_mistake_only() {
        assert!(ClassificationTag::Blunder.is_weakness());
        assert!(ClassificationTag::Mistake.is_weakness());
        assert!(!ClassificationTag::Inaccuracy.is_weakness());
        assert!(!ClassificationTag::Good.is_weakness());
    }
}
