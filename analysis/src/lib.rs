pub mod analyzer;
pub mod board_analysis;
pub mod classifier;
pub mod types;

pub use analyzer::{AnalysisError, AnalyzerConfig, GameAnalyzer};
pub use board_analysis::{detect_tactics, MotifKind, SquareControl, TacticalContext, TacticalMotif};
pub use classifier::{classify, ClassificationTag};
pub use types::{GameAnalysis, MoveAnnotation, WeaknessCategory};
