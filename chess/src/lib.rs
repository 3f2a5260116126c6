pub mod fen;
pub mod pgn;
pub mod score;
pub mod types;
pub mod uci;

pub use fen::{cache_key, format_fen, parse_fen, FenError};
pub use pgn::parser::{parse_pgn, GameResult, PgnError, PgnGame, PgnMove};
pub use pgn::san::{format_san, parse_san, SanError};
pub use score::{Score, SideRelativeEval, WhiteRelativeEval};
pub use types::{PieceColor, PieceKind};
pub use uci::{convert_uci_castling_to_cozy, format_uci_move, parse_uci_move};
