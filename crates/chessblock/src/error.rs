//! Parse error types

use serde::Serialize;
use thiserror::Error;

/// Fatal problems with an input block. Any of these leaves the result without
/// a board; per-move problems are reported as warnings instead.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseError {
    #[error("No position or move data found")]
    NoData,

    #[error("Invalid FEN: {fen}")]
    InvalidFen { fen: String },

    #[error("Puzzle requires moves, not just a position")]
    PuzzleIsPosition,

    #[error("Puzzle has no valid moves")]
    PuzzleWithoutMoves,
}
