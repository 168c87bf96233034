//! Puzzle finalization: solving side and default orientation from a flat
//! solution line.

pub mod session;

use serde::Serialize;
use tracing::debug;

use crate::engine::Side;
use crate::error::ParseError;
use crate::fen::turn_and_fullmove;
use crate::parser::ParsedResult;
use crate::tree::MoveNode;

/// Puzzle metadata collected from markers and the solution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PuzzleMeta {
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub themes: Vec<String>,
    /// Side the user plays; set once the solution is known.
    pub solver: Option<Side>,
}

/// The side solving a puzzle of `plies` moves whose base position has
/// `to_move` on move. An even-length solution opens with the opponent's move.
pub fn solving_side(to_move: Side, plies: usize) -> Side {
    if plies % 2 == 0 {
        to_move.other()
    } else {
        to_move
    }
}

/// Store the solution on `result`, derive the solver, and orient the board
/// towards the solver unless a marker already chose an orientation.
pub fn finalize_puzzle(result: &mut ParsedResult, solution: Vec<MoveNode>) -> Result<(), ParseError> {
    if solution.is_empty() {
        return Err(ParseError::PuzzleWithoutMoves);
    }

    let (to_move, _) = turn_and_fullmove(result.start_fen());
    let solver = solving_side(to_move, solution.len());
    debug!(plies = solution.len(), ?solver, "Finalized puzzle");

    result.puzzle.solver = Some(solver);
    if !result.orientation_explicit {
        result.orientation = solver;
    }
    result.solution = solution;
    Ok(())
}
