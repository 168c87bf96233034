//! Interactive puzzle solving over a flat solution line.

use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{LegalityEngine, MoveInput, PromotionPiece, ShakmatyEngine, Side};
use crate::parser::{BlockKind, ParsedResult};
use crate::tree::MoveNode;

/// A move the user tried that was legal but not the solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrongAttempt {
    /// Solution ply the attempt was made at.
    pub ply: usize,
    pub san: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleFeedback {
    /// Right move; the opponent's reply (if any) was played.
    Correct { reply: Option<String> },
    /// Right move and the solution is complete.
    Solved,
    /// Legal, but not the solution. The position is unchanged.
    Incorrect { san: String },
    /// Not a legal move.
    Illegal,
    /// The move is a pawn promotion; answer with
    /// [`PuzzleSession::resolve_promotion`].
    PromotionRequired,
    /// Ignored while a promotion choice is outstanding.
    Rejected,
    /// The puzzle is already solved.
    Finished,
}

#[derive(Debug, Clone)]
struct PendingPromotion {
    from: String,
    to: String,
}

/// Walks a puzzle's solution as the user plays it. Wrong moves are recorded
/// on the session, never merged into the solution.
#[derive(Debug)]
pub struct PuzzleSession<E = ShakmatyEngine> {
    base_fen: String,
    solution: Vec<MoveNode>,
    solver: Side,
    /// Solution plies played so far.
    ply: usize,
    engine: E,
    wrong_attempts: Vec<WrongAttempt>,
    pending_promotion: Option<PendingPromotion>,
}

/// SAN without check/mate suffixes, so `Qxf7` and `Qxf7#` compare equal.
fn bare_san(san: &str) -> &str {
    san.trim_end_matches(['+', '#'])
}

impl PuzzleSession<ShakmatyEngine> {
    pub fn new(result: &ParsedResult) -> Option<Self> {
        Self::with_engine(result)
    }
}

impl<E: LegalityEngine + Default> PuzzleSession<E> {
    /// Session for a successfully parsed puzzle; `None` for anything else.
    pub fn with_engine(result: &ParsedResult) -> Option<Self> {
        if result.kind != BlockKind::Puzzle || !result.is_ok() {
            return None;
        }
        let mut session = Self {
            base_fen: result.start_fen().to_string(),
            solution: result.solution.clone(),
            solver: result.puzzle.solver?,
            ply: 0,
            engine: E::default(),
            wrong_attempts: Vec::new(),
            pending_promotion: None,
        };
        session.reset();
        Some(session)
    }

    /// Back to the start (opening opponent move replayed). Wrong attempts are
    /// kept.
    pub fn reset(&mut self) {
        self.engine.load(&self.base_fen);
        self.ply = 0;
        self.pending_promotion = None;
        if self.engine.turn() != self.solver {
            self.play_opponent();
        }
    }

    fn play_opponent(&mut self) -> Option<String> {
        let expected = self.solution.get(self.ply)?;
        let record = self.engine.play(&MoveInput::text(expected.san.as_str()), true)?;
        self.ply += 1;
        debug!(san = %record.san, ply = self.ply, "Opponent reply");
        Some(record.san)
    }

    /// Submit the solver's move. A promotion without a piece is held until
    /// [`resolve_promotion`](Self::resolve_promotion) or
    /// [`cancel_promotion`](Self::cancel_promotion).
    pub fn submit(&mut self, from: &str, to: &str, promotion: Option<PromotionPiece>) -> PuzzleFeedback {
        if self.is_solved() {
            return PuzzleFeedback::Finished;
        }
        if self.pending_promotion.is_some() {
            debug!(from, to, "Move ignored while a promotion choice is pending");
            return PuzzleFeedback::Rejected;
        }
        if promotion.is_none() && self.engine.is_promotion(from, to) {
            self.pending_promotion = Some(PendingPromotion {
                from: from.to_string(),
                to: to.to_string(),
            });
            return PuzzleFeedback::PromotionRequired;
        }
        self.play_solver(from, to, promotion)
    }

    /// Finish a pending promotion. A dismissed prompt (`None`) promotes to a
    /// queen.
    pub fn resolve_promotion(&mut self, choice: Option<PromotionPiece>) -> PuzzleFeedback {
        let Some(pending) = self.pending_promotion.take() else {
            return PuzzleFeedback::Rejected;
        };
        let piece = choice.unwrap_or(PromotionPiece::Queen);
        self.play_solver(&pending.from, &pending.to, Some(piece))
    }

    pub fn cancel_promotion(&mut self) {
        self.pending_promotion = None;
    }

    pub fn has_pending_promotion(&self) -> bool {
        self.pending_promotion.is_some()
    }

    fn play_solver(&mut self, from: &str, to: &str, promotion: Option<PromotionPiece>) -> PuzzleFeedback {
        let Some(record) = self.engine.play(&MoveInput::squares(from, to, promotion), false) else {
            return PuzzleFeedback::Illegal;
        };

        let expected = &self.solution[self.ply];
        if bare_san(&record.san) != bare_san(&expected.san) {
            self.engine.undo();
            debug!(tried = %record.san, expected = %expected.san, "Wrong puzzle move");
            self.wrong_attempts.push(WrongAttempt {
                ply: self.ply,
                san: record.san.clone(),
            });
            return PuzzleFeedback::Incorrect { san: record.san };
        }

        self.ply += 1;
        if self.is_solved() {
            info!(wrong = self.wrong_attempts.len(), "Puzzle solved");
            return PuzzleFeedback::Solved;
        }
        let reply = self.play_opponent();
        if self.is_solved() {
            info!(wrong = self.wrong_attempts.len(), "Puzzle solved");
            return PuzzleFeedback::Solved;
        }
        PuzzleFeedback::Correct { reply }
    }

    /// Origin square of the move the solver should play next.
    pub fn hint(&self) -> Option<&str> {
        if self.is_solved() {
            return None;
        }
        self.solution.get(self.ply).map(|node| node.from.as_str())
    }

    pub fn is_solved(&self) -> bool {
        self.ply >= self.solution.len()
    }

    pub fn fen(&self) -> String {
        self.engine.fen()
    }

    pub fn solver(&self) -> Side {
        self.solver
    }

    pub fn ply(&self) -> usize {
        self.ply
    }

    pub fn wrong_attempts(&self) -> &[WrongAttempt] {
        &self.wrong_attempts
    }

    pub fn solution(&self) -> &[MoveNode] {
        &self.solution
    }
}
