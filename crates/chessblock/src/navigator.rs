//! Navigation state machine over a parsed game tree.
//!
//! The cursor is `(line, index, frames)`: `index` counts plies played in
//! `line` (0 = its start position) and each [`Frame`] records a line we
//! branched out of and where to resume in it. Positions are always rebuilt by
//! replaying from the base position, through every frame, then the current
//! line.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::annotations::Annotations;
use crate::engine::{LegalityEngine, MoveInput, PromotionPiece, ShakmatyEngine};
use crate::error::ParseError;
use crate::parser::ParsedResult;
use crate::serializer::export_text;
use crate::tree::{LineId, MoveNode, MoveTree};

/// A line the cursor branched out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub line: LineId,
    /// Index to land on when returning to `line`: one past the node the
    /// variation is an alternative to.
    pub resume_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cursor {
    pub line: LineId,
    pub index: usize,
    /// Number of enclosing lines (0 on the main line).
    pub depth: usize,
}

/// Everything the board needs to redraw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardUpdate {
    pub fen: String,
    pub last_move: Option<(String, String)>,
    pub check: bool,
    /// `None` when the board is not editable.
    pub legal_destinations: Option<BTreeMap<String, Vec<String>>>,
    pub shapes: Annotations,
    pub cursor: Cursor,
}

/// The board widget (and any move list UI) the navigator drives.
pub trait BoardView {
    fn render(&mut self, update: &BoardUpdate);

    /// Ask the user to pick a promotion piece. The answer comes back through
    /// [`Navigator::resolve_promotion`] or [`Navigator::cancel_promotion`].
    fn request_promotion(&mut self, _from: &str, _to: &str) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move matched the next move of the current line.
    Advanced,
    /// The move matched the first move of an existing variation.
    EnteredVariation(LineId),
    /// The move started a new variation.
    CreatedVariation(LineId),
    /// The move was appended to the end of the current line.
    Extended,
    /// Waiting for a promotion piece.
    PromotionRequired,
    /// Ignored: board not editable, or a promotion choice is outstanding.
    Rejected,
    /// The engine refused the move.
    Illegal,
}

#[derive(Debug, Clone)]
struct PendingPromotion {
    from: String,
    to: String,
}

enum Continuation {
    Advance,
    EnterVariation(usize, LineId),
    Branch,
    Append,
}

#[derive(Debug)]
pub struct Navigator<B, E = ShakmatyEngine> {
    result: ParsedResult,
    board: B,
    engine: E,
    line: LineId,
    index: usize,
    frames: Vec<Frame>,
    /// Main-line index the block opens at.
    initial_index: usize,
    last_move: Option<(String, String)>,
    pending_promotion: Option<PendingPromotion>,
}

impl<B: BoardView> Navigator<B, ShakmatyEngine> {
    pub fn new(result: ParsedResult, board: B) -> Result<Self, ParseError> {
        Self::with_engine(result, board)
    }
}

impl<B: BoardView, E: LegalityEngine + Default> Navigator<B, E> {
    /// Take ownership of a parse result and show its opening position (the
    /// requested ply offset, clamped to the main line). A result carrying a
    /// fatal error is handed back as that error; nothing is rendered.
    pub fn with_engine(result: ParsedResult, board: B) -> Result<Self, ParseError> {
        if let Some(err) = &result.error {
            return Err(err.clone());
        }
        let initial_index = result.ply_offset.min(result.tree.line_len(LineId::ROOT));
        let mut nav = Self {
            result,
            board,
            engine: E::default(),
            line: LineId::ROOT,
            index: 0,
            frames: Vec::new(),
            initial_index,
            last_move: None,
            pending_promotion: None,
        };
        nav.go_to_move(initial_index);
        Ok(nav)
    }

    pub fn result(&self) -> &ParsedResult {
        &self.result
    }

    pub fn tree(&self) -> &MoveTree {
        &self.result.tree
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn cursor(&self) -> Cursor {
        Cursor {
            line: self.line,
            index: self.index,
            depth: self.depth(),
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn current_fen(&self) -> String {
        self.engine.fen()
    }

    /// Node the cursor sits after, if any.
    pub fn current_node(&self) -> Option<&MoveNode> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.result.tree.node_at(self.line, i))
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.result.tree.line_len(self.line)
    }

    pub fn has_pending_promotion(&self) -> bool {
        self.pending_promotion.is_some()
    }

    /// Headers and move text for the clipboard, including any moves played
    /// during the session.
    pub fn export_text(&self) -> String {
        export_text(&self.result)
    }

    fn reload_base(&mut self) {
        self.engine = E::default();
        if !self.engine.load(self.result.start_fen()) {
            warn!(fen = %self.result.start_fen(), "Engine rejected base position");
        }
    }

    /// Move to `index` in the current line and redraw. Returns the index
    /// actually reached, which is smaller than requested if replay failed.
    /// If an enclosing line fails to replay, the cursor falls back to the
    /// start of the main line.
    pub fn go_to_move(&mut self, index: usize) -> usize {
        let target = index.min(self.result.tree.line_len(self.line));
        self.reload_base();

        let tree = &self.result.tree;
        let mut last_move = None;
        let mut reached = target;
        let mut ancestor_failed = false;
        'replay: {
            for frame in &self.frames {
                let plies = frame.resume_index.saturating_sub(1);
                for node in tree.line_nodes(frame.line).take(plies) {
                    match self.engine.play(&MoveInput::text(node.san.as_str()), true) {
                        Some(record) => last_move = Some((record.from, record.to)),
                        None => {
                            warn!(san = %node.san, line = frame.line.0, "Replay failed in enclosing line");
                            ancestor_failed = true;
                            break 'replay;
                        }
                    }
                }
            }
            for (i, node) in tree.line_nodes(self.line).take(target).enumerate() {
                match self.engine.play(&MoveInput::text(node.san.as_str()), true) {
                    Some(record) => last_move = Some((record.from, record.to)),
                    None => {
                        warn!(san = %node.san, ply = i, "Replay failed, truncating");
                        reached = i;
                        break 'replay;
                    }
                }
            }
        }

        if ancestor_failed {
            self.frames.clear();
            self.line = LineId::ROOT;
            self.reload_base();
            reached = 0;
            last_move = None;
        }

        self.index = reached;
        self.last_move = last_move;
        self.sync_board();
        reached
    }

    pub fn go_forward(&mut self) -> usize {
        if self.is_at_end() {
            return self.index;
        }
        self.go_to_move(self.index + 1)
    }

    /// One ply back. At the start of a variation this leaves it for the
    /// enclosing line.
    pub fn go_back(&mut self) -> usize {
        if self.index <= 1 && !self.frames.is_empty() {
            return self.exit_variation();
        }
        self.go_to_move(self.index.saturating_sub(1))
    }

    pub fn go_to_start(&mut self) -> usize {
        if self.index <= 1 && !self.frames.is_empty() {
            return self.exit_variation();
        }
        self.go_to_move(0)
    }

    pub fn go_to_end(&mut self) -> usize {
        self.go_to_move(self.result.tree.line_len(self.line))
    }

    fn exit_variation(&mut self) -> usize {
        match self.frames.pop() {
            Some(frame) => {
                debug!(line = frame.line.0, resume = frame.resume_index, "Leaving variation");
                self.line = frame.line;
                self.go_to_move(frame.resume_index)
            }
            None => self.go_to_move(0),
        }
    }

    /// Rebuild the frame stack so that `line` is current.
    fn set_path_to(&mut self, line: LineId) -> Option<()> {
        let path = self.result.tree.path_to(line)?;
        self.frames = path
            .into_iter()
            .map(|(parent, move_index, _)| Frame {
                line: parent,
                resume_index: move_index + 1,
            })
            .collect();
        self.line = line;
        Some(())
    }

    fn enter_variation(&mut self, parent_line: LineId, move_index: usize, variation_index: usize) -> Option<LineId> {
        let variation = *self
            .result
            .tree
            .node_at(parent_line, move_index)?
            .variations
            .get(variation_index)?;
        if parent_line != self.line {
            self.set_path_to(parent_line)?;
        }
        self.frames.push(Frame {
            line: parent_line,
            resume_index: move_index + 1,
        });
        self.line = variation;
        Some(variation)
    }

    /// Enter variation `variation_index` of the node at `move_index` of
    /// `parent_line`, at its start position. `None` if it does not exist.
    pub fn go_to_variation(&mut self, parent_line: LineId, move_index: usize, variation_index: usize) -> Option<usize> {
        self.enter_variation(parent_line, move_index, variation_index)?;
        Some(self.go_to_move(0))
    }

    /// Jump to `index` of any line in the tree. `None` if the line is not in
    /// the tree.
    pub fn go_to_move_in_line(&mut self, line: LineId, index: usize) -> Option<usize> {
        if line != self.line {
            self.set_path_to(line)?;
        }
        Some(self.go_to_move(index))
    }

    /// A move made on the board.
    pub fn handle_user_move(&mut self, from: &str, to: &str, promotion: Option<PromotionPiece>) -> MoveOutcome {
        if self.pending_promotion.is_some() {
            debug!(from, to, "Move ignored while a promotion choice is pending");
            return MoveOutcome::Rejected;
        }
        if !self.result.editable || self.result.static_board {
            self.sync_board();
            return MoveOutcome::Rejected;
        }
        if promotion.is_none() && self.engine.is_promotion(from, to) {
            self.pending_promotion = Some(PendingPromotion {
                from: from.to_string(),
                to: to.to_string(),
            });
            self.board.request_promotion(from, to);
            return MoveOutcome::PromotionRequired;
        }
        self.complete_move(from, to, promotion)
    }

    /// Finish a pending promotion. A dismissed prompt (`None`) promotes to a
    /// queen.
    pub fn resolve_promotion(&mut self, choice: Option<PromotionPiece>) -> MoveOutcome {
        let Some(pending) = self.pending_promotion.take() else {
            return MoveOutcome::Rejected;
        };
        let piece = choice.unwrap_or(PromotionPiece::Queen);
        self.complete_move(&pending.from, &pending.to, Some(piece))
    }

    /// Abandon a pending promotion; the board is resynced to the unchanged
    /// position.
    pub fn cancel_promotion(&mut self) {
        if self.pending_promotion.take().is_some() {
            self.sync_board();
        }
    }

    fn complete_move(&mut self, from: &str, to: &str, promotion: Option<PromotionPiece>) -> MoveOutcome {
        let Some(record) = self.engine.play(&MoveInput::squares(from, to, promotion), false) else {
            debug!(from, to, "Illegal board move");
            self.sync_board();
            return MoveOutcome::Illegal;
        };
        let fen = self.engine.fen();
        let (line, index) = (self.line, self.index);
        let tree = &self.result.tree;

        let continuation = match tree.node_at(line, index) {
            None => Continuation::Append,
            Some(next) if next.san == record.san => Continuation::Advance,
            Some(next) => next
                .variations
                .iter()
                .position(|&v| tree.node_at(v, 0).is_some_and(|first| first.san == record.san))
                .map(|vi| Continuation::EnterVariation(vi, next.variations[vi]))
                .unwrap_or(Continuation::Branch),
        };

        match continuation {
            Continuation::Advance => {
                self.go_to_move(index + 1);
                MoveOutcome::Advanced
            }
            Continuation::EnterVariation(vi, variation) => {
                self.enter_variation(line, index, vi);
                self.go_to_move(1);
                MoveOutcome::EnteredVariation(variation)
            }
            Continuation::Branch => {
                let Some(variation) = self.result.tree.add_variation(line, index, MoveNode::new(record, fen)) else {
                    self.sync_board();
                    return MoveOutcome::Illegal;
                };
                debug!(line = line.0, index, variation = variation.0, "Created variation");
                self.frames.push(Frame {
                    line,
                    resume_index: index + 1,
                });
                self.line = variation;
                self.go_to_move(1);
                MoveOutcome::CreatedVariation(variation)
            }
            Continuation::Append => {
                if self.result.tree.push_move(line, MoveNode::new(record, fen)).is_none() {
                    self.sync_board();
                    return MoveOutcome::Illegal;
                }
                self.go_to_move(index + 1);
                MoveOutcome::Extended
            }
        }
    }

    /// Push the current position to the board.
    fn sync_board(&mut self) {
        let mut shapes = self
            .current_node()
            .map(|node| node.annotations.clone())
            .unwrap_or_default();
        if self.frames.is_empty() && self.line == LineId::ROOT && self.index == self.initial_index {
            shapes.merge(self.result.overlays.clone());
        }

        let editable = self.result.editable && !self.result.static_board;
        let update = BoardUpdate {
            fen: self.engine.fen(),
            last_move: self.last_move.clone(),
            check: self.engine.is_check(),
            legal_destinations: editable.then(|| self.engine.legal_destinations()),
            shapes,
            cursor: self.cursor(),
        };
        self.board.render(&update);
    }
}
