//! Interactive chess blocks.
//!
//! A block is a piece of document text holding bracket markers, optional PGN
//! headers, and either a FEN position or move text with comments, glyphs and
//! nested variations. `parse_block()` turns it into a [`ParsedResult`]; a
//! [`Navigator`] then walks and extends the move tree, and a
//! [`PuzzleSession`] plays through puzzle solutions.

pub mod annotations;
pub mod autoplay;
pub mod builder;
pub mod classify;
pub mod engine;
pub mod error;
pub mod fen;
pub mod markers;
pub mod nag;
pub mod navigator;
pub mod parser;
pub mod puzzle;
pub mod serializer;
pub mod tokenizer;
pub mod tree;

pub use annotations::{Annotations, Arrow, SquareMark};
pub use autoplay::Autoplay;
pub use engine::{LegalityEngine, MoveInput, MoveRecord, PromotionPiece, ShakmatyEngine, Side};
pub use error::ParseError;
pub use nag::Nag;
pub use navigator::{BoardUpdate, BoardView, Cursor, Frame, MoveOutcome, Navigator};
pub use parser::{parse_block, BlockKind, ParseOptions, ParsedResult};
pub use puzzle::session::{PuzzleFeedback, PuzzleSession, WrongAttempt};
pub use puzzle::PuzzleMeta;
pub use serializer::{export_text, serialize_moves, serialize_tree};
pub use tree::{LineId, MoveNode, MoveTree, NodeId};
