//! Block parser: markers, classification, tokenizing and tree building in one
//! pass, producing a [`ParsedResult`].

use serde::Serialize;
use tracing::{debug, info};

use crate::annotations::Annotations;
use crate::builder::{build_flat_line, build_tree};
use crate::classify::{classify, ChessData, Headers};
use crate::engine::Side;
use crate::error::ParseError;
use crate::fen::{is_valid_fen, normalize_fen, STANDARD_START_FEN};
use crate::markers::{interpret_markers, scan_markers, MarkerDirectives};
use crate::puzzle::{finalize_puzzle, PuzzleMeta};
use crate::tokenizer::{tokenize, Token};
use crate::tree::{MoveNode, MoveTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Game,
    Puzzle,
    Fen,
}

/// Host settings that apply when a block carries no marker for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub default_editable: bool,
    pub default_orientation: Side,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_editable: true,
            default_orientation: Side::White,
        }
    }
}

/// Everything parsed out of one block.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedResult {
    pub kind: BlockKind,
    pub base_fen: Option<String>,
    pub move_text: Option<String>,
    /// Game tree (empty for puzzles and positions).
    pub tree: MoveTree,
    /// Puzzle solution (empty for games and positions).
    pub solution: Vec<MoveNode>,
    pub orientation: Side,
    /// Whether a marker chose the orientation.
    pub orientation_explicit: bool,
    pub editable: bool,
    pub static_board: bool,
    pub puzzle: PuzzleMeta,
    pub headers: Headers,
    /// Block-level overlays from markers.
    pub overlays: Annotations,
    pub ply_offset: usize,
    pub error: Option<ParseError>,
    pub warnings: Vec<String>,
    /// The input as given, for error display.
    pub raw: String,
}

impl ParsedResult {
    fn from_directives(raw: &str, directives: MarkerDirectives, options: &ParseOptions) -> Self {
        Self {
            kind: if directives.puzzle {
                BlockKind::Puzzle
            } else {
                BlockKind::Game
            },
            base_fen: None,
            move_text: None,
            tree: MoveTree::new(),
            solution: Vec::new(),
            orientation: directives.orientation.unwrap_or(options.default_orientation),
            orientation_explicit: directives.orientation.is_some(),
            editable: directives.editable.unwrap_or(options.default_editable),
            static_board: directives.static_board,
            puzzle: PuzzleMeta {
                rating: directives.rating,
                title: directives.title,
                themes: directives.themes,
                solver: None,
            },
            headers: Headers::default(),
            overlays: directives.overlays,
            ply_offset: directives.ply_offset,
            error: None,
            warnings: Vec::new(),
            raw: raw.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Position the moves start from.
    pub fn start_fen(&self) -> &str {
        self.base_fen.as_deref().unwrap_or(STANDARD_START_FEN)
    }
}

/// Parse one block of document text.
pub fn parse_block(input: &str, options: &ParseOptions) -> ParsedResult {
    let (marker_lines, data) = scan_markers(input);
    let directives = interpret_markers(&marker_lines);
    let is_puzzle = directives.puzzle;
    let mut result = ParsedResult::from_directives(input, directives, options);

    if let Err(err) = parse_chess_data(&mut result, &data, is_puzzle) {
        debug!(error = %err, "Block failed to parse");
        result.error = Some(err);
    }
    result
}

fn normalized_valid_fen(raw: &str) -> Result<String, ParseError> {
    let fen = normalize_fen(raw.trim());
    if is_valid_fen(&fen) {
        Ok(fen)
    } else {
        Err(ParseError::InvalidFen { fen })
    }
}

fn parse_chess_data(result: &mut ParsedResult, data: &str, is_puzzle: bool) -> Result<(), ParseError> {
    if data.trim().is_empty() {
        return Err(ParseError::NoData);
    }

    match classify(data) {
        ChessData::Position(raw_fen) => {
            if is_puzzle {
                return Err(ParseError::PuzzleIsPosition);
            }
            result.kind = BlockKind::Fen;
            result.base_fen = Some(normalized_valid_fen(&raw_fen)?);
            Ok(())
        }
        ChessData::MoveText { text, headers, fen } => {
            result.headers = headers;
            if let Some(fen) = fen {
                result.base_fen = Some(normalized_valid_fen(&fen)?);
            }
            let tokens = tokenize(&text);
            if result.base_fen.is_none() && !tokens.iter().any(|t| matches!(t, Token::Move(_))) {
                return Err(ParseError::NoData);
            }
            result.move_text = Some(text.trim().to_string());

            if is_puzzle {
                let (solution, warnings) = build_flat_line(&tokens, result.start_fen());
                result.warnings = warnings;
                finalize_puzzle(result, solution)?;
                info!(plies = result.solution.len(), "Parsed puzzle");
            } else {
                let built = build_tree(&tokens, result.start_fen());
                result.tree = built.tree;
                result.warnings = built.warnings;
                info!(
                    moves = built.parsed_moves,
                    warnings = result.warnings.len(),
                    "Parsed game"
                );
            }
            Ok(())
        }
    }
}
