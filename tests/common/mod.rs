#![allow(dead_code)]

use chessblock::{parse_block, BoardUpdate, BoardView, Navigator, ParseOptions, ParsedResult};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Board that keeps every update and promotion request it receives.
#[derive(Debug, Default)]
pub struct RecordingBoard {
    pub updates: Vec<BoardUpdate>,
    pub promotion_requests: Vec<(String, String)>,
}

impl RecordingBoard {
    pub fn last(&self) -> &BoardUpdate {
        self.updates.last().expect("board was rendered at least once")
    }
}

impl BoardView for RecordingBoard {
    fn render(&mut self, update: &BoardUpdate) {
        self.updates.push(update.clone());
    }

    fn request_promotion(&mut self, from: &str, to: &str) {
        self.promotion_requests.push((from.to_string(), to.to_string()));
    }
}

/// Parse with default host options.
pub fn parse(input: &str) -> ParsedResult {
    parse_block(input, &ParseOptions::default())
}

pub fn navigator(input: &str) -> Navigator<RecordingBoard> {
    Navigator::new(parse(input), RecordingBoard::default()).expect("block parses without errors")
}

/// SAN of every node in a line.
pub fn sans(result: &ParsedResult, line: chessblock::LineId) -> Vec<String> {
    result.tree.line_nodes(line).map(|n| n.san.clone()).collect()
}
