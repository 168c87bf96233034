//! FEN detection, normalization and validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::engine::{LegalityEngine, ShakmatyEngine};

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Defaults for the side-to-move, castling, en-passant, halfmove and fullmove
/// fields, in FEN order.
const FIELD_DEFAULTS: [&str; 5] = ["w", "-", "-", "0", "1"];

static BOARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[pnbrqkPNBRQK1-8]+/){7}[pnbrqkPNBRQK1-8]+$").expect("board pattern is valid")
});

/// Whether `token` looks like the board field of a FEN: exactly eight
/// `/`-separated ranks made of piece letters and digits 1-8.
pub fn looks_like_board(token: &str) -> bool {
    BOARD_RE.is_match(token)
}

/// Fill missing trailing FEN fields with defaults.
///
/// A string whose first field does not split into exactly eight ranks, or
/// which has more than six fields, is returned unchanged so that validation
/// rejects it.
pub fn normalize_fen(fen: &str) -> String {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    let Some(board) = fields.first() else {
        return fen.to_string();
    };
    if board.split('/').count() != 8 || fields.len() > 6 {
        return fen.to_string();
    }

    let present = fields.len();
    let mut normalized = fields;
    normalized.extend(FIELD_DEFAULTS.iter().skip(present - 1).copied());
    normalized.join(" ")
}

/// Whether the legality engine accepts `fen` as a position.
pub fn is_valid_fen(fen: &str) -> bool {
    ShakmatyEngine::new().load(fen)
}

/// `(side to move, fullmove number)` read from a FEN, with the FEN defaults
/// for missing or malformed fields.
pub(crate) fn turn_and_fullmove(fen: &str) -> (crate::Side, u32) {
    let mut fields = fen.split_whitespace().skip(1);
    let side = fields
        .next()
        .and_then(crate::Side::from_fen_field)
        .unwrap_or(crate::Side::White);
    let fullmove = fields.nth(3).and_then(|f| f.parse().ok()).unwrap_or(1);
    (side, fullmove)
}
