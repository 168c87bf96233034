//! Decides whether chess data is a bare position or move text, and pulls PGN
//! headers out of move text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::fen::looks_like_board;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#).expect("header pattern is valid"));

/// PGN tag pairs in first-seen order. A repeated key overwrites the value in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a block's chess data turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChessData {
    /// A bare position string (trimmed, not yet normalized).
    Position(String),
    /// Move text with its headers; `fen` is the raw `FEN` header if present.
    MoveText {
        text: String,
        headers: Headers,
        fen: Option<String>,
    },
}

/// Every `[Key "value"]` segment of `text`.
pub fn extract_headers(text: &str) -> Headers {
    let mut headers = Headers::default();
    for cap in HEADER_RE.captures_iter(text) {
        headers.insert(&cap[1], &cap[2]);
    }
    headers
}

pub fn has_headers(text: &str) -> bool {
    HEADER_RE.is_match(text)
}

/// Classify chess data. A bare position is recognised only when the text has
/// no header segments and its first token is a FEN board field.
pub fn classify(data: &str) -> ChessData {
    let detection = HEADER_RE.replace_all(data, " ");
    let first_token = detection.split_whitespace().next().unwrap_or("");

    if looks_like_board(first_token) && !has_headers(data) {
        return ChessData::Position(data.trim().to_string());
    }

    let headers = extract_headers(data);
    let fen = headers.get("FEN").map(str::to_string);
    ChessData::MoveText {
        text: data.to_string(),
        headers,
        fen,
    }
}
