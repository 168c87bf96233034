//! Numeric annotation glyphs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized NAG code (`$1` = `!`, `$2` = `?`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nag(pub u8);

/// Inline glyphs accepted as move suffixes and their codes.
const INLINE_GLYPHS: &[(&str, u8)] = &[
    ("!", 1),
    ("?", 2),
    ("!!", 3),
    ("??", 4),
    ("!?", 5),
    ("?!", 6),
];

impl Nag {
    pub const GOOD_MOVE: Nag = Nag(1);
    pub const MISTAKE: Nag = Nag(2);
    pub const BRILLIANT_MOVE: Nag = Nag(3);
    pub const BLUNDER: Nag = Nag(4);
    pub const SPECULATIVE_MOVE: Nag = Nag(5);
    pub const DUBIOUS_MOVE: Nag = Nag(6);

    /// Parse the digits of a `$N` token. Codes above 255 are not NAGs.
    pub fn from_digits(digits: &str) -> Option<Nag> {
        digits.parse().ok().map(Nag)
    }

    pub fn from_glyph(glyph: &str) -> Option<Nag> {
        INLINE_GLYPHS
            .iter()
            .find(|(g, _)| *g == glyph)
            .map(|(_, code)| Nag(*code))
    }

    /// Inline glyph for this code, if it has one.
    pub fn glyph(self) -> Option<&'static str> {
        INLINE_GLYPHS
            .iter()
            .find(|(_, code)| *code == self.0)
            .map(|(g, _)| *g)
    }
}

impl fmt::Display for Nag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.glyph() {
            Some(glyph) => f.write_str(glyph),
            None => write!(f, "${}", self.0),
        }
    }
}

/// Split an inline glyph suffix (one or two of `!`/`?`) off a move token.
///
/// Returns the bare move text and the resolved NAG. A suffix that is not one
/// of the six accepted glyphs is left on the move.
pub fn split_inline_glyph(token: &str) -> (&str, Option<Nag>) {
    let bare = token.trim_end_matches(['!', '?']);
    let suffix = &token[bare.len()..];
    if suffix.is_empty() {
        return (token, None);
    }
    match Nag::from_glyph(suffix) {
        Some(nag) => (bare, Some(nag)),
        None => (token, None),
    }
}
