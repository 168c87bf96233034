//! Move legality engine seam and its shakmaty-backed implementation.
//!
//! The parser and navigator never apply chess rules themselves; every move goes
//! through a [`LegalityEngine`], one instance per line being built or replayed.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position, Role, Square};

/// Side to move / board orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Side from the side-to-move field of a FEN (`w` / `b`).
    pub fn from_fen_field(field: &str) -> Option<Side> {
        match field {
            "w" => Some(Side::White),
            "b" => Some(Side::Black),
            _ => None,
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

/// Piece a pawn may promote to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionPiece {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionPiece {
    pub fn from_char(c: char) -> Option<PromotionPiece> {
        match c.to_ascii_lowercase() {
            'q' => Some(PromotionPiece::Queen),
            'r' => Some(PromotionPiece::Rook),
            'b' => Some(PromotionPiece::Bishop),
            'n' => Some(PromotionPiece::Knight),
            _ => None,
        }
    }

    fn role(self) -> Role {
        match self {
            PromotionPiece::Queen => Role::Queen,
            PromotionPiece::Rook => Role::Rook,
            PromotionPiece::Bishop => Role::Bishop,
            PromotionPiece::Knight => Role::Knight,
        }
    }
}

/// A move as submitted to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveInput {
    /// Move text (SAN, or anything the permissive matcher accepts).
    Text(String),
    /// Board input: origin and destination squares.
    Squares {
        from: String,
        to: String,
        promotion: Option<PromotionPiece>,
    },
}

impl MoveInput {
    pub fn text(text: impl Into<String>) -> Self {
        MoveInput::Text(text.into())
    }

    pub fn squares(from: &str, to: &str, promotion: Option<PromotionPiece>) -> Self {
        MoveInput::Squares {
            from: from.to_string(),
            to: to.to_string(),
            promotion,
        }
    }
}

/// A move accepted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub san: String,
    pub from: String,
    pub to: String,
}

/// Chess rules as consumed by the parser and navigator. Illegal input is
/// reported as `None`/`false`, never as a panic.
pub trait LegalityEngine {
    /// Load a position. Returns false (leaving the engine unchanged) when the
    /// FEN is rejected.
    fn load(&mut self, fen: &str) -> bool;

    fn fen(&self) -> String;

    fn turn(&self) -> Side;

    /// Play a move. `permissive` accepts slightly malformed but unambiguous
    /// notation (long algebraic, missing or superfluous capture marks, ...).
    fn play(&mut self, input: &MoveInput, permissive: bool) -> Option<MoveRecord>;

    /// Origin square -> reachable destination squares.
    fn legal_destinations(&self) -> BTreeMap<String, Vec<String>>;

    fn undo(&mut self) -> Option<MoveRecord>;

    fn is_check(&self) -> bool;

    /// Whether moving from `from` to `to` is a legal pawn promotion (and so
    /// needs a promotion piece).
    fn is_promotion(&self, from: &str, to: &str) -> bool;
}

static LONG_ALGEBRAIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[KQRBNP]?([a-h][1-8])[-x]?([a-h][1-8])=?([QRBNqrbn])?[+#]?$")
        .expect("long algebraic pattern is valid")
});

/// [`LegalityEngine`] on top of `shakmaty`.
#[derive(Debug, Clone, Default)]
pub struct ShakmatyEngine {
    pos: Chess,
    history: Vec<(Chess, MoveRecord)>,
}

impl ShakmatyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine loaded from `fen`, or `None` if the position is rejected.
    pub fn from_fen(fen: &str) -> Option<Self> {
        let mut engine = Self::new();
        engine.load(fen).then_some(engine)
    }

    fn resolve(&self, input: &MoveInput, permissive: bool) -> Option<Move> {
        match input {
            MoveInput::Text(text) => {
                let text = text.trim();
                let strict = SanPlus::from_ascii(text.as_bytes())
                    .ok()
                    .and_then(|san| san.san.to_move(&self.pos).ok());
                if strict.is_some() || !permissive {
                    return strict;
                }
                self.resolve_sloppy(text)
            }
            MoveInput::Squares { from, to, promotion } => {
                self.find_by_squares(from, to, promotion.map(PromotionPiece::role))
            }
        }
    }

    fn resolve_sloppy(&self, text: &str) -> Option<Move> {
        let text = text.replace('0', "O");

        if let Ok(uci) = UciMove::from_ascii(text.as_bytes()) {
            if let Ok(mv) = uci.to_move(&self.pos) {
                return Some(mv);
            }
        }

        if let Some(caps) = LONG_ALGEBRAIC_RE.captures(&text) {
            let promotion = caps
                .get(3)
                .and_then(|m| m.as_str().chars().next())
                .and_then(PromotionPiece::from_char)
                .map(PromotionPiece::role);
            if let Some(mv) = self.find_by_squares(&caps[1], &caps[2], promotion) {
                return Some(mv);
            }
        }

        // Last resort: compare against the SAN of every legal move with
        // capture/check/promotion punctuation removed.
        let wanted = loose_san(text.strip_prefix('P').unwrap_or(&text));
        let mut matches = self
            .pos
            .legal_moves()
            .into_iter()
            .filter(|mv| loose_san(&SanPlus::from_move(self.pos.clone(), *mv).to_string()) == wanted);
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }

    fn find_by_squares(&self, from: &str, to: &str, promotion: Option<Role>) -> Option<Move> {
        let from: Square = from.parse().ok()?;
        let to: Square = to.parse().ok()?;
        self.pos.legal_moves().into_iter().find(|mv| {
            matches!(
                mv.to_uci(CastlingMode::Standard),
                UciMove::Normal { from: f, to: t, promotion: p } if f == from && t == to && p == promotion
            )
        })
    }
}

fn loose_san(san: &str) -> String {
    san.chars()
        .filter(|c| !matches!(c, 'x' | '+' | '#' | '=' | '-'))
        .collect()
}

fn uci_squares(mv: &Move) -> (String, String) {
    match mv.to_uci(CastlingMode::Standard) {
        UciMove::Normal { from, to, .. } => (from.to_string(), to.to_string()),
        UciMove::Put { to, .. } => (to.to_string(), to.to_string()),
        UciMove::Null => (String::new(), String::new()),
    }
}

impl LegalityEngine for ShakmatyEngine {
    fn load(&mut self, fen: &str) -> bool {
        let pos = Fen::from_ascii(fen.trim().as_bytes())
            .ok()
            .and_then(|fen| fen.into_position::<Chess>(CastlingMode::Standard).ok());
        match pos {
            Some(pos) => {
                self.pos = pos;
                self.history.clear();
                true
            }
            None => false,
        }
    }

    fn fen(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    fn turn(&self) -> Side {
        self.pos.turn().into()
    }

    fn play(&mut self, input: &MoveInput, permissive: bool) -> Option<MoveRecord> {
        let mv = self.resolve(input, permissive)?;
        let before = self.pos.clone();
        let (from, to) = uci_squares(&mv);
        let san = SanPlus::from_move_and_play_unchecked(&mut self.pos, mv).to_string();
        let record = MoveRecord { san, from, to };
        self.history.push((before, record.clone()));
        Some(record)
    }

    fn legal_destinations(&self) -> BTreeMap<String, Vec<String>> {
        let mut dests: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for mv in self.pos.legal_moves() {
            let (from, to) = uci_squares(&mv);
            let entry = dests.entry(from).or_default();
            if !entry.contains(&to) {
                entry.push(to);
            }
        }
        for squares in dests.values_mut() {
            squares.sort();
        }
        dests
    }

    fn undo(&mut self) -> Option<MoveRecord> {
        let (before, record) = self.history.pop()?;
        self.pos = before;
        Some(record)
    }

    fn is_check(&self) -> bool {
        self.pos.is_check()
    }

    fn is_promotion(&self, from: &str, to: &str) -> bool {
        let (Ok(from), Ok(to)) = (from.parse::<Square>(), to.parse::<Square>()) else {
            return false;
        };
        self.pos.legal_moves().iter().any(|mv| {
            mv.promotion().is_some()
                && matches!(
                    mv.to_uci(CastlingMode::Standard),
                    UciMove::Normal { from: f, to: t, .. } if f == from && t == to
                )
        })
    }
}
