//! Board overlays (arrows, circles, highlights) and the `[%cal]` / `[%csl]`
//! comment directives that carry them inside PGN comments.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Colour name -> brush colour.
const COLOR_NAMES: &[(&str, &str)] = &[
    ("green", "#15781B"),
    ("red", "#882020"),
    ("blue", "#003088"),
    ("yellow", "#e68f00"),
    ("orange", "#f28b30"),
    ("purple", "#68217a"),
];

/// One-letter codes used inside comment directives.
const COLOR_CODES: &[(char, &str)] = &[
    ('G', "green"),
    ('R', "red"),
    ('B', "blue"),
    ('Y', "yellow"),
    ('O', "orange"),
    ('P', "purple"),
];

pub const DEFAULT_COLOR: &str = "#15781B";

/// Resolve a colour word through the colour table. Unknown names are passed
/// through verbatim.
pub fn resolve_color_name(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    COLOR_NAMES
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, c)| c.to_string())
        .unwrap_or_else(|| name.trim().to_string())
}

/// Resolve a one-letter directive code. Unknown letters mean green.
pub fn resolve_color_code(code: Option<char>) -> String {
    code.and_then(|c| {
        COLOR_CODES
            .iter()
            .find(|(k, _)| *k == c.to_ascii_uppercase())
            .map(|(_, name)| resolve_color_name(name))
    })
    .unwrap_or_else(|| DEFAULT_COLOR.to_string())
}

/// Directive letter for a resolved colour, green for anything unknown.
fn color_code(color: &str) -> char {
    COLOR_CODES
        .iter()
        .find(|(_, name)| resolve_color_name(name) == color)
        .map(|(k, _)| *k)
        .unwrap_or('G')
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrow {
    pub from: String,
    pub to: String,
    pub color: String,
}

/// A coloured single square, used for both circles and highlights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquareMark {
    pub square: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    pub arrows: Vec<Arrow>,
    pub circles: Vec<SquareMark>,
    pub highlights: Vec<SquareMark>,
}

impl Annotations {
    pub fn is_empty(&self) -> bool {
        self.arrows.is_empty() && self.circles.is_empty() && self.highlights.is_empty()
    }

    /// Append every overlay of `other` (lists are concatenated, never replaced).
    pub fn merge(&mut self, other: Annotations) {
        self.arrows.extend(other.arrows);
        self.circles.extend(other.circles);
        self.highlights.extend(other.highlights);
    }

    /// Render arrows and circles back into `[%cal ...]` / `[%csl ...]`
    /// directives. Highlights have no directive form.
    pub fn to_directives(&self) -> String {
        let mut parts = Vec::new();
        if !self.arrows.is_empty() {
            let entries: Vec<String> = self
                .arrows
                .iter()
                .map(|a| format!("{}{}{}", color_code(&a.color), a.from, a.to))
                .collect();
            parts.push(format!("[%cal {}]", entries.join(",")));
        }
        if !self.circles.is_empty() {
            let entries: Vec<String> = self
                .circles
                .iter()
                .map(|c| format!("{}{}", color_code(&c.color), c.square))
                .collect();
            parts.push(format!("[%csl {}]", entries.join(",")));
        }
        parts.join(" ")
    }
}

static CAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[%cal\s+([^\]]*)\]").expect("cal pattern is valid"));
static CSL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[%csl\s+([^\]]*)\]").expect("csl pattern is valid"));
static ARROW_ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z])?([a-h][1-8])([a-h][1-8])$").expect("arrow entry pattern is valid")
});
static CIRCLE_ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z])?([a-h][1-8])$").expect("circle entry pattern is valid")
});

/// Pull `[%cal]` and `[%csl]` directives out of a comment.
///
/// Returns the overlays and the remaining human-readable text with whitespace
/// collapsed; `None` when nothing readable is left.
pub fn extract_comment_annotations(comment: &str) -> (Annotations, Option<String>) {
    let mut annotations = Annotations::default();

    if let Some(caps) = CAL_RE.captures(comment) {
        annotations.arrows = entries(&caps[1])
            .filter_map(|entry| {
                let caps = ARROW_ENTRY_RE.captures(entry)?;
                Some(Arrow {
                    from: caps[2].to_string(),
                    to: caps[3].to_string(),
                    color: resolve_color_code(color_letter(&caps)),
                })
            })
            .collect();
    }

    if let Some(caps) = CSL_RE.captures(comment) {
        annotations.circles = entries(&caps[1])
            .filter_map(|entry| {
                let caps = CIRCLE_ENTRY_RE.captures(entry)?;
                Some(SquareMark {
                    square: caps[2].to_string(),
                    color: resolve_color_code(color_letter(&caps)),
                })
            })
            .collect();
    }

    let without_cal = CAL_RE.replacen(comment, 1, "");
    let stripped = CSL_RE.replacen(&without_cal, 1, "");
    let text = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    (annotations, (!text.is_empty()).then_some(text))
}

fn entries(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|e| !e.is_empty())
}

fn color_letter(caps: &regex::Captures<'_>) -> Option<char> {
    caps.get(1).and_then(|m| m.as_str().chars().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_arrows_and_circles() {
        let (ann, text) =
            extract_comment_annotations("Strong move [%cal Ge2e4,Rd1h5] [%csl Yf7]  indeed");
        assert_eq!(text.as_deref(), Some("Strong move indeed"));
        assert_eq!(ann.arrows.len(), 2);
        assert_eq!(ann.arrows[0].from, "e2");
        assert_eq!(ann.arrows[0].to, "e4");
        assert_eq!(ann.arrows[0].color, resolve_color_name("green"));
        assert_eq!(ann.arrows[1].color, resolve_color_name("red"));
        assert_eq!(ann.circles[0].square, "f7");
        assert_eq!(ann.circles[0].color, resolve_color_name("yellow"));
    }

    #[test]
    fn test_unknown_letter_defaults_to_green() {
        let (ann, text) = extract_comment_annotations("[%csl Xd5,e5]");
        assert_eq!(text, None);
        assert_eq!(ann.circles.len(), 2);
        assert!(ann.circles.iter().all(|c| c.color == DEFAULT_COLOR));
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let (ann, _) = extract_comment_annotations("[%cal Ge2,Rd1h5,zz9]");
        assert_eq!(ann.arrows.len(), 1);
        assert_eq!(ann.arrows[0].from, "d1");
    }

    #[test]
    fn test_plain_comment_untouched() {
        let (ann, text) = extract_comment_annotations("  just   words ");
        assert!(ann.is_empty());
        assert_eq!(text.as_deref(), Some("just words"));
    }

    #[test]
    fn test_directives_render_back() {
        let (ann, _) = extract_comment_annotations("[%cal Re2e4] [%csl Bd5]");
        assert_eq!(ann.to_directives(), "[%cal Re2e4] [%csl Bd5]");
    }

    #[test]
    fn test_color_name_passthrough() {
        assert_eq!(resolve_color_name("Blue"), "#003088");
        assert_eq!(resolve_color_name("#abcdef"), "#abcdef");
    }

    #[test]
    fn test_merge_concatenates() {
        let (mut a, _) = extract_comment_annotations("[%cal Ge2e4]");
        let (b, _) = extract_comment_annotations("[%cal Rd2d4] [%csl Gd4]");
        a.merge(b);
        assert_eq!(a.arrows.len(), 2);
        assert_eq!(a.circles.len(), 1);
    }
}
