//! Bracket markers (`[puzzle]`, `[rating: 1500]`, `[arrow: e2e4 red]`, ...)
//! written above the chess data of a block.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::annotations::{resolve_color_name, Annotations, Arrow, SquareMark, DEFAULT_COLOR};
use crate::engine::Side;

/// Line separating markers from chess data.
pub const SEPARATOR: &str = "---";

static MARKER_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\s*[A-Za-z][A-Za-z_-]*\s*(?::[^\]]*)?\]$").expect("marker pattern is valid")
});

/// Split a block into marker lines and the chess data that follows them.
///
/// With a `---` line, every non-blank line above it is a marker and the text
/// below it is returned verbatim. Without one, markers are read from the top
/// (blank lines skipped) until the first line that is not marker-shaped.
pub fn scan_markers(input: &str) -> (Vec<String>, String) {
    let lines: Vec<&str> = input.lines().collect();

    if let Some(sep) = lines.iter().position(|line| line.trim() == SEPARATOR) {
        let markers = lines[..sep]
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        return (markers, lines[sep + 1..].join("\n"));
    }

    let mut markers = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !MARKER_LINE_RE.is_match(trimmed) {
            return (markers, lines[i..].join("\n"));
        }
        markers.push(trimmed.to_string());
    }
    (markers, String::new())
}

/// Everything the markers of one block asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerDirectives {
    pub puzzle: bool,
    /// Explicit orientation, if any marker set one.
    pub orientation: Option<Side>,
    pub static_board: bool,
    /// `Some(false)` when a marker disabled editing.
    pub editable: Option<bool>,
    pub rating: Option<i32>,
    pub themes: Vec<String>,
    pub title: Option<String>,
    pub ply_offset: usize,
    pub overlays: Annotations,
}

struct MarkerRule {
    pattern: Regex,
    apply: fn(&Captures<'_>, &mut MarkerDirectives),
}

fn rule(pattern: &str, apply: fn(&Captures<'_>, &mut MarkerDirectives)) -> MarkerRule {
    MarkerRule {
        pattern: Regex::new(pattern).expect("marker rule pattern is valid"),
        apply,
    }
}

fn color_of(caps: &Captures<'_>, group: usize) -> String {
    caps.get(group)
        .map(|m| resolve_color_name(m.as_str()))
        .unwrap_or_else(|| DEFAULT_COLOR.to_string())
}

/// Every rule is tried against every marker line, in this order.
static MARKER_RULES: LazyLock<Vec<MarkerRule>> = LazyLock::new(|| {
    vec![
        rule(r"(?i)^\[\s*puzzle\s*\]$", |_, d| d.puzzle = true),
        rule(r"(?i)^\[\s*(?:black|flip)\s*\]$", |_, d| {
            d.orientation = Some(Side::Black)
        }),
        rule(r"(?i)^\[\s*white\s*\]$", |_, d| d.orientation = Some(Side::White)),
        rule(r"(?i)^\[\s*static\s*\]$", |_, d| {
            d.static_board = true;
            d.editable = Some(false);
        }),
        rule(r"(?i)^\[\s*noedit\s*\]$", |_, d| d.editable = Some(false)),
        rule(r"(?i)^\[\s*rating\s*:([^\]]*)\]$", |c, d| {
            d.rating = c[1].trim().parse().ok();
        }),
        rule(r"(?i)^\[\s*themes\s*:([^\]]*)\]$", |c, d| {
            d.themes = c[1]
                .split(|ch: char| ch == ',' || ch.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }),
        rule(r"(?i)^\[\s*title\s*:([^\]]*)\]$", |c, d| {
            d.title = Some(c[1].trim().to_string());
        }),
        rule(r"(?i)^\[\s*ply\s*:([^\]]*)\]$", |c, d| {
            d.ply_offset = c[1].trim().parse().unwrap_or(0);
        }),
        rule(
            r"(?i)^\[\s*arrow\s*:\s*([a-h][1-8])\s*-?\s*([a-h][1-8])(?:\s+([^\s\]]+))?\s*\]$",
            |c, d| {
                d.overlays.arrows.push(Arrow {
                    from: c[1].to_ascii_lowercase(),
                    to: c[2].to_ascii_lowercase(),
                    color: color_of(c, 3),
                });
            },
        ),
        rule(
            r"(?i)^\[\s*circle\s*:\s*([a-h][1-8])(?:\s+([^\s\]]+))?\s*\]$",
            |c, d| {
                d.overlays.circles.push(SquareMark {
                    square: c[1].to_ascii_lowercase(),
                    color: color_of(c, 2),
                });
            },
        ),
        rule(
            r"(?i)^\[\s*highlight\s*:\s*([a-h][1-8])(?:\s+([^\s\]]+))?\s*\]$",
            |c, d| {
                d.overlays.highlights.push(SquareMark {
                    square: c[1].to_ascii_lowercase(),
                    color: color_of(c, 2),
                });
            },
        ),
    ]
});

/// Fold marker lines into directives. Later boolean and key/value markers
/// overwrite earlier ones; overlays accumulate; unknown markers are ignored.
pub fn interpret_markers<S: AsRef<str>>(lines: &[S]) -> MarkerDirectives {
    let mut directives = MarkerDirectives::default();
    for line in lines {
        let line = line.as_ref().trim();
        for marker_rule in MARKER_RULES.iter() {
            if let Some(caps) = marker_rule.pattern.captures(line) {
                (marker_rule.apply)(&caps, &mut directives);
            }
        }
    }
    directives
}
