//! Writes move trees back out as PGN move text.

use crate::engine::Side;
use crate::fen::turn_and_fullmove;
use crate::parser::{BlockKind, ParsedResult};
use crate::tree::{LineId, MoveNode, MoveTree};

fn comment_body(node: &MoveNode) -> Option<String> {
    let directives = node.annotations.to_directives();
    let parts: Vec<&str> = node
        .comment
        .as_deref()
        .filter(|text| !text.is_empty())
        .into_iter()
        .chain((!directives.is_empty()).then_some(directives.as_str()))
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Append the tokens for `nodes` to `out`. Variations are only followed when
/// `tree` is given.
fn write_nodes<'a>(nodes: impl Iterator<Item = &'a MoveNode>, tree: Option<&MoveTree>, out: &mut Vec<String>) {
    let mut needs_number = true;
    for node in nodes {
        let (to_move, fullmove) = turn_and_fullmove(&node.fen);
        match to_move.other() {
            Side::White => out.push(format!("{fullmove}.")),
            Side::Black if needs_number => out.push(format!("{}...", fullmove.saturating_sub(1).max(1))),
            Side::Black => {}
        }

        match node.nag {
            Some(nag) if nag.glyph().is_some() => out.push(format!("{}{nag}", node.san)),
            Some(nag) => {
                out.push(node.san.clone());
                out.push(nag.to_string());
            }
            None => out.push(node.san.clone()),
        }
        needs_number = false;

        if let Some(body) = comment_body(node) {
            out.push(format!("{{{body}}}"));
            needs_number = true;
        }

        if let Some(tree) = tree {
            for &variation in &node.variations {
                let mut inner = Vec::new();
                write_nodes(tree.line_nodes(variation), Some(tree), &mut inner);
                out.push(format!("({})", inner.join(" ")));
                needs_number = true;
            }
        }
    }
}

/// Move text for one line of `tree`, including its nested variations.
pub fn serialize_line(tree: &MoveTree, line: LineId) -> String {
    let mut out = Vec::new();
    write_nodes(tree.line_nodes(line), Some(tree), &mut out);
    out.join(" ")
}

pub fn serialize_tree(tree: &MoveTree) -> String {
    serialize_line(tree, LineId::ROOT)
}

/// Move text for a flat line such as a puzzle solution.
pub fn serialize_moves(nodes: &[MoveNode]) -> String {
    let mut out = Vec::new();
    write_nodes(nodes.iter(), None, &mut out);
    out.join(" ")
}

/// Clipboard text for a block: tag pairs, a blank line, then the move text
/// and result. A bare position exports as its FEN.
pub fn export_text(result: &ParsedResult) -> String {
    if result.kind == BlockKind::Fen {
        return result.start_fen().to_string();
    }

    let mut text = String::new();
    if let (Some(fen), None) = (&result.base_fen, result.headers.get("FEN")) {
        text.push_str(&format!("[FEN \"{fen}\"]\n"));
    }
    for (key, value) in result.headers.iter() {
        text.push_str(&format!("[{key} \"{value}\"]\n"));
    }
    if !text.is_empty() {
        text.push('\n');
    }

    let moves = match result.kind {
        BlockKind::Puzzle => serialize_moves(&result.solution),
        _ => serialize_tree(&result.tree),
    };
    let outcome = result.headers.get("Result").unwrap_or("");
    let body: Vec<&str> = [moves.as_str(), outcome]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    text.push_str(&body.join(" "));
    text
}
