//! Turns a token stream into a move tree (games) or a flat line (puzzles),
//! driving one legality engine per line.

use tracing::{debug, warn};

use crate::annotations::{extract_comment_annotations, Annotations};
use crate::engine::{LegalityEngine, MoveInput, ShakmatyEngine};
use crate::nag::{split_inline_glyph, Nag};
use crate::tokenizer::Token;
use crate::tree::{LineId, MoveNode, MoveTree, NodeId};

/// Comment, overlays and NAG seen before the node they belong to exists.
#[derive(Debug, Default)]
struct Pending {
    comment: Option<String>,
    nag: Option<Nag>,
    annotations: Annotations,
}

impl Pending {
    fn clear(&mut self) {
        *self = Pending::default();
    }

    /// Move everything pending onto `node`. An inline glyph beats a pending
    /// `$N`.
    fn attach(&mut self, node: &mut MoveNode, inline: Option<Nag>) {
        let pending = std::mem::take(self);
        if let Some(comment) = pending.comment {
            node.append_comment(comment);
        }
        node.annotations.merge(pending.annotations);
        node.nag = inline.or(pending.nag);
    }
}

/// Running totals shared by every line of one build.
#[derive(Debug, Default)]
struct Progress {
    parsed: usize,
    warnings: Vec<String>,
}

fn play_move<E: LegalityEngine>(
    engine: &mut E,
    text: &str,
    pending: &mut Pending,
    progress: &mut Progress,
) -> Option<MoveNode> {
    let (bare, inline) = split_inline_glyph(text);
    let Some(record) = engine.play(&MoveInput::text(bare), true) else {
        warn!(token = %text, parsed = progress.parsed, "Skipping invalid move");
        progress.warnings.push(format!(
            "Skipped invalid move \"{text}\" after {} parsed moves",
            progress.parsed
        ));
        return None;
    };

    let mut node = MoveNode::new(record, engine.fen());
    pending.attach(&mut node, inline);
    progress.parsed += 1;
    Some(node)
}

fn apply_comment(raw: &str, last: Option<&mut MoveNode>, pending: &mut Pending) {
    let (annotations, text) = extract_comment_annotations(raw);
    match last {
        Some(node) => {
            if let Some(text) = text {
                node.append_comment(text);
            }
            node.annotations.merge(annotations);
        }
        None => {
            if let Some(text) = text {
                pending.comment = Some(match pending.comment.take() {
                    Some(existing) => format!("{existing} {text}"),
                    None => text,
                });
            }
            pending.annotations.merge(annotations);
        }
    }
}

fn apply_nag(nag: Nag, last: Option<&mut MoveNode>, pending: &mut Pending) {
    match last {
        Some(node) => node.nag = Some(nag),
        None => pending.nag = Some(nag),
    }
}

fn engine_at<E: LegalityEngine + Default>(fen: &str) -> E {
    let mut engine = E::default();
    if !engine.load(fen) {
        warn!(fen = %fen, "Engine rejected line start position");
    }
    engine
}

/// Result of building a game tree.
#[derive(Debug)]
pub struct BuiltTree {
    pub tree: MoveTree,
    pub warnings: Vec<String>,
    pub parsed_moves: usize,
}

struct LineFrame<E> {
    engine: E,
    nodes: Vec<NodeId>,
    start_fen: String,
    /// Node this line is an alternative to; `None` for the main line.
    branch: Option<NodeId>,
}

struct TreeBuilder<E> {
    tree: MoveTree,
    root: LineFrame<E>,
    open: Vec<LineFrame<E>>,
    pending: Pending,
    progress: Progress,
}

impl<E: LegalityEngine + Default> TreeBuilder<E> {
    fn new(start_fen: &str) -> Self {
        Self {
            tree: MoveTree::new(),
            root: LineFrame {
                engine: engine_at(start_fen),
                nodes: Vec::new(),
                start_fen: start_fen.to_string(),
                branch: None,
            },
            open: Vec::new(),
            pending: Pending::default(),
            progress: Progress::default(),
        }
    }

    fn feed(&mut self, token: &Token) {
        match token {
            Token::Move(text) => {
                let frame = self.open.last_mut().unwrap_or(&mut self.root);
                if let Some(node) =
                    play_move(&mut frame.engine, text, &mut self.pending, &mut self.progress)
                {
                    frame.nodes.push(self.tree.alloc_node(node));
                }
            }
            Token::Comment(raw) => {
                let frame = self.open.last_mut().unwrap_or(&mut self.root);
                let last = frame.nodes.last().map(|&id| self.tree.node_mut(id));
                apply_comment(raw, last, &mut self.pending);
            }
            Token::Nag(nag) => {
                let frame = self.open.last_mut().unwrap_or(&mut self.root);
                let last = frame.nodes.last().map(|&id| self.tree.node_mut(id));
                apply_nag(*nag, last, &mut self.pending);
            }
            Token::OpenVariation => self.open_variation(),
            Token::CloseVariation => self.close_variation(),
        }
    }

    fn open_variation(&mut self) {
        let frame = self.open.last().unwrap_or(&self.root);
        let Some(&branch) = frame.nodes.last() else {
            debug!("Ignoring variation opened before any move");
            return;
        };
        let start_fen = match frame.nodes.len() {
            1 => frame.start_fen.clone(),
            n => self.tree.node(frame.nodes[n - 2]).fen.clone(),
        };

        debug!(depth = self.open.len() + 1, fen = %start_fen, "Opening variation");
        self.open.push(LineFrame {
            engine: engine_at(&start_fen),
            nodes: Vec::new(),
            start_fen,
            branch: Some(branch),
        });
        self.pending.clear();
    }

    fn close_variation(&mut self) {
        let Some(frame) = self.open.pop() else {
            debug!("Ignoring unbalanced variation close");
            return;
        };
        if let (Some(parent), false) = (frame.branch, frame.nodes.is_empty()) {
            self.tree.attach_variation(parent, frame.nodes);
        }
        self.pending.clear();
    }

    fn finish(mut self) -> BuiltTree {
        if !self.open.is_empty() {
            debug!(unclosed = self.open.len(), "Closing unterminated variations");
        }
        while !self.open.is_empty() {
            self.close_variation();
        }
        self.tree.set_line(LineId::ROOT, self.root.nodes);
        BuiltTree {
            tree: self.tree,
            warnings: self.progress.warnings,
            parsed_moves: self.progress.parsed,
        }
    }
}

/// Build a game tree from `tokens`, starting at `start_fen`.
pub fn build_tree(tokens: &[Token], start_fen: &str) -> BuiltTree {
    build_tree_with::<ShakmatyEngine>(tokens, start_fen)
}

/// [`build_tree`] with a caller-chosen engine type.
pub fn build_tree_with<E: LegalityEngine + Default>(tokens: &[Token], start_fen: &str) -> BuiltTree {
    let mut builder = TreeBuilder::<E>::new(start_fen);
    for token in tokens {
        builder.feed(token);
    }
    builder.finish()
}

/// Build a single non-branching line. Variation tokens are treated as
/// malformed input and ignored; everything inside them joins the line.
pub fn build_flat_line(tokens: &[Token], start_fen: &str) -> (Vec<MoveNode>, Vec<String>) {
    build_flat_line_with::<ShakmatyEngine>(tokens, start_fen)
}

pub fn build_flat_line_with<E: LegalityEngine + Default>(
    tokens: &[Token],
    start_fen: &str,
) -> (Vec<MoveNode>, Vec<String>) {
    let mut engine: E = engine_at(start_fen);
    let mut nodes: Vec<MoveNode> = Vec::new();
    let mut pending = Pending::default();
    let mut progress = Progress::default();

    for token in tokens {
        match token {
            Token::Move(text) => {
                if let Some(node) = play_move(&mut engine, text, &mut pending, &mut progress) {
                    nodes.push(node);
                }
            }
            Token::Comment(raw) => apply_comment(raw, nodes.last_mut(), &mut pending),
            Token::Nag(nag) => apply_nag(*nag, nodes.last_mut(), &mut pending),
            Token::OpenVariation | Token::CloseVariation => {
                debug!("Ignoring variation token in flat line");
            }
        }
    }
    (nodes, progress.warnings)
}
