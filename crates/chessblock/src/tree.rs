//! Arena-backed move tree.
//!
//! Nodes and lines live in flat vectors and refer to each other through
//! [`NodeId`] / [`LineId`] handles. A node's `variations` are alternatives to
//! that node: each starts from the position before it. Nothing points back to
//! a parent; paths are found by searching down from the root.

use serde::Serialize;

use crate::annotations::Annotations;
use crate::engine::MoveRecord;
use crate::nag::Nag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LineId(pub usize);

impl LineId {
    /// The main line.
    pub const ROOT: LineId = LineId(0);
}

/// One ply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveNode {
    pub san: String,
    pub from: String,
    pub to: String,
    /// Position after the move.
    pub fen: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nag: Option<Nag>,
    #[serde(skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<LineId>,
}

impl MoveNode {
    pub fn new(record: MoveRecord, fen: String) -> Self {
        Self {
            san: record.san,
            from: record.from,
            to: record.to,
            fen,
            comment: None,
            nag: None,
            annotations: Annotations::default(),
            variations: Vec::new(),
        }
    }

    /// Add comment text, joining onto an existing comment with a space.
    pub fn append_comment(&mut self, text: String) {
        self.comment = Some(match self.comment.take() {
            Some(existing) => format!("{existing} {text}"),
            None => text,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveTree {
    nodes: Vec<MoveNode>,
    lines: Vec<Vec<NodeId>>,
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveTree {
    /// A tree with an empty main line.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            lines: vec![Vec::new()],
        }
    }

    pub fn node(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut MoveNode {
        &mut self.nodes[id.0]
    }

    /// Node handles of a line; empty for an unknown line.
    pub fn line(&self, id: LineId) -> &[NodeId] {
        self.lines.get(id.0).map_or(&[], Vec::as_slice)
    }

    pub fn line_len(&self, id: LineId) -> usize {
        self.line(id).len()
    }

    pub fn contains_line(&self, id: LineId) -> bool {
        id.0 < self.lines.len()
    }

    /// Node at `index` in `line`, if any.
    pub fn node_at(&self, line: LineId, index: usize) -> Option<&MoveNode> {
        self.lines.get(line.0)?.get(index).map(|&id| self.node(id))
    }

    /// The main line's nodes in order.
    pub fn main_line(&self) -> impl Iterator<Item = &MoveNode> {
        self.line_nodes(LineId::ROOT)
    }

    pub fn line_nodes(&self, line: LineId) -> impl Iterator<Item = &MoveNode> {
        self.line(line).iter().map(|&id| self.node(id))
    }

    pub fn is_empty(&self) -> bool {
        self.lines[0].is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Store a node without attaching it to any line yet.
    pub(crate) fn alloc_node(&mut self, node: MoveNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn set_line(&mut self, line: LineId, nodes: Vec<NodeId>) {
        self.lines[line.0] = nodes;
    }

    /// Register `nodes` as a new line and attach it as the last variation of
    /// `parent`.
    pub(crate) fn attach_variation(&mut self, parent: NodeId, nodes: Vec<NodeId>) -> LineId {
        self.lines.push(nodes);
        let line = LineId(self.lines.len() - 1);
        self.nodes[parent.0].variations.push(line);
        line
    }

    /// Append a node to the end of `line`. Returns `None` for an unknown line.
    pub fn push_move(&mut self, line: LineId, node: MoveNode) -> Option<NodeId> {
        if !self.contains_line(line) {
            return None;
        }
        let id = self.alloc_node(node);
        self.lines[line.0].push(id);
        Some(id)
    }

    /// Start a one-node variation on the node at `index` of `line`. Returns
    /// `None` when there is no such node.
    pub fn add_variation(&mut self, line: LineId, index: usize, node: MoveNode) -> Option<LineId> {
        let parent = *self.lines.get(line.0)?.get(index)?;
        let id = self.alloc_node(node);
        Some(self.attach_variation(parent, vec![id]))
    }

    /// The `(line, move_index, variation_index)` steps leading from the root
    /// to `target`, outermost first. `None` if `target` is not in the tree.
    pub fn path_to(&self, target: LineId) -> Option<Vec<(LineId, usize, usize)>> {
        let mut path = Vec::new();
        self.search(LineId::ROOT, target, &mut path).then_some(path)
    }

    fn search(&self, line: LineId, target: LineId, path: &mut Vec<(LineId, usize, usize)>) -> bool {
        if line == target {
            return true;
        }
        for (move_index, &node) in self.line(line).iter().enumerate() {
            for (variation_index, &child) in self.nodes[node.0].variations.iter().enumerate() {
                path.push((line, move_index, variation_index));
                if self.search(child, target, path) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(san: &str) -> MoveNode {
        MoveNode::new(
            MoveRecord {
                san: san.to_string(),
                from: String::new(),
                to: String::new(),
            },
            String::new(),
        )
    }

    #[test]
    fn test_push_and_variation() {
        let mut tree = MoveTree::new();
        tree.push_move(LineId::ROOT, node("e4"));
        tree.push_move(LineId::ROOT, node("e5"));
        let var = tree.add_variation(LineId::ROOT, 1, node("c5")).unwrap();

        assert_eq!(tree.line_len(LineId::ROOT), 2);
        assert_eq!(tree.node_at(LineId::ROOT, 1).unwrap().variations, vec![var]);
        assert_eq!(tree.node_at(var, 0).unwrap().san, "c5");
        assert!(tree.add_variation(LineId::ROOT, 5, node("d5")).is_none());
    }

    #[test]
    fn test_unknown_line_is_empty() {
        let mut tree = MoveTree::new();
        tree.push_move(LineId::ROOT, node("e4"));
        let unknown = LineId(7);

        assert!(!tree.contains_line(unknown));
        assert_eq!(tree.line_len(unknown), 0);
        assert!(tree.line(unknown).is_empty());
        assert_eq!(tree.line_nodes(unknown).count(), 0);
        assert!(tree.node_at(unknown, 0).is_none());
        assert!(tree.add_variation(unknown, 0, node("d4")).is_none());
        assert!(tree.push_move(unknown, node("d4")).is_none());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_path_to_nested_line() {
        let mut tree = MoveTree::new();
        tree.push_move(LineId::ROOT, node("e4"));
        tree.push_move(LineId::ROOT, node("e5"));
        let first = tree.add_variation(LineId::ROOT, 0, node("d4")).unwrap();
        let outer = tree.add_variation(LineId::ROOT, 1, node("c5")).unwrap();
        tree.push_move(outer, node("Nf3"));
        let inner = tree.add_variation(outer, 1, node("Nc3")).unwrap();

        assert_eq!(tree.path_to(LineId::ROOT), Some(vec![]));
        assert_eq!(tree.path_to(first), Some(vec![(LineId::ROOT, 0, 0)]));
        assert_eq!(
            tree.path_to(inner),
            Some(vec![(LineId::ROOT, 1, 0), (outer, 1, 0)])
        );
        assert_eq!(tree.path_to(LineId(99)), None);
    }

    #[test]
    fn test_append_comment_joins() {
        let mut n = node("e4");
        n.append_comment("best".to_string());
        n.append_comment("by test".to_string());
        assert_eq!(n.comment.as_deref(), Some("best by test"));
    }
}
