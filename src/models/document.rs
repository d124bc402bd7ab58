//! Document wrapper and position resolution

use super::node::{Node, NodeKind};
use crate::transform::TransformError;
use serde::{Deserialize, Serialize};

/// A whole document: the `doc` node at the root of the tree
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct Document {
    root: Node,
}

impl Document {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Document with a single empty paragraph
    pub fn empty() -> Self {
        Self::new(super::schema::doc(vec![super::schema::paragraph("")]))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let doc: Document = serde_json::from_str(json)?;
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn content_size(&self) -> usize {
        self.root.content_size()
    }

    /// Node starting at `pos`
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        self.root.node_at(pos)
    }

    pub fn descendants<F>(&self, f: F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        self.root.descendants(f)
    }

    pub fn nodes_between<F>(&self, from: usize, to: usize, mut f: F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        self.root.nodes_between(from, to, 0, &mut f)
    }

    /// Positions of every table in document order (nested ones included)
    pub fn table_positions(&self) -> Vec<usize> {
        let mut tables = Vec::new();
        self.descendants(|node, pos| {
            if node.kind.is_table() {
                tables.push(pos);
            }
            true
        });
        tables
    }

    /// Resolve a position into the path of nodes that contain it
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos<'_>, TransformError> {
        if pos > self.content_size() {
            return Err(TransformError::OutOfRange(pos));
        }

        let mut path = Vec::new();
        let mut node = &self.root;
        let mut start = 0;
        loop {
            let rel = pos - start;
            let mut offset = 0;
            let mut descend = None;
            for child in &node.content {
                let end = offset + child.node_size();
                if rel < end {
                    if rel > offset && !child.is_text() {
                        descend = Some((child, start + offset + 1));
                    }
                    break;
                }
                offset = end;
            }
            path.push(PathEntry { node, start });
            match descend {
                Some((child, child_start)) => {
                    node = child;
                    start = child_start;
                }
                None => break,
            }
        }

        Ok(ResolvedPos { pos, path })
    }
}

#[derive(Clone, Copy, Debug)]
struct PathEntry<'a> {
    node: &'a Node,
    /// Position where this node's content starts
    start: usize,
}

/// A position together with the chain of its ancestors
#[derive(Clone, Debug)]
pub struct ResolvedPos<'a> {
    pub pos: usize,
    path: Vec<PathEntry<'a>>,
}

impl<'a> ResolvedPos<'a> {
    /// Depth of the innermost ancestor (0 = the doc node)
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    pub fn node(&self, depth: usize) -> &'a Node {
        self.path[depth].node
    }

    pub fn parent(&self) -> &'a Node {
        self.node(self.depth())
    }

    /// Position directly before the ancestor at `depth` (depth >= 1)
    pub fn before(&self, depth: usize) -> usize {
        self.path[depth].start - 1
    }

    /// Position directly after the ancestor at `depth` (depth >= 1)
    pub fn after(&self, depth: usize) -> usize {
        self.before(depth) + self.node(depth).node_size()
    }

    /// Innermost ancestor matching `predicate`, with the position before it
    pub fn find_ancestor<P>(&self, predicate: P) -> Option<(usize, &'a Node)>
    where
        P: Fn(&Node) -> bool,
    {
        (1..=self.depth())
            .rev()
            .find(|&d| predicate(self.node(d)))
            .map(|d| (self.before(d), self.node(d)))
    }

    /// Innermost ancestor of a given kind
    pub fn ancestor_of_kind(&self, kind: NodeKind) -> Option<(usize, &'a Node)> {
        self.find_ancestor(|node| node.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::{cell, doc, paragraph, row, table};

    fn sample() -> Document {
        // para("ab") = [0, 4), table at 4
        Document::new(doc(vec![
            paragraph("ab"),
            table(vec![row(vec![cell("x"), cell("y")])]),
        ]))
    }

    #[test]
    fn test_resolve_inside_cell() {
        let doc = sample();
        // table 4, row 5, cell 6, paragraph 7, text starts at 8
        let resolved = doc.resolve(8).unwrap();
        assert_eq!(resolved.depth(), 4);
        assert_eq!(resolved.parent().kind, NodeKind::Paragraph);

        let (cell_pos, cell) = resolved.find_ancestor(|n| n.kind.is_cell()).unwrap();
        assert_eq!(cell_pos, 6);
        assert_eq!(cell.text_content(), "x");

        let (table_pos, _) = resolved.ancestor_of_kind(NodeKind::Table).unwrap();
        assert_eq!(table_pos, 4);
    }

    #[test]
    fn test_resolve_before_cell() {
        let doc = sample();
        let resolved = doc.resolve(11).unwrap();
        assert_eq!(resolved.parent().kind, NodeKind::TableRow);
        assert!(resolved.find_ancestor(|n| n.kind.is_cell()).is_none());
        // the row spans [5, 17)
        assert_eq!(resolved.after(resolved.depth()), 17);
    }

    #[test]
    fn test_resolve_out_of_range() {
        let doc = sample();
        let size = doc.content_size();
        assert!(doc.resolve(size).is_ok());
        assert_eq!(doc.resolve(size + 1).unwrap_err(), TransformError::OutOfRange(size + 1));
    }

    #[test]
    fn test_json_round_trip_uses_type_tags() {
        let doc = sample();
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"type\":\"tableCell\""));
        assert_eq!(Document::from_json(&json).unwrap(), doc);
    }
}
