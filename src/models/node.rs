//! Document node tree
//!
//! Nodes are addressed by integer positions in a flattened coordinate space.
//! A text node occupies one position per character; every other node
//! occupies its content plus an opening and a closing token. A node "at
//! position p" starts at p, and its content starts at p + 1.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute bag of a node (string-keyed, order irrelevant)
pub type Attrs = BTreeMap<String, Value>;

/// Attribute keys used by the table subsystem
pub mod attr {
    pub const BORDER: &str = "border";
    pub const BORDER_COLOR: &str = "borderColor";
    pub const BACKGROUND: &str = "background";
    pub const HIGHLIGHT: &str = "highlight";
    pub const COLSPAN: &str = "colspan";
    pub const ROWSPAN: &str = "rowspan";
    pub const ALTERNATE_COLOR: &str = "alternateColor";
}

/// Closed set of node types the editor knows about
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Doc,
    Paragraph,
    Text,
    Table,
    TableRow,
    TableCell,
    /// Header cell (`<th>`), serialized as `tableHeader`
    #[serde(rename = "tableHeader")]
    TableHeaderCell,
}

impl NodeKind {
    pub fn is_table(&self) -> bool {
        matches!(self, NodeKind::Table)
    }

    pub fn is_row(&self) -> bool {
        matches!(self, NodeKind::TableRow)
    }

    /// Body and header cells both count as cells
    pub fn is_cell(&self) -> bool {
        matches!(self, NodeKind::TableCell | NodeKind::TableHeaderCell)
    }
}

/// A node of the document tree
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attrs,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,

    /// Only set on text nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    pub fn new(kind: NodeKind, attrs: Attrs, content: Vec<Node>) -> Self {
        Self {
            kind,
            attrs,
            content,
            text: None,
        }
    }

    /// Create a text node
    pub fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text,
            attrs: Attrs::new(),
            content: Vec::new(),
            text: Some(text.to_string()),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    /// Number of positions this node occupies in its parent
    pub fn node_size(&self) -> usize {
        if self.is_text() {
            self.text.as_deref().map(|t| t.chars().count()).unwrap_or(0)
        } else {
            self.content_size() + 2
        }
    }

    /// Number of positions covered by this node's children
    pub fn content_size(&self) -> usize {
        self.content.iter().map(Node::node_size).sum()
    }

    pub fn child_count(&self) -> usize {
        self.content.len()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content.get(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.content.first()
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// String attribute, `None` when absent or null
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }

    /// Positive integer attribute, falling back to `default` when absent or
    /// invalid. Values too large for `usize` saturate.
    pub fn attr_usize(&self, key: &str, default: usize) -> usize {
        self.attrs
            .get(key)
            .and_then(Value::as_u64)
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
            .filter(|n| *n >= 1)
            .unwrap_or(default)
    }

    pub fn colspan(&self) -> usize {
        self.attr_usize(attr::COLSPAN, 1)
    }

    pub fn rowspan(&self) -> usize {
        self.attr_usize(attr::ROWSPAN, 1)
    }

    /// Whether this cell carries a manual style override
    pub fn is_highlighted(&self) -> bool {
        self.attrs
            .get(attr::HIGHLIGHT)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Copy of this node with a different attribute bag
    pub fn with_attrs(&self, attrs: Attrs) -> Node {
        Node {
            attrs,
            ..self.clone()
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        if let Some(text) = &self.text {
            return text.clone();
        }
        self.content.iter().map(Node::text_content).collect()
    }

    /// Node starting at `pos`, relative to this node's content start
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        let mut offset = 0;
        for child in &self.content {
            let end = offset + child.node_size();
            if pos == offset {
                return Some(child);
            }
            if pos < end {
                if child.is_text() {
                    return None;
                }
                return child.node_at(pos - offset - 1);
            }
            offset = end;
        }
        None
    }

    pub fn node_at_mut(&mut self, pos: usize) -> Option<&mut Node> {
        let mut offset = 0;
        for child in self.content.iter_mut() {
            let end = offset + child.node_size();
            if pos == offset {
                return Some(child);
            }
            if pos < end {
                if child.is_text() {
                    return None;
                }
                return child.node_at_mut(pos - offset - 1);
            }
            offset = end;
        }
        None
    }

    /// Call `f` for every descendant with its position relative to this
    /// node's content start. Returning `false` skips the node's children.
    pub fn descendants<F>(&self, mut f: F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        self.nodes_between(0, self.content_size(), 0, &mut f);
    }

    /// Call `f` for every node overlapping `[from, to)` (relative to this
    /// node's content start). `base` is added to reported positions.
    pub fn nodes_between<F>(&self, from: usize, to: usize, base: usize, f: &mut F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        let mut pos = 0;
        for child in &self.content {
            if pos >= to {
                break;
            }
            let end = pos + child.node_size();
            if end > from && f(child, base + pos) && !child.content.is_empty() {
                let start = pos + 1;
                child.nodes_between(
                    from.saturating_sub(start),
                    child.content_size().min(to.saturating_sub(start)),
                    base + start,
                    f,
                );
            }
            pos = end;
        }
    }
}
