//! Node-type creation
//!
//! Default attributes per node kind, "create an empty schema-valid node of
//! kind T", and small builders used when constructing tables.

use super::node::{attr, Attrs, Node, NodeKind};
use serde_json::Value;

impl NodeKind {
    /// Attributes a freshly created node of this kind carries
    pub fn default_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        match self {
            NodeKind::Table => {
                attrs.insert(attr::BORDER.to_string(), Value::Null);
                attrs.insert(attr::BORDER_COLOR.to_string(), Value::Null);
                attrs.insert(attr::BACKGROUND.to_string(), Value::Null);
                attrs.insert(attr::ALTERNATE_COLOR.to_string(), Value::from("false"));
            }
            NodeKind::TableCell | NodeKind::TableHeaderCell => {
                attrs.insert(attr::COLSPAN.to_string(), Value::from(1));
                attrs.insert(attr::ROWSPAN.to_string(), Value::from(1));
                attrs.insert(attr::BORDER.to_string(), Value::Null);
                attrs.insert(attr::BORDER_COLOR.to_string(), Value::Null);
                attrs.insert(attr::BACKGROUND.to_string(), Value::Null);
                attrs.insert(attr::HIGHLIGHT.to_string(), Value::Bool(false));
            }
            _ => {}
        }
        attrs
    }
}

/// Create an empty, schema-valid node of the given kind.
///
/// Cells get a single empty paragraph, tables a single 1x1 row.
pub fn create_and_fill(kind: NodeKind) -> Node {
    match kind {
        NodeKind::TableCell | NodeKind::TableHeaderCell => {
            Node::new(kind, kind.default_attrs(), vec![empty_paragraph()])
        }
        NodeKind::TableRow => Node::new(
            kind,
            Attrs::new(),
            vec![create_and_fill(NodeKind::TableCell)],
        ),
        NodeKind::Table => Node::new(
            kind,
            kind.default_attrs(),
            vec![create_and_fill(NodeKind::TableRow)],
        ),
        NodeKind::Text => Node::text(""),
        _ => Node::new(kind, kind.default_attrs(), Vec::new()),
    }
}

/// Empty cell of `kind` carrying the given attributes
pub fn create_cell(kind: NodeKind, attrs: Attrs) -> Node {
    Node::new(kind, attrs, vec![empty_paragraph()])
}

/// Fresh `rows` x `cols` table; the first row uses header cells when asked
pub fn create_table(rows: usize, cols: usize, header_row: bool) -> Node {
    let rows = rows.max(1);
    let cols = cols.max(1);
    let content = (0..rows)
        .map(|r| {
            let kind = if header_row && r == 0 {
                NodeKind::TableHeaderCell
            } else {
                NodeKind::TableCell
            };
            Node::new(
                NodeKind::TableRow,
                Attrs::new(),
                (0..cols).map(|_| create_and_fill(kind)).collect(),
            )
        })
        .collect();
    Node::new(NodeKind::Table, NodeKind::Table.default_attrs(), content)
}

fn empty_paragraph() -> Node {
    Node::new(NodeKind::Paragraph, Attrs::new(), Vec::new())
}

// ============================================================================
// Builders
// ============================================================================

pub fn doc(content: Vec<Node>) -> Node {
    Node::new(NodeKind::Doc, Attrs::new(), content)
}

/// Paragraph holding `text` (no text node when empty)
pub fn paragraph(text: &str) -> Node {
    let content = if text.is_empty() {
        Vec::new()
    } else {
        vec![Node::text(text)]
    };
    Node::new(NodeKind::Paragraph, Attrs::new(), content)
}

pub fn table(rows: Vec<Node>) -> Node {
    Node::new(NodeKind::Table, NodeKind::Table.default_attrs(), rows)
}

pub fn row(cells: Vec<Node>) -> Node {
    Node::new(NodeKind::TableRow, Attrs::new(), cells)
}

/// Body cell with one paragraph of text
pub fn cell(text: &str) -> Node {
    Node::new(
        NodeKind::TableCell,
        NodeKind::TableCell.default_attrs(),
        vec![paragraph(text)],
    )
}

/// Header cell with one paragraph of text
pub fn header_cell(text: &str) -> Node {
    Node::new(
        NodeKind::TableHeaderCell,
        NodeKind::TableHeaderCell.default_attrs(),
        vec![paragraph(text)],
    )
}

/// Body cell spanning `colspan` x `rowspan` slots
pub fn spanning_cell(text: &str, colspan: usize, rowspan: usize) -> Node {
    let mut node = cell(text);
    node.attrs
        .insert(attr::COLSPAN.to_string(), Value::from(colspan));
    node.attrs
        .insert(attr::ROWSPAN.to_string(), Value::from(rowspan));
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_fill_cell() {
        let cell = create_and_fill(NodeKind::TableHeaderCell);
        assert_eq!(cell.kind, NodeKind::TableHeaderCell);
        assert_eq!(cell.content.len(), 1);
        assert_eq!(cell.colspan(), 1);
        assert!(!cell.is_highlighted());
    }

    #[test]
    fn test_create_table_header_row() {
        let t = create_table(3, 2, true);
        assert_eq!(t.child_count(), 3);
        assert_eq!(t.content[0].content[0].kind, NodeKind::TableHeaderCell);
        assert_eq!(t.content[1].content[1].kind, NodeKind::TableCell);
        assert_eq!(t.attr_str(attr::ALTERNATE_COLOR), Some("false"));
    }
}
