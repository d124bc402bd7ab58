//! Editor selection
//!
//! Either a plain text selection (anchor/head positions) or a cell
//! selection spanning the rectangle between two cells.

use super::document::Document;
use crate::transform::Mapping;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Selection {
    /// Text selection; a cursor when `anchor == head`
    Text { anchor: usize, head: usize },

    /// Cell range; positions point directly before the anchor and head cells
    Cell { anchor: usize, head: usize },
}

impl Default for Selection {
    fn default() -> Self {
        Selection::cursor(0)
    }
}

impl Selection {
    pub fn cursor(pos: usize) -> Self {
        Selection::Text {
            anchor: pos,
            head: pos,
        }
    }

    pub fn cells(anchor: usize, head: usize) -> Self {
        Selection::Cell { anchor, head }
    }

    /// Single-cell selection
    pub fn cell(pos: usize) -> Self {
        Selection::Cell {
            anchor: pos,
            head: pos,
        }
    }

    pub fn anchor(&self) -> usize {
        match *self {
            Selection::Text { anchor, .. } | Selection::Cell { anchor, .. } => anchor,
        }
    }

    pub fn head(&self) -> usize {
        match *self {
            Selection::Text { head, .. } | Selection::Cell { head, .. } => head,
        }
    }

    pub fn is_cell_selection(&self) -> bool {
        matches!(self, Selection::Cell { .. })
    }

    /// Whether this selection still points at valid places in `doc`
    pub fn is_valid_in(&self, doc: &Document) -> bool {
        let size = doc.content_size();
        match *self {
            Selection::Text { anchor, head } => anchor <= size && head <= size,
            Selection::Cell { anchor, head } => is_cell_at(doc, anchor) && is_cell_at(doc, head),
        }
    }

    /// Map this selection through the edits of a transaction.
    ///
    /// A cell selection whose cells disappeared collapses to a cursor.
    pub fn map(&self, doc: &Document, mapping: &Mapping) -> Selection {
        let size = doc.content_size();
        match *self {
            Selection::Text { anchor, head } => Selection::Text {
                anchor: mapping.map(anchor).min(size),
                head: mapping.map(head).min(size),
            },
            Selection::Cell { anchor, head } => {
                let anchor = mapping.map(anchor);
                let head = mapping.map(head);
                if is_cell_at(doc, anchor) && is_cell_at(doc, head) {
                    Selection::Cell { anchor, head }
                } else {
                    Selection::cursor(anchor.min(size))
                }
            }
        }
    }
}

fn is_cell_at(doc: &Document, pos: usize) -> bool {
    doc.node_at(pos).map_or(false, |node| node.kind.is_cell())
}
