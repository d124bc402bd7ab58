//! Table styling: default propagation, highlight overlay, row banding
//!
//! All three walk the cells of exactly one table: the interval between the
//! table's opening and closing tokens is computed once and only nodes
//! inside it are considered. Cells are not descended into, so tables
//! nested inside a cell keep their own styling.
//!
//! A cell with `highlight = true` carries a manual override and is skipped
//! by every table-wide rewrite until the highlight is cleared.

use super::errors::TableError;
use super::map::{cell_around, selected_rect, table_around};
use super::settings::TableSettings;
use crate::models::{attr, Attrs, Document, Selection};
use crate::transform::Transaction;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Table-wide style attributes with a default on the table node
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum StyleAttr {
    Border,
    BorderColor,
    Background,
}

impl StyleAttr {
    /// Order in which defaults are re-applied after structural edits
    pub const ALL: [StyleAttr; 3] = [
        StyleAttr::Border,
        StyleAttr::Background,
        StyleAttr::BorderColor,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StyleAttr::Border => attr::BORDER,
            StyleAttr::BorderColor => attr::BORDER_COLOR,
            StyleAttr::Background => attr::BACKGROUND,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        StyleAttr::ALL.into_iter().find(|style| style.key() == key)
    }
}

/// Cleared values are stored as JSON null
fn to_value(value: Option<&str>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

#[derive(Clone, Copy, Debug)]
struct ScopedCell {
    pos: usize,
    /// 1-based row number within the table
    row: usize,
    highlighted: bool,
}

/// Cells belonging to the table at `table_pos`
fn scoped_cells(doc: &Document, table_pos: usize) -> Result<Vec<ScopedCell>, TableError> {
    let table = doc
        .node_at(table_pos)
        .filter(|node| node.kind.is_table())
        .ok_or(TableError::NoEnclosingTable)?;
    let from = table_pos + 1;
    let to = table_pos + table.node_size() - 1;

    let mut row = 0;
    let mut cells = Vec::new();
    doc.nodes_between(from, to, |node, pos| {
        if pos < from || pos >= to {
            // the table itself or one of its ancestors
            return true;
        }
        if node.kind.is_row() {
            row += 1;
            true
        } else if node.kind.is_cell() {
            cells.push(ScopedCell {
                pos,
                row,
                highlighted: node.is_highlighted(),
            });
            false
        } else {
            false
        }
    });
    Ok(cells)
}

/// Set `key` on every non-highlighted cell of the table; returns the count
fn rewrite_cells<F>(
    tr: &mut Transaction,
    table_pos: usize,
    key: &str,
    value_for: F,
) -> Result<usize, TableError>
where
    F: Fn(&ScopedCell) -> Value,
{
    let cells = scoped_cells(tr.doc(), table_pos)?;
    let mut rewritten = 0;
    for cell in cells.iter().filter(|cell| !cell.highlighted) {
        tr.set_node_attr(cell.pos, key, value_for(cell))?;
        rewritten += 1;
    }
    Ok(rewritten)
}

// ============================================================================
// Default propagation
// ============================================================================

/// Set a table-wide default on the table around `selection_pos` and
/// rewrite it on all of that table's non-highlighted cells
pub fn apply_default(
    doc: &Document,
    selection_pos: usize,
    style: StyleAttr,
    value: Option<&str>,
) -> Result<Transaction, TableError> {
    let (table_pos, _) = table_around(doc, selection_pos)?;
    let mut tr = Transaction::new(doc);
    set_table_default(&mut tr, table_pos, style, value)?;
    Ok(tr)
}

pub(crate) fn set_table_default(
    tr: &mut Transaction,
    table_pos: usize,
    style: StyleAttr,
    value: Option<&str>,
) -> Result<(), TableError> {
    tr.set_node_attr(table_pos, style.key(), to_value(value))?;
    let rewritten = rewrite_cells(tr, table_pos, style.key(), |_| to_value(value))?;
    log::debug!(
        "{} = {:?} on {} cells of table at {}",
        style.key(),
        value,
        rewritten,
        table_pos
    );
    Ok(())
}

/// Re-apply the table's non-null defaults to its cells.
///
/// A banded table gets its banding re-derived instead of the uniform
/// background.
pub(crate) fn reapply_defaults(
    tr: &mut Transaction,
    table_pos: usize,
    settings: &TableSettings,
) -> Result<(), TableError> {
    let table = tr
        .doc()
        .node_at(table_pos)
        .filter(|node| node.kind.is_table())
        .ok_or(TableError::NoEnclosingTable)?
        .clone();
    let banded = is_banded(&table.attrs);

    for style in StyleAttr::ALL {
        if style == StyleAttr::Background && banded {
            continue;
        }
        if let Some(value) = table.attr_str(style.key()) {
            rewrite_cells(tr, table_pos, style.key(), |_| Value::from(value))?;
        }
    }
    if banded {
        band_rows(tr, table_pos, &settings.banding_color)?;
    }
    Ok(())
}

// ============================================================================
// Highlight overlay
// ============================================================================

/// Cells a highlight command acts on: the selected rectangle, or the cell
/// around the cursor
fn highlight_targets(doc: &Document, selection: &Selection) -> Result<Vec<usize>, TableError> {
    match *selection {
        Selection::Cell { .. } => {
            let rect = selected_rect(doc, selection).map_err(|err| match err {
                TableError::NoEnclosingTable => TableError::NoSelectionTarget,
                other => other,
            })?;
            Ok(rect
                .map
                .cells_in_rect(rect.rect)
                .into_iter()
                .map(|pos| pos + rect.table_start)
                .collect())
        }
        Selection::Text { anchor, .. } => cell_around(doc, anchor)
            .map(|(pos, _)| vec![pos])
            .ok_or(TableError::NoSelectionTarget),
    }
}

fn overlay(
    doc: &Document,
    selection: &Selection,
    border: Value,
    border_color: Value,
    highlight: bool,
) -> Result<Transaction, TableError> {
    let targets = highlight_targets(doc, selection)?;
    let mut tr = Transaction::new(doc);
    for pos in targets {
        let mut attrs: Attrs = tr
            .doc()
            .node_at(pos)
            .map(|node| node.attrs.clone())
            .unwrap_or_default();
        attrs.insert(attr::BORDER.to_string(), border.clone());
        attrs.insert(attr::BORDER_COLOR.to_string(), border_color.clone());
        attrs.insert(attr::HIGHLIGHT.to_string(), Value::Bool(highlight));
        tr.set_node_attrs(pos, attrs)?;
    }
    Ok(tr)
}

/// Give the selected cells their own border and exempt them from
/// table-wide defaults
pub fn set_highlight(
    doc: &Document,
    selection: &Selection,
    border: Option<&str>,
    border_color: Option<&str>,
) -> Result<Transaction, TableError> {
    overlay(doc, selection, to_value(border), to_value(border_color), true)
}

/// Drop the override on the selected cells
pub fn clear_highlight(doc: &Document, selection: &Selection) -> Result<Transaction, TableError> {
    overlay(doc, selection, Value::Null, Value::Null, false)
}

// ============================================================================
// Alternating row colors
// ============================================================================

fn is_banded(attrs: &Attrs) -> bool {
    attrs.get(attr::ALTERNATE_COLOR).and_then(Value::as_str) == Some("true")
}

fn band_rows(tr: &mut Transaction, table_pos: usize, color: &str) -> Result<usize, TableError> {
    rewrite_cells(tr, table_pos, attr::BACKGROUND, |cell| {
        if cell.row % 2 == 1 {
            Value::from(color)
        } else {
            Value::Null
        }
    })
}

/// Color odd rows of the table around `selection_pos` and clear even rows.
///
/// The banding is re-derived on every call, even when the table is
/// already flagged as banded.
pub fn apply_alternate_color(
    doc: &Document,
    selection_pos: usize,
    banding_color: &str,
) -> Result<Transaction, TableError> {
    let (table_pos, table) = table_around(doc, selection_pos)?;
    let mut tr = Transaction::new(doc);
    if !is_banded(&table.attrs) {
        tr.set_node_attr(table_pos, attr::ALTERNATE_COLOR, Value::from("true"))?;
    }
    let rewritten = band_rows(&mut tr, table_pos, banding_color)?;
    log::debug!("banded {} cells of table at {}", rewritten, table_pos);
    Ok(tr)
}

/// Turn banding off and restore the table's uniform background
pub fn clear_alternate_color(
    doc: &Document,
    selection_pos: usize,
) -> Result<Transaction, TableError> {
    let (table_pos, table) = table_around(doc, selection_pos)?;
    if !is_banded(&table.attrs) {
        return Err(TableError::NotApplicable("table has no alternating colors"));
    }
    let background = to_value(table.attr_str(attr::BACKGROUND));
    let mut tr = Transaction::new(doc);
    tr.set_node_attr(table_pos, attr::ALTERNATE_COLOR, Value::from("false"))?;
    rewrite_cells(&mut tr, table_pos, attr::BACKGROUND, |_| background.clone())?;
    Ok(tr)
}
