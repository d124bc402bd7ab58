//! Structural edits on tables
//!
//! Row and column insertion, deletion, merging and splitting. Every edit
//! reads the grid of the table as it was when the command started and
//! writes through the transaction's mapping, so positions taken from the
//! original grid stay correct after earlier steps shifted content.

use super::errors::TableError;
use super::map::{cell_around, selected_rect, table_around, Rect, TableMap, TableRect};
use super::settings::TableSettings;
use super::style::reapply_defaults;
use crate::models::schema::{create_and_fill, create_cell, create_table};
use crate::models::{attr, Attrs, Document, Node, NodeKind, Selection};
use crate::transform::{Transaction, TransformError};
use serde_json::Value;
use wasm_bindgen::prelude::*;

/// Which side of the selection a row or column is added on
#[wasm_bindgen]
#[repr(u8)]
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    serde_repr::Serialize_repr,
    serde_repr::Deserialize_repr,
)]
pub enum InsertSide {
    Before = 0,
    After = 1,
}

fn cell_in(rect: &TableRect, pos: usize) -> Result<&Node, TableError> {
    rect.cell(pos)
        .filter(|node| node.kind.is_cell())
        .ok_or(TableError::Transform(TransformError::NoNodeAt(rect.table_start + pos)))
}

fn with_span(attrs: &Attrs, key: &str, value: usize) -> Attrs {
    let mut attrs = attrs.clone();
    attrs.insert(key.to_string(), Value::from(value));
    attrs
}

/// A cell whose only content is one empty paragraph
fn is_empty_cell(cell: &Node) -> bool {
    match cell.content.as_slice() {
        [] => true,
        [only] => only.kind == NodeKind::Paragraph && only.content.is_empty(),
        _ => false,
    }
}

// ============================================================================
// Column insertion
// ============================================================================

/// Insert a column at grid index `col` (0..=width).
///
/// Cells spanning across the insertion line grow by one column instead of
/// getting a new neighbour. New cells copy the type of the cell that ends
/// up next to them: the one now at `col`, or the last one when appending.
pub fn insert_column(
    tr: &mut Transaction,
    rect: &TableRect,
    col: usize,
) -> Result<(), TableError> {
    let map = &rect.map;
    let mut row = 0;
    while row < map.height {
        let index = row * map.width + col;
        if col > 0 && col < map.width && map.map[index - 1] == map.map[index] {
            let pos = map.map[index];
            let cell = cell_in(rect, pos)?;
            let attrs = with_span(&cell.attrs, attr::COLSPAN, cell.colspan() + 1);
            let at = tr.mapping().map(rect.table_start + pos);
            tr.set_node_attrs(at, attrs)?;
            row += cell.rowspan();
        } else {
            let ref_index = if col < map.width { index } else { index - 1 };
            let kind = rect
                .cell(map.map[ref_index])
                .map(|cell| cell.kind)
                .unwrap_or(NodeKind::TableCell);
            let pos = map.position_at(row, col, &rect.table);
            let at = tr.mapping().map(rect.table_start + pos);
            tr.insert(at, create_and_fill(kind))?;
            row += 1;
        }
    }
    Ok(())
}

// ============================================================================
// Row insertion
// ============================================================================

/// Insert a row at grid index `row` (0..=height).
///
/// Cells spanning across the insertion line grow by one row; every other
/// column gets a fresh cell typed after the row now at `row` (or the last
/// row when appending).
pub fn insert_row(tr: &mut Transaction, rect: &TableRect, row: usize) -> Result<(), TableError> {
    let map = &rect.map;
    let row_pos = rect.table_start
        + rect.table.content[..row.min(rect.table.child_count())]
            .iter()
            .map(Node::node_size)
            .sum::<usize>();
    let ref_row = if row < map.height { row } else { row - 1 };

    let mut cells = Vec::new();
    let mut col = 0;
    while col < map.width {
        let index = row * map.width + col;
        if row > 0 && row < map.height && map.map[index] == map.map[index - map.width] {
            let pos = map.map[index];
            let cell = cell_in(rect, pos)?;
            let attrs = with_span(&cell.attrs, attr::ROWSPAN, cell.rowspan() + 1);
            let at = tr.mapping().map(rect.table_start + pos);
            tr.set_node_attrs(at, attrs)?;
            col += cell.colspan();
        } else {
            let kind = rect
                .cell(map.map[ref_row * map.width + col])
                .map(|cell| cell.kind)
                .unwrap_or(NodeKind::TableCell);
            cells.push(create_and_fill(kind));
            col += 1;
        }
    }

    let at = tr.mapping().map(row_pos);
    tr.insert(at, Node::new(NodeKind::TableRow, Attrs::new(), cells))?;
    Ok(())
}

fn finish_insert(
    tr: &mut Transaction,
    table_pos: usize,
    settings: &TableSettings,
) -> Result<(), TableError> {
    if settings.propagate_on_insert {
        let table_pos = tr.mapping().map_with_assoc(table_pos, -1);
        reapply_defaults(tr, table_pos, settings)?;
    }
    Ok(())
}

/// Add a column before or after the selected cells
pub fn add_column(
    doc: &Document,
    selection: &Selection,
    side: InsertSide,
    settings: &TableSettings,
) -> Result<Transaction, TableError> {
    let rect = selected_rect(doc, selection)?;
    let col = match side {
        InsertSide::Before => rect.rect.left,
        InsertSide::After => rect.rect.right,
    };
    let mut tr = Transaction::new(doc);
    insert_column(&mut tr, &rect, col)?;
    finish_insert(&mut tr, rect.table_pos, settings)?;
    log::debug!("inserted column {} in table at {}", col, rect.table_pos);
    Ok(tr)
}

/// Add a row above or below the selected cells
pub fn add_row(
    doc: &Document,
    selection: &Selection,
    side: InsertSide,
    settings: &TableSettings,
) -> Result<Transaction, TableError> {
    let rect = selected_rect(doc, selection)?;
    let row = match side {
        InsertSide::Before => rect.rect.top,
        InsertSide::After => rect.rect.bottom,
    };
    let mut tr = Transaction::new(doc);
    insert_row(&mut tr, &rect, row)?;
    finish_insert(&mut tr, rect.table_pos, settings)?;
    log::debug!("inserted row {} in table at {}", row, rect.table_pos);
    Ok(tr)
}

// ============================================================================
// Deletion
// ============================================================================

fn remove_column(tr: &mut Transaction, rect: &TableRect, col: usize) -> Result<(), TableError> {
    let map = &rect.map;
    let map_start = tr.mapping().len();
    let mut row = 0;
    while row < map.height {
        let index = row * map.width + col;
        let pos = map.map[index];
        let cell = cell_in(rect, pos)?;
        let at = tr.mapping().slice(map_start).map(rect.table_start + pos);
        let spanning = (col > 0 && map.map[index - 1] == pos)
            || (col + 1 < map.width && map.map[index + 1] == pos);
        if spanning {
            let attrs = with_span(&cell.attrs, attr::COLSPAN, cell.colspan() - 1);
            tr.set_node_attrs(at, attrs)?;
        } else {
            tr.delete(at, at + cell.node_size())?;
        }
        row += cell.rowspan();
    }
    Ok(())
}

/// Delete the selected columns. Refuses to delete all of them.
pub fn delete_column(doc: &Document, selection: &Selection) -> Result<Transaction, TableError> {
    let mut rect = selected_rect(doc, selection)?;
    let Rect { left, right, .. } = rect.rect;
    if left == 0 && right == rect.map.width {
        return Err(TableError::NotApplicable("cannot delete every column"));
    }
    let mut tr = Transaction::new(doc);
    for col in (left..right).rev() {
        remove_column(&mut tr, &rect, col)?;
        if col > left {
            rect.refresh(tr.doc())?;
        }
    }
    Ok(tr)
}

fn remove_row(tr: &mut Transaction, rect: &TableRect, row: usize) -> Result<(), TableError> {
    let map = &rect.map;
    let table = &rect.table;
    let row_pos: usize = table.content[..row].iter().map(Node::node_size).sum();
    let row_node = table
        .child(row)
        .ok_or(TableError::Transform(TransformError::NoNodeAt(rect.table_start + row_pos)))?;

    let map_from = tr.mapping().len();
    tr.delete(
        rect.table_start + row_pos,
        rect.table_start + row_pos + row_node.node_size(),
    )?;

    let mut col = 0;
    while col < map.width {
        let index = row * map.width + col;
        let pos = map.map[index];
        let cell = cell_in(rect, pos)?;
        if row > 0 && pos == map.map[index - map.width] {
            // starts above: shrink it
            let attrs = with_span(&cell.attrs, attr::ROWSPAN, cell.rowspan() - 1);
            let at = tr.mapping().slice(map_from).map(rect.table_start + pos);
            tr.set_node_attrs(at, attrs)?;
        } else if row + 1 < map.height && pos == map.map[index + map.width] {
            // continues below: move it down into the next row
            let copy = cell.with_attrs(with_span(&cell.attrs, attr::ROWSPAN, cell.rowspan() - 1));
            let new_pos = map.position_at(row + 1, col, table);
            let at = tr.mapping().slice(map_from).map(rect.table_start + new_pos);
            tr.insert(at, copy)?;
        }
        col += cell.colspan();
    }
    Ok(())
}

/// Delete the selected rows. Refuses to delete all of them.
pub fn delete_row(doc: &Document, selection: &Selection) -> Result<Transaction, TableError> {
    let mut rect = selected_rect(doc, selection)?;
    let Rect { top, bottom, .. } = rect.rect;
    if top == 0 && bottom == rect.map.height {
        return Err(TableError::NotApplicable("cannot delete every row"));
    }
    let mut tr = Transaction::new(doc);
    for row in (top..bottom).rev() {
        remove_row(&mut tr, &rect, row)?;
        if row > top {
            rect.refresh(tr.doc())?;
        }
    }
    Ok(tr)
}

// ============================================================================
// Merging and splitting
// ============================================================================

/// Whether any cell crosses the border of `rect`
fn cells_overlap_rectangle(map: &TableMap, rect: Rect) -> bool {
    let width = map.width;
    for row in rect.top..rect.bottom {
        let left = row * width + rect.left;
        let right = row * width + rect.right - 1;
        if (rect.left > 0 && map.map[left] == map.map[left - 1])
            || (rect.right < width && map.map[right] == map.map[right + 1])
        {
            return true;
        }
    }
    for col in rect.left..rect.right {
        let top = rect.top * width + col;
        let bottom = (rect.bottom - 1) * width + col;
        if (rect.top > 0 && map.map[top] == map.map[top - width])
            || (rect.bottom < map.height && map.map[bottom] == map.map[bottom + width])
        {
            return true;
        }
    }
    false
}

/// Merge the selected cells into the top-left one.
///
/// The merged cell spans the whole rectangle and receives the content of
/// every non-empty cell it absorbed.
pub fn merge_cells(doc: &Document, selection: &Selection) -> Result<Transaction, TableError> {
    if !selection.is_cell_selection() || selection.anchor() == selection.head() {
        return Err(TableError::NotApplicable("select more than one cell to merge"));
    }
    let rect = selected_rect(doc, selection)?;
    if cells_overlap_rectangle(&rect.map, rect.rect) {
        return Err(TableError::NotApplicable("selection cuts through a merged cell"));
    }

    let mut tr = Transaction::new(doc);
    let mut merged: Option<(usize, &Node)> = None;
    let mut content = Vec::new();
    for pos in rect.map.cells_in_rect(rect.rect) {
        let cell = cell_in(&rect, pos)?;
        if merged.is_none() {
            merged = Some((pos, cell));
            continue;
        }
        if !is_empty_cell(cell) {
            content.extend(cell.content.iter().cloned());
        }
        let at = tr.mapping().map(rect.table_start + pos);
        tr.delete(at, at + cell.node_size())?;
    }
    let (merged_pos, merged_cell) = merged.ok_or(TableError::NoSelectionTarget)?;

    let at = tr.mapping().map_with_assoc(rect.table_start + merged_pos, -1);
    let mut attrs = with_span(&merged_cell.attrs, attr::COLSPAN, rect.rect.width());
    attrs.insert(attr::ROWSPAN.to_string(), Value::from(rect.rect.height()));
    tr.set_node_attrs(at, attrs)?;

    if !content.is_empty() {
        let end = at + 1 + merged_cell.content_size();
        let start = if is_empty_cell(merged_cell) { at + 1 } else { end };
        tr.replace_with(start, end, content)?;
    }
    tr.set_selection(Selection::cell(at));
    Ok(tr)
}

/// Split a merged cell back into single cells that copy its attributes
pub fn split_cell(doc: &Document, selection: &Selection) -> Result<Transaction, TableError> {
    let cell_pos = match *selection {
        Selection::Cell { anchor, head } if anchor == head => anchor,
        Selection::Cell { .. } => {
            return Err(TableError::NotApplicable("select a single cell to split"));
        }
        Selection::Text { anchor, .. } => {
            table_around(doc, anchor)?;
            cell_around(doc, anchor)
                .ok_or(TableError::NoSelectionTarget)?
                .0
        }
    };
    let cell = doc
        .node_at(cell_pos)
        .filter(|node| node.kind.is_cell())
        .ok_or(TableError::NoSelectionTarget)?;
    if cell.colspan() == 1 && cell.rowspan() == 1 {
        return Err(TableError::NotApplicable("cell is not merged"));
    }

    let rect = selected_rect(doc, &Selection::cell(cell_pos))?;
    let base = {
        let attrs = with_span(&cell.attrs, attr::COLSPAN, 1);
        with_span(&attrs, attr::ROWSPAN, 1)
    };

    let mut tr = Transaction::new(doc);
    let mut last_cell = None;
    for row in rect.rect.top..rect.rect.bottom {
        let mut pos = rect.map.position_at(row, rect.rect.left, &rect.table);
        if row == rect.rect.top {
            pos += cell.node_size();
        }
        for col in rect.rect.left..rect.rect.right {
            if col == rect.rect.left && row == rect.rect.top {
                continue;
            }
            let at = tr.mapping().map(rect.table_start + pos);
            tr.insert(at, create_cell(cell.kind, base.clone()))?;
            last_cell = Some(at);
        }
    }
    tr.set_node_attrs(cell_pos, base)?;

    if selection.is_cell_selection() {
        tr.set_selection(Selection::cells(cell_pos, last_cell.unwrap_or(cell_pos)));
    }
    Ok(tr)
}

// ============================================================================
// Whole tables
// ============================================================================

/// Insert a fresh table after the top-level block holding the selection
pub fn insert_table(
    doc: &Document,
    selection: &Selection,
    rows: usize,
    cols: usize,
    header_row: bool,
) -> Result<Transaction, TableError> {
    let anchor = selection.anchor().min(doc.content_size());
    let resolved = doc.resolve(anchor)?;
    let at = if resolved.depth() >= 1 {
        resolved.after(1)
    } else {
        anchor
    };

    let mut tr = Transaction::new(doc);
    tr.insert(at, create_table(rows, cols, header_row))?;
    // table, row, cell, paragraph
    tr.set_selection(Selection::cursor(at + 4));
    log::debug!("inserted {}x{} table at {}", rows, cols, at);
    Ok(tr)
}

/// Delete the table around the selection.
///
/// A table that was the only child of its parent is replaced by an empty
/// paragraph so the parent keeps some content.
pub fn delete_table(doc: &Document, selection: &Selection) -> Result<Transaction, TableError> {
    let (table_pos, table) = table_around(doc, selection.anchor())?;
    let only_child = doc.resolve(table_pos)?.parent().child_count() == 1;

    let mut tr = Transaction::new(doc);
    let end = table_pos + table.node_size();
    if only_child {
        tr.replace_with(table_pos, end, vec![create_and_fill(NodeKind::Paragraph)])?;
        tr.set_selection(Selection::cursor(table_pos + 1));
    } else {
        tr.delete(table_pos, end)?;
        tr.set_selection(Selection::cursor(table_pos));
    }
    Ok(tr)
}
