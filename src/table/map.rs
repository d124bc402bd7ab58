//! Grid resolver
//!
//! Maps a table's row/cell tree onto a logical `width` x `height` grid.
//! Each slot holds the position of the covering cell, relative to the
//! table's content start. Cells spanning several slots appear in all of
//! them. Structural inconsistencies are collected as problems; a table is
//! valid exactly when there are none.

use super::errors::TableError;
use crate::models::{Document, Node, NodeKind, Selection};
use serde::Serialize;

/// Widest span a single cell may claim, the same cap browsers put on `colspan`
pub const MAX_COLSPAN: usize = 1000;

/// Rectangle of grid slots, `right` and `bottom` exclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl Rect {
    pub fn new(left: usize, top: usize, right: usize, bottom: usize) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> usize {
        self.right - self.left
    }

    pub fn height(&self) -> usize {
        self.bottom - self.top
    }
}

/// A structural inconsistency found while building the grid
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Problem {
    /// The cell at `pos` (starting in `row`) overlaps other cells or runs
    /// past the last row; `colspan`/`rowspan` are the spans that fit
    Collision {
        row: usize,
        pos: usize,
        colspan: usize,
        rowspan: usize,
    },

    /// `n` slots at the end of `row` are covered by no cell
    Missing { row: usize, n: usize },

    /// The cell at `pos` found no free slot left in `row`, or the grid
    /// is too large to address at all
    Overflow { row: usize, pos: usize },

    /// The table has no rows or no columns
    Empty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableMap {
    pub width: usize,
    pub height: usize,
    /// `width * height` cell positions, row by row
    pub map: Vec<usize>,
    pub problems: Vec<Problem>,
}

impl TableMap {
    /// Build the grid for `table`, recording any problems
    pub fn compute(table: &Node) -> TableMap {
        let width = find_width(table);
        let height = table.child_count();
        let mut problems = Vec::new();

        if width == 0 || height == 0 {
            problems.push(Problem::Empty);
            return TableMap {
                width,
                height,
                map: Vec::new(),
                problems,
            };
        }
        let Some(size) = width.checked_mul(height) else {
            log::warn!("table grid of {} x {} cannot be addressed", width, height);
            problems.push(Problem::Overflow { row: 0, pos: 1 });
            return TableMap {
                width: 0,
                height,
                map: Vec::new(),
                problems,
            };
        };
        let mut map = vec![0usize; size];

        // Cell positions start at 1 (after the first row's opening token),
        // so 0 marks a free slot.
        let mut map_pos = 0;
        let mut pos = 0;
        for (row, row_node) in table.content.iter().enumerate() {
            pos += 1;
            let row_end = (row + 1) * width;

            for (index, cell) in row_node.content.iter().enumerate() {
                while map_pos < row_end && map[map_pos] != 0 {
                    map_pos += 1;
                }
                if map_pos >= row_end {
                    problems.push(Problem::Overflow { row, pos });
                    pos += cell.node_size();
                    continue;
                }

                let (colspan, rowspan) = (cell.colspan(), cell.rowspan());
                let col = map_pos % width;
                // leave one slot for each cell still to come in this row
                let later = row_node.content.len() - index - 1;
                let room = (width - col).saturating_sub(later).max(1);

                let mut fit_cols = 0;
                while fit_cols < colspan.min(room)
                    && col + fit_cols < width
                    && map[map_pos + fit_cols] == 0
                {
                    fit_cols += 1;
                }
                let mut fit_rows = 1;
                while fit_rows < rowspan
                    && row + fit_rows < height
                    && (0..fit_cols).all(|w| map[map_pos + fit_rows * width + w] == 0)
                {
                    fit_rows += 1;
                }

                for h in 0..fit_rows {
                    for w in 0..fit_cols {
                        map[map_pos + h * width + w] = pos;
                    }
                }
                if fit_cols != colspan || fit_rows != rowspan {
                    problems.push(Problem::Collision {
                        row,
                        pos,
                        colspan: fit_cols,
                        rowspan: fit_rows,
                    });
                }

                map_pos += fit_cols;
                pos += cell.node_size();
            }

            let mut missing = 0;
            while map_pos < row_end {
                if map[map_pos] == 0 {
                    missing += 1;
                }
                map_pos += 1;
            }
            if missing > 0 {
                problems.push(Problem::Missing { row, n: missing });
            }
            pos += 1;
        }

        TableMap {
            width,
            height,
            map,
            problems,
        }
    }

    /// Build the grid, failing with `MalformedTable` when it has problems.
    /// `table_pos` is only used to report the failing table.
    pub fn resolve(table: &Node, table_pos: usize) -> Result<TableMap, TableError> {
        let map = TableMap::compute(table);
        if map.problems.is_empty() {
            Ok(map)
        } else {
            log::debug!("table at {} has problems: {:?}", table_pos, map.problems);
            Err(TableError::MalformedTable {
                pos: table_pos,
                problems: map.problems,
            })
        }
    }

    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    /// Cell position covering slot (`row`, `col`)
    pub fn cell_at(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.height && col < self.width {
            Some(self.map[row * self.width + col])
        } else {
            None
        }
    }

    /// Slots covered by the cell at `pos`
    pub fn find_cell(&self, pos: usize) -> Option<Rect> {
        let index = self.map.iter().position(|&p| p == pos)?;
        let left = index % self.width;
        let top = index / self.width;
        let mut right = left + 1;
        let mut bottom = top + 1;
        while right < self.width && self.map[top * self.width + right] == pos {
            right += 1;
        }
        while bottom < self.height && self.map[bottom * self.width + left] == pos {
            bottom += 1;
        }
        Some(Rect::new(left, top, right, bottom))
    }

    /// Position at which a cell placed at (`row`, `col`) has to be
    /// inserted, skipping cells that only reach into the row from above
    pub fn position_at(&self, row: usize, col: usize, table: &Node) -> usize {
        let mut row_start = 0;
        for (i, row_node) in table.content.iter().enumerate() {
            let row_end = row_start + row_node.node_size();
            if i == row {
                let mut index = col + row * self.width;
                let row_end_index = (row + 1) * self.width;
                while index < row_end_index && self.map[index] < row_start {
                    index += 1;
                }
                return if index == row_end_index {
                    row_end - 1
                } else {
                    self.map[index]
                };
            }
            row_start = row_end;
        }
        row_start
    }

    /// Smallest rectangle covering both cells
    pub fn rect_between(&self, a: usize, b: usize) -> Option<Rect> {
        let ra = self.find_cell(a)?;
        let rb = self.find_cell(b)?;
        Some(Rect::new(
            ra.left.min(rb.left),
            ra.top.min(rb.top),
            ra.right.max(rb.right),
            ra.bottom.max(rb.bottom),
        ))
    }

    /// Every distinct cell overlapping `rect`, in reading order
    pub fn cells_in_rect(&self, rect: Rect) -> Vec<usize> {
        let mut result = Vec::new();
        for row in rect.top..rect.bottom.min(self.height) {
            for col in rect.left..rect.right.min(self.width) {
                let pos = self.map[row * self.width + col];
                if !result.contains(&pos) {
                    result.push(pos);
                }
            }
        }
        result
    }
}

/// Widest row, counting cells reaching down from earlier rows.
/// Each colspan counts for at most `MAX_COLSPAN` slots.
fn find_width(table: &Node) -> usize {
    let span = |cell: &Node| cell.colspan().min(MAX_COLSPAN);
    let mut width = 0;
    let mut has_rowspan = false;
    for (r, row_node) in table.content.iter().enumerate() {
        let mut row_width: usize = 0;
        if has_rowspan {
            for (j, prev) in table.content[..r].iter().enumerate() {
                let reaching = prev
                    .content
                    .iter()
                    .filter(|cell| j.saturating_add(cell.rowspan()) > r);
                for cell in reaching {
                    row_width = row_width.saturating_add(span(cell));
                }
            }
        }
        for cell in &row_node.content {
            row_width = row_width.saturating_add(span(cell));
            if cell.rowspan() > 1 {
                has_rowspan = true;
            }
        }
        width = width.max(row_width);
    }
    width
}

// ============================================================================
// Table lookup from a selection
// ============================================================================

/// Innermost table containing `pos`
pub fn table_around(doc: &Document, pos: usize) -> Result<(usize, &Node), TableError> {
    let resolved = doc.resolve(pos).map_err(|_| TableError::NoEnclosingTable)?;
    resolved
        .ancestor_of_kind(NodeKind::Table)
        .ok_or(TableError::NoEnclosingTable)
}

/// Innermost cell containing `pos`
pub fn cell_around(doc: &Document, pos: usize) -> Option<(usize, &Node)> {
    doc.resolve(pos)
        .ok()?
        .find_ancestor(|node| node.kind.is_cell())
}

/// A table together with its grid and the rectangle a command acts on
#[derive(Clone, Debug)]
pub struct TableRect {
    pub rect: Rect,
    pub map: TableMap,
    pub table: Node,
    /// Position directly before the table
    pub table_pos: usize,
    /// Position where the table's content starts
    pub table_start: usize,
}

impl TableRect {
    /// Re-read the table and its grid from `doc` after edits inside it
    pub fn refresh(&mut self, doc: &Document) -> Result<(), TableError> {
        let table = doc
            .node_at(self.table_pos)
            .filter(|node| node.kind.is_table())
            .ok_or(TableError::NoEnclosingTable)?;
        self.map = TableMap::resolve(table, self.table_pos)?;
        self.table = table.clone();
        Ok(())
    }

    /// Cell node at a position relative to the table's content start
    pub fn cell(&self, pos: usize) -> Option<&Node> {
        self.table.node_at(pos)
    }
}

/// Table, grid and selected rectangle for the current selection
pub fn selected_rect(doc: &Document, selection: &Selection) -> Result<TableRect, TableError> {
    let (table_pos, table, anchor_cell, head_cell) = match *selection {
        Selection::Cell { anchor, head } => {
            let (table_pos, table) = table_around(doc, anchor)?;
            for pos in [anchor, head] {
                if !doc.node_at(pos).map_or(false, |n| n.kind.is_cell()) {
                    return Err(TableError::NoSelectionTarget);
                }
            }
            (table_pos, table, anchor, head)
        }
        Selection::Text { anchor, .. } => {
            let (table_pos, table) = table_around(doc, anchor)?;
            let (cell_pos, _) = cell_around(doc, anchor).ok_or(TableError::NoSelectionTarget)?;
            (table_pos, table, cell_pos, cell_pos)
        }
    };

    let map = TableMap::resolve(table, table_pos)?;
    let table_start = table_pos + 1;
    let rect = match (
        anchor_cell.checked_sub(table_start),
        head_cell.checked_sub(table_start),
    ) {
        (Some(a), Some(h)) => map.rect_between(a, h),
        _ => None,
    }
    .ok_or(TableError::NoSelectionTarget)?;

    Ok(TableRect {
        rect,
        map,
        table: table.clone(),
        table_pos,
        table_start,
    })
}
