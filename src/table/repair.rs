//! Table repair
//!
//! Keeps the last document known to hold only well-formed tables and
//! computes corrective transactions for tables whose grid no longer
//! resolves.

use super::map::{Problem, TableMap};
use crate::models::schema::create_and_fill;
use crate::models::{attr, Document, Node, NodeKind};
use crate::transform::{Transaction, TransformError};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RepairState {
    Clean,
    NeedsFix,
}

/// Repair state plus the snapshot used as a reference when fixing
#[derive(Clone, Debug)]
pub struct TableRepair {
    snapshot: Option<Document>,
    state: RepairState,
}

impl Default for TableRepair {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRepair {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            state: RepairState::Clean,
        }
    }

    pub fn state(&self) -> RepairState {
        self.state
    }

    pub fn snapshot(&self) -> Option<&Document> {
        self.snapshot.as_ref()
    }

    /// Remember `doc` as the latest structurally valid document
    pub fn record_valid(&mut self, doc: &Document) {
        self.snapshot = Some(doc.clone());
        self.state = RepairState::Clean;
    }

    /// Forget the snapshot and any pending fix
    pub fn clear(&mut self) {
        self.snapshot = None;
        self.state = RepairState::Clean;
    }

    pub fn mark_malformed(&mut self) {
        self.state = RepairState::NeedsFix;
    }

    /// Corrective transaction for `doc`, or `None` when nothing needs fixing
    pub fn fix(&self, doc: &Document) -> Option<Transaction> {
        fix_tables(doc, self.snapshot.as_ref())
    }
}

/// Fix every malformed table in `doc`.
///
/// With a snapshot only tables that differ from it are looked at, and the
/// snapshot's version of a table is restored when the current one cannot
/// be repaired in place.
pub fn fix_tables(doc: &Document, snapshot: Option<&Document>) -> Option<Transaction> {
    let candidates = match snapshot {
        Some(old) => {
            let mut tables = Vec::new();
            changed_tables(old.root(), doc.root(), 0, &mut tables);
            tables
        }
        None => doc.table_positions(),
    };

    let mut tr = Transaction::new(doc);
    for pos in candidates {
        let current = tr.mapping().map_with_assoc(pos, -1);
        let is_table = tr.doc().node_at(current).map_or(false, |n| n.kind.is_table());
        if !is_table {
            continue;
        }
        let reference = snapshot
            .and_then(|old| old.node_at(pos))
            .filter(|node| node.kind.is_table() && TableMap::compute(node).is_valid());
        if let Err(err) = fix_table(&mut tr, current, reference) {
            log::warn!("could not fix table at {}: {}", current, err);
        }
    }

    if tr.steps().is_empty() {
        None
    } else {
        log::info!("table repair queued {} steps", tr.steps().len());
        Some(tr)
    }
}

fn fix_table(
    tr: &mut Transaction,
    table_pos: usize,
    reference: Option<&Node>,
) -> Result<(), TransformError> {
    let table = tr
        .doc()
        .node_at(table_pos)
        .cloned()
        .ok_or(TransformError::NoNodeAt(table_pos))?;
    let map = TableMap::compute(&table);
    if map.is_valid() {
        return Ok(());
    }
    log::debug!("fixing table at {}: {:?}", table_pos, map.problems);

    let unfixable = map
        .problems
        .iter()
        .any(|p| matches!(p, Problem::Empty | Problem::Overflow { .. }));
    if unfixable {
        let end = table_pos + table.node_size();
        match reference {
            Some(old) => {
                tr.replace_with(table_pos, end, vec![old.clone()])?;
            }
            None if map.problems.contains(&Problem::Empty) => {
                remove_table(tr, table_pos, end)?;
            }
            None => log::warn!("table at {} overflows and has no snapshot", table_pos),
        }
        return Ok(());
    }

    let table_start = table_pos + 1;
    let map_start = tr.mapping().len();
    for problem in &map.problems {
        match *problem {
            Problem::Collision {
                pos,
                colspan,
                rowspan,
                ..
            } => {
                let cell = table
                    .node_at(pos)
                    .ok_or(TransformError::NoNodeAt(table_start + pos))?;
                let mut attrs = cell.attrs.clone();
                attrs.insert(attr::COLSPAN.to_string(), Value::from(colspan));
                attrs.insert(attr::ROWSPAN.to_string(), Value::from(rowspan));
                let at = tr.mapping().slice(map_start).map(table_start + pos);
                tr.set_node_attrs(at, attrs)?;
            }
            Problem::Missing { row, n } => {
                let row_node = table
                    .child(row)
                    .ok_or(TransformError::InvalidContent(format!("no row {}", row)))?;
                let kind = row_node
                    .first_child()
                    .map(|cell| cell.kind)
                    .unwrap_or(NodeKind::TableCell);
                let row_end: usize = table.content[..=row].iter().map(Node::node_size).sum();
                let at = tr.mapping().slice(map_start).map(table_start + row_end - 1);
                tr.insert_all(at, (0..n).map(|_| create_and_fill(kind)).collect())?;
            }
            Problem::Empty | Problem::Overflow { .. } => {}
        }
    }
    Ok(())
}

fn remove_table(tr: &mut Transaction, from: usize, to: usize) -> Result<(), TransformError> {
    let only_child = tr.doc().resolve(from)?.parent().child_count() == 1;
    if only_child {
        tr.replace_with(from, to, vec![create_and_fill(NodeKind::Paragraph)])?;
    } else {
        tr.delete(from, to)?;
    }
    Ok(())
}

/// Positions of tables in `cur` that are new or differ from `old`, in
/// document order. Children are compared by index.
fn changed_tables(old: &Node, cur: &Node, offset: usize, out: &mut Vec<usize>) {
    let mut pos = offset;
    for (i, child) in cur.content.iter().enumerate() {
        match old.content.get(i) {
            Some(prev) if prev == child => {}
            Some(prev) if prev.kind == child.kind && !child.is_text() => {
                if child.kind.is_table() {
                    out.push(pos);
                }
                changed_tables(prev, child, pos + 1, out);
            }
            _ => {
                if child.kind.is_table() {
                    out.push(pos);
                }
                child.nodes_between(0, child.content_size(), pos + 1, &mut |node, p| {
                    if node.kind.is_table() {
                        out.push(p);
                    }
                    true
                });
            }
        }
        pos += child.node_size();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::{cell, doc, header_cell, paragraph, row, spanning_cell, table};

    fn grid(doc: &Document, pos: usize) -> TableMap {
        TableMap::compute(doc.node_at(pos).unwrap())
    }

    #[test]
    fn test_valid_document_needs_nothing() {
        let d = Document::new(doc(vec![table(vec![row(vec![cell("a")])])]));
        assert!(fix_tables(&d, None).is_none());
        assert!(fix_tables(&d, Some(&d)).is_none());
    }

    #[test]
    fn test_missing_cell_appended() {
        let d = Document::new(doc(vec![table(vec![
            row(vec![header_cell("h1"), header_cell("h2")]),
            row(vec![cell("a")]),
        ])]));
        let fixed = fix_tables(&d, None).unwrap().into_doc();
        let map = grid(&fixed, 0);
        assert!(map.is_valid());
        let rows = &fixed.node_at(0).unwrap().content;
        assert_eq!(rows[1].child_count(), 2);
        assert_eq!(rows[1].content[1].kind, NodeKind::TableCell);
    }

    #[test]
    fn test_overlong_rowspan_trimmed() {
        let d = Document::new(doc(vec![table(vec![row(vec![
            spanning_cell("a", 1, 3),
            cell("b"),
        ])])]));
        let fixed = fix_tables(&d, None).unwrap().into_doc();
        assert!(grid(&fixed, 0).is_valid());
        assert_eq!(fixed.node_at(0).unwrap().content[0].content[0].rowspan(), 1);
    }

    #[test]
    fn test_overlap_fixed_in_one_pass() {
        let d = Document::new(doc(vec![table(vec![
            row(vec![cell("x"), spanning_cell("a", 1, 2)]),
            row(vec![spanning_cell("c", 2, 1)]),
        ])]));
        let fixed = fix_tables(&d, None).unwrap().into_doc();
        assert!(grid(&fixed, 0).is_valid());
        assert!(fix_tables(&fixed, None).is_none());
    }

    #[test]
    fn test_later_table_positions_are_mapped() {
        let d = Document::new(doc(vec![
            table(vec![row(vec![cell("a"), cell("b")]), row(vec![cell("c")])]),
            paragraph("between"),
            table(vec![row(vec![cell("d"), cell("e")]), row(vec![cell("f")])]),
        ]));
        let fixed = fix_tables(&d, None).unwrap().into_doc();
        let tables = fixed.table_positions();
        assert_eq!(tables.len(), 2);
        for pos in tables {
            assert!(grid(&fixed, pos).is_valid());
        }
    }

    #[test]
    fn test_empty_table_restored_from_snapshot() {
        let good = Document::new(doc(vec![
            paragraph("x"),
            table(vec![row(vec![cell("a")])]),
        ]));
        let broken = Document::new(doc(vec![paragraph("x"), table(vec![row(vec![])])]));
        let fixed = fix_tables(&broken, Some(&good)).unwrap().into_doc();
        assert_eq!(fixed, good);
    }

    #[test]
    fn test_empty_table_removed_without_snapshot() {
        let broken = Document::new(doc(vec![paragraph("x"), table(vec![])]));
        let fixed = fix_tables(&broken, None).unwrap().into_doc();
        assert_eq!(fixed, Document::new(doc(vec![paragraph("x")])));
    }

    #[test]
    fn test_unchanged_tables_skipped_with_snapshot() {
        // a malformed table that is also in the snapshot is left alone
        let d = Document::new(doc(vec![table(vec![
            row(vec![cell("a"), cell("b")]),
            row(vec![cell("c")]),
        ])]));
        assert!(fix_tables(&d, Some(&d)).is_none());
    }

    #[test]
    fn test_state_transitions() {
        let d = Document::new(doc(vec![paragraph("x")]));
        let mut repair = TableRepair::new();
        assert_eq!(repair.state(), RepairState::Clean);
        assert!(repair.snapshot().is_none());
        repair.mark_malformed();
        assert_eq!(repair.state(), RepairState::NeedsFix);
        repair.record_valid(&d);
        assert_eq!(repair.state(), RepairState::Clean);
        assert_eq!(repair.snapshot(), Some(&d));

        repair.mark_malformed();
        repair.clear();
        assert_eq!(repair.state(), RepairState::Clean);
        assert!(repair.snapshot().is_none());
    }
}
