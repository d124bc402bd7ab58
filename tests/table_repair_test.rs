// Repair of malformed tables, with and without a recorded snapshot

use table_editor_wasm::models::schema::{
    cell, create_table, doc, paragraph, row, spanning_cell, table,
};
use table_editor_wasm::models::{Document, Selection};
use table_editor_wasm::table::{fix_tables, RepairState, MAX_COLSPAN};
use table_editor_wasm::{TableEditor, TableMap};

fn all_valid(doc: &Document) -> bool {
    doc.table_positions()
        .into_iter()
        .all(|pos| TableMap::compute(doc.node_at(pos).unwrap()).is_valid())
}

#[test]
fn test_fix_is_idempotent_on_valid_tables() {
    let mut editor = TableEditor::new(Document::new(doc(vec![
        paragraph("intro"),
        create_table(2, 3, true),
    ])));
    let before = editor.doc().clone();
    assert!(!editor.fix_table());
    assert!(!editor.fix_table());
    assert_eq!(editor.doc(), &before);
    assert_eq!(editor.repair_state(), RepairState::Clean);
}

#[test]
fn test_missing_and_colliding_cells_fixed() {
    let broken = Document::new(doc(vec![table(vec![
        row(vec![cell("a"), cell("b"), cell("c")]),
        // "d" claims one row more than the table has left
        row(vec![spanning_cell("d", 1, 3), cell("x")]),
        row(vec![cell("e")]),
    ])]));
    let mut editor = TableEditor::new(broken);
    editor.set_selection(Selection::cursor(4));
    assert!(!editor.insert_row_after());
    assert_eq!(editor.repair_state(), RepairState::NeedsFix);

    assert!(editor.fix_table());
    assert!(all_valid(editor.doc()));
    assert_eq!(editor.repair_state(), RepairState::Clean);
    assert_eq!(editor.snapshot(), Some(editor.doc()));

    // a second fix has nothing left to do
    assert!(!editor.fix_table());
    assert!(editor.insert_row_after());
}

#[test]
fn test_snapshot_restores_emptied_table() {
    let mut editor = TableEditor::new(Document::new(doc(vec![
        paragraph("x"),
        create_table(2, 2, false),
    ])));
    // table at 3; first cell at 5, its paragraph content at 7
    editor.set_selection(Selection::cursor(7));
    assert!(editor.insert_column_after());
    let good = editor.snapshot().cloned().unwrap();

    // the host hands back a document whose table lost all its rows
    editor.load(Document::new(doc(vec![paragraph("x"), table(vec![])])));
    assert!(editor.fix_table());
    assert_eq!(editor.doc(), &good);
}

#[test]
fn test_only_changed_tables_examined() {
    let good = Document::new(doc(vec![
        create_table(1, 2, false),
        create_table(1, 2, false),
    ]));
    // second table lost a cell
    let broken = Document::new(doc(vec![
        create_table(1, 2, false),
        table(vec![
            row(vec![cell(""), cell("")]),
            row(vec![cell("")]),
        ]),
    ]));
    let tr = fix_tables(&broken, Some(&good)).unwrap();
    assert!(all_valid(tr.doc()));
    // the untouched first table produced no steps of its own
    assert_eq!(tr.steps().len(), 1);
}

#[test]
fn test_huge_colspan_shrunk_by_fix() {
    let cell_json = |extra: &str| {
        format!(
            r#"{{"type": "tableCell", {}"content": [{{"type": "paragraph"}}]}}"#,
            extra
        )
    };
    let wide = cell_json(r#""attrs": {"colspan": 4611686018427387904}, "#);
    let plain = format!(r#"{{"type": "tableRow", "content": [{}]}}"#, cell_json(""));
    let json = format!(
        r#"{{"type": "doc", "content": [{{"type": "table", "content": [
            {{"type": "tableRow", "content": [{}]}}, {}, {}, {}
        ]}}]}}"#,
        wide, plain, plain, plain
    );

    let mut editor = TableEditor::default();
    editor.load(Document::from_json(&json).unwrap());
    assert!(editor.fix_table());
    assert!(all_valid(editor.doc()));

    let fixed = editor.doc().node_at(0).unwrap();
    assert_eq!(fixed.content[0].content[0].colspan(), MAX_COLSPAN);
    let map = TableMap::compute(fixed);
    assert_eq!((map.width, map.height), (MAX_COLSPAN, 4));
    assert!(fixed.content[1..].iter().all(|r| r.child_count() == MAX_COLSPAN));
    assert!(!editor.fix_table());
}
