// Grid shape after sequences of row/column insertions

use table_editor_wasm::models::schema::{cell, doc, paragraph, row, spanning_cell, table};
use table_editor_wasm::models::{Document, Node, Selection};
use table_editor_wasm::{TableEditor, TableMap};

fn table_pos(doc: &Document) -> usize {
    doc.table_positions()[0]
}

fn grid(doc: &Document) -> TableMap {
    TableMap::compute(doc.node_at(table_pos(doc)).unwrap())
}

/// Cursor inside the first paragraph of the cell covering (row, col)
fn cursor_in(doc: &Document, row: usize, col: usize) -> Selection {
    let map = grid(doc);
    let cell_pos = table_pos(doc) + 1 + map.cell_at(row, col).unwrap();
    Selection::cursor(cell_pos + 2)
}

fn merged_table() -> Document {
    Document::new(doc(vec![
        paragraph("before"),
        table(vec![
            row(vec![spanning_cell("wide", 2, 1), cell("x")]),
            row(vec![cell("a"), spanning_cell("tall", 1, 2), cell("b")]),
            row(vec![cell("c"), cell("d")]),
        ]),
        paragraph("after"),
    ]))
}

#[test]
fn test_merged_fixture_is_rectangular() {
    let map = grid(&merged_table());
    assert!(map.is_valid(), "fixture should be valid: {:?}", map.problems);
    assert_eq!((map.width, map.height), (3, 3));
}

#[test]
fn test_rectangular_after_insert_sequence() {
    let mut editor = TableEditor::new(merged_table());
    let moves: [(usize, usize, &str); 8] = [
        (0, 0, "colAfter"),
        (1, 1, "rowAfter"),
        (2, 2, "colBefore"),
        (0, 3, "rowBefore"),
        (3, 1, "colAfter"),
        (1, 0, "rowAfter"),
        (4, 4, "colBefore"),
        (2, 1, "rowBefore"),
    ];

    for (r, c, action) in moves {
        let before = grid(editor.doc());
        let sel = cursor_in(editor.doc(), r, c);
        assert!(editor.set_selection(sel));
        let ok = match action {
            "colAfter" => editor.insert_column_after(),
            "colBefore" => editor.insert_column_before(),
            "rowAfter" => editor.insert_row_after(),
            _ => editor.insert_row_before(),
        };
        assert!(ok, "{} at ({}, {}) should apply", action, r, c);

        let after = grid(editor.doc());
        assert!(after.is_valid(), "{} broke the grid: {:?}", action, after.problems);
        if action.starts_with("col") {
            assert_eq!((after.width, after.height), (before.width + 1, before.height));
        } else {
            assert_eq!((after.width, after.height), (before.width, before.height + 1));
        }
    }
}

#[test]
fn test_column_inside_colspan_extends_it() {
    let mut editor = TableEditor::new(merged_table());
    // "x" sits in column 2; insert before it, i.e. at column 2, outside "wide"
    editor.set_selection(cursor_in(editor.doc(), 0, 2));
    assert!(editor.insert_column_before());
    // now insert at column 1, which splits "wide"
    editor.set_selection(cursor_in(editor.doc(), 1, 1));
    assert!(editor.insert_column_before());

    let table = editor.doc().node_at(table_pos(editor.doc())).unwrap().clone();
    let first_row: Vec<&Node> = table.content[0].content.iter().collect();
    assert_eq!(first_row[0].text_content(), "wide");
    assert_eq!(first_row[0].colspan(), 3);
    // "wide", the cell added before "x", "x"
    assert_eq!(first_row.len(), 3);
}

#[test]
fn test_row_inside_rowspan_extends_it() {
    let mut editor = TableEditor::new(merged_table());
    editor.set_selection(cursor_in(editor.doc(), 1, 0));
    assert!(editor.insert_row_after());

    let table = editor.doc().node_at(table_pos(editor.doc())).unwrap().clone();
    let tall = &table.content[1].content[1];
    assert_eq!(tall.text_content(), "tall");
    assert_eq!(tall.rowspan(), 3);
    // the new row only holds cells for the columns "tall" does not cover
    assert_eq!(table.content[2].child_count(), 2);
}

#[test]
fn test_surrounding_blocks_untouched() {
    let mut editor = TableEditor::new(merged_table());
    editor.set_selection(cursor_in(editor.doc(), 2, 0));
    assert!(editor.insert_row_after());
    assert!(editor.insert_column_after());

    let root = editor.doc().root();
    assert_eq!(root.content[0].text_content(), "before");
    assert_eq!(root.content[2].text_content(), "after");
}
