// Deleting, merging and splitting through the editor

use table_editor_wasm::models::schema::{cell, doc, paragraph, row, table};
use table_editor_wasm::models::{Document, Selection};
use table_editor_wasm::{TableCommand, TableEditor, TableMap};

/// 3x3 table of one-letter cells at position 0
fn letters() -> TableEditor {
    let rows = ["abc", "def", "ghi"]
        .iter()
        .map(|letters| {
            row(letters
                .chars()
                .map(|ch| cell(&ch.to_string()))
                .collect())
        })
        .collect();
    TableEditor::new(Document::new(doc(vec![table(rows), paragraph("end")])))
}

/// Position before cell (row, col) of the table at position 0
fn cell_pos(editor: &TableEditor, row: usize, col: usize) -> usize {
    let map = TableMap::compute(editor.doc().node_at(0).unwrap());
    1 + map.cell_at(row, col).unwrap()
}

fn texts(editor: &TableEditor) -> Vec<String> {
    editor
        .doc()
        .node_at(0)
        .unwrap()
        .content
        .iter()
        .map(|r| r.content.iter().map(|c| c.text_content()).collect::<Vec<_>>().join(","))
        .collect()
}

#[test]
fn test_delete_middle_column_and_row() {
    let mut editor = letters();
    let pos = cell_pos(&editor, 1, 1);
    editor.set_selection(Selection::cursor(pos + 2));
    assert!(editor.delete_column());
    assert_eq!(texts(&editor), vec!["a,c", "d,f", "g,i"]);

    let pos = cell_pos(&editor, 1, 0);
    editor.set_selection(Selection::cursor(pos + 2));
    assert!(editor.delete_row());
    assert_eq!(texts(&editor), vec!["a,c", "g,i"]);
}

#[test]
fn test_delete_column_range() {
    let mut editor = letters();
    let from = cell_pos(&editor, 0, 0);
    let to = cell_pos(&editor, 2, 1);
    assert!(editor.set_selection(Selection::cells(from, to)));
    assert!(editor.delete_column());
    assert_eq!(texts(&editor), vec!["c", "f", "i"]);
    assert!(editor.selection().is_valid_in(editor.doc()));
}

#[test]
fn test_cannot_delete_everything() {
    let mut editor = letters();
    let from = cell_pos(&editor, 0, 0);
    let to = cell_pos(&editor, 2, 2);
    editor.set_selection(Selection::cells(from, to));
    let before = editor.doc().clone();
    assert!(!editor.delete_row());
    assert!(!editor.delete_column());
    assert_eq!(editor.doc(), &before);
}

#[test]
fn test_merge_then_split_keeps_grid() {
    let mut editor = letters();
    let from = cell_pos(&editor, 0, 1);
    let to = cell_pos(&editor, 1, 2);
    editor.set_selection(Selection::cells(from, to));
    assert!(editor.merge_cells());

    let map = TableMap::compute(editor.doc().node_at(0).unwrap());
    assert!(map.is_valid());
    assert_eq!(texts(&editor), vec!["a,bcef", "d", "g,h,i"]);
    assert_eq!(editor.selection(), Selection::cell(from));

    assert!(editor.split_cell());
    let map = TableMap::compute(editor.doc().node_at(0).unwrap());
    assert!(map.is_valid());
    assert_eq!((map.width, map.height), (3, 3));
    assert_eq!(texts(&editor), vec!["a,bcef,", "d,,", "g,h,i"]);
}

#[test]
fn test_merge_rejects_partial_span() {
    let mut editor = letters();
    editor.set_selection(Selection::cells(cell_pos(&editor, 0, 0), cell_pos(&editor, 1, 1)));
    assert!(editor.merge_cells());

    // a rectangle that cuts through the merged block
    editor.set_selection(Selection::cells(cell_pos(&editor, 1, 2), cell_pos(&editor, 2, 1)));
    assert!(!editor.merge_cells());
}

#[test]
fn test_insert_and_delete_table_commands() {
    let mut editor = TableEditor::new(Document::new(doc(vec![paragraph("one"), paragraph("two")])));
    editor.set_selection(Selection::cursor(2));
    assert!(editor.execute(&TableCommand::InsertTable {
        rows: Some(2),
        cols: Some(2),
        with_header_row: Some(true),
    }));
    let tables = editor.doc().table_positions();
    assert_eq!(tables, vec![5]);
    assert_eq!(editor.doc().root().content[2].text_content(), "two");

    assert!(editor.delete_table());
    assert_eq!(editor.doc().table_positions(), Vec::<usize>::new());
    assert_eq!(editor.doc().root().child_count(), 2);
    assert!(!editor.delete_table());
}
