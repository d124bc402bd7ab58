//! Table editing functions exported to JavaScript
//!
//! Every command returns `false` instead of throwing when it does not apply.
//! Functions that take JSON or structured values throw on malformed input.

use super::helpers::{
    deserialize, has_editor, install_editor, js_error, remove_editor, serialize, with_editor,
};
use crate::commands::TableCommand;
use crate::models::{Document, Selection};
use crate::table::{StyleAttr, TableSettings};
use once_cell::sync::OnceCell;
use wasm_bindgen::prelude::*;

static INIT: OnceCell<()> = OnceCell::new();

/// Install the panic hook and logger; later calls do nothing
pub fn init_once() {
    INIT.get_or_init(|| {
        #[cfg(all(target_arch = "wasm32", feature = "console_error_panic_hook"))]
        console_error_panic_hook::set_once();

        #[cfg(all(target_arch = "wasm32", feature = "console_log"))]
        {
            // fails only when another logger is already installed
            let _ = console_log::init_with_level(log::Level::Debug);
        }

        log::info!("table editor initialized");
    });
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Turn table editing on with an empty document
#[wasm_bindgen(js_name = enableTables)]
pub fn enable_tables() -> bool {
    init_once();
    let created = install_editor();
    if created {
        log::info!("tables enabled");
    }
    created
}

/// Turn table editing off, dropping the document and repair snapshot
#[wasm_bindgen(js_name = disableTables)]
pub fn disable_tables() -> bool {
    let removed = remove_editor();
    if removed {
        log::info!("tables disabled");
    }
    removed
}

#[wasm_bindgen(js_name = tablesEnabled)]
pub fn tables_enabled() -> bool {
    has_editor()
}

// ============================================================================
// Document, selection, settings
// ============================================================================

#[wasm_bindgen(js_name = loadDocument)]
pub fn load_document(json: &str) -> Result<(), JsValue> {
    let doc = Document::from_json(json)
        .map_err(|e| js_error(format!("Invalid document JSON: {}", e)))?;
    if with_editor(false, |editor| {
        editor.load(doc);
        true
    }) {
        Ok(())
    } else {
        Err(js_error("loadDocument: tables are not enabled"))
    }
}

/// Current document as JSON, `undefined` when tables are disabled
#[wasm_bindgen(js_name = getDocument)]
pub fn get_document() -> Option<String> {
    with_editor(None, |editor| match editor.doc().to_json() {
        Ok(json) => Some(json),
        Err(e) => {
            log::error!("getDocument: {}", e);
            None
        }
    })
}

/// Current document as a JS object
#[wasm_bindgen(js_name = getDocumentValue)]
pub fn get_document_value() -> Result<JsValue, JsValue> {
    let doc = with_editor(None, |editor| Some(editor.doc().clone()))
        .ok_or_else(|| js_error("getDocumentValue: tables are not enabled"))?;
    serialize(&doc, "Serialization error")
}

#[wasm_bindgen(js_name = getSelection)]
pub fn get_selection() -> Result<JsValue, JsValue> {
    let selection = with_editor(None, |editor| Some(editor.selection()))
        .ok_or_else(|| js_error("getSelection: tables are not enabled"))?;
    serialize(&selection, "Serialization error")
}

#[wasm_bindgen(js_name = setTextSelection)]
pub fn set_text_selection(anchor: usize, head: usize) -> bool {
    with_editor(false, |editor| editor.set_selection(Selection::Text { anchor, head }))
}

/// Select the cells whose positions (before the cell) are given
#[wasm_bindgen(js_name = setCellSelection)]
pub fn set_cell_selection(anchor: usize, head: usize) -> bool {
    with_editor(false, |editor| editor.set_selection(Selection::cells(anchor, head)))
}

/// Replace the editor settings; missing keys take their defaults
#[wasm_bindgen]
pub fn configure(json: &str) -> Result<(), JsValue> {
    let settings = TableSettings::from_json(json)
        .map_err(|e| js_error(format!("Invalid settings JSON: {}", e)))?;
    log::debug!("configure: {:?}", settings);
    if with_editor(false, |editor| {
        editor.configure(settings);
        true
    }) {
        Ok(())
    } else {
        Err(js_error("configure: tables are not enabled"))
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Run a command given as `{ command: "...", ...args }`
#[wasm_bindgen(js_name = executeCommand)]
pub fn execute_command(command: JsValue) -> Result<bool, JsValue> {
    let command: TableCommand = deserialize(command, "Invalid table command")?;
    Ok(run(command))
}

fn run(command: TableCommand) -> bool {
    with_editor(false, |editor| editor.execute(&command))
}

#[wasm_bindgen(js_name = insertColumnBefore)]
pub fn insert_column_before() -> bool {
    with_editor(false, |editor| editor.insert_column_before())
}

#[wasm_bindgen(js_name = insertColumnAfter)]
pub fn insert_column_after() -> bool {
    with_editor(false, |editor| editor.insert_column_after())
}

#[wasm_bindgen(js_name = insertRowBefore)]
pub fn insert_row_before() -> bool {
    with_editor(false, |editor| editor.insert_row_before())
}

#[wasm_bindgen(js_name = insertRowAfter)]
pub fn insert_row_after() -> bool {
    with_editor(false, |editor| editor.insert_row_after())
}

#[wasm_bindgen(js_name = deleteColumn)]
pub fn delete_column() -> bool {
    run(TableCommand::DeleteColumn)
}

#[wasm_bindgen(js_name = deleteRow)]
pub fn delete_row() -> bool {
    run(TableCommand::DeleteRow)
}

#[wasm_bindgen(js_name = mergeCells)]
pub fn merge_cells() -> bool {
    run(TableCommand::MergeCells)
}

#[wasm_bindgen(js_name = splitCell)]
pub fn split_cell() -> bool {
    run(TableCommand::SplitCell)
}

/// Insert a table; omitted arguments come from the settings
#[wasm_bindgen(js_name = insertTable)]
pub fn insert_table(
    rows: Option<usize>,
    cols: Option<usize>,
    with_header_row: Option<bool>,
) -> bool {
    run(TableCommand::InsertTable {
        rows,
        cols,
        with_header_row,
    })
}

#[wasm_bindgen(js_name = deleteTable)]
pub fn delete_table() -> bool {
    run(TableCommand::DeleteTable)
}

/// Set a table-wide default (`border`, `borderColor` or `background`);
/// `null` clears it
#[wasm_bindgen(js_name = setTableDefault)]
pub fn set_table_default(attr: &str, value: Option<String>) -> bool {
    match StyleAttr::from_key(attr) {
        Some(attr) => run(TableCommand::SetTableDefault { attr, value }),
        None => {
            log::warn!("setTableDefault: unknown attribute '{}'", attr);
            false
        }
    }
}

#[wasm_bindgen(js_name = setHighlight)]
pub fn set_highlight(border: Option<String>, border_color: Option<String>) -> bool {
    run(TableCommand::SetHighlight {
        border,
        border_color,
    })
}

#[wasm_bindgen(js_name = clearHighlight)]
pub fn clear_highlight() -> bool {
    run(TableCommand::ClearHighlight)
}

#[wasm_bindgen(js_name = applyAlternateColor)]
pub fn apply_alternate_color() -> bool {
    run(TableCommand::ApplyAlternateColor)
}

#[wasm_bindgen(js_name = clearAlternateColor)]
pub fn clear_alternate_color() -> bool {
    run(TableCommand::ClearAlternateColor)
}

/// Repair malformed tables; `false` when there was nothing to fix
#[wasm_bindgen(js_name = fixTable)]
pub fn fix_table() -> bool {
    with_editor(false, |editor| editor.fix_table())
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test: the editor is process-wide state.
    #[test]
    fn test_exported_lifecycle() {
        assert!(!insert_row_after());
        assert!(load_document_native(r#"{"type":"doc","content":[]}"#).is_none());

        assert!(enable_tables());
        assert!(!enable_tables());
        assert!(tables_enabled());

        assert!(insert_table(Some(2), Some(2), Some(false)));
        assert!(set_table_default("border", Some("1px solid".to_string())));
        assert!(!set_table_default("padding", Some("4px".to_string())));
        assert!(insert_column_after());
        assert!(!fix_table());

        let json = get_document().unwrap();
        assert!(json.contains("1px solid"));
        assert_eq!(json.matches("\"tableCell\"").count(), 6);

        // positions before the first two cells of the first row
        assert!(set_cell_selection(2, 6));
        assert!(merge_cells());
        assert!(!set_cell_selection(0, 1));

        assert!(disable_tables());
        assert!(!disable_tables());
        assert!(get_document().is_none());
    }

    fn load_document_native(json: &str) -> Option<()> {
        let doc = Document::from_json(json).ok()?;
        with_editor(None, |editor| {
            editor.load(doc);
            Some(())
        })
    }
}
