//! Table commands
//!
//! `TableCommand` names every operation the host can trigger; `TableEditor`
//! owns the current document, selection and repair state and applies one
//! command at a time. A command either succeeds completely and its
//! transaction replaces the document, or it reports `false` and nothing
//! changes.

use crate::models::{Document, Selection};
use crate::table::{
    self, InsertSide, RepairState, StyleAttr, TableError, TableMap, TableRepair, TableSettings,
};
use crate::transform::Transaction;
use serde::{Deserialize, Serialize};

/// A table operation as sent by the host
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum TableCommand {
    InsertColumn {
        side: InsertSide,
    },
    InsertRow {
        side: InsertSide,
    },
    DeleteColumn,
    DeleteRow,
    MergeCells,
    SplitCell,
    /// Sizes and header row fall back to the editor settings
    #[serde(rename_all = "camelCase")]
    InsertTable {
        #[serde(default)]
        rows: Option<usize>,
        #[serde(default)]
        cols: Option<usize>,
        #[serde(default)]
        with_header_row: Option<bool>,
    },
    DeleteTable,
    /// `None` clears the default
    SetTableDefault {
        attr: StyleAttr,
        #[serde(default)]
        value: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    SetHighlight {
        #[serde(default)]
        border: Option<String>,
        #[serde(default)]
        border_color: Option<String>,
    },
    ClearHighlight,
    ApplyAlternateColor,
    ClearAlternateColor,
    FixTable,
}

impl TableCommand {
    pub fn name(&self) -> &'static str {
        match self {
            TableCommand::InsertColumn { side: InsertSide::Before } => "insertColumnBefore",
            TableCommand::InsertColumn { side: InsertSide::After } => "insertColumnAfter",
            TableCommand::InsertRow { side: InsertSide::Before } => "insertRowBefore",
            TableCommand::InsertRow { side: InsertSide::After } => "insertRowAfter",
            TableCommand::DeleteColumn => "deleteColumn",
            TableCommand::DeleteRow => "deleteRow",
            TableCommand::MergeCells => "mergeCells",
            TableCommand::SplitCell => "splitCell",
            TableCommand::InsertTable { .. } => "insertTable",
            TableCommand::DeleteTable => "deleteTable",
            TableCommand::SetTableDefault { .. } => "setTableDefault",
            TableCommand::SetHighlight { .. } => "setHighlight",
            TableCommand::ClearHighlight => "clearHighlight",
            TableCommand::ApplyAlternateColor => "applyAlternateColor",
            TableCommand::ClearAlternateColor => "clearAlternateColor",
            TableCommand::FixTable => "fixTable",
        }
    }

    /// Whether the command changes the shape of a table. A structural edit
    /// that leaves every table well-formed refreshes the repair snapshot.
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            TableCommand::SetTableDefault { .. }
                | TableCommand::SetHighlight { .. }
                | TableCommand::ClearHighlight
                | TableCommand::ApplyAlternateColor
                | TableCommand::ClearAlternateColor
        )
    }

    /// Build the command's transaction against `doc`.
    ///
    /// `FixTable` built this way repairs without a snapshot; `TableEditor`
    /// routes it through its repair state instead.
    pub fn build(
        &self,
        doc: &Document,
        selection: &Selection,
        settings: &TableSettings,
    ) -> Result<Transaction, TableError> {
        let pos = selection.anchor();
        match self {
            TableCommand::InsertColumn { side } => {
                table::add_column(doc, selection, *side, settings)
            }
            TableCommand::InsertRow { side } => table::add_row(doc, selection, *side, settings),
            TableCommand::DeleteColumn => table::delete_column(doc, selection),
            TableCommand::DeleteRow => table::delete_row(doc, selection),
            TableCommand::MergeCells => table::merge_cells(doc, selection),
            TableCommand::SplitCell => table::split_cell(doc, selection),
            TableCommand::InsertTable {
                rows,
                cols,
                with_header_row,
            } => table::insert_table(
                doc,
                selection,
                rows.unwrap_or(settings.default_rows),
                cols.unwrap_or(settings.default_cols),
                with_header_row.unwrap_or(settings.header_row),
            ),
            TableCommand::DeleteTable => table::delete_table(doc, selection),
            TableCommand::SetTableDefault { attr, value } => {
                table::apply_default(doc, pos, *attr, value.as_deref())
            }
            TableCommand::SetHighlight {
                border,
                border_color,
            } => table::set_highlight(doc, selection, border.as_deref(), border_color.as_deref()),
            TableCommand::ClearHighlight => table::clear_highlight(doc, selection),
            TableCommand::ApplyAlternateColor => {
                table::apply_alternate_color(doc, pos, &settings.banding_color)
            }
            TableCommand::ClearAlternateColor => table::clear_alternate_color(doc, pos),
            TableCommand::FixTable => {
                table::fix_tables(doc, None).ok_or(TableError::NotApplicable("nothing to fix"))
            }
        }
    }
}

/// Document, selection and repair state for one editing session
#[derive(Clone, Debug)]
pub struct TableEditor {
    doc: Document,
    selection: Selection,
    repair: TableRepair,
    settings: TableSettings,
}

impl Default for TableEditor {
    fn default() -> Self {
        Self::new(Document::empty())
    }
}

impl TableEditor {
    pub fn new(doc: Document) -> Self {
        Self::with_settings(doc, TableSettings::default())
    }

    pub fn with_settings(doc: Document, settings: TableSettings) -> Self {
        Self {
            doc,
            selection: Selection::default(),
            repair: TableRepair::new(),
            settings,
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    pub fn repair_state(&self) -> RepairState {
        self.repair.state()
    }

    pub fn snapshot(&self) -> Option<&Document> {
        self.repair.snapshot()
    }

    pub fn configure(&mut self, settings: TableSettings) {
        self.settings = settings;
    }

    /// Replace the document; the selection falls back to the start.
    ///
    /// The repair snapshot survives only when the new document has tables
    /// at exactly the positions the snapshot has. Otherwise it is dropped,
    /// so a later fix never restores a table from an unrelated document.
    pub fn load(&mut self, doc: Document) {
        let same_tables = self
            .repair
            .snapshot()
            .map_or(false, |old| old.table_positions() == doc.table_positions());
        if !same_tables {
            self.repair.clear();
        }
        self.doc = doc;
        self.selection = Selection::default();
    }

    /// Move the selection; rejected when it does not fit the document
    pub fn set_selection(&mut self, selection: Selection) -> bool {
        if selection.is_valid_in(&self.doc) {
            self.selection = selection;
            true
        } else {
            log::warn!("rejected selection {:?}", selection);
            false
        }
    }

    /// Run one command, returning whether it applied
    pub fn execute(&mut self, command: &TableCommand) -> bool {
        if *command == TableCommand::FixTable {
            return self.fix_table();
        }

        match command.build(&self.doc, &self.selection, &self.settings) {
            Ok(tr) => {
                self.dispatch(tr);
                if command.is_structural() {
                    self.record_if_valid();
                }
                log::debug!("{} applied", command.name());
                true
            }
            Err(err) => {
                if err.is_malformed() {
                    self.repair.mark_malformed();
                }
                log::warn!("{} failed: {}", command.name(), err);
                false
            }
        }
    }

    /// Repair malformed tables. `false` means there was nothing to fix.
    pub fn fix_table(&mut self) -> bool {
        match self.repair.fix(&self.doc) {
            Some(tr) => {
                self.dispatch(tr);
                if !self.record_if_valid() {
                    self.repair.mark_malformed();
                }
                true
            }
            None => {
                log::debug!("fixTable: nothing to fix");
                false
            }
        }
    }

    fn dispatch(&mut self, tr: Transaction) {
        let selection = tr
            .selection()
            .unwrap_or_else(|| self.selection.map(tr.doc(), tr.mapping()));
        self.doc = tr.into_doc();
        self.selection = selection;
    }

    fn record_if_valid(&mut self) -> bool {
        let doc = &self.doc;
        let valid = doc.table_positions().into_iter().all(|pos| {
            doc.node_at(pos)
                .map_or(false, |table| TableMap::compute(table).is_valid())
        });
        if valid {
            self.repair.record_valid(&self.doc);
        }
        valid
    }

    // ========================================================================
    // Shorthands
    // ========================================================================

    pub fn insert_column_before(&mut self) -> bool {
        self.execute(&TableCommand::InsertColumn { side: InsertSide::Before })
    }

    pub fn insert_column_after(&mut self) -> bool {
        self.execute(&TableCommand::InsertColumn { side: InsertSide::After })
    }

    pub fn insert_row_before(&mut self) -> bool {
        self.execute(&TableCommand::InsertRow { side: InsertSide::Before })
    }

    pub fn insert_row_after(&mut self) -> bool {
        self.execute(&TableCommand::InsertRow { side: InsertSide::After })
    }

    pub fn delete_column(&mut self) -> bool {
        self.execute(&TableCommand::DeleteColumn)
    }

    pub fn delete_row(&mut self) -> bool {
        self.execute(&TableCommand::DeleteRow)
    }

    pub fn merge_cells(&mut self) -> bool {
        self.execute(&TableCommand::MergeCells)
    }

    pub fn split_cell(&mut self) -> bool {
        self.execute(&TableCommand::SplitCell)
    }

    pub fn insert_table(&mut self, rows: usize, cols: usize, with_header_row: bool) -> bool {
        self.execute(&TableCommand::InsertTable {
            rows: Some(rows),
            cols: Some(cols),
            with_header_row: Some(with_header_row),
        })
    }

    pub fn delete_table(&mut self) -> bool {
        self.execute(&TableCommand::DeleteTable)
    }

    pub fn set_table_default(&mut self, attr: StyleAttr, value: Option<&str>) -> bool {
        self.execute(&TableCommand::SetTableDefault {
            attr,
            value: value.map(str::to_string),
        })
    }

    pub fn set_highlight(&mut self, border: Option<&str>, border_color: Option<&str>) -> bool {
        self.execute(&TableCommand::SetHighlight {
            border: border.map(str::to_string),
            border_color: border_color.map(str::to_string),
        })
    }

    pub fn clear_highlight(&mut self) -> bool {
        self.execute(&TableCommand::ClearHighlight)
    }

    pub fn apply_alternate_color(&mut self) -> bool {
        self.execute(&TableCommand::ApplyAlternateColor)
    }

    pub fn clear_alternate_color(&mut self) -> bool {
        self.execute(&TableCommand::ClearAlternateColor)
    }
}
