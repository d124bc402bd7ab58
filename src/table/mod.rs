//! Table editing
//!
//! Everything that understands tables: the grid model, structural edits,
//! style propagation and repair. Every operation takes a document and a
//! selection and returns a `Transaction`; nothing here touches editor state.
//!
//! ## Modules
//!
//! - `map`: Row/column grid for a table, accounting for merged cells
//! - `structure`: Row/column insertion and deletion, merge, split
//! - `style`: Table defaults, highlight overlay, row banding
//! - `repair`: Fixing malformed tables against the last valid snapshot
//! - `settings`: Tunables for the commands above
//! - `errors`: Failure kinds shared by all table operations

pub mod errors;
pub mod map;
pub mod repair;
pub mod settings;
pub mod structure;
pub mod style;

pub use errors::TableError;
pub use map::{
    cell_around, selected_rect, table_around, Problem, Rect, TableMap, TableRect, MAX_COLSPAN,
};
pub use repair::{fix_tables, RepairState, TableRepair};
pub use settings::TableSettings;
pub use structure::{
    add_column, add_row, delete_column, delete_row, delete_table, insert_column, insert_row,
    insert_table, merge_cells, split_cell, InsertSide,
};
pub use style::{
    apply_alternate_color, apply_default, clear_alternate_color, clear_highlight, set_highlight,
    StyleAttr,
};
