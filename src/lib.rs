//! Table Editor WASM Module
//!
//! Table support for a rich-text document editor: a row/column grid model
//! that understands merged cells, structural edits, table-wide styling with
//! per-cell overrides, and repair of malformed tables.

pub mod models;
pub mod transform;
pub mod table;
pub mod commands;
pub mod api;

// Re-export commonly used types
pub use commands::{TableCommand, TableEditor};
pub use models::{Document, Node, NodeKind, Selection};
pub use table::{InsertSide, StyleAttr, TableError, TableMap, TableSettings};
pub use transform::{Transaction, TransformError};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    api::tables::init_once();
    log::info!("Table Editor WASM module initialized");
}
