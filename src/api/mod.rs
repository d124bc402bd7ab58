//! Table Editor WASM API
//!
//! JavaScript-facing functions over one process-wide `TableEditor`.
//!
//! # Module Structure
//!
//! - `helpers`: Global editor access and JS (de)serialization
//! - `tables`: Lifecycle, document/selection access and table commands

pub mod helpers;
pub mod tables;

pub use tables::*;
