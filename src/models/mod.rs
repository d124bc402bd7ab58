//! Models module for the table editor
//!
//! This module contains the document tree, node-type creation and the
//! selection types the table engine reads from.

pub mod document;
pub mod node;
pub mod schema;
pub mod selection;

// Re-export commonly used types
pub use document::{Document, ResolvedPos};
pub use node::{attr, Attrs, Node, NodeKind};
pub use selection::Selection;
