//! Error types for table operations
//!
//! Every variant is recoverable: commands report it as a `false` result and
//! leave the document unchanged.

use super::map::Problem;
use crate::transform::TransformError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// The selection is not inside any table
    #[error("selection is not inside a table")]
    NoEnclosingTable,

    /// The table's grid cannot be resolved; triggers the repair pathway
    #[error("table at {pos} is malformed: {problems:?}")]
    MalformedTable { pos: usize, problems: Vec<Problem> },

    /// Neither a cell range nor an enclosing cell to act on
    #[error("no cell at the current selection")]
    NoSelectionTarget,

    /// The command does not apply to the current selection
    #[error("not applicable: {0}")]
    NotApplicable(&'static str),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl TableError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, TableError::MalformedTable { .. })
    }
}
