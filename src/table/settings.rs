//! Table editor configuration

use serde::{Deserialize, Serialize};

/// Tunables for table commands, loadable from JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableSettings {
    /// Background given to odd rows by the alternation colorizer
    pub banding_color: String,

    /// Whether `insert_table` starts with a header row
    pub header_row: bool,

    /// Whether row/column insertion re-applies the table's defaults
    pub propagate_on_insert: bool,

    /// Size of tables created by `insert_table` when none is given
    pub default_rows: usize,
    pub default_cols: usize,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            banding_color: "#f2f2f2".to_string(),
            header_row: true,
            propagate_on_insert: true,
            default_rows: 3,
            default_cols: 3,
        }
    }
}

impl TableSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
