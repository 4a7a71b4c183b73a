//! FILENAME: core/persistence/src/lib.rs
//! Drill-down Persistence Module
//!
//! Reads raw issue-tracker tables (XLSX or JSON records), cleans them into a
//! `Dataset`, and writes chart data back out as XLSX.
//!
//! Every reader produces a `RawTable`; `CleaningRules::apply` is the single
//! place where headers are renamed, derived columns are extracted, missing
//! values are filled and the schema is checked.

mod cleaning;
mod error;
mod json_reader;
mod xlsx_reader;
mod xlsx_writer;

pub use cleaning::{CleaningRules, ColumnRename, TokenExtraction};
pub use error::PersistenceError;
pub use json_reader::{load_json_records, read_json_table};
pub use xlsx_reader::{load_xlsx, read_xlsx_table};
pub use xlsx_writer::export_distributions_xlsx;

use std::path::Path;

use dataset::Dataset;

// ============================================================================
// RAW TABLE
// ============================================================================

/// An uncleaned table: header names plus rows of optional cell text.
/// `None` marks a missing value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        RawTable {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Loads a dataset, choosing the reader from the file extension
/// (`.xlsx`/`.xlsm` or `.json`).
pub fn load_dataset(
    path: &Path,
    sheet: Option<&str>,
    rules: &CleaningRules,
) -> Result<Dataset, PersistenceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" => load_xlsx(path, sheet, rules),
        "json" => {
            let file = std::fs::File::open(path)?;
            load_json_records(std::io::BufReader::new(file), rules)
        }
        other => Err(PersistenceError::InvalidFormat(format!(
            "unsupported data file extension: {:?}",
            other
        ))),
    }
}
