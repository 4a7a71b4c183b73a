//! FILENAME: core/dataset/src/error.rs

use thiserror::Error;

/// A configured or supplied field does not fit the dataset's schema.
/// Raised at load time or graph-construction time, never during aggregation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Duplicate field in schema: {0}")]
    DuplicateField(String),

    #[error("Schema has no fields")]
    Empty,

    #[error("Row {row} has {found} values, schema expects {expected}")]
    RowArity {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Schema mismatch: expected [{expected}], found [{found}]")]
    Mismatch { expected: String, found: String },
}
