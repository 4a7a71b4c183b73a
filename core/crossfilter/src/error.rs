//! FILENAME: core/crossfilter/src/error.rs

use dataset::SchemaError;
use thiserror::Error;

/// Failures detected while building the dependency graph.
/// All of them abort startup; none can occur once events are flowing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Dashboard has no charts")]
    Empty,

    #[error("Duplicate chart id: {0}")]
    DuplicateChart(String),

    #[error("Field {field} is displayed by both {first} and {second}")]
    DuplicateFieldOwner {
        field: String,
        first: String,
        second: String,
    },

    #[error("Chart {chart} lists upstream field {field} more than once")]
    DuplicateUpstream { chart: String, field: String },

    #[error("Chart {chart} depends on field {field}, which no chart displays")]
    UnownedUpstream { chart: String, field: String },

    #[error("Chart {0} requires an immediate upstream selection but declares no upstream fields")]
    MissingImmediateUpstream(String),

    #[error("Circular chart dependency: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("Invalid dashboard definition: {0}")]
    InvalidDefinition(String),
}

/// A selection event the evaluator could not apply (a `MalformedSelectionEvent`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Selection event references unknown chart: {0}")]
    UnknownSource(String),
}
