//! FILENAME: core/dataset/src/lib.rs
//! PURPOSE: Immutable in-memory table of categorical issue-tracker records.
//! CONTEXT: Loaded once by the ingestion layer, then shared read-only by every
//! dashboard session. All filtering happens through `DatasetView`s, which are
//! new sequences of record indices rather than in-place edits.
//!
//! Layers:
//! - `schema`: Field names and their positions (WHAT the table holds)
//! - `store`: Per-field value interning (HOW values are stored)
//! - `table`: Records, the builder, and read-only views

pub mod error;
pub mod schema;
pub mod store;
pub mod table;

pub use error::SchemaError;
pub use schema::{FieldIndex, FieldName, Schema};
pub use store::{FieldStore, ValueId};
pub use table::{Dataset, DatasetBuilder, DatasetView, Record, ResolvedConstraint};

// ============================================================================
// WELL-KNOWN ISSUE-TRACKER FIELDS
// ============================================================================

/// Sentinel the loader substitutes for missing values before records reach the core.
pub const MISSING_VALUE: &str = "TBD";

pub const DEFECT_TYPE: &str = "DefectType";
pub const FEATURE_TYPE: &str = "FeatureType";
pub const TEST_TYPE: &str = "TestType";
pub const MODIFIED_SUMMARY: &str = "ModifiedSummary";
pub const LABEL: &str = "Label";
pub const CREATOR: &str = "Creator";

/// The canonical issue-tracker schema, in display order.
pub fn issue_tracker_fields() -> Vec<FieldName> {
    [DEFECT_TYPE, FEATURE_TYPE, TEST_TYPE, MODIFIED_SUMMARY, LABEL, CREATOR]
        .iter()
        .map(|name| FieldName::from(*name))
        .collect()
}
