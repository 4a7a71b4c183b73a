//! FILENAME: core/dataset/src/table.rs
//! PURPOSE: Records, the one-shot builder, and read-only filtered views.
//!
//! USAGE:
//! 1. Create a `DatasetBuilder` with the cleaned schema and push every row.
//! 2. Call `finish()` to freeze it into a `Dataset`; nothing mutates it afterwards.
//! 3. Resolve equality constraints with `resolve()` and narrow with `view()`.

use crate::error::SchemaError;
use crate::schema::{FieldIndex, Schema};
use crate::store::{FieldStore, ValueId};

// ============================================================================
// RECORD
// ============================================================================

/// A single source row, stored as interned value ids in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The original row index in the source data (0-based, excluding header).
    pub source_row: u32,

    /// One `ValueId` per schema field.
    pub values: Vec<ValueId>,
}

impl Record {
    pub fn value_id(&self, field: FieldIndex) -> Option<ValueId> {
        self.values.get(field).copied()
    }
}

// ============================================================================
// CONSTRAINTS
// ============================================================================

/// An exact-match constraint with its field and value already resolved
/// against a dataset.
///
/// `value` is `None` when the requested value never occurs in the field;
/// such a constraint matches no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedConstraint {
    pub field: FieldIndex,
    pub value: Option<ValueId>,
}

impl ResolvedConstraint {
    pub fn matches(&self, record: &Record) -> bool {
        match self.value {
            Some(id) => record.value_id(self.field) == Some(id),
            None => false,
        }
    }
}

// ============================================================================
// DATASET
// ============================================================================

/// Immutable table of categorical records.
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Schema,
    stores: Vec<FieldStore>,
    records: Vec<Record>,
}

impl Dataset {
    /// Convenience constructor for already-cleaned rows.
    pub fn from_rows<R, S>(schema: Schema, rows: R) -> Result<Self, SchemaError>
    where
        R: IntoIterator,
        R::Item: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut builder = DatasetBuilder::new(schema);
        for row in rows {
            builder.push_row(row.as_ref())?;
        }
        Ok(builder.finish())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn store(&self, field: FieldIndex) -> Option<&FieldStore> {
        self.stores.get(field)
    }

    /// Returns the text of a record's value for a field.
    pub fn value_of(&self, record: &Record, field: FieldIndex) -> Option<&str> {
        let id = record.value_id(field)?;
        self.stores.get(field)?.value(id)
    }

    /// Returns a whole row as text, in schema order.
    pub fn row(&self, index: usize) -> Option<Vec<&str>> {
        let record = self.records.get(index)?;
        (0..self.schema.len())
            .map(|field| self.value_of(record, field))
            .collect()
    }

    /// Resolves a `(field, value)` pair into a constraint usable by `view()`.
    /// Only an unknown field is an error; an unseen value resolves to a
    /// constraint that matches nothing.
    pub fn resolve(&self, field: &str, value: &str) -> Result<ResolvedConstraint, SchemaError> {
        let index = self.schema.index_of(field)?;
        Ok(self.resolve_index(index, value))
    }

    /// Resolves a value for a field position that was validated earlier.
    pub fn resolve_index(&self, field: FieldIndex, value: &str) -> ResolvedConstraint {
        let value = self.stores.get(field).and_then(|store| store.lookup(value));
        ResolvedConstraint { field, value }
    }

    /// Returns the records matching every constraint (logical AND).
    /// An empty constraint list selects the whole dataset.
    pub fn view(&self, constraints: &[ResolvedConstraint]) -> DatasetView<'_> {
        let indices = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| constraints.iter().all(|c| c.matches(record)))
            .map(|(i, _)| i)
            .collect();

        DatasetView {
            dataset: self,
            indices,
        }
    }
}

// ============================================================================
// VIEW
// ============================================================================

/// A read-only subset of a dataset, in source order.
#[derive(Debug, Clone)]
pub struct DatasetView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> DatasetView<'a> {
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Accumulates rows, then freezes them into a `Dataset`.
#[derive(Debug)]
pub struct DatasetBuilder {
    schema: Schema,
    stores: Vec<FieldStore>,
    records: Vec<Record>,
}

impl DatasetBuilder {
    pub fn new(schema: Schema) -> Self {
        let stores = (0..schema.len()).map(|_| FieldStore::new()).collect();
        DatasetBuilder {
            schema,
            stores,
            records: Vec::new(),
        }
    }

    /// Reserves capacity for the expected record count.
    pub fn reserve(&mut self, record_count: usize) {
        self.records.reserve(record_count);
    }

    /// Adds one row. Values must be in schema order, one per field.
    pub fn push_row<S: AsRef<str>>(&mut self, values: &[S]) -> Result<(), SchemaError> {
        if values.len() != self.schema.len() {
            return Err(SchemaError::RowArity {
                row: self.records.len(),
                expected: self.schema.len(),
                found: values.len(),
            });
        }

        let interned = values
            .iter()
            .zip(self.stores.iter_mut())
            .map(|(value, store)| store.intern(value.as_ref()))
            .collect();

        self.records.push(Record {
            source_row: self.records.len() as u32,
            values: interned,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self) -> Dataset {
        Dataset {
            schema: self.schema,
            stores: self.stores,
            records: self.records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldName;

    fn sample() -> Dataset {
        let schema = Schema::new(vec![
            FieldName::from("DefectType"),
            FieldName::from("FeatureType"),
        ])
        .unwrap();
        Dataset::from_rows(
            schema,
            vec![
                vec!["A", "Login"],
                vec!["A", "Search"],
                vec!["B", "Login"],
                vec!["B", "TBD"],
                vec!["C", "Login"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_builder_preserves_rows() {
        let dataset = sample();
        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.row(3), Some(vec!["B", "TBD"]));
        assert_eq!(dataset.records()[4].source_row, 4);
        assert_eq!(dataset.row(5), None);
    }

    #[test]
    fn test_row_arity_is_rejected() {
        let schema = Schema::new(vec![FieldName::from("A"), FieldName::from("B")]).unwrap();
        let mut builder = DatasetBuilder::new(schema);
        builder.push_row(&["x", "y"]).unwrap();

        let err = builder.push_row(&["only-one"]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::RowArity {
                row: 1,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_view_applies_all_constraints() {
        let dataset = sample();
        let defect_a = dataset.resolve("DefectType", "A").unwrap();
        let login = dataset.resolve("FeatureType", "Login").unwrap();

        assert_eq!(dataset.view(&[]).len(), 5);
        assert_eq!(dataset.view(&[defect_a]).len(), 2);
        assert_eq!(dataset.view(&[defect_a, login]).len(), 1);
    }

    #[test]
    fn test_unseen_value_matches_nothing() {
        let dataset = sample();
        let missing = dataset.resolve("DefectType", "Z").unwrap();
        assert_eq!(missing.value, None);
        assert!(dataset.view(&[missing]).is_empty());
    }

    #[test]
    fn test_unknown_field_fails_to_resolve() {
        let dataset = sample();
        assert_eq!(
            dataset.resolve("Nope", "A"),
            Err(SchemaError::UnknownField("Nope".to_string()))
        );
    }

    #[test]
    fn test_view_keeps_source_order() {
        let dataset = sample();
        let login = dataset.resolve("FeatureType", "Login").unwrap();
        let rows: Vec<u32> = dataset.view(&[login]).records().map(|r| r.source_row).collect();
        assert_eq!(rows, vec![0, 2, 4]);
    }
}
