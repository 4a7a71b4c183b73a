//! FILENAME: core/dataset/src/schema.rs
//! PURPOSE: Ordered, duplicate-free list of categorical field names.

use std::borrow::Borrow;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Index of a field within the schema (0-based, source column order).
pub type FieldIndex = usize;

/// Name of a categorical field, e.g. `DefectType`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldName(String);

impl FieldName {
    pub fn new(name: impl Into<String>) -> Self {
        FieldName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldName {
    fn from(name: &str) -> Self {
        FieldName(name.to_string())
    }
}

impl From<String> for FieldName {
    fn from(name: String) -> Self {
        FieldName(name)
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed set of named fields every record carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldName>,
    positions: FxHashMap<FieldName, FieldIndex>,
}

impl Schema {
    /// Builds a schema, rejecting empty and duplicate field lists.
    pub fn new(fields: Vec<FieldName>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut positions = FxHashMap::default();
        for (index, field) in fields.iter().enumerate() {
            if positions.insert(field.clone(), index).is_some() {
                return Err(SchemaError::DuplicateField(field.to_string()));
            }
        }

        Ok(Schema { fields, positions })
    }

    /// Resolves a field name to its column position.
    pub fn index_of(&self, field: &str) -> Result<FieldIndex, SchemaError> {
        self.positions
            .get(field)
            .copied()
            .ok_or_else(|| SchemaError::UnknownField(field.to_string()))
    }

    pub fn contains(&self, field: &str) -> bool {
        self.positions.contains_key(field)
    }

    pub fn field(&self, index: FieldIndex) -> Option<&FieldName> {
        self.fields.get(index)
    }

    pub fn fields(&self) -> &[FieldName] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fails with `SchemaError::Mismatch` unless both schemas list the same fields in order.
    pub fn ensure_same(&self, other: &Schema) -> Result<(), SchemaError> {
        if self.fields == other.fields {
            return Ok(());
        }
        Err(SchemaError::Mismatch {
            expected: join_names(&self.fields),
            found: join_names(&other.fields),
        })
    }
}

fn join_names(fields: &[FieldName]) -> String {
    fields
        .iter()
        .map(FieldName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
