//! FILENAME: core/crossfilter/src/filter_state.rs
//! PURPOSE: Per-session record of which category is selected on which field.
//! CONTEXT: Owned by exactly one `ReactiveEvaluator`. A field absent from the
//! map has no selection. Aggregation only ever sees an owned `FilterSnapshot`,
//! so a recomputation pass observes one consistent state from start to end.

use std::collections::BTreeMap;

use dataset::FieldName;
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Mutable selection state, versioned.
///
/// `version` increases only when a mutation actually changes the selections,
/// so replaying an identical event leaves both the map and the version alone.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    selections: BTreeMap<FieldName, String>,
    version: u64,
}

impl FilterState {
    pub fn new() -> Self {
        FilterState::default()
    }

    /// Records a selection, overwriting any previous value for the field.
    /// Returns whether the state changed.
    pub fn set(&mut self, field: FieldName, value: String) -> bool {
        if self.selections.get(&field) == Some(&value) {
            return false;
        }
        self.selections.insert(field, value);
        self.version += 1;
        true
    }

    /// Removes a selection. Returns whether one was present.
    pub fn clear(&mut self, field: &str) -> bool {
        if self.selections.remove(field).is_none() {
            return false;
        }
        self.version += 1;
        true
    }

    /// Removes every selection whose field is not in `keep`.
    /// Returns the removed fields, in field-name order.
    pub fn clear_all_except(&mut self, keep: &FxHashSet<FieldName>) -> Vec<FieldName> {
        let removed: Vec<FieldName> = self
            .selections
            .keys()
            .filter(|field| !keep.contains(*field))
            .cloned()
            .collect();

        if !removed.is_empty() {
            for field in &removed {
                self.selections.remove(field);
            }
            self.version += 1;
        }
        removed
    }

    /// Removes every selection.
    pub fn clear_all(&mut self) -> bool {
        !self.clear_all_except(&FxHashSet::default()).is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.selections.get(field).map(String::as_str)
    }

    /// Fields that currently carry a selection.
    pub fn selected_fields(&self) -> impl Iterator<Item = &FieldName> {
        self.selections.keys()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// An immutable copy for one recomputation pass.
    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            selections: self.selections.clone(),
            version: self.version,
        }
    }
}

/// Read-only copy of a `FilterState` at one version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSnapshot {
    selections: BTreeMap<FieldName, String>,
    version: u64,
}

impl FilterSnapshot {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.selections.get(field).map(String::as_str)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &str)> {
        self.selections.iter().map(|(f, v)| (f, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}
