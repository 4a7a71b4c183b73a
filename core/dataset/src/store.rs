//! FILENAME: core/dataset/src/store.rs
//! PURPOSE: Per-field value interning.
//! CONTEXT: Issue-tracker columns hold a handful of distinct categories repeated
//! across thousands of rows. Each distinct value is stored once and records
//! refer to it by `ValueId`. Ids are assigned in first-seen order, so comparing
//! ids compares source order of first appearance.

use rustc_hash::FxHashMap;

/// A reference to an interned value within one field's store.
pub type ValueId = u32;

/// Unique values of a single field.
#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    /// Map from value to its id (for deduplication during build).
    value_to_id: FxHashMap<String, ValueId>,

    /// Distinct values indexed by `ValueId`.
    id_to_value: Vec<String>,
}

impl FieldStore {
    pub fn new() -> Self {
        FieldStore::default()
    }

    /// Interns a value and returns its id.
    /// If the value already exists, returns the existing id.
    pub fn intern(&mut self, value: &str) -> ValueId {
        if let Some(&id) = self.value_to_id.get(value) {
            return id;
        }

        let id = self.id_to_value.len() as ValueId;
        self.id_to_value.push(value.to_string());
        self.value_to_id.insert(value.to_string(), id);
        id
    }

    /// Looks up the id of a value without interning it.
    pub fn lookup(&self, value: &str) -> Option<ValueId> {
        self.value_to_id.get(value).copied()
    }

    pub fn value(&self, id: ValueId) -> Option<&str> {
        self.id_to_value.get(id as usize).map(String::as_str)
    }

    /// Number of distinct values.
    pub fn unique_count(&self) -> usize {
        self.id_to_value.len()
    }

    /// Distinct values in first-seen order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.id_to_value.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates_in_first_seen_order() {
        let mut store = FieldStore::new();
        assert_eq!(store.intern("B"), 0);
        assert_eq!(store.intern("A"), 1);
        assert_eq!(store.intern("B"), 0);

        assert_eq!(store.unique_count(), 2);
        assert_eq!(store.values().collect::<Vec<_>>(), vec!["B", "A"]);
    }

    #[test]
    fn test_lookup_does_not_intern() {
        let mut store = FieldStore::new();
        store.intern("A");
        assert_eq!(store.lookup("A"), Some(0));
        assert_eq!(store.lookup("Z"), None);
        assert_eq!(store.unique_count(), 1);
        assert_eq!(store.value(0), Some("A"));
        assert_eq!(store.value(7), None);
    }
}
