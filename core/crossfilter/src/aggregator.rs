//! FILENAME: core/crossfilter/src/aggregator.rs
//! PURPOSE: Computes a field's frequency distribution under equality constraints.
//! CONTEXT: Pure functions over an immutable dataset. The same dataset and
//! constraints always give the same distribution, so callers may memoize.
//!
//! Two entry points:
//! - `aggregate()` takes field names and reports unknown fields as `SchemaError`.
//! - `aggregate_resolved()` takes positions that were validated when the
//!   dependency graph was built and cannot fail.

use dataset::{Dataset, FieldIndex, FieldName, ResolvedConstraint, SchemaError, ValueId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::distribution::Distribution;

/// Constraint lists are short (one per upstream chart), so they live inline.
pub type ConstraintSet = SmallVec<[ResolvedConstraint; 4]>;

/// An exact-match filter `field == value`, by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub field: FieldName,
    pub value: String,
}

impl Constraint {
    pub fn new(field: impl Into<FieldName>, value: impl Into<String>) -> Self {
        Constraint {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Resolves named constraints against the dataset schema.
pub fn resolve_constraints(
    dataset: &Dataset,
    constraints: &[Constraint],
) -> Result<ConstraintSet, SchemaError> {
    constraints
        .iter()
        .map(|c| dataset.resolve(c.field.as_str(), &c.value))
        .collect()
}

/// Frequency distribution of `field` over the records matching every constraint.
///
/// An empty constraint list counts the whole dataset. Constraints that match
/// nothing give an empty distribution, not an error.
pub fn aggregate(
    dataset: &Dataset,
    field: &str,
    constraints: &[Constraint],
) -> Result<Distribution, SchemaError> {
    let field_index = dataset.schema().index_of(field)?;
    let resolved = resolve_constraints(dataset, constraints)?;
    Ok(aggregate_resolved(dataset, field_index, &resolved))
}

/// Counting core shared by `aggregate()` and the evaluator.
pub fn aggregate_resolved(
    dataset: &Dataset,
    field: FieldIndex,
    constraints: &[ResolvedConstraint],
) -> Distribution {
    // A value absent from the dataset can never match
    if constraints.iter().any(|c| c.value.is_none()) {
        return Distribution::empty();
    }

    let Some(store) = dataset.store(field) else {
        return Distribution::empty();
    };

    // Slots are allocated in first-seen order among the matching records
    let mut slot_of: FxHashMap<ValueId, usize> = FxHashMap::default();
    let mut slots: Vec<(ValueId, u64)> = Vec::new();

    let view = dataset.view(constraints);
    for record in view.records() {
        let Some(id) = record.value_id(field) else {
            continue;
        };
        let slot = *slot_of.entry(id).or_insert_with(|| {
            slots.push((id, 0));
            slots.len() - 1
        });
        slots[slot].1 += 1;
    }

    Distribution::from_first_seen_counts(
        slots
            .into_iter()
            .filter_map(|(id, count)| store.value(id).map(|value| (value, count))),
    )
}
