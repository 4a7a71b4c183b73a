//! FILENAME: core/crossfilter/src/distribution.rs
//! PURPOSE: Frequency counts of one field's values over a record subset.

use serde::{Deserialize, Serialize};

/// One bar: a category value and how many records carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub value: String,
    pub count: u64,
}

/// Value -> count, in display order.
///
/// Display order is descending count. Ties keep the order in which the
/// values first appeared among the counted records, so the result is stable
/// and reproducible for the same input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    entries: Vec<DistributionEntry>,
}

impl Distribution {
    pub fn empty() -> Self {
        Distribution::default()
    }

    /// Builds a distribution from counts listed in first-seen order.
    pub fn from_first_seen_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut entries: Vec<DistributionEntry> = counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(value, count)| DistributionEntry {
                value: value.into(),
                count,
            })
            .collect();

        // Stable sort keeps first-seen order among equal counts
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        Distribution { entries }
    }

    pub fn get(&self, value: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.count)
    }

    /// Number of records counted.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Number of distinct values (bars).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DistributionEntry> {
        self.entries.iter()
    }

    pub fn categories(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.value.as_str()).collect()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.count).collect()
    }
}
