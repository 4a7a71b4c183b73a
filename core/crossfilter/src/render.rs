//! FILENAME: core/crossfilter/src/render.rs
//! Render boundary - what the engine pushes to the chart renderer.
//!
//! The engine never formats text or draws bars. Each update carries the
//! distribution plus the constraints that produced it, so the renderer can
//! build captions such as "Distribution of X for Y=... and Z=...".

use dataset::FieldName;
use serde::{Deserialize, Serialize};

use crate::aggregator::Constraint;
use crate::definition::ChartId;
use crate::distribution::Distribution;

// ============================================================================
// NODE STATE
// ============================================================================

/// How much of a chart's upstream is currently selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeFilterState {
    /// No upstream selection applies; the chart counts the whole dataset
    /// (or shows a placeholder if it requires its immediate upstream).
    Unfiltered,
    /// Some, but not all, upstream fields are selected.
    PartiallyFiltered,
    /// Every upstream field is selected.
    FullyFiltered,
}

impl NodeFilterState {
    pub fn classify(applied: usize, declared: usize) -> Self {
        if applied == 0 {
            NodeFilterState::Unfiltered
        } else if applied < declared {
            NodeFilterState::PartiallyFiltered
        } else {
            NodeFilterState::FullyFiltered
        }
    }
}

impl Default for NodeFilterState {
    fn default() -> Self {
        NodeFilterState::Unfiltered
    }
}

// ============================================================================
// TITLE CONTEXT
// ============================================================================

/// The constraints behind a distribution, in the chart's upstream order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleContext {
    /// Upstream fields with a selection, and the selected value.
    pub applied: Vec<Constraint>,
    /// Upstream fields without a selection.
    pub pending: Vec<FieldName>,
}

impl TitleContext {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.applied
            .iter()
            .find(|c| c.field.as_str() == field)
            .map(|c| c.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

// ============================================================================
// DISTRIBUTION UPDATE
// ============================================================================

/// A recomputed chart, ready to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionUpdate {
    pub node_id: ChartId,
    pub field: FieldName,
    /// Display name of the field.
    pub label: String,
    pub distribution: Distribution,
    pub title_context: TitleContext,
    pub state: NodeFilterState,
    /// True when the chart is waiting for its immediate upstream selection.
    pub placeholder: bool,
    /// Why the distribution is empty, when it is.
    pub diagnostic: Option<String>,
    /// Filter-state version the update was computed against.
    pub filter_version: u64,
}

// ============================================================================
// SINKS
// ============================================================================

/// Receives distribution updates (`onDistributionUpdated`).
pub trait RenderSink {
    fn on_distribution_updated(&mut self, update: &DistributionUpdate);
}

/// Collects updates in emission order.
impl RenderSink for Vec<DistributionUpdate> {
    fn on_distribution_updated(&mut self, update: &DistributionUpdate) {
        self.push(update.clone());
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> RenderSink for FnSink<F>
where
    F: FnMut(&DistributionUpdate),
{
    fn on_distribution_updated(&mut self, update: &DistributionUpdate) {
        (self.0)(update)
    }
}
