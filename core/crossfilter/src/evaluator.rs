//! FILENAME: core/crossfilter/src/evaluator.rs
//! Reactive Evaluator - selection events in, distribution updates out.
//!
//! One evaluator per session. It owns the session's `FilterState` and the
//! last update emitted for every chart; the dataset and graph are shared
//! read-only between sessions.
//!
//! Algorithm for one selection event:
//! 1. Set (or clear) the field owned by the source chart
//! 2. Take one snapshot of the filter state
//! 3. Recompute every affected chart in topological order against it
//! 4. Push each update to the sink; unaffected charts keep their last output
//!
//! Selections on other charts are never touched by an event, so clearing a
//! selection always restores the distributions seen before it was made.
//!
//! A chart's constraints are whichever of its upstream fields are currently
//! selected (cumulative AND). With none selected it counts the whole dataset,
//! unless it requires its immediate upstream, in which case it emits an
//! empty placeholder.

use std::sync::Arc;

use dataset::{Dataset, SchemaError};
use serde::{Deserialize, Serialize};

use crate::aggregator::{aggregate_resolved, Constraint, ConstraintSet};
use crate::definition::ChartId;
use crate::distribution::Distribution;
use crate::error::SelectionError;
use crate::filter_state::{FilterSnapshot, FilterState};
use crate::graph::{DependencyGraph, NodeIndex};
use crate::render::{DistributionUpdate, NodeFilterState, RenderSink, TitleContext};

// ============================================================================
// SELECTION EVENT
// ============================================================================

/// A bar click (`selected_value = Some`) or a deselect (`None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEvent {
    pub source_node_id: ChartId,
    #[serde(default)]
    pub selected_value: Option<String>,
}

impl SelectionEvent {
    pub fn select(source_node_id: impl Into<ChartId>, value: impl Into<String>) -> Self {
        SelectionEvent {
            source_node_id: source_node_id.into(),
            selected_value: Some(value.into()),
        }
    }

    pub fn clear(source_node_id: impl Into<ChartId>) -> Self {
        SelectionEvent {
            source_node_id: source_node_id.into(),
            selected_value: None,
        }
    }
}

// ============================================================================
// EVALUATOR
// ============================================================================

pub struct ReactiveEvaluator {
    dataset: Arc<Dataset>,
    graph: Arc<DependencyGraph>,
    state: FilterState,

    /// Last update emitted per chart, indexed by `NodeIndex`.
    outputs: Vec<Option<DistributionUpdate>>,
}

impl ReactiveEvaluator {
    /// Creates a session evaluator. The graph must have been built against
    /// the dataset's schema.
    pub fn new(dataset: Arc<Dataset>, graph: Arc<DependencyGraph>) -> Result<Self, SchemaError> {
        graph.schema().ensure_same(dataset.schema())?;
        let outputs = vec![None; graph.len()];
        Ok(ReactiveEvaluator {
            dataset,
            graph,
            state: FilterState::new(),
            outputs,
        })
    }

    /// Computes every chart once, in topological order.
    pub fn initial_render(&mut self, sink: &mut dyn RenderSink) -> usize {
        let order = self.graph.topo_order().to_vec();
        self.recompute(&order, sink)
    }

    /// Applies a selection event. Unknown source charts are logged and
    /// ignored, leaving the filter state untouched.
    /// Returns the ids of the charts that were recomputed.
    pub fn on_selection(&mut self, event: &SelectionEvent, sink: &mut dyn RenderSink) -> Vec<ChartId> {
        match self.try_on_selection(event, sink) {
            Ok(updated) => updated,
            Err(e) => {
                log::warn!(target: "XFILTER", "ignoring selection event: {}", e);
                Vec::new()
            }
        }
    }

    /// Same as `on_selection`, but reports malformed events to the caller.
    pub fn try_on_selection(
        &mut self,
        event: &SelectionEvent,
        sink: &mut dyn RenderSink,
    ) -> Result<Vec<ChartId>, SelectionError> {
        let source = self
            .graph
            .index_of(&event.source_node_id)
            .ok_or_else(|| SelectionError::UnknownSource(event.source_node_id.clone()))?;

        let graph = Arc::clone(&self.graph);
        let Some(node) = graph.node(source) else {
            return Err(SelectionError::UnknownSource(event.source_node_id.clone()));
        };

        let changed = match &event.selected_value {
            Some(value) => self.state.set(node.field.clone(), value.clone()),
            None => self.state.clear(node.field.as_str()),
        };

        if !changed {
            log::debug!(
                target: "XFILTER",
                "selection on {} left filter state unchanged (version {})",
                node.id,
                self.state.version()
            );
            return Ok(Vec::new());
        }

        log::debug!(
            target: "XFILTER",
            "selection on {}: {}={:?} version={}",
            node.id,
            node.field,
            event.selected_value,
            self.state.version()
        );

        let affected = graph.affected_by(source);
        self.recompute(&affected, sink);

        Ok(affected
            .into_iter()
            .filter_map(|n| graph.node(n).map(|d| d.id.clone()))
            .collect())
    }

    /// Clears every selection and re-emits all charts.
    pub fn reset(&mut self, sink: &mut dyn RenderSink) -> usize {
        self.state.clear_all();
        self.initial_render(sink)
    }

    /// Immutable copy of the current selections.
    pub fn filter_snapshot(&self) -> FilterSnapshot {
        self.state.snapshot()
    }

    /// The last update emitted for a chart.
    pub fn output(&self, node_id: &str) -> Option<&DistributionUpdate> {
        let index = self.graph.index_of(node_id)?;
        self.outputs.get(index)?.as_ref()
    }

    /// Last updates for every rendered chart, in topological order.
    pub fn outputs(&self) -> impl Iterator<Item = &DistributionUpdate> {
        self.graph
            .topo_order()
            .iter()
            .filter_map(|&n| self.outputs.get(n).and_then(Option::as_ref))
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    // ========================================================================
    // RECOMPUTATION
    // ========================================================================

    fn recompute(&mut self, nodes: &[NodeIndex], sink: &mut dyn RenderSink) -> usize {
        let snapshot = self.state.snapshot();
        let mut emitted = 0;

        for &index in nodes {
            let Some(update) = self.evaluate_node(index, &snapshot) else {
                continue;
            };
            sink.on_distribution_updated(&update);
            self.outputs[index] = Some(update);
            emitted += 1;
        }

        emitted
    }

    fn evaluate_node(&self, index: NodeIndex, snapshot: &FilterSnapshot) -> Option<DistributionUpdate> {
        let node = self.graph.node(index)?;

        let mut title_context = TitleContext::default();
        let mut constraints = ConstraintSet::new();
        for upstream in &node.upstream {
            match snapshot.get(upstream.name.as_str()) {
                Some(value) => {
                    constraints.push(self.dataset.resolve_index(upstream.index, value));
                    title_context
                        .applied
                        .push(Constraint::new(upstream.name.clone(), value));
                }
                None => title_context.pending.push(upstream.name.clone()),
            }
        }

        let state = NodeFilterState::classify(constraints.len(), node.upstream.len());

        let waiting_on = node
            .immediate_upstream()
            .filter(|f| node.requires_immediate_upstream && snapshot.get(f.name.as_str()).is_none());

        let (distribution, placeholder, diagnostic) = match waiting_on {
            Some(field) => (
                Distribution::empty(),
                true,
                Some(format!("no selection on {}", field.name)),
            ),
            None => {
                let distribution = aggregate_resolved(&self.dataset, node.field_index, &constraints);
                let diagnostic = distribution
                    .is_empty()
                    .then(|| "no records match the current selection".to_string());
                (distribution, false, diagnostic)
            }
        };

        log::debug!(
            target: "XFILTER",
            "evaluated {}: state={:?} constraints={} bars={} total={}",
            node.id,
            state,
            constraints.len(),
            distribution.len(),
            distribution.total()
        );

        Some(DistributionUpdate {
            node_id: node.id.clone(),
            field: node.field.clone(),
            label: node.label.clone(),
            distribution,
            title_context,
            state,
            placeholder,
            diagnostic,
            filter_version: snapshot.version(),
        })
    }
}
