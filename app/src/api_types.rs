//! FILENAME: app/src/api_types.rs
//! Request and response types exchanged with the chart renderer, plus
//! caption formatting.

use crossfilter::{DependencyGraph, DistributionUpdate, NodeFilterState, SelectionEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SessionId = Uuid;

// ============================================================================
// REQUESTS
// ============================================================================

/// A click on a bar (or a clear) in one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    pub session_id: SessionId,
    pub source_node_id: String,
    /// `None` clears the chart's selection.
    #[serde(default)]
    pub selected_value: Option<String>,
}

impl SelectionRequest {
    pub fn to_event(&self) -> SelectionEvent {
        SelectionEvent {
            source_node_id: self.source_node_id.clone(),
            selected_value: self.selected_value.clone(),
        }
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

/// One chart, flattened for drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResponse {
    pub node_id: String,
    pub caption: String,
    pub categories: Vec<String>,
    pub counts: Vec<u64>,
    pub total: u64,
    pub state: NodeFilterState,
    pub diagnostic: Option<String>,
}

impl ChartResponse {
    pub fn from_update(update: &DistributionUpdate, graph: &DependencyGraph) -> Self {
        ChartResponse {
            node_id: update.node_id.clone(),
            caption: format_caption(update, graph),
            categories: update.distribution.categories().into_iter().map(str::to_string).collect(),
            counts: update.distribution.counts(),
            total: update.distribution.total(),
            state: update.state,
            diagnostic: update.diagnostic.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOpened {
    pub session_id: SessionId,
    pub charts: Vec<ChartResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub session_id: SessionId,
    pub filter_version: u64,
    /// Recomputed charts in evaluation order. Empty when nothing changed.
    pub updated: Vec<ChartResponse>,
    /// Set when the request was ignored (e.g. unknown chart id).
    pub diagnostic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEntry {
    pub field: String,
    pub value: String,
}

// ============================================================================
// CAPTIONS
// ============================================================================

/// Display label of the chart owning `field`, falling back to the field name.
fn field_label(graph: &DependencyGraph, field: &str) -> String {
    graph
        .owner_of(field)
        .and_then(|index| graph.node(index))
        .map(|node| node.label.clone())
        .unwrap_or_else(|| field.to_string())
}

/// Builds the chart caption. Only applied constraints appear, in upstream order.
pub fn format_caption(update: &DistributionUpdate, graph: &DependencyGraph) -> String {
    if update.placeholder {
        let waiting_on = update
            .title_context
            .pending
            .first()
            .map(|field| field_label(graph, field.as_str()))
            .unwrap_or_default();
        return format!("{} Distribution (select {} to populate)", update.label, waiting_on);
    }

    if update.title_context.is_empty() {
        return format!("{} Distribution", update.label);
    }

    let parts: Vec<String> = update
        .title_context
        .applied
        .iter()
        .map(|c| format!("{}: {}", field_label(graph, c.field.as_str()), c.value))
        .collect();
    format!("{} Distribution for {}", update.label, parts.join(" and "))
}
