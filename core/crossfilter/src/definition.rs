//! FILENAME: core/crossfilter/src/definition.rs
//! Dashboard Definition - The serializable configuration.
//!
//! This module contains the types needed to DESCRIBE a drill-down dashboard.
//! These structures are designed to be:
//! - Serializable (loaded from a JSON file at startup)
//! - Static (created once, never mutated while events flow)
//! - Unvalidated (see `graph::DependencyGraph::build` for the checks)

use dataset::{FieldName, DEFECT_TYPE, FEATURE_TYPE, LABEL, MODIFIED_SUMMARY, TEST_TYPE};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Identifier of a chart, as used by the renderer (e.g. `"test-type"`).
pub type ChartId = String;

// ============================================================================
// CHART DEFINITION
// ============================================================================

/// One bar chart in the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDefinition {
    pub id: ChartId,

    /// The field whose distribution the chart displays. Clicking one of its
    /// bars selects a value of this field.
    pub field: FieldName,

    /// Fields whose selections constrain this chart, nearest chart first.
    /// Listing `field` itself makes the chart filter on its own selection.
    #[serde(default)]
    pub upstream_fields: Vec<FieldName>,

    /// When set, the chart shows a placeholder until the first entry of
    /// `upstream_fields` has a selection, instead of the whole-dataset counts.
    #[serde(default)]
    pub requires_immediate_upstream: bool,

    /// Human-readable name of the field for captions (e.g. "Quest Number").
    #[serde(default)]
    pub label: Option<String>,
}

impl ChartDefinition {
    pub fn new(id: impl Into<ChartId>, field: impl Into<FieldName>) -> Self {
        ChartDefinition {
            id: id.into(),
            field: field.into(),
            upstream_fields: Vec::new(),
            requires_immediate_upstream: false,
            label: None,
        }
    }

    pub fn with_upstream(mut self, fields: &[&str]) -> Self {
        self.upstream_fields = fields.iter().map(|f| FieldName::from(*f)).collect();
        self
    }

    pub fn requiring_immediate_upstream(mut self) -> Self {
        self.requires_immediate_upstream = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether the chart filters by its own most recent selection.
    pub fn is_self_filtering(&self) -> bool {
        self.upstream_fields.contains(&self.field)
    }

    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.field.to_string())
    }
}

// ============================================================================
// DASHBOARD DEFINITION
// ============================================================================

/// The complete, ordered list of charts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardDefinition {
    pub charts: Vec<ChartDefinition>,
}

impl DashboardDefinition {
    pub fn new(charts: Vec<ChartDefinition>) -> Self {
        DashboardDefinition { charts }
    }

    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        serde_json::from_str(json).map_err(|e| GraphError::InvalidDefinition(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, GraphError> {
        serde_json::to_string_pretty(self).map_err(|e| GraphError::InvalidDefinition(e.to_string()))
    }

    /// The five-chart issue-tracker chain.
    ///
    /// Upstream fan-in grows 1, 1, 2, 3, 4 down the chain. The test-type root
    /// filters itself, the quest-number chart stays empty until a test type is
    /// picked, and the deepest label chart stays empty until a defect type is.
    pub fn issue_tracker() -> Self {
        DashboardDefinition::new(vec![
            ChartDefinition::new("test-type", TEST_TYPE)
                .with_upstream(&[TEST_TYPE])
                .with_label("Test Type"),
            ChartDefinition::new("modified-summary", MODIFIED_SUMMARY)
                .with_upstream(&[TEST_TYPE])
                .requiring_immediate_upstream()
                .with_label("Quest Number"),
            ChartDefinition::new("feature-type", FEATURE_TYPE)
                .with_upstream(&[MODIFIED_SUMMARY, TEST_TYPE])
                .with_label("Feature Type"),
            ChartDefinition::new("defect-type", DEFECT_TYPE)
                .with_upstream(&[FEATURE_TYPE, MODIFIED_SUMMARY, TEST_TYPE])
                .with_label("Defect Type"),
            ChartDefinition::new("labels", LABEL)
                .with_upstream(&[DEFECT_TYPE, FEATURE_TYPE, MODIFIED_SUMMARY, TEST_TYPE])
                .requiring_immediate_upstream()
                .with_label("Label"),
        ])
    }
}
