//! FILENAME: core/crossfilter/src/lib.rs
//! Cascading cross-filter engine for linked drill-down bar charts.
//!
//! Clicking a bar in one chart narrows the population shown in the charts
//! downstream of it. This crate tracks the current selections, knows which
//! charts each selection constrains, and recomputes their frequency
//! distributions. Drawing the bars is left to the renderer behind `RenderSink`.
//!
//! Layers:
//! - `definition`: Serializable chart configuration (what the dashboard IS)
//! - `graph`: Validated, topologically ordered chart dependencies
//! - `filter_state`: Per-session selections
//! - `aggregator`: Frequency counting over constrained subsets (HOW we count)
//! - `evaluator`: Selection events in, distribution updates out
//! - `render`: The types pushed to the renderer (WHAT we display)

pub mod aggregator;
pub mod definition;
pub mod distribution;
pub mod error;
pub mod evaluator;
pub mod filter_state;
pub mod graph;
pub mod render;

pub use aggregator::{aggregate, aggregate_resolved, resolve_constraints, Constraint, ConstraintSet};
pub use definition::{ChartDefinition, ChartId, DashboardDefinition};
pub use distribution::{Distribution, DistributionEntry};
pub use error::{GraphError, SelectionError};
pub use evaluator::{ReactiveEvaluator, SelectionEvent};
pub use filter_state::{FilterSnapshot, FilterState};
pub use graph::{ChartNode, DependencyGraph, NodeIndex, UpstreamField};
pub use render::{DistributionUpdate, FnSink, NodeFilterState, RenderSink, TitleContext};
