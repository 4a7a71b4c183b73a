//! FILENAME: core/crossfilter/src/graph.rs
//! PURPOSE: Validated Directed Acyclic Graph (DAG) of chart dependencies.
//! CONTEXT: Built once from a `DashboardDefinition` before any selection event
//! is processed. Answers "which charts must be recomputed when this chart's
//! selection changes, and in what order".
//!
//! TERMINOLOGY:
//! - Owner: the chart that displays a field. Clicking its bars selects a value
//!   of that field, so it owns the field's entry in the filter state.
//! - Precedents: charts owning a chart's upstream fields (its inputs).
//!   If Feature = f(Summary, Test), the Summary and Test charts are precedents.
//! - Dependents: the reverse lookup of precedents.
//! - Self-filtering: a chart listing its own field as upstream. This is not
//!   an edge; it only makes the chart part of its own recomputation set.

use std::collections::VecDeque;

use dataset::{FieldIndex, FieldName, Schema};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::definition::{ChartId, DashboardDefinition};
use crate::error::GraphError;

/// Position of a chart in definition order.
pub type NodeIndex = usize;

/// An upstream field with its schema position resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamField {
    pub name: FieldName,
    pub index: FieldIndex,
}

/// A validated chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartNode {
    pub id: ChartId,
    pub field: FieldName,
    pub field_index: FieldIndex,
    pub label: String,
    /// Upstream fields in declaration order, nearest chart first.
    pub upstream: Vec<UpstreamField>,
    pub requires_immediate_upstream: bool,
    pub self_filtering: bool,
}

impl ChartNode {
    /// The nearest upstream field, which `requires_immediate_upstream` refers to.
    pub fn immediate_upstream(&self) -> Option<&UpstreamField> {
        self.upstream.first()
    }
}

/// Static chart dependencies plus a precomputed evaluation order.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    schema: Schema,
    nodes: Vec<ChartNode>,
    by_id: FxHashMap<ChartId, NodeIndex>,
    owners: FxHashMap<FieldName, NodeIndex>,

    /// For each chart, the charts owning its upstream fields (itself excluded).
    precedents: Vec<Vec<NodeIndex>>,

    /// For each chart, the charts that list its field as upstream (itself excluded).
    dependents: Vec<Vec<NodeIndex>>,

    /// All charts, precedents before dependents.
    topo_order: Vec<NodeIndex>,

    /// Position of each chart within `topo_order`.
    topo_rank: Vec<usize>,
}

impl DependencyGraph {
    /// Validates a definition against the dataset schema and builds the graph.
    ///
    /// Fails on: no charts, duplicate chart ids, fields missing from the
    /// schema, a field displayed by two charts, duplicate or unowned upstream
    /// fields, `requires_immediate_upstream` without upstream fields, and
    /// cycles. A chart referencing its own field is allowed (self-filter).
    pub fn build(definition: &DashboardDefinition, schema: &Schema) -> Result<Self, GraphError> {
        if definition.charts.is_empty() {
            return Err(GraphError::Empty);
        }

        // Pass 1: ids, displayed fields and their owners
        let mut by_id = FxHashMap::default();
        let mut owners: FxHashMap<FieldName, NodeIndex> = FxHashMap::default();
        let mut field_indices = Vec::with_capacity(definition.charts.len());

        for (index, chart) in definition.charts.iter().enumerate() {
            if by_id.insert(chart.id.clone(), index).is_some() {
                return Err(GraphError::DuplicateChart(chart.id.clone()));
            }

            field_indices.push(schema.index_of(chart.field.as_str())?);

            if let Some(&first) = owners.get(&chart.field) {
                return Err(GraphError::DuplicateFieldOwner {
                    field: chart.field.to_string(),
                    first: definition.charts[first].id.clone(),
                    second: chart.id.clone(),
                });
            }
            owners.insert(chart.field.clone(), index);
        }

        // Pass 2: upstream fields and edges
        let mut nodes = Vec::with_capacity(definition.charts.len());
        let mut precedents = Vec::with_capacity(definition.charts.len());

        for (index, chart) in definition.charts.iter().enumerate() {
            let mut seen = FxHashSet::default();
            let mut upstream = Vec::with_capacity(chart.upstream_fields.len());
            let mut precs = Vec::new();

            for name in &chart.upstream_fields {
                let field_index = schema.index_of(name.as_str())?;

                if !seen.insert(name.clone()) {
                    return Err(GraphError::DuplicateUpstream {
                        chart: chart.id.clone(),
                        field: name.to_string(),
                    });
                }

                let owner = owners.get(name).copied().ok_or_else(|| GraphError::UnownedUpstream {
                    chart: chart.id.clone(),
                    field: name.to_string(),
                })?;
                if owner != index {
                    precs.push(owner);
                }

                upstream.push(UpstreamField {
                    name: name.clone(),
                    index: field_index,
                });
            }

            if chart.requires_immediate_upstream && upstream.is_empty() {
                return Err(GraphError::MissingImmediateUpstream(chart.id.clone()));
            }

            nodes.push(ChartNode {
                id: chart.id.clone(),
                field: chart.field.clone(),
                field_index: field_indices[index],
                label: chart.display_label(),
                upstream,
                requires_immediate_upstream: chart.requires_immediate_upstream,
                self_filtering: chart.is_self_filtering(),
            });
            precedents.push(precs);
        }

        let mut dependents = vec![Vec::new(); nodes.len()];
        for (node, precs) in precedents.iter().enumerate() {
            for &prec in precs {
                dependents[prec].push(node);
            }
        }

        let topo_order = topological_sort(&nodes, &precedents, &dependents)?;
        let mut topo_rank = vec![0; nodes.len()];
        for (rank, &node) in topo_order.iter().enumerate() {
            topo_rank[node] = rank;
        }

        log::info!(
            target: "GRAPH",
            "built dashboard graph: charts={} edges={} order=[{}]",
            nodes.len(),
            precedents.iter().map(Vec::len).sum::<usize>(),
            topo_order
                .iter()
                .map(|&i| nodes[i].id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(DependencyGraph {
            schema: schema.clone(),
            nodes,
            by_id,
            owners,
            precedents,
            dependents,
            topo_order,
            topo_rank,
        })
    }

    /// The schema the graph was validated against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn nodes(&self) -> &[ChartNode] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIndex) -> Option<&ChartNode> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.by_id.get(id).copied()
    }

    /// The chart displaying `field`, if any.
    pub fn owner_of(&self, field: &str) -> Option<NodeIndex> {
        self.owners.get(field).copied()
    }

    pub fn precedents(&self, index: NodeIndex) -> &[NodeIndex] {
        self.precedents.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dependents(&self, index: NodeIndex) -> &[NodeIndex] {
        self.dependents.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every chart, precedents before dependents.
    pub fn topo_order(&self) -> &[NodeIndex] {
        &self.topo_order
    }

    /// All transitive dependents of a chart (not including the chart itself),
    /// in topological order.
    pub fn downstream_of(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut result = FxHashSet::default();
        let mut queue: VecDeque<NodeIndex> = self.dependents(index).iter().copied().collect();

        while let Some(current) = queue.pop_front() {
            if current == index || !result.insert(current) {
                continue;
            }
            queue.extend(self.dependents(current).iter().copied());
        }

        self.in_topo_order(result)
    }

    /// The charts to recompute when the selection on `index` changes: the
    /// chart itself if it filters on its own field, then everything downstream.
    pub fn affected_by(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut affected = self.downstream_of(index);
        if self.nodes.get(index).is_some_and(|n| n.self_filtering) {
            affected.insert(0, index);
        }
        affected
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of precedent relationships.
    pub fn edge_count(&self) -> usize {
        self.precedents.iter().map(Vec::len).sum()
    }

    fn in_topo_order(&self, nodes: FxHashSet<NodeIndex>) -> Vec<NodeIndex> {
        let mut ordered: Vec<NodeIndex> = nodes.into_iter().collect();
        ordered.sort_by_key(|&n| self.topo_rank[n]);
        ordered
    }
}

/// Kahn's algorithm over the whole chart set. Ties resolve in definition
/// order so the evaluation order is reproducible.
fn topological_sort(
    nodes: &[ChartNode],
    precedents: &[Vec<NodeIndex>],
    dependents: &[Vec<NodeIndex>],
) -> Result<Vec<NodeIndex>, GraphError> {
    let mut in_degree: Vec<usize> = precedents.iter().map(Vec::len).collect();
    let mut queue: VecDeque<NodeIndex> = (0..nodes.len()).filter(|&n| in_degree[n] == 0).collect();
    let mut result = Vec::with_capacity(nodes.len());

    while let Some(node) = queue.pop_front() {
        result.push(node);
        for &dep in &dependents[node] {
            in_degree[dep] -= 1;
            if in_degree[dep] == 0 {
                queue.push_back(dep);
            }
        }
    }

    if result.len() != nodes.len() {
        let cycle_nodes: Vec<NodeIndex> = (0..nodes.len()).filter(|&n| in_degree[n] > 0).collect();
        let path = find_cycle_path(&cycle_nodes, precedents)
            .into_iter()
            .map(|n| nodes[n].id.clone())
            .collect();
        return Err(GraphError::Cycle(path));
    }

    Ok(result)
}

/// Traces one cycle through the precedent chains for error reporting.
/// Falls back to the list of charts left unsorted.
fn find_cycle_path(cycle_nodes: &[NodeIndex], precedents: &[Vec<NodeIndex>]) -> Vec<NodeIndex> {
    let Some(&start) = cycle_nodes.first() else {
        return Vec::new();
    };
    let members: FxHashSet<NodeIndex> = cycle_nodes.iter().copied().collect();
    let mut path = vec![start];
    let mut current = start;

    for _ in 0..cycle_nodes.len() {
        let Some(&next) = precedents[current].iter().find(|p| members.contains(p)) else {
            break;
        };
        if let Some(pos) = path.iter().position(|&n| n == next) {
            // Close the loop from the first repeated chart
            let mut cycle = path.split_off(pos);
            cycle.push(next);
            return cycle;
        }
        path.push(next);
        current = next;
    }

    cycle_nodes.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ChartDefinition;
    use dataset::SchemaError;

    fn schema() -> Schema {
        Schema::new(dataset::issue_tracker_fields()).unwrap()
    }

    fn build(charts: Vec<ChartDefinition>) -> Result<DependencyGraph, GraphError> {
        DependencyGraph::build(&DashboardDefinition::new(charts), &schema())
    }

    fn ids(graph: &DependencyGraph, nodes: &[NodeIndex]) -> Vec<String> {
        nodes.iter().map(|&n| graph.nodes()[n].id.clone()).collect()
    }

    #[test]
    fn test_issue_tracker_chain() {
        let graph = DependencyGraph::build(&DashboardDefinition::issue_tracker(), &schema()).unwrap();

        assert_eq!(graph.len(), 5);
        assert_eq!(graph.edge_count(), 10);
        assert_eq!(
            ids(&graph, graph.topo_order()),
            vec!["test-type", "modified-summary", "feature-type", "defect-type", "labels"]
        );

        let root = graph.index_of("test-type").unwrap();
        assert!(graph.nodes()[root].self_filtering);
        assert!(graph.precedents(root).is_empty());
    }

    #[test]
    fn test_affected_by_includes_self_filtering_root() {
        let graph = DependencyGraph::build(&DashboardDefinition::issue_tracker(), &schema()).unwrap();
        let root = graph.index_of("test-type").unwrap();
        let feature = graph.index_of("feature-type").unwrap();

        assert_eq!(ids(&graph, &graph.affected_by(root)).len(), 5);
        assert_eq!(
            ids(&graph, &graph.affected_by(feature)),
            vec!["defect-type", "labels"]
        );
        assert!(graph.affected_by(graph.index_of("labels").unwrap()).is_empty());
    }

    #[test]
    fn test_downstream_is_transitive() {
        // A <- B <- C, with C not listing A directly
        let graph = build(vec![
            ChartDefinition::new("a", "DefectType"),
            ChartDefinition::new("b", "FeatureType").with_upstream(&["DefectType"]),
            ChartDefinition::new("c", "Label").with_upstream(&["FeatureType"]),
        ])
        .unwrap();

        assert_eq!(ids(&graph, &graph.downstream_of(0)), vec!["b", "c"]);
        assert_eq!(ids(&graph, &graph.affected_by(0)), vec!["b", "c"]);
    }

    #[test]
    fn test_diamond_order() {
        //     a
        //    / \
        //   b   c
        //    \ /
        //     d
        let graph = build(vec![
            ChartDefinition::new("d", "Label").with_upstream(&["FeatureType", "TestType"]),
            ChartDefinition::new("b", "FeatureType").with_upstream(&["DefectType"]),
            ChartDefinition::new("c", "TestType").with_upstream(&["DefectType"]),
            ChartDefinition::new("a", "DefectType"),
        ])
        .unwrap();

        let order = ids(&graph, graph.topo_order());
        let pos = |id: &str| order.iter().position(|n| n == id).unwrap();
        assert!(pos("a") < pos("b"));
        assert!(pos("a") < pos("c"));
        assert!(pos("d") > pos("b"));
        assert!(pos("d") > pos("c"));

        let a = graph.index_of("a").unwrap();
        assert_eq!(graph.downstream_of(a).len(), 3);
        assert_eq!(graph.dependents(a).len(), 2);
    }

    #[test]
    fn test_cycle_is_rejected_with_path() {
        let err = build(vec![
            ChartDefinition::new("a", "DefectType").with_upstream(&["Label"]),
            ChartDefinition::new("b", "FeatureType").with_upstream(&["DefectType"]),
            ChartDefinition::new("c", "Label").with_upstream(&["FeatureType"]),
        ])
        .unwrap_err();

        match err {
            GraphError::Cycle(path) => {
                assert_eq!(path.first(), path.last());
                assert_eq!(path.len(), 4);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_reference_is_not_a_cycle() {
        let graph = build(vec![
            ChartDefinition::new("root", "DefectType").with_upstream(&["DefectType"]),
        ])
        .unwrap();
        assert!(graph.nodes()[0].self_filtering);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.affected_by(0), vec![0]);
    }

    #[test]
    fn test_unknown_fields_fail_fast() {
        let err = build(vec![ChartDefinition::new("x", "Severity")]).unwrap_err();
        assert_eq!(
            err,
            GraphError::Schema(SchemaError::UnknownField("Severity".to_string()))
        );

        let err = build(vec![
            ChartDefinition::new("x", "DefectType").with_upstream(&["Severity"]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            GraphError::Schema(SchemaError::UnknownField("Severity".to_string()))
        );
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(build(Vec::new()).unwrap_err(), GraphError::Empty);

        assert_eq!(
            build(vec![
                ChartDefinition::new("x", "DefectType"),
                ChartDefinition::new("x", "Label"),
            ])
            .unwrap_err(),
            GraphError::DuplicateChart("x".to_string())
        );

        assert!(matches!(
            build(vec![
                ChartDefinition::new("x", "DefectType"),
                ChartDefinition::new("y", "DefectType"),
            ])
            .unwrap_err(),
            GraphError::DuplicateFieldOwner { .. }
        ));

        assert!(matches!(
            build(vec![
                ChartDefinition::new("x", "DefectType").with_upstream(&["Creator"]),
            ])
            .unwrap_err(),
            GraphError::UnownedUpstream { .. }
        ));

        assert!(matches!(
            build(vec![
                ChartDefinition::new("x", "DefectType"),
                ChartDefinition::new("y", "Label").with_upstream(&["DefectType", "DefectType"]),
            ])
            .unwrap_err(),
            GraphError::DuplicateUpstream { .. }
        ));

        assert_eq!(
            build(vec![
                ChartDefinition::new("x", "DefectType").requiring_immediate_upstream(),
            ])
            .unwrap_err(),
            GraphError::MissingImmediateUpstream("x".to_string())
        );
    }

    #[test]
    fn test_owner_lookup() {
        let graph = DependencyGraph::build(&DashboardDefinition::issue_tracker(), &schema()).unwrap();
        assert_eq!(graph.owner_of("Label"), graph.index_of("labels"));
        assert_eq!(graph.owner_of("Creator"), None);
        assert_eq!(graph.node(99), None);
    }
}
