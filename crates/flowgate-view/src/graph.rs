//! Derivation of the diagram topology from flow records.
//!
//! [`FlowGraph`] collects the distinct labels across every record's source
//! and target (first-seen order, which is also each node's stable index) and
//! maps every record to a link between node indices. The underlying
//! `petgraph` graph uses the same indices.

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use flowgate_core::FlowRecord;

/// Category assigned to links whose record carries none.
pub const DEFAULT_CATEGORY: &str = "default";

/// A diagram node: a distinct source or target label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramNode {
    pub index: usize,
    pub label: String,
}

/// A diagram link: one flow record mapped onto node indices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub category: String,
}

/// Node/link topology of a record set.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    graph: DiGraph<String, DiagramLink>,
    index: IndexMap<String, NodeIndex>,
}

impl FlowGraph {
    pub fn from_records(records: &[FlowRecord]) -> Self {
        let mut flow_graph = FlowGraph::default();
        for record in records {
            let source = flow_graph.intern(&record.source);
            let target = flow_graph.intern(&record.target);
            let link = DiagramLink {
                source: source.index(),
                target: target.index(),
                value: record.value,
                category: record
                    .split_category
                    .clone()
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            };
            flow_graph.graph.add_edge(source, target, link);
        }
        flow_graph
    }

    fn intern(&mut self, label: &str) -> NodeIndex {
        if let Some(idx) = self.index.get(label) {
            return *idx;
        }
        let idx = self.graph.add_node(label.to_string());
        self.index.insert(label.to_string(), idx);
        idx
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Stable index of `label`, if it appears in the records.
    pub fn node_index(&self, label: &str) -> Option<usize> {
        self.index.get(label).map(|idx| idx.index())
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.graph
            .node_weight(NodeIndex::new(index))
            .map(String::as_str)
    }

    /// Nodes in index order.
    pub fn nodes(&self) -> Vec<DiagramNode> {
        self.graph
            .node_indices()
            .map(|idx| DiagramNode {
                index: idx.index(),
                label: self.graph[idx].clone(),
            })
            .collect()
    }

    /// Links in record order.
    pub fn links(&self) -> Vec<DiagramLink> {
        self.graph.edge_weights().cloned().collect()
    }

    pub fn inner(&self) -> &DiGraph<String, DiagramLink> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn two_records_three_nodes() {
        let records = vec![FlowRecord::new("A", "B", 5.0), FlowRecord::new("B", "C", 3.0)];
        let graph = FlowGraph::from_records(&records);

        let labels: Vec<_> = graph.nodes().into_iter().map(|n| n.label).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);

        let links = graph.links();
        assert_eq!(links.len(), 2);
        assert_eq!((links[0].source, links[0].target, links[0].value), (0, 1, 5.0));
        assert_eq!((links[1].source, links[1].target, links[1].value), (1, 2, 3.0));
        assert!(links.iter().all(|l| l.category == DEFAULT_CATEGORY));
    }

    #[test]
    fn category_is_carried_onto_links() {
        let records = vec![
            FlowRecord::new("A", "B", 1.0).with_category("opex"),
            FlowRecord::new("A", "C", 1.0).with_category(""),
        ];
        let links = FlowGraph::from_records(&records).links();
        assert_eq!(links[0].category, "opex");
        assert_eq!(links[1].category, DEFAULT_CATEGORY);
    }

    #[test]
    fn empty_records_give_empty_graph() {
        let graph = FlowGraph::from_records(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn index_lookup_round_trips() {
        let graph = FlowGraph::from_records(&[FlowRecord::new("x", "y", 1.0)]);
        assert_eq!(graph.node_index("y"), Some(1));
        assert_eq!(graph.label(1), Some("y"));
        assert_eq!(graph.node_index("z"), None);
    }

    proptest! {
        #[test]
        fn node_set_is_union_of_labels(
            pairs in prop::collection::vec(("[a-e]", "[a-e]", 0.0f64..100.0), 0..20)
        ) {
            let records: Vec<FlowRecord> = pairs
                .iter()
                .map(|(s, t, v)| FlowRecord::new(s.clone(), t.clone(), *v))
                .collect();
            let graph = FlowGraph::from_records(&records);

            let labels: Vec<String> = graph.nodes().into_iter().map(|n| n.label).collect();
            let unique: HashSet<&String> = labels.iter().collect();
            prop_assert_eq!(unique.len(), labels.len());

            let expected: HashSet<String> = records
                .iter()
                .flat_map(|r| [r.source.clone(), r.target.clone()])
                .collect();
            let actual: HashSet<String> = labels.into_iter().collect();
            prop_assert_eq!(actual, expected);
            prop_assert_eq!(graph.link_count(), records.len());
        }
    }
}
