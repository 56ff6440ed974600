//! Node filtering by function and classification tag.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::{GraphEdge, GraphModel, GraphNode, NodeType};

/// Active filter; `None` in a dimension means "do not filter on it".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFilter {
    #[serde(default)]
    pub function: Option<String>,
    #[serde(rename = "type", default)]
    pub node_type: Option<NodeType>,
}

impl GraphFilter {
    /// The filter matching every node.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn function(function: impl Into<String>) -> Self {
        Self { function: Some(function.into()), node_type: None }
    }

    pub fn node_type(node_type: NodeType) -> Self {
        Self { function: None, node_type: Some(node_type) }
    }

    pub fn with_function(mut self, function: Option<String>) -> Self {
        self.function = function;
        self
    }

    pub fn with_node_type(mut self, node_type: Option<NodeType>) -> Self {
        self.node_type = node_type;
        self
    }

    /// Same filter with the type dimension dropped.
    pub fn without_type(&self) -> Self {
        Self { function: self.function.clone(), node_type: None }
    }

    pub fn is_active(&self) -> bool {
        self.function.is_some() || self.node_type.is_some()
    }

    /// Function must match exactly; the type must be among the node's tags.
    pub fn matches(&self, node: &GraphNode) -> bool {
        let function_ok = match &self.function {
            None => true,
            Some(function) => node.function.as_deref() == Some(function.as_str()),
        };
        let type_ok = match self.node_type {
            None => true,
            Some(node_type) => node.has_type(node_type),
        };
        function_ok && type_ok
    }

    /// Predicate form of [`GraphFilter::matches`], for iterator adaptors.
    pub fn predicate(&self) -> impl Fn(&GraphNode) -> bool + '_ {
        move |node| self.matches(node)
    }
}

/// Highlight class of a node when non-matching nodes are kept visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeMark {
    Contained,
    Omitted,
}

impl NodeMark {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeMark::Contained => "contained",
            NodeMark::Omitted => "omitted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkedNode {
    #[serde(flatten)]
    pub node: GraphNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark: Option<NodeMark>,
}

/// Graph after a filter has been applied for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredGraph {
    pub nodes: Vec<MarkedNode>,
    pub edges: Vec<GraphEdge>,
    /// Number of nodes that matched the filter.
    pub matched: usize,
    /// Number of nodes dropped from `nodes`.
    pub removed: usize,
}

impl GraphModel {
    /// Apply `filter` for display.
    ///
    /// When every node matches, the graph is returned unmarked. Otherwise,
    /// with `show_only_filtered` the non-matching nodes and every edge
    /// touching them are removed; without it all nodes stay and are marked
    /// `Contained` or `Omitted`.
    pub fn apply_filter(&self, filter: &GraphFilter, show_only_filtered: bool) -> FilteredGraph {
        let matched = self.nodes.iter().filter(|node| filter.matches(node)).count();

        if matched == self.nodes.len() {
            return FilteredGraph {
                nodes: self
                    .nodes
                    .iter()
                    .map(|node| MarkedNode { node: node.clone(), mark: None })
                    .collect(),
                edges: self.edges.clone(),
                matched,
                removed: 0,
            };
        }

        if show_only_filtered {
            let kept: Vec<&GraphNode> =
                self.nodes.iter().filter(|node| filter.matches(node)).collect();
            let kept_ids: HashSet<usize> = kept.iter().map(|node| node.id).collect();
            let edges = self
                .edges
                .iter()
                .filter(|edge| kept_ids.contains(&edge.source) && kept_ids.contains(&edge.target))
                .cloned()
                .collect();
            return FilteredGraph {
                nodes: kept
                    .iter()
                    .map(|node| MarkedNode { node: (*node).clone(), mark: None })
                    .collect(),
                edges,
                matched,
                removed: self.nodes.len() - matched,
            };
        }

        let nodes = self
            .nodes
            .iter()
            .map(|node| {
                let mark =
                    if filter.matches(node) { NodeMark::Contained } else { NodeMark::Omitted };
                MarkedNode { node: node.clone(), mark: Some(mark) }
            })
            .collect();
        FilteredGraph { nodes, edges: self.edges.clone(), matched, removed: 0 }
    }
}
