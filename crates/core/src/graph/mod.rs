//! Graph construction for the control-flow view.
//!
//! Turns raw blocks and links into renderable nodes and edges carrying the
//! color, icon and classification metadata the rendering layer styles with,
//! and computes the per-type histogram behind the filter controls.

pub mod color;
pub mod filter;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Block, Link};

pub use color::{FunctionDict, FunctionLabel, LegendEntry};
pub use filter::{FilteredGraph, GraphFilter, MarkedNode, NodeMark};

/// Padding around the node icon, in pixels.
pub const NODE_IMAGE_PADDING: u32 = 10;

/// Error type for graph construction.
///
/// Each variant is an upstream contract violation: the disassembly result
/// does not agree with itself, so no partial graph is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Block {block} references function '{function}' which has no color assigned")]
    UnknownFunction { block: usize, function: String },

    #[error("Link {link} has {endpoint} {block} which is not a known block index")]
    DanglingLink { link: String, endpoint: &'static str, block: usize },

    #[error("Block index {0} appears more than once")]
    DuplicateBlock(usize),
}

/// Convenience result type for graph construction.
pub type GraphResult<T> = Result<T, GraphError>;

/// Classification tag of a block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Selfdestructs,
    Revert,
    Returns,
    Calls,
    Creates,
    StorageReads,
    StorageWrites,
    MemoryReads,
    MemoryWrites,
    Push,
    Logs,
    Calldataloads,
    Calldatacopies,
    Default,
}

impl NodeType {
    pub const ALL: [NodeType; 14] = [
        NodeType::Selfdestructs,
        NodeType::Revert,
        NodeType::Returns,
        NodeType::Calls,
        NodeType::Creates,
        NodeType::StorageReads,
        NodeType::StorageWrites,
        NodeType::MemoryReads,
        NodeType::MemoryWrites,
        NodeType::Push,
        NodeType::Logs,
        NodeType::Calldataloads,
        NodeType::Calldatacopies,
        NodeType::Default,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Selfdestructs => "selfdestructs",
            NodeType::Revert => "revert",
            NodeType::Returns => "returns",
            NodeType::Calls => "calls",
            NodeType::Creates => "creates",
            NodeType::StorageReads => "storageReads",
            NodeType::StorageWrites => "storageWrites",
            NodeType::MemoryReads => "memoryReads",
            NodeType::MemoryWrites => "memoryWrites",
            NodeType::Push => "push",
            NodeType::Logs => "logs",
            NodeType::Calldataloads => "calldataloads",
            NodeType::Calldatacopies => "calldatacopies",
            NodeType::Default => "default",
        }
    }

    /// Icon asset drawn inside nodes of this type.
    pub fn icon(self) -> &'static str {
        match self {
            NodeType::Selfdestructs => "eraser-solid.svg",
            NodeType::Revert => "backward-solid.svg",
            NodeType::Returns => "arrow-up-from-bracket-solid.svg",
            NodeType::Calls => "terminal-solid.svg",
            NodeType::Creates => "plus-solid.svg",
            NodeType::StorageReads => "hard-drive-regular.svg",
            NodeType::StorageWrites => "hard-drive-solid.svg",
            NodeType::MemoryReads => "floppy-disk-regular.svg",
            NodeType::MemoryWrites => "floppy-disk-solid.svg",
            NodeType::Push => "arrows-down-to-line-solid.svg",
            NodeType::Logs => "file-lines-regular.svg",
            NodeType::Calldataloads => "rotate-solid.svg",
            NodeType::Calldatacopies => "clone-regular.svg",
            NodeType::Default => "circle-regular.svg",
        }
    }

    /// Map a backend type string onto a tag; anything unknown is `Default`.
    pub fn classify(tag: &str) -> NodeType {
        tag.parse().unwrap_or_else(|_| {
            log::debug!("unrecognised block type '{tag}', classified as default");
            NodeType::Default
        })
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known [`NodeType`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown node type '{0}'")]
pub struct UnknownNodeType(pub String);

impl FromStr for NodeType {
    type Err = UnknownNodeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|node_type| node_type.as_str() == s)
            .ok_or_else(|| UnknownNodeType(s.to_string()))
    }
}

/// Every tag applicable to a block, in declaration order without repeats.
///
/// A block without declared types is tagged `Default`; it is never tagless.
pub fn classify_types(types: &[String]) -> Vec<NodeType> {
    let mut tags = Vec::with_capacity(types.len().max(1));
    for tag in types {
        let node_type = NodeType::classify(tag);
        if !tags.contains(&node_type) {
            tags.push(node_type);
        }
    }
    if tags.is_empty() {
        tags.push(NodeType::Default);
    }
    tags
}

/// Branch kind of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    /// Jump taken, or unconditional flow.
    TrueCondition,
    /// Not-taken branch of a conditional jump.
    FalseCondition,
}

impl EdgeKind {
    /// A link carrying any `condition` value is the not-taken branch; links
    /// without one always render as taken.
    pub fn of(link: &Link) -> EdgeKind {
        match link.condition {
            Some(_) => EdgeKind::FalseCondition,
            None => EdgeKind::TrueCondition,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            EdgeKind::TrueCondition => "#227834",
            EdgeKind::FalseCondition => "#b01515",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EdgeKind::TrueCondition => "True Jump",
            EdgeKind::FalseCondition => "False Jump",
        }
    }
}

/// Renderable node for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: usize,
    pub label: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    pub image: String,
    pub image_padding: u32,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub types: Vec<NodeType>,
}

impl GraphNode {
    pub fn has_type(&self, node_type: NodeType) -> bool {
        self.types.contains(&node_type)
    }
}

/// Renderable edge for one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: usize,
    pub target: usize,
    pub color: String,
    pub kind: EdgeKind,
}

/// Node and edge collection handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphModel {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Occurrence count of every classification tag.
///
/// All tags are present, including those with a zero count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeCounts(BTreeMap<NodeType, usize>);

impl Default for TypeCounts {
    fn default() -> Self {
        Self(NodeType::ALL.into_iter().map(|node_type| (node_type, 0)).collect())
    }
}

impl TypeCounts {
    pub fn get(&self, node_type: NodeType) -> usize {
        self.0.get(&node_type).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeType, usize)> + '_ {
        self.0.iter().map(|(node_type, count)| (*node_type, *count))
    }

    /// Tags with at least one node, the only ones worth offering as filters.
    pub fn non_zero(&self) -> impl Iterator<Item = (NodeType, usize)> + '_ {
        self.iter().filter(|(_, count)| *count > 0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

/// Count, per tag, how many of `nodes` carry it.
pub fn type_counts<'a, I>(nodes: I) -> TypeCounts
where
    I: IntoIterator<Item = &'a GraphNode>,
{
    let mut counts = TypeCounts::default();
    for node in nodes {
        if node.types.is_empty() {
            *counts.0.entry(NodeType::Default).or_insert(0) += 1;
            continue;
        }
        for node_type in &node.types {
            *counts.0.entry(*node_type).or_insert(0) += 1;
        }
    }
    counts
}

fn build_node(block: &Block, functions: &FunctionDict) -> GraphResult<GraphNode> {
    let label = functions.lookup(block.function.as_deref()).ok_or_else(|| {
        GraphError::UnknownFunction {
            block: block.i,
            function: block.function.clone().unwrap_or_default(),
        }
    })?;

    let node_type =
        block.types.first().map(|tag| NodeType::classify(tag)).unwrap_or(NodeType::Default);

    Ok(GraphNode {
        id: block.i,
        label: block.i.to_string(),
        color: label.color.clone(),
        function: block.function.clone(),
        image: node_type.icon().to_string(),
        image_padding: NODE_IMAGE_PADDING,
        node_type,
        types: classify_types(&block.types),
    })
}

fn build_edge(position: usize, link: &Link, known: &HashSet<usize>) -> GraphResult<GraphEdge> {
    let id = link.id.clone().unwrap_or_else(|| format!("e{position}"));
    for (endpoint, block) in [("source", link.source), ("target", link.target)] {
        if !known.contains(&block) {
            return Err(GraphError::DanglingLink { link: id, endpoint, block });
        }
    }

    let kind = EdgeKind::of(link);
    Ok(GraphEdge {
        id,
        source: link.source,
        target: link.target,
        color: kind.color().to_string(),
        kind,
    })
}

/// Build the renderable graph for one disassembly result.
///
/// `functions` must hold a label for every function any block references.
pub fn build_graph(
    blocks: &[Block],
    links: &[Link],
    functions: &FunctionDict,
) -> GraphResult<GraphModel> {
    let mut known = HashSet::with_capacity(blocks.len());
    let mut nodes = Vec::with_capacity(blocks.len());
    for block in blocks {
        if !known.insert(block.i) {
            return Err(GraphError::DuplicateBlock(block.i));
        }
        nodes.push(build_node(block, functions)?);
    }

    let edges = links
        .iter()
        .enumerate()
        .map(|(position, link)| build_edge(position, link, &known))
        .collect::<GraphResult<Vec<_>>>()?;

    log::debug!("built graph with {} nodes and {} edges", nodes.len(), edges.len());
    Ok(GraphModel { nodes, edges })
}

/// Rendering-library element wrapper: `{ "data": { ... } }`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GraphElement<'a> {
    Node { data: &'a GraphNode },
    Edge { data: &'a GraphEdge },
}

impl GraphModel {
    pub fn node(&self, id: usize) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Histogram over the nodes that pass the function part of `filter`.
    ///
    /// The type part is ignored, otherwise the histogram would collapse to
    /// the currently selected type.
    pub fn type_counts_for(&self, filter: &GraphFilter) -> TypeCounts {
        let function_only = filter.without_type();
        type_counts(self.nodes.iter().filter(|node| function_only.matches(node)))
    }

    /// Nodes followed by edges, in the element format of the rendering layer.
    pub fn elements(&self) -> Vec<GraphElement<'_>> {
        self.nodes
            .iter()
            .map(|data| GraphElement::Node { data })
            .chain(self.edges.iter().map(|data| GraphElement::Edge { data }))
            .collect()
    }
}
