//! Open Graph Benchmark datasets.
//!
//! OGB datasets come as edge lists, node counts, feature matrices and
//! train/valid/test splits. This module models them as plain Rust types,
//! translates them into the node and relationship frames understood by
//! [`GraphConstructor`](crate::query_runner::GraphConstructor), and loads
//! them into the server through `gds.graph.ogbn` and `gds.graph.ogbl`.
//!
//! Node property prediction (`ogbn-*`) datasets become graphs whose nodes
//! carry `Train`, `Valid` or `Test` labels. Link property prediction
//! (`ogbl-*`) datasets become graphs whose split edges are typed by set,
//! e.g. `TRAIN_POS` or `VALID_NEG`.

mod loader;
mod reader;
mod translate;

#[cfg(test)]
mod reader_tests;

use indexmap::IndexMap;

pub use loader::{OgblLoader, OgbnLoader};
pub use reader::read_node_dataset;
pub use translate::GraphFrames;

/// A directed edge as `(source, target)` node indices.
pub type Edge = (i64, i64);

/// Dense feature matrix, one row per node.
pub type Features = Vec<Vec<f64>>;

/// Relation of a heterogeneous graph: `(head type, relation, tail type)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeTriple {
    /// Node type at the source of the relation.
    pub head: String,
    /// Relationship type.
    pub relation: String,
    /// Node type at the target of the relation.
    pub tail: String,
}

impl EdgeTriple {
    /// Creates a relation triple.
    #[must_use]
    pub fn new(head: &str, relation: &str, tail: &str) -> Self {
        Self {
            head: head.to_string(),
            relation: relation.to_string(),
            tail: tail.to_string(),
        }
    }
}

/// Graph with a single node and relationship type.
#[derive(Debug, Clone, Default)]
pub struct HomogeneousGraph {
    /// Edges between node indices.
    pub edge_index: Vec<Edge>,
    /// Number of nodes.
    pub num_nodes: usize,
    /// Node features, if the dataset has any.
    pub node_feat: Option<Features>,
    /// Edge features; dropped on translation.
    pub edge_feat: Option<Features>,
}

/// Graph with typed nodes and relations.
///
/// Node indices in `edge_index_dict` are local to each node type.
#[derive(Debug, Clone, Default)]
pub struct HeterogeneousGraph {
    /// Edges per relation.
    pub edge_index_dict: IndexMap<EdgeTriple, Vec<Edge>>,
    /// Number of nodes per node type.
    pub num_nodes_dict: IndexMap<String, usize>,
    /// Node features per node type.
    pub node_feat_dict: IndexMap<String, Features>,
    /// Edge features per relation; dropped on translation.
    pub edge_feat_dict: Option<IndexMap<EdgeTriple, Features>>,
}

/// Node indices per split set.
#[derive(Debug, Clone, Default)]
pub struct NodeSplit {
    /// Training nodes.
    pub train: Vec<usize>,
    /// Validation nodes.
    pub valid: Vec<usize>,
    /// Test nodes.
    pub test: Vec<usize>,
}

/// Node indices per split set and node type.
///
/// Only node types present in `train` are split.
#[derive(Debug, Clone, Default)]
pub struct HeterogeneousNodeSplit {
    /// Training nodes per type.
    pub train: IndexMap<String, Vec<usize>>,
    /// Validation nodes per type.
    pub valid: IndexMap<String, Vec<usize>>,
    /// Test nodes per type.
    pub test: IndexMap<String, Vec<usize>>,
}

/// Homogeneous node property prediction dataset, e.g. `ogbn-arxiv`.
#[derive(Debug, Clone)]
pub struct HomogeneousNodeDataset {
    /// Dataset name, e.g. `ogbn-arxiv`.
    pub name: String,
    /// The graph.
    pub graph: HomogeneousGraph,
    /// Class label per node.
    pub labels: Vec<i64>,
    /// Train/valid/test split.
    pub split: NodeSplit,
}

/// Heterogeneous node property prediction dataset, e.g. `ogbn-mag`.
#[derive(Debug, Clone)]
pub struct HeterogeneousNodeDataset {
    /// Dataset name.
    pub name: String,
    /// The graph.
    pub graph: HeterogeneousGraph,
    /// Class label per node, for the labelled node types.
    pub labels: IndexMap<String, Vec<i64>>,
    /// Train/valid/test split.
    pub split: HeterogeneousNodeSplit,
}

/// Positive and negative edges of one split set.
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    /// Positive edges.
    pub edge: Option<Vec<Edge>>,
    /// Negative edges.
    pub edge_neg: Option<Vec<Edge>>,
}

/// Homogeneous link property prediction dataset, e.g. `ogbl-collab`.
#[derive(Debug, Clone)]
pub struct HomogeneousLinkDataset {
    /// Dataset name.
    pub name: String,
    /// The graph.
    pub graph: HomogeneousGraph,
    /// Split set name (`train`, `valid`, `test`) to its edges.
    pub split: IndexMap<String, EdgeSet>,
}

/// Typed edges of one split set of a heterogeneous link dataset.
///
/// All vectors have one entry per edge; `relation` indexes the graph's
/// `edge_index_dict`.
#[derive(Debug, Clone, Default)]
pub struct HeterogeneousEdgeSet {
    /// Node type of each head.
    pub head_type: Vec<String>,
    /// Node type of each tail.
    pub tail_type: Vec<String>,
    /// Head node index, local to its type.
    pub head: Vec<i64>,
    /// Tail node index, local to its type.
    pub tail: Vec<i64>,
    /// Position of the relation in `edge_index_dict`.
    pub relation: Vec<usize>,
}

/// Heterogeneous link property prediction dataset, e.g. `ogbl-biokg`.
#[derive(Debug, Clone)]
pub struct HeterogeneousLinkDataset {
    /// Dataset name.
    pub name: String,
    /// The graph.
    pub graph: HeterogeneousGraph,
    /// Split set name to its typed edges.
    pub split: IndexMap<String, HeterogeneousEdgeSet>,
}

/// Any node property prediction dataset.
#[derive(Debug, Clone)]
pub enum NodeDataset {
    /// Single node and relationship type.
    Homogeneous(HomogeneousNodeDataset),
    /// Typed nodes and relations.
    Heterogeneous(HeterogeneousNodeDataset),
}

impl NodeDataset {
    /// Dataset name, e.g. `ogbn-arxiv`.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Homogeneous(d) => &d.name,
            Self::Heterogeneous(d) => &d.name,
        }
    }
}

impl From<HomogeneousNodeDataset> for NodeDataset {
    fn from(dataset: HomogeneousNodeDataset) -> Self {
        Self::Homogeneous(dataset)
    }
}

impl From<HeterogeneousNodeDataset> for NodeDataset {
    fn from(dataset: HeterogeneousNodeDataset) -> Self {
        Self::Heterogeneous(dataset)
    }
}

/// Any link property prediction dataset.
#[derive(Debug, Clone)]
pub enum LinkDataset {
    /// Single node and relationship type.
    Homogeneous(HomogeneousLinkDataset),
    /// Typed nodes and relations.
    Heterogeneous(HeterogeneousLinkDataset),
}

impl LinkDataset {
    /// Dataset name, e.g. `ogbl-collab`.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Homogeneous(d) => &d.name,
            Self::Heterogeneous(d) => &d.name,
        }
    }
}

impl From<HomogeneousLinkDataset> for LinkDataset {
    fn from(dataset: HomogeneousLinkDataset) -> Self {
        Self::Homogeneous(dataset)
    }
}

impl From<HeterogeneousLinkDataset> for LinkDataset {
    fn from(dataset: HeterogeneousLinkDataset) -> Self {
        Self::Heterogeneous(dataset)
    }
}
