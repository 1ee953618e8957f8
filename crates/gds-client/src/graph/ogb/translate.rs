//! Translation of OGB datasets into node and relationship frames.

use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{
    Edge, EdgeTriple, Features, HeterogeneousGraph, HeterogeneousLinkDataset,
    HeterogeneousNodeDataset, HomogeneousLinkDataset, HomogeneousNodeDataset, LinkDataset,
    NodeDataset,
};
use crate::error::{Error, Result};
use crate::frame::DataFrame;

/// Node and relationship frames ready for a graph constructor.
#[derive(Debug, Clone, Default)]
pub struct GraphFrames {
    /// Node frames, each with a `nodeId` column.
    pub nodes: Vec<DataFrame>,
    /// Relationship frames, each with `sourceNodeId` and `targetNodeId`.
    pub relationships: Vec<DataFrame>,
}

impl NodeDataset {
    /// Translates the dataset into node and relationship frames.
    pub fn to_frames(&self) -> Result<GraphFrames> {
        match self {
            Self::Homogeneous(d) => homogeneous_node_frames(d),
            Self::Heterogeneous(d) => heterogeneous_node_frames(d),
        }
    }
}

impl LinkDataset {
    /// Translates the dataset into node and relationship frames.
    pub fn to_frames(&self) -> Result<GraphFrames> {
        match self {
            Self::Homogeneous(d) => homogeneous_link_frames(d),
            Self::Heterogeneous(d) => heterogeneous_link_frames(d),
        }
    }
}

fn index(n: usize) -> Result<i64> {
    i64::try_from(n).map_err(|_| Error::Dataset(format!("node index {n} does not fit into i64")))
}

fn warn_edge_features(dataset: &str, present: bool) {
    if present {
        warn!("Edge features of {} are not supported and will not be loaded", dataset);
    }
}

fn features_column(dataset: &str, features: &Features, node_count: usize) -> Result<Vec<Value>> {
    if features.len() != node_count {
        return Err(Error::Dataset(format!(
            "{dataset}: {} feature rows for {node_count} nodes",
            features.len()
        )));
    }
    Ok(features.iter().map(|row| Value::from(row.clone())).collect())
}

fn node_ids(offset: usize, count: usize) -> Result<Vec<Value>> {
    (offset..offset + count)
        .map(|id| index(id).map(Value::from))
        .collect()
}

fn relationship_frame(rows: Vec<(i64, i64, Value)>) -> Result<DataFrame> {
    let mut sources = Vec::with_capacity(rows.len());
    let mut targets = Vec::with_capacity(rows.len());
    let mut types = Vec::with_capacity(rows.len());
    for (source, target, rel_type) in rows {
        sources.push(Value::from(source));
        targets.push(Value::from(target));
        types.push(rel_type);
    }

    DataFrame::from_columns(vec![
        ("sourceNodeId", sources),
        ("targetNodeId", targets),
        ("relationshipType", types),
    ])
}

fn homogeneous_node_frames(dataset: &HomogeneousNodeDataset) -> Result<GraphFrames> {
    let name = dataset.name.as_str();
    let graph = &dataset.graph;
    warn_edge_features(name, graph.edge_feat.is_some());

    info!("Preparing node data of {} for transfer to server", name);
    let node_count = graph.num_nodes;
    if dataset.labels.len() != node_count {
        return Err(Error::Dataset(format!(
            "{name}: {} class labels for {node_count} nodes",
            dataset.labels.len()
        )));
    }

    let mut split_labels = vec!["Train"; node_count];
    for (set, label) in [(&dataset.split.valid, "Valid"), (&dataset.split.test, "Test")] {
        for &node in set {
            *split_labels.get_mut(node).ok_or_else(|| {
                Error::Dataset(format!("{name}: split node {node} is out of range"))
            })? = label;
        }
    }

    let mut columns = vec![("nodeId", node_ids(0, node_count)?)];
    if let Some(features) = &graph.node_feat {
        columns.push(("features", features_column(name, features, node_count)?));
    }
    columns.push(("classLabel", dataset.labels.iter().map(|&l| Value::from(l)).collect()));
    columns.push(("labels", split_labels.into_iter().map(Value::from).collect()));
    let nodes = DataFrame::from_columns(columns)?;

    info!("Preparing relationship data of {} for transfer to server", name);
    let rels = relationship_frame(
        graph
            .edge_index
            .iter()
            .map(|&(s, t)| (s, t, json!("R")))
            .collect(),
    )?;

    Ok(GraphFrames {
        nodes: vec![nodes],
        relationships: vec![rels],
    })
}

/// Node frames of a heterogeneous graph, one per node type, with ids
/// offset so they are unique across types.
fn heterogeneous_nodes(
    name: &str,
    graph: &HeterogeneousGraph,
    mut labels_for: impl FnMut(&str, usize) -> Result<Vec<Value>>,
    class_labels: Option<&IndexMap<String, Vec<i64>>>,
) -> Result<(Vec<DataFrame>, IndexMap<String, i64>)> {
    let mut offsets = IndexMap::new();
    let mut offset = 0;
    let mut frames = Vec::with_capacity(graph.num_nodes_dict.len());

    for (node_type, &count) in &graph.num_nodes_dict {
        let mut columns = vec![
            ("nodeId", node_ids(offset, count)?),
            ("labels", labels_for(node_type, count)?),
        ];
        if let Some(features) = graph.node_feat_dict.get(node_type) {
            columns.push(("features", features_column(name, features, count)?));
        }
        if let Some(class_labels) = class_labels.and_then(|c| c.get(node_type)) {
            if class_labels.len() != count {
                return Err(Error::Dataset(format!(
                    "{name}: {} class labels for {count} '{node_type}' nodes",
                    class_labels.len()
                )));
            }
            columns.push(("classLabel", class_labels.iter().map(|&l| Value::from(l)).collect()));
        }

        offsets.insert(node_type.clone(), index(offset)?);
        offset += count;
        frames.push(DataFrame::from_columns(columns)?);
    }

    Ok((frames, offsets))
}

fn offset_of(name: &str, offsets: &IndexMap<String, i64>, node_type: &str) -> Result<i64> {
    offsets.get(node_type).copied().ok_or_else(|| {
        Error::Dataset(format!("{name}: edges reference unknown node type '{node_type}'"))
    })
}

fn shift(
    edges: &[Edge],
    triple: &EdgeTriple,
    offsets: &IndexMap<String, i64>,
    name: &str,
) -> Result<Vec<(i64, i64, Value)>> {
    let head = offset_of(name, offsets, &triple.head)?;
    let tail = offset_of(name, offsets, &triple.tail)?;
    Ok(edges
        .iter()
        .map(|&(s, t)| (s + head, t + tail, Value::from(triple.relation.as_str())))
        .collect())
}

fn heterogeneous_node_frames(dataset: &HeterogeneousNodeDataset) -> Result<GraphFrames> {
    let name = dataset.name.as_str();
    let graph = &dataset.graph;
    let split = &dataset.split;
    warn_edge_features(name, graph.edge_feat_dict.is_some());

    info!("Preparing node data of {} for transfer to server", name);
    let labels_for = |node_type: &str, count: usize| -> Result<Vec<Value>> {
        if !split.train.contains_key(node_type) {
            return Ok(vec![Value::from(node_type); count]);
        }

        let mut labels = vec![json!([node_type, "Train"]); count];
        for (set, label) in [(&split.valid, "Valid"), (&split.test, "Test")] {
            for &node in set.get(node_type).into_iter().flatten() {
                *labels.get_mut(node).ok_or_else(|| {
                    Error::Dataset(format!(
                        "{name}: split node {node} of type '{node_type}' is out of range"
                    ))
                })? = json!([node_type, label]);
            }
        }
        Ok(labels)
    };
    let (nodes, offsets) = heterogeneous_nodes(name, graph, labels_for, Some(&dataset.labels))?;

    info!("Preparing relationship data of {} for transfer to server", name);
    let relationships = graph
        .edge_index_dict
        .iter()
        .map(|(triple, edges)| relationship_frame(shift(edges, triple, &offsets, name)?))
        .collect::<Result<Vec<_>>>()?;

    Ok(GraphFrames {
        nodes,
        relationships,
    })
}

fn homogeneous_link_frames(dataset: &HomogeneousLinkDataset) -> Result<GraphFrames> {
    let name = dataset.name.as_str();
    let graph = &dataset.graph;
    warn_edge_features(name, graph.edge_feat.is_some());

    info!("Preparing node data of {} for transfer to server", name);
    let node_count = graph.num_nodes;
    let mut columns = vec![
        ("nodeId", node_ids(0, node_count)?),
        ("labels", vec![json!("N"); node_count]),
    ];
    if let Some(features) = &graph.node_feat {
        columns.push(("features", features_column(name, features, node_count)?));
    }
    let nodes = DataFrame::from_columns(columns)?;

    info!("Preparing relationship data of {} for transfer to server", name);
    let mut rows = Vec::new();
    for (set, edges) in &dataset.split {
        let set = set.to_uppercase();
        for (edges, suffix) in [(&edges.edge, "POS"), (&edges.edge_neg, "NEG")] {
            let rel_type = Value::from(format!("{set}_{suffix}"));
            rows.extend(
                edges
                    .iter()
                    .flatten()
                    .map(|&(s, t)| (s, t, rel_type.clone())),
            );
        }
    }

    Ok(GraphFrames {
        nodes: vec![nodes],
        relationships: vec![relationship_frame(rows)?],
    })
}

fn heterogeneous_link_frames(dataset: &HeterogeneousLinkDataset) -> Result<GraphFrames> {
    let name = dataset.name.as_str();
    let graph = &dataset.graph;
    warn_edge_features(name, graph.edge_feat_dict.is_some());

    info!("Preparing node data of {} for transfer to server", name);
    let labels_for = |node_type: &str, count: usize| -> Result<Vec<Value>> {
        Ok(vec![Value::from(node_type); count])
    };
    let (nodes, offsets) = heterogeneous_nodes(name, graph, labels_for, None)?;

    info!("Preparing relationship data of {} for transfer to server", name);
    let relations: Vec<&EdgeTriple> = graph.edge_index_dict.keys().collect();
    let mut frames = Vec::with_capacity(dataset.split.len());

    for (set, edges) in &dataset.split {
        let count = edges.relation.len();
        if [edges.head.len(), edges.tail.len(), edges.head_type.len(), edges.tail_type.len()]
            .iter()
            .any(|&len| len != count)
        {
            return Err(Error::Dataset(format!(
                "{name}: '{set}' split has edge columns of different lengths"
            )));
        }

        let set_suffix = set.to_uppercase();
        let mut sources = Vec::with_capacity(count);
        let mut targets = Vec::with_capacity(count);
        let mut types = Vec::with_capacity(count);
        let mut class_labels = Vec::with_capacity(count);

        for i in 0..count {
            let relation = edges.relation[i];
            let triple = relations.get(relation).ok_or_else(|| {
                Error::Dataset(format!("{name}: unknown relation index {relation}"))
            })?;
            if edges.head_type[i] != triple.head || edges.tail_type[i] != triple.tail {
                return Err(Error::Dataset(format!(
                    "{name}: edge {i} of '{set}' connects {} to {} but relation '{}' connects {} to {}",
                    edges.head_type[i], edges.tail_type[i], triple.relation, triple.head, triple.tail
                )));
            }

            sources.push(Value::from(edges.head[i] + offset_of(name, &offsets, &triple.head)?));
            targets.push(Value::from(edges.tail[i] + offset_of(name, &offsets, &triple.tail)?));
            types.push(Value::from(format!("{}_{set_suffix}", triple.relation)));
            class_labels.push(Value::from(relation));
        }

        frames.push(DataFrame::from_columns(vec![
            ("sourceNodeId", sources),
            ("targetNodeId", targets),
            ("relationshipType", types),
            ("classLabel", class_labels),
        ])?);
    }

    Ok(GraphFrames {
        nodes,
        relationships: frames,
    })
}
