//! Building in-memory graphs from client-side frames.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::info;

use super::QueryRunner;
use crate::call::CallParameters;
use crate::error::{Error, Result};
use crate::frame::{DataFrame, Row};
use crate::server_version::ServerVersion;

/// Column holding node ids in node frames.
pub const NODE_ID: &str = "nodeId";
/// Column holding node labels (a string or a list of strings).
pub const LABELS: &str = "labels";
/// Column holding relationship source ids.
pub const SOURCE_NODE_ID: &str = "sourceNodeId";
/// Column holding relationship target ids.
pub const TARGET_NODE_ID: &str = "targetNodeId";
/// Column holding relationship types.
pub const RELATIONSHIP_TYPE: &str = "relationshipType";

/// Sends node and relationship frames to the server as a new graph.
#[async_trait]
pub trait GraphConstructor: Send + Sync {
    /// Builds the graph from the given frames.
    async fn run(&self, nodes: &[DataFrame], relationships: &[DataFrame]) -> Result<()>;
}

/// Constructs graphs with a single Cypher aggregation over the frame rows.
pub struct CypherGraphConstructor {
    runner: Arc<dyn QueryRunner>,
    graph_name: String,
    concurrency: usize,
    undirected_relationship_types: Vec<String>,
}

impl CypherGraphConstructor {
    /// Creates a constructor for `graph_name` running on `runner`.
    #[must_use]
    pub fn new(
        runner: Arc<dyn QueryRunner>,
        graph_name: &str,
        concurrency: usize,
        undirected_relationship_types: Vec<String>,
    ) -> Self {
        Self {
            runner,
            graph_name: graph_name.to_string(),
            concurrency,
            undirected_relationship_types,
        }
    }

    fn projection_function(&self) -> &'static str {
        // The aggregation left alpha in GDS 2.4.
        if self.runner.server_version() >= ServerVersion::new(2, 4, 0) {
            "gds.graph.project"
        } else {
            "gds.alpha.graph.project"
        }
    }

    /// The aggregation statement for the current server version.
    #[must_use]
    pub fn query(&self) -> String {
        format!(
            "UNWIND $data AS data \
             WITH data[0] AS sourceNodeId, data[1] AS sourceNodeLabels, data[2] AS sourceNodeProperties, \
             data[3] AS targetNodeId, data[4] AS relationshipType, data[5] AS relationshipProperties \
             RETURN {}($graph_name, sourceNodeId, targetNodeId, {{\
             sourceNodeLabels: sourceNodeLabels, \
             sourceNodeProperties: sourceNodeProperties, \
             relationshipType: relationshipType, \
             relationshipProperties: relationshipProperties\
             }}, $configuration) AS result",
            self.projection_function()
        )
    }
}

#[async_trait]
impl GraphConstructor for CypherGraphConstructor {
    async fn run(&self, nodes: &[DataFrame], relationships: &[DataFrame]) -> Result<()> {
        let mut data = Vec::new();
        for frame in nodes {
            data.extend(node_rows(frame)?);
        }
        for frame in relationships {
            data.extend(relationship_rows(frame)?);
        }

        info!(
            graph_name = %self.graph_name,
            rows = data.len(),
            "Constructing graph from client-side frames"
        );

        let mut configuration = json!({ "readConcurrency": self.concurrency });
        // Servers before 2.3 reject the key even when it is empty.
        if !self.undirected_relationship_types.is_empty() {
            configuration["undirectedRelationshipTypes"] = json!(self.undirected_relationship_types);
        }

        let params = CallParameters::new()
            .with("data", Value::Array(data))
            .with("graph_name", self.graph_name.as_str())
            .with("configuration", configuration);

        self.runner
            .run_cypher(&self.query(), Some(params), None)
            .await?;
        Ok(())
    }
}

fn node_rows(frame: &DataFrame) -> Result<Vec<Value>> {
    if !frame.has_column(NODE_ID) {
        return Err(Error::InvalidArgument(format!(
            "node frame needs a '{NODE_ID}' column"
        )));
    }

    Ok(frame
        .rows()
        .map(|mut row| {
            let id = row.swap_remove(NODE_ID).unwrap_or(Value::Null);
            let labels = match row.swap_remove(LABELS) {
                Some(Value::String(label)) => json!([label]),
                Some(Value::Null) | None => Value::Null,
                Some(other) => other,
            };
            json!([id, labels, properties(row), null, null, null])
        })
        .collect())
}

fn relationship_rows(frame: &DataFrame) -> Result<Vec<Value>> {
    for required in [SOURCE_NODE_ID, TARGET_NODE_ID] {
        if !frame.has_column(required) {
            return Err(Error::InvalidArgument(format!(
                "relationship frame needs a '{required}' column"
            )));
        }
    }

    Ok(frame
        .rows()
        .map(|mut row| {
            let source = row.swap_remove(SOURCE_NODE_ID).unwrap_or(Value::Null);
            let target = row.swap_remove(TARGET_NODE_ID).unwrap_or(Value::Null);
            let rel_type = row.swap_remove(RELATIONSHIP_TYPE).unwrap_or(Value::Null);
            json!([source, null, null, target, rel_type, properties(row)])
        })
        .collect())
}

fn properties(rest: Row) -> Value {
    if rest.is_empty() {
        Value::Null
    } else {
        Value::Object(rest.into_iter().collect::<Map<String, Value>>())
    }
}
