//! Client-side handle for a projected graph.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::call::CallParameters;
use crate::error::{Error, Result};
use crate::frame::Row;
use crate::query_runner::{QueryRunner, DEFAULT_DATABASE};

/// Reference to a graph that lives in the server's graph catalog.
///
/// The handle only stores the graph name and how to reach the server; every
/// accessor asks the catalog, so the values are always current.
#[derive(Clone)]
pub struct Graph {
    name: String,
    runner: Arc<dyn QueryRunner>,
}

/// A freshly created graph together with the creating procedure's result row.
#[derive(Debug, Clone)]
pub struct GraphCreateResult {
    /// Handle for the new graph.
    pub graph: Graph,
    /// Result row of the creating procedure.
    pub result: Row,
}

impl Graph {
    /// Creates a handle for `name`.
    #[must_use]
    pub fn new(name: &str, runner: Arc<dyn QueryRunner>) -> Self {
        Self {
            name: name.to_string(),
            runner,
        }
    }

    /// Graph name in the catalog.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Database the graph was projected from.
    pub async fn database(&self) -> Result<String> {
        self.info_string("database").await
    }

    async fn info_with(&self, yields: &[&str]) -> Result<Option<Row>> {
        let frame = self
            .runner
            .call_procedure(
                "gds.graph.list",
                CallParameters::new().with("graph_name", self.name.as_str()),
                yields,
                false,
            )
            .await?;
        Ok(frame.row(0))
    }

    fn not_found(&self) -> Error {
        Error::GraphNotFound {
            graph_name: self.name.clone(),
            database: self
                .runner
                .database()
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        }
    }

    /// The graph's catalog entry.
    pub async fn info(&self) -> Result<Row> {
        self.info_with(&[]).await?.ok_or_else(|| self.not_found())
    }

    async fn info_field(&self, field: &str) -> Result<Value> {
        let mut row = self
            .info_with(&[field])
            .await?
            .ok_or_else(|| self.not_found())?;
        row.swap_remove(field).ok_or_else(|| {
            Error::UnexpectedResult(format!("catalog entry has no '{field}' field"))
        })
    }

    async fn info_u64(&self, field: &str) -> Result<u64> {
        let value = self.info_field(field).await?;
        value.as_u64().ok_or_else(|| {
            Error::UnexpectedResult(format!("'{field}' is not a count: {value}"))
        })
    }

    async fn info_string(&self, field: &str) -> Result<String> {
        match self.info_field(field).await? {
            Value::String(s) => Ok(s),
            other => Err(Error::UnexpectedResult(format!(
                "'{field}' is not a string: {other}"
            ))),
        }
    }

    /// Number of nodes.
    pub async fn node_count(&self) -> Result<u64> {
        self.info_u64("nodeCount").await
    }

    /// Number of relationships.
    pub async fn relationship_count(&self) -> Result<u64> {
        self.info_u64("relationshipCount").await
    }

    /// Size of the graph in bytes.
    pub async fn size_in_bytes(&self) -> Result<u64> {
        self.info_u64("sizeInBytes").await
    }

    /// Human readable memory usage, e.g. `"1234 KiB"`.
    pub async fn memory_usage(&self) -> Result<String> {
        self.info_string("memoryUsage").await
    }

    /// Relationship density.
    pub async fn density(&self) -> Result<f64> {
        let value = self.info_field("density").await?;
        value
            .as_f64()
            .ok_or_else(|| Error::UnexpectedResult(format!("'density' is not a number: {value}")))
    }

    /// Configuration the graph was created with.
    pub async fn configuration(&self) -> Result<Value> {
        self.info_field("configuration").await
    }

    /// Creation timestamp as reported by the server.
    pub async fn creation_time(&self) -> Result<Value> {
        self.info_field("creationTime").await
    }

    /// Last modification timestamp as reported by the server.
    pub async fn modification_time(&self) -> Result<Value> {
        self.info_field("modificationTime").await
    }

    async fn schema(&self) -> Result<Value> {
        self.info_field("schema").await
    }

    /// Node labels in the graph schema, sorted.
    pub async fn node_labels(&self) -> Result<Vec<String>> {
        let schema = self.schema().await?;
        Ok(object_keys(&schema["nodes"]))
    }

    /// Relationship types in the graph schema, sorted.
    pub async fn relationship_types(&self) -> Result<Vec<String>> {
        let schema = self.schema().await?;
        Ok(object_keys(&schema["relationships"]))
    }

    /// Node property keys, for one label or across all labels.
    pub async fn node_properties(&self, label: Option<&str>) -> Result<Vec<String>> {
        let schema = self.schema().await?;
        let nodes = &schema["nodes"];

        let mut keys: Vec<String> = match label {
            Some(label) => {
                let props = nodes.get(label).ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "graph '{}' has no node label '{label}'",
                        self.name
                    ))
                })?;
                object_keys(props)
            }
            None => nodes
                .as_object()
                .map(|labels| labels.values().flat_map(object_keys).collect())
                .unwrap_or_default(),
        };
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    /// Whether the graph still exists in the catalog.
    pub async fn exists(&self) -> Result<bool> {
        let row = self
            .runner
            .call_procedure(
                "gds.graph.exists",
                CallParameters::new().with("graph_name", self.name.as_str()),
                &["exists"],
                false,
            )
            .await?
            .squeeze_row()?;

        row.get("exists")
            .and_then(Value::as_bool)
            .ok_or_else(|| Error::UnexpectedResult("'exists' is not a boolean".to_string()))
    }

    /// Removes the graph from the catalog.
    ///
    /// Returns the dropped graph's catalog entry, or `None` if it did not
    /// exist and `fail_if_missing` is false.
    pub async fn drop(&self, fail_if_missing: bool) -> Result<Option<Row>> {
        let frame = self
            .runner
            .call_procedure(
                "gds.graph.drop",
                CallParameters::new()
                    .with("graph_name", self.name.as_str())
                    .with("fail_if_missing", fail_if_missing),
                &[],
                false,
            )
            .await?;
        frame.squeeze_optional_row()
    }
}

fn object_keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value
        .as_object()
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Graph({})", self.name)
    }
}
