//! Routing between a GDS session and the Aura database it serves.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::graph_constructor::GraphConstructor;
use super::QueryRunner;
use crate::call::CallParameters;
use crate::error::{Error, Result};
use crate::frame::DataFrame;
use crate::server_version::ServerVersion;

/// Procedure that projects a database graph into a remote session.
pub const REMOTE_PROJECTION_PROC: &str = "gds.arrow.project";

/// Sends Cypher to the database and GDS procedures to the session.
///
/// Remote projections run on the database, which pushes the data to the
/// session's Arrow endpoint; the session's listen address is attached to the
/// call as `arrowConfiguration`.
pub struct SessionQueryRunner {
    gds: Arc<dyn QueryRunner>,
    db: Arc<dyn QueryRunner>,
}

impl SessionQueryRunner {
    /// Creates a router over a session runner and a database runner.
    #[must_use]
    pub fn new(gds: Arc<dyn QueryRunner>, db: Arc<dyn QueryRunner>) -> Self {
        Self { gds, db }
    }

    async fn arrow_configuration(&self) -> Result<Value> {
        let info = self
            .gds
            .call_procedure("gds.debug.arrow", CallParameters::new(), &[], false)
            .await?
            .squeeze_row()?;

        let address = ["advertisedListenAddress", "listenAddress"]
            .iter()
            .find_map(|key| info.get(*key).and_then(Value::as_str))
            .ok_or_else(|| {
                Error::UnexpectedResult("session does not report an Arrow listen address".to_string())
            })?;

        let (host, port) = address.rsplit_once(':').ok_or_else(|| {
            Error::UnexpectedResult(format!("malformed Arrow listen address '{address}'"))
        })?;
        let port: u16 = port.parse().map_err(|_| {
            Error::UnexpectedResult(format!("malformed Arrow port in '{address}'"))
        })?;

        Ok(json!({
            "host": host,
            "port": port,
            "encrypted": self.gds.encrypted(),
        }))
    }

    /// Returns `true` if `graph_name` was projected from a remote database.
    pub async fn is_remote_projected_graph(&self, graph_name: &str) -> Result<bool> {
        let location = self
            .gds
            .call_procedure(
                "gds.graph.list",
                CallParameters::new().with("graph_name", graph_name),
                &["databaseLocation"],
                false,
            )
            .await?;

        Ok(location
            .column("databaseLocation")
            .and_then(|c| c.first().and_then(|v| v.as_str()).map(|s| s == "remote"))
            .unwrap_or(false))
    }
}

#[async_trait]
impl QueryRunner for SessionQueryRunner {
    async fn run_cypher(
        &self,
        query: &str,
        params: Option<CallParameters>,
        database: Option<&str>,
    ) -> Result<DataFrame> {
        self.db.run_cypher(query, params, database).await
    }

    async fn call_procedure(
        &self,
        endpoint: &str,
        mut params: CallParameters,
        yields: &[&str],
        logging: bool,
    ) -> Result<DataFrame> {
        if endpoint == REMOTE_PROJECTION_PROC {
            let arrow = self.arrow_configuration().await?;
            params.insert("arrowConfiguration", arrow);
            debug!(endpoint, "Routing remote projection to the database");
            return self.db.call_procedure(endpoint, params, yields, logging).await;
        }

        if endpoint.contains(".write") {
            if let Some(graph_name) = params.get("graph_name").and_then(Value::as_str) {
                if self.is_remote_projected_graph(graph_name).await? {
                    return Err(Error::Unsupported(format!(
                        "'{endpoint}' cannot write back to the database from the remote graph '{graph_name}'"
                    )));
                }
            }
        }

        self.gds.call_procedure(endpoint, params, yields, logging).await
    }

    fn server_version(&self) -> ServerVersion {
        self.gds.server_version()
    }

    fn database(&self) -> Option<String> {
        self.db.database()
    }

    fn set_database(&self, database: &str) {
        self.db.set_database(database);
    }

    fn encrypted(&self) -> bool {
        self.db.encrypted()
    }

    fn create_graph_constructor(
        &self,
        graph_name: &str,
        concurrency: usize,
        undirected_relationship_types: Vec<String>,
    ) -> Box<dyn GraphConstructor> {
        self.gds
            .create_graph_constructor(graph_name, concurrency, undirected_relationship_types)
    }

    async fn close(&self) -> Result<()> {
        self.gds.close().await?;
        self.db.close().await
    }
}
