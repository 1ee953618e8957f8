//! Query runner for the Neo4j HTTP Query API.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::graph_constructor::{CypherGraphConstructor, GraphConstructor};
use super::progress::{ensure_job_id, with_progress_logging};
use super::{map_server_error, QueryRunner};
use crate::call::CallParameters;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::frame::DataFrame;
use crate::server_version::ServerVersion;

/// Database used when neither the config nor the caller names one.
pub const DEFAULT_DATABASE: &str = "neo4j";

/// Runs statements through `POST {uri}/db/{database}/query/v2`.
///
/// Cloning is cheap: clones share the HTTP connection pool and the current
/// database selection.
#[derive(Clone)]
pub struct HttpQueryRunner {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
    database: Arc<RwLock<Option<String>>>,
    server_version: ServerVersion,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    statement: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    data: Option<QueryData>,
    #[serde(default)]
    errors: Vec<ServerError>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    fields: Vec<String>,
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ServerError {
    code: String,
    message: String,
}

impl HttpQueryRunner {
    /// Connects to the server and detects its GDS version.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let mut runner = Self {
            client,
            database: Arc::new(RwLock::new(config.database.clone())),
            config: Arc::new(config),
            server_version: ServerVersion::new(0, 0, 0),
        };

        runner.server_version = runner.detect_server_version().await?;
        info!(
            uri = %runner.config.uri,
            gds_version = %runner.server_version,
            "Connected to GDS server"
        );

        Ok(runner)
    }

    /// Creates a runner for a server whose GDS version is already known.
    pub fn with_server_version(config: ClientConfig, server_version: ServerVersion) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            database: Arc::new(RwLock::new(config.database.clone())),
            config: Arc::new(config),
            server_version,
        })
    }

    /// The configuration this runner was created with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn detect_server_version(&self) -> Result<ServerVersion> {
        let raw = match self
            .run_cypher("RETURN gds.version() AS version", None, None)
            .await
        {
            Ok(frame) => frame.scalar()?,
            Err(Error::Query { .. }) => {
                // Older servers only expose the version through sysInfo.
                self.run_cypher(
                    "CALL gds.debug.sysInfo() YIELD key, value WHERE key = 'gdsVersion' RETURN value",
                    None,
                    None,
                )
                .await
                .map_err(|e| {
                    Error::Connection(format!(
                        "unable to detect the GDS version, is the plugin installed? ({e})"
                    ))
                })?
                .scalar()?
            }
            Err(e) => return Err(e),
        };

        let version = raw.as_str().ok_or_else(|| {
            Error::UnexpectedResult(format!("GDS version is not a string: {raw}"))
        })?;
        ServerVersion::parse(version)
    }

    fn query_url(&self, database: &str) -> String {
        format!(
            "{}/db/{}/query/v2",
            self.config.uri.trim_end_matches('/'),
            database
        )
    }
}

#[async_trait]
impl QueryRunner for HttpQueryRunner {
    async fn run_cypher(
        &self,
        query: &str,
        params: Option<CallParameters>,
        database: Option<&str>,
    ) -> Result<DataFrame> {
        let database = database
            .map(String::from)
            .or_else(|| self.database())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        debug!(database = %database, "Running statement: {query}");

        let body = QueryRequest {
            statement: query,
            parameters: params.map(|p| p.to_json()),
        };

        let resp = self
            .client
            .post(self.query_url(&database))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication(format!(
                "server rejected credentials for user '{}'",
                self.config.username
            )));
        }

        let text = resp.text().await?;
        let parsed: QueryResponse = serde_json::from_str(&text).map_err(|_| {
            Error::Connection(format!("unexpected response ({status}): {text}"))
        })?;

        if let Some(err) = parsed.errors.first() {
            return Err(map_server_error(&err.code, &err.message));
        }

        let data = parsed.data.ok_or_else(|| {
            Error::UnexpectedResult(format!("response without data ({status})"))
        })?;

        DataFrame::new(data.fields, data.values)
    }

    async fn call_procedure(
        &self,
        endpoint: &str,
        mut params: CallParameters,
        yields: &[&str],
        logging: bool,
    ) -> Result<DataFrame> {
        let job_id = if logging {
            ensure_job_id(&mut params)
        } else {
            None
        };

        let query = params.procedure_query(endpoint, yields);
        match job_id {
            Some(job_id) => {
                let call = self.run_cypher(&query, Some(params), None);
                with_progress_logging(
                    self,
                    &job_id,
                    endpoint,
                    self.config.progress_poll_interval(),
                    call,
                )
                .await
            }
            None => self.run_cypher(&query, Some(params), None).await,
        }
    }

    fn server_version(&self) -> ServerVersion {
        self.server_version
    }

    fn database(&self) -> Option<String> {
        self.database.read().clone()
    }

    fn set_database(&self, database: &str) {
        *self.database.write() = Some(database.to_string());
    }

    fn encrypted(&self) -> bool {
        self.config.encrypted()
    }

    fn create_graph_constructor(
        &self,
        graph_name: &str,
        concurrency: usize,
        undirected_relationship_types: Vec<String>,
    ) -> Box<dyn GraphConstructor> {
        Box::new(CypherGraphConstructor::new(
            Arc::new(self.clone()),
            graph_name,
            concurrency,
            undirected_relationship_types,
        ))
    }
}
