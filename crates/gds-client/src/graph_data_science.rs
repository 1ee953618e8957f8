//! Entry point of the client.
//!
//! [`GraphDataScience`] owns the query runner and exposes the `gds`
//! namespace; [`AlphaEndpoints`] and [`BetaEndpoints`] expose the tiered
//! namespaces of the same server.
//!
//! ```no_run
//! use gds_client::{ClientConfig, GraphDataScience};
//!
//! # async fn demo() -> gds_client::Result<()> {
//! let gds = GraphDataScience::connect(ClientConfig::load()?).await?;
//! let graph = gds.graph().load_karate_club("karate", true).await?;
//! println!("{} nodes", graph.node_count().await?);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::algo::AlgoProcRunner;
use crate::call::CallParameters;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::frame::{DataFrame, Row};
use crate::graph::GraphProcRunner;
use crate::model::{catalog_namespace, GraphSageRunner, ModelProcRunner};
use crate::namespace::EndpointContext;
use crate::query_runner::{HttpQueryRunner, QueryRunner};
use crate::server_version::ServerVersion;
use crate::system::{
    ConfigProcRunner, DebugProcRunner, LicenseProcRunner, SystemAlphaEndpoints,
    SystemBetaEndpoints, SystemEndpoints,
};

/// Root namespace of every GDS procedure.
pub const ROOT_NAMESPACE: &str = "gds";

/// Client for a Graph Data Science server.
#[derive(Debug, Clone)]
pub struct GraphDataScience {
    ctx: EndpointContext,
}

impl GraphDataScience {
    /// Connects over the HTTP Query API.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        info!("Connecting to GDS at {}", config.uri);
        let runner = HttpQueryRunner::connect(config).await?;
        Ok(Self::from_runner(Arc::new(runner)))
    }

    /// Wraps an existing query runner.
    #[must_use]
    pub fn from_runner(runner: Arc<dyn QueryRunner>) -> Self {
        Self {
            ctx: EndpointContext::new(runner, ROOT_NAMESPACE),
        }
    }

    /// The underlying query runner.
    #[must_use]
    pub fn runner(&self) -> &Arc<dyn QueryRunner> {
        self.ctx.runner()
    }

    /// GDS version detected when connecting.
    #[must_use]
    pub fn server_version(&self) -> ServerVersion {
        self.ctx.server_version()
    }

    fn system(&self) -> SystemEndpoints {
        SystemEndpoints::new(self.ctx.clone())
    }

    /// `gds.graph`.
    #[must_use]
    pub fn graph(&self) -> GraphProcRunner {
        GraphProcRunner::new(self.ctx.child("graph"))
    }

    /// The model catalog (`gds.model`, or `gds.beta.model` before 2.5).
    #[must_use]
    pub fn model(&self) -> ModelProcRunner {
        ModelProcRunner::new(EndpointContext::new(
            self.runner().clone(),
            catalog_namespace(self.server_version()),
        ))
    }

    /// Runner for any procedure below `gds`, e.g. `endpoint("pageRank")`.
    #[must_use]
    pub fn endpoint(&self, name: &str) -> AlgoProcRunner {
        AlgoProcRunner::new(self.ctx.child(name))
    }

    /// `gds.alpha`.
    #[must_use]
    pub fn alpha(&self) -> AlphaEndpoints {
        AlphaEndpoints {
            ctx: self.ctx.child("alpha"),
        }
    }

    /// `gds.beta`.
    #[must_use]
    pub fn beta(&self) -> BetaEndpoints {
        BetaEndpoints {
            ctx: self.ctx.child("beta"),
        }
    }

    /// Version string reported by the server's `gds.version()` function.
    pub async fn version(&self) -> Result<String> {
        let value = self
            .run_cypher("RETURN gds.version() AS version", None, None)
            .await?
            .scalar()?;
        match value {
            Value::String(version) => Ok(version),
            other => Err(Error::UnexpectedResult(format!(
                "GDS version is not a string: {other}"
            ))),
        }
    }

    /// Procedures and functions of the installed library, optionally filtered by name.
    pub async fn list(&self, name_filter: Option<&str>) -> Result<DataFrame> {
        let params = match name_filter {
            Some(name) => CallParameters::new().with("name", name),
            None => CallParameters::new(),
        };
        self.ctx.call(&self.ctx.endpoint("list"), params).await
    }

    /// Runs an arbitrary Cypher statement.
    pub async fn run_cypher(
        &self,
        query: &str,
        params: Option<CallParameters>,
        database: Option<&str>,
    ) -> Result<DataFrame> {
        self.runner().run_cypher(query, params, database).await
    }

    /// Current target database.
    #[must_use]
    pub fn database(&self) -> Option<String> {
        self.runner().database()
    }

    /// Switches the target database for subsequent calls.
    pub fn set_database(&self, database: &str) {
        self.runner().set_database(database);
    }

    /// Releases the connection.
    pub async fn close(&self) -> Result<()> {
        self.runner().close().await
    }

    /// Whether the server runs GDS Enterprise.
    pub async fn is_licensed(&self) -> Result<bool> {
        self.system().is_licensed().await
    }

    /// `gds.license`.
    #[must_use]
    pub fn license(&self) -> LicenseProcRunner {
        self.system().license()
    }

    /// `gds.debug`.
    #[must_use]
    pub fn debug(&self) -> DebugProcRunner {
        self.system().debug()
    }

    /// `gds.backup` (2.5+).
    pub async fn backup(&self, config: Value) -> Result<DataFrame> {
        self.system().backup(config).await
    }

    /// `gds.restore` (2.5+).
    pub async fn restore(&self, config: Value) -> Result<DataFrame> {
        self.system().restore(config).await
    }

    /// `gds.listProgress` (2.5+).
    pub async fn list_progress(&self, job_id: Option<&str>) -> Result<DataFrame> {
        self.system().list_progress(job_id).await
    }

    /// `gds.systemMonitor` (2.5+).
    pub async fn system_monitor(&self) -> Result<Row> {
        self.system().system_monitor().await
    }

    /// `gds.userLog` (2.5+).
    pub async fn user_log(&self) -> Result<DataFrame> {
        self.system().user_log().await
    }
}

/// Endpoints of the `gds.alpha` tier.
#[derive(Debug, Clone)]
pub struct AlphaEndpoints {
    ctx: EndpointContext,
}

impl AlphaEndpoints {
    fn system(&self) -> SystemAlphaEndpoints {
        SystemAlphaEndpoints::new(self.ctx.clone())
    }

    /// `gds.alpha.graph`.
    #[must_use]
    pub fn graph(&self) -> GraphProcRunner {
        GraphProcRunner::new(self.ctx.child("graph"))
    }

    /// Runner for any procedure below `gds.alpha`.
    #[must_use]
    pub fn endpoint(&self, name: &str) -> AlgoProcRunner {
        AlgoProcRunner::new(self.ctx.child(name))
    }

    /// `gds.alpha.userLog`.
    pub async fn user_log(&self) -> Result<DataFrame> {
        self.system().user_log().await
    }

    /// `gds.alpha.systemMonitor`.
    pub async fn system_monitor(&self) -> Result<Row> {
        self.system().system_monitor().await
    }

    /// `gds.alpha.backup`.
    pub async fn backup(&self, config: Value) -> Result<DataFrame> {
        self.system().backup(config).await
    }

    /// `gds.alpha.restore`.
    pub async fn restore(&self, config: Value) -> Result<DataFrame> {
        self.system().restore(config).await
    }

    /// `gds.alpha.config`.
    #[must_use]
    pub fn config(&self) -> ConfigProcRunner {
        self.system().config()
    }
}

/// Endpoints of the `gds.beta` tier.
#[derive(Debug, Clone)]
pub struct BetaEndpoints {
    ctx: EndpointContext,
}

impl BetaEndpoints {
    /// `gds.beta.graph`.
    #[must_use]
    pub fn graph(&self) -> GraphProcRunner {
        GraphProcRunner::new(self.ctx.child("graph"))
    }

    /// `gds.beta.graphSage`.
    #[must_use]
    pub fn graph_sage(&self) -> GraphSageRunner {
        GraphSageRunner::new(self.ctx.child("graphSage"))
    }

    /// `gds.beta.model`.
    #[must_use]
    pub fn model(&self) -> ModelProcRunner {
        ModelProcRunner::new(self.ctx.child("model"))
    }

    /// Runner for any procedure below `gds.beta`.
    #[must_use]
    pub fn endpoint(&self, name: &str) -> AlgoProcRunner {
        AlgoProcRunner::new(self.ctx.child(name))
    }

    /// `gds.beta.listProgress`.
    pub async fn list_progress(&self, job_id: Option<&str>) -> Result<DataFrame> {
        SystemBetaEndpoints::new(self.ctx.clone())
            .list_progress(job_id)
            .await
    }
}
