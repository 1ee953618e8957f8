//! Generic runner for algorithm procedures.
//!
//! Algorithms share one calling convention, `CALL <proc>($graph_name,
//! $config)`, so a single runner covers all of them. The procedure name is
//! built from namespace segments:
//!
//! ```no_run
//! # async fn demo(gds: &gds_client::GraphDataScience, g: &gds_client::Graph) -> gds_client::Result<()> {
//! let ranks = gds.endpoint("pageRank").stream(g, serde_json::json!({"maxIterations": 20})).await?;
//! let estimate = gds.endpoint("pageRank.write").estimate(g, serde_json::json!({"writeProperty": "pr"})).await?;
//! # Ok(())
//! # }
//! ```

use serde_json::Value;

use crate::call::{config_map, CallParameters};
use crate::error::Result;
use crate::frame::{DataFrame, Row};
use crate::graph::Graph;
use crate::namespace::EndpointContext;

/// Runner for an arbitrary algorithm procedure.
#[derive(Debug, Clone)]
pub struct AlgoProcRunner {
    ctx: EndpointContext,
}

impl AlgoProcRunner {
    /// Runner for the procedure named by `ctx`'s namespace.
    #[must_use]
    pub fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    /// Fully qualified procedure name.
    #[must_use]
    pub fn proc_name(&self) -> &str {
        self.ctx.namespace()
    }

    /// Runner for a nested procedure, e.g. `.child("stream")`.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        Self::new(self.ctx.child(segment))
    }

    fn params(graph: &Graph, config: Value) -> Result<CallParameters> {
        Ok(CallParameters::new()
            .with("graph_name", graph.name())
            .with("config", config_map(config)?))
    }

    /// Calls the procedure on `graph`.
    pub async fn call(&self, graph: &Graph, config: Value) -> Result<DataFrame> {
        self.ctx
            .call_logged(self.ctx.namespace(), Self::params(graph, config)?)
            .await
    }

    /// Calls `<proc>.estimate` on `graph`.
    pub async fn estimate(&self, graph: &Graph, config: Value) -> Result<Row> {
        self.ctx
            .call(&self.ctx.endpoint("estimate"), Self::params(graph, config)?)
            .await?
            .squeeze_row()
    }

    /// Calls `<proc>.stream`.
    pub async fn stream(&self, graph: &Graph, config: Value) -> Result<DataFrame> {
        self.child("stream").call(graph, config).await
    }

    /// Calls `<proc>.mutate`.
    pub async fn mutate(&self, graph: &Graph, config: Value) -> Result<Row> {
        self.child("mutate").call(graph, config).await?.squeeze_row()
    }

    /// Calls `<proc>.write`.
    pub async fn write(&self, graph: &Graph, config: Value) -> Result<Row> {
        self.child("write").call(graph, config).await?.squeeze_row()
    }

    /// Calls `<proc>.stats`.
    pub async fn stats(&self, graph: &Graph, config: Value) -> Result<Row> {
        self.child("stats").call(graph, config).await?.squeeze_row()
    }
}
