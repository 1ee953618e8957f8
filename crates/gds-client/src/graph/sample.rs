//! Graph sampling endpoints.

use serde_json::Value;

use super::{Graph, GraphCreateResult};
use crate::call::{config_map, CallParameters};
use crate::error::Result;
use crate::frame::Row;
use crate::namespace::EndpointContext;

/// `gds.graph.sample` (and `gds.alpha.graph.sample`).
#[derive(Debug, Clone)]
pub struct GraphSampleRunner {
    ctx: EndpointContext,
}

impl GraphSampleRunner {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    async fn sample(
        &self,
        endpoint: &str,
        graph_name: &str,
        from_graph: &Graph,
        config: Value,
    ) -> Result<GraphCreateResult> {
        let params = CallParameters::new()
            .with("graph_name", graph_name)
            .with("from_graph_name", from_graph.name())
            .with("config", config_map(config)?);
        let result = self.ctx.call_logged(endpoint, params).await?.squeeze_row()?;

        Ok(GraphCreateResult {
            graph: Graph::new(graph_name, self.ctx.runner().clone()),
            result,
        })
    }

    /// Samples `from_graph` with random walks with restarts.
    pub async fn rwr(
        &self,
        graph_name: &str,
        from_graph: &Graph,
        config: Value,
    ) -> Result<GraphCreateResult> {
        let endpoint = self.ctx.endpoint("rwr");
        self.ctx.require_since(&endpoint, 2, 2, 0)?;
        self.sample(&endpoint, graph_name, from_graph, config).await
    }

    /// Samples `from_graph` with common-neighbour-aware random walks.
    pub async fn cnarw(
        &self,
        graph_name: &str,
        from_graph: &Graph,
        config: Value,
    ) -> Result<GraphCreateResult> {
        let endpoint = self.ctx.endpoint("cnarw");
        self.ctx.require_since(&endpoint, 2, 4, 0)?;
        self.sample(&endpoint, graph_name, from_graph, config).await
    }

    /// Estimates the memory a CNARW sample of `from_graph` would need.
    pub async fn cnarw_estimate(&self, from_graph: &Graph, config: Value) -> Result<Row> {
        let endpoint = format!("{}.estimate", self.ctx.endpoint("cnarw"));
        self.ctx.require_since(&endpoint, 2, 4, 0)?;

        let params = CallParameters::new()
            .with("from_graph_name", from_graph.name())
            .with("config", config_map(config)?);
        self.ctx.call(&endpoint, params).await?.squeeze_row()
    }
}
