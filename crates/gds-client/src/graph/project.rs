//! Native and Cypher projections.

use serde_json::Value;

use super::{Graph, GraphCreateResult};
use crate::call::{config_map, CallParameters};
use crate::error::Result;
use crate::frame::Row;
use crate::namespace::EndpointContext;

/// `gds.graph.project`.
#[derive(Debug, Clone)]
pub struct GraphProjectRunner {
    ctx: EndpointContext,
}

impl GraphProjectRunner {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    fn created(&self, graph_name: &str, result: Row) -> GraphCreateResult {
        GraphCreateResult {
            graph: Graph::new(graph_name, self.ctx.runner().clone()),
            result,
        }
    }

    /// Projects a graph with native node and relationship projections.
    ///
    /// `node_spec` and `relationship_spec` are passed through as given: a
    /// label string, a list of labels or a projection map.
    pub async fn call(
        &self,
        graph_name: &str,
        node_spec: Value,
        relationship_spec: Value,
        config: Value,
    ) -> Result<GraphCreateResult> {
        let params = CallParameters::new()
            .with("graph_name", graph_name)
            .with("node_spec", node_spec)
            .with("relationship_spec", relationship_spec)
            .with("config", config_map(config)?);
        let result = self
            .ctx
            .call_logged(self.ctx.namespace(), params)
            .await?
            .squeeze_row()?;
        Ok(self.created(graph_name, result))
    }

    /// Estimates the memory a native projection would need.
    pub async fn estimate(
        &self,
        node_spec: Value,
        relationship_spec: Value,
        config: Value,
    ) -> Result<Row> {
        let params = CallParameters::new()
            .with("node_spec", node_spec)
            .with("relationship_spec", relationship_spec)
            .with("config", config_map(config)?);
        self.ctx
            .call(&self.ctx.endpoint("estimate"), params)
            .await?
            .squeeze_row()
    }

    /// Legacy Cypher projection (`gds.graph.project.cypher`).
    #[must_use]
    pub fn cypher(&self) -> GraphCypherRunner {
        GraphCypherRunner::new(self.ctx.child("cypher"))
    }

    /// Projects a subgraph of `from_graph` using node and relationship filters.
    pub async fn subgraph(
        &self,
        graph_name: &str,
        from_graph: &Graph,
        node_filter: &str,
        relationship_filter: &str,
        config: Value,
    ) -> Result<GraphCreateResult> {
        let params = CallParameters::new()
            .with("graph_name", graph_name)
            .with("from_graph_name", from_graph.name())
            .with("node_filter", node_filter)
            .with("relationship_filter", relationship_filter)
            .with("config", config_map(config)?);
        let result = self
            .ctx
            .call_logged(&self.ctx.endpoint("subgraph"), params)
            .await?
            .squeeze_row()?;
        Ok(self.created(graph_name, result))
    }
}

/// `gds.graph.project.cypher`.
#[derive(Debug, Clone)]
pub struct GraphCypherRunner {
    ctx: EndpointContext,
}

impl GraphCypherRunner {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    /// Projects a graph from a node query and a relationship query.
    pub async fn call(
        &self,
        graph_name: &str,
        node_query: &str,
        relationship_query: &str,
        config: Value,
    ) -> Result<GraphCreateResult> {
        let params = CallParameters::new()
            .with("graph_name", graph_name)
            .with("node_query", node_query)
            .with("relationship_query", relationship_query)
            .with("config", config_map(config)?);
        let result = self
            .ctx
            .call_logged(self.ctx.namespace(), params)
            .await?
            .squeeze_row()?;
        Ok(GraphCreateResult {
            graph: Graph::new(graph_name, self.ctx.runner().clone()),
            result,
        })
    }

    /// Estimates the memory a Cypher projection would need.
    pub async fn estimate(
        &self,
        node_query: &str,
        relationship_query: &str,
        config: Value,
    ) -> Result<Row> {
        let params = CallParameters::new()
            .with("node_query", node_query)
            .with("relationship_query", relationship_query)
            .with("config", config_map(config)?);
        self.ctx
            .call(&self.ctx.endpoint("estimate"), params)
            .await?
            .squeeze_row()
    }
}
