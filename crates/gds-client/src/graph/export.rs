//! Graph export endpoints.

use serde_json::Value;

use super::Graph;
use crate::call::{config_map, CallParameters};
use crate::error::Result;
use crate::frame::Row;
use crate::namespace::EndpointContext;

/// `gds.graph.export`: writes an in-memory graph to a new database or to CSV.
#[derive(Debug, Clone)]
pub struct GraphExportRunner {
    ctx: EndpointContext,
}

impl GraphExportRunner {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    fn params(graph: &Graph, config: Value) -> Result<CallParameters> {
        Ok(CallParameters::new()
            .with("graph_name", graph.name())
            .with("config", config_map(config)?))
    }

    /// Exports `graph` into a new database (`config.dbName`).
    pub async fn call(&self, graph: &Graph, config: Value) -> Result<Row> {
        self.ctx
            .call_logged(self.ctx.namespace(), Self::params(graph, config)?)
            .await?
            .squeeze_row()
    }

    /// Exports `graph` to CSV files (`config.exportName`).
    pub async fn csv(&self, graph: &Graph, config: Value) -> Result<Row> {
        self.ctx
            .call_logged(&self.ctx.endpoint("csv"), Self::params(graph, config)?)
            .await?
            .squeeze_row()
    }

    /// Estimates the disk space a CSV export of `graph` would use.
    pub async fn csv_estimate(&self, graph: &Graph, config: Value) -> Result<Row> {
        self.ctx
            .call(
                &self.ctx.endpoint("csv.estimate"),
                Self::params(graph, config)?,
            )
            .await?
            .squeeze_row()
    }
}
