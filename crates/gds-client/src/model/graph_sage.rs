use std::ops::Deref;

use serde_json::Value;

use super::Model;
use crate::call::{config_map, CallParameters};
use crate::error::{Error, Result};
use crate::frame::{DataFrame, Row};
use crate::graph::Graph;
use crate::namespace::EndpointContext;

const PREDICT_NAMESPACE: &str = "gds.beta.graphSage";

/// `gds.beta.graphSage`.
#[derive(Debug, Clone)]
pub struct GraphSageRunner {
    ctx: EndpointContext,
}

impl GraphSageRunner {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    /// Trains a GraphSAGE model on `graph`.
    ///
    /// `config` must contain `modelName`.
    pub async fn train(&self, graph: &Graph, config: Value) -> Result<(GraphSageModel, Row)> {
        let config = config_map(config)?;
        let model_name = config
            .get("modelName")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::InvalidArgument("the training configuration needs a 'modelName'".to_string())
            })?
            .to_string();

        let params = CallParameters::new()
            .with("graph_name", graph.name())
            .with("config", config);
        let result = self
            .ctx
            .call_logged(&self.ctx.endpoint("train"), params)
            .await?
            .squeeze_row()?;

        let model = GraphSageModel {
            model: Model::new(&model_name, self.ctx.runner().clone()),
        };
        Ok((model, result))
    }
}

/// A trained GraphSAGE model.
#[derive(Debug, Clone)]
pub struct GraphSageModel {
    model: Model,
}

impl GraphSageModel {
    fn params(&self, graph: &Graph, config: Value) -> Result<CallParameters> {
        let mut config = config_map(config)?;
        config.insert("modelName".to_string(), Value::from(self.model.name()));
        Ok(CallParameters::new()
            .with("graph_name", graph.name())
            .with("config", config))
    }

    async fn predict(&self, mode: &str, graph: &Graph, config: Value) -> Result<DataFrame> {
        self.model
            .runner()
            .call_procedure(
                &format!("{PREDICT_NAMESPACE}.{mode}"),
                self.params(graph, config)?,
                &[],
                true,
            )
            .await
    }

    /// Streams embeddings for the nodes of `graph`.
    pub async fn predict_stream(&self, graph: &Graph, config: Value) -> Result<DataFrame> {
        self.predict("stream", graph, config).await
    }

    /// Writes embeddings to the database.
    pub async fn predict_write(&self, graph: &Graph, config: Value) -> Result<Row> {
        self.predict("write", graph, config).await?.squeeze_row()
    }

    /// Adds embeddings to the in-memory graph.
    pub async fn predict_mutate(&self, graph: &Graph, config: Value) -> Result<Row> {
        self.predict("mutate", graph, config).await?.squeeze_row()
    }
}

impl Deref for GraphSageModel {
    type Target = Model;

    fn deref(&self) -> &Model {
        &self.model
    }
}
