use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::call::CallParameters;
use crate::error::{Error, Result};
use crate::frame::{DataFrame, Row};
use crate::namespace::EndpointContext;
use crate::query_runner::QueryRunner;
use crate::server_version::ServerVersion;

/// Model catalog namespace for the given server version.
pub(crate) fn catalog_namespace(version: ServerVersion) -> &'static str {
    if version >= ServerVersion::new(2, 5, 0) {
        "gds.model"
    } else {
        "gds.beta.model"
    }
}

/// Reference to a model in the server's model catalog.
#[derive(Clone)]
pub struct Model {
    name: String,
    runner: Arc<dyn QueryRunner>,
}

impl Model {
    /// Creates a handle for `name`.
    #[must_use]
    pub fn new(name: &str, runner: Arc<dyn QueryRunner>) -> Self {
        Self {
            name: name.to_string(),
            runner,
        }
    }

    /// Model name in the catalog.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn endpoint(&self, segment: &str) -> String {
        format!(
            "{}.{segment}",
            catalog_namespace(self.runner.server_version())
        )
    }

    pub(crate) fn runner(&self) -> &Arc<dyn QueryRunner> {
        &self.runner
    }

    /// Whether the model is in the catalog.
    pub async fn exists(&self) -> Result<bool> {
        let row = self
            .runner
            .call_procedure(
                &self.endpoint("exists"),
                CallParameters::new().with("model_name", self.name.as_str()),
                &["exists"],
                false,
            )
            .await?
            .squeeze_row()?;

        row.get("exists")
            .and_then(Value::as_bool)
            .ok_or_else(|| Error::UnexpectedResult("'exists' is not a boolean".to_string()))
    }

    /// Removes the model from the catalog.
    pub async fn drop(&self, fail_if_missing: bool) -> Result<Option<Row>> {
        self.runner
            .call_procedure(
                &self.endpoint("drop"),
                CallParameters::new()
                    .with("model_name", self.name.as_str())
                    .with("fail_if_missing", fail_if_missing),
                &[],
                false,
            )
            .await?
            .squeeze_optional_row()
    }

    /// The model's catalog entry.
    pub async fn info(&self) -> Result<Row> {
        self.runner
            .call_procedure(
                &self.endpoint("list"),
                CallParameters::new().with("model_name", self.name.as_str()),
                &[],
                false,
            )
            .await?
            .row(0)
            .ok_or_else(|| Error::ModelNotFound(self.name.clone()))
    }

    async fn info_field(&self, field: &str) -> Result<Value> {
        let mut info = self.info().await?;
        if let Some(value) = info.swap_remove(field) {
            return Ok(value);
        }
        // Before 2.5 most fields are nested in modelInfo.
        info.get("modelInfo")
            .and_then(|m| m.get(field))
            .cloned()
            .ok_or_else(|| {
                Error::UnexpectedResult(format!("model entry has no '{field}' field"))
            })
    }

    /// Model type, e.g. `graphSage`.
    pub async fn model_type(&self) -> Result<String> {
        match self.info_field("modelType").await? {
            Value::String(s) => Ok(s),
            other => Err(Error::UnexpectedResult(format!(
                "'modelType' is not a string: {other}"
            ))),
        }
    }

    /// Configuration the model was trained with.
    pub async fn train_config(&self) -> Result<Value> {
        self.info_field("trainConfig").await
    }

    /// Schema of the graph the model was trained on.
    pub async fn graph_schema(&self) -> Result<Value> {
        self.info_field("graphSchema").await
    }

    /// Whether the model is persisted to disk.
    pub async fn stored(&self) -> Result<bool> {
        Ok(self.info_field("stored").await?.as_bool().unwrap_or(false))
    }

    /// Whether the model is loaded in memory.
    pub async fn loaded(&self) -> Result<bool> {
        Ok(self.info_field("loaded").await?.as_bool().unwrap_or(false))
    }

    /// Creation timestamp as reported by the server.
    pub async fn creation_time(&self) -> Result<Value> {
        self.info_field("creationTime").await
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Model({})", self.name)
    }
}

/// `gds.model` (and `gds.beta.model`).
#[derive(Debug, Clone)]
pub struct ModelProcRunner {
    ctx: EndpointContext,
}

impl ModelProcRunner {
    /// Wraps a context whose namespace ends in `model`.
    #[must_use]
    pub fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    /// Handle for an existing model.
    pub async fn get(&self, model_name: &str) -> Result<Model> {
        let model = Model::new(model_name, self.ctx.runner().clone());
        if !model.exists().await? {
            return Err(Error::ModelNotFound(model_name.to_string()));
        }
        Ok(model)
    }

    /// Catalog entries, for one model or for all models.
    pub async fn list(&self, model: Option<&Model>) -> Result<DataFrame> {
        let params = match model {
            Some(model) => CallParameters::new().with("model_name", model.name()),
            None => CallParameters::new(),
        };
        self.ctx.call(&self.ctx.endpoint("list"), params).await
    }
}
