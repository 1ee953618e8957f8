//! Runners for node, relationship and graph property sub-namespaces.

use serde_json::Value;

use super::Graph;
use crate::call::{config_map, CallParameters, Strings};
use crate::error::Result;
use crate::frame::{DataFrame, Row};
use crate::namespace::EndpointContext;

/// Value column of long-format property streams.
pub(crate) const PROPERTY_VALUE: &str = "propertyValue";
/// Key columns of node property streams.
pub(crate) const NODE_KEY: &[&str] = &["nodeId"];
/// Key columns of relationship property streams.
pub(crate) const RELATIONSHIP_KEY: &[&str] = &["sourceNodeId", "targetNodeId", "relationshipType"];

/// Calls `endpoint($graph_name, $properties, $entities, $config)`.
pub(crate) async fn handle_properties(
    ctx: &EndpointContext,
    endpoint: &str,
    graph: &Graph,
    properties: Value,
    entities: Strings,
    config: Value,
) -> Result<DataFrame> {
    let params = CallParameters::new()
        .with("graph_name", graph.name())
        .with("properties", properties)
        .with("entities", entities)
        .with("config", config_map(config)?);
    ctx.call(endpoint, params).await
}

/// Brings a property stream into the requested format.
///
/// `separate_property_columns` asks for one column per property. Streams
/// already in the requested format, or lacking their key columns, are
/// returned unchanged.
pub(crate) fn reshape_property_stream(
    frame: DataFrame,
    key: &[&str],
    property_column: &str,
    separate_property_columns: bool,
) -> Result<DataFrame> {
    if !key.iter().all(|c| frame.has_column(c)) {
        return Ok(frame);
    }

    let long = frame.has_column(PROPERTY_VALUE);
    if separate_property_columns && long && frame.has_column(property_column) {
        frame.pivot(key, property_column, PROPERTY_VALUE)
    } else if !separate_property_columns && !long {
        frame.melt(key, property_column, PROPERTY_VALUE)
    } else {
        Ok(frame)
    }
}

/// `gds.graph.nodeProperty` and `gds.graph.relationshipProperty`.
#[derive(Debug, Clone)]
pub struct PropertyStreamRunner {
    ctx: EndpointContext,
}

impl PropertyStreamRunner {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    /// Streams a single property for the given labels or types.
    pub async fn stream(
        &self,
        graph: &Graph,
        property: &str,
        entities: impl Into<Strings>,
        config: Value,
    ) -> Result<DataFrame> {
        handle_properties(
            &self.ctx,
            &self.ctx.endpoint("stream"),
            graph,
            Value::from(property),
            entities.into(),
            config,
        )
        .await
    }
}

/// `gds.graph.nodeProperties`.
#[derive(Debug, Clone)]
pub struct GraphNodePropertiesRunner {
    ctx: EndpointContext,
}

impl GraphNodePropertiesRunner {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    /// Streams node properties, optionally one column per property.
    pub async fn stream(
        &self,
        graph: &Graph,
        properties: &[&str],
        node_labels: impl Into<Strings>,
        separate_property_columns: bool,
        config: Value,
    ) -> Result<DataFrame> {
        let frame = handle_properties(
            &self.ctx,
            &self.ctx.endpoint("stream"),
            graph,
            Value::from(properties.to_vec()),
            node_labels.into(),
            config,
        )
        .await?;
        reshape_property_stream(frame, NODE_KEY, "nodeProperty", separate_property_columns)
    }

    /// Writes node properties back to the database.
    pub async fn write(
        &self,
        graph: &Graph,
        properties: &[&str],
        node_labels: impl Into<Strings>,
        config: Value,
    ) -> Result<Row> {
        handle_properties(
            &self.ctx,
            &self.ctx.endpoint("write"),
            graph,
            Value::from(properties.to_vec()),
            node_labels.into(),
            config,
        )
        .await?
        .squeeze_row()
    }

    /// Removes node properties from the in-memory graph.
    pub async fn drop(&self, graph: &Graph, properties: &[&str], config: Value) -> Result<Row> {
        let params = CallParameters::new()
            .with("graph_name", graph.name())
            .with("node_properties", properties.to_vec())
            .with("config", config_map(config)?);
        self.ctx
            .call(&self.ctx.endpoint("drop"), params)
            .await?
            .squeeze_row()
    }
}

/// `gds.graph.relationshipProperties`.
#[derive(Debug, Clone)]
pub struct GraphRelationshipPropertiesRunner {
    ctx: EndpointContext,
}

impl GraphRelationshipPropertiesRunner {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    /// Streams relationship properties, optionally one column per property.
    pub async fn stream(
        &self,
        graph: &Graph,
        properties: &[&str],
        relationship_types: impl Into<Strings>,
        separate_property_columns: bool,
        config: Value,
    ) -> Result<DataFrame> {
        let frame = handle_properties(
            &self.ctx,
            &self.ctx.endpoint("stream"),
            graph,
            Value::from(properties.to_vec()),
            relationship_types.into(),
            config,
        )
        .await?;
        reshape_property_stream(
            frame,
            RELATIONSHIP_KEY,
            "relationshipProperty",
            separate_property_columns,
        )
    }

    /// Writes relationships of one type with several properties.
    pub async fn write(
        &self,
        graph: &Graph,
        relationship_type: &str,
        properties: &[&str],
        config: Value,
    ) -> Result<Row> {
        let params = CallParameters::new()
            .with("graph_name", graph.name())
            .with("relationship_type", relationship_type)
            .with("relationship_properties", properties.to_vec())
            .with("config", config_map(config)?);
        self.ctx
            .call(&self.ctx.endpoint("write"), params)
            .await?
            .squeeze_row()
    }
}

/// `gds.graph.relationship`.
#[derive(Debug, Clone)]
pub struct GraphRelationshipRunner {
    ctx: EndpointContext,
}

impl GraphRelationshipRunner {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    /// Writes relationships of one type, with at most one property.
    ///
    /// An empty `relationship_property` writes no property.
    pub async fn write(
        &self,
        graph: &Graph,
        relationship_type: &str,
        relationship_property: &str,
        config: Value,
    ) -> Result<Row> {
        let params = CallParameters::new()
            .with("graph_name", graph.name())
            .with("relationship_type", relationship_type)
            .with("relationship_property", relationship_property)
            .with("config", config_map(config)?);
        self.ctx
            .call(&self.ctx.endpoint("write"), params)
            .await?
            .squeeze_row()
    }
}

/// `gds.graph.relationships`.
#[derive(Debug, Clone)]
pub struct GraphRelationshipsRunner {
    ctx: EndpointContext,
}

impl GraphRelationshipsRunner {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    /// Streams the topology of the given relationship types.
    pub async fn stream(
        &self,
        graph: &Graph,
        relationship_types: impl Into<Strings>,
        config: Value,
    ) -> Result<DataFrame> {
        let params = CallParameters::new()
            .with("graph_name", graph.name())
            .with("relationship_types", relationship_types.into())
            .with("config", config_map(config)?);
        self.ctx.call(&self.ctx.endpoint("stream"), params).await
    }

    /// Deletes all relationships of one type from the in-memory graph.
    pub async fn drop(&self, graph: &Graph, relationship_type: &str) -> Result<Row> {
        let params = CallParameters::new()
            .with("graph_name", graph.name())
            .with("relationship_type", relationship_type);
        self.ctx
            .call(&self.ctx.endpoint("drop"), params)
            .await?
            .squeeze_row()
    }

    /// Adds an undirected copy of `relationship_type` as `mutate_relationship_type`.
    pub async fn to_undirected(
        &self,
        graph: &Graph,
        relationship_type: &str,
        mutate_relationship_type: &str,
        config: Value,
    ) -> Result<Row> {
        let mut config = config_map(config)?;
        config.insert("relationshipType".to_string(), relationship_type.into());
        config.insert(
            "mutateRelationshipType".to_string(),
            mutate_relationship_type.into(),
        );

        let params = CallParameters::new()
            .with("graph_name", graph.name())
            .with("config", config);
        self.ctx
            .call_logged(&self.ctx.endpoint("toUndirected"), params)
            .await?
            .squeeze_row()
    }
}

/// `gds.graph.graphProperty`.
#[derive(Debug, Clone)]
pub struct GraphPropertyRunner {
    ctx: EndpointContext,
}

impl GraphPropertyRunner {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    fn params(graph: &Graph, graph_property: &str, config: Value) -> Result<CallParameters> {
        Ok(CallParameters::new()
            .with("graph_name", graph.name())
            .with("graph_property", graph_property)
            .with("config", config_map(config)?))
    }

    /// Streams the values of a graph property.
    pub async fn stream(
        &self,
        graph: &Graph,
        graph_property: &str,
        config: Value,
    ) -> Result<DataFrame> {
        self.ctx
            .call(
                &self.ctx.endpoint("stream"),
                Self::params(graph, graph_property, config)?,
            )
            .await
    }

    /// Removes a graph property.
    pub async fn drop(&self, graph: &Graph, graph_property: &str, config: Value) -> Result<Row> {
        self.ctx
            .call(
                &self.ctx.endpoint("drop"),
                Self::params(graph, graph_property, config)?,
            )
            .await?
            .squeeze_row()
    }
}

/// `gds.graph.nodeLabel`.
#[derive(Debug, Clone)]
pub struct GraphLabelRunner {
    ctx: EndpointContext,
}

impl GraphLabelRunner {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    async fn run(&self, mode: &str, graph: &Graph, node_label: &str, config: Value) -> Result<Row> {
        let params = CallParameters::new()
            .with("graph_name", graph.name())
            .with("node_label", node_label)
            .with("config", config_map(config)?);
        self.ctx
            .call(&self.ctx.endpoint(mode), params)
            .await?
            .squeeze_row()
    }

    /// Writes `node_label` to the database nodes matched by the config's filter.
    pub async fn write(&self, graph: &Graph, node_label: &str, config: Value) -> Result<Row> {
        self.run("write", graph, node_label, config).await
    }

    /// Adds `node_label` to the in-memory nodes matched by the config's filter.
    pub async fn mutate(&self, graph: &Graph, node_label: &str, config: Value) -> Result<Row> {
        self.run("mutate", graph, node_label, config).await
    }
}
