//! Endpoints of the `gds.graph` namespace.

use serde_json::Value;
use tracing::info;

use super::entity_ops::{
    handle_properties, reshape_property_stream, GraphLabelRunner, GraphNodePropertiesRunner,
    GraphPropertyRunner, GraphRelationshipPropertiesRunner, GraphRelationshipRunner,
    GraphRelationshipsRunner, PropertyStreamRunner, NODE_KEY, RELATIONSHIP_KEY,
};
use super::export::GraphExportRunner;
use super::karate::{karate_club_nodes, karate_club_relationships};
use super::ogb::{OgblLoader, OgbnLoader};
use super::project::{GraphCypherRunner, GraphProjectRunner};
use super::sample::GraphSampleRunner;
use super::{Graph, GraphCreateResult};
use crate::call::{config_map, CallParameters, Strings};
use crate::error::{Error, Result};
use crate::frame::{DataFrame, Row};
use crate::namespace::EndpointContext;
use crate::query_runner::{NODE_ID, SOURCE_NODE_ID, TARGET_NODE_ID};
use crate::server_version::{Compatibility, ServerVersion};

/// The non-tiered graph namespace; client-side endpoints and some version
/// gates only apply here.
pub(crate) const GRAPH_NAMESPACE: &str = "gds.graph";

const GDS_2_3: ServerVersion = ServerVersion::new(2, 3, 0);
const GDS_2_5: ServerVersion = ServerVersion::new(2, 5, 0);
const GDS_3_0: ServerVersion = ServerVersion::new(3, 0, 0);

const ALPHA_GRAPH_NAMESPACE: &str = "gds.alpha.graph";
const BETA_GRAPH_NAMESPACE: &str = "gds.beta.graph";

/// Namespaces offering `generate`, and when.
const GENERATE_TIERS: [(&str, Compatibility); 2] = [
    (GRAPH_NAMESPACE, Compatibility::since(GDS_2_5)),
    (BETA_GRAPH_NAMESPACE, Compatibility::before(GDS_3_0)),
];
const FILTER_TIERS: [(&str, Compatibility); 1] =
    [(GRAPH_NAMESPACE, Compatibility::since(GDS_2_5))];
const GRAPH_PROPERTY_TIERS: [(&str, Compatibility); 2] = [
    (GRAPH_NAMESPACE, Compatibility::since(GDS_2_5)),
    (ALPHA_GRAPH_NAMESPACE, Compatibility::before(GDS_3_0)),
];
const NODE_LABEL_TIERS: [(&str, Compatibility); 2] = [
    (GRAPH_NAMESPACE, Compatibility::since(GDS_2_5)),
    (ALPHA_GRAPH_NAMESPACE, Compatibility::between(GDS_2_3, GDS_3_0)),
];

/// Runner for `gds.graph`, `gds.beta.graph` and `gds.alpha.graph`.
#[derive(Debug, Clone)]
pub struct GraphProcRunner {
    ctx: EndpointContext,
}

impl GraphProcRunner {
    /// Wraps a context whose namespace ends in `graph`.
    #[must_use]
    pub fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    fn handle(&self, graph_name: &str) -> Graph {
        Graph::new(graph_name, self.ctx.runner().clone())
    }

    fn client_only(&self, segment: &str) -> Result<()> {
        if self.ctx.namespace() == GRAPH_NAMESPACE {
            Ok(())
        } else {
            Err(Error::Unsupported(format!(
                "{} is a client-side endpoint, use {GRAPH_NAMESPACE}.{segment} instead",
                self.ctx.endpoint(segment)
            )))
        }
    }

    /// Version gate for an endpoint whose window depends on the namespace.
    ///
    /// Namespaces missing from `tiers` do not offer the endpoint at all.
    fn require_tier(&self, segment: &str, tiers: &[(&str, Compatibility)]) -> Result<()> {
        let endpoint = self.ctx.endpoint(segment);
        match tiers.iter().find(|(ns, _)| *ns == self.ctx.namespace()) {
            Some((_, compatibility)) => self.ctx.require(&endpoint, *compatibility),
            None => {
                let offered: Vec<String> =
                    tiers.iter().map(|(ns, _)| format!("{ns}.{segment}")).collect();
                Err(Error::Unsupported(format!(
                    "{endpoint} does not exist, use {} instead",
                    offered.join(" or ")
                )))
            }
        }
    }

    /// Builds an in-memory graph from node and relationship frames.
    ///
    /// Empty frames are ignored. Every problem with the input is collected
    /// and reported in a single [`Error::InvalidArgument`].
    pub async fn construct(
        &self,
        graph_name: &str,
        nodes: Vec<DataFrame>,
        relationships: Vec<DataFrame>,
        concurrency: usize,
        undirected_relationship_types: Vec<String>,
    ) -> Result<Graph> {
        self.client_only("construct")?;
        self.ctx
            .require_since(&self.ctx.endpoint("construct"), 2, 1, 0)?;

        let nodes: Vec<DataFrame> = nodes.into_iter().filter(|f| !f.is_empty()).collect();
        let relationships: Vec<DataFrame> =
            relationships.into_iter().filter(|f| !f.is_empty()).collect();

        let mut errors = Vec::new();

        let exists = self
            .ctx
            .call_yielding(
                "gds.graph.exists",
                CallParameters::new().with("graph_name", graph_name),
                &["exists"],
            )
            .await?;
        if exists.row(0).and_then(|r| r.get("exists").cloned()) == Some(Value::Bool(true)) {
            errors.push(format!(
                "Graph '{graph_name}' already exists. Please drop the existing graph or use a different name."
            ));
        }

        for (idx, frame) in nodes.iter().enumerate() {
            if !frame.has_column(NODE_ID) {
                errors.push(format!(
                    "Node dataframe at index {idx} needs to contain a '{NODE_ID}' column."
                ));
            }
        }

        for (idx, frame) in relationships.iter().enumerate() {
            for expected in [SOURCE_NODE_ID, TARGET_NODE_ID] {
                if !frame.has_column(expected) {
                    errors.push(format!(
                        "Relationship dataframe at index {idx} needs to contain a '{expected}' column."
                    ));
                }
            }
        }

        if self.ctx.server_version() < ServerVersion::new(2, 3, 0)
            && !undirected_relationship_types.is_empty()
        {
            errors.push(
                "The parameter 'undirected_relationship_types' is only supported since GDS 2.3.0."
                    .to_string(),
            );
        }

        if !errors.is_empty() {
            return Err(Error::InvalidArgument(errors.join("\n")));
        }

        let constructor = self.ctx.runner().create_graph_constructor(
            graph_name,
            concurrency,
            undirected_relationship_types,
        );
        constructor.run(&nodes, &relationships).await?;
        info!("Constructed graph {}", graph_name);

        Ok(self.handle(graph_name))
    }

    /// Loads Zachary's karate club as 34 `Person` nodes and 78 `KNOWS`
    /// relationships.
    pub async fn load_karate_club(&self, graph_name: &str, undirected: bool) -> Result<Graph> {
        self.client_only("load_karate_club")?;

        let undirected_types = if undirected {
            vec!["*".to_string()]
        } else {
            Vec::new()
        };
        self.construct(
            graph_name,
            vec![karate_club_nodes()?],
            vec![karate_club_relationships()?],
            4,
            undirected_types,
        )
        .await
    }

    /// `gds.graph.project` and its variants.
    #[must_use]
    pub fn project(&self) -> GraphProjectRunner {
        GraphProjectRunner::new(self.ctx.child("project"))
    }

    /// `gds.graph.project.cypher`.
    #[must_use]
    pub fn cypher(&self) -> GraphCypherRunner {
        GraphCypherRunner::new(self.ctx.child("project").child("cypher"))
    }

    /// `gds.graph.sample`.
    #[must_use]
    pub fn sample(&self) -> GraphSampleRunner {
        GraphSampleRunner::new(self.ctx.child("sample"))
    }

    /// `gds.graph.export`.
    #[must_use]
    pub fn export(&self) -> GraphExportRunner {
        GraphExportRunner::new(self.ctx.child("export"))
    }

    /// OGB node property prediction loader.
    #[must_use]
    pub fn ogbn(&self) -> OgbnLoader {
        OgbnLoader::new(self.ctx.child("ogbn"))
    }

    /// OGB link property prediction loader.
    #[must_use]
    pub fn ogbl(&self) -> OgblLoader {
        OgblLoader::new(self.ctx.child("ogbl"))
    }

    /// Generates a random graph.
    pub async fn generate(
        &self,
        graph_name: &str,
        node_count: u64,
        average_degree: u64,
        config: Value,
    ) -> Result<GraphCreateResult> {
        self.require_tier("generate", &GENERATE_TIERS)?;

        let params = CallParameters::new()
            .with("graph_name", graph_name)
            .with("node_count", node_count)
            .with("average_degree", average_degree)
            .with("config", config_map(config)?);
        let result = self
            .ctx
            .call(&self.ctx.endpoint("generate"), params)
            .await?
            .squeeze_row()?;

        Ok(GraphCreateResult {
            graph: self.handle(graph_name),
            result,
        })
    }

    /// Creates `graph_name` as a filtered copy of `from_graph`.
    pub async fn filter(
        &self,
        graph_name: &str,
        from_graph: &Graph,
        node_filter: &str,
        relationship_filter: &str,
        config: Value,
    ) -> Result<GraphCreateResult> {
        self.require_tier("filter", &FILTER_TIERS)?;

        let params = CallParameters::new()
            .with("graph_name", graph_name)
            .with("from_graph_name", from_graph.name())
            .with("node_filter", node_filter)
            .with("relationship_filter", relationship_filter)
            .with("config", config_map(config)?);
        let result = self
            .ctx
            .call_logged(&self.ctx.endpoint("filter"), params)
            .await?
            .squeeze_row()?;

        Ok(GraphCreateResult {
            graph: self.handle(graph_name),
            result,
        })
    }

    /// Drops `graph` from the catalog.
    ///
    /// `db_name` empty means the current database. Returns `None` when the
    /// graph did not exist and `fail_if_missing` is false.
    pub async fn drop(
        &self,
        graph: &Graph,
        fail_if_missing: bool,
        db_name: &str,
        username: Option<&str>,
    ) -> Result<Option<Row>> {
        let mut params = CallParameters::new()
            .with("graph_name", graph.name())
            .with("fail_if_missing", fail_if_missing)
            .with("db_name", db_name);
        if let Some(username) = username.filter(|u| !u.is_empty()) {
            params.insert("username", username);
        }

        self.ctx
            .call(&self.ctx.endpoint("drop"), params)
            .await?
            .squeeze_optional_row()
    }

    /// The `gds.graph.exists` row for `graph_name`.
    pub async fn exists(&self, graph_name: &str) -> Result<Row> {
        self.ctx
            .call(
                &self.ctx.endpoint("exists"),
                CallParameters::new().with("graph_name", graph_name),
            )
            .await?
            .squeeze_row()
    }

    /// Catalog entries, for one graph or for all graphs.
    pub async fn list(&self, graph: Option<&Graph>) -> Result<DataFrame> {
        match graph {
            Some(graph) => {
                self.ctx
                    .call(
                        &self.ctx.endpoint("list"),
                        CallParameters::new().with("graph_name", graph.name()),
                    )
                    .await
            }
            None => {
                self.ctx
                    .call("gds.graph.list", CallParameters::new())
                    .await
            }
        }
    }

    /// Handle for an existing graph.
    pub async fn get(&self, graph_name: &str) -> Result<Graph> {
        self.client_only("get")?;

        let listed = self
            .ctx
            .call_yielding(
                "gds.graph.list",
                CallParameters::new().with("graph_name", graph_name),
                &["graphName"],
            )
            .await?;
        if listed.is_empty() {
            return Err(Error::GraphNotFound {
                graph_name: graph_name.to_string(),
                database: self
                    .ctx
                    .runner()
                    .database()
                    .unwrap_or_else(|| crate::query_runner::DEFAULT_DATABASE.to_string()),
            });
        }

        Ok(self.handle(graph_name))
    }

    /// Streams node properties, optionally one column per property.
    pub async fn stream_node_properties(
        &self,
        graph: &Graph,
        node_properties: &[&str],
        node_labels: impl Into<Strings>,
        separate_property_columns: bool,
        config: Value,
    ) -> Result<DataFrame> {
        let frame = handle_properties(
            &self.ctx,
            &self.ctx.endpoint("streamNodeProperties"),
            graph,
            Value::from(node_properties.to_vec()),
            node_labels.into(),
            config,
        )
        .await?;
        reshape_property_stream(frame, NODE_KEY, "nodeProperty", separate_property_columns)
    }

    /// Streams a single node property.
    pub async fn stream_node_property(
        &self,
        graph: &Graph,
        node_property: &str,
        node_labels: impl Into<Strings>,
        config: Value,
    ) -> Result<DataFrame> {
        handle_properties(
            &self.ctx,
            &self.ctx.endpoint("streamNodeProperty"),
            graph,
            Value::from(node_property),
            node_labels.into(),
            config,
        )
        .await
    }

    /// Streams relationship properties, optionally one column per property.
    pub async fn stream_relationship_properties(
        &self,
        graph: &Graph,
        relationship_properties: &[&str],
        relationship_types: impl Into<Strings>,
        separate_property_columns: bool,
        config: Value,
    ) -> Result<DataFrame> {
        let frame = handle_properties(
            &self.ctx,
            &self.ctx.endpoint("streamRelationshipProperties"),
            graph,
            Value::from(relationship_properties.to_vec()),
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

    /// Streams a single relationship property.
    pub async fn stream_relationship_property(
        &self,
        graph: &Graph,
        relationship_property: &str,
        relationship_types: impl Into<Strings>,
        config: Value,
    ) -> Result<DataFrame> {
        handle_properties(
            &self.ctx,
            &self.ctx.endpoint("streamRelationshipProperty"),
            graph,
            Value::from(relationship_property),
            relationship_types.into(),
            config,
        )
        .await
    }

    /// Writes node properties back to the database.
    pub async fn write_node_properties(
        &self,
        graph: &Graph,
        node_properties: &[&str],
        node_labels: impl Into<Strings>,
        config: Value,
    ) -> Result<Row> {
        handle_properties(
            &self.ctx,
            &self.ctx.endpoint("writeNodeProperties"),
            graph,
            Value::from(node_properties.to_vec()),
            node_labels.into(),
            config,
        )
        .await?
        .squeeze_row()
    }

    /// Writes relationships of one type, with an optional property.
    ///
    /// An empty `relationship_property` writes no property.
    pub async fn write_relationship(
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
            .call(&self.ctx.endpoint("writeRelationship"), params)
            .await?
            .squeeze_row()
    }

    /// Removes node properties from the in-memory graph.
    pub async fn remove_node_properties(
        &self,
        graph: &Graph,
        node_properties: &[&str],
        config: Value,
    ) -> Result<Row> {
        let params = CallParameters::new()
            .with("graph_name", graph.name())
            .with("properties", node_properties.to_vec())
            .with("config", config_map(config)?);
        self.ctx
            .call(&self.ctx.endpoint("removeNodeProperties"), params)
            .await?
            .squeeze_row()
    }

    /// Removes node properties of the given labels; only before GDS 2.1.
    pub async fn remove_node_properties_for_labels(
        &self,
        graph: &Graph,
        node_properties: &[&str],
        node_labels: impl Into<Strings>,
        config: Value,
    ) -> Result<Row> {
        let endpoint = self.ctx.endpoint("removeNodeProperties");
        self.ctx.require(
            &endpoint,
            Compatibility::before(ServerVersion::new(2, 1, 0)),
        )?;

        handle_properties(
            &self.ctx,
            &endpoint,
            graph,
            Value::from(node_properties.to_vec()),
            node_labels.into(),
            config,
        )
        .await?
        .squeeze_row()
    }

    /// Deletes all relationships of one type from the in-memory graph.
    pub async fn delete_relationships(&self, graph: &Graph, relationship_type: &str) -> Result<Row> {
        let params = CallParameters::new()
            .with("graph_name", graph.name())
            .with("relationship_type", relationship_type);
        self.ctx
            .call(&self.ctx.endpoint("deleteRelationships"), params)
            .await?
            .squeeze_row()
    }

    /// `gds.graph.nodeProperty`.
    #[must_use]
    pub fn node_property(&self) -> PropertyStreamRunner {
        PropertyStreamRunner::new(self.ctx.child("nodeProperty"))
    }

    /// `gds.graph.nodeProperties`.
    #[must_use]
    pub fn node_properties(&self) -> GraphNodePropertiesRunner {
        GraphNodePropertiesRunner::new(self.ctx.child("nodeProperties"))
    }

    /// `gds.graph.relationshipProperty`.
    #[must_use]
    pub fn relationship_property(&self) -> PropertyStreamRunner {
        PropertyStreamRunner::new(self.ctx.child("relationshipProperty"))
    }

    /// `gds.graph.relationshipProperties`.
    #[must_use]
    pub fn relationship_properties(&self) -> GraphRelationshipPropertiesRunner {
        GraphRelationshipPropertiesRunner::new(self.ctx.child("relationshipProperties"))
    }

    /// `gds.graph.relationship`.
    #[must_use]
    pub fn relationship(&self) -> GraphRelationshipRunner {
        GraphRelationshipRunner::new(self.ctx.child("relationship"))
    }

    /// `gds.graph.relationships`.
    #[must_use]
    pub fn relationships(&self) -> GraphRelationshipsRunner {
        GraphRelationshipsRunner::new(self.ctx.child("relationships"))
    }

    /// `gds.graph.graphProperty` (2.5+), or `gds.alpha.graph.graphProperty` before 3.0.
    pub fn graph_property(&self) -> Result<GraphPropertyRunner> {
        self.require_tier("graphProperty", &GRAPH_PROPERTY_TIERS)?;
        Ok(GraphPropertyRunner::new(self.ctx.child("graphProperty")))
    }

    /// `gds.graph.nodeLabel` (2.5+), or `gds.alpha.graph.nodeLabel` from 2.3 until 3.0.
    pub fn node_label(&self) -> Result<GraphLabelRunner> {
        self.require_tier("nodeLabel", &NODE_LABEL_TIERS)?;
        Ok(GraphLabelRunner::new(self.ctx.child("nodeLabel")))
    }
}
