use std::path::Path;

use tracing::info;

use super::reader::read_node_dataset;
use super::translate::GraphFrames;
use super::{LinkDataset, NodeDataset};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::namespace::EndpointContext;

fn client_only(ctx: &EndpointContext, expected: &str) -> Result<()> {
    if ctx.namespace() == expected {
        Ok(())
    } else {
        Err(Error::Unsupported(format!(
            "{}.load is a client-side endpoint, use {expected}.load instead",
            ctx.namespace()
        )))
    }
}

async fn construct(
    ctx: &EndpointContext,
    graph_name: &str,
    frames: GraphFrames,
    concurrency: usize,
) -> Result<Graph> {
    let constructor = ctx
        .runner()
        .create_graph_constructor(graph_name, concurrency, Vec::new());
    constructor.run(&frames.nodes, &frames.relationships).await?;
    info!("Loaded OGB graph {}", graph_name);

    Ok(Graph::new(graph_name, ctx.runner().clone()))
}

/// `gds.graph.ogbn`: node property prediction datasets.
#[derive(Debug, Clone)]
pub struct OgbnLoader {
    ctx: EndpointContext,
}

impl OgbnLoader {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    /// Constructs a graph from `dataset`, named after the dataset unless
    /// `graph_name` is given.
    pub async fn load(
        &self,
        dataset: &NodeDataset,
        graph_name: Option<&str>,
        concurrency: usize,
    ) -> Result<Graph> {
        client_only(&self.ctx, "gds.graph.ogbn")?;
        self.ctx
            .require_since(&self.ctx.endpoint("load"), 2, 1, 0)?;

        let frames = dataset.to_frames()?;
        construct(
            &self.ctx,
            graph_name.unwrap_or(dataset.name()),
            frames,
            concurrency,
        )
        .await
    }

    /// Reads a homogeneous dataset from its OGB directory and loads it.
    pub async fn load_dir(
        &self,
        root: impl AsRef<Path>,
        graph_name: Option<&str>,
        concurrency: usize,
    ) -> Result<Graph> {
        let dataset = NodeDataset::from(read_node_dataset(root)?);
        self.load(&dataset, graph_name, concurrency).await
    }
}

/// `gds.graph.ogbl`: link property prediction datasets.
#[derive(Debug, Clone)]
pub struct OgblLoader {
    ctx: EndpointContext,
}

impl OgblLoader {
    pub(crate) fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    /// Constructs a graph from `dataset`, named after the dataset unless
    /// `graph_name` is given.
    pub async fn load(
        &self,
        dataset: &LinkDataset,
        graph_name: Option<&str>,
        concurrency: usize,
    ) -> Result<Graph> {
        client_only(&self.ctx, "gds.graph.ogbl")?;
        self.ctx
            .require_since(&self.ctx.endpoint("load"), 2, 1, 0)?;

        let frames = dataset.to_frames()?;
        construct(
            &self.ctx,
            graph_name.unwrap_or(dataset.name()),
            frames,
            concurrency,
        )
        .await
    }
}
