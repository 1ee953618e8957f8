//! Command handlers.

use std::path::Path;

use anyhow::{anyhow, Context};
use colored::Colorize;
use gds_client::graph::ogb::{read_node_dataset, NodeDataset};
use gds_client::{ClientConfig, GdsSessions, Graph, GraphDataScience, ServerVersion};

use crate::output;

pub async fn version(gds: &GraphDataScience) -> anyhow::Result<()> {
    let version = gds.version().await?;
    println!("{} {}", "GDS version:".bold(), version.green());
    Ok(())
}

pub async fn license(gds: &GraphDataScience) -> anyhow::Result<()> {
    if gds.is_licensed().await? {
        println!("{}", "Licensed (Enterprise Edition)".green());
    } else {
        println!("{}", "Unlicensed (Community Edition)".yellow());
    }
    Ok(())
}

pub async fn progress(gds: &GraphDataScience, job_id: Option<&str>) -> anyhow::Result<()> {
    let frame = if gds.server_version() >= ServerVersion::new(2, 5, 0) {
        gds.list_progress(job_id).await?
    } else {
        gds.beta().list_progress(job_id).await?
    };

    if frame.is_empty() {
        println!("No running jobs.\n");
    } else {
        output::print_frame(&frame);
    }
    Ok(())
}

pub async fn graphs_list(gds: &GraphDataScience) -> anyhow::Result<()> {
    let frame = gds.graph().list(None).await?;
    if frame.is_empty() {
        println!("No graphs found.\n");
        return Ok(());
    }

    output::print_columns(
        &frame,
        &["graphName", "database", "nodeCount", "relationshipCount", "memoryUsage"],
    );
    Ok(())
}

pub async fn graphs_drop(
    gds: &GraphDataScience,
    name: &str,
    fail_if_missing: bool,
) -> anyhow::Result<()> {
    let graph = Graph::new(name, gds.runner().clone());
    match gds.graph().drop(&graph, fail_if_missing, "", None).await? {
        Some(_) => println!("{} {}", "Dropped".green(), name.bold()),
        None => println!("Graph {} does not exist.", name.bold()),
    }
    Ok(())
}

pub async fn graphs_exists(gds: &GraphDataScience, name: &str) -> anyhow::Result<()> {
    let graph = Graph::new(name, gds.runner().clone());
    if graph.exists().await? {
        println!("Graph {} {}", name.bold(), "exists".green());
    } else {
        println!("Graph {} {}", name.bold(), "does not exist".yellow());
    }
    Ok(())
}

pub async fn load_karate(gds: &GraphDataScience, name: &str, undirected: bool) -> anyhow::Result<()> {
    let graph = gds.graph().load_karate_club(name, undirected).await?;
    println!("{} {}", "Loaded".green(), graph.name().bold());
    Ok(())
}

pub fn read_ogbn(dir: &Path) -> anyhow::Result<NodeDataset> {
    let dataset = read_node_dataset(dir)
        .with_context(|| format!("Failed to read the OGB dataset in {}", dir.display()))?;
    Ok(NodeDataset::from(dataset))
}

pub async fn load_ogbn(
    gds: &GraphDataScience,
    dataset: &NodeDataset,
    name: Option<&str>,
    concurrency: usize,
) -> anyhow::Result<()> {
    let graph = gds.graph().ogbn().load(dataset, name, concurrency).await?;
    println!(
        "{} {} as {}",
        "Loaded".green(),
        dataset.name(),
        graph.name().bold()
    );
    Ok(())
}

fn sessions(config: &ClientConfig) -> anyhow::Result<GdsSessions> {
    let aura = config.aura.as_ref().ok_or_else(|| {
        anyhow!("Aura credentials are not configured (set GDS_AURA__CLIENT_ID and GDS_AURA__CLIENT_SECRET)")
    })?;
    Ok(GdsSessions::new(aura)?)
}

pub async fn sessions_list(config: &ClientConfig) -> anyhow::Result<()> {
    let sessions = sessions(config)?.list().await?;
    if sessions.is_empty() {
        println!("No sessions found.\n");
        return Ok(());
    }

    let mut table = output::table(&["Name", "Size", "Status"]);
    for session in sessions {
        table.add_row(vec![session.name, session.size, session.status]);
    }
    println!("{table}");
    Ok(())
}

pub async fn sessions_delete(config: &ClientConfig, name: &str) -> anyhow::Result<()> {
    if sessions(config)?.delete(name).await? {
        println!("{} {}", "Deleted session".green(), name.bold());
    } else {
        println!("Session {} does not exist.", name.bold());
    }
    Ok(())
}
