#![allow(clippy::doc_markdown)]
//! `gds` - command-line client for the Neo4j Graph Data Science library.

mod commands;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gds_client::config::DEFAULT_CONFIG_FILE;
use gds_client::{ClientConfig, CollectingQueryRunner, GraphDataScience, ServerVersion};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line client for the Neo4j Graph Data Science library
#[derive(Parser, Debug)]
#[command(name = "gds")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, env = "GDS_CONFIG")]
    config: PathBuf,

    /// Query API address, overrides the configuration
    #[arg(long)]
    uri: Option<String>,

    /// Database user, overrides the configuration
    #[arg(short, long)]
    username: Option<String>,

    /// Database password, overrides the configuration
    #[arg(short, long)]
    password: Option<String>,

    /// Target database
    #[arg(short, long)]
    database: Option<String>,

    /// Print the statements instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// GDS version assumed by --dry-run
    #[arg(long, default_value = "2.6.0")]
    gds_version: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the GDS version of the server
    Version,
    /// Show the license state of the server
    License,
    /// Inspect and drop graphs in the catalog
    #[command(subcommand)]
    Graphs(GraphsCommand),
    /// Show the progress of running jobs
    Progress {
        /// Only show this job
        job_id: Option<String>,
    },
    /// Load a dataset into an in-memory graph
    #[command(subcommand)]
    Load(LoadCommand),
    /// Manage GDS sessions on Aura
    #[command(subcommand)]
    Sessions(SessionsCommand),
}

#[derive(Subcommand, Debug)]
enum GraphsCommand {
    /// List the graphs in the catalog
    List,
    /// Drop a graph
    Drop {
        /// Graph name
        name: String,
        /// Fail when the graph does not exist
        #[arg(long)]
        fail_if_missing: bool,
    },
    /// Check whether a graph exists
    Exists {
        /// Graph name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum LoadCommand {
    /// Zachary's karate club
    Karate {
        /// Graph name
        #[arg(long, default_value = "karate")]
        name: String,
        /// Load the relationships as undirected
        #[arg(long)]
        undirected: bool,
    },
    /// An OGB node property prediction dataset from its extracted directory
    Ogbn {
        /// Dataset directory, e.g. ./ogbn_arxiv
        dir: PathBuf,
        /// Graph name, defaults to the dataset name
        #[arg(long)]
        name: Option<String>,
        /// Read concurrency on the server
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },
}

#[derive(Subcommand, Debug)]
enum SessionsCommand {
    /// List the GDS sessions
    List,
    /// Delete a GDS session
    Delete {
        /// Session name
        name: String,
    },
}

impl Args {
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = ClientConfig::load_from(&self.config)
            .with_context(|| format!("Failed to load configuration from {}", self.config.display()))?;
        if let Some(uri) = &self.uri {
            config.uri.clone_from(uri);
        }
        if let Some(username) = &self.username {
            config.username.clone_from(username);
        }
        if let Some(password) = &self.password {
            config.password.clone_from(password);
        }
        if let Some(database) = &self.database {
            config.database = Some(database.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

/// Client for the command, and the recording runner in dry-run mode.
async fn connect(args: &Args) -> anyhow::Result<(GraphDataScience, Option<CollectingQueryRunner>)> {
    if args.dry_run {
        let version = ServerVersion::parse(&args.gds_version)?;
        let runner = CollectingQueryRunner::new(version);
        if let Some(database) = &args.database {
            gds_client::QueryRunner::set_database(&runner, database);
        }
        let gds = GraphDataScience::from_runner(Arc::new(runner.clone()));
        return Ok((gds, Some(runner)));
    }

    let config = args.client_config()?;
    let uri = config.uri.clone();
    let gds = GraphDataScience::connect(config)
        .await
        .with_context(|| format!("Failed to connect to {uri}"))?;
    Ok((gds, None))
}

async fn run(args: &Args) -> anyhow::Result<()> {
    match &args.command {
        Command::Sessions(cmd) => {
            let config = args.client_config()?;
            match cmd {
                SessionsCommand::List => commands::sessions_list(&config).await,
                SessionsCommand::Delete { name } => commands::sessions_delete(&config, name).await,
            }
        }
        Command::Load(LoadCommand::Ogbn {
            dir,
            name,
            concurrency,
        }) => {
            let dataset = commands::read_ogbn(dir)?;
            with_client(args, |gds| async move {
                commands::load_ogbn(&gds, &dataset, name.as_deref(), *concurrency).await
            })
            .await
        }
        Command::Version => with_client(args, |gds| async move { commands::version(&gds).await }).await,
        Command::License => with_client(args, |gds| async move { commands::license(&gds).await }).await,
        Command::Progress { job_id } => {
            with_client(args, |gds| async move { commands::progress(&gds, job_id.as_deref()).await })
                .await
        }
        Command::Graphs(GraphsCommand::List) => {
            with_client(args, |gds| async move { commands::graphs_list(&gds).await }).await
        }
        Command::Graphs(GraphsCommand::Drop {
            name,
            fail_if_missing,
        }) => {
            with_client(args, |gds| async move {
                commands::graphs_drop(&gds, name, *fail_if_missing).await
            })
            .await
        }
        Command::Graphs(GraphsCommand::Exists { name }) => {
            with_client(args, |gds| async move { commands::graphs_exists(&gds, name).await }).await
        }
        Command::Load(LoadCommand::Karate { name, undirected }) => {
            with_client(args, |gds| async move {
                commands::load_karate(&gds, name, *undirected).await
            })
            .await
        }
    }
}

/// Runs `f` against a connected client; in dry-run mode the recorded
/// statements are printed even when the command fails on the empty results.
async fn with_client<F, Fut>(args: &Args, f: F) -> anyhow::Result<()>
where
    F: FnOnce(GraphDataScience) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<()>>,
{
    let (gds, recorder) = connect(args).await?;
    let result = f(gds.clone()).await;
    if let Some(recorder) = recorder {
        output::print_statements(&recorder.queries());
    }
    gds.close().await?;
    result
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    tracing::debug!("Running {:?}", args.command);

    run(&args).await
}
