//! # gds-client
//!
//! Client for the Neo4j Graph Data Science (GDS) library.
//!
//! Algorithms, embeddings and graph storage all run on the server. The
//! client turns method calls into parameterized `CALL` statements, checks
//! arguments and server versions before anything is sent, and reshapes the
//! tabular results.
//!
//! ## Features
//!
//! - **Namespace routing**: `gds.beta().graph().project()` calls
//!   `gds.beta.graph.project`; any procedure is reachable by name
//! - **Version gating**: endpoints newer than the server fail before a query
//!   is sent
//! - **Result reshaping**: long and wide node property tables
//! - **Graph construction**: build in-memory graphs from tables, the Karate
//!   Club graph or OGB datasets
//! - **GDS sessions**: dedicated GDS instances on Aura next to a database
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gds_client::{ClientConfig, GraphDataScience};
//! use serde_json::json;
//!
//! # async fn demo() -> gds_client::Result<()> {
//! let gds = GraphDataScience::connect(ClientConfig::new(
//!     "http://localhost:7474",
//!     "neo4j",
//!     "password",
//! ))
//! .await?;
//!
//! let created = gds
//!     .graph()
//!     .project()
//!     .call("people", json!("Person"), json!("KNOWS"), json!(null))
//!     .await?;
//!
//! let ranks = gds
//!     .endpoint("pageRank")
//!     .stream(&created.graph, json!({"maxIterations": 20}))
//!     .await?;
//! println!("{} rows", ranks.len());
//!
//! created.graph.drop(true).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(
    test,
    allow(
        clippy::doc_markdown,
        clippy::uninlined_format_args,
        clippy::float_cmp,
        clippy::manual_assert
    )
)]

pub mod algo;
pub mod aura;
pub mod call;
pub mod config;
pub mod error;
pub mod frame;
pub mod graph;
pub mod graph_data_science;
#[cfg(test)]
mod graph_data_science_tests;
pub mod model;
pub mod namespace;
pub mod query_runner;
pub mod server_version;
#[cfg(test)]
mod server_version_tests;
pub mod session;
pub mod system;

pub use algo::AlgoProcRunner;
pub use aura::AuraApi;
pub use call::{CallParameters, Strings};
pub use config::{AuraConfig, ClientConfig};
pub use error::{Error, Result};
pub use frame::{DataFrame, Row};
pub use graph::{Graph, GraphCreateResult, GraphProcRunner};
pub use graph_data_science::{AlphaEndpoints, BetaEndpoints, GraphDataScience};
pub use model::{GraphSageModel, Model};
pub use namespace::EndpointContext;
pub use query_runner::{CollectingQueryRunner, HttpQueryRunner, QueryRunner, SessionQueryRunner};
pub use server_version::{Compatibility, ServerVersion};
pub use session::{AuraGraphDataScience, DbmsConnectionInfo, GdsSessions, SessionMemory};
