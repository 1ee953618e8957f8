//! Graph catalog endpoints and graph handles.

mod entity_ops;
mod export;
mod handle;
mod karate;
pub mod ogb;
mod proc_runner;
mod project;
mod sample;

#[cfg(test)]
mod entity_ops_tests;
#[cfg(test)]
mod handle_tests;
#[cfg(test)]
mod proc_runner_tests;

pub use entity_ops::{
    GraphLabelRunner, GraphNodePropertiesRunner, GraphPropertyRunner,
    GraphRelationshipPropertiesRunner, GraphRelationshipRunner, GraphRelationshipsRunner,
    PropertyStreamRunner,
};
pub use export::GraphExportRunner;
pub use handle::{Graph, GraphCreateResult};
pub use karate::{karate_club_nodes, karate_club_relationships, KARATE_CLUB_EDGES};
pub use proc_runner::GraphProcRunner;
pub use project::{GraphCypherRunner, GraphProjectRunner};
pub use sample::GraphSampleRunner;
