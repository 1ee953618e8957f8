//! Transport seam between the endpoint runners and the database.
//!
//! Endpoint runners only ever talk to a [`QueryRunner`]. The HTTP runner
//! speaks the Neo4j Query API, the collecting runner records calls without a
//! server, and the session runner routes between a GDS session and an Aura
//! database.

mod collecting;
mod graph_constructor;
mod http;
mod progress;
mod session;


use async_trait::async_trait;

pub use collecting::CollectingQueryRunner;
pub use graph_constructor::{
    CypherGraphConstructor, GraphConstructor, LABELS, NODE_ID, RELATIONSHIP_TYPE, SOURCE_NODE_ID,
    TARGET_NODE_ID,
};
pub use http::{HttpQueryRunner, DEFAULT_DATABASE};
pub use session::SessionQueryRunner;

use crate::call::CallParameters;
use crate::error::{Error, Result};
use crate::frame::DataFrame;
use crate::server_version::ServerVersion;

/// Status code the server uses for calls to unregistered procedures.
pub const PROCEDURE_NOT_FOUND: &str = "Neo.ClientError.Procedure.ProcedureNotFound";

/// Executes Cypher statements and procedure calls against a GDS server.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    /// Runs a Cypher statement and returns its result table.
    ///
    /// `database` overrides the runner's current database for this statement.
    async fn run_cypher(
        &self,
        query: &str,
        params: Option<CallParameters>,
        database: Option<&str>,
    ) -> Result<DataFrame>;

    /// Calls a procedure with positional parameters.
    ///
    /// When `logging` is set, implementations may report server-side progress
    /// while the call runs.
    async fn call_procedure(
        &self,
        endpoint: &str,
        params: CallParameters,
        yields: &[&str],
        logging: bool,
    ) -> Result<DataFrame> {
        let _ = logging;
        let query = params.procedure_query(endpoint, yields);
        self.run_cypher(&query, Some(params), None).await
    }

    /// GDS version of the server executing procedures.
    fn server_version(&self) -> ServerVersion;

    /// Current target database, `None` for the server default.
    fn database(&self) -> Option<String>;

    /// Switches the target database for subsequent statements.
    fn set_database(&self, database: &str);

    /// Whether the transport is encrypted.
    fn encrypted(&self) -> bool;

    /// Creates a constructor that builds an in-memory graph from frames.
    fn create_graph_constructor(
        &self,
        graph_name: &str,
        concurrency: usize,
        undirected_relationship_types: Vec<String>,
    ) -> Box<dyn GraphConstructor>;

    /// Releases resources held by the runner.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Converts a server error into a client error.
///
/// Unknown procedures become [`Error::UnknownEndpoint`] so callers can react
/// to a missing or outdated GDS plugin.
#[must_use]
pub fn map_server_error(code: &str, message: &str) -> Error {
    if code == PROCEDURE_NOT_FOUND {
        if let Some(endpoint) = message.split('`').nth(1) {
            return Error::UnknownEndpoint {
                endpoint: endpoint.to_string(),
                hint: "Please ensure that the Graph Data Science plugin is installed and that \
                       the procedure exists in the installed version."
                    .to_string(),
            };
        }
    }

    Error::Query {
        code: code.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_server_error_unknown_procedure() {
        let err = map_server_error(
            PROCEDURE_NOT_FOUND,
            "There is no procedure with the name `gds.debug.sysInfo` registered for this database instance.",
        );
        match err {
            Error::UnknownEndpoint { endpoint, .. } => assert_eq!(endpoint, "gds.debug.sysInfo"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_server_error_other() {
        let err = map_server_error("Neo.ClientError.Statement.SyntaxError", "Invalid input");
        assert!(matches!(err, Error::Query { ref code, .. } if code.ends_with("SyntaxError")));
    }
}
