//! Offline runner that records statements instead of sending them.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::graph_constructor::{CypherGraphConstructor, GraphConstructor};
use super::{map_server_error, QueryRunner};
use crate::call::CallParameters;
use crate::error::Result;
use crate::frame::DataFrame;
use crate::server_version::ServerVersion;

#[derive(Clone)]
enum Canned {
    Frame(DataFrame),
    Failure { code: String, message: String },
}

#[derive(Default)]
struct State {
    queries: Vec<String>,
    params: Vec<CallParameters>,
    databases: Vec<Option<String>>,
    canned: Vec<(String, Canned)>,
    database: Option<String>,
}

/// Records every statement and answers from canned results.
///
/// A canned result is keyed by a query prefix; the longest matching prefix
/// wins and unmatched statements return an empty frame. Useful for unit tests
/// and for dry runs that show which procedures a workflow would call.
#[derive(Clone)]
pub struct CollectingQueryRunner {
    state: Arc<Mutex<State>>,
    server_version: ServerVersion,
}

impl CollectingQueryRunner {
    /// Creates a runner pretending to be the given GDS version.
    #[must_use]
    pub fn new(server_version: ServerVersion) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            server_version,
        }
    }

    /// Answers statements starting with `prefix` with `frame` (builder pattern).
    #[must_use]
    pub fn with_result(self, prefix: &str, frame: DataFrame) -> Self {
        self.add_result(prefix, frame);
        self
    }

    /// Answers statements starting with `prefix` with `frame`.
    pub fn add_result(&self, prefix: &str, frame: DataFrame) {
        self.state
            .lock()
            .canned
            .push((prefix.to_string(), Canned::Frame(frame)));
    }

    /// Fails statements starting with `prefix` with a server error (builder pattern).
    #[must_use]
    pub fn with_failure(self, prefix: &str, code: &str, message: &str) -> Self {
        self.state.lock().canned.push((
            prefix.to_string(),
            Canned::Failure {
                code: code.to_string(),
                message: message.to_string(),
            },
        ));
        self
    }

    /// All recorded statements, oldest first.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.state.lock().queries.clone()
    }

    /// The most recent statement.
    #[must_use]
    pub fn last_query(&self) -> Option<String> {
        self.state.lock().queries.last().cloned()
    }

    /// Parameters of the most recent statement.
    #[must_use]
    pub fn last_params(&self) -> Option<CallParameters> {
        self.state.lock().params.last().cloned()
    }

    /// Explicit database override of the most recent statement.
    #[must_use]
    pub fn last_database(&self) -> Option<String> {
        self.state.lock().databases.last().cloned().flatten()
    }
}

#[async_trait]
impl QueryRunner for CollectingQueryRunner {
    async fn run_cypher(
        &self,
        query: &str,
        params: Option<CallParameters>,
        database: Option<&str>,
    ) -> Result<DataFrame> {
        let mut state = self.state.lock();
        state.queries.push(query.to_string());
        state.params.push(params.unwrap_or_default());
        state.databases.push(database.map(String::from));

        let answer = state
            .canned
            .iter()
            .filter(|(prefix, _)| query.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, canned)| canned.clone());

        match answer {
            Some(Canned::Frame(frame)) => Ok(frame),
            Some(Canned::Failure { code, message }) => Err(map_server_error(&code, &message)),
            None => Ok(DataFrame::default()),
        }
    }

    fn server_version(&self) -> ServerVersion {
        self.server_version
    }

    fn database(&self) -> Option<String> {
        self.state.lock().database.clone()
    }

    fn set_database(&self, database: &str) {
        self.state.lock().database = Some(database.to_string());
    }

    fn encrypted(&self) -> bool {
        false
    }

    fn create_graph_constructor(
        &self,
        graph_name: &str,
        concurrency: usize,
        undirected_relationship_types: Vec<String>,
    ) -> Box<dyn GraphConstructor> {
        Box::new(CypherGraphConstructor::new(
            Arc::new(self.clone()),
            graph_name,
            concurrency,
            undirected_relationship_types,
        ))
    }
}
