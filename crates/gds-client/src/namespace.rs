//! Namespace routing.
//!
//! Each endpoint runner owns an [`EndpointContext`]: the query runner, the
//! dotted procedure namespace built so far and the server version. Accessors
//! that descend into a sub-namespace return a runner with a child context, so
//! `gds.beta().graph().project()` resolves to `gds.beta.graph.project`.

use std::sync::Arc;

use crate::call::CallParameters;
use crate::error::Result;
use crate::frame::DataFrame;
use crate::query_runner::QueryRunner;
use crate::server_version::{Compatibility, ServerVersion};

/// Runner, namespace and server version shared by an endpoint runner.
#[derive(Clone)]
pub struct EndpointContext {
    runner: Arc<dyn QueryRunner>,
    namespace: String,
    server_version: ServerVersion,
}

impl EndpointContext {
    /// Creates a root context, usually for the `gds` namespace.
    #[must_use]
    pub fn new(runner: Arc<dyn QueryRunner>, namespace: &str) -> Self {
        let server_version = runner.server_version();
        Self {
            runner,
            namespace: namespace.to_string(),
            server_version,
        }
    }

    /// Context for the sub-namespace `segment`.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            namespace: self.endpoint(segment),
            server_version: self.server_version,
        }
    }

    /// The dotted namespace, e.g. `gds.graph.sample`.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Fully qualified name of `segment` inside this namespace.
    #[must_use]
    pub fn endpoint(&self, segment: &str) -> String {
        format!("{}.{segment}", self.namespace)
    }

    /// The query runner.
    #[must_use]
    pub fn runner(&self) -> &Arc<dyn QueryRunner> {
        &self.runner
    }

    /// GDS version of the server.
    #[must_use]
    pub fn server_version(&self) -> ServerVersion {
        self.server_version
    }

    /// Fails if `endpoint` is not available on the server's GDS version.
    pub fn require(&self, endpoint: &str, compatibility: Compatibility) -> Result<()> {
        compatibility.check(endpoint, self.server_version)
    }

    /// Fails unless the server runs at least `major.minor.patch`.
    pub fn require_since(&self, endpoint: &str, major: u32, minor: u32, patch: u32) -> Result<()> {
        self.require(
            endpoint,
            Compatibility::since(ServerVersion::new(major, minor, patch)),
        )
    }

    /// Calls `endpoint` with the given parameters.
    pub async fn call(&self, endpoint: &str, params: CallParameters) -> Result<DataFrame> {
        self.runner.call_procedure(endpoint, params, &[], false).await
    }

    /// Calls `endpoint` and reports server-side progress while it runs.
    pub async fn call_logged(&self, endpoint: &str, params: CallParameters) -> Result<DataFrame> {
        self.runner.call_procedure(endpoint, params, &[], true).await
    }

    /// Calls `endpoint` yielding only the given columns.
    pub async fn call_yielding(
        &self,
        endpoint: &str,
        params: CallParameters,
        yields: &[&str],
    ) -> Result<DataFrame> {
        self.runner
            .call_procedure(endpoint, params, yields, false)
            .await
    }
}

impl std::fmt::Debug for EndpointContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointContext")
            .field("namespace", &self.namespace)
            .field("server_version", &self.server_version)
            .finish_non_exhaustive()
    }
}
