//! Server-side progress reporting for long-running procedure calls.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use super::QueryRunner;
use crate::call::CallParameters;
use crate::error::Result;
use crate::frame::DataFrame;
use crate::server_version::ServerVersion;

const JOB_ID_KEY: &str = "jobId";

/// Makes sure the call's config carries a `jobId` and returns it.
///
/// Calls without a `config` parameter cannot be tracked and yield `None`.
pub(crate) fn ensure_job_id(params: &mut CallParameters) -> Option<String> {
    let config = params.get_mut("config")?.as_object_mut()?;

    if let Some(Value::String(existing)) = config.get(JOB_ID_KEY) {
        return Some(existing.clone());
    }

    let job_id = uuid::Uuid::new_v4().to_string();
    config.insert(JOB_ID_KEY.to_string(), Value::String(job_id.clone()));
    Some(job_id)
}

/// Drives `call` to completion, logging the job's progress every `interval`.
///
/// Progress polling never fails the call: poll errors are logged at debug
/// level and polling continues.
pub(crate) async fn with_progress_logging<F>(
    runner: &dyn QueryRunner,
    job_id: &str,
    endpoint: &str,
    interval: Duration,
    call: F,
) -> Result<DataFrame>
where
    F: Future<Output = Result<DataFrame>> + Send,
{
    tokio::pin!(call);
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; the job is not registered yet.
    ticker.tick().await;

    let mut last_logged: Option<String> = None;
    loop {
        tokio::select! {
            result = &mut call => return result,
            _ = ticker.tick() => {
                match poll_progress(runner, job_id).await {
                    Ok(Some(progress)) if last_logged.as_deref() != Some(progress.as_str()) => {
                        info!(endpoint, job_id, "{progress}");
                        last_logged = Some(progress);
                    }
                    Ok(_) => {}
                    Err(e) => debug!(endpoint, job_id, error = %e, "progress poll failed"),
                }
            }
        }
    }
}

async fn poll_progress(runner: &dyn QueryRunner, job_id: &str) -> Result<Option<String>> {
    let endpoint = list_progress_endpoint(runner.server_version());
    let params = CallParameters::new().with("job_id", job_id);
    let frame = runner
        .call_procedure(endpoint, params, &["taskName", "progress"], false)
        .await?;

    Ok(frame.row(0).map(|row| {
        let task = row.get("taskName").and_then(Value::as_str).unwrap_or("task");
        let progress = row.get("progress").and_then(Value::as_str).unwrap_or("n/a");
        format!("{task}: {progress}")
    }))
}

/// The progress listing procedure moved out of beta in GDS 2.5.
pub(crate) fn list_progress_endpoint(version: ServerVersion) -> &'static str {
    if version >= ServerVersion::new(2, 5, 0) {
        "gds.listProgress"
    } else {
        "gds.beta.listProgress"
    }
}
