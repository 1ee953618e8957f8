//! System endpoints: licensing, debugging, progress, backups and settings.

use serde_json::Value;

use crate::call::{config_map, CallParameters};
use crate::error::{Error, Result};
use crate::frame::{DataFrame, Row};
use crate::namespace::EndpointContext;
use crate::server_version::ServerVersion;

const SYS_INFO_PROC: &str = "gds.debug.sysInfo";

const LICENSE_FROM_SYS_INFO: &str = "CALL gds.debug.sysInfo() \
     YIELD key, value \
     WHERE key = 'gdsEdition' \
     RETURN CASE value WHEN 'Licensed' THEN true ELSE false END AS isLicensed";

/// `gds.debug`.
#[derive(Debug, Clone)]
pub struct DebugProcRunner {
    ctx: EndpointContext,
}

impl DebugProcRunner {
    /// Key/value table describing the server and the GDS installation.
    pub async fn sys_info(&self) -> Result<DataFrame> {
        self.ctx
            .call(&self.ctx.endpoint("sysInfo"), CallParameters::new())
            .await
    }

    /// Arrow Flight server status.
    pub async fn arrow(&self) -> Result<Row> {
        self.ctx
            .call(&self.ctx.endpoint("arrow"), CallParameters::new())
            .await?
            .squeeze_row()
    }
}

/// `gds.license`.
#[derive(Debug, Clone)]
pub struct LicenseProcRunner {
    ctx: EndpointContext,
}

impl LicenseProcRunner {
    /// License state of the installation.
    pub async fn state(&self) -> Result<Row> {
        self.ctx
            .call(&self.ctx.endpoint("state"), CallParameters::new())
            .await?
            .squeeze_row()
    }
}

/// System endpoints on the `gds` namespace.
#[derive(Debug, Clone)]
pub struct SystemEndpoints {
    ctx: EndpointContext,
}

impl SystemEndpoints {
    /// Wraps the root `gds` context.
    #[must_use]
    pub fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    fn require_2_5(&self, segment: &str) -> Result<()> {
        self.ctx
            .require_since(&self.ctx.endpoint(segment), 2, 5, 0)
    }

    /// Whether the installation runs with an Enterprise license.
    ///
    /// Before 2.5 the edition is read from `gds.debug.sysInfo`. AuraDS does
    /// not expose that procedure but is always licensed.
    pub async fn is_licensed(&self) -> Result<bool> {
        let query = if self.ctx.server_version() >= ServerVersion::new(2, 5, 0) {
            "RETURN gds.isLicensed() AS isLicensed"
        } else {
            LICENSE_FROM_SYS_INFO
        };

        match self.ctx.runner().run_cypher(query, None, None).await {
            Ok(frame) => frame.scalar()?.as_bool().ok_or_else(|| {
                Error::UnexpectedResult("license check did not return a boolean".to_string())
            }),
            Err(Error::UnknownEndpoint { endpoint, .. }) if endpoint == SYS_INFO_PROC => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// `gds.license`.
    #[must_use]
    pub fn license(&self) -> LicenseProcRunner {
        LicenseProcRunner {
            ctx: self.ctx.child("license"),
        }
    }

    /// `gds.debug`.
    #[must_use]
    pub fn debug(&self) -> DebugProcRunner {
        DebugProcRunner {
            ctx: self.ctx.child("debug"),
        }
    }

    /// Backs up graphs and models to the configured backup location.
    pub async fn backup(&self, config: Value) -> Result<DataFrame> {
        self.require_2_5("backup")?;
        backup_restore(&self.ctx, "backup", config).await
    }

    /// Restores graphs and models from a backup.
    pub async fn restore(&self, config: Value) -> Result<DataFrame> {
        self.require_2_5("restore")?;
        backup_restore(&self.ctx, "restore", config).await
    }

    /// Progress of running jobs, or of one job.
    pub async fn list_progress(&self, job_id: Option<&str>) -> Result<DataFrame> {
        self.require_2_5("listProgress")?;
        list_progress(&self.ctx, job_id).await
    }

    /// Resource usage of the server.
    pub async fn system_monitor(&self) -> Result<Row> {
        self.require_2_5("systemMonitor")?;
        system_monitor(&self.ctx).await
    }

    /// Warnings and hints logged for the current user.
    pub async fn user_log(&self) -> Result<DataFrame> {
        self.require_2_5("userLog")?;
        user_log(&self.ctx).await
    }
}

async fn backup_restore(ctx: &EndpointContext, segment: &str, config: Value) -> Result<DataFrame> {
    ctx.call(
        &ctx.endpoint(segment),
        CallParameters::new().with("config", config_map(config)?),
    )
    .await
}

async fn list_progress(ctx: &EndpointContext, job_id: Option<&str>) -> Result<DataFrame> {
    let params = match job_id.filter(|id| !id.is_empty()) {
        Some(id) => CallParameters::new().with("job_id", id),
        None => CallParameters::new(),
    };
    ctx.call(&ctx.endpoint("listProgress"), params).await
}

async fn system_monitor(ctx: &EndpointContext) -> Result<Row> {
    ctx.call(&ctx.endpoint("systemMonitor"), CallParameters::new())
        .await?
        .squeeze_row()
}

async fn user_log(ctx: &EndpointContext) -> Result<DataFrame> {
    ctx.call(&ctx.endpoint("userLog"), CallParameters::new())
        .await
}

/// System endpoints on `gds.beta`.
#[derive(Debug, Clone)]
pub struct SystemBetaEndpoints {
    ctx: EndpointContext,
}

impl SystemBetaEndpoints {
    /// Wraps the `gds.beta` context.
    #[must_use]
    pub fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    /// Progress of running jobs, or of one job.
    pub async fn list_progress(&self, job_id: Option<&str>) -> Result<DataFrame> {
        list_progress(&self.ctx, job_id).await
    }
}

/// System endpoints on `gds.alpha`.
#[derive(Debug, Clone)]
pub struct SystemAlphaEndpoints {
    ctx: EndpointContext,
}

impl SystemAlphaEndpoints {
    /// Wraps the `gds.alpha` context.
    #[must_use]
    pub fn new(ctx: EndpointContext) -> Self {
        Self { ctx }
    }

    /// Warnings and hints logged for the current user.
    pub async fn user_log(&self) -> Result<DataFrame> {
        user_log(&self.ctx).await
    }

    /// Resource usage of the server.
    pub async fn system_monitor(&self) -> Result<Row> {
        system_monitor(&self.ctx).await
    }

    /// Backs up graphs and models.
    pub async fn backup(&self, config: Value) -> Result<DataFrame> {
        backup_restore(&self.ctx, "backup", config).await
    }

    /// Restores graphs and models from a backup.
    pub async fn restore(&self, config: Value) -> Result<DataFrame> {
        backup_restore(&self.ctx, "restore", config).await
    }

    /// `gds.alpha.config`.
    #[must_use]
    pub fn config(&self) -> ConfigProcRunner {
        ConfigProcRunner {
            ctx: self.ctx.child("config"),
        }
    }
}

/// `gds.alpha.config`: server-side configuration defaults and limits.
#[derive(Debug, Clone)]
pub struct ConfigProcRunner {
    ctx: EndpointContext,
}

impl ConfigProcRunner {
    /// Default values applied to procedure configurations.
    #[must_use]
    pub fn defaults(&self) -> ConfigSettingsRunner {
        ConfigSettingsRunner {
            ctx: self.ctx.child("defaults"),
        }
    }

    /// Upper bounds enforced on procedure configurations.
    #[must_use]
    pub fn limits(&self) -> ConfigSettingsRunner {
        ConfigSettingsRunner {
            ctx: self.ctx.child("limits"),
        }
    }
}

/// `gds.alpha.config.defaults` and `gds.alpha.config.limits`.
#[derive(Debug, Clone)]
pub struct ConfigSettingsRunner {
    ctx: EndpointContext,
}

impl ConfigSettingsRunner {
    /// Sets `key` to `value`, globally or for `username`.
    pub async fn set(&self, key: &str, value: Value, username: Option<&str>) -> Result<()> {
        let mut params = CallParameters::new().with("key", key).with("value", value);
        if let Some(username) = username {
            params.insert("username", username);
        }
        self.ctx.call(&self.ctx.endpoint("set"), params).await?;
        Ok(())
    }

    /// Lists the settings matching `config` (e.g. `{"key": ..., "username": ...}`).
    pub async fn list(&self, config: Value) -> Result<DataFrame> {
        self.ctx
            .call(
                &self.ctx.endpoint("list"),
                CallParameters::new().with("config", config_map(config)?),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::query_runner::{CollectingQueryRunner, PROCEDURE_NOT_FOUND};

    fn system(runner: &CollectingQueryRunner) -> SystemEndpoints {
        SystemEndpoints::new(EndpointContext::new(Arc::new(runner.clone()), "gds"))
    }

    fn scalar(column: &str, value: Value) -> DataFrame {
        DataFrame::from_columns(vec![(column, vec![value])]).unwrap()
    }

    #[tokio::test]
    async fn test_is_licensed_uses_function_since_2_5() {
        let runner = CollectingQueryRunner::new(ServerVersion::new(2, 5, 0))
            .with_result("RETURN gds.isLicensed()", scalar("isLicensed", json!(true)));

        assert!(system(&runner).is_licensed().await.unwrap());
        assert_eq!(
            runner.last_query().as_deref(),
            Some("RETURN gds.isLicensed() AS isLicensed")
        );
    }

    #[tokio::test]
    async fn test_is_licensed_reads_sys_info_before_2_5() {
        let runner = CollectingQueryRunner::new(ServerVersion::new(2, 4, 0))
            .with_result("CALL gds.debug.sysInfo()", scalar("isLicensed", json!(false)));

        assert!(!system(&runner).is_licensed().await.unwrap());
    }

    #[tokio::test]
    async fn test_is_licensed_on_aura_ds() {
        let runner = CollectingQueryRunner::new(ServerVersion::new(2, 4, 0)).with_failure(
            "CALL gds.debug.sysInfo()",
            PROCEDURE_NOT_FOUND,
            "There is no procedure with the name `gds.debug.sysInfo` registered for this database instance.",
        );

        assert!(system(&runner).is_licensed().await.unwrap());
    }

    #[tokio::test]
    async fn test_direct_endpoints_require_2_5() {
        let runner = CollectingQueryRunner::new(ServerVersion::new(2, 4, 0));
        let system = system(&runner);

        for err in [
            system.backup(json!({})).await.unwrap_err(),
            system.list_progress(None).await.unwrap_err(),
            system.user_log().await.unwrap_err(),
        ] {
            assert!(matches!(err, Error::IncompatibleServerVersion { .. }));
        }
        assert!(runner.queries().is_empty());
    }

    #[tokio::test]
    async fn test_list_progress_with_and_without_job() {
        let runner = CollectingQueryRunner::new(ServerVersion::new(2, 5, 0));
        let system = system(&runner);

        system.list_progress(None).await.unwrap();
        assert_eq!(runner.last_query().as_deref(), Some("CALL gds.listProgress()"));

        system.list_progress(Some("abc")).await.unwrap();
        assert_eq!(
            runner.last_query().as_deref(),
            Some("CALL gds.listProgress($job_id)")
        );

        let beta = SystemBetaEndpoints::new(EndpointContext::new(Arc::new(runner.clone()), "gds.beta"));
        beta.list_progress(None).await.unwrap();
        assert_eq!(
            runner.last_query().as_deref(),
            Some("CALL gds.beta.listProgress()")
        );
    }

    #[tokio::test]
    async fn test_alpha_config_settings() {
        let runner = CollectingQueryRunner::new(ServerVersion::new(2, 3, 0));
        let alpha = SystemAlphaEndpoints::new(EndpointContext::new(Arc::new(runner.clone()), "gds.alpha"));

        alpha
            .config()
            .defaults()
            .set("concurrency", json!(8), Some("alice"))
            .await
            .unwrap();
        assert_eq!(
            runner.last_query().as_deref(),
            Some("CALL gds.alpha.config.defaults.set($key, $value, $username)")
        );

        alpha.config().limits().list(json!(null)).await.unwrap();
        assert_eq!(
            runner.last_query().as_deref(),
            Some("CALL gds.alpha.config.limits.list($config)")
        );
    }

    #[tokio::test]
    async fn test_debug_and_license() {
        let runner = CollectingQueryRunner::new(ServerVersion::new(2, 5, 0)).with_result(
            "CALL gds.license.state",
            DataFrame::from_columns(vec![
                ("isLicensed", vec![json!(false)]),
                ("details", vec![json!("No valid GDS license specified.")]),
            ])
            .unwrap(),
        );
        let system = system(&runner);

        let state = system.license().state().await.unwrap();
        assert_eq!(state["isLicensed"], json!(false));

        system.debug().sys_info().await.unwrap();
        assert_eq!(runner.last_query().as_deref(), Some("CALL gds.debug.sysInfo()"));
    }
}
