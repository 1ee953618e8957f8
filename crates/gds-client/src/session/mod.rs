//! GDS sessions: dedicated GDS instances on Aura attached to a database.
//!
//! A session is an Aura instance named `gds-session-<name>`. Graphs are
//! projected from the database into the session, algorithms run on the
//! session, and Cypher keeps going to the database.

mod aura_gds;
mod connection;
mod sizes;

#[cfg(test)]
mod sessions_tests;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

pub use aura_gds::AuraGraphDataScience;
pub use connection::{query_api_uri, DbmsConnectionInfo};
pub use sizes::SessionMemory;

use crate::aura::{AuraApi, InstanceDetails, InstanceSpecificDetails};
use crate::call::CallParameters;
use crate::config::{AuraConfig, ClientConfig};
use crate::error::{Error, Result};
use crate::graph_data_science::GraphDataScience;
use crate::query_runner::{HttpQueryRunner, QueryRunner, SessionQueryRunner};
use crate::server_version::ServerVersion;
use connection::closest_region;

/// Prefix of Aura instance names that back GDS sessions.
pub const SESSION_NAME_PREFIX: &str = "gds-session-";

/// User every session is created with.
pub const SESSION_USER: &str = "neo4j";

const PASSWORD_CHANGE: &str = "ALTER CURRENT USER SET PASSWORD FROM $old_pw TO $new_pw";

/// Aura instance name of the session `session_name`.
#[must_use]
pub fn instance_name(session_name: &str) -> String {
    format!("{SESSION_NAME_PREFIX}{session_name}")
}

/// Session name of an instance, `None` if the instance is not a session.
#[must_use]
pub fn session_name(instance_name: &str) -> Option<&str> {
    instance_name.strip_prefix(SESSION_NAME_PREFIX)
}

/// A session as listed by [`GdsSessions::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Session name, without the instance prefix.
    pub name: String,
    /// Memory size, e.g. `8GB`.
    pub size: String,
    /// Aura instance type.
    pub instance_type: String,
    /// Lifecycle status of the instance.
    pub status: String,
}

impl SessionInfo {
    fn from_instance(instance: InstanceSpecificDetails) -> Self {
        Self {
            name: session_name(&instance.name)
                .unwrap_or(&instance.name)
                .to_string(),
            size: instance.memory,
            instance_type: instance.instance_type,
            status: instance.status,
        }
    }
}

/// Cloud provider and region to create sessions in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudLocation {
    /// Cloud provider, e.g. `gcp`.
    pub cloud_provider: String,
    /// Region, e.g. `europe-west1`.
    pub region: String,
}

impl CloudLocation {
    /// Creates a location.
    #[must_use]
    pub fn new(cloud_provider: &str, region: &str) -> Self {
        Self {
            cloud_provider: cloud_provider.to_string(),
            region: region.to_string(),
        }
    }
}

/// Creates, connects to and deletes GDS sessions.
#[derive(Debug, Clone)]
pub struct GdsSessions {
    api: Arc<AuraApi>,
    location: Option<CloudLocation>,
    poll_interval: Duration,
    max_wait: Duration,
}

impl GdsSessions {
    /// Creates a manager authenticating with the given Aura credentials.
    pub fn new(config: &AuraConfig) -> Result<Self> {
        Ok(Self {
            api: Arc::new(AuraApi::new(config)?),
            location: None,
            poll_interval: Duration::from_secs(10),
            max_wait: Duration::from_secs(300),
        })
    }

    /// Sets how often and how long to poll for a session to start (builder pattern).
    #[must_use]
    pub fn with_wait(mut self, poll_interval: Duration, max_wait: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.max_wait = max_wait;
        self
    }

    /// The Aura API client.
    #[must_use]
    pub fn api(&self) -> &AuraApi {
        &self.api
    }

    /// Location used for sessions attached to self-managed databases.
    #[must_use]
    pub fn cloud_location(&self) -> Option<&CloudLocation> {
        self.location.as_ref()
    }

    /// Sets the location for sessions of self-managed databases.
    ///
    /// Fails unless the tenant can create sessions there.
    pub async fn set_cloud_location(&mut self, cloud_provider: &str, region: &str) -> Result<()> {
        let tenant = self.api.tenant_details().await?;
        let Some(regions) = tenant.regions_per_provider.get(cloud_provider) else {
            let providers: Vec<&str> = tenant.regions_per_provider.keys().map(String::as_str).collect();
            return Err(Error::InvalidArgument(format!(
                "Cloud provider '{cloud_provider}' not available for tenant. Available providers: {}",
                providers.join(", ")
            )));
        };
        if !regions.contains(region) {
            let options: Vec<&str> = regions.iter().map(String::as_str).collect();
            return Err(Error::InvalidArgument(format!(
                "Region '{region}' not available for cloud provider '{cloud_provider}'. Available regions: {}",
                options.join(", ")
            )));
        }

        self.location = Some(CloudLocation::new(cloud_provider, region));
        Ok(())
    }

    /// Connects to the session `session_name`, creating it if needed.
    ///
    /// New sessions are placed next to the Aura database they serve, or at
    /// the configured cloud location for self-managed databases. The initial
    /// session password is replaced by the database password.
    pub async fn get_or_create(
        &self,
        session_name: &str,
        size: SessionMemory,
        db_connection: &DbmsConnectionInfo,
    ) -> Result<AuraGraphDataScience> {
        if let Some(existing) = self.try_connect(session_name, db_connection).await? {
            return Ok(existing);
        }

        let location = self.location_for(db_connection).await?;
        let created = self
            .api
            .create_instance(
                &instance_name(session_name),
                size.as_str(),
                &location.cloud_provider,
                &location.region,
            )
            .await?;

        let gds_url = self
            .api
            .wait_for_instance_running(&created.id, self.poll_interval, self.max_wait)
            .await
            .map_err(|e| Error::Session(format!("Failed to create session '{session_name}': {e}")))?;

        change_initial_password(&gds_url, &created.username, &created.password, &db_connection.password)
            .await?;
        info!("Created GDS session {} ({})", session_name, size);

        self.construct_client(session_name, &gds_url, db_connection)
            .await
    }

    /// Deletes the session. Returns `true` if a session was deleted.
    pub async fn delete(&self, session_name: &str) -> Result<bool> {
        let candidates = self.matching_instances(session_name).await?;
        match candidates.as_slice() {
            [] => Ok(false),
            [instance] => Ok(self.api.delete_instance(&instance.id).await?.is_some()),
            _ => Err(ambiguous(session_name, &candidates)),
        }
    }

    /// All sessions visible to the credentials.
    pub async fn list(&self) -> Result<Vec<SessionInfo>> {
        let mut sessions = Vec::new();
        for instance in self.api.list_instances().await? {
            if session_name(&instance.name).is_none() {
                continue;
            }
            if let Some(details) = self.api.list_instance(&instance.id).await? {
                sessions.push(SessionInfo::from_instance(details));
            }
        }
        Ok(sessions)
    }

    async fn matching_instances(&self, session_name: &str) -> Result<Vec<InstanceDetails>> {
        let name = instance_name(session_name);
        Ok(self
            .api
            .list_instances()
            .await?
            .into_iter()
            .filter(|i| i.name == name)
            .collect())
    }

    async fn try_connect(
        &self,
        session_name: &str,
        db_connection: &DbmsConnectionInfo,
    ) -> Result<Option<AuraGraphDataScience>> {
        let candidates = self.matching_instances(session_name).await?;
        let instance = match candidates.as_slice() {
            [] => return Ok(None),
            [instance] => instance,
            _ => return Err(ambiguous(session_name, &candidates)),
        };

        let gds_url = self
            .api
            .wait_for_instance_running(&instance.id, self.poll_interval, self.max_wait)
            .await
            .map_err(|e| Error::Session(format!("Failed to connect to session '{session_name}': {e}")))?;

        self.construct_client(session_name, &gds_url, db_connection)
            .await
            .map(Some)
    }

    async fn location_for(&self, db_connection: &DbmsConnectionInfo) -> Result<CloudLocation> {
        let db_instance_id = AuraApi::extract_id(&db_connection.uri);
        let db_instance = if db_instance_id.is_empty() {
            None
        } else {
            self.api.list_instance(&db_instance_id).await?
        };

        match db_instance {
            Some(db) => {
                let tenant = self.api.tenant_details().await?;
                let region = tenant
                    .regions_per_provider
                    .get(&db.cloud_provider)
                    .and_then(|regions| closest_region(&db.region, regions))
                    .ok_or_else(|| {
                        Error::Session(format!(
                            "Tenant '{}' cannot create GDS sessions at cloud provider '{}'",
                            tenant.id, db.cloud_provider
                        ))
                    })?;
                Ok(CloudLocation::new(&db.cloud_provider, &region))
            }
            None => self.location.clone().ok_or_else(|| {
                Error::InvalidArgument(
                    "set a cloud location to create sessions for self-managed databases".to_string(),
                )
            }),
        }
    }

    async fn construct_client(
        &self,
        session_name: &str,
        gds_url: &str,
        db_connection: &DbmsConnectionInfo,
    ) -> Result<AuraGraphDataScience> {
        let gds_config = ClientConfig::new(&query_api_uri(gds_url), SESSION_USER, &db_connection.password);
        let gds_runner = HttpQueryRunner::connect(gds_config).await?;

        let db_config = ClientConfig::new(
            &db_connection.query_api_uri(),
            &db_connection.username,
            &db_connection.password,
        );
        let db_runner = HttpQueryRunner::with_server_version(db_config, gds_runner.server_version())?;

        let runner = SessionQueryRunner::new(Arc::new(gds_runner), Arc::new(db_runner));
        Ok(AuraGraphDataScience::new(
            GraphDataScience::from_runner(Arc::new(runner)),
            session_name,
            self.clone(),
        ))
    }
}

async fn change_initial_password(
    gds_url: &str,
    username: &str,
    initial_password: &str,
    new_password: &str,
) -> Result<()> {
    let config = ClientConfig::new(&query_api_uri(gds_url), username, initial_password);
    let runner = HttpQueryRunner::with_server_version(config, ServerVersion::new(0, 0, 0))?;
    let params = CallParameters::new()
        .with("old_pw", initial_password)
        .with("new_pw", new_password);
    runner
        .run_cypher(PASSWORD_CHANGE, Some(params), Some("system"))
        .await?;
    Ok(())
}

fn ambiguous(session_name: &str, instances: &[InstanceDetails]) -> Error {
    let candidates: Vec<String> = instances
        .iter()
        .map(|i| format!("{} ({})", session_name, i.id))
        .collect();
    Error::Session(format!(
        "Expected to find exactly one GDS session with name '{session_name}', but found {}",
        candidates.join(", ")
    ))
}
