//! Client for the Aura management API.
//!
//! Used to create, inspect and delete the instances backing GDS sessions.
//! Authentication uses OAuth client credentials; the access token is cached
//! until shortly before it expires.

mod models;


use std::time::{Duration, Instant};

use parking_lot::Mutex;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

pub use models::{
    InstanceCreateDetails, InstanceDetails, InstanceSpecificDetails, TenantDetails,
};
use models::{
    ApiResponse, AuraAuthToken, CreateInstanceRequest, TenantResponse, TenantSummary,
    TokenResponse,
};

use crate::config::AuraConfig;
use crate::error::{Error, Result};

/// Instance type used for GDS sessions.
pub const SESSION_INSTANCE_TYPE: &str = "professional-ds";

/// Neo4j major version of created instances.
const INSTANCE_VERSION: &str = "5";

/// Aura management API client.
pub struct AuraApi {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    tenant: Option<String>,
    token: Mutex<Option<AuraAuthToken>>,
}

impl AuraApi {
    /// Creates a client from Aura credentials.
    pub fn new(config: &AuraConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Connection(format!("failed to build Aura API client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            tenant: config.tenant.clone(),
            token: Mutex::new(None),
        })
    }

    /// Extracts the Aura instance id from a connection URI.
    ///
    /// `neo4j+s://1a2b3c4d.databases.neo4j.io` yields `1a2b3c4d`. URIs
    /// without a host yield an empty string.
    #[must_use]
    pub fn extract_id(uri: &str) -> String {
        let without_scheme = uri.split_once("://").map_or(uri, |(_, rest)| rest);
        let authority = without_scheme.split('/').next().unwrap_or_default();
        let host = authority
            .rsplit_once('@')
            .map_or(authority, |(_, host)| host);
        let host = host.split(':').next().unwrap_or_default();
        host.split('.').next().unwrap_or_default().to_string()
    }

    async fn access_token(&self) -> Result<String> {
        let cached = self
            .token
            .lock()
            .as_ref()
            .filter(|t| !t.is_expired())
            .map(|t| t.access_token.clone());
        if let Some(token) = cached {
            return Ok(token);
        }

        debug!("Updating Aura OAuth token");
        let resp = self
            .client
            .post(format!("{}/oauth/token", self.base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "Aura token request failed: {status} - {body}"
            )));
        }

        let token = AuraAuthToken::from_response(resp.json::<TokenResponse>().await?);
        let access_token = token.access_token.clone();
        *self.token.lock() = Some(token);
        Ok(access_token)
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.access_token().await?;
        Ok(self
            .client
            .request(method, format!("{}/v1{}", self.base_url, path))
            .bearer_auth(token)
            .header("Content-Type", "application/json"))
    }

    async fn check(resp: Response) -> Result<Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let message = resp.text().await.unwrap_or_default();
        Err(Error::Aura {
            status: status.as_u16(),
            message,
        })
    }

    async fn data<T: DeserializeOwned>(resp: Response) -> Result<T> {
        Ok(Self::check(resp).await?.json::<ApiResponse<T>>().await?.data)
    }

    async fn tenant_id(&self) -> Result<String> {
        if let Some(tenant) = &self.tenant {
            return Ok(tenant.clone());
        }

        let resp = self.request(Method::GET, "/tenants").await?.send().await?;
        let tenants: Vec<TenantSummary> = Self::data(resp).await?;
        match tenants.as_slice() {
            [tenant] => Ok(tenant.id.clone()),
            _ => Err(Error::Config(format!(
                "the Aura credentials give access to {} tenants, set aura.tenant to pick one",
                tenants.len()
            ))),
        }
    }

    /// Regions where the tenant may create session instances.
    pub async fn tenant_details(&self) -> Result<TenantDetails> {
        let tenant_id = self.tenant_id().await?;
        let resp = self
            .request(Method::GET, &format!("/tenants/{tenant_id}"))
            .await?
            .send()
            .await?;
        let tenant: TenantResponse = Self::data(resp).await?;
        Ok(TenantDetails::from_response(tenant, SESSION_INSTANCE_TYPE))
    }

    /// Creates a session instance.
    pub async fn create_instance(
        &self,
        name: &str,
        memory: &str,
        cloud_provider: &str,
        region: &str,
    ) -> Result<InstanceCreateDetails> {
        let tenant_id = self.tenant_id().await?;
        info!("Creating Aura instance {} ({}) in {}/{}", name, memory, cloud_provider, region);

        let body = CreateInstanceRequest {
            name,
            memory,
            version: INSTANCE_VERSION,
            region,
            instance_type: SESSION_INSTANCE_TYPE,
            tenant_id: &tenant_id,
            cloud_provider,
        };
        let resp = self
            .request(Method::POST, "/instances")
            .await?
            .json(&body)
            .send()
            .await?;
        Self::data(resp).await
    }

    /// Deletes an instance. Returns `None` if it does not exist.
    pub async fn delete_instance(&self, instance_id: &str) -> Result<Option<InstanceSpecificDetails>> {
        info!("Deleting Aura instance {}", instance_id);
        let resp = self
            .request(Method::DELETE, &format!("/instances/{instance_id}"))
            .await?
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::data(resp).await.map(Some)
    }

    /// All instances visible to the credentials.
    pub async fn list_instances(&self) -> Result<Vec<InstanceDetails>> {
        let resp = self.request(Method::GET, "/instances").await?.send().await?;
        Self::data(resp).await
    }

    /// Details of one instance, `None` if it does not exist.
    pub async fn list_instance(&self, instance_id: &str) -> Result<Option<InstanceSpecificDetails>> {
        let resp = self
            .request(Method::GET, &format!("/instances/{instance_id}"))
            .await?
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::data(resp).await.map(Some)
    }

    /// Polls an instance until it is running and returns its connection URL.
    pub async fn wait_for_instance_running(
        &self,
        instance_id: &str,
        sleep: Duration,
        max_wait: Duration,
    ) -> Result<String> {
        let started = Instant::now();
        loop {
            let instance = self.list_instance(instance_id).await?.ok_or_else(|| {
                Error::Session(format!("instance '{instance_id}' does not exist"))
            })?;

            if instance.is_running() {
                return Ok(instance.connection_url);
            }
            if instance.is_failed() {
                return Err(Error::Session(format!(
                    "instance '{instance_id}' is {}",
                    instance.status
                )));
            }
            if started.elapsed() >= max_wait {
                return Err(Error::Session(format!(
                    "instance '{instance_id}' is not running after {}s (status: {})",
                    max_wait.as_secs(),
                    instance.status
                )));
            }

            debug!("Instance {} is {}, waiting", instance_id, instance.status);
            tokio::time::sleep(sleep).await;
        }
    }
}

impl std::fmt::Debug for AuraApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuraApi")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("tenant", &self.tenant)
            .finish_non_exhaustive()
    }
}
