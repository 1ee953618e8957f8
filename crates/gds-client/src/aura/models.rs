//! Aura API payloads.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Envelope of every Aura API response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub(crate) data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) expires_in: u64,
}

/// OAuth access token with its expiry.
#[derive(Debug, Clone)]
pub(crate) struct AuraAuthToken {
    pub(crate) access_token: String,
    expires_at: Instant,
}

impl AuraAuthToken {
    /// Tokens are refreshed this long before they actually expire.
    const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

    pub(crate) fn from_response(response: TokenResponse) -> Self {
        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(Self::EXPIRY_MARGIN);
        Self {
            access_token: response.access_token,
            expires_at: Instant::now() + lifetime,
        }
    }

    pub(crate) fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Summary of an instance as returned by the instance listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDetails {
    /// Instance id.
    pub id: String,
    /// Instance name.
    pub name: String,
    /// Owning tenant.
    pub tenant_id: String,
    /// Cloud provider, e.g. `gcp`.
    pub cloud_provider: String,
}

/// Full description of a single instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpecificDetails {
    /// Instance id.
    pub id: String,
    /// Instance name.
    pub name: String,
    /// Owning tenant.
    pub tenant_id: String,
    /// Cloud provider, e.g. `gcp`.
    pub cloud_provider: String,
    /// Lifecycle status, e.g. `creating` or `running`.
    pub status: String,
    /// Connection URL, empty until the instance is reachable.
    #[serde(default)]
    pub connection_url: String,
    /// Memory size, e.g. `8GB`.
    pub memory: String,
    /// Region, e.g. `europe-west1`.
    #[serde(default)]
    pub region: String,
    /// Instance type, e.g. `professional-ds`.
    #[serde(rename = "type", default)]
    pub instance_type: String,
}

impl InstanceSpecificDetails {
    /// Whether the instance accepts connections.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }

    /// Whether the instance will never reach the running state.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.status.as_str(), "failed" | "destroying" | "destroyed")
    }
}

/// Result of creating an instance, including its initial credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceCreateDetails {
    /// Instance id.
    pub id: String,
    /// Instance name.
    #[serde(default)]
    pub name: String,
    /// Owning tenant.
    pub tenant_id: String,
    /// Cloud provider.
    pub cloud_provider: String,
    /// Initial user.
    pub username: String,
    /// Initial password, to be rotated on first use.
    pub password: String,
    /// Connection URL, when already assigned.
    #[serde(default)]
    pub connection_url: String,
}

/// Instance creation request body.
#[derive(Debug, Serialize)]
pub(crate) struct CreateInstanceRequest<'a> {
    pub(crate) name: &'a str,
    pub(crate) memory: &'a str,
    pub(crate) version: &'a str,
    pub(crate) region: &'a str,
    #[serde(rename = "type")]
    pub(crate) instance_type: &'a str,
    pub(crate) tenant_id: &'a str,
    pub(crate) cloud_provider: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TenantSummary {
    pub(crate) id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TenantResponse {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) instance_configurations: Vec<InstanceConfiguration>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InstanceConfiguration {
    pub(crate) cloud_provider: String,
    pub(crate) region: String,
    #[serde(rename = "type")]
    pub(crate) instance_type: String,
}

/// Where a tenant may create instances of the session type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantDetails {
    /// Tenant id.
    pub id: String,
    /// Available regions keyed by cloud provider.
    pub regions_per_provider: BTreeMap<String, BTreeSet<String>>,
}

impl TenantDetails {
    pub(crate) fn from_response(response: TenantResponse, instance_type: &str) -> Self {
        let mut regions_per_provider: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for configuration in response
            .instance_configurations
            .into_iter()
            .filter(|c| c.instance_type == instance_type)
        {
            regions_per_provider
                .entry(configuration.cloud_provider)
                .or_default()
                .insert(configuration.region);
        }

        Self {
            id: response.id,
            regions_per_provider,
        }
    }
}
