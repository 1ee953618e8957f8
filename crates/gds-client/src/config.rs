//! Client configuration.
//!
//! Values are layered with `figment`: built-in defaults, then an optional
//! TOML file, then `GDS_`-prefixed environment variables. Nested keys use a
//! double underscore, e.g. `GDS_AURA__CLIENT_ID`.

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "gds.toml";

/// Default Aura API base URL.
pub const DEFAULT_AURA_BASE_URL: &str = "https://api.neo4j.io";

/// Connection settings for the database and the Aura API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// HTTP endpoint of the database (Query API), e.g. `http://localhost:7474`.
    pub uri: String,
    /// Database user.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Target database; the server default is used when unset.
    pub database: Option<String>,
    /// Timeout for a single request in seconds.
    pub request_timeout_secs: u64,
    /// Interval between progress polls for logged procedure calls.
    pub progress_poll_secs: u64,
    /// Aura API credentials, needed only for GDS sessions.
    pub aura: Option<AuraConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            uri: "http://localhost:7474".to_string(),
            username: "neo4j".to_string(),
            password: String::new(),
            database: None,
            request_timeout_secs: 60,
            progress_poll_secs: 2,
            aura: None,
        }
    }
}

/// Aura API client credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuraConfig {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Tenant (project) id; required when the credentials see several tenants.
    #[serde(default)]
    pub tenant: Option<String>,
    /// API base URL.
    #[serde(default = "default_aura_base_url")]
    pub base_url: String,
    /// Timeout of a single Aura API request, in seconds.
    #[serde(default = "default_aura_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_aura_base_url() -> String {
    DEFAULT_AURA_BASE_URL.to_string()
}

fn default_aura_timeout_secs() -> u64 {
    60
}

impl AuraConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ClientConfig {
    /// Loads configuration from defaults, `gds.toml` (if present) and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Loads configuration with an explicit TOML file path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("GDS_").split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Creates a configuration for `uri` with basic-auth credentials.
    #[must_use]
    pub fn new(uri: &str, username: &str, password: &str) -> Self {
        Self {
            uri: uri.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            ..Self::default()
        }
    }

    /// Selects the target database (builder pattern).
    #[must_use]
    pub fn with_database(mut self, database: &str) -> Self {
        self.database = Some(database.to_string());
        self
    }

    /// Checks that the configuration can be used to connect.
    pub fn validate(&self) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(Error::Config("uri must not be empty".to_string()));
        }
        if !(self.uri.starts_with("http://") || self.uri.starts_with("https://")) {
            return Err(Error::Config(format!(
                "uri '{}' must use the http or https scheme",
                self.uri
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if let Some(aura) = &self.aura {
            if aura.client_id.is_empty() || aura.client_secret.is_empty() {
                return Err(Error::Config(
                    "aura.client_id and aura.client_secret must both be set".to_string(),
                ));
            }
            if aura.request_timeout_secs == 0 {
                return Err(Error::Config(
                    "aura.request_timeout_secs must be greater than 0".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Progress poll interval as a [`Duration`].
    #[must_use]
    pub fn progress_poll_interval(&self) -> Duration {
        Duration::from_secs(self.progress_poll_secs.max(1))
    }

    /// Whether the connection uses TLS.
    #[must_use]
    pub fn encrypted(&self) -> bool {
        self.uri.starts_with("https://")
    }
}
