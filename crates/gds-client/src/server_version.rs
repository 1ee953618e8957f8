//! GDS server versions and endpoint compatibility gates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Version of the GDS plugin installed on the server.
///
/// Only the numeric `major.minor.patch` triple takes part in comparisons;
/// pre-release suffixes such as `-alpha01` are discarded while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServerVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl ServerVersion {
    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses a version string as reported by `gds.version()`.
    ///
    /// Accepts `"2.5.0"`, `"2.5.0-alpha01"` and `"2.6"` (patch defaults to 0).
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument(format!("'{raw}' is not a valid GDS version"));

        let numeric = raw.trim().split(['-', '+']).next().unwrap_or_default();
        let mut parts = numeric.split('.');

        let mut next_component = |required: bool| -> Result<u32> {
            match parts.next() {
                Some(p) if !p.is_empty() => p.parse::<u32>().map_err(|_| invalid()),
                Some(_) => Err(invalid()),
                None if required => Err(invalid()),
                None => Ok(0),
            }
        };

        let major = next_component(true)?;
        let minor = next_component(true)?;
        let patch = next_component(false)?;

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self::new(major, minor, patch))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ServerVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Version window in which an endpoint is available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Compatibility {
    /// Oldest supported version (inclusive).
    pub min_inclusive: Option<ServerVersion>,
    /// First unsupported version (exclusive).
    pub max_exclusive: Option<ServerVersion>,
}

impl Compatibility {
    /// Endpoint available from `version` on.
    #[must_use]
    pub const fn since(version: ServerVersion) -> Self {
        Self {
            min_inclusive: Some(version),
            max_exclusive: None,
        }
    }

    /// Endpoint available only before `version`.
    #[must_use]
    pub const fn before(version: ServerVersion) -> Self {
        Self {
            min_inclusive: None,
            max_exclusive: Some(version),
        }
    }

    /// Endpoint available from `min` on, and only before `max`.
    #[must_use]
    pub const fn between(min: ServerVersion, max: ServerVersion) -> Self {
        Self {
            min_inclusive: Some(min),
            max_exclusive: Some(max),
        }
    }

    /// Returns `true` if `version` falls inside the window.
    #[must_use]
    pub fn allows(&self, version: ServerVersion) -> bool {
        self.min_inclusive.is_none_or(|min| version >= min)
            && self.max_exclusive.is_none_or(|max| version < max)
    }

    /// Fails with [`Error::IncompatibleServerVersion`] if `version` is outside the window.
    pub fn check(&self, endpoint: &str, version: ServerVersion) -> Result<()> {
        if self.allows(version) {
            return Ok(());
        }

        Err(Error::IncompatibleServerVersion {
            endpoint: endpoint.to_string(),
            server_version: version.to_string(),
            requirement: self.to_string(),
        })
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min_inclusive, self.max_exclusive) {
            (Some(min), Some(max)) => write!(f, "{min} <= GDS < {max}"),
            (Some(min), None) => write!(f, "GDS >= {min}"),
            (None, Some(max)) => write!(f, "GDS < {max}"),
            (None, None) => write!(f, "any GDS version"),
        }
    }
}
