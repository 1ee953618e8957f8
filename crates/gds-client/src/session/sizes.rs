use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Memory size of a GDS session instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionMemory {
    /// 4 GB.
    Gb4,
    /// 8 GB.
    Gb8,
    /// 16 GB.
    Gb16,
    /// 24 GB.
    Gb24,
    /// 32 GB.
    Gb32,
    /// 48 GB.
    Gb48,
    /// 64 GB.
    Gb64,
    /// 96 GB.
    Gb96,
    /// 128 GB.
    Gb128,
    /// 192 GB.
    Gb192,
    /// 256 GB.
    Gb256,
}

impl SessionMemory {
    /// All sizes, smallest first.
    pub const ALL: [SessionMemory; 11] = [
        Self::Gb4,
        Self::Gb8,
        Self::Gb16,
        Self::Gb24,
        Self::Gb32,
        Self::Gb48,
        Self::Gb64,
        Self::Gb96,
        Self::Gb128,
        Self::Gb192,
        Self::Gb256,
    ];

    /// Size as the Aura API spells it, e.g. `8GB`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gb4 => "4GB",
            Self::Gb8 => "8GB",
            Self::Gb16 => "16GB",
            Self::Gb24 => "24GB",
            Self::Gb32 => "32GB",
            Self::Gb48 => "48GB",
            Self::Gb64 => "64GB",
            Self::Gb96 => "96GB",
            Self::Gb128 => "128GB",
            Self::Gb192 => "192GB",
            Self::Gb256 => "256GB",
        }
    }
}

impl fmt::Display for SessionMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMemory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == normalized)
            .ok_or_else(|| {
                let options: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                Error::InvalidArgument(format!(
                    "unknown session size '{s}', expected one of {}",
                    options.join(", ")
                ))
            })
    }
}
