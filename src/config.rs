//! readlog configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// First reading year offered by default
pub const DEFAULT_FIRST_YEAR: i32 = 2020;

/// Last reading year offered by default
pub const DEFAULT_LAST_YEAR: i32 = 2026;

/// Main readlog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadlogConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Dashboard configuration
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl ReadlogConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for the record store
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: crate::reads::ReadStore::default_dir(),
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Reading years offered as filters, all active on start
    pub reading_years: Vec<i32>,

    /// Base URL of a remote record store; `None` reads the local store
    pub backend_url: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            reading_years: (DEFAULT_FIRST_YEAR..=DEFAULT_LAST_YEAR).collect(),
            backend_url: None,
        }
    }
}
