//! Configuration types for ytm-backend

use crate::error::{Error, Result};
use crate::options::JobOptions;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf};
use utoipa::ToSchema;

/// Default port the backend listens on
pub const DEFAULT_PORT: u16 = 55001;

/// Extraction engine configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct EngineConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub binary_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if `binary_path` is not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Base options every job starts from
    #[serde(default)]
    pub base: JobOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            search_path: true,
            base: JobOptions::default(),
        }
    }
}

/// Download job behavior
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JobsConfig {
    /// Stop a job's engine run when its response stream is dropped (default: true)
    ///
    /// When false, jobs run to completion even if nobody reads their events.
    #[serde(default = "default_true")]
    pub cancel_on_disconnect: bool,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            cancel_on_disconnect: true,
        }
    }
}

/// Main configuration for the backend
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Extraction engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Download job settings
    #[serde(default)]
    pub jobs: JobsConfig,

    /// API and external server integration
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;

        let config: Config = serde_json::from_str(&contents).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.engine.base.format.trim().is_empty() {
            return Err(Error::Config {
                message: "format selector must not be empty".to_string(),
                key: Some("engine.base.format".to_string()),
            });
        }

        if self.engine.base.output_template.trim().is_empty() {
            return Err(Error::Config {
                message: "output template must not be empty".to_string(),
                key: Some("engine.base.output_template".to_string()),
            });
        }

        if self.engine.binary_path.is_none() && !self.engine.search_path {
            return Err(Error::Config {
                message: "no yt-dlp binary configured and PATH search is disabled".to_string(),
                key: Some("engine.binary_path".to_string()),
            });
        }

        Ok(())
    }
}

/// Server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:55001)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
