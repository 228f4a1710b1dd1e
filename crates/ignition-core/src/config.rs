//! # Runtime Configuration
//!
//! Struct-per-section configuration with defaults, optional TOML file
//! loading, and `IGNITION_*` environment overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Transport server configuration.
    pub server: ServerConfig,
    /// Dashboard server configuration.
    pub dashboard: DashboardConfig,
    /// Module discovery configuration.
    pub modules: ModuleConfig,
}

impl RuntimeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `IGNITION_*` environment overrides on top of the current values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("IGNITION_SERVER_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(port) = std::env::var("IGNITION_DASHBOARD_PORT") {
            if let Ok(p) = port.parse() {
                self.dashboard.port = p;
            }
        }
        if let Ok(path) = std::env::var("IGNITION_MODULE_PATH") {
            self.modules.search_paths = std::env::split_paths(&path).collect();
        }
    }

    /// Validate the effective configuration.
    ///
    /// Rejected at configure time, before any service starts:
    /// - transport and dashboard sharing a non-zero port
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dashboard.enabled
            && self.server.port != 0
            && self.server.port == self.dashboard.port
        {
            return Err(ConfigError::PortCollision {
                port: self.server.port,
            });
        }
        Ok(())
    }
}

/// Transport server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the transport listener.
    pub bind_addr: String,
    /// Transport listening port. Port 0 binds an ephemeral port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 50051,
        }
    }
}

/// Dashboard server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Whether the dashboard server is bound at all.
    pub enabled: bool,
    /// Bind address for the dashboard listener.
    pub bind_addr: String,
    /// Dashboard listening port.
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_addr: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

/// Module discovery configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Directories walked for `modules.toml` manifests, in order.
    pub search_paths: Vec<PathBuf>,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            search_paths: vec![PathBuf::from(".")],
        }
    }
}

/// Configuration errors. All are fatal to the bootstrap.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}")]
    Read {
        /// Path of the unreadable file.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML.
    #[error("failed to parse config file {path}")]
    Parse {
        /// Path of the malformed file.
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Transport and dashboard servers were given the same port.
    #[error("transport and dashboard servers share port {port}")]
    PortCollision {
        /// The colliding port.
        port: u16,
    },
}
