//! Relay configuration.
//!
//! One JSON file (`relay.json`) describes both halves of the relay: the shared
//! endpoint, the server's durable log and buffer, and the client's buffer and
//! health-check cadence. Every field has a serde default so a partial file is
//! valid, and a missing file means "all defaults".

use crate::error::config::ConfigError;

use common::ErrorLocation;
use common::wire::{DEFAULT_BUFFER_SIZE, DEFAULT_HOST, DEFAULT_PORT};

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "relay.json";
const CONFIG_VERSION: u32 = 1;
const DEFAULT_LOG_FILE: &str = "server_log.csv";
const DEFAULT_HEALTH_CHECK_INTERVAL_MS: u64 = 2000;

pub const ENV_HOST: &str = "RELAY_HOST";
pub const ENV_PORT: &str = "RELAY_PORT";
pub const ENV_LOG_FILE: &str = "RELAY_LOG_FILE";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl EndpointConfig {
    /// `host:port` form accepted by both `TcpListener::bind` and `TcpStream::connect`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            buffer_size: default_buffer_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default = "default_health_check_interval_ms")]
    pub health_check_interval_ms: u64,
}

impl ClientConfig {
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            health_check_interval_ms: default_health_check_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub endpoint: EndpointConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            endpoint: EndpointConfig::default(),
            server: ServerConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}
fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}
fn default_health_check_interval_ms() -> u64 {
    DEFAULT_HEALTH_CHECK_INTERVAL_MS
}

// ============================================
// IMPLEMENTATION
// ============================================

impl RelayConfig {
    /// Load config from {config_dir}/relay.json.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file does not exist.
    /// Returns `Err(ConfigError)` if the file exists but is unreadable or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: RelayConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Apply `RELAY_HOST`, `RELAY_PORT` and `RELAY_LOG_FILE` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup, then re-validate.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            info!("{ENV_HOST} override: {host}");
            self.endpoint.host = host;
        }

        if let Some(port) = lookup(ENV_PORT) {
            self.endpoint.port = port.parse().map_err(|e| ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Invalid {ENV_PORT} '{port}': {e}"),
            })?;
            info!("{ENV_PORT} override: {}", self.endpoint.port);
        }

        if let Some(log_file) = lookup(ENV_LOG_FILE) {
            info!("{ENV_LOG_FILE} override: {log_file}");
            self.server.log_file = PathBuf::from(log_file);
        }

        self.validate()
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        if self.endpoint.host.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "endpoint.host cannot be empty".to_string(),
            });
        }

        if self.server.buffer_size == 0 || self.client.buffer_size == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "buffer_size must be greater than 0".to_string(),
            });
        }

        if self.client.health_check_interval_ms == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "client.health_check_interval_ms must be greater than 0".to_string(),
            });
        }

        if self.server.log_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "server.log_file cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}
