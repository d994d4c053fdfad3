//! Connection configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via PULSEWIRE_CONFIG)
//! 3. Environment variables

use pulsewire_protocol::MAX_PAYLOAD_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default read buffer size (8 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Minimum read buffer size (1 KiB).
pub const MIN_READ_BUFFER_SIZE: usize = 1024;

/// Maximum read buffer size (1 MiB).
pub const MAX_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Environment variable naming the YAML config file.
pub const CONFIG_ENV: &str = "PULSEWIRE_CONFIG";

/// Settings for a [`Connection`](crate::Connection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Largest packet payload accepted from the server.
    pub max_payload_size: u32,
    /// Read buffer size for socket reads.
    pub read_buffer_size: usize,
    /// Time to wait for a reply; `None` waits forever.
    pub request_timeout_ms: Option<u64>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_SIZE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            request_timeout_ms: None,
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_payload_size(mut self, size: u32) -> Self {
        self.max_payload_size = size.min(MAX_PAYLOAD_SIZE);
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.clamp(MIN_READ_BUFFER_SIZE, MAX_READ_BUFFER_SIZE);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Returns the request timeout as Duration.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();
        Ok(config.normalized())
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: ConnectionConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config.normalized())
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.normalized()
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`; unparsable values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(size) = lookup("PULSEWIRE_MAX_PAYLOAD") {
            if let Ok(n) = size.parse() {
                self.max_payload_size = n;
            }
        }

        if let Some(size) = lookup("PULSEWIRE_READ_BUFFER") {
            if let Ok(n) = size.parse() {
                self.read_buffer_size = n;
            }
        }

        if let Some(timeout) = lookup("PULSEWIRE_REQUEST_TIMEOUT_MS") {
            if timeout.is_empty() || timeout == "0" {
                self.request_timeout_ms = None;
            } else if let Ok(ms) = timeout.parse() {
                self.request_timeout_ms = Some(ms);
            }
        }
    }

    /// Clamps every field into its supported range.
    pub(crate) fn normalized(self) -> Self {
        let (payload, buffer) = (self.max_payload_size, self.read_buffer_size);
        self.with_max_payload_size(payload)
            .with_read_buffer_size(buffer)
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {err}", path = .0.display(), err = .1)]
    IoError(PathBuf, std::io::Error),

    #[error("failed to parse config file '{path}': {err}", path = .0.display(), err = .1)]
    ParseError(PathBuf, String),
}
