//! # Service Configuration
//!
//! The input records this layer consumes at process start. Configuration is
//! owned by the embedding application; these types only define the shape it
//! hands over and a small JSON loading convenience.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Static description of one remote backend service. Immutable once loaded.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ServiceConfig {
    /// Protobuf package the service lives in (e.g. `user`).
    pub package: String,
    /// Service name within the package (e.g. `UserService`).
    pub service: String,
    /// Optional version sub-namespace (`v1` resolves `user.v1.UserService`).
    #[serde(default)]
    pub version: Option<String>,
    /// Path to the binary `FileDescriptorSet` describing the service.
    pub descriptor_path: PathBuf,
    /// Network address of the backend (e.g. `localhost:50051`).
    pub address: String,
    /// Connect with TLS using the system's root certificates. Plaintext by
    /// default.
    #[serde(default)]
    pub tls: bool,
}

/// Top-level configuration for the gateway's client layer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GatewayConfig {
    /// Component name stamped into the metadata of every outgoing call.
    pub component: String,
    /// Default per-call deadline in milliseconds. Calls run without a
    /// deadline when absent.
    #[serde(default)]
    pub default_timeout_ms: Option<u64>,
    pub services: Vec<ServiceConfig>,
}

impl GatewayConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_ms.map(Duration::from_millis)
    }
}
