//! # Client Registry
//!
//! Process-wide cache mapping [`ClientKey`]s to connected [`ClientHandle`]s.
//! Constructed once at startup and passed by reference to consumers; all
//! statically configured services are built eagerly, and keys requested
//! later are built on first access from the configuration of their package.
use crate::{
    config::ServiceConfig,
    error::{AppError, ErrorKind},
    factory::{ClientBuildError, ClientFactory, ClientHandle},
};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tokio::sync::RwLock;

/// Composite identity of a client stub: `(package, service)`.
///
/// Renders as `{package}_{service}`. Packages may contain underscores;
/// service names follow Protobuf naming conventions and must not, so
/// parsing splits on the last underscore and `to_string`/`parse` round-trip
/// exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey {
    package: String,
    service: String,
}

impl ClientKey {
    pub fn new(package: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            service: service.into(),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.package, self.service)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid client key '{0}', expected '{{package}}_{{service}}'")]
pub struct InvalidClientKey(String);

impl FromStr for ClientKey {
    type Err = InvalidClientKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('_') {
            Some((package, service)) if !package.is_empty() && !service.is_empty() => {
                Ok(Self::new(package, service))
            }
            _ => Err(InvalidClientKey(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("gRPC client for '{0}' not found")]
    UnknownClient(String),
    #[error(transparent)]
    InvalidKey(#[from] InvalidClientKey),
    #[error(transparent)]
    Build(#[from] ClientBuildError),
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Build(inner) => inner.into(),
            RegistryError::UnknownClient(key) => AppError::new(
                ErrorKind::UnknownClient,
                format!("gRPC client for '{key}' not found"),
            ),
            RegistryError::InvalidKey(inner) => {
                let message = inner.to_string();
                AppError::new(ErrorKind::UnknownClient, message).with_source(inner)
            }
        }
    }
}

/// Lazily-populated, read-mostly cache of client handles.
#[derive(Debug)]
pub struct ClientRegistry {
    factory: ClientFactory,
    configs: Vec<ServiceConfig>,
    clients: RwLock<HashMap<ClientKey, ClientHandle>>,
}

impl ClientRegistry {
    /// Eagerly constructs a handle for every configured service.
    ///
    /// Fails on the first config that cannot be built: a partially populated
    /// registry is unsafe to serve from, so startup aborts instead.
    pub fn new(
        factory: ClientFactory,
        configs: Vec<ServiceConfig>,
    ) -> Result<Self, ClientBuildError> {
        let clients = factory.create_clients(&configs)?;
        tracing::info!(count = clients.len(), "client registry populated");
        Ok(Self {
            factory,
            configs,
            clients: RwLock::new(clients),
        })
    }

    /// Returns the handle for `key`, constructing and caching it on first
    /// access when the key was not pre-registered.
    ///
    /// A miss takes the write lock and re-checks before constructing, so
    /// concurrent first accesses for the same key coalesce into a single
    /// construction and every waiter receives the same handle. Construction
    /// itself is synchronous (channels connect lazily), so the lock is never
    /// held across a suspension point.
    pub async fn get_client(&self, key: &ClientKey) -> Result<ClientHandle, RegistryError> {
        if let Some(handle) = self.clients.read().await.get(key) {
            return Ok(handle.clone());
        }

        let mut clients = self.clients.write().await;
        if let Some(handle) = clients.get(key) {
            return Ok(handle.clone());
        }

        let config = self
            .configs
            .iter()
            .find(|config| config.package == key.package())
            .ok_or_else(|| RegistryError::UnknownClient(key.to_string()))?;
        let config = ServiceConfig {
            service: key.service().to_string(),
            ..config.clone()
        };

        let handle = self.factory.create_client(&config)?;
        tracing::debug!(key = %key, address = %config.address, "lazily constructed gRPC client");
        clients.insert(key.clone(), handle.clone());

        Ok(handle)
    }

    /// String-keyed variant of [`ClientRegistry::get_client`].
    pub async fn get_by_name(&self, key: &str) -> Result<ClientHandle, RegistryError> {
        self.get_client(&key.parse()?).await
    }
}
