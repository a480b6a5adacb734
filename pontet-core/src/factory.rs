//! # Client Factory
//!
//! Turns declarative [`ServiceConfig`] records into live, connected client
//! stubs. The factory resolves the configured service inside its descriptor
//! set and binds a lazily-connecting channel to the configured address; it
//! holds no state beyond the descriptor cache it loads through.
use crate::{
    config::ServiceConfig,
    descriptor::{DescriptorLoadError, DescriptorLoader},
    error::{AppError, ErrorKind},
    registry::ClientKey,
};
use prost_reflect::{DescriptorPool, ServiceDescriptor};
use std::collections::HashMap;
use std::time::Duration;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use uuid::Uuid;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("Failed to load descriptor for '{package}.{service}': {source}")]
    DescriptorLoad {
        package: String,
        service: String,
        #[source]
        source: DescriptorLoadError,
    },
    #[error("Service '{service}' not found in package '{namespace}'")]
    ServiceNotFound { namespace: String, service: String },
    #[error("Invalid address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },
    #[error("Failed to configure TLS for '{address}': {source}")]
    Tls {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },
}

impl From<ClientBuildError> for AppError {
    fn from(err: ClientBuildError) -> Self {
        let kind = match &err {
            ClientBuildError::DescriptorLoad { .. } => ErrorKind::DescriptorLoad,
            ClientBuildError::ServiceNotFound { .. } => ErrorKind::ServiceNotFound,
            ClientBuildError::InvalidAddress { .. } | ClientBuildError::Tls { .. } => {
                ErrorKind::Internal
            }
        };
        let message = err.to_string();
        AppError::new(kind, message).with_source(err)
    }
}

/// An opaque, connected client stub bound to one backend address.
///
/// Cloning is cheap and shares the underlying channel. The registry
/// guarantees at most one handle is constructed per [`ClientKey`]; the
/// construction-time `id` is what tests and diagnostics observe that by.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: Uuid,
    service: ServiceDescriptor,
    channel: Channel,
    address: String,
}

impl ClientHandle {
    /// Construction-time identity, stable across clones.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Descriptor of the service this stub is bound to.
    pub fn service(&self) -> &ServiceDescriptor {
        &self.service
    }

    /// Address the underlying channel is bound to.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }
}

/// Builds [`ClientHandle`]s from [`ServiceConfig`] records.
#[derive(Debug, Default)]
pub struct ClientFactory {
    loader: DescriptorLoader,
}

impl ClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the configured service in its descriptor set and binds a
    /// channel to the configured address.
    ///
    /// The channel connects lazily: construction never performs network
    /// I/O, and connection failures surface on the first call as an
    /// `unavailable` status.
    pub fn create_client(&self, config: &ServiceConfig) -> Result<ClientHandle, ClientBuildError> {
        let pool = self.loader.load(&config.descriptor_path).map_err(|source| {
            ClientBuildError::DescriptorLoad {
                package: config.package.clone(),
                service: config.service.clone(),
                source,
            }
        })?;

        let service = resolve_service(&pool, config)?;
        let channel = open_channel(config)?;

        tracing::debug!(
            service = service.full_name(),
            address = %config.address,
            "constructed gRPC client stub"
        );

        Ok(ClientHandle {
            id: Uuid::new_v4(),
            service,
            channel,
            address: config.address.clone(),
        })
    }

    /// Builds every configured client, keyed by [`ClientKey`].
    ///
    /// All-or-nothing: if any single config fails, the whole batch fails.
    /// Registry population happens at startup and a partial registry is
    /// unsafe to serve from.
    pub fn create_clients(
        &self,
        configs: &[ServiceConfig],
    ) -> Result<HashMap<ClientKey, ClientHandle>, ClientBuildError> {
        let mut clients = HashMap::with_capacity(configs.len());
        for config in configs {
            let key = ClientKey::new(&config.package, &config.service);
            clients.insert(key, self.create_client(config)?);
        }
        Ok(clients)
    }
}

/// Resolves `{package}.{service}`, or `{package}.{version}.{service}` when a
/// version sub-namespace is configured.
fn resolve_service(
    pool: &DescriptorPool,
    config: &ServiceConfig,
) -> Result<ServiceDescriptor, ClientBuildError> {
    let namespace = match &config.version {
        Some(version) => format!("{}.{}", config.package, version),
        None => config.package.clone(),
    };
    let full_name = format!("{}.{}", namespace, config.service);

    pool.get_service_by_name(&full_name)
        .ok_or_else(|| ClientBuildError::ServiceNotFound {
            namespace,
            service: config.service.clone(),
        })
}

fn open_channel(config: &ServiceConfig) -> Result<Channel, ClientBuildError> {
    let uri = if config.address.contains("://") {
        config.address.clone()
    } else if config.tls {
        format!("https://{}", config.address)
    } else {
        format!("http://{}", config.address)
    };

    let mut endpoint = Endpoint::from_shared(uri)
        .map_err(|source| ClientBuildError::InvalidAddress {
            address: config.address.clone(),
            source,
        })?
        .connect_timeout(CONNECT_TIMEOUT)
        .tcp_nodelay(true);

    if config.tls {
        endpoint = endpoint
            .tls_config(ClientTlsConfig::new().with_native_roots())
            .map_err(|source| ClientBuildError::Tls {
                address: config.address.clone(),
                source,
            })?;
    }

    Ok(endpoint.connect_lazy())
}
