//! # Call Adapter
//!
//! Wraps a client stub into a uniform awaitable facade: every method the
//! service descriptor declares becomes an async call taking a request,
//! optional metadata and optional per-call options, resolving with the
//! response or rejecting with an [`AppError`].
//!
//! The adapter is generic over arbitrary method signatures — no method name
//! is hard-coded anywhere, so new backend services need no adapter changes.
//! On every call it:
//!
//! 1. Builds the outgoing metadata: base set first (correlation id, caller
//!    component, timestamp), invoker-supplied entries appended on top.
//! 2. Invokes the underlying transport with the resolved method descriptor.
//! 3. Resolves with the response when the call succeeds with a payload.
//! 4. Treats a success with an empty payload as a protocol violation by the
//!    backend and rejects with an internal error.
//! 5. Translates every failure into an [`AppError`] — raw transport errors
//!    never escape this boundary.
use crate::{
    BoxError,
    error::{AppError, ErrorKind},
    factory::ClientHandle,
    grpc::client::GrpcClient,
    metadata::CallMetadata,
};
use http_body::Body as HttpBody;
use prost_reflect::{MethodDescriptor, ServiceDescriptor};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tonic::transport::Channel;

#[cfg(test)]
mod response_test;

/// Per-call options supplied by the invoker.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallOptions {
    /// Deadline for this call. Falls back to the adapter's default when
    /// absent; no deadline applies when both are absent.
    pub timeout: Option<Duration>,
}

/// Awaitable facade over one service stub.
#[derive(Debug, Clone)]
pub struct Caller<S = Channel> {
    service: ServiceDescriptor,
    transport: GrpcClient<S>,
    component: String,
    default_timeout: Option<Duration>,
}

impl Caller<Channel> {
    /// Wraps a registry handle into an awaitable facade. `component` names
    /// the caller in the metadata of every outgoing call.
    pub fn wrap(handle: &ClientHandle, component: impl Into<String>) -> Self {
        Self {
            service: handle.service().clone(),
            transport: GrpcClient::new(handle.channel()),
            component: component.into(),
            default_timeout: None,
        }
    }
}

impl<S> Caller<S> {
    /// Applies a default deadline to every call without an explicit timeout.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Full name of the wrapped service.
    pub fn service_name(&self) -> &str {
        self.service.full_name()
    }
}

impl<S> Caller<S>
where
    S: tonic::client::GrpcService<tonic::body::Body> + Clone,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    /// Builds a facade over an existing tonic service. Useful for calling a
    /// server in-process, without a network.
    pub fn from_service(
        service: ServiceDescriptor,
        transport: S,
        component: impl Into<String>,
    ) -> Self {
        Self {
            service,
            transport: GrpcClient::new(transport),
            component: component.into(),
            default_timeout: None,
        }
    }

    /// Invokes `method` with a JSON payload and resolves with the JSON
    /// response.
    pub async fn unary_value(
        &self,
        method: &str,
        payload: serde_json::Value,
        metadata: CallMetadata,
        options: CallOptions,
    ) -> Result<serde_json::Value, AppError> {
        let descriptor = self.method(method)?;

        let mut outgoing = CallMetadata::base(&self.component);
        outgoing.extend(metadata);

        let timeout = options.timeout.or(self.default_timeout);

        let mut transport = self.transport.clone();
        let call = transport.unary(descriptor, payload, &outgoing, timeout);
        let result = match timeout {
            // The deadline travels with the request as `grpc-timeout`, but is
            // also enforced here by cancelling the call future.
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::error!(
                        service = self.service.full_name(),
                        method,
                        "call exceeded its deadline"
                    );
                    return Err(tonic::Status::deadline_exceeded(format!(
                        "'{}/{}' exceeded the {}ms deadline",
                        self.service.full_name(),
                        method,
                        limit.as_millis()
                    ))
                    .into());
                }
            },
            None => call.await,
        };

        match result {
            Ok(Ok(value)) => {
                tracing::debug!(
                    service = self.service.full_name(),
                    method,
                    "gRPC call completed"
                );
                check_unary_response(self.service.full_name(), method, value)
            }
            Ok(Err(status)) => {
                tracing::error!(
                    service = self.service.full_name(),
                    method,
                    code = ?status.code(),
                    details = status.message(),
                    "raw gRPC error"
                );
                Err(status.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Typed form of [`Caller::unary_value`]: one generic adapter for every
    /// method of every service, parameterised over the request and response
    /// types.
    pub async fn unary<Req, Res>(
        &self,
        method: &str,
        request: &Req,
        metadata: CallMetadata,
        options: CallOptions,
    ) -> Result<Res, AppError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let payload = serde_json::to_value(request).map_err(|err| {
            AppError::new(
                ErrorKind::BadRequest,
                format!("request for '{method}' is not serializable"),
            )
            .with_source(err)
        })?;

        let value = self.unary_value(method, payload, metadata, options).await?;

        serde_json::from_value(value).map_err(|err| {
            AppError::new(
                ErrorKind::Internal,
                format!("response of '{method}' did not match the expected shape"),
            )
            .with_source(err)
        })
    }

    /// Resolves a method by name. Accepts the descriptor's exact name and,
    /// failing that, an ASCII-case-insensitive match (`getProfile` for
    /// `GetProfile`), the surface generated stubs historically exposed.
    fn method(&self, name: &str) -> Result<MethodDescriptor, AppError> {
        self.service
            .methods()
            .find(|m| m.name() == name)
            .or_else(|| {
                self.service
                    .methods()
                    .find(|m| m.name().eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| {
                AppError::new(
                    ErrorKind::Internal,
                    format!(
                        "Method '{}' not found on '{}'",
                        name,
                        self.service.full_name()
                    ),
                )
                .with_details(serde_json::json!({ "reason": "method_not_found" }))
            })
    }
}

/// A response with neither an error nor a payload is a protocol violation
/// by the backend, not a legitimate empty result.
fn check_unary_response(
    service: &str,
    method: &str,
    value: serde_json::Value,
) -> Result<serde_json::Value, AppError> {
    if value.is_null() {
        tracing::error!(service, method, "empty response received from gRPC service");
        return Err(AppError::empty_response(service, method));
    }
    Ok(value)
}
