//! # Application Error Model
//!
//! Every failure this layer can produce is expressed as an [`AppError`]: a
//! `kind` drawn from a closed taxonomy, a human-readable message, an optional
//! structured details payload and the original underlying failure kept around
//! for diagnostics.
//!
//! The translation from transport status codes to error kinds lives here as
//! well ([`ErrorKind::from_code`] and the [`From<tonic::Status>`] impl). The
//! mapping is total: codes without a dedicated entry fall through to
//! [`ErrorKind::Internal`] with the original code preserved in the details.
//!
//! Upstream layers (HTTP/GraphQL formatting) decide what to show users; this
//! module only guarantees that no raw transport error ever crosses the
//! boundary unwrapped.
use crate::BoxError;
use serde_json::json;
use std::fmt;
use tonic::metadata::{KeyAndValueRef, MetadataMap};

/// Closed taxonomy of failure categories, independent of the transport's
/// native status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Unauthorized,
    Forbidden,
    ServiceUnavailable,
    GatewayTimeout,
    Internal,
    RequestCancelled,
    TooManyRequests,
    /// A descriptor file could not be read or decoded.
    DescriptorLoad,
    /// A configured service does not exist in its descriptor set.
    ServiceNotFound,
    /// A client was requested for a key with no matching configuration.
    UnknownClient,
}

impl ErrorKind {
    /// Stable identifier exposed to upstream error formatting.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::GatewayTimeout => "GATEWAY_TIMEOUT",
            ErrorKind::Internal => "INTERNAL_SERVER_ERROR",
            ErrorKind::RequestCancelled => "REQUEST_CANCELLED",
            ErrorKind::TooManyRequests => "RESOURCE_EXHAUSTED",
            ErrorKind::DescriptorLoad => "DESCRIPTOR_LOAD_FAILED",
            ErrorKind::ServiceNotFound => "SERVICE_NOT_FOUND",
            ErrorKind::UnknownClient => "UNKNOWN_CLIENT",
        }
    }

    /// The HTTP status upstream layers map this kind to.
    pub fn http_status(self) -> http::StatusCode {
        match self {
            ErrorKind::BadRequest => http::StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => http::StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => http::StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => http::StatusCode::FORBIDDEN,
            ErrorKind::ServiceUnavailable => http::StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::GatewayTimeout => http::StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::RequestCancelled => http::StatusCode::CONFLICT,
            ErrorKind::TooManyRequests => http::StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Internal
            | ErrorKind::DescriptorLoad
            | ErrorKind::ServiceNotFound
            | ErrorKind::UnknownClient => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a transport status code to an error kind.
    ///
    /// The mapping is total and deterministic: every code produces exactly
    /// one kind, and codes without a dedicated entry fall through to
    /// [`ErrorKind::Internal`].
    pub fn from_code(code: tonic::Code) -> Self {
        match code {
            tonic::Code::NotFound => ErrorKind::NotFound,
            tonic::Code::InvalidArgument => ErrorKind::BadRequest,
            tonic::Code::Unauthenticated => ErrorKind::Unauthorized,
            tonic::Code::PermissionDenied => ErrorKind::Forbidden,
            tonic::Code::Unavailable => ErrorKind::ServiceUnavailable,
            tonic::Code::DeadlineExceeded => ErrorKind::GatewayTimeout,
            tonic::Code::Internal | tonic::Code::Unknown => ErrorKind::Internal,
            tonic::Code::Cancelled => ErrorKind::RequestCancelled,
            tonic::Code::ResourceExhausted => ErrorKind::TooManyRequests,
            _ => ErrorKind::Internal,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Structured result of a failed operation in the client layer.
///
/// Never mutated after creation; consumed by upstream error-formatting
/// logic. The original failure is retained in `source` and reachable via
/// [`std::error::Error::source`].
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Option<serde_json::Value>,
    #[source]
    pub source: Option<BoxError>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// A callback that fired with neither an error nor a payload. The
    /// backend violated the protocol; this is never a legitimate empty
    /// result.
    pub(crate) fn empty_response(service: &str, method: &str) -> Self {
        Self::new(
            ErrorKind::Internal,
            format!("empty response received from '{service}/{method}'"),
        )
        .with_details(json!({
            "context": "empty_grpc_response",
            "service": service,
            "method": method,
        }))
    }
}

impl From<tonic::Status> for AppError {
    fn from(status: tonic::Status) -> Self {
        let kind = ErrorKind::from_code(status.code());
        let message = if status.message().is_empty() {
            status.code().description().to_string()
        } else {
            status.message().to_string()
        };

        let mut details = serde_json::Map::new();
        if let Some(metadata) = metadata_json(status.metadata()) {
            details.insert("grpc_metadata".to_string(), metadata);
        }
        // Unmapped codes lose their identity in the fallthrough; keep the
        // original code around for diagnostics.
        let mapped = matches!(
            status.code(),
            tonic::Code::Internal | tonic::Code::Unknown
        );
        if kind == ErrorKind::Internal && !mapped {
            let code = status.code() as i32;
            details.insert("grpc_code".to_string(), json!(code));
            details.insert(
                "grpc_code_description".to_string(),
                json!(status.code().description()),
            );
        }
        let details = (!details.is_empty()).then(|| serde_json::Value::Object(details));

        Self {
            kind,
            message,
            details,
            source: Some(Box::new(status)),
        }
    }
}

/// Collects the ASCII entries of a status' trailing metadata into a JSON
/// object of string arrays. Binary entries are skipped.
fn metadata_json(metadata: &MetadataMap) -> Option<serde_json::Value> {
    let mut map = serde_json::Map::new();
    for entry in metadata.iter() {
        if let KeyAndValueRef::Ascii(key, value) = entry {
            if let Ok(value) = value.to_str() {
                let values = map
                    .entry(key.as_str().to_string())
                    .or_insert_with(|| serde_json::Value::Array(Vec::new()));
                if let Some(values) = values.as_array_mut() {
                    values.push(json!(value));
                }
            }
        }
    }
    (!map.is_empty()).then(|| serde_json::Value::Object(map))
}
