//! Typed facade over the `user` backend service.
use crate::{
    caller::{CallOptions, Caller},
    error::AppError,
    metadata::CallMetadata,
    registry::{ClientKey, ClientRegistry},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Package the user backend registers under.
pub const PACKAGE: &str = "user";
/// Service name within the package.
pub const SERVICE: &str = "UserService";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct GetProfileRequest {
    pub user_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    /// RFC 3339 timestamp, as mapped from `google.protobuf.Timestamp`.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// 64-bit counter, carried as a string to avoid precision loss.
    #[serde(default)]
    pub login_count: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct GetProfileResponse {
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct UpdateProfileRequest {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct UpdateProfileResponse {
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

/// Client for the user backend: obtains the `user_UserService` stub from
/// the registry and exposes awaitable typed methods through the generic
/// call adapter.
#[derive(Debug, Clone)]
pub struct UserClient {
    caller: Caller,
}

impl UserClient {
    /// Registry key of the user backend.
    pub fn key() -> ClientKey {
        ClientKey::new(PACKAGE, SERVICE)
    }

    pub async fn connect(
        registry: &ClientRegistry,
        component: impl Into<String>,
    ) -> Result<Self, AppError> {
        let handle = registry.get_client(&Self::key()).await?;
        Ok(Self {
            caller: Caller::wrap(&handle, component),
        })
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.caller = self.caller.with_default_timeout(timeout);
        self
    }

    pub async fn get_profile(
        &self,
        request: GetProfileRequest,
    ) -> Result<GetProfileResponse, AppError> {
        self.caller
            .unary(
                "GetProfile",
                &request,
                CallMetadata::new(),
                CallOptions::default(),
            )
            .await
    }

    pub async fn update_profile(
        &self,
        request: UpdateProfileRequest,
    ) -> Result<UpdateProfileResponse, AppError> {
        self.caller
            .unary(
                "UpdateProfile",
                &request,
                CallMetadata::new(),
                CallOptions::default(),
            )
            .await
    }
}
