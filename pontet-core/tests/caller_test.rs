use pontet_core::caller::{CallOptions, Caller};
use pontet_core::clients::user::{GetProfileRequest, GetProfileResponse};
use pontet_core::descriptor::DescriptorLoader;
use pontet_core::error::ErrorKind;
use pontet_core::metadata::CallMetadata;
use prost_reflect::ServiceDescriptor;
use std::time::Duration;
use user_service::{AccountServiceServer, FILE_DESCRIPTOR_SET, UserServiceServer};
use user_service_impl::{AccountServiceImpl, UserServiceImpl};


fn service_descriptor(name: &str) -> ServiceDescriptor {
    DescriptorLoader::decode(FILE_DESCRIPTOR_SET)
        .expect("Failed to decode descriptor set")
        .get_service_by_name(name)
        .expect("Service not found")
}

fn user_caller() -> Caller<UserServiceServer<UserServiceImpl>> {
    Caller::from_service(
        service_descriptor("user.v1.UserService"),
        UserServiceServer::new(UserServiceImpl),
        "pontet-gateway",
    )
}

fn account_caller() -> Caller<AccountServiceServer<AccountServiceImpl>> {
    Caller::from_service(
        service_descriptor("user.v1.AccountService"),
        AccountServiceServer::new(AccountServiceImpl),
        "pontet-gateway",
    )
}

#[tokio::test]
async fn test_unary_success_resolves_with_exact_response() {
    let value = user_caller()
        .unary_value(
            "GetProfile",
            serde_json::json!({ "user_id": "abc" }),
            CallMetadata::new(),
            CallOptions::default(),
        )
        .await
        .unwrap();

    let profile = &value["profile"];
    assert_eq!(profile["user_id"], "abc");
    // Field names keep the casing the descriptor declares.
    assert_eq!(profile["display_name"], "Ann");
    assert_eq!(profile["is_verified"], true);
    assert_eq!(profile["roles"], serde_json::json!(["member"]));
    // 64-bit integers are carried as strings to avoid precision loss.
    assert_eq!(profile["login_count"], "42");
    assert_eq!(profile["created_at"], "2023-11-14T22:13:20Z");
}

#[tokio::test]
async fn test_not_found_status_maps_to_not_found_kind() {
    let err = user_caller()
        .unary_value(
            "GetProfile",
            serde_json::json!({ "user_id": "ghost" }),
            CallMetadata::new(),
            CallOptions::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.message.contains("ghost"));
}

#[tokio::test]
async fn test_invalid_argument_status_maps_to_bad_request() {
    let err = user_caller()
        .unary_value(
            "GetProfile",
            serde_json::json!({ "user_id": "" }),
            CallMetadata::new(),
            CallOptions::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::BadRequest);
}

#[tokio::test]
async fn test_method_resolution_accepts_camel_case() {
    let value = user_caller()
        .unary_value(
            "getProfile",
            serde_json::json!({ "user_id": "abc" }),
            CallMetadata::new(),
            CallOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(value["profile"]["display_name"], "Ann");
}

#[tokio::test]
async fn test_unknown_method_is_rejected() {
    let err = user_caller()
        .unary_value(
            "GhostMethod",
            serde_json::json!({}),
            CallMetadata::new(),
            CallOptions::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(err.details.unwrap()["reason"], "method_not_found");
}

#[tokio::test]
async fn test_deadline_maps_to_gateway_timeout() {
    let err = user_caller()
        .unary_value(
            "GetProfile",
            serde_json::json!({ "user_id": "slow" }),
            CallMetadata::new(),
            CallOptions {
                timeout: Some(Duration::from_millis(50)),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::GatewayTimeout);
}

#[tokio::test]
async fn test_default_timeout_applies_when_no_per_call_timeout() {
    let caller = user_caller().with_default_timeout(Duration::from_millis(50));
    let err = caller
        .unary_value(
            "GetProfile",
            serde_json::json!({ "user_id": "slow" }),
            CallMetadata::new(),
            CallOptions::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::GatewayTimeout);
}

#[tokio::test]
async fn test_base_metadata_is_injected() {
    let value = account_caller()
        .unary_value(
            "GetAccount",
            serde_json::json!({ "account_id": "acc-1" }),
            CallMetadata::new(),
            CallOptions::default(),
        )
        .await
        .unwrap();

    let account = &value["account"];
    assert_eq!(account["requested_by"], "pontet-gateway");
    assert_eq!(account["request_ids"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_metadata_merge_is_additive() {
    let mut metadata = CallMetadata::new();
    metadata.append("x-tag", "alpha");
    metadata.append("x-tag", "beta");
    metadata.append("x-request-id", "caller-supplied");

    let value = account_caller()
        .unary_value(
            "GetAccount",
            serde_json::json!({ "account_id": "acc-1" }),
            metadata,
            CallOptions::default(),
        )
        .await
        .unwrap();

    let account = &value["account"];
    assert_eq!(account["tags"], serde_json::json!(["alpha", "beta"]));

    // The base correlation id is kept; the caller's value joins it as a
    // second value instead of replacing it.
    let request_ids = account["request_ids"].as_array().unwrap();
    assert_eq!(request_ids.len(), 2);
    assert_ne!(request_ids[0], "caller-supplied");
    assert_eq!(request_ids[1], "caller-supplied");
}

#[tokio::test]
async fn test_typed_adapter_round_trip() {
    let response: GetProfileResponse = user_caller()
        .unary(
            "GetProfile",
            &GetProfileRequest {
                user_id: "abc".to_string(),
            },
            CallMetadata::new(),
            CallOptions::default(),
        )
        .await
        .unwrap();

    let profile = response.profile.expect("profile");
    assert_eq!(profile.display_name, "Ann");
    assert_eq!(profile.login_count.as_deref(), Some("42"));
    assert_eq!(profile.email.as_deref(), Some("ann@example.com"));
}
