use super::check_unary_response;
use crate::error::ErrorKind;

#[test]
fn non_empty_response_passes_through() {
    let value = serde_json::json!({ "profile": { "user_id": "abc" } });
    let result = check_unary_response("user.v1.UserService", "GetProfile", value.clone());
    assert_eq!(result.unwrap(), value);
}

#[test]
fn null_response_is_a_protocol_violation() {
    let err = check_unary_response("user.v1.UserService", "GetProfile", serde_json::Value::Null)
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Internal);
    let details = err.details.expect("details");
    assert_eq!(details["context"], "empty_grpc_response");
    assert_eq!(details["method"], "GetProfile");
}

#[test]
fn empty_object_is_a_legitimate_response() {
    // A message with every field at its default decodes to `{}`, which is a
    // valid result and must not be confused with a missing payload.
    let value = serde_json::json!({});
    assert!(check_unary_response("user.v1.UserService", "UpdateProfile", value).is_ok());
}
