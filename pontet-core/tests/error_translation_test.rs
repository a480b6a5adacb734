use pontet_core::error::{AppError, ErrorKind};
use std::error::Error;
use tonic::{Code, Status};

#[test]
fn test_status_code_mapping_table() {
    let cases = [
        (Code::NotFound, ErrorKind::NotFound),
        (Code::InvalidArgument, ErrorKind::BadRequest),
        (Code::Unauthenticated, ErrorKind::Unauthorized),
        (Code::PermissionDenied, ErrorKind::Forbidden),
        (Code::Unavailable, ErrorKind::ServiceUnavailable),
        (Code::DeadlineExceeded, ErrorKind::GatewayTimeout),
        (Code::Internal, ErrorKind::Internal),
        (Code::Unknown, ErrorKind::Internal),
        (Code::Cancelled, ErrorKind::RequestCancelled),
        (Code::ResourceExhausted, ErrorKind::TooManyRequests),
    ];
    for (code, kind) in cases {
        assert_eq!(ErrorKind::from_code(code), kind, "code {code:?}");
    }
}

#[test]
fn test_unmapped_codes_fall_through_to_internal() {
    let unmapped = [
        Code::Ok,
        Code::AlreadyExists,
        Code::FailedPrecondition,
        Code::Aborted,
        Code::OutOfRange,
        Code::Unimplemented,
        Code::DataLoss,
    ];
    for code in unmapped {
        assert_eq!(ErrorKind::from_code(code), ErrorKind::Internal, "code {code:?}");
    }
}

#[test]
fn test_unmapped_code_is_preserved_in_details() {
    let err = AppError::from(Status::new(Code::Aborted, "txn conflict"));

    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(err.message, "txn conflict");
    let details = err.details.expect("details");
    assert_eq!(details["grpc_code"], Code::Aborted as i32);
}

#[test]
fn test_mapped_codes_do_not_leak_a_grpc_code_detail() {
    let err = AppError::from(Status::new(Code::NotFound, "user 'x' not found"));

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.details.is_none());
}

#[test]
fn test_status_metadata_is_captured_in_details() {
    let mut status = Status::new(Code::NotFound, "user 'x' not found");
    status
        .metadata_mut()
        .insert("x-hint", "try-another".parse().unwrap());

    let err = AppError::from(status);
    let details = err.details.expect("details");
    assert_eq!(
        details["grpc_metadata"]["x-hint"],
        serde_json::json!(["try-another"])
    );
}

#[test]
fn test_blank_status_message_falls_back_to_code_description() {
    let err = AppError::from(Status::new(Code::Unavailable, ""));
    assert!(!err.message.is_empty());
}

#[test]
fn test_original_status_is_kept_as_source() {
    let err = AppError::from(Status::new(Code::Internal, "backend exploded"));
    let source = err.source().expect("source");
    assert!(source.to_string().contains("backend exploded"));
}

#[test]
fn test_kind_codes_are_stable() {
    assert_eq!(ErrorKind::BadRequest.code(), "BAD_REQUEST");
    assert_eq!(ErrorKind::NotFound.code(), "NOT_FOUND");
    assert_eq!(ErrorKind::RequestCancelled.code(), "REQUEST_CANCELLED");
    assert_eq!(ErrorKind::TooManyRequests.code(), "RESOURCE_EXHAUSTED");
}

#[test]
fn test_http_status_mapping() {
    assert_eq!(
        ErrorKind::NotFound.http_status(),
        http::StatusCode::NOT_FOUND
    );
    assert_eq!(
        ErrorKind::GatewayTimeout.http_status(),
        http::StatusCode::GATEWAY_TIMEOUT
    );
    assert_eq!(
        ErrorKind::RequestCancelled.http_status(),
        http::StatusCode::CONFLICT
    );
    assert_eq!(
        ErrorKind::TooManyRequests.http_status(),
        http::StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        ErrorKind::UnknownClient.http_status(),
        http::StatusCode::INTERNAL_SERVER_ERROR
    );
}
