//! Handler-level unit tests. Full request/response round-trips through the
//! router live in the service's `tests/` directory.

use crate::handlers::ApiError;
use axum::http::StatusCode;

#[test]
fn not_found_error_has_404_and_names_the_entity() {
    let err = ApiError::not_found("Run", "run_01");
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.code, "NOT_FOUND");
    assert!(err.message.contains("run_01"));
}

#[test]
fn conflict_error_has_409() {
    let err = ApiError::conflict("workflow 'wf1' already exists");
    assert_eq!(err.status, StatusCode::CONFLICT);
    assert_eq!(err.code, "CONFLICT");
}

#[test]
fn validation_error_joins_messages() {
    let err: ApiError =
        vec!["task 'A' must have a 'command' field".to_string(), "cycle".to_string()].into();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert!(err.message.contains("cycle"));
}

#[test]
fn unauthorized_error_has_401() {
    let err = ApiError::unauthorized("Missing X-API-Key header");
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    assert_eq!(err.code, "UNAUTHORIZED");
}

#[test]
fn internal_error_has_500() {
    let err = ApiError::internal("database error");
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.code, "INTERNAL_ERROR");
}
