//! API error handling.
//!
//! Every failure leaves the API as an [`ApiErrorResponse`]: a status code plus
//! a JSON body `{ code, message, fieldErrors?, timestamp }`.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::{Timestamp, ValidationError};
use crate::infrastructure::{PageableError, SortParseError};
use crate::service::ServiceError;

// =============================================================================
// API Error
// =============================================================================

/// API error structure for JSON responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Field name to cause, present for validation failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, String>>,
    /// When the error was produced (RFC 3339).
    pub timestamp: String,
}

impl ApiError {
    /// Creates a new API error stamped with the current time.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field_errors: None,
            timestamp: Timestamp::now().to_string(),
        }
    }

    /// Creates a validation error with field-level causes.
    #[must_use]
    pub fn validation(message: impl Into<String>, field_errors: BTreeMap<String, String>) -> Self {
        Self {
            field_errors: Some(field_errors),
            ..Self::new("VALIDATION_ERROR", message)
        }
    }
}

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub error: ApiError,
}

impl ApiErrorResponse {
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 400 Bad Request response for undecodable input.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::new("BAD_REQUEST", message),
        )
    }

    /// Creates a 400 Bad Request response for validation errors.
    #[must_use]
    pub fn validation_error(field_errors: BTreeMap<String, String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::validation("Validation failed", field_errors),
        )
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    /// Creates a 409 Conflict response for operations on completed tasks.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            ApiError::new("INVALID_TASK_STATE", message),
        )
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", message),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        Self::validation_error(error.field_errors().clone())
    }
}

impl From<ServiceError> for ApiErrorResponse {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Validation(error) => error.into(),
            ServiceError::ResourceNotFound(id) => Self::not_found(format!("Task not found: {id}")),
            ServiceError::InvalidState(_) => {
                Self::invalid_state("task is in an invalid state for this operation")
            }
            // Details are logged by the service and not exposed.
            ServiceError::Repository(_) => Self::internal_error("An internal error occurred"),
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<SortParseError> for ApiErrorResponse {
    fn from(error: SortParseError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl From<PageableError> for ApiErrorResponse {
    fn from(error: PageableError) -> Self {
        Self::bad_request(error.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use crate::infrastructure::RepositoryError;
    use rstest::rstest;

    #[rstest]
    fn test_api_error_new() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert!(error.field_errors.is_none());
        assert!(!error.timestamp.is_empty());
    }

    #[rstest]
    fn test_api_error_serializes_camel_case_and_skips_empty_field_errors() {
        let json = serde_json::to_value(ApiError::new("NOT_FOUND", "gone")).unwrap();
        assert!(json.get("fieldErrors").is_none());
        assert!(json.get("timestamp").is_some());

        let mut causes = BTreeMap::new();
        causes.insert("title".to_string(), "title must not be empty".to_string());
        let json = serde_json::to_value(ApiError::validation("Validation failed", causes)).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["fieldErrors"]["title"], "title must not be empty");
    }

    #[rstest]
    #[case(
        ServiceError::Validation(ValidationError::single("title", "x")),
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR"
    )]
    #[case(
        ServiceError::ResourceNotFound(TaskId::generate()),
        StatusCode::NOT_FOUND,
        "NOT_FOUND"
    )]
    #[case(
        ServiceError::InvalidState(TaskId::generate()),
        StatusCode::CONFLICT,
        "INVALID_TASK_STATE"
    )]
    #[case(
        ServiceError::Repository(RepositoryError::DatabaseError("down".to_string())),
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR"
    )]
    fn test_service_error_mapping(
        #[case] error: ServiceError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let response = ApiErrorResponse::from(error);
        assert_eq!(response.status, status);
        assert_eq!(response.error.code, code);
    }

    #[rstest]
    fn test_internal_error_hides_details() {
        let response = ApiErrorResponse::from(ServiceError::Repository(
            RepositoryError::DatabaseError("password=secret".to_string()),
        ));
        assert!(!response.error.message.contains("secret"));
    }

    #[rstest]
    fn test_sort_parse_error_is_bad_request() {
        let response = ApiErrorResponse::from(SortParseError::UnknownField("owner".to_string()));
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "BAD_REQUEST");
    }
}
