// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::approval::ApprovalError;
use crate::auth::JwtError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest { message: String, code: &'static str },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound { message: String, code: &'static str },

    // 409 Conflict
    Conflict { message: String, code: &'static str },

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound { message, .. } => message,
            ApiError::Conflict { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { code, .. } => code,
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound { code, .. } => code,
            ApiError::Conflict { code, .. } => code,
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into(), code: "BAD_REQUEST" }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound { message: message.into(), code: "NOT_FOUND" }
    }

    pub fn conflict(message: impl Into<String>, code: &'static str) -> Self {
        ApiError::Conflict { message: message.into(), code }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<ApprovalError> for ApiError {
    fn from(err: ApprovalError) -> Self {
        let message = err.to_string();
        match err {
            ApprovalError::Unauthenticated => ApiError::unauthorized(message),
            ApprovalError::Unauthorized => ApiError::forbidden(message),
            ApprovalError::AlreadyAdmin => ApiError::conflict(message, "ALREADY_ADMIN"),
            ApprovalError::DuplicateRequest => ApiError::conflict(message, "DUPLICATE_REQUEST"),
            ApprovalError::DuplicateVote => ApiError::conflict(message, "DUPLICATE_VOTE"),
            ApprovalError::RequestNotActionable => ApiError::NotFound {
                message,
                code: "REQUEST_NOT_ACTIONABLE",
            },
            ApprovalError::SelfModification => ApiError::BadRequest {
                message,
                code: "SELF_MODIFICATION",
            },
            ApprovalError::NotFound(_) => ApiError::not_found(message),
            // Detail was logged where the store failed; clients only learn to retry
            ApprovalError::PersistenceFailure(_) => ApiError::service_unavailable(message),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidSecret | JwtError::TokenGeneration(_) => {
                tracing::error!("JWT configuration error: {}", err);
                ApiError::internal_server_error("Authentication is misconfigured")
            }
            JwtError::InvalidToken(msg) => ApiError::unauthorized(format!("Invalid bearer token: {}", msg)),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreError;

    #[test]
    fn approval_errors_map_to_statuses() {
        let cases = [
            (ApprovalError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ApprovalError::Unauthorized, StatusCode::FORBIDDEN),
            (ApprovalError::AlreadyAdmin, StatusCode::CONFLICT),
            (ApprovalError::DuplicateRequest, StatusCode::CONFLICT),
            (ApprovalError::DuplicateVote, StatusCode::CONFLICT),
            (ApprovalError::RequestNotActionable, StatusCode::NOT_FOUND),
            (ApprovalError::SelfModification, StatusCode::BAD_REQUEST),
            (ApprovalError::not_found("User not found."), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn persistence_failure_hides_details() {
        let err = ApiError::from(ApprovalError::PersistenceFailure(StoreError::Unavailable(
            "connection reset by 10.0.0.7".into(),
        )));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.message().contains("10.0.0.7"));
        assert_eq!(err.to_json()["success"], false);
    }

    #[test]
    fn not_actionable_has_its_own_code() {
        let err = ApiError::from(ApprovalError::RequestNotActionable);
        assert_eq!(err.error_code(), "REQUEST_NOT_ACTIONABLE");
        assert_eq!(err.message(), "Request not found or already resolved.");
    }
}
