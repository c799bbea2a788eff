/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP
/// responses. All handlers return `Result<T, ApiError>`; the single
/// `IntoResponse` impl is the only place errors become wire bytes, so
/// every failure is a deterministic status code with the same envelope:
///
/// ```json
/// {
///   "error": "Team name is required",
///   "field": "name",
///   "status": "error",
///   "statusCode": 400
/// }
/// ```
///
/// Store errors are converted via `From` impls; unique-constraint
/// violations surface as 409 with the offending field named.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crewboard_shared::auth::{
    authorization::AuthzError, jwt::JwtError, middleware::AuthError, password::PasswordError,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400), optionally tagged with the offending field
    BadRequest {
        message: String,
        field: Option<String>,
    },

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), optionally tagged with the offending field
    Conflict {
        message: String,
        field: Option<String>,
    },

    /// Internal server error (500)
    InternalError(String),
}

impl ApiError {
    /// 400 without a field tag
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            field: None,
        }
    }

    /// 400 tagged with the offending field
    pub fn bad_request_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// 409 tagged with the offending field
    pub fn conflict_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

/// Error response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// Offending input field, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Always "error"
    pub status: String,

    /// HTTP status code, duplicated in the body for clients
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest { message, .. } => write!(f, "Bad request: {}", message),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, field) = match self {
            ApiError::BadRequest { message, field } => (StatusCode::BAD_REQUEST, message, field),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Conflict { message, field } => (StatusCode::CONFLICT, message, field),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            field,
            status: "error".to_string(),
            status_code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique-constraint violations are mapped to 409 with field-specific
/// messaging; everything else is internal.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("username") {
                        return ApiError::conflict_field("username", "Username already exists");
                    }
                    if constraint.contains("email") {
                        return ApiError::conflict_field("email", "Email already exists");
                    }
                    if constraint.contains("memberships") {
                        return ApiError::conflict_field(
                            "email",
                            "User is already a member of this team",
                        );
                    }
                    return ApiError::Conflict {
                        message: format!("Constraint violation: {}", constraint),
                        field: None,
                    };
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert authorization errors to API errors
///
/// A missing membership maps to the generic 403 so a prober cannot
/// distinguish "team exists but you're not in it" from anything else.
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotMember(_) => ApiError::Forbidden("Unauthorized".to_string()),
            AuthzError::Denied(reason) => ApiError::Forbidden(reason.to_string()),
            AuthzError::Database(err) => err.into(),
        }
    }
}

/// Convert authentication middleware errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::bad_request(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert request validation errors to a field-tagged 400
///
/// Only the first failing field is reported; the UI highlights one
/// input at a time.
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let first = errors
            .field_errors()
            .into_iter()
            .next()
            .and_then(|(field, errs)| {
                errs.first().map(|e| {
                    (
                        field.to_string(),
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    )
                })
            });

        match first {
            Some((field, message)) => ApiError::bad_request_field(field, message),
            None => ApiError::bad_request("Validation failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewboard_shared::auth::authorization::DenyReason;
    use uuid::Uuid;

    #[test]
    fn test_error_display() {
        let err = ApiError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");
    }

    #[test]
    fn test_envelope_serialization() {
        let body = ErrorResponse {
            error: "Team name is required".to_string(),
            field: Some("name".to_string()),
            status: "error".to_string(),
            status_code: 400,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Team name is required");
        assert_eq!(json["field"], "name");
        assert_eq!(json["status"], "error");
        assert_eq!(json["statusCode"], 400);
    }

    #[test]
    fn test_envelope_omits_absent_field() {
        let body = ErrorResponse {
            error: "Unauthorized".to_string(),
            field: None,
            status: "error".to_string(),
            status_code: 403,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("field").is_none());
    }

    #[test]
    fn test_not_member_maps_to_generic_forbidden() {
        let err: ApiError = AuthzError::NotMember(Uuid::new_v4()).into();
        match err {
            ApiError::Forbidden(msg) => assert_eq!(msg, "Unauthorized"),
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_denied_maps_to_forbidden_with_reason() {
        let err: ApiError = AuthzError::Denied(DenyReason::CreatorOrAdminRequired).into();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
