/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh, me)
/// - `teams`: Team and membership management
/// - `tasks`: Task CRUD scoped by team membership

pub mod auth;
pub mod health;
pub mod tasks;
pub mod teams;

use crate::error::ApiError;
use serde::Serialize;
use uuid::Uuid;

/// Success envelope wrapping a payload as `{"data": ...}`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    /// The response payload
    pub data: T,
}

/// Parses a UUID from client input, mapping failure to a field-tagged 400
pub(crate) fn parse_uuid(value: &str, field: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value)
        .map_err(|_| ApiError::bad_request_field(field, format!("Invalid {} format", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid_valid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string(), "id").unwrap(), id);
    }

    #[test]
    fn test_parse_uuid_invalid_is_field_tagged_400() {
        let err = parse_uuid("not-a-uuid", "team_id").unwrap_err();
        match err {
            ApiError::BadRequest { field, .. } => assert_eq!(field.as_deref(), Some("team_id")),
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }
}
