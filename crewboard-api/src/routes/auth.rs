/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new user
/// - `POST /auth/login` - Login with email and password
/// - `POST /auth/refresh` - Refresh an access token
/// - `GET /auth/me` - Current authenticated user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use crewboard_shared::{
    auth::{
        jwt::{self, Claims, TokenType},
        middleware::AuthContext,
        password,
    },
    models::user::{CreateUser, User, UserProfile},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Unique handle
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (also checked for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Response for register and login: the user plus a token pair
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The authenticated user
    pub data: UserProfile,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Response for the current-user endpoint
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// The authenticated user
    pub data: UserProfile,
}

/// Registers a new user
///
/// # Errors
///
/// - `400 Bad Request`: validation failed (field-tagged)
/// - `409 Conflict`: username or email already exists
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    password::validate_password_strength(&req.password)
        .map_err(|e| ApiError::bad_request_field("password", e))?;

    let password_hash = password::hash_password(&req.password)?;

    // Duplicate username/email surfaces as a unique violation and maps
    // to 409 in the error layer
    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            name: req.name,
        },
    )
    .await?;

    let (access_token, refresh_token) = issue_tokens(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            data: user.into(),
            access_token,
            refresh_token,
        }),
    ))
}

/// Authenticates a user by email and password
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `401 Unauthorized`: unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    // Same message for unknown email and wrong password
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let (access_token, refresh_token) = issue_tokens(&state, &user)?;

    Ok(Json(AuthResponse {
        data: user.into(),
        access_token,
        refresh_token,
    }))
}

/// Exchanges a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Returns the currently authenticated user
///
/// # Errors
///
/// - `401 Unauthorized`: missing/invalid token, or the account no longer
///   exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(MeResponse { data: user.into() }))
}

fn issue_tokens(state: &AppState, user: &User) -> Result<(String, String), ApiError> {
    let access_claims = Claims::new(user.id, TokenType::Access);
    let refresh_claims = Claims::new(user.id, TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok((access_token, refresh_token))
}
