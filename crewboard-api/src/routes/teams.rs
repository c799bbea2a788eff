/// Team and membership endpoints
///
/// Team creation writes the team row and the creator's admin membership
/// in one transaction. Everything else resolves the acting user's
/// membership first and then applies the admin gate where required.
///
/// # Endpoints
///
/// - `GET /teams` - Teams the acting user belongs to, with role
/// - `POST /teams` - Create a team (creator becomes admin)
/// - `PUT /teams/:id` - Update a team (admin)
/// - `DELETE /teams/:id` - Delete a team (admin)
/// - `GET /teams/:id/members` - List members (any member)
/// - `POST /teams/:id/members` - Add a member by email (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{parse_uuid, DataResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use crewboard_shared::{
    auth::{
        authorization::{require_membership, require_team_admin},
        middleware::AuthContext,
    },
    models::{
        membership::{CreateMembership, MemberWithUser, Membership, TeamRole},
        team::{CreateTeam, Team, TeamWithRole, UpdateTeam},
        user::User,
    },
};
use serde::Deserialize;
use validator::Validate;

/// Create team request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    /// Team name
    #[validate(length(min = 1, max = 100, message = "Team name must be 1-100 characters"))]
    pub name: String,

    /// Optional description
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Update team request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeamRequest {
    /// New team name
    #[validate(length(min = 1, max = 100, message = "Team name must be 1-100 characters"))]
    pub name: Option<String>,

    /// New description
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Add member request
#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    /// Email of the user to add
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Role to assign (defaults to member)
    pub role: Option<TeamRole>,
}

/// Lists all teams the acting user belongs to, with their role in each
pub async fn list_teams(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DataResponse<Vec<TeamWithRole>>>> {
    let teams = Team::list_for_user(&state.db, auth.user_id).await?;

    Ok(Json(DataResponse { data: teams }))
}

/// Creates a team; the creator becomes its first admin
///
/// The team row and the admin membership are written atomically: a
/// failure between the two inserts leaves neither behind.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
pub async fn create_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<Team>>)> {
    req.validate()?;

    let team = Team::create_with_admin(
        &state.db,
        CreateTeam {
            name: req.name,
            description: req.description,
        },
        auth.user_id,
    )
    .await?;

    tracing::info!(team_id = %team.id, created_by = %auth.user_id, "Team created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: team })))
}

/// Updates a team's name and/or description
///
/// # Errors
///
/// - `400 Bad Request`: malformed id or validation failure
/// - `403 Forbidden`: not a member, or member without the admin role
/// - `404 Not Found`: team deleted concurrently
pub async fn update_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTeamRequest>,
) -> ApiResult<Json<DataResponse<Team>>> {
    let team_id = parse_uuid(&id, "id")?;
    req.validate()?;

    require_team_admin(&state.db, team_id, auth.user_id).await?;

    let team = Team::update(
        &state.db,
        team_id,
        UpdateTeam {
            name: req.name,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    Ok(Json(DataResponse { data: team }))
}

/// Deletes a team
///
/// Memberships and tasks go with it via the schema's cascade rules.
///
/// # Errors
///
/// - `400 Bad Request`: malformed id
/// - `403 Forbidden`: not a member, or member without the admin role
/// - `404 Not Found`: team deleted concurrently
pub async fn delete_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<serde_json::Value>>> {
    let team_id = parse_uuid(&id, "id")?;

    require_team_admin(&state.db, team_id, auth.user_id).await?;

    let deleted = Team::delete(&state.db, team_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Team not found".to_string()));
    }

    tracing::info!(team_id = %team_id, deleted_by = %auth.user_id, "Team deleted");

    Ok(Json(DataResponse {
        data: serde_json::Value::Null,
    }))
}

/// Lists a team's members with their user records
///
/// # Errors
///
/// - `400 Bad Request`: malformed id
/// - `403 Forbidden`: acting user is not a member
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Vec<MemberWithUser>>>> {
    let team_id = parse_uuid(&id, "id")?;

    require_membership(&state.db, team_id, auth.user_id).await?;

    let members = Membership::list_members(&state.db, team_id).await?;

    Ok(Json(DataResponse { data: members }))
}

/// Adds a member to a team by email
///
/// The target user is resolved by email; the role defaults to "member"
/// unless explicitly supplied.
///
/// # Errors
///
/// - `400 Bad Request`: malformed id, invalid email, or target already a
///   member
/// - `403 Forbidden`: acting user is not an admin of the team
/// - `404 Not Found`: no user registered with that email
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<MemberWithUser>>)> {
    let team_id = parse_uuid(&id, "id")?;
    req.validate()?;

    require_team_admin(&state.db, team_id, auth.user_id).await?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No user found with that email".to_string()))?;

    // Reject duplicates before inserting so the client gets a 400 with
    // the field named, not a bare constraint conflict
    if Membership::find(&state.db, team_id, user.id).await?.is_some() {
        return Err(ApiError::bad_request_field(
            "email",
            "User is already an active member of this team",
        ));
    }

    let membership = Membership::create(
        &state.db,
        CreateMembership {
            team_id,
            user_id: user.id,
            role: req.role.unwrap_or(TeamRole::Member),
        },
    )
    .await?;

    tracing::info!(
        team_id = %team_id,
        user_id = %user.id,
        role = membership.role.as_str(),
        "Member added"
    );

    let member = MemberWithUser {
        id: membership.id,
        user_id: user.id,
        username: user.username,
        email: user.email,
        name: user.name,
        role: membership.role,
        created_at: membership.created_at,
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}
