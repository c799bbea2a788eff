/// Task endpoints
///
/// Every operation resolves the acting user's membership before touching
/// a task. For update and delete, the team is derived from the stored
/// task row, never from client input, so a spoofed team id cannot widen
/// access.
///
/// # Endpoints
///
/// - `GET /tasks?team_id=` - List a team's tasks, newest first
/// - `POST /tasks` - Create a task in a team
/// - `PUT /tasks/:id` - Update a task (any member of its team)
/// - `DELETE /tasks/:id` - Delete a task (creator or team admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{parse_uuid, DataResponse},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use crewboard_shared::{
    auth::{
        authorization::{authorize_task_delete, require_membership},
        middleware::AuthContext,
    },
    models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Query parameters for listing tasks
///
/// `team_id` arrives as a string so a malformed value maps to the
/// field-tagged 400 instead of a bare extractor rejection.
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Team whose tasks to list
    pub team_id: Option<String>,
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Team the task belongs to
    pub team_id: Uuid,

    /// Optional description
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    /// Optional assignee
    pub assigned_to: Option<Uuid>,

    /// Initial status (defaults to todo)
    pub status: Option<TaskStatus>,

    /// Initial priority (defaults to medium)
    pub priority: Option<TaskPriority>,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Lists tasks for a team, newest first
///
/// # Errors
///
/// - `400 Bad Request`: missing or malformed team_id
/// - `403 Forbidden`: acting user is not a member of the team
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<DataResponse<Vec<Task>>>> {
    let team_id = query
        .team_id
        .as_deref()
        .ok_or_else(|| {
            ApiError::bad_request_field("team_id", "team_id query parameter is required")
        })
        .and_then(|raw| parse_uuid(raw, "team_id"))?;

    require_membership(&state.db, team_id, auth.user_id).await?;

    let tasks = Task::list_by_team(&state.db, team_id).await?;

    Ok(Json(DataResponse { data: tasks }))
}

/// Creates a task in a team
///
/// Status defaults to todo, priority to medium; created_by is always
/// the acting user.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `403 Forbidden`: acting user is not a member of the target team
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<Task>>)> {
    req.validate()?;

    require_membership(&state.db, req.team_id, auth.user_id).await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            team_id: req.team_id,
            created_by: auth.user_id,
            assigned_to: req.assigned_to,
            status: req.status.unwrap_or(TaskStatus::Todo),
            priority: req.priority.unwrap_or(TaskPriority::Medium),
            due_date: req.due_date,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, team_id = %task.team_id, "Task created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// Updates a task
///
/// Any member of the task's team may update any field, including
/// reassignment. The membership check runs against the team stored on
/// the task row; `UpdateTask` has no team field, so client input cannot
/// redirect it.
///
/// # Errors
///
/// - `400 Bad Request`: malformed id
/// - `403 Forbidden`: acting user is not a member of the task's team
/// - `404 Not Found`: no such task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTask>,
) -> ApiResult<Json<DataResponse<Task>>> {
    let task_id = parse_uuid(&id, "id")?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_membership(&state.db, task.team_id, auth.user_id).await?;

    let updated = Task::update(&state.db, task_id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(DataResponse { data: updated }))
}

/// Deletes a task
///
/// Allowed for the task's creator or a team admin; any other member
/// gets 403.
///
/// # Errors
///
/// - `400 Bad Request`: malformed id
/// - `403 Forbidden`: not a member, or a member who is neither creator
///   nor admin
/// - `404 Not Found`: no such task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<serde_json::Value>>> {
    let task_id = parse_uuid(&id, "id")?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let membership = require_membership(&state.db, task.team_id, auth.user_id).await?;
    authorize_task_delete(&membership, task.created_by).require()?;

    Task::delete(&state.db, task_id).await?;

    tracing::info!(task_id = %task_id, deleted_by = %auth.user_id, "Task deleted");

    Ok(Json(DataResponse {
        data: serde_json::Value::Null,
    }))
}
