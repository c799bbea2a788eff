/// Task model and database operations
///
/// This module provides the Task model: a work item scoped to exactly one
/// team, with an optional assignee and due date. Access to a task is
/// always mediated by the acting user's membership in the task's team;
/// the task row itself grants nothing.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     due_date TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use crewboard_shared::models::task::{Task, CreateTask, TaskStatus, TaskPriority};
/// use crewboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     title: "Ship the release".to_string(),
///     description: None,
///     team_id: Uuid::new_v4(),
///     created_by: Uuid::new_v4(),
///     assigned_to: None,
///     status: TaskStatus::Todo,
///     priority: TaskPriority::Medium,
///     due_date: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low priority
    Low,

    /// Default priority
    Medium,

    /// High priority
    High,
}

impl TaskPriority {
    /// Converts priority to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task model representing a work item in a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// Assigned user (None if unassigned; cleared if the user is deleted)
    pub assigned_to: Option<Uuid>,

    /// Team this task belongs to
    pub team_id: Uuid,

    /// User who created the task
    pub created_by: Uuid,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Team the task belongs to
    pub team_id: Uuid,

    /// User creating the task
    pub created_by: Uuid,

    /// Optional assignee
    pub assigned_to: Option<Uuid>,

    /// Initial status (defaults to todo)
    #[serde(default = "default_status")]
    pub status: TaskStatus,

    /// Initial priority (defaults to medium)
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Todo
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

/// Input for updating a task
///
/// Absent fields are left unchanged. `assigned_to` and `due_date` use a
/// double Option so an explicit JSON null clears the column while an
/// absent key leaves it alone.
///
/// There is deliberately no `team_id` field: a task's team is derived
/// from the stored row, never from client input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// Reassign (Some(None) clears the assignment)
    #[serde(default, deserialize_with = "deserialize_some")]
    pub assigned_to: Option<Option<Uuid>>,

    /// New due date (Some(None) clears it)
    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Wraps any present value (including null) in Some, so that
/// `Option<Option<T>>` distinguishes "absent" from "explicitly null".
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

const TASK_COLUMNS: &str = "id, title, description, status, priority, assigned_to, \
                            team_id, created_by, due_date, created_at, updated_at";

impl Task {
    /// Creates a new task
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Team, creator, or assignee doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (title, description, status, priority, assigned_to,
                               team_id, created_by, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.assigned_to)
        .bind(data.team_id)
        .bind(data.created_by)
        .bind(data.due_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks for a team, newest first
    pub async fn list_by_team(pool: &PgPool, team_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE team_id = $1 ORDER BY created_at DESC",
        ))
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates the fields present in `data`
    ///
    /// Builds the UPDATE statement dynamically from the present fields.
    /// No version check is performed; concurrent edits are last-write-wins.
    ///
    /// # Returns
    ///
    /// The updated task if found, None if the task doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// # Returns
    ///
    /// True if the task was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts tasks in a team
    pub async fn count_by_team(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE team_id = $1")
            .bind(team_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_priority_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::Done.as_str(), "done");
        assert_eq!(TaskPriority::Low.as_str(), "low");
        assert_eq!(TaskPriority::Medium.as_str(), "medium");
        assert_eq!(TaskPriority::High.as_str(), "high");
    }

    #[test]
    fn test_create_task_defaults() {
        assert_eq!(default_status(), TaskStatus::Todo);
        assert_eq!(default_priority(), TaskPriority::Medium);

        let data: CreateTask = serde_json::from_value(serde_json::json!({
            "title": "Write docs",
            "team_id": Uuid::new_v4(),
            "created_by": Uuid::new_v4(),
        }))
        .unwrap();
        assert_eq!(data.status, TaskStatus::Todo);
        assert_eq!(data.priority, TaskPriority::Medium);
        assert!(data.assigned_to.is_none());
        assert!(data.due_date.is_none());
    }

    #[test]
    fn test_update_task_absent_vs_null() {
        // Absent key: field untouched
        let data: UpdateTask = serde_json::from_value(serde_json::json!({
            "title": "Renamed",
        }))
        .unwrap();
        assert_eq!(data.title.as_deref(), Some("Renamed"));
        assert!(data.assigned_to.is_none());

        // Explicit null: field cleared
        let data: UpdateTask = serde_json::from_value(serde_json::json!({
            "assigned_to": null,
            "due_date": null,
        }))
        .unwrap();
        assert_eq!(data.assigned_to, Some(None));
        assert_eq!(data.due_date, Some(None));

        // Explicit value: field set
        let user_id = Uuid::new_v4();
        let data: UpdateTask = serde_json::from_value(serde_json::json!({
            "assigned_to": user_id,
        }))
        .unwrap();
        assert_eq!(data.assigned_to, Some(Some(user_id)));
    }

    #[test]
    fn test_update_task_has_no_team_id_field() {
        // A client-supplied team_id must not reach the update; unknown
        // keys are ignored by deserialization and the type carries no
        // such field.
        let data: UpdateTask = serde_json::from_value(serde_json::json!({
            "title": "Renamed",
            "team_id": Uuid::new_v4(),
        }))
        .unwrap();
        assert_eq!(data.title.as_deref(), Some("Renamed"));
    }

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            "in_progress"
        );
        assert!(serde_json::from_value::<TaskStatus>(serde_json::json!("doing")).is_err());
    }

    // Integration tests for database operations are in crewboard-api/tests/
}
