/// Team model and database operations
///
/// This module provides the Team model. A team is a named group of users;
/// the creating user becomes its first admin via a membership row written
/// in the same transaction as the team itself, so a team can never exist
/// without an admin.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE teams (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     description TEXT,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use crewboard_shared::models::team::{Team, CreateTeam};
/// use crewboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let creator = Uuid::new_v4();
///
/// // Team + admin membership for the creator, atomically
/// let team = Team::create_with_admin(&pool, CreateTeam {
///     name: "Platform".to_string(),
///     description: Some("Infra and tooling".to_string()),
/// }, creator).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::membership::TeamRole;

/// Team model representing a named group of users
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    /// Unique team ID
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// Optional team description
    pub description: Option<String>,

    /// User who created the team
    pub created_by: Uuid,

    /// When the team was created
    pub created_at: DateTime<Utc>,

    /// When the team was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeam {
    /// Team name
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

/// Input for updating a team
///
/// Only non-None fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTeam {
    /// New team name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Team joined with the acting user's role, for team listings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamWithRole {
    /// Unique team ID
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// Optional team description
    pub description: Option<String>,

    /// User who created the team
    pub created_by: Uuid,

    /// The listing user's role in this team
    pub role: TeamRole,

    /// When the team was created
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Creates a team and its creator's admin membership atomically
    ///
    /// Both rows are written inside one transaction: if the membership
    /// insert fails, the team row is rolled back too, so no team without
    /// an admin can exist.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `data` - Team creation data
    /// * `created_by` - The creating user, who becomes the first admin
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails or the transaction cannot
    /// commit; in both cases neither row persists.
    pub async fn create_with_admin(
        pool: &PgPool,
        data: CreateTeam,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_by, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO memberships (team_id, user_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(team.id)
        .bind(created_by)
        .bind(TeamRole::Admin)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(team)
    }

    /// Finds a team by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, description, created_by, created_at, updated_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Lists all teams the user belongs to, with the user's role in each
    ///
    /// Ordered by team creation time descending (newest first).
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TeamWithRole>, sqlx::Error> {
        let teams = sqlx::query_as::<_, TeamWithRole>(
            r#"
            SELECT t.id, t.name, t.description, t.created_by, m.role, t.created_at
            FROM teams t
            JOIN memberships m ON m.team_id = t.id
            WHERE m.user_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(teams)
    }

    /// Updates a team's name and/or description
    ///
    /// # Returns
    ///
    /// The updated team if found, None if the team doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTeam,
    ) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Deletes a team
    ///
    /// Memberships and tasks referencing the team are removed by the
    /// schema's ON DELETE CASCADE constraints.
    ///
    /// # Returns
    ///
    /// True if the team was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_team_default_is_noop() {
        let update = UpdateTeam::default();
        assert!(update.name.is_none());
        assert!(update.description.is_none());
    }

    #[test]
    fn test_create_team_deserializes_without_description() {
        let data: CreateTeam =
            serde_json::from_value(serde_json::json!({ "name": "Platform" })).unwrap();
        assert_eq!(data.name, "Platform");
        assert!(data.description.is_none());
    }

    // Integration tests for database operations are in crewboard-api/tests/
}
