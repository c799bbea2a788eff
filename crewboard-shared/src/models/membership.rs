/// Membership model and database operations
///
/// This module provides the Membership model for user-team relationships
/// with role-based access control. The memberships table is the single
/// source of truth for authorization: every task/team operation resolves
/// the acting user's membership before touching anything else, and a
/// task never grants access independent of a membership.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE team_role AS ENUM ('admin', 'member');
///
/// CREATE TABLE memberships (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role team_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (team_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **admin**: manage the team, add members, delete any task
/// - **member**: create and update tasks, delete own tasks
///
/// # Example
///
/// ```no_run
/// use crewboard_shared::models::membership::{Membership, CreateMembership, TeamRole};
/// use crewboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let team_id = Uuid::new_v4();
/// let user_id = Uuid::new_v4();
///
/// // Add a user to a team as a regular member
/// let membership = Membership::create(&pool, CreateMembership {
///     team_id,
///     user_id,
///     role: TeamRole::Member,
/// }).await?;
///
/// // Resolve a membership (None means "not a member")
/// let found = Membership::find(&pool, team_id, user_id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Role a user holds within a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Can manage the team, add members, and delete any task
    Admin,

    /// Can create and update tasks, and delete own tasks
    Member,
}

impl TeamRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Admin => "admin",
            TeamRole::Member => "member",
        }
    }

    /// Whether this role may manage the team itself
    ///
    /// Covers team update/delete and member management.
    pub fn can_manage_team(&self) -> bool {
        matches!(self, TeamRole::Admin)
    }
}

/// Membership model representing a user-team relationship with a role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Unique membership ID
    pub id: Uuid,

    /// Team ID
    pub team_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the team
    pub role: TeamRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    /// Team ID
    pub team_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role to assign (defaults to Member)
    #[serde(default = "default_role")]
    pub role: TeamRole,
}

fn default_role() -> TeamRole {
    TeamRole::Member
}

/// Membership joined with the member's user record, for member listings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberWithUser {
    /// Membership ID
    pub id: Uuid,

    /// Member's user ID
    pub user_id: Uuid,

    /// Member's username
    pub username: String,

    /// Member's email address
    pub email: String,

    /// Member's display name
    pub name: String,

    /// Role within the team
    pub role: TeamRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Creates a new membership (adds user to team)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Membership already exists (unique constraint violation)
    /// - Team or user doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateMembership) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (team_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING id, team_id, user_id, role, created_at
            "#,
        )
        .bind(data.team_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(membership)
    }

    /// Finds the unique membership for a (team, user) pair
    ///
    /// This is the access-check lookup: callers must treat `None` as
    /// "not a member" and deny the request.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `team_id` - Team ID
    /// * `user_id` - User ID
    ///
    /// # Returns
    ///
    /// The membership if found, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, team_id, user_id, role, created_at
            FROM memberships
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Lists all members of a team, joined with user records
    ///
    /// Ordered by membership creation time so the team creator comes
    /// first.
    pub async fn list_members(
        pool: &PgPool,
        team_id: Uuid,
    ) -> Result<Vec<MemberWithUser>, sqlx::Error> {
        let members = sqlx::query_as::<_, MemberWithUser>(
            r#"
            SELECT m.id, m.user_id, u.username, u.email, u.name, m.role, m.created_at
            FROM memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.team_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Deletes a membership (removes user from team)
    ///
    /// # Returns
    ///
    /// True if a membership was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM memberships WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts members in a team
    pub async fn count_by_team(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM memberships WHERE team_id = $1")
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
    fn test_team_role_as_str() {
        assert_eq!(TeamRole::Admin.as_str(), "admin");
        assert_eq!(TeamRole::Member.as_str(), "member");
    }

    #[test]
    fn test_role_permissions() {
        assert!(TeamRole::Admin.can_manage_team());
        assert!(!TeamRole::Member.can_manage_team());
    }

    #[test]
    fn test_create_membership_default_role() {
        assert_eq!(default_role(), TeamRole::Member);

        let data: CreateMembership = serde_json::from_value(serde_json::json!({
            "team_id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
        }))
        .unwrap();
        assert_eq!(data.role, TeamRole::Member);
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_value(TeamRole::Admin).unwrap(), "admin");
        assert_eq!(
            serde_json::from_value::<TeamRole>(serde_json::json!("member")).unwrap(),
            TeamRole::Member
        );
        assert!(serde_json::from_value::<TeamRole>(serde_json::json!("owner")).is_err());
    }

    // Integration tests for database operations are in crewboard-api/tests/
}
