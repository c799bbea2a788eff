/// Authorization decisions for team and task operations
///
/// Every task/team mutation follows the same sequence: resolve the
/// acting user's membership in the relevant team, then apply a role or
/// ownership check, then perform the mutation. This module implements
/// both steps.
///
/// Role and ownership checks are expressed as predicate functions that
/// return a tagged [`Decision`] rather than a bare bool, so each
/// predicate is testable in isolation and deny reasons survive to the
/// error mapping layer.
///
/// # Example
///
/// ```no_run
/// use crewboard_shared::auth::authorization::{require_membership, authorize_task_delete};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, team_id: Uuid, user_id: Uuid, task_created_by: Uuid)
/// #     -> Result<(), Box<dyn std::error::Error>> {
/// let membership = require_membership(&pool, team_id, user_id).await?;
/// authorize_task_delete(&membership, task_created_by).require()?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

use crate::models::membership::{Membership, TeamRole};

/// Why an operation was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The operation requires an admin membership
    AdminRequired,

    /// The operation requires being the task's creator or a team admin
    CreatorOrAdminRequired,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::AdminRequired => write!(f, "Requires team admin role"),
            DenyReason::CreatorOrAdminRequired => {
                write!(f, "Requires task creator or team admin")
            }
        }
    }
}

/// Outcome of an authorization predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The operation may proceed
    Allow,

    /// The operation is denied for the tagged reason
    Deny(DenyReason),
}

impl Decision {
    /// Whether the decision allows the operation
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Converts the decision into a result, for use with `?`
    pub fn require(self) -> Result<(), AuthzError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AuthzError::Denied(reason)),
        }
    }
}

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User is not a member of the team
    #[error("Not a member of team {0}")]
    NotMember(Uuid),

    /// User is a member but lacks the required role or ownership
    #[error("{0}")]
    Denied(DenyReason),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Resolves the acting user's membership in a team
///
/// This is the access check every team-scoped operation runs first: the
/// unique (team_id, user_id) row either exists, and its role feeds the
/// follow-up decision, or it doesn't and the request is denied.
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `team_id` - Team ID
/// * `user_id` - Acting user ID
///
/// # Returns
///
/// The membership row
///
/// # Errors
///
/// Returns `AuthzError::NotMember` if no membership exists; callers map
/// this to HTTP 403.
pub async fn require_membership(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<Membership, AuthzError> {
    Membership::find(pool, team_id, user_id)
        .await?
        .ok_or(AuthzError::NotMember(team_id))
}

/// Decides whether a membership may manage its team
///
/// Covers team update, team deletion, and member management. Admin only.
pub fn authorize_team_manage(membership: &Membership) -> Decision {
    if membership.role.can_manage_team() {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::AdminRequired)
    }
}

/// Decides whether a membership may delete a task
///
/// Two independent predicates, either of which grants access:
/// - the acting user created the task, or
/// - the acting user holds an admin membership in the task's team.
pub fn authorize_task_delete(membership: &Membership, task_created_by: Uuid) -> Decision {
    let is_creator = membership.user_id == task_created_by;
    let is_admin = membership.role == TeamRole::Admin;

    if is_creator || is_admin {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::CreatorOrAdminRequired)
    }
}

/// Resolves membership and requires the admin role in one step
///
/// Convenience for team management endpoints.
pub async fn require_team_admin(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<Membership, AuthzError> {
    let membership = require_membership(pool, team_id, user_id).await?;
    authorize_team_manage(&membership).require()?;
    Ok(membership)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn membership(role: TeamRole) -> Membership {
        Membership {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_team_manage_admin_only() {
        assert_eq!(
            authorize_team_manage(&membership(TeamRole::Admin)),
            Decision::Allow
        );
        assert_eq!(
            authorize_team_manage(&membership(TeamRole::Member)),
            Decision::Deny(DenyReason::AdminRequired)
        );
    }

    #[test]
    fn test_task_delete_allows_creator() {
        // A plain member may delete their own task
        let m = membership(TeamRole::Member);
        assert_eq!(authorize_task_delete(&m, m.user_id), Decision::Allow);
    }

    #[test]
    fn test_task_delete_allows_admin_of_foreign_task() {
        // An admin may delete a task they did not create
        let m = membership(TeamRole::Admin);
        assert_eq!(authorize_task_delete(&m, Uuid::new_v4()), Decision::Allow);
    }

    #[test]
    fn test_task_delete_denies_non_creator_member() {
        let m = membership(TeamRole::Member);
        assert_eq!(
            authorize_task_delete(&m, Uuid::new_v4()),
            Decision::Deny(DenyReason::CreatorOrAdminRequired)
        );
    }

    #[test]
    fn test_task_delete_creator_admin_both_hold() {
        // Both predicates true at once still allows
        let m = membership(TeamRole::Admin);
        assert_eq!(authorize_task_delete(&m, m.user_id), Decision::Allow);
    }

    #[test]
    fn test_decision_require() {
        assert!(Decision::Allow.require().is_ok());

        let err = Decision::Deny(DenyReason::AdminRequired).require().unwrap_err();
        assert!(matches!(err, AuthzError::Denied(DenyReason::AdminRequired)));
    }

    #[test]
    fn test_deny_reason_display() {
        assert!(DenyReason::AdminRequired.to_string().contains("admin"));
        assert!(DenyReason::CreatorOrAdminRequired
            .to_string()
            .contains("creator"));
    }
}
