/// Database models for Crewboard
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and credentials
/// - `team`: Named groups owned by a creating user
/// - `membership`: User-team relationships with roles
/// - `task`: Work items scoped to a team
///
/// # Example
///
/// ```no_run
/// use crewboard_shared::models::user::{User, CreateUser};
/// use crewboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     username: "jdoe".to_string(),
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: "John Doe".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod membership;
pub mod task;
pub mod team;
pub mod user;
