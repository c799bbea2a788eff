/// Common test utilities for integration tests
///
/// Shared infrastructure for integration tests:
/// - Test database setup (connects to DATABASE_URL, runs migrations)
/// - Seed user/team/membership creation
/// - JWT token generation
/// - Request helpers for driving the router

use axum::body::Body;
use axum::http::{Request, StatusCode};
use crewboard_api::app::{build_router, AppState};
use crewboard_api::config::Config;
use crewboard_shared::auth::jwt::{create_token, Claims, TokenType};
use crewboard_shared::models::membership::{CreateMembership, Membership, TeamRole};
use crewboard_shared::models::team::{CreateTeam, Team};
use crewboard_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

/// Test context containing the app, pool, and a seeded admin user with
/// their team
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub team: Team,
    pub jwt_token: String,
    seeded_users: Vec<Uuid>,
}

impl TestContext {
    /// Creates a new test context against the configured database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../crewboard-shared/migrations")
            .run(&db)
            .await?;

        let user = create_test_user(&db, "admin").await?;

        // The seeded user creates a team and becomes its admin
        let team = Team::create_with_admin(
            &db,
            CreateTeam {
                name: format!("Test Team {}", Uuid::new_v4()),
                description: None,
            },
            user.id,
        )
        .await?;

        let jwt_token = token_for(&config, user.id)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            team,
            jwt_token,
            seeded_users: Vec::new(),
        })
    }

    /// Creates another user and returns it with a bearer token
    pub async fn create_user(&mut self, label: &str) -> anyhow::Result<(User, String)> {
        let user = create_test_user(&self.db, label).await?;
        let token = token_for(&self.config, user.id)?;
        self.seeded_users.push(user.id);
        Ok((user, token))
    }

    /// Adds a user to a team directly at the store level
    pub async fn add_member(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamRole,
    ) -> anyhow::Result<Membership> {
        let membership = Membership::create(
            &self.db,
            CreateMembership {
                team_id,
                user_id,
                role,
            },
        )
        .await?;
        Ok(membership)
    }

    /// Sends a JSON request through the router and returns status + body
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.app.clone().oneshot(request).await?;
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, json))
    }

    /// Cleans up seeded data
    ///
    /// Deleting the team cascades its memberships and tasks; seeded
    /// users are removed individually.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        Team::delete(&self.db, self.team.id).await?;

        for user_id in self
            .seeded_users
            .iter()
            .copied()
            .chain(std::iter::once(self.user.id))
        {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(user_id)
                .execute(&self.db)
                .await?;
        }

        Ok(())
    }
}

async fn create_test_user(db: &PgPool, label: &str) -> anyhow::Result<User> {
    let suffix = Uuid::new_v4().simple().to_string();

    let user = User::create(
        db,
        CreateUser {
            username: format!("{}-{}", label, &suffix[..12]),
            email: format!("{}-{}@example.com", label, suffix),
            // Not used by token-based tests
            password_hash: "$argon2id$v=19$m=65536,t=3,p=4$dGVzdA$dGVzdA".to_string(),
            name: format!("Test {}", label),
        },
    )
    .await?;

    Ok(user)
}

fn token_for(config: &Config, user_id: Uuid) -> anyhow::Result<String> {
    let claims = Claims::new(user_id, TokenType::Access);
    Ok(create_token(&claims, &config.jwt.secret)?)
}
