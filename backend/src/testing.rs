//! Shared fixtures for unit tests

use crate::auth::AuthContext;
use crate::database::{initialize_database, NewUser, Repository, User, UserRole, UserStatus};
use sqlx::sqlite::SqlitePoolOptions;

/// Fresh in-memory database with the schema applied.
///
/// A single connection that never expires, so every query sees the same
/// in-memory database.
pub(crate) async fn memory_repository() -> Repository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    initialize_database(&pool).await.unwrap();

    Repository::new(pool)
}

/// Insert an active user named `username` and commit.
pub(crate) async fn insert_user(repo: &Repository, username: &str) -> User {
    let mut tx = repo.begin().await.unwrap();
    let user = tx
        .insert_user(&NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "hash".to_string(),
            role: UserRole::User,
            status: UserStatus::Active,
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    user
}

/// Insert a user and return a context acting as them.
pub(crate) async fn signed_in(repo: &Repository, username: &str) -> (User, AuthContext) {
    let user = insert_user(repo, username).await;
    (user, AuthContext::authenticated(username))
}
