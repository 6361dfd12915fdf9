//! Resolve the acting user from an [`AuthContext`]

use crate::auth::AuthContext;
use crate::database::{RepoTx, User};
use crate::error::{AppError, Result};

/// Load the user behind `ctx` inside the caller's transaction.
///
/// An anonymous context fails with `NotAuthenticated`. A principal with no
/// user row fails with `UserNotFound`; an authenticated principal is
/// expected to always exist in storage.
pub async fn current_user(tx: &mut RepoTx, ctx: &AuthContext) -> Result<User> {
    let username = ctx.username().ok_or(AppError::NotAuthenticated)?;

    tx.find_user_by_username(username)
        .await?
        .ok_or_else(|| {
            tracing::error!("Authenticated principal has no user record: {}", username);
            AppError::UserNotFound(username.to_string())
        })
}
