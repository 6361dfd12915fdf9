//! Authentication service
//!
//! Registration, login, logout and turning a bearer token into an
//! [`AuthContext`]. Logout revokes the presented token in the shared
//! [`TokenBlacklist`] until it would have expired anyway.

use crate::access::current_user;
use crate::auth::password::{check_credentials, hash_password};
use crate::auth::{AuthContext, TokenBlacklist, TokenService};
use crate::database::{
    LoginRequest, NewUser, RegisterRequest, Repository, UserRole, UserStatus,
};
use crate::error::{AppError, Result};
use crate::responses::{AuthResponse, UserProfile};
use crate::validation;
use chrono::Utc;

#[derive(Clone)]
pub struct AuthService {
    repo: Repository,
    tokens: TokenService,
    blacklist: TokenBlacklist,
}

impl AuthService {
    pub fn new(repo: Repository, tokens: TokenService, blacklist: TokenBlacklist) -> Self {
        Self {
            repo,
            tokens,
            blacklist,
        }
    }

    /// Create an active account with the `USER` role and sign it in.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse> {
        validation::username(&req.username)?;
        validation::password(&req.password)?;
        validation::email(&req.email)?;

        let mut tx = self.repo.begin().await?;

        if tx.username_exists(&req.username).await? {
            return Err(AppError::DuplicateUsername(req.username));
        }
        if tx.email_exists(&req.email).await? {
            return Err(AppError::DuplicateEmail(req.email));
        }

        let new_user = NewUser {
            username: req.username.clone(),
            email: req.email.clone(),
            password_hash: hash_password(&req.password)?,
            role: UserRole::User,
            status: UserStatus::Active,
        };

        let user = tx
            .insert_user(&new_user)
            .await
            .map_err(|e| duplicate_or(e, &req))?;
        let issued = self.tokens.issue(&user.username)?;
        tx.commit().await?;

        tracing::info!("Registered user: {}", user.username);

        Ok(AuthResponse::new(issued.token, issued.expires_at, &user))
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown users, wrong passwords and disabled accounts all fail the
    /// same way.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        let mut tx = self.repo.begin().await?;

        let user = tx.find_user_by_username(&req.username).await?;
        let matches = check_credentials(
            &req.password,
            user.as_ref().map(|u| u.password_hash.as_str()),
        );

        let Some(user) = user else {
            tracing::debug!("Login failed for unknown user: {}", req.username);
            return Err(AppError::InvalidCredentials);
        };
        if !matches {
            tracing::debug!("Login failed for {}: wrong password", user.username);
            return Err(AppError::InvalidCredentials);
        }

        if user.status != UserStatus::Active {
            tracing::warn!("Login rejected for disabled account: {}", user.username);
            return Err(AppError::InvalidCredentials);
        }

        tx.record_login(user.id, Utc::now()).await?;
        let issued = self.tokens.issue(&user.username)?;
        tx.commit().await?;

        tracing::info!("User logged in: {}", user.username);

        Ok(AuthResponse::new(issued.token, issued.expires_at, &user))
    }

    /// Revoke `token` for an authenticated caller. Never fails.
    pub fn logout(&self, ctx: &AuthContext, token: &str) {
        let Some(username) = ctx.username() else {
            return;
        };

        match self.tokens.verify(token) {
            Ok(claims) => {
                self.blacklist.revoke(token, claims.expires_at());
                tracing::info!("User logged out: {}", username);
            }
            Err(e) => tracing::debug!("Logout with unusable token for {}: {}", username, e),
        }
    }

    /// Resolve a bearer token. Any failure yields an anonymous context.
    pub fn authenticate(&self, token: Option<&str>) -> AuthContext {
        let Some(token) = token else {
            return AuthContext::anonymous();
        };

        if self.blacklist.is_revoked(token) {
            tracing::debug!("Rejected revoked token");
            return AuthContext::anonymous();
        }

        match self.tokens.verify(token) {
            Ok(claims) => AuthContext::authenticated(claims.sub),
            Err(e) => {
                tracing::debug!("Rejected token: {}", e);
                AuthContext::anonymous()
            }
        }
    }

    /// Profile of the authenticated caller
    pub async fn whoami(&self, ctx: &AuthContext) -> Result<UserProfile> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        tx.commit().await?;

        Ok(UserProfile::from(user))
    }
}

/// Map a unique-constraint violation that slipped past the existence
/// checks to the matching duplicate error.
fn duplicate_or(error: AppError, req: &RegisterRequest) -> AppError {
    if let AppError::Database(sqlx::Error::Database(db)) = &error {
        if db.is_unique_violation() {
            return if db.message().contains("users.email") {
                AppError::DuplicateEmail(req.email.clone())
            } else {
                AppError::DuplicateUsername(req.username.clone())
            };
        }
    }
    error
}
