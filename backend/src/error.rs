//! Error types for the eNote backend
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized for the transport layer, which maps
//! them to status codes through [`AppError::status_code`].

use std::fmt;
use thiserror::Error;

/// Kind of resource named in not-found and permission errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    User,
    Category,
    Tag,
    Note,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::User => "user",
            ResourceKind::Category => "category",
            ResourceKind::Tag => "tag",
            ResourceKind::Note => "note",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    /// The authenticated principal has no matching user record.
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },

    #[error("You don't have permission to access this {0}")]
    PermissionDenied(ResourceKind),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Invalid username or password")]
    InvalidCredentials,
}

impl AppError {
    pub fn not_found(kind: ResourceKind, id: impl ToString) -> Self {
        AppError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// HTTP status the transport layer reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotAuthenticated => 401,
            AppError::NotFound { .. } => 404,
            AppError::PermissionDenied(_)
            | AppError::Validation(_)
            | AppError::DuplicateUsername(_)
            | AppError::DuplicateEmail(_)
            | AppError::InvalidCredentials => 400,
            AppError::UserNotFound(_)
            | AppError::Database(_)
            | AppError::Io(_)
            | AppError::Token(_)
            | AppError::PasswordHash(_)
            | AppError::Config(_) => 500,
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotAuthenticated.status_code(), 401);
        assert_eq!(AppError::not_found(ResourceKind::Tag, 7).status_code(), 404);
        assert_eq!(
            AppError::PermissionDenied(ResourceKind::Note).status_code(),
            400
        );
        assert_eq!(AppError::InvalidCredentials.status_code(), 400);
        assert_eq!(AppError::UserNotFound("ghost".into()).status_code(), 500);
    }

    #[test]
    fn test_serializes_as_message() {
        let err = AppError::not_found(ResourceKind::Category, 42);
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"category not found: 42\"");
    }
}
