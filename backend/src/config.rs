//! Application configuration
//!
//! Central location for validation boundaries, paging limits and the
//! runtime settings read from the environment.

use crate::error::{AppError, Result};
use std::path::PathBuf;

// ===== Field Limits =====

/// Maximum length of a category name in characters
pub const CATEGORY_NAME_MAX: usize = 50;
/// Maximum length of a category description in characters
pub const CATEGORY_DESCRIPTION_MAX: usize = 255;
/// Maximum length of a tag name in characters
pub const TAG_NAME_MAX: usize = 30;
/// Maximum length of a note title in characters
pub const NOTE_TITLE_MAX: usize = 255;

/// Attachment metadata column widths
pub const ATTACHMENT_NAME_MAX: usize = 255;
pub const ATTACHMENT_PATH_MAX: usize = 255;
pub const ATTACHMENT_TYPE_MAX: usize = 50;

// ===== Account Limits =====

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 20;

// ===== Paging =====

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

// ===== Tokens =====

pub const DEFAULT_JWT_ISSUER: &str = "enote";
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;

// ===== Storage =====

const DEFAULT_DATABASE_PATH: &str = "data/enote.db";
/// Connections held by the application pool
pub const DEFAULT_POOL_SIZE: u32 = 5;
/// How long a connection waits on a locked database file
pub const DATABASE_BUSY_TIMEOUT_SECS: u64 = 5;

/// Token signing settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret. `None` means a random per-process secret is generated.
    pub secret: Option<String>,
    pub issuer: String,
    pub expiration_hours: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            issuer: DEFAULT_JWT_ISSUER.to_string(),
            expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub pool_size: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Configuration with defaults for everything but the database location.
    pub fn for_database(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            pool_size: DEFAULT_POOL_SIZE,
            jwt: JwtConfig::default(),
        }
    }

    /// Load configuration from the environment (and a `.env` file if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_path = std::env::var("ENOTE_DATABASE_PATH")
            .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());

        let pool_size = match std::env::var("ENOTE_DB_POOL_SIZE") {
            Ok(raw) => parse_pool_size(&raw)?,
            Err(_) => DEFAULT_POOL_SIZE,
        };

        let secret = std::env::var("ENOTE_JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let issuer =
            std::env::var("ENOTE_JWT_ISSUER").unwrap_or_else(|_| DEFAULT_JWT_ISSUER.to_string());

        let expiration_hours = match std::env::var("ENOTE_JWT_EXPIRATION_HOURS") {
            Ok(raw) => parse_expiration_hours(&raw)?,
            Err(_) => DEFAULT_JWT_EXPIRATION_HOURS,
        };

        Ok(Self {
            database_path: PathBuf::from(database_path),
            pool_size,
            jwt: JwtConfig {
                secret,
                issuer,
                expiration_hours,
            },
        })
    }
}

fn parse_expiration_hours(raw: &str) -> Result<i64> {
    let hours: i64 = raw.trim().parse().map_err(|_| {
        AppError::Config(format!("ENOTE_JWT_EXPIRATION_HOURS is not a number: {}", raw))
    })?;

    if hours <= 0 {
        return Err(AppError::Config(
            "ENOTE_JWT_EXPIRATION_HOURS must be positive".to_string(),
        ));
    }

    Ok(hours)
}

fn parse_pool_size(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(AppError::Config(format!(
            "ENOTE_DB_POOL_SIZE must be a positive integer: {}",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expiration_hours() {
        assert_eq!(parse_expiration_hours("12").unwrap(), 12);
        assert_eq!(parse_expiration_hours(" 48 ").unwrap(), 48);
        assert!(parse_expiration_hours("0").is_err());
        assert!(parse_expiration_hours("-3").is_err());
        assert!(parse_expiration_hours("soon").is_err());
    }

    #[test]
    fn test_parse_pool_size() {
        assert_eq!(parse_pool_size("8").unwrap(), 8);
        assert!(parse_pool_size("0").is_err());
        assert!(parse_pool_size("many").is_err());
    }

    #[test]
    fn test_for_database_defaults() {
        let config = AppConfig::for_database("/tmp/x.db");
        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert!(config.jwt.secret.is_none());
        assert_eq!(config.jwt.issuer, DEFAULT_JWT_ISSUER);
        assert_eq!(config.jwt.expiration_hours, DEFAULT_JWT_EXPIRATION_HOURS);
    }
}
