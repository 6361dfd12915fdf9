//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::auth::{TokenBlacklist, TokenService};
use crate::config::AppConfig;
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::services::{AuthService, CategoryService, NoteContentService, NoteService, TagService};
use sqlx::SqlitePool;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub auth: AuthService,
    pub categories: CategoryService,
    pub tags: TagService,
    pub notes: NoteService,
    pub note_content: NoteContentService,
}

impl AppState {
    /// Wire every service onto an already migrated pool.
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        let repo = Repository::new(pool);
        let tokens = TokenService::new(&config.jwt);

        Self {
            auth: AuthService::new(repo.clone(), tokens, TokenBlacklist::new()),
            categories: CategoryService::new(repo.clone()),
            tags: TagService::new(repo.clone()),
            notes: NoteService::new(repo.clone()),
            note_content: NoteContentService::new(repo.clone()),
            repo,
        }
    }

    /// Application setup - called once on startup
    pub async fn initialize(config: &AppConfig) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("Database path: {:?}", config.database_path);

        let pool = create_pool(&config.database_path, config.pool_size).await?;
        let state = Self::new(pool, config);

        tracing::info!("Application initialized successfully");

        Ok(state)
    }
}
