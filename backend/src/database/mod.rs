//! Database module
//!
//! Opening the SQLite file, schema migrations, row models and the
//! transaction-scoped repository.

pub mod models;
pub mod repository;
pub mod schema;

pub use models::*;
pub use repository::{
    RepoTx, Repository, CATEGORY_SORT_FIELDS, NOTE_SORT_FIELDS, TAG_SORT_FIELDS,
};
pub use schema::initialize_database;

use crate::config::DATABASE_BUSY_TIMEOUT_SECS;
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

fn connect_options(db_path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(DATABASE_BUSY_TIMEOUT_SECS))
        .foreign_keys(true)
}

async fn open(options: SqliteConnectOptions, size: u32) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(size)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Open the database at `db_path` with `pool_size` pooled connections.
///
/// Missing parent directories and the file itself are created. The schema
/// is migrated over a single private connection first, so no pooled
/// connection ever sees a half-migrated database.
pub async fn create_pool(db_path: &Path, pool_size: u32) -> Result<SqlitePool> {
    tracing::info!("Opening database at {:?}", db_path);

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let options = connect_options(db_path);

    let migrator = open(options.clone(), 1).await?;
    let migrated = initialize_database(&migrator).await;
    migrator.close().await;
    migrated?;

    let pool = open(options, pool_size).await?;

    tracing::info!("Database ready with up to {} connections", pool_size);

    Ok(pool)
}
