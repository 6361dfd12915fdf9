//! Database schema and migrations
//!
//! Versioned SQL migrations recorded in a `migrations` table. Each
//! migration runs in its own transaction.

use crate::error::Result;
use sqlx::{sqlite::SqlitePool, Row};

/// Ordered list of (version, SQL) pairs
const MIGRATIONS: &[(i32, &str)] = &[(1, include_str!("migrations/001_initial_schema.sql"))];

/// Initialize database with schema
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Initializing database schema");

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current_version: i32 = sqlx::query("SELECT COALESCE(MAX(version), 0) FROM migrations")
        .fetch_one(pool)
        .await?
        .get(0);

    tracing::info!("Current database version: {}", current_version);

    apply_migrations(pool, current_version).await?;

    tracing::info!("Database initialization complete");
    Ok(())
}

async fn apply_migrations(pool: &SqlitePool, current_version: i32) -> Result<()> {
    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current_version) {
        tracing::info!("Applying migration version {}", version);

        let mut tx = pool.begin().await?;

        // Migration files never contain ';' outside statement ends
        for statement in sql.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        sqlx::query("INSERT INTO migrations (version) VALUES (?)")
            .bind(version)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Migration version {} applied successfully", version);
    }

    Ok(())
}
