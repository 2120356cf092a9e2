// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Run all database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Only drop tables if RESET_DB is set to "true"; prevents data loss on
    // server restarts.
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - dropping all tables and recreating schema");
        sqlx::query("DROP TABLE IF EXISTS users").execute(pool).await?;
    }

    create_users_table(pool).await?;
    create_indexes(pool).await?;

    info!("Database migration completed");
    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL,
            username TEXT,
            password_hash TEXT,
            first_name TEXT,
            last_name TEXT,
            provider TEXT,
            provider_id TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Keep updated_at current on any row mutation.
    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS users_touch_updated_at
        AFTER UPDATE ON users
        BEGIN
            UPDATE users SET updated_at = datetime('now') WHERE id = NEW.id;
        END
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Logical identity key: one row per (email, provider, provider_id).
    // COALESCE folds NULLs so two local rows with the same email collide,
    // while the same email may exist once per external provider.
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_identity
        ON users (email, COALESCE(provider, ''), COALESCE(provider_id, ''))
        "#,
    )
    .execute(pool)
    .await?;

    // Vestigial: no flow populates username, but the column keeps its
    // uniqueness guarantee.
    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users (username)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users (email)")
        .execute(pool)
        .await?;

    Ok(())
}
