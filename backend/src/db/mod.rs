//! Database module for SQLite persistence.
//!
//! The schema is bootstrapped at startup; all reads and writes go through the
//! generic operations in [`base`] inside a per-request [`Session`].

pub mod base;
mod error;
mod repository;
mod session;

pub use error::DbError;
pub use repository::*;
pub use session::Session;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Pool size used when none is configured.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Initialize the database connection pool with the default pool size.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    init_database_with(db_path, DEFAULT_MAX_CONNECTIONS).await
}

/// Initialize the database connection pool and create the schema.
pub async fn init_database_with(
    db_path: &Path,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Create tables and indexes if they don't exist.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS deck (
            id INTEGER PRIMARY KEY,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS card (
            id INTEGER PRIMARY KEY,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            front TEXT NOT NULL,
            back TEXT,
            hint TEXT,
            deck_id INTEGER REFERENCES deck (id),
            CONSTRAINT card_deck_id_front_uc UNIQUE (deck_id, front)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_card_deck_id ON card(deck_id);")
        .execute(pool)
        .await?;

    Ok(())
}
