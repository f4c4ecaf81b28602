//! Database initialization
//!
//! Opens (or creates) the SQLite database and brings the schema up to date.
//! Every statement is idempotent, so startup against an existing database is
//! safe to repeat.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Current schema version recorded in `schema_version`
pub const SCHEMA_VERSION: i64 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Pragmas go on the connect options so every pooled connection gets them
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the full schema
///
/// Limited to a single connection that never expires: each SQLite
/// `:memory:` connection is its own database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_names_table(pool).await?;
    create_countries_table(pool).await?;
    create_name_country_probabilities_table(pool).await?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_names_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS names (
            name TEXT PRIMARY KEY CHECK (length(name) BETWEEN 1 AND 64),
            request_count INTEGER NOT NULL DEFAULT 1 CHECK (request_count >= 1),
            last_accessed_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_countries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS countries (
            code TEXT PRIMARY KEY CHECK (length(code) BETWEEN 1 AND 3),
            name_common TEXT NOT NULL,
            name_official TEXT NOT NULL,
            possible_names TEXT NOT NULL DEFAULT '[]',
            region TEXT NOT NULL DEFAULT '',
            capital_name TEXT NOT NULL DEFAULT '',
            capital_latitude REAL,
            capital_longitude REAL,
            independent INTEGER,
            google_maps_url TEXT,
            open_maps_url TEXT,
            flag_png_url TEXT,
            flag_svg_url TEXT,
            flag_alt_text TEXT,
            coat_of_arms_png_url TEXT,
            coat_of_arms_svg_url TEXT,
            borders TEXT NOT NULL DEFAULT '[]',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_name_country_probabilities_table(pool: &SqlitePool) -> Result<()> {
    // id gives a stable storage order for ties in the popularity ranking
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS name_country_probabilities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL REFERENCES names(name) ON DELETE CASCADE,
            country_code TEXT NOT NULL REFERENCES countries(code) ON DELETE CASCADE,
            probability REAL NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_ncp_name_country \
         ON name_country_probabilities(name, country_code)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_ncp_country \
         ON name_country_probabilities(country_code)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
