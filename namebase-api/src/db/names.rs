//! Name statistics persistence

use chrono::{DateTime, Utc};
use namebase_common::db::NameRecord;
use namebase_common::{Error, Result};
use sqlx::{Row, SqlitePool};

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<NameRecord> {
    Ok(NameRecord {
        name: row.try_get("name")?,
        request_count: row.try_get("request_count")?,
        last_accessed_at: row.try_get("last_accessed_at")?,
    })
}

/// Load name statistics by exact (case-sensitive) name
pub async fn load_name(pool: &SqlitePool, name: &str) -> Result<Option<NameRecord>> {
    let row = sqlx::query(
        "SELECT name, request_count, last_accessed_at FROM names WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// Count a fresh-cache hit: bump `request_count` and `last_accessed_at`
///
/// Returns the updated record, or `None` if the row no longer exists.
pub async fn record_hit(
    pool: &SqlitePool,
    name: &str,
    now: DateTime<Utc>,
) -> Result<Option<NameRecord>> {
    let row = sqlx::query(
        r#"
        UPDATE names
        SET request_count = request_count + 1,
            last_accessed_at = ?
        WHERE name = ?
        RETURNING name, request_count, last_accessed_at
        "#,
    )
    .bind(now)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// Create the row for a name seen for the first time
///
/// The new row starts at `request_count = 1`. If another request created it
/// first, the existing row is returned untouched.
pub async fn insert_name_if_absent(
    pool: &SqlitePool,
    name: &str,
    now: DateTime<Utc>,
) -> Result<NameRecord> {
    sqlx::query(
        r#"
        INSERT INTO names (name, request_count, last_accessed_at)
        VALUES (?, 1, ?)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(name)
    .bind(now)
    .execute(pool)
    .await?;

    load_name(pool, name)
        .await?
        .ok_or_else(|| Error::NotFound(format!("name '{}'", name)))
}
