//! Name-country probability persistence (the association bridge table)

use namebase_common::db::{CountryPrediction, PopularName};
use namebase_common::Result;
use sqlx::{Row, SqlitePool};

use super::countries::{country_from_row, COUNTRY_COLUMNS};

/// Store the probability for a (name, country) pair unless one exists
///
/// An existing pair keeps its original probability. Returns `true` when a
/// new row was written.
pub async fn insert_prediction_if_absent(
    pool: &SqlitePool,
    name: &str,
    country_code: &str,
    probability: f64,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO name_country_probabilities (name, country_code, probability)
        VALUES (?, ?, ?)
        ON CONFLICT(name, country_code) DO NOTHING
        "#,
    )
    .bind(name)
    .bind(country_code)
    .bind(probability)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// All stored predictions for a name, joined with country metadata,
/// in insertion order
pub async fn predictions_for_name(pool: &SqlitePool, name: &str) -> Result<Vec<CountryPrediction>> {
    let sql = format!(
        r#"
        SELECT p.probability, {}
        FROM name_country_probabilities p
        JOIN countries c ON c.code = p.country_code
        WHERE p.name = ?
        ORDER BY p.id
        "#,
        COUNTRY_COLUMNS
    );

    let rows = sqlx::query(&sql).bind(name).fetch_all(pool).await?;

    rows.iter()
        .map(|row| -> Result<CountryPrediction> {
            Ok(CountryPrediction {
                probability: row.try_get("probability")?,
                country: country_from_row(row)?,
            })
        })
        .collect()
}

/// Names associated with a country, most requested first
///
/// Ties keep association insertion order.
pub async fn popular_names_for_country(
    pool: &SqlitePool,
    country_code: &str,
) -> Result<Vec<PopularName>> {
    let rows = sqlx::query(
        r#"
        SELECT n.name, n.request_count
        FROM name_country_probabilities p
        JOIN names n ON n.name = p.name
        WHERE p.country_code = ?
        ORDER BY n.request_count DESC, p.id ASC
        "#,
    )
    .bind(country_code)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<PopularName> {
            Ok(PopularName {
                name: row.try_get("name")?,
                frequency: row.try_get("request_count")?,
            })
        })
        .collect()
}
