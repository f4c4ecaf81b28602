//! Country metadata persistence
//!
//! Countries are insert-once: the first successful metadata fetch for a code
//! is kept for good, later inserts for the same code are no-ops.

use namebase_common::db::Country;
use namebase_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Country columns, qualified with the `c` alias used by every query here
pub(crate) const COUNTRY_COLUMNS: &str = "c.code, c.name_common, c.name_official, \
    c.possible_names, c.region, c.capital_name, c.capital_latitude, c.capital_longitude, \
    c.independent, c.google_maps_url, c.open_maps_url, c.flag_png_url, c.flag_svg_url, \
    c.flag_alt_text, c.coat_of_arms_png_url, c.coat_of_arms_svg_url, c.borders";

/// Build a [`Country`] from a row selected with [`COUNTRY_COLUMNS`]
pub(crate) fn country_from_row(row: &SqliteRow) -> Result<Country> {
    let possible_names: String = row.try_get("possible_names")?;
    let borders: String = row.try_get("borders")?;

    Ok(Country {
        code: row.try_get("code")?,
        name_common: row.try_get("name_common")?,
        name_official: row.try_get("name_official")?,
        possible_names: serde_json::from_str(&possible_names)?,
        region: row.try_get("region")?,
        capital_name: row.try_get("capital_name")?,
        capital_latitude: row.try_get("capital_latitude")?,
        capital_longitude: row.try_get("capital_longitude")?,
        independent: row.try_get("independent")?,
        google_maps_url: row.try_get("google_maps_url")?,
        open_maps_url: row.try_get("open_maps_url")?,
        flag_png_url: row.try_get("flag_png_url")?,
        flag_svg_url: row.try_get("flag_svg_url")?,
        flag_alt_text: row.try_get("flag_alt_text")?,
        coat_of_arms_png_url: row.try_get("coat_of_arms_png_url")?,
        coat_of_arms_svg_url: row.try_get("coat_of_arms_svg_url")?,
        borders: serde_json::from_str(&borders)?,
    })
}

/// Check whether a country code has been cached
pub async fn country_exists(pool: &SqlitePool, code: &str) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM countries WHERE code = ?")
        .bind(code)
        .fetch_optional(pool)
        .await?;

    Ok(found.is_some())
}

/// Load cached country metadata by code
#[cfg(test)]
pub(crate) async fn load_country(pool: &SqlitePool, code: &str) -> Result<Option<Country>> {
    let sql = format!("SELECT {} FROM countries c WHERE c.code = ?", COUNTRY_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(country_from_row).transpose()
}

/// Insert a country unless its code already exists
///
/// Returns `true` when this call created the row. A concurrent writer that
/// lost the race gets `false` and simply uses the existing row.
pub async fn insert_country_if_absent(pool: &SqlitePool, country: &Country) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO countries (
            code, name_common, name_official, possible_names,
            region, capital_name, capital_latitude, capital_longitude,
            independent, google_maps_url, open_maps_url,
            flag_png_url, flag_svg_url, flag_alt_text,
            coat_of_arms_png_url, coat_of_arms_svg_url, borders
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(code) DO NOTHING
        "#,
    )
    .bind(&country.code)
    .bind(&country.name_common)
    .bind(&country.name_official)
    .bind(serde_json::to_string(&country.possible_names)?)
    .bind(&country.region)
    .bind(&country.capital_name)
    .bind(country.capital_latitude)
    .bind(country.capital_longitude)
    .bind(country.independent)
    .bind(&country.google_maps_url)
    .bind(&country.open_maps_url)
    .bind(&country.flag_png_url)
    .bind(&country.flag_svg_url)
    .bind(&country.flag_alt_text)
    .bind(&country.coat_of_arms_png_url)
    .bind(&country.coat_of_arms_svg_url)
    .bind(serde_json::to_string(&country.borders)?)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use namebase_common::db::init_memory_database;

    pub(crate) fn sample_country(code: &str) -> Country {
        Country {
            code: code.to_string(),
            name_common: format!("Country {}", code),
            name_official: format!("Republic of {}", code),
            possible_names: vec![code.to_string(), format!("Land of {}", code)],
            region: "Europe".to_string(),
            capital_name: "Capital".to_string(),
            capital_latitude: Some(51.5),
            capital_longitude: Some(-0.12),
            independent: None,
            google_maps_url: Some("https://goo.gl/maps/example".to_string()),
            open_maps_url: None,
            flag_png_url: Some(format!("https://flagcdn.com/w320/{}.png", code.to_lowercase())),
            flag_svg_url: None,
            flag_alt_text: Some("A flag".to_string()),
            coat_of_arms_png_url: None,
            coat_of_arms_svg_url: None,
            borders: vec!["IRL".to_string()],
        }
    }

    #[tokio::test]
    async fn test_insert_and_load_country() {
        let pool = init_memory_database().await.unwrap();
        let country = sample_country("GB");

        assert!(insert_country_if_absent(&pool, &country).await.unwrap());
        assert!(country_exists(&pool, "GB").await.unwrap());

        let loaded = load_country(&pool, "GB").await.unwrap().unwrap();
        assert_eq!(loaded, country);
    }

    #[tokio::test]
    async fn test_second_insert_keeps_first_metadata() {
        let pool = init_memory_database().await.unwrap();
        let first = sample_country("GB");
        let mut second = sample_country("GB");
        second.name_common = "Overwritten".to_string();

        assert!(insert_country_if_absent(&pool, &first).await.unwrap());
        assert!(!insert_country_if_absent(&pool, &second).await.unwrap());

        let loaded = load_country(&pool, "GB").await.unwrap().unwrap();
        assert_eq!(loaded.name_common, first.name_common);
    }

    #[tokio::test]
    async fn test_tri_state_independent() {
        let pool = init_memory_database().await.unwrap();
        let mut yes = sample_country("AA");
        yes.independent = Some(true);
        let mut no = sample_country("BB");
        no.independent = Some(false);
        let unknown = sample_country("CC");

        for country in [&yes, &no, &unknown] {
            insert_country_if_absent(&pool, country).await.unwrap();
        }

        assert_eq!(load_country(&pool, "AA").await.unwrap().unwrap().independent, Some(true));
        assert_eq!(load_country(&pool, "BB").await.unwrap().unwrap().independent, Some(false));
        assert_eq!(load_country(&pool, "CC").await.unwrap().unwrap().independent, None);
    }

    #[tokio::test]
    async fn test_unknown_country() {
        let pool = init_memory_database().await.unwrap();
        assert!(!country_exists(&pool, "XX").await.unwrap());
        assert!(load_country(&pool, "XX").await.unwrap().is_none());
    }
}
