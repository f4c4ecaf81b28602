//! Country metadata client (REST Countries-style API)
//!
//! `GET <base>/<code>` answers with a JSON array whose first element
//! describes the country. The `name`, `maps`, `flags` and `coatOfArms`
//! objects must be present; leaves the upstream routinely omits (for example
//! `coatOfArms.png` for territories without arms) are optional.

use async_trait::async_trait;
use namebase_common::config::UpstreamConfig;
use namebase_common::db::Country;
use serde::Deserialize;
use thiserror::Error;

use super::CountryMetadataSource;

const USER_AGENT: &str = concat!("namebase/", env!("CARGO_PKG_VERSION"));

/// Country metadata client errors
#[derive(Debug, Error)]
pub enum CountryMetadataError {
    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Code unknown to the metadata service
    #[error("Country not found in metadata service: {0}")]
    CountryNotFound(String),

    /// Metadata service returned a non-2xx response
    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    /// Body missing required fields or not JSON
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for CountryMetadataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CountryMetadataError::Timeout(err.to_string())
        } else if err.is_decode() {
            CountryMetadataError::ParseError(err.to_string())
        } else {
            CountryMetadataError::NetworkError(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCountry {
    cca2: Option<String>,
    name: RawName,
    #[serde(rename = "altSpellings", default)]
    alt_spellings: Vec<String>,
    #[serde(default)]
    region: String,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default)]
    latlng: Vec<f64>,
    independent: Option<bool>,
    maps: RawMaps,
    flags: RawFlags,
    #[serde(rename = "coatOfArms")]
    coat_of_arms: RawCoatOfArms,
    #[serde(default)]
    borders: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawName {
    common: String,
    official: String,
}

#[derive(Debug, Deserialize)]
struct RawMaps {
    #[serde(rename = "googleMaps")]
    google_maps: Option<String>,
    #[serde(rename = "openStreetMaps")]
    open_street_maps: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFlags {
    png: Option<String>,
    svg: Option<String>,
    alt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCoatOfArms {
    png: Option<String>,
    svg: Option<String>,
}

impl RawCountry {
    fn into_country(self, code: &str) -> Country {
        if let Some(cca2) = self.cca2.as_deref() {
            if cca2 != code {
                tracing::debug!(code = %code, cca2 = %cca2, "Metadata cca2 differs from requested code");
            }
        }

        Country {
            code: code.to_string(),
            name_common: self.name.common,
            name_official: self.name.official,
            possible_names: self.alt_spellings,
            region: self.region,
            capital_name: self.capital.into_iter().next().unwrap_or_default(),
            capital_latitude: self.latlng.first().copied(),
            capital_longitude: self.latlng.get(1).copied(),
            independent: self.independent,
            google_maps_url: self.maps.google_maps,
            open_maps_url: self.maps.open_street_maps,
            flag_png_url: self.flags.png,
            flag_svg_url: self.flags.svg,
            flag_alt_text: self.flags.alt,
            coat_of_arms_png_url: self.coat_of_arms.png,
            coat_of_arms_svg_url: self.coat_of_arms.svg,
            borders: self.borders,
        }
    }
}

/// Parse a metadata response body into a [`Country`] keyed by `code`
pub fn parse_country(code: &str, body: &str) -> Result<Country, CountryMetadataError> {
    let entries: Vec<RawCountry> =
        serde_json::from_str(body).map_err(|e| CountryMetadataError::ParseError(e.to_string()))?;

    entries
        .into_iter()
        .next()
        .map(|raw| raw.into_country(code))
        .ok_or_else(|| CountryMetadataError::ParseError("empty country array".to_string()))
}

/// HTTP client for the country metadata service
pub struct RestCountriesClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl RestCountriesClient {
    /// Create new metadata client from upstream configuration
    pub fn new(config: &UpstreamConfig) -> Result<Self, CountryMetadataError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CountryMetadataError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.metadata_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CountryMetadataSource for RestCountriesClient {
    async fn fetch_country(&self, code: &str) -> Result<Country, CountryMetadataError> {
        let url = format!("{}/{}", self.base_url, code);

        tracing::debug!(code = %code, url = %url, "Querying country metadata service");

        let response = self.http_client.get(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CountryMetadataError::CountryNotFound(code.to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CountryMetadataError::ApiError(status.as_u16(), error_text));
        }

        let body = response.text().await?;
        let country = parse_country(code, &body)?;

        tracing::info!(code = %code, name = %country.name_common, "Country metadata lookup successful");

        Ok(country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GB_BODY: &str = r#"[{
        "cca2": "GB",
        "name": {"common": "United Kingdom", "official": "United Kingdom of Great Britain and Northern Ireland"},
        "altSpellings": ["GB", "UK", "Great Britain"],
        "region": "Europe",
        "capital": ["London"],
        "latlng": [54.0, -2.0],
        "independent": true,
        "maps": {"googleMaps": "https://goo.gl/maps/FoDtc3UKMkFsXAjHA", "openStreetMaps": "https://www.openstreetmap.org/relation/62149"},
        "flags": {"png": "https://flagcdn.com/w320/gb.png", "svg": "https://flagcdn.com/gb.svg", "alt": "The flag of the United Kingdom"},
        "coatOfArms": {"png": "https://mainfacts.com/media/images/coats_of_arms/gb.png", "svg": "https://mainfacts.com/media/images/coats_of_arms/gb.svg"},
        "borders": ["IRL"]
    }]"#;

    #[test]
    fn test_parse_full_country() {
        let country = parse_country("GB", GB_BODY).unwrap();

        assert_eq!(country.code, "GB");
        assert_eq!(country.name_common, "United Kingdom");
        assert_eq!(country.possible_names, vec!["GB", "UK", "Great Britain"]);
        assert_eq!(country.capital_name, "London");
        assert_eq!(country.capital_latitude, Some(54.0));
        assert_eq!(country.capital_longitude, Some(-2.0));
        assert_eq!(country.independent, Some(true));
        assert_eq!(country.flag_alt_text.as_deref(), Some("The flag of the United Kingdom"));
        assert_eq!(country.borders, vec!["IRL"]);
    }

    #[test]
    fn test_optional_leaves_default() {
        let body = r#"[{
            "name": {"common": "Antarctica", "official": "Antarctica"},
            "maps": {},
            "flags": {},
            "coatOfArms": {}
        }]"#;

        let country = parse_country("AQ", body).unwrap();

        assert!(country.possible_names.is_empty());
        assert_eq!(country.capital_name, "");
        assert_eq!(country.capital_latitude, None);
        assert_eq!(country.independent, None);
        assert_eq!(country.coat_of_arms_png_url, None);
        assert!(country.borders.is_empty());
    }

    #[test]
    fn test_missing_required_object_is_error() {
        let body = r#"[{"name": {"common": "X", "official": "X"}, "maps": {}, "flags": {}}]"#;
        assert!(matches!(
            parse_country("XX", body),
            Err(CountryMetadataError::ParseError(_))
        ));
    }

    #[test]
    fn test_empty_array_is_error() {
        assert!(matches!(
            parse_country("XX", "[]"),
            Err(CountryMetadataError::ParseError(_))
        ));
    }

    #[test]
    fn test_non_array_body_is_error() {
        let body = r#"{"status": 404, "message": "Not Found"}"#;
        assert!(parse_country("XX", body).is_err());
    }
}
