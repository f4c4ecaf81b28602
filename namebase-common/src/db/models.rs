//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a name key, in characters
pub const MAX_NAME_LEN: usize = 64;

/// Maximum length of a country code, in characters
pub const MAX_COUNTRY_CODE_LEN: usize = 3;

/// Per-name query statistics (`names` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameRecord {
    pub name: String,
    pub request_count: i64,
    pub last_accessed_at: DateTime<Utc>,
}

/// Cached country metadata (`countries` table)
///
/// Written once when a code is first seen, never refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,

    // names
    pub name_common: String,
    pub name_official: String,
    pub possible_names: Vec<String>,

    // geography
    pub region: String,
    pub capital_name: String,
    pub capital_latitude: Option<f64>,
    pub capital_longitude: Option<f64>,

    /// `None` when the upstream does not say
    pub independent: Option<bool>,

    // links
    pub google_maps_url: Option<String>,
    pub open_maps_url: Option<String>,

    // flags and coat of arms
    pub flag_png_url: Option<String>,
    pub flag_svg_url: Option<String>,
    pub flag_alt_text: Option<String>,
    pub coat_of_arms_png_url: Option<String>,
    pub coat_of_arms_svg_url: Option<String>,

    pub borders: Vec<String>,
}

/// One association row joined with its country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryPrediction {
    pub probability: f64,
    pub country: Country,
}

/// A name together with every association currently stored for it
#[derive(Debug, Clone, PartialEq)]
pub struct NameWithPredictions {
    pub record: NameRecord,
    pub predictions: Vec<CountryPrediction>,
}

/// Entry of the per-country popularity ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularName {
    pub name: String,
    pub frequency: i64,
}
