//! Name predictor client (Nationalize-style API)
//!
//! `GET <base>?name=<name>` answers with the countries a name most likely
//! comes from:
//!
//! ```json
//! {"count": 1234, "name": "Andrew", "country": [{"country_id": "GB", "probability": 0.3}]}
//! ```

use async_trait::async_trait;
use namebase_common::config::UpstreamConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::NamePredictor;

const USER_AGENT: &str = concat!("namebase/", env!("CARGO_PKG_VERSION"));

/// Name predictor client errors
#[derive(Debug, Error)]
pub enum PredictorError {
    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Predictor returned a non-2xx response
    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    /// Failed to parse API response JSON
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for PredictorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PredictorError::Timeout(err.to_string())
        } else if err.is_decode() {
            PredictorError::ParseError(err.to_string())
        } else {
            PredictorError::NetworkError(err.to_string())
        }
    }
}

/// One predicted country for a name
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CountryProbability {
    pub country_id: String,
    pub probability: f64,
}

#[derive(Debug, Deserialize)]
struct NationalizeResponse {
    country: Vec<CountryProbability>,
}

/// HTTP client for the name predictor
pub struct NationalizeClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl NationalizeClient {
    /// Create new predictor client from upstream configuration
    pub fn new(config: &UpstreamConfig) -> Result<Self, PredictorError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PredictorError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.predictor_url.clone(),
        })
    }
}

#[async_trait]
impl NamePredictor for NationalizeClient {
    async fn predict(&self, name: &str) -> Result<Vec<CountryProbability>, PredictorError> {
        tracing::debug!(name = %name, url = %self.base_url, "Querying name predictor");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("name", name)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PredictorError::ApiError(status.as_u16(), error_text));
        }

        let body: NationalizeResponse = response
            .json()
            .await
            .map_err(|e| PredictorError::ParseError(e.to_string()))?;

        tracing::info!(
            name = %name,
            countries = body.country.len(),
            "Name prediction successful"
        );

        Ok(body.country)
    }
}
