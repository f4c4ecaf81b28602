//! Name statistics endpoint
//!
//! `GET /names?name=<name>` returns how often a name was requested and the
//! countries it is predicted to come from.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use namebase_common::db::{CountryPrediction, NameWithPredictions, MAX_NAME_LEN};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for `GET /names`
#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

/// Response body for `GET /names`
#[derive(Debug, Serialize)]
pub struct NameStatsResponse {
    pub name: String,
    pub requests_count: i64,
    pub country_predictions: Vec<CountryPrediction>,
}

impl From<NameWithPredictions> for NameStatsResponse {
    fn from(value: NameWithPredictions) -> Self {
        Self {
            name: value.record.name,
            requests_count: value.record.request_count,
            country_predictions: value.predictions,
        }
    }
}

/// Check the `name` parameter and hand back the validated name
pub fn validate_name(name: Option<&str>) -> ApiResult<&str> {
    let name = match name {
        Some(name) if !name.is_empty() => name,
        _ => return Err(ApiError::BadRequest("Name parameter is missing".to_string())),
    };

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "Name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }

    Ok(name)
}

/// GET /names?name=<name>
pub async fn get_name_stats(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult<Json<NameStatsResponse>> {
    let name = validate_name(query.name.as_deref()).map_err(|e| {
        warn!("Rejected name stats request: {}", e);
        e
    })?;

    let stats = state.reconciler.ensure_fresh(name).await?;

    info!(
        name = %name,
        requests_count = stats.record.request_count,
        predictions = stats.predictions.len(),
        "Name stats returned"
    );

    Ok(Json(stats.into()))
}

/// Build name stats routes
pub fn name_routes() -> Router<AppState> {
    Router::new().route("/names", get(get_name_stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_missing_or_empty() {
        assert!(matches!(validate_name(None), Err(ApiError::BadRequest(_))));
        assert!(matches!(validate_name(Some("")), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_validate_name_length_in_characters() {
        let at_limit = "é".repeat(MAX_NAME_LEN);
        assert_eq!(validate_name(Some(&at_limit)).unwrap(), at_limit);

        let over_limit = "a".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            validate_name(Some(&over_limit)),
            Err(ApiError::BadRequest(_))
        ));
    }
}
