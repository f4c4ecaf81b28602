//! Popular names by country endpoint
//!
//! `GET /popular-names?country=<code>` ranks previously looked-up names
//! associated with a country by how often they were requested. Served purely
//! from the database; never calls an upstream.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use namebase_common::db::PopularName;
use serde::Deserialize;
use tracing::{info, warn};

use crate::db::{countries, predictions};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for `GET /popular-names`
#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub country: Option<String>,
}

/// GET /popular-names?country=<code>
pub async fn get_popular_names(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> ApiResult<Json<Vec<PopularName>>> {
    let code = match query.country.as_deref() {
        Some(code) if !code.is_empty() => code,
        _ => {
            warn!("Country code parameter is missing");
            return Err(ApiError::BadRequest(
                "Country code parameter is missing".to_string(),
            ));
        }
    };

    if !countries::country_exists(&state.db, code).await? {
        warn!(code = %code, "Country with such code does not exist in database");
        return Err(ApiError::NotFound(format!(
            "Country with code '{}' does not exist in database",
            code
        )));
    }

    let names = predictions::popular_names_for_country(&state.db, code).await?;
    if names.is_empty() {
        info!(code = %code, "No names found for country");
        return Err(ApiError::NotFound(format!("No names found for {}", code)));
    }

    info!(code = %code, names = names.len(), "Popular names returned");
    Ok(Json(names))
}

/// Build popular names routes
pub fn popular_routes() -> Router<AppState> {
    Router::new().route("/popular-names", get(get_popular_names))
}
