//! Cache reconciliation engine
//!
//! Decides for each name lookup whether stored predictions are fresh enough
//! to serve, or whether the name predictor has to be asked again.
//!
//! - **Fresh** (last access inside the freshness window): count the hit,
//!   serve from the database, no upstream calls.
//! - **Stale or unseen**: query the predictor. For every predicted country,
//!   backfill country metadata on first sight and store the probability if
//!   the (name, country) pair is new. Pairs already stored keep their
//!   original probability.
//!
//! A stale refresh never touches the name row itself: its counter and last
//! access stay as they were, so the name stays stale until a cache hit moves
//! it. An unseen name gets its row (count 1) once the predictor answered.
//!
//! A predictor failure aborts the lookup before anything is written. A
//! metadata failure only drops the affected country from this refresh.

use chrono::Duration;
use namebase_common::db::{NameRecord, NameWithPredictions, MAX_COUNTRY_CODE_LEN};
use namebase_common::{time, Error as CommonError};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{CountryMetadataSource, NamePredictor, PredictorError};
use crate::db::{countries, names, predictions};

/// Reconciliation failures surfaced to the caller
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The name predictor call failed; nothing was written
    #[error("Name prediction failed for '{name}': {source}")]
    Prediction {
        name: String,
        #[source]
        source: PredictorError,
    },

    /// Database failure
    #[error(transparent)]
    Store(#[from] CommonError),
}

/// Tally of one predictor-driven refresh
#[derive(Debug, Default)]
struct RefreshSummary {
    countries_created: usize,
    predictions_created: usize,
    skipped: usize,
}

/// Keeps cached name predictions in step with the upstream predictor
pub struct Reconciler {
    db: SqlitePool,
    predictor: Arc<dyn NamePredictor>,
    metadata: Arc<dyn CountryMetadataSource>,
    freshness_window: Duration,
}

impl Reconciler {
    pub fn new(
        db: SqlitePool,
        predictor: Arc<dyn NamePredictor>,
        metadata: Arc<dyn CountryMetadataSource>,
        freshness_window: Duration,
    ) -> Self {
        Self {
            db,
            predictor,
            metadata,
            freshness_window,
        }
    }

    /// Return the stats and predictions for `name`, refreshing them from the
    /// predictor when the cached copy is missing or stale
    pub async fn ensure_fresh(&self, name: &str) -> Result<NameWithPredictions, ReconcileError> {
        let now = time::now();

        match names::load_name(&self.db, name).await? {
            Some(record) if time::is_within(record.last_accessed_at, now, self.freshness_window) => {
                // A concurrent delete between load and update surfaces as NotFound
                let record = names::record_hit(&self.db, name, now)
                    .await?
                    .ok_or_else(|| CommonError::NotFound(format!("name '{}'", name)))?;

                debug!(
                    name = %name,
                    request_count = record.request_count,
                    "Cache hit"
                );

                let predictions = predictions::predictions_for_name(&self.db, name).await?;
                Ok(NameWithPredictions { record, predictions })
            }
            Some(record) => {
                info!(
                    name = %name,
                    last_accessed_at = %record.last_accessed_at,
                    "Cached predictions stale, refreshing"
                );
                self.refresh(name, Some(record), now).await
            }
            None => {
                info!(name = %name, "Unseen name, fetching predictions");
                self.refresh(name, None, now).await
            }
        }
    }

    async fn refresh(
        &self,
        name: &str,
        existing: Option<NameRecord>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<NameWithPredictions, ReconcileError> {
        let predicted = self.predictor.predict(name).await.map_err(|source| {
            error!(name = %name, error = %source, "Name predictor call failed");
            ReconcileError::Prediction {
                name: name.to_string(),
                source,
            }
        })?;

        let record = match existing {
            Some(record) => record,
            None => names::insert_name_if_absent(&self.db, name, now).await?,
        };

        let mut summary = RefreshSummary::default();
        for prediction in &predicted {
            let code = prediction.country_id.as_str();

            if !is_valid_country_code(code) {
                warn!(name = %name, code = %code, "Skipping prediction with malformed country code");
                summary.skipped += 1;
                continue;
            }

            match self.ensure_country(code).await? {
                CountryState::Known => {}
                CountryState::Created => summary.countries_created += 1,
                CountryState::Unavailable => {
                    summary.skipped += 1;
                    continue;
                }
            }

            if predictions::insert_prediction_if_absent(&self.db, name, code, prediction.probability)
                .await?
            {
                summary.predictions_created += 1;
            }
        }

        info!(
            name = %name,
            predicted = predicted.len(),
            countries_created = summary.countries_created,
            predictions_created = summary.predictions_created,
            skipped = summary.skipped,
            "Refreshed name predictions"
        );

        let predictions = predictions::predictions_for_name(&self.db, name).await?;
        Ok(NameWithPredictions { record, predictions })
    }

    /// Make sure metadata for `code` is cached, fetching it on first sight
    async fn ensure_country(&self, code: &str) -> Result<CountryState, CommonError> {
        if countries::country_exists(&self.db, code).await? {
            return Ok(CountryState::Known);
        }

        let country = match self.metadata.fetch_country(code).await {
            Ok(country) => country,
            Err(e) => {
                error!(code = %code, error = %e, "Country metadata fetch failed, skipping country");
                return Ok(CountryState::Unavailable);
            }
        };

        if countries::insert_country_if_absent(&self.db, &country).await? {
            info!(code = %code, "Country created");
            Ok(CountryState::Created)
        } else {
            // Another request stored it between our check and insert
            Ok(CountryState::Known)
        }
    }
}

enum CountryState {
    Known,
    Created,
    Unavailable,
}

/// Country codes are short ASCII-alphanumeric keys that go into a URL path
fn is_valid_country_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_COUNTRY_CODE_LEN
        && code.chars().all(|c| c.is_ascii_alphanumeric())
}
