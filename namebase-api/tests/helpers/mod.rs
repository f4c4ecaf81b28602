//! Shared fixtures for namebase-api integration tests
//!
//! Provides in-process upstream fakes with call counters and a helper that
//! assembles the full router over an in-memory database.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use namebase_api::services::{
    CountryMetadataError, CountryMetadataSource, CountryProbability, NamePredictor,
    PredictorError, Reconciler,
};
use namebase_api::{build_router, AppState};
use namebase_common::db::{init_memory_database, Country};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Name predictor fake: canned answers per name, everything else fails
#[derive(Default)]
pub struct FakePredictor {
    answers: Mutex<HashMap<String, Vec<CountryProbability>>>,
    calls: AtomicUsize,
}

impl FakePredictor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `name` with the given (code, probability) pairs
    pub fn answer(&self, name: &str, countries: &[(&str, f64)]) {
        let predictions = countries
            .iter()
            .map(|(code, probability)| CountryProbability {
                country_id: code.to_string(),
                probability: *probability,
            })
            .collect();
        self.answers.lock().unwrap().insert(name.to_string(), predictions);
    }

    /// Make every later call for `name` fail
    pub fn fail(&self, name: &str) {
        self.answers.lock().unwrap().remove(name);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NamePredictor for FakePredictor {
    async fn predict(&self, name: &str) -> Result<Vec<CountryProbability>, PredictorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| PredictorError::ApiError(503, "predictor unavailable".to_string()))
    }
}

/// Country metadata fake: knows every code except those marked failing
#[derive(Default)]
pub struct FakeMetadata {
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeMetadata {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_code(&self, code: &str) {
        self.failing.lock().unwrap().insert(code.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, code: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == code).count()
    }
}

#[async_trait]
impl CountryMetadataSource for FakeMetadata {
    async fn fetch_country(&self, code: &str) -> Result<Country, CountryMetadataError> {
        self.calls.lock().unwrap().push(code.to_string());
        if self.failing.lock().unwrap().contains(code) {
            return Err(CountryMetadataError::Timeout(format!("metadata for {}", code)));
        }
        Ok(country_fixture(code))
    }
}

/// Deterministic country metadata for `code`
pub fn country_fixture(code: &str) -> Country {
    Country {
        code: code.to_string(),
        name_common: format!("Country {}", code),
        name_official: format!("Official Country {}", code),
        possible_names: vec![code.to_string()],
        region: "Europe".to_string(),
        capital_name: format!("Capital {}", code),
        capital_latitude: Some(10.0),
        capital_longitude: Some(20.0),
        independent: Some(true),
        google_maps_url: Some(format!("https://maps.example/{}", code)),
        open_maps_url: Some(format!("https://osm.example/{}", code)),
        flag_png_url: Some(format!("https://flags.example/{}.png", code)),
        flag_svg_url: Some(format!("https://flags.example/{}.svg", code)),
        flag_alt_text: Some(format!("Flag of {}", code)),
        coat_of_arms_png_url: None,
        coat_of_arms_svg_url: None,
        borders: vec![],
    }
}

/// Everything a test needs to drive and inspect the service
pub struct TestContext {
    pub pool: SqlitePool,
    pub predictor: Arc<FakePredictor>,
    pub metadata: Arc<FakeMetadata>,
    pub reconciler: Arc<Reconciler>,
}

impl TestContext {
    pub async fn new() -> Self {
        let pool = init_memory_database()
            .await
            .expect("Failed to create in-memory database");
        let predictor = FakePredictor::new();
        let metadata = FakeMetadata::new();

        let reconciler = Arc::new(Reconciler::new(
            pool.clone(),
            predictor.clone(),
            metadata.clone(),
            Duration::hours(24),
        ));

        Self {
            pool,
            predictor,
            metadata,
            reconciler,
        }
    }

    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(self.pool.clone(), self.reconciler.clone()))
    }

    /// Router whose throttle allows `per_minute` requests per client
    pub fn throttled_router(&self, per_minute: u32) -> axum::Router {
        let state = AppState::new(self.pool.clone(), self.reconciler.clone())
            .with_rate_limit(per_minute);
        build_router(state)
    }

    /// Pretend the last access of `name` happened `hours` ago
    pub async fn age_name(&self, name: &str, hours: i64) {
        sqlx::query("UPDATE names SET last_accessed_at = ? WHERE name = ?")
            .bind(Utc::now() - Duration::hours(hours))
            .bind(name)
            .execute(&self.pool)
            .await
            .expect("Failed to age name");
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count rows")
    }
}
