//! Upstream clients and the cache reconciliation engine
//!
//! The two third-party APIs sit behind [`NamePredictor`] and
//! [`CountryMetadataSource`] so the reconciler can be driven by any
//! implementation, including in-process fakes.

use async_trait::async_trait;
use namebase_common::db::Country;

pub mod nationalize_client;
pub mod reconciler;
pub mod restcountries_client;

pub use nationalize_client::{CountryProbability, NationalizeClient, PredictorError};
pub use reconciler::{ReconcileError, Reconciler};
pub use restcountries_client::{CountryMetadataError, RestCountriesClient};

/// Source of country-of-origin predictions for a personal name
#[async_trait]
pub trait NamePredictor: Send + Sync {
    /// Predict countries for `name`, in the order the upstream returns them
    ///
    /// Any failure (transport, status, body) is a total failure for the call.
    async fn predict(&self, name: &str) -> Result<Vec<CountryProbability>, PredictorError>;
}

/// Source of descriptive metadata for a country code
#[async_trait]
pub trait CountryMetadataSource: Send + Sync {
    /// Fetch metadata for `code`; the returned country carries `code` as its key
    async fn fetch_country(&self, code: &str) -> Result<Country, CountryMetadataError>;
}
