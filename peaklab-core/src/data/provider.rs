//! Series provider trait and structured error types.
//!
//! The SeriesProvider trait abstracts over observation sources (FRED, test
//! doubles) so the loader can swap implementations and mock for tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Observation;

/// Structured error types for data operations.
///
/// Designed to be displayable directly in CLI output.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("series not found: {series_id}")]
    SeriesNotFound { series_id: String },

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("no cached series ending {end_date} — run `download` first")]
    NoCachedSeries { end_date: NaiveDate },

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful fetch of one series.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub series_id: String,
    pub observations: Vec<Observation>,
    pub source: DataSource,
}

/// Where the observations came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Fred,
    Cache,
    Synthetic,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Fred => "fred",
            DataSource::Cache => "cache",
            DataSource::Synthetic => "synthetic",
        }
    }
}

/// Trait for observation providers.
///
/// Implementations handle the specifics of one source. The cache layer
/// sits above this trait — providers don't know about the cache.
pub trait SeriesProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch all published observations of a series over a date range.
    fn fetch(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError>;
}
