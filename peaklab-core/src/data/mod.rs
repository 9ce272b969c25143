//! Data layer: FRED provider, CSV cache, gap filling, and the loader
//! that ties them together.

pub mod cache;
pub mod fred;
pub mod interpolate;
pub mod loader;
pub mod provider;

pub use cache::{CacheMeta, SeriesCache};
pub use fred::FredProvider;
pub use loader::{
    compute_series_hash, load_series, series_origin, LoadError, LoadOptions, LoadedSeries,
    ANNUAL_SERIES, QUARTERLY_SERIES,
};
pub use provider::{DataError, DataSource, FetchResult, SeriesProvider};
