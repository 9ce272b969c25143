//! Domain types: observations, the validated GDP series, and the
//! recession catalog.

pub mod recession;
pub mod series;

pub use recession::{CatalogError, DateWindow, Recession, RecessionCatalog};
pub use series::{GdpSeries, Observation, SeriesError};
