//! PeakLab Core — recession catalog, peak alignment, and the GDP data layer.
//!
//! The heart of the crate is the aligner: given the quarterly U.S. real
//! GDP series and the fixed catalog of fifteen recessions, it finds each
//! recession's pre-recession peak, re-indexes the series as integer
//! quarters from that peak, normalizes values as fractions of the peak,
//! and consolidates all fifteen sub-series into one wide table on a
//! shared quarters-from-peak axis.
//!
//! - Domain types (observations, the validated series, the catalog)
//! - Peak search, quarter offsets, table consolidation, ratio summary
//! - FRED provider, CSV cache, cubic gap fill, loading fallback ladder

pub mod align;
pub mod data;
pub mod domain;
