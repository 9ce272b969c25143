//! Observation and GdpSeries — the raw quarterly series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One dated observation of real GDP, in billions of chained 2012 dollars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// Errors raised while constructing a [`GdpSeries`].
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("series is empty")]
    Empty,
    #[error("dates not strictly increasing at index {index}: {prev} then {next}")]
    NonMonotonic {
        index: usize,
        prev: NaiveDate,
        next: NaiveDate,
    },
    #[error("non-finite value at index {index} ({date})")]
    NonFinite { index: usize, date: NaiveDate },
}

/// The quarterly real GDP series, ordered ascending by date.
///
/// Ordering and finiteness are checked once at construction, so the aligner
/// can treat every series it receives as well-formed. The inner vector is
/// never exposed mutably.
#[derive(Debug, Clone, PartialEq)]
pub struct GdpSeries {
    observations: Vec<Observation>,
}

impl GdpSeries {
    /// Build a series from observations, validating that it is non-empty,
    /// strictly increasing by date, and free of NaN/infinite values.
    pub fn new(observations: Vec<Observation>) -> Result<Self, SeriesError> {
        if observations.is_empty() {
            return Err(SeriesError::Empty);
        }
        for (i, obs) in observations.iter().enumerate() {
            if !obs.value.is_finite() {
                return Err(SeriesError::NonFinite {
                    index: i,
                    date: obs.date,
                });
            }
            if i > 0 && observations[i - 1].date >= obs.date {
                return Err(SeriesError::NonMonotonic {
                    index: i,
                    prev: observations[i - 1].date,
                    next: obs.date,
                });
            }
        }
        Ok(Self { observations })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Date of the earliest observation.
    pub fn first_date(&self) -> NaiveDate {
        self.observations[0].date
    }

    /// Date of the latest observation. For a freshly downloaded series this
    /// is the last published quarter, which names the cache entry.
    pub fn last_date(&self) -> NaiveDate {
        self.observations[self.observations.len() - 1].date
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }
}
