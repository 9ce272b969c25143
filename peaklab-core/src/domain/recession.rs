//! Recession catalog — fixed windows and labels for the fifteen U.S.
//! recessions since 1929.
//!
//! The catalog is the aligner's configuration: each entry names one
//! recession and the calendar window in which its pre-recession GDP peak
//! must fall. The built-in catalog follows the NBER business cycle dates.
//! A custom catalog can be loaded from TOML (dates as `YYYY-MM-DD` strings).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors raised while building or parsing a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("peak window starts after it ends: {start} > {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
    #[error("read catalog file: {0}")]
    Io(String),
    #[error("parse catalog TOML: {0}")]
    Parse(String),
    #[error("serialize catalog: {0}")]
    Serialize(String),
}

/// Closed calendar interval in which one recession's peak is searched.
///
/// Both endpoints are inclusive; an observation dated exactly on `start`
/// or `end` is inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CatalogError> {
        if start > end {
            return Err(CatalogError::InvertedWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.start, self.end)
    }
}

/// One recession: its display labels and its peak-search window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recession {
    /// Year-range label, e.g. "1929-1933".
    pub label_years: String,
    /// Month-range label, e.g. "Aug 1929 - Mar 1933".
    pub label_months: String,
    /// Onset month, e.g. "Aug 1929".
    pub onset: String,
    /// Window in which the pre-recession peak must fall.
    pub peak_window: DateWindow,
}

/// Ordered list of recessions, oldest first. Column order everywhere
/// downstream (table, CSV, chart) follows this order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecessionCatalog {
    recessions: Vec<Recession>,
}

impl RecessionCatalog {
    /// Build a catalog from entries, validating every peak window.
    pub fn new(recessions: Vec<Recession>) -> Result<Self, CatalogError> {
        let catalog = Self { recessions };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse a catalog from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let catalog: Self =
            toml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Serialize the catalog to TOML.
    pub fn to_toml(&self) -> Result<String, CatalogError> {
        toml::to_string_pretty(self).map_err(|e| CatalogError::Serialize(e.to_string()))
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for rec in &self.recessions {
            // Deserialization bypasses DateWindow::new, so re-check here.
            DateWindow::new(rec.peak_window.start, rec.peak_window.end)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.recessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recessions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Recession> {
        self.recessions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recession> {
        self.recessions.iter()
    }

    /// Year-range labels in catalog order, e.g. "1981-1982".
    pub fn year_labels(&self) -> Vec<&str> {
        self.recessions.iter().map(|r| r.label_years.as_str()).collect()
    }

    /// Month-range labels in catalog order, e.g. "Jul 1981 - Nov 1982".
    pub fn month_labels(&self) -> Vec<&str> {
        self.recessions.iter().map(|r| r.label_months.as_str()).collect()
    }

    /// Onset-month labels in catalog order, e.g. "Jul 1981".
    pub fn onset_labels(&self) -> Vec<&str> {
        self.recessions.iter().map(|r| r.onset.as_str()).collect()
    }

    /// Peak-search windows in catalog order.
    pub fn peak_windows(&self) -> Vec<DateWindow> {
        self.recessions.iter().map(|r| r.peak_window).collect()
    }

    /// The built-in catalog: all fifteen U.S. recessions from 1929 through
    /// 2020, with peak windows sized so each contains exactly one local
    /// maximum of real GDP.
    pub fn us_recessions() -> Self {
        fn d(y: i32, m: u32, day: u32) -> NaiveDate {
            NaiveDate::from_ymd_opt(y, m, day).unwrap()
        }
        fn rec(
            label_years: &str,
            label_months: &str,
            onset: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Recession {
            Recession {
                label_years: label_years.into(),
                label_months: label_months.into(),
                onset: onset.into(),
                peak_window: DateWindow { start, end },
            }
        }

        Self {
            recessions: vec![
                rec("1929-1933", "Aug 1929 - Mar 1933", "Aug 1929", d(1929, 7, 1), d(1929, 10, 1)),
                rec("1937-1938", "May 1937 - Jun 1938", "May 1937", d(1937, 4, 1), d(1937, 10, 1)),
                rec("1945", "Feb 1945 - Oct 1945", "Feb 1945", d(1945, 1, 1), d(1945, 4, 1)),
                rec("1948-1949", "Nov 1948 - Oct 1949", "Nov 1948", d(1948, 7, 1), d(1949, 1, 1)),
                rec("1953-1954", "Jul 1953 - May 1954", "Jul 1953", d(1953, 4, 1), d(1953, 7, 1)),
                rec("1957-1958", "Aug 1957 - Apr 1958", "Aug 1957", d(1957, 7, 1), d(1957, 10, 1)),
                rec("1960-1961", "Apr 1960 - Feb 1961", "Apr 1960", d(1960, 1, 1), d(1960, 4, 1)),
                rec("1969-1970", "Dec 1969 - Nov 1970", "Dec 1969", d(1969, 7, 1), d(1970, 1, 1)),
                rec("1973-1975", "Nov 1973 - Mar 1975", "Nov 1973", d(1973, 10, 1), d(1974, 1, 1)),
                rec("1980", "Jan 1980 - Jul 1980", "Jan 1980", d(1979, 10, 1), d(1980, 4, 1)),
                rec("1981-1982", "Jul 1981 - Nov 1982", "Jul 1981", d(1981, 4, 1), d(1981, 10, 1)),
                rec("1990-1991", "Jul 1990 - Mar 1991", "Jul 1990", d(1990, 4, 1), d(1991, 10, 1)),
                rec("2001", "Mar 2001 - Nov 2001", "Mar 2001", d(2001, 1, 1), d(2001, 7, 1)),
                rec("2007-2009", "Dec 2007 - Jun 2009", "Dec 2007", d(2007, 7, 1), d(2008, 1, 1)),
                rec("2020-2020", "Feb 2020 - Apr 2020", "Feb 2020", d(2019, 10, 1), d(2020, 3, 1)),
            ],
        }
    }
}
