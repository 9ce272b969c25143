//! FRED data provider.
//!
//! Fetches series observations from the St. Louis Fed's fredgraph CSV
//! endpoint. Handles transient network failures with bounded retries and
//! exponential backoff. The endpoint is unauthenticated; the CSV cache is
//! the primary offline path.

use chrono::NaiveDate;
use std::time::Duration;

use crate::domain::Observation;

use super::provider::{DataError, DataSource, FetchResult, SeriesProvider};

/// FRED CSV provider.
pub struct FredProvider {
    client: reqwest::blocking::Client,
    max_retries: u32,
    base_delay: Duration,
}

impl FredProvider {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("peaklab/0.1")
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    /// Build the fredgraph CSV URL for a series and date range.
    fn csv_url(series_id: &str, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "https://fred.stlouisfed.org/graph/fredgraph.csv\
             ?id={series_id}&cosd={start}&coed={end}"
        )
    }

    /// Parse a fredgraph CSV body into observations.
    ///
    /// The body has a date column and one value column. Unpublished values
    /// are encoded as "." and skipped. An unknown series id comes back as
    /// an HTML error page, not CSV.
    fn parse_csv(series_id: &str, body: &str) -> Result<Vec<Observation>, DataError> {
        if body.trim_start().starts_with('<') {
            return Err(DataError::SeriesNotFound {
                series_id: series_id.to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(body.as_bytes());

        let mut observations = Vec::new();
        for record in reader.records() {
            let record = record
                .map_err(|e| DataError::ResponseFormatChanged(format!("csv parse: {e}")))?;
            let date_field = record.get(0).ok_or_else(|| {
                DataError::ResponseFormatChanged("row without a date column".into())
            })?;
            let value_field = record.get(1).ok_or_else(|| {
                DataError::ResponseFormatChanged("row without a value column".into())
            })?;

            let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d").map_err(|e| {
                DataError::ResponseFormatChanged(format!("bad date '{date_field}': {e}"))
            })?;

            let trimmed = value_field.trim();
            if trimmed.is_empty() || trimmed == "." || trimmed.eq_ignore_ascii_case("nan") {
                continue;
            }
            let value: f64 = trimmed.parse().map_err(|e| {
                DataError::ResponseFormatChanged(format!("bad value '{trimmed}': {e}"))
            })?;

            observations.push(Observation { date, value });
        }

        if observations.is_empty() {
            return Err(DataError::SeriesNotFound {
                series_id: series_id.to_string(),
            });
        }

        Ok(observations)
    }

    /// Execute the HTTP request with retry and backoff.
    fn fetch_with_retry(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>, DataError> {
        let url = Self::csv_url(series_id, start, end);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);
            }

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(DataError::SeriesNotFound {
                            series_id: series_id.to_string(),
                        });
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if !status.is_success() {
                        last_error =
                            Some(DataError::Other(format!("HTTP {status} for {series_id}")));
                        continue;
                    }

                    let body = resp.text().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to read response for {series_id}: {e}"
                        ))
                    })?;

                    return Self::parse_csv(series_id, &body);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl Default for FredProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesProvider for FredProvider {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let observations = self.fetch_with_retry(series_id, start, end)?;
        Ok(FetchResult {
            series_id: series_id.to_string(),
            observations,
            source: DataSource::Fred,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn csv_url_includes_series_and_range() {
        let url = FredProvider::csv_url("GDPC1", date(1947, 1, 1), date(2024, 1, 1));
        assert!(url.contains("id=GDPC1"));
        assert!(url.contains("cosd=1947-01-01"));
        assert!(url.contains("coed=2024-01-01"));
        assert!(url.starts_with("https://fred.stlouisfed.org/graph/fredgraph.csv"));
    }

    #[test]
    fn parses_a_well_formed_body() {
        let body = "DATE,GDPC1\n2007-10-01,15000.0\n2008-01-01,14950.5\n";
        let obs = FredProvider::parse_csv("GDPC1", body).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].date, date(2007, 10, 1));
        assert_eq!(obs[0].value, 15000.0);
        assert_eq!(obs[1].value, 14950.5);
    }

    #[test]
    fn skips_unpublished_dot_rows() {
        let body = "DATE,GDPC1\n2007-10-01,15000.0\n2008-01-01,.\n2008-04-01,14700.0\n";
        let obs = FredProvider::parse_csv("GDPC1", body).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[1].date, date(2008, 4, 1));
    }

    #[test]
    fn accepts_renamed_header_columns() {
        // FRED has renamed DATE to observation_date before; only position
        // matters.
        let body = "observation_date,GDPC1\n2007-10-01,15000.0\n";
        let obs = FredProvider::parse_csv("GDPC1", body).unwrap();
        assert_eq!(obs.len(), 1);
    }

    #[test]
    fn html_error_page_means_unknown_series() {
        let body = "<!doctype html><html><body>Error</body></html>";
        let err = FredProvider::parse_csv("NOSUCH", body).unwrap_err();
        assert!(matches!(err, DataError::SeriesNotFound { .. }));
    }

    #[test]
    fn all_dot_body_means_no_observations() {
        let body = "DATE,GDPC1\n2007-10-01,.\n2008-01-01,.\n";
        let err = FredProvider::parse_csv("GDPC1", body).unwrap_err();
        assert!(matches!(err, DataError::SeriesNotFound { .. }));
    }

    #[test]
    fn garbage_value_is_a_format_error() {
        let body = "DATE,GDPC1\n2007-10-01,abc\n";
        let err = FredProvider::parse_csv("GDPC1", body).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
    }
}
