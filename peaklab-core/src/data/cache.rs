//! CSV cache layer for the GDP series and the aligned-table artifact.
//!
//! Layout: `{cache_dir}/gdp_{end_date}.csv` — one entry per data end
//! date, since a published series is immutable for a given end date.
//!
//! Features:
//! - Atomic writes (write to .tmp, rename into place)
//! - Integrity metadata sidecar per entry (hash, span, row count, source)
//! - Quarantine for corrupt files ({filename}.quarantined)
//! - Aligned-table CSV artifact (`gdp_pk_{end_date}.csv`)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::align::Alignment;
use crate::domain::{GdpSeries, Observation};

use super::provider::DataError;

/// Metadata sidecar for one cached series entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMeta {
    pub end_date: NaiveDate,
    pub start_date: NaiveDate,
    pub row_count: usize,
    pub data_hash: String,
    pub source: String,
    pub cached_at: chrono::NaiveDateTime,
}

/// The CSV cache.
pub struct SeriesCache {
    cache_dir: PathBuf,
}

impl SeriesCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Root directory of the cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the raw series file: `{cache_dir}/gdp_{end_date}.csv`
    pub fn series_path(&self, end_date: NaiveDate) -> PathBuf {
        self.cache_dir.join(format!("gdp_{end_date}.csv"))
    }

    /// Path of the aligned-table artifact: `{cache_dir}/gdp_pk_{end_date}.csv`
    pub fn aligned_path(&self, end_date: NaiveDate) -> PathBuf {
        self.cache_dir.join(format!("gdp_pk_{end_date}.csv"))
    }

    /// Path of the metadata sidecar: `{cache_dir}/gdp_{end_date}.meta.json`
    pub fn meta_path(&self, end_date: NaiveDate) -> PathBuf {
        self.cache_dir.join(format!("gdp_{end_date}.meta.json"))
    }

    /// Whether a raw series entry exists for this end date.
    pub fn has(&self, end_date: NaiveDate) -> bool {
        self.series_path(end_date).exists()
    }

    /// Write the raw series for its end date.
    ///
    /// Atomic: the CSV is written to .tmp and renamed into place, then the
    /// metadata sidecar is written.
    pub fn write_series(
        &self,
        series: &GdpSeries,
        end_date: NaiveDate,
        source: &str,
    ) -> Result<(), DataError> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(["Date", "GDPC1"])
            .map_err(|e| DataError::CacheError(format!("csv header: {e}")))?;
        for obs in series.iter() {
            wtr.write_record([obs.date.to_string(), obs.value.to_string()])
                .map_err(|e| DataError::CacheError(format!("csv row: {e}")))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| DataError::CacheError(format!("csv flush: {e}")))?;

        let path = self.series_path(end_date);
        let tmp_path = path.with_extension("csv.tmp");
        fs::write(&tmp_path, bytes)
            .map_err(|e| DataError::CacheError(format!("write temp file: {e}")))?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::CacheError(format!("atomic rename failed: {e}"))
        })?;

        let meta = CacheMeta {
            end_date,
            start_date: series.first_date(),
            row_count: series.len(),
            data_hash: blake3::hash(
                &serde_json::to_vec(series.observations())
                    .map_err(|e| DataError::CacheError(format!("hash serialization: {e}")))?,
            )
            .to_hex()
            .to_string(),
            source: source.to_string(),
            cached_at: chrono::Local::now().naive_local(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| DataError::CacheError(format!("meta serialization: {e}")))?;
        fs::write(self.meta_path(end_date), meta_json)
            .map_err(|e| DataError::CacheError(format!("meta write: {e}")))?;

        Ok(())
    }

    /// Load the cached series for an end date.
    ///
    /// A file that fails to parse is quarantined (renamed to .quarantined)
    /// so the loader can fall through to a fresh download.
    pub fn load_series(&self, end_date: NaiveDate) -> Result<GdpSeries, DataError> {
        let path = self.series_path(end_date);
        if !path.exists() {
            return Err(DataError::NoCachedSeries { end_date });
        }

        match read_series_csv(&path) {
            Ok(series) => Ok(series),
            Err(e) => {
                let quarantine = path.with_extension("csv.quarantined");
                eprintln!(
                    "WARNING: quarantining corrupt cache file {}: {e}",
                    path.display()
                );
                let _ = fs::rename(&path, &quarantine);
                Err(DataError::NoCachedSeries { end_date })
            }
        }
    }

    /// Metadata for one entry, if present.
    pub fn get_meta(&self, end_date: NaiveDate) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path(end_date)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// All cache entries, oldest end date first.
    pub fn entries(&self) -> Vec<CacheMeta> {
        let mut metas = Vec::new();
        let Ok(dir) = fs::read_dir(&self.cache_dir) else {
            return metas;
        };
        for entry in dir.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with("gdp_") || !name.ends_with(".meta.json") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                if let Ok(meta) = serde_json::from_str::<CacheMeta>(&content) {
                    metas.push(meta);
                }
            }
        }
        metas.sort_by_key(|m| m.end_date);
        metas
    }

    /// Remove one entry: the raw CSV, its sidecar, and the aligned
    /// artifact if present.
    pub fn remove_entry(&self, end_date: NaiveDate) -> Result<(), DataError> {
        for path in [
            self.series_path(end_date),
            self.meta_path(end_date),
            self.aligned_path(end_date),
        ] {
            if path.exists() {
                fs::remove_file(&path)
                    .map_err(|e| DataError::CacheError(format!("remove {}: {e}", path.display())))?;
            }
        }
        Ok(())
    }

    /// Write the aligned table as a wide CSV.
    ///
    /// Columns: `qtrs_frm_peak`, then `Date{i}`, `GDPC1{i}`,
    /// `value_over_peak{i}` for each recession in catalog order.
    /// Unpopulated cells are empty fields.
    pub fn write_aligned_csv(
        &self,
        alignment: &Alignment,
        end_date: NaiveDate,
    ) -> Result<PathBuf, DataError> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let table = &alignment.table;
        let mut wtr = csv::Writer::from_writer(Vec::new());

        let mut header = Vec::with_capacity(1 + 3 * table.recession_count());
        header.push("qtrs_frm_peak".to_string());
        for i in 0..table.recession_count() {
            header.push(format!("Date{i}"));
            header.push(format!("GDPC1{i}"));
            header.push(format!("value_over_peak{i}"));
        }
        wtr.write_record(&header)
            .map_err(|e| DataError::CacheError(format!("csv header: {e}")))?;

        for (row, &offset) in table.offsets().iter().enumerate() {
            let mut record = Vec::with_capacity(header.len());
            record.push(offset.to_string());
            for col in table.columns() {
                match col.cells()[row] {
                    Some(cell) => {
                        record.push(cell.date.to_string());
                        record.push(cell.value.to_string());
                        record.push(cell.value_over_peak.to_string());
                    }
                    None => {
                        record.push(String::new());
                        record.push(String::new());
                        record.push(String::new());
                    }
                }
            }
            wtr.write_record(&record)
                .map_err(|e| DataError::CacheError(format!("csv row: {e}")))?;
        }

        let bytes = wtr
            .into_inner()
            .map_err(|e| DataError::CacheError(format!("csv flush: {e}")))?;

        let path = self.aligned_path(end_date);
        let tmp_path = path.with_extension("csv.tmp");
        fs::write(&tmp_path, bytes)
            .map_err(|e| DataError::CacheError(format!("write temp file: {e}")))?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::CacheError(format!("atomic rename failed: {e}"))
        })?;

        Ok(path)
    }
}

/// Read a raw series CSV back into a validated series.
///
/// Rows with an unpublished value ("." or blank) are skipped, matching
/// the provider's treatment of the FRED download format.
fn read_series_csv(path: &Path) -> Result<GdpSeries, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| DataError::CacheError(format!("open csv: {e}")))?;

    let mut observations = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DataError::CacheError(format!("csv parse: {e}")))?;
        let date_field = record
            .get(0)
            .ok_or_else(|| DataError::ValidationError("row without a date column".into()))?;
        let value_field = record
            .get(1)
            .ok_or_else(|| DataError::ValidationError("row without a value column".into()))?;

        let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d")
            .map_err(|e| DataError::ValidationError(format!("bad date '{date_field}': {e}")))?;

        let trimmed = value_field.trim();
        if trimmed.is_empty() || trimmed == "." || trimmed.eq_ignore_ascii_case("nan") {
            continue;
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|e| DataError::ValidationError(format!("bad value '{trimmed}': {e}")))?;

        observations.push(Observation { date, value });
    }

    GdpSeries::new(observations).map_err(|e| DataError::ValidationError(e.to_string()))
}
