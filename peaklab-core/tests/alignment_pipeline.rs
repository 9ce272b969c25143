//! Integration tests for the full series-to-table pipeline: a quarterly
//! series spanning 1929 through 2021, the built-in recession catalog, the
//! aligner, and the CSV artifact.

use chrono::{Months, NaiveDate};
use std::sync::atomic::{AtomicU64, Ordering};

use peaklab_core::align::{build_aligned_table, ratio_range};
use peaklab_core::data::{load_series, DataSource, LoadOptions, SeriesCache};
use peaklab_core::domain::{GdpSeries, Observation, RecessionCatalog};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_dir(name: &str) -> std::path::PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "peaklab_pipeline_{name}_{}_{id}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Quarterly series from 1929 Q3 through 2020 Q4 with steady compound
/// growth, so every catalog window holds observations and the windowed
/// maximum is always the window's last lattice quarter.
fn century_series() -> GdpSeries {
    let mut observations = Vec::new();
    let mut d = date(1929, 7, 1);
    let end = date(2021, 1, 1);
    let mut value = 1_100.0;
    while d <= end {
        observations.push(Observation { date: d, value });
        value *= 1.009;
        d = d + Months::new(3);
    }
    GdpSeries::new(observations).unwrap()
}

#[test]
fn full_catalog_builds_the_standard_table() {
    let series = century_series();
    let catalog = RecessionCatalog::us_recessions();
    let alignment = build_aligned_table(&series, &catalog, 12, 40).unwrap();
    let table = &alignment.table;

    assert_eq!(table.row_count(), 53);
    assert_eq!(table.recession_count(), 15);
    assert_eq!(table.offsets()[0], -12);
    assert_eq!(*table.offsets().last().unwrap(), 40);
    assert_eq!(alignment.peaks.len(), 15);
}

#[test]
fn every_peak_falls_inside_its_window() {
    let series = century_series();
    let catalog = RecessionCatalog::us_recessions();
    let alignment = build_aligned_table(&series, &catalog, 12, 40).unwrap();

    for (i, rec) in catalog.iter().enumerate() {
        let peak = &alignment.peaks[i];
        assert!(
            rec.peak_window.contains(peak.date),
            "peak {i} at {} escaped window {}",
            peak.date,
            rec.peak_window
        );
    }

    // Growth is monotone, so the peak is the last lattice quarter inside
    // each window. Spot-check one on-lattice end and the off-lattice 2020
    // window end.
    assert_eq!(alignment.peaks[13].date, date(2008, 1, 1));
    assert_eq!(alignment.peaks[14].date, date(2020, 1, 1));
}

#[test]
fn peak_rows_normalize_to_one() {
    let series = century_series();
    let catalog = RecessionCatalog::us_recessions();
    let alignment = build_aligned_table(&series, &catalog, 12, 40).unwrap();

    for i in 0..alignment.table.recession_count() {
        let cell = alignment.table.cell(i, 0).unwrap();
        assert_eq!(cell.value_over_peak, 1.0, "recession {i} peak row");
        assert_eq!(cell.value, alignment.peaks[i].value);
    }
}

#[test]
fn band_brackets_the_peak_level() {
    let series = century_series();
    let catalog = RecessionCatalog::us_recessions();
    let alignment = build_aligned_table(&series, &catalog, 12, 40).unwrap();

    let band = ratio_range(&alignment.table, 3, 11).unwrap();
    assert!(band.min < 1.0, "pre-peak quarters sit below the peak");
    assert!(band.max > 1.0, "post-peak growth rises above the peak");
}

#[test]
fn aligned_csv_is_forty_six_columns_wide() {
    let series = century_series();
    let catalog = RecessionCatalog::us_recessions();
    let alignment = build_aligned_table(&series, &catalog, 12, 40).unwrap();

    let dir = temp_dir("csv");
    let cache = SeriesCache::new(&dir);
    let path = cache.write_aligned_csv(&alignment, date(2021, 1, 1)).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    let header = lines.next().unwrap();
    assert_eq!(header.split(',').count(), 46);
    assert!(header.starts_with("qtrs_frm_peak,Date0,GDPC10,value_over_peak0"));
    assert!(header.ends_with("Date14,GDPC114,value_over_peak14"));
    assert_eq!(lines.count(), 53);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn synthetic_loader_feeds_the_aligner() {
    let dir = temp_dir("synthetic");
    let cache = SeriesCache::new(&dir);

    let opts = LoadOptions {
        end_date: date(2021, 1, 1),
        offline: true,
        synthetic: true,
        force: false,
    };
    let loaded = load_series(&cache, None, &opts).unwrap();
    assert_eq!(loaded.source, DataSource::Synthetic);

    let catalog = RecessionCatalog::us_recessions();
    let alignment = build_aligned_table(&loaded.series, &catalog, 12, 40).unwrap();
    assert_eq!(alignment.table.row_count(), 53);
    assert_eq!(alignment.table.recession_count(), 15);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn zero_width_axis_is_a_single_peak_row() {
    let series = century_series();
    let catalog = RecessionCatalog::us_recessions();
    let alignment = build_aligned_table(&series, &catalog, 0, 0).unwrap();
    let table = &alignment.table;

    assert_eq!(table.row_count(), 1);
    for col in table.columns() {
        assert_eq!(col.populated(), 1);
        assert_eq!(col.cells()[0].unwrap().value_over_peak, 1.0);
    }
}

#[test]
fn narrow_axis_drops_far_observations_silently() {
    let series = century_series();
    let catalog = RecessionCatalog::us_recessions();
    let alignment = build_aligned_table(&series, &catalog, 2, 2).unwrap();

    for col in alignment.table.columns() {
        assert!(col.populated() <= 5);
        assert!(col.populated() >= 1, "the peak row itself is always present");
    }
}

#[test]
fn custom_catalog_file_drives_the_build() {
    let dir = temp_dir("catalog");
    let path = dir.join("recessions.toml");
    let builtin = RecessionCatalog::us_recessions();
    std::fs::write(&path, builtin.to_toml().unwrap()).unwrap();

    let loaded = RecessionCatalog::from_file(&path).unwrap();
    let series = century_series();
    let a = build_aligned_table(&series, &builtin, 12, 40).unwrap();
    let b = build_aligned_table(&series, &loaded, 12, 40).unwrap();
    assert_eq!(a.table.fingerprint(), b.table.fingerprint());

    let _ = std::fs::remove_dir_all(&dir);
}
