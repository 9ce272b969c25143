//! Main-window summary — the ratio band a renderer uses to size its
//! default viewport.

use super::table::AlignedTable;

/// Closed band of value-over-peak ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioRange {
    pub min: f64,
    pub max: f64,
}

/// Minimum and maximum `value_over_peak` across every recession, restricted
/// to offsets in `[-bkwd_qtrs_main, +frwd_qtrs_main]`.
///
/// Unpopulated cells are skipped. `None` when no cell in the sub-window is
/// populated anywhere; callers fall back to their own default band.
pub fn ratio_range(
    table: &AlignedTable,
    bkwd_qtrs_main: u32,
    frwd_qtrs_main: u32,
) -> Option<RatioRange> {
    let mut band: Option<RatioRange> = None;
    for (row, &offset) in table.offsets().iter().enumerate() {
        if offset < -(bkwd_qtrs_main as i32) || offset > frwd_qtrs_main as i32 {
            continue;
        }
        for col in table.columns() {
            if let Some(cell) = col.cells()[row] {
                let r = cell.value_over_peak;
                band = Some(match band {
                    None => RatioRange { min: r, max: r },
                    Some(b) => RatioRange {
                        min: b.min.min(r),
                        max: b.max.max(r),
                    },
                });
            }
        }
    }
    band
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::table::build_aligned_table;
    use crate::domain::{DateWindow, GdpSeries, Observation, Recession, RecessionCatalog};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn fixture() -> (GdpSeries, RecessionCatalog) {
        let points = [
            (2007, 1, 14_650.0),
            (2007, 4, 14_800.0),
            (2007, 7, 14_900.0),
            (2007, 10, 15_000.0),
            (2008, 1, 14_950.0),
            (2008, 4, 14_700.0),
            (2008, 7, 13_500.0),
        ];
        let series = GdpSeries::new(
            points
                .iter()
                .map(|&(y, m, v)| Observation { date: date(y, m), value: v })
                .collect(),
        )
        .unwrap();
        let catalog = RecessionCatalog::new(vec![Recession {
            label_years: "2007-2009".into(),
            label_months: "Dec 2007 - Jun 2009".into(),
            onset: "Dec 2007".into(),
            peak_window: DateWindow::new(date(2007, 7), date(2008, 1)).unwrap(),
        }])
        .unwrap();
        (series, catalog)
    }

    #[test]
    fn band_covers_the_main_window_extremes() {
        let (series, catalog) = fixture();
        let alignment = build_aligned_table(&series, &catalog, 3, 10).unwrap();
        let band = ratio_range(&alignment.table, 3, 3).unwrap();
        assert!((band.max - 1.0).abs() < 1e-12);
        assert!((band.min - 13_500.0 / 15_000.0).abs() < 1e-12);
    }

    #[test]
    fn cells_outside_the_main_window_do_not_count() {
        let (series, catalog) = fixture();
        let alignment = build_aligned_table(&series, &catalog, 3, 10).unwrap();
        // Sub-window [0, 1] excludes the deep 2008-07 trough at offset 3.
        let band = ratio_range(&alignment.table, 0, 1).unwrap();
        assert!(band.min > 13_500.0 / 15_000.0);
        assert!((band.max - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_observation_band_is_degenerate() {
        let (_, catalog) = fixture();
        let far_series = GdpSeries::new(vec![
            Observation { date: date(2007, 10), value: 15_000.0 },
        ])
        .unwrap();
        let alignment = build_aligned_table(&far_series, &catalog, 12, 40).unwrap();
        // Only the peak row is populated, so the band collapses to 1.0.
        let band = ratio_range(&alignment.table, 12, 40).unwrap();
        assert_eq!(band.min, 1.0);
        assert_eq!(band.max, 1.0);
    }

    #[test]
    fn table_with_no_columns_yields_none() {
        let (series, _) = fixture();
        let empty = RecessionCatalog::new(vec![]).unwrap();
        let alignment = build_aligned_table(&series, &empty, 3, 10).unwrap();
        assert!(ratio_range(&alignment.table, 3, 10).is_none());
    }

    #[test]
    fn main_window_wider_than_axis_is_harmless() {
        let (series, catalog) = fixture();
        let alignment = build_aligned_table(&series, &catalog, 1, 1).unwrap();
        let narrow = ratio_range(&alignment.table, 1, 1);
        let wide = ratio_range(&alignment.table, 50, 50);
        assert_eq!(narrow, wide);
    }
}
