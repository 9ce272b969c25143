//! Quarter arithmetic — signed offsets of observation dates from a peak.
//!
//! Offsets are calendar quarters, not elapsed days: two dates in the same
//! calendar quarter are offset 0 from each other regardless of day of
//! month. This keeps the axis integral even when one series is dated on
//! quarter starts and another mid-quarter.

use chrono::{Datelike, NaiveDate};

use crate::domain::GdpSeries;

/// Zero-based quarter index of a month: Jan-Mar is 0, Apr-Jun is 1,
/// Jul-Sep is 2, Oct-Dec is 3.
pub fn quarter_index(month: u32) -> i32 {
    ((month - 1) / 3) as i32
}

/// Signed quarter offset of `date` from `peak`.
///
/// Negative means before the peak, 0 the peak quarter itself, positive
/// after.
pub fn quarter_offset(date: NaiveDate, peak: NaiveDate) -> i32 {
    (date.year() - peak.year()) * 4 + quarter_index(date.month()) - quarter_index(peak.month())
}

/// Offset of every observation from the peak date, in series order.
pub fn compute_offsets(series: &GdpSeries, peak: NaiveDate) -> Vec<i32> {
    series
        .iter()
        .map(|obs| quarter_offset(obs.date, peak))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn quarter_index_maps_months_to_quarters() {
        assert_eq!(quarter_index(1), 0);
        assert_eq!(quarter_index(3), 0);
        assert_eq!(quarter_index(4), 1);
        assert_eq!(quarter_index(7), 2);
        assert_eq!(quarter_index(10), 3);
        assert_eq!(quarter_index(12), 3);
    }

    #[test]
    fn offset_one_quarter_forward() {
        // Peak 2007-10-01, observation 2008-01-01: one quarter after.
        assert_eq!(quarter_offset(date(2008, 1, 1), date(2007, 10, 1)), 1);
    }

    #[test]
    fn offset_is_zero_within_the_same_quarter() {
        assert_eq!(quarter_offset(date(2007, 12, 31), date(2007, 10, 1)), 0);
        assert_eq!(quarter_offset(date(2007, 10, 1), date(2007, 11, 15)), 0);
    }

    #[test]
    fn offset_crosses_year_boundaries() {
        assert_eq!(quarter_offset(date(2020, 1, 1), date(2019, 10, 1)), 1);
        assert_eq!(quarter_offset(date(2019, 7, 1), date(2020, 1, 1)), -2);
    }

    #[test]
    fn offset_is_negative_before_the_peak() {
        assert_eq!(quarter_offset(date(2007, 1, 1), date(2007, 10, 1)), -3);
        assert_eq!(quarter_offset(date(1929, 7, 1), date(2019, 10, 1)), -361);
    }

    #[test]
    fn offsets_follow_series_order() {
        let series = GdpSeries::new(vec![
            Observation { date: date(2007, 7, 1), value: 1.0 },
            Observation { date: date(2007, 10, 1), value: 2.0 },
            Observation { date: date(2008, 1, 1), value: 3.0 },
            Observation { date: date(2008, 4, 1), value: 4.0 },
        ])
        .unwrap();
        let offsets = compute_offsets(&series, date(2007, 10, 1));
        assert_eq!(offsets, vec![-1, 0, 1, 2]);
    }

    #[test]
    fn quarterly_offsets_are_strictly_increasing() {
        let mut observations = Vec::new();
        let mut d = date(1990, 1, 1);
        for i in 0..40 {
            observations.push(Observation { date: d, value: 100.0 + i as f64 });
            d = d + chrono::Months::new(3);
        }
        let series = GdpSeries::new(observations).unwrap();
        let offsets = compute_offsets(&series, date(1995, 4, 1));
        for pair in offsets.windows(2) {
            assert_eq!(pair[1] - pair[0], 1);
        }
    }
}
