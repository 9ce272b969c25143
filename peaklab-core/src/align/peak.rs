//! Windowed peak search.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{DateWindow, GdpSeries};

use super::AlignError;

/// Pre-recession peak: the maximum series value inside one catalog window
/// and the date it was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    pub value: f64,
    pub date: NaiveDate,
}

/// Find the maximum value inside `window` (closed on both ends).
///
/// Ties on value resolve to the later date, so the offset axis is anchored
/// at the last quarter the economy touched its pre-recession high. An
/// empty window means the catalog and the series disagree; that is fatal,
/// never a silently skipped column. `recession` is the catalog index,
/// carried into the error.
pub fn compute_peak(
    series: &GdpSeries,
    window: &DateWindow,
    recession: usize,
) -> Result<Peak, AlignError> {
    let mut best: Option<Peak> = None;
    for obs in series.iter() {
        if !window.contains(obs.date) {
            continue;
        }
        let replace = match best {
            None => true,
            Some(b) => obs.value >= b.value,
        };
        if replace {
            best = Some(Peak {
                value: obs.value,
                date: obs.date,
            });
        }
    }
    best.ok_or(AlignError::EmptyWindow {
        recession,
        window: *window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(points: &[(i32, u32, f64)]) -> GdpSeries {
        GdpSeries::new(
            points
                .iter()
                .map(|&(y, m, v)| Observation { date: date(y, m, 1), value: v })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn finds_the_window_maximum() {
        let s = series(&[
            (2007, 4, 14_800.0),
            (2007, 7, 14_900.0),
            (2007, 10, 15_000.0),
            (2008, 1, 14_950.0),
            (2008, 4, 14_700.0),
        ]);
        let w = DateWindow::new(date(2007, 7, 1), date(2008, 1, 1)).unwrap();
        let peak = compute_peak(&s, &w, 13).unwrap();
        assert_eq!(peak.value, 15_000.0);
        assert_eq!(peak.date, date(2007, 10, 1));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let s = series(&[(2007, 7, 10.0), (2007, 10, 5.0), (2008, 1, 20.0)]);
        let w = DateWindow::new(date(2007, 7, 1), date(2008, 1, 1)).unwrap();
        let peak = compute_peak(&s, &w, 0).unwrap();
        // The maximum sits exactly on the window end and still counts.
        assert_eq!(peak.date, date(2008, 1, 1));
        assert_eq!(peak.value, 20.0);
    }

    #[test]
    fn ties_resolve_to_the_later_date() {
        let s = series(&[
            (2007, 7, 15_000.0),
            (2007, 10, 15_000.0),
            (2008, 1, 14_000.0),
        ]);
        let w = DateWindow::new(date(2007, 7, 1), date(2008, 1, 1)).unwrap();
        let peak = compute_peak(&s, &w, 0).unwrap();
        assert_eq!(peak.date, date(2007, 10, 1));
    }

    #[test]
    fn values_outside_the_window_are_ignored() {
        let s = series(&[
            (2006, 1, 99_999.0),
            (2007, 10, 15_000.0),
            (2009, 1, 99_999.0),
        ]);
        let w = DateWindow::new(date(2007, 7, 1), date(2008, 1, 1)).unwrap();
        let peak = compute_peak(&s, &w, 0).unwrap();
        assert_eq!(peak.value, 15_000.0);
    }

    #[test]
    fn empty_window_is_a_hard_failure() {
        let s = series(&[(2007, 10, 15_000.0)]);
        let w = DateWindow::new(date(1950, 1, 1), date(1950, 12, 31)).unwrap();
        let err = compute_peak(&s, &w, 4).unwrap_err();
        match err {
            AlignError::EmptyWindow { recession, window } => {
                assert_eq!(recession, 4);
                assert_eq!(window.start, date(1950, 1, 1));
            }
        }
    }
}
