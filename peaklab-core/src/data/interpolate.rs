//! Quarterly lattice and cubic gap filling for the early historical span.
//!
//! FRED's quarterly GDPC1 starts in 1947. The 1929-1946 span exists only
//! as the annual GDPCA series, which the loader re-dates to July 1 of each
//! year and lays onto the quarterly lattice. The gaps between annual
//! points are filled with a natural cubic spline through the known values,
//! which keeps the early curve smooth without inventing turning points the
//! annual record doesn't support.

use chrono::{Months, NaiveDate};

/// Quarter-start dates from `start` through `end`, inclusive, three months
/// apart. `start` should itself be a quarter start.
pub fn quarterly_lattice(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        current = current + Months::new(3);
    }
    dates
}

/// Fill interior NaN runs by evaluating a natural cubic spline through the
/// finite points, positioned at their indices.
///
/// Leading and trailing NaNs have no bracketing knot and stay NaN; the
/// caller decides whether to drop those rows. With fewer than two finite
/// points there is nothing to anchor a curve on and the input is returned
/// unchanged.
pub fn fill_gaps_cubic(values: &[f64]) -> Vec<f64> {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (i, &v) in values.iter().enumerate() {
        if v.is_finite() {
            xs.push(i as f64);
            ys.push(v);
        }
    }
    if xs.len() < 2 {
        return values.to_vec();
    }

    let m2 = natural_second_derivatives(&xs, &ys);
    let first = xs[0] as usize;
    let last = xs[xs.len() - 1] as usize;

    let mut out = values.to_vec();
    let mut k = 0;
    for i in first..=last {
        if out[i].is_finite() {
            continue;
        }
        let x = i as f64;
        // Knot intervals are visited in order as i advances.
        while xs[k + 1] < x {
            k += 1;
        }
        out[i] = spline_segment(xs[k], xs[k + 1], ys[k], ys[k + 1], m2[k], m2[k + 1], x);
    }
    out
}

/// Second derivatives of the natural cubic spline at each knot.
///
/// Natural boundary: zero curvature at both ends. Interior values come
/// from the standard tridiagonal system, solved by forward elimination and
/// back substitution.
fn natural_second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let m = xs.len();
    let mut m2 = vec![0.0; m];
    if m < 3 {
        // Two knots: the natural spline degenerates to a straight line.
        return m2;
    }

    let mut sub = vec![0.0; m];
    let mut diag = vec![0.0; m];
    let mut sup = vec![0.0; m];
    let mut rhs = vec![0.0; m];
    for k in 1..m - 1 {
        let h0 = xs[k] - xs[k - 1];
        let h1 = xs[k + 1] - xs[k];
        sub[k] = h0;
        diag[k] = 2.0 * (h0 + h1);
        sup[k] = h1;
        rhs[k] = 6.0 * ((ys[k + 1] - ys[k]) / h1 - (ys[k] - ys[k - 1]) / h0);
    }

    for k in 2..m - 1 {
        let w = sub[k] / diag[k - 1];
        diag[k] -= w * sup[k - 1];
        rhs[k] -= w * rhs[k - 1];
    }

    m2[m - 2] = rhs[m - 2] / diag[m - 2];
    for k in (1..m - 2).rev() {
        m2[k] = (rhs[k] - sup[k] * m2[k + 1]) / diag[k];
    }
    m2
}

/// Evaluate the spline on the segment [x0, x1] at x.
fn spline_segment(x0: f64, x1: f64, y0: f64, y1: f64, m0: f64, m1: f64, x: f64) -> f64 {
    let h = x1 - x0;
    let a = (x1 - x) / h;
    let b = (x - x0) / h;
    a * y0 + b * y1 + ((a * a * a - a) * m0 + (b * b * b - b) * m1) * (h * h) / 6.0
}
