//! Line colors and widths for the recession series.
//!
//! The first (1929) and last series are the reference points of the chart
//! and get emphasized strokes: blue and black, double width. The middle
//! series cycle through a Category20-style palette.

/// Mid-series colors, Category20 ordering.
pub const LINE_PALETTE: [&str; 13] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2",
];

/// Stroke color for series `index` out of `count`.
pub fn series_color(index: usize, count: usize) -> &'static str {
    if index == 0 {
        "blue"
    } else if index + 1 == count {
        "black"
    } else {
        LINE_PALETTE[(index - 1) % LINE_PALETTE.len()]
    }
}

/// Stroke width for series `index` out of `count`. The emphasized first
/// and last series are drawn heavier.
pub fn series_width(index: usize, count: usize) -> f64 {
    if index == 0 || index + 1 == count {
        5.0
    } else {
        2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_series_is_heavy_blue() {
        assert_eq!(series_color(0, 15), "blue");
        assert_eq!(series_width(0, 15), 5.0);
    }

    #[test]
    fn last_series_is_heavy_black() {
        assert_eq!(series_color(14, 15), "black");
        assert_eq!(series_width(14, 15), 5.0);
    }

    #[test]
    fn middle_series_cycle_the_palette() {
        assert_eq!(series_color(1, 15), LINE_PALETTE[0]);
        assert_eq!(series_color(13, 15), LINE_PALETTE[12]);
        assert_eq!(series_width(7, 15), 2.0);
    }

    #[test]
    fn palette_wraps_for_long_catalogs() {
        // index 14 of a 20-series catalog maps back onto the palette start.
        assert_eq!(series_color(14, 20), LINE_PALETTE[0]);
    }

    #[test]
    fn single_series_is_emphasized() {
        // With one series, first and last coincide; first wins.
        assert_eq!(series_color(0, 1), "blue");
        assert_eq!(series_width(0, 1), 5.0);
    }
}
