//! Static HTML/SVG rendering of the aligned table.
//!
//! One self-contained HTML file per build: every recession drawn as a
//! polyline over the shared quarters-from-peak axis, normalized to its
//! peak. No JavaScript; hover detail comes from SVG `<title>` tooltips.
//!
//! The default viewport covers the main window `[-bkwd_qtrs_main,
//! +frwd_qtrs_main]` padded by [`FIG_BUFFER_PCT`] on both axes; the
//! vertical extent follows the main-window ratio band, falling back to
//! [`DEFAULT_BAND`] when the band is absent or degenerate.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use peaklab_core::align::{ratio_range, Alignment, RatioRange};
use peaklab_core::domain::RecessionCatalog;

use crate::palette::{series_color, series_width};
use crate::scale::LinearScale;

/// Fraction of the main-window span added as padding on each side.
pub const FIG_BUFFER_PCT: f64 = 0.10;

/// Vertical band used when the table yields no usable ratio band.
pub const DEFAULT_BAND: RatioRange = RatioRange { min: 0.9, max: 1.1 };

const MARGIN_TOP: f64 = 96.0;
const MARGIN_RIGHT: f64 = 250.0;
const MARGIN_BOTTOM: f64 = 92.0;
const MARGIN_LEFT: f64 = 76.0;

/// Rendering parameters: the default viewport window and the pixel size
/// of the plot frame (margins for titles, axes, and the legend are added
/// around it).
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub bkwd_qtrs_main: u32,
    pub frwd_qtrs_main: u32,
    pub plot_width: f64,
    pub plot_height: f64,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            bkwd_qtrs_main: 3,
            frwd_qtrs_main: 11,
            plot_width: 800.0,
            plot_height: 500.0,
        }
    }
}

/// Render the aligned table as a complete HTML document.
pub fn render_chart(
    alignment: &Alignment,
    catalog: &RecessionCatalog,
    end_date: NaiveDate,
    spec: &ChartSpec,
) -> String {
    let table = &alignment.table;
    let count = table.recession_count();
    let plot_w = spec.plot_width;
    let plot_h = spec.plot_height;
    let canvas_w = MARGIN_LEFT + plot_w + MARGIN_RIGHT;
    let canvas_h = MARGIN_TOP + plot_h + MARGIN_BOTTOM;

    // Horizontal extent: the main window padded by the buffer.
    let qtr_span = (spec.bkwd_qtrs_main + spec.frwd_qtrs_main) as f64;
    let x_min = -(spec.bkwd_qtrs_main as f64) - FIG_BUFFER_PCT * qtr_span;
    let x_max = spec.frwd_qtrs_main as f64 + FIG_BUFFER_PCT * qtr_span;

    // Vertical extent: the main-window ratio band padded by the buffer.
    // A missing or collapsed band falls back to the default.
    let band = ratio_range(table, spec.bkwd_qtrs_main, spec.frwd_qtrs_main)
        .filter(|b| b.max > b.min)
        .unwrap_or(DEFAULT_BAND);
    let spread = band.max - band.min;
    let y_min = band.min - FIG_BUFFER_PCT * spread;
    let y_max = band.max + FIG_BUFFER_PCT * spread;

    let x = LinearScale::new((x_min, x_max), (0.0, plot_w));
    let y = LinearScale::new((y_min, y_max), (plot_h, 0.0));

    let title = format!(
        "Progression of U.S. Real GDP in last {} recessions",
        catalog.len()
    );
    let subtitle = "(GDPC1, seasonally adjusted, $B 2012 chained)";
    let source = format!(
        "Source: historical GDPC1 data from FRED, updated {}.",
        end_date.format("%B %-d, %Y")
    );

    let mut svg = String::new();
    svg.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    svg.push_str("<meta charset=\"utf-8\">\n");
    svg.push_str(&format!("<title>{title}</title>\n"));
    svg.push_str(
        "<style>body { margin: 12px; } svg text { font-family: Helvetica, Arial, sans-serif; }</style>\n",
    );
    svg.push_str("</head>\n<body>\n");
    svg.push_str(&format!(
        "<svg width=\"{canvas_w}\" height=\"{canvas_h}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
    ));
    svg.push_str(&format!(
        "  <defs><clipPath id=\"plot-area\"><rect width=\"{plot_w}\" height=\"{plot_h}\"/></clipPath></defs>\n"
    ));

    // Titles, centered over the plot frame.
    let title_cx = MARGIN_LEFT + plot_w / 2.0;
    svg.push_str(&format!(
        "  <text x=\"{title_cx}\" y=\"34\" text-anchor=\"middle\" font-size=\"19\" font-weight=\"bold\">{title}</text>\n"
    ));
    svg.push_str(&format!(
        "  <text x=\"{title_cx}\" y=\"58\" text-anchor=\"middle\" font-size=\"15\" font-weight=\"bold\">{subtitle}</text>\n"
    ));

    svg.push_str(&format!(
        "  <g transform=\"translate({MARGIN_LEFT}, {MARGIN_TOP})\">\n"
    ));
    svg.push_str(&format!(
        "    <rect width=\"{plot_w}\" height=\"{plot_h}\" fill=\"#ffffff\" stroke=\"#c8c8c8\"/>\n"
    ));

    // Gridlines, ticks, and tick labels.
    for tick in ticks(x_min, x_max, 10.0) {
        let px = x.apply(tick);
        svg.push_str(&format!(
            "    <line x1=\"{px:.2}\" y1=\"0\" x2=\"{px:.2}\" y2=\"{plot_h}\" stroke=\"#e8e8e8\"/>\n"
        ));
        svg.push_str(&format!(
            "    <line x1=\"{px:.2}\" y1=\"{plot_h}\" x2=\"{px:.2}\" y2=\"{}\" stroke=\"#444444\"/>\n",
            plot_h + 6.0
        ));
        svg.push_str(&format!(
            "    <text x=\"{px:.2}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\">{}</text>\n",
            plot_h + 22.0,
            fmt_quarter_tick(tick)
        ));
    }
    for tick in ticks(y_min, y_max, 6.0) {
        let py = y.apply(tick);
        svg.push_str(&format!(
            "    <line x1=\"0\" y1=\"{py:.2}\" x2=\"{plot_w}\" y2=\"{py:.2}\" stroke=\"#e8e8e8\"/>\n"
        ));
        svg.push_str(&format!(
            "    <line x1=\"-6\" y1=\"{py:.2}\" x2=\"0\" y2=\"{py:.2}\" stroke=\"#444444\"/>\n"
        ));
        svg.push_str(&format!(
            "    <text x=\"-10\" y=\"{:.2}\" text-anchor=\"end\" font-size=\"12\">{tick:.2}</text>\n",
            py + 4.0
        ));
    }

    svg.push_str("    <g clip-path=\"url(#plot-area)\">\n");

    // Guides: the peak quarter and the peak level.
    let zero_px = x.apply(0.0);
    svg.push_str(&format!(
        "      <line x1=\"{zero_px:.2}\" y1=\"0\" x2=\"{zero_px:.2}\" y2=\"{plot_h}\" stroke=\"black\" stroke-width=\"2\" stroke-opacity=\"0.5\" stroke-dasharray=\"6 4\"/>\n"
    ));
    let one_py = y.apply(1.0);
    svg.push_str(&format!(
        "      <line x1=\"0\" y1=\"{one_py:.2}\" x2=\"{plot_w}\" y2=\"{one_py:.2}\" stroke=\"black\" stroke-width=\"2\" stroke-opacity=\"0.5\" stroke-dasharray=\"6 4\"/>\n"
    ));

    // One polyline per contiguous run of populated cells, so gaps in a
    // column break the line instead of bridging it.
    let offsets = table.offsets();
    for (i, col) in table.columns().iter().enumerate() {
        let color = series_color(i, count);
        let width = series_width(i, count);
        let mut run: Vec<(f64, f64)> = Vec::new();
        for (row, cell) in col.cells().iter().enumerate() {
            match cell {
                Some(c) => {
                    run.push((x.apply(offsets[row] as f64), y.apply(c.value_over_peak)));
                }
                None => {
                    push_polyline(&mut svg, &run, color, width);
                    run.clear();
                }
            }
        }
        push_polyline(&mut svg, &run, color, width);
    }

    // Point markers carry the hover detail.
    for (i, col) in table.columns().iter().enumerate() {
        let color = series_color(i, count);
        for (row, cell) in col.cells().iter().enumerate() {
            let Some(c) = cell else { continue };
            let px = x.apply(offsets[row] as f64);
            let py = y.apply(c.value_over_peak);
            svg.push_str(&format!(
                "      <circle cx=\"{px:.2}\" cy=\"{py:.2}\" r=\"3\" fill=\"{color}\" fill-opacity=\"0.7\"><title>Date: {}&#10;Quarters from peak: {}&#10;Real GDP: ${}B&#10;Fraction of peak: {:.1}%</title></circle>\n",
                c.date,
                offsets[row],
                thousands(c.value),
                c.value_over_peak * 100.0
            ));
        }
    }

    svg.push_str("    </g>\n");

    // Legend, one swatch per recession, to the right of the plot.
    let legend_x = plot_w + 18.0;
    let legend_top = ((plot_h - count as f64 * 22.0) / 2.0).max(0.0);
    for (i, label) in catalog.month_labels().iter().enumerate() {
        let ly = legend_top + i as f64 * 22.0 + 11.0;
        let color = series_color(i, count);
        let width = series_width(i, count);
        svg.push_str(&format!(
            "    <line x1=\"{legend_x}\" y1=\"{ly:.2}\" x2=\"{:.2}\" y2=\"{ly:.2}\" stroke=\"{color}\" stroke-width=\"{width}\" stroke-opacity=\"0.7\"/>\n",
            legend_x + 28.0
        ));
        svg.push_str(&format!(
            "    <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"12\">{}</text>\n",
            legend_x + 36.0,
            ly + 4.0,
            xml_escape(label)
        ));
    }

    svg.push_str("  </g>\n");

    // Axis labels and the source line.
    svg.push_str(&format!(
        "  <text x=\"{title_cx}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"13\">Quarters from Peak</text>\n",
        MARGIN_TOP + plot_h + 48.0
    ));
    svg.push_str(&format!(
        "  <text transform=\"translate(20, {:.2}) rotate(-90)\" text-anchor=\"middle\" font-size=\"13\">Real GDP as fraction of Peak</text>\n",
        MARGIN_TOP + plot_h / 2.0
    ));
    svg.push_str(&format!(
        "  <text x=\"8\" y=\"{:.2}\" font-size=\"11\" font-style=\"italic\" fill=\"#444444\">{source}</text>\n",
        canvas_h - 10.0
    ));

    svg.push_str("</svg>\n</body>\n</html>\n");
    svg
}

/// Render the chart and write it to `dir/gdp_npp_{end_date}.html`.
pub fn write_chart(
    dir: &Path,
    alignment: &Alignment,
    catalog: &RecessionCatalog,
    end_date: NaiveDate,
    spec: &ChartSpec,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create image directory {}", dir.display()))?;
    let path = dir.join(format!("gdp_npp_{end_date}.html"));
    let html = render_chart(alignment, catalog, end_date, spec);
    fs::write(&path, html)
        .with_context(|| format!("Failed to write chart {}", path.display()))?;
    Ok(path)
}

fn push_polyline(svg: &mut String, points: &[(f64, f64)], color: &str, width: f64) {
    if points.len() < 2 {
        return;
    }
    let coords: Vec<String> = points
        .iter()
        .map(|(px, py)| format!("{px:.2},{py:.2}"))
        .collect();
    svg.push_str(&format!(
        "      <polyline points=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{width}\" stroke-opacity=\"0.7\"/>\n",
        coords.join(" ")
    ));
}

/// Tick positions covering `[min, max]` at a 1/2/5 step sized for about
/// `target` ticks.
fn ticks(min: f64, max: f64, target: f64) -> Vec<f64> {
    if max <= min {
        return vec![min];
    }
    let step = tick_step(max - min, target);
    let mut out = Vec::new();
    let mut t = (min / step).ceil() * step;
    while t <= max + step * 1e-9 {
        out.push(if t.abs() < step * 1e-9 { 0.0 } else { t });
        t += step;
    }
    out
}

fn tick_step(span: f64, target: f64) -> f64 {
    let raw = span / target;
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let nice = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * mag
}

fn fmt_quarter_tick(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{v:.1}")
    }
}

/// Integer grouping for dollar amounts, e.g. `15761.93` -> `"15,762"`.
fn thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
