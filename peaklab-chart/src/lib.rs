//! PeakLab Chart — static presentation of the normalized peak plot.
//!
//! Turns an [`peaklab_core::align::Alignment`] into a self-contained
//! HTML/SVG document:
//! - Category20-style palette with emphasized first and last recessions
//! - Linear data-to-pixel scales
//! - Polyline renderer with clipping, guides, tooltips, and a legend

pub mod palette;
pub mod scale;
pub mod svg;

pub use palette::{series_color, series_width, LINE_PALETTE};
pub use scale::LinearScale;
pub use svg::{render_chart, write_chart, ChartSpec, DEFAULT_BAND, FIG_BUFFER_PCT};
