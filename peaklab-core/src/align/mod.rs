//! The peak aligner.
//!
//! Given the quarterly real GDP series and the recession catalog, the
//! aligner:
//! - finds each recession's peak inside its catalog window
//!   ([`compute_peak`])
//! - re-indexes the series as integer quarters from that peak
//!   ([`quarter_offset`], [`compute_offsets`])
//! - normalizes values as fractions of the peak and merges all recessions
//!   onto one shared axis ([`build_aligned_table`])
//! - summarizes the main-window ratio band ([`ratio_range`])
//!
//! Everything here is pure and synchronous: series and catalog in, a fresh
//! table out. I/O lives in [`crate::data`].

pub mod offset;
pub mod peak;
pub mod summary;
pub mod table;

pub use offset::{compute_offsets, quarter_index, quarter_offset};
pub use peak::{compute_peak, Peak};
pub use summary::{ratio_range, RatioRange};
pub use table::{build_aligned_table, AlignedCell, AlignedTable, Alignment, RecessionColumn};

use thiserror::Error;

use crate::domain::DateWindow;

/// Aligner errors. All are fatal: either the complete table is produced or
/// nothing is.
#[derive(Debug, Error)]
pub enum AlignError {
    /// A peak-search window matched no observation. The catalog and the
    /// series disagree; not retryable.
    #[error("no observations in peak window {window} (recession {recession})")]
    EmptyWindow { recession: usize, window: DateWindow },
}
