//! The wide aligned table — every recession's sub-series merged onto one
//! shared quarters-from-peak axis.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{GdpSeries, RecessionCatalog};

use super::offset::compute_offsets;
use super::peak::{compute_peak, Peak};
use super::AlignError;

/// One populated cell of a recession column: the observation date, the
/// raw value, and the value as a fraction of that recession's peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignedCell {
    pub date: NaiveDate,
    pub value: f64,
    pub value_over_peak: f64,
}

/// Column triple for one recession, indexed by axis row. `None` rows are
/// offsets the recession has no observation for.
#[derive(Debug, Clone, PartialEq)]
pub struct RecessionColumn {
    cells: Vec<Option<AlignedCell>>,
}

impl RecessionColumn {
    pub fn cells(&self) -> &[Option<AlignedCell>] {
        &self.cells
    }

    /// Number of populated rows.
    pub fn populated(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// The consolidated table: a complete, gap-free offset axis from
/// `-bkwd_qtrs_max` through `+frwd_qtrs_max`, and one column triple per
/// catalog entry.
///
/// The axis is generated once at assembly and shared by every column;
/// rows are never added or dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    bkwd_qtrs_max: u32,
    frwd_qtrs_max: u32,
    offsets: Vec<i32>,
    columns: Vec<RecessionColumn>,
}

impl AlignedTable {
    fn assemble(bkwd_qtrs_max: u32, frwd_qtrs_max: u32, columns: Vec<RecessionColumn>) -> Self {
        let rows = (bkwd_qtrs_max + frwd_qtrs_max + 1) as usize;
        let offsets: Vec<i32> =
            (-(bkwd_qtrs_max as i32)..=frwd_qtrs_max as i32).collect();
        for col in &columns {
            assert_eq!(col.cells.len(), rows, "column length must match the axis");
        }
        Self {
            bkwd_qtrs_max,
            frwd_qtrs_max,
            offsets,
            columns,
        }
    }

    /// Number of axis rows: `bkwd_qtrs_max + frwd_qtrs_max + 1`.
    pub fn row_count(&self) -> usize {
        self.offsets.len()
    }

    /// The shared offset axis, ascending and gap-free.
    pub fn offsets(&self) -> &[i32] {
        &self.offsets
    }

    pub fn recession_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[RecessionColumn] {
        &self.columns
    }

    pub fn bkwd_qtrs_max(&self) -> u32 {
        self.bkwd_qtrs_max
    }

    pub fn frwd_qtrs_max(&self) -> u32 {
        self.frwd_qtrs_max
    }

    /// Axis row index of a quarter offset, or `None` when the offset is
    /// outside the axis.
    pub fn row_of(&self, offset: i32) -> Option<usize> {
        if offset < -(self.bkwd_qtrs_max as i32) || offset > self.frwd_qtrs_max as i32 {
            return None;
        }
        Some((offset + self.bkwd_qtrs_max as i32) as usize)
    }

    /// Cell for one recession at one offset. `None` for an out-of-axis
    /// offset, an unknown recession, or an unpopulated row.
    pub fn cell(&self, recession: usize, offset: i32) -> Option<&AlignedCell> {
        let row = self.row_of(offset)?;
        self.columns.get(recession)?.cells[row].as_ref()
    }

    /// Deterministic BLAKE3 hash over the full table contents. Two builds
    /// from the same series and catalog produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for &offset in &self.offsets {
            hasher.update(&offset.to_le_bytes());
        }
        for col in &self.columns {
            for cell in &col.cells {
                match cell {
                    Some(c) => {
                        hasher.update(c.date.to_string().as_bytes());
                        hasher.update(&c.value.to_le_bytes());
                        hasher.update(&c.value_over_peak.to_le_bytes());
                    }
                    None => {
                        hasher.update(b"-");
                    }
                }
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Aligner output: the wide table plus the per-recession peaks, in
/// catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub table: AlignedTable,
    pub peaks: Vec<Peak>,
}

impl Alignment {
    /// Peak values in catalog order.
    pub fn peak_values(&self) -> Vec<f64> {
        self.peaks.iter().map(|p| p.value).collect()
    }

    /// Peak dates in catalog order.
    pub fn peak_dates(&self) -> Vec<NaiveDate> {
        self.peaks.iter().map(|p| p.date).collect()
    }
}

/// Build the full aligned table for every recession in the catalog.
///
/// For each entry, in catalog order: find the peak inside its window,
/// re-index the whole series as quarter offsets from the peak date,
/// normalize by the peak value, and place the observations onto the
/// shared axis. Observations whose offset falls outside
/// `[-bkwd_qtrs_max, +frwd_qtrs_max]` are simply not part of that column.
///
/// All-or-nothing: the first empty peak window aborts the build and no
/// table is produced.
pub fn build_aligned_table(
    series: &GdpSeries,
    catalog: &RecessionCatalog,
    bkwd_qtrs_max: u32,
    frwd_qtrs_max: u32,
) -> Result<Alignment, AlignError> {
    let rows = (bkwd_qtrs_max + frwd_qtrs_max + 1) as usize;
    let mut columns = Vec::with_capacity(catalog.len());
    let mut peaks = Vec::with_capacity(catalog.len());

    for (i, rec) in catalog.iter().enumerate() {
        let peak = compute_peak(series, &rec.peak_window, i)?;
        let offsets = compute_offsets(series, peak.date);

        let mut cells: Vec<Option<AlignedCell>> = vec![None; rows];
        for (obs, &offset) in series.iter().zip(&offsets) {
            if offset < -(bkwd_qtrs_max as i32) || offset > frwd_qtrs_max as i32 {
                continue;
            }
            let row = (offset + bkwd_qtrs_max as i32) as usize;
            // On a strictly quarterly series each offset occurs once; if a
            // denser series ever lands twice on one row, the later
            // observation wins.
            cells[row] = Some(AlignedCell {
                date: obs.date,
                value: obs.value,
                value_over_peak: obs.value / peak.value,
            });
        }

        columns.push(RecessionColumn { cells });
        peaks.push(peak);
    }

    Ok(Alignment {
        table: AlignedTable::assemble(bkwd_qtrs_max, frwd_qtrs_max, columns),
        peaks,
    })
}
