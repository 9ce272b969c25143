//! PeakLab CLI — download, build, render, and cache management commands.
//!
//! Commands:
//! - `download` — fetch the GDP series from FRED and cache it as CSV
//! - `build` — align the series around each recession's peak and write the wide CSV
//! - `render` — build the aligned table and write the normalized peak plot HTML
//! - `cache status` — report cached end dates, spans, and sizes
//! - `cache clean` — remove entries cached before a cutoff

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use peaklab_chart::{write_chart, ChartSpec};
use peaklab_core::align::{build_aligned_table, Alignment};
use peaklab_core::data::{
    load_series, CacheMeta, DataSource, FredProvider, LoadOptions, SeriesCache, SeriesProvider,
};
use peaklab_core::domain::RecessionCatalog;

#[derive(Parser)]
#[command(
    name = "peaklab",
    about = "PeakLab CLI — normalized peak plots of U.S. real GDP across recessions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the GDP series from FRED and cache it as CSV.
    Download {
        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Force re-download even if cached.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Build the aligned table and write the wide CSV artifact.
    Build {
        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Quarters before the peak covered by the table axis.
        #[arg(long, default_value_t = 12)]
        bkwd_qtrs_max: u32,

        /// Quarters after the peak covered by the table axis.
        #[arg(long, default_value_t = 40)]
        frwd_qtrs_max: u32,

        /// Path to a TOML recession catalog. Defaults to the built-in
        /// fifteen U.S. recessions.
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Offline mode: no network access.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Use synthetic data as fallback.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Force re-download even if cached.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Build the aligned table and render the normalized peak plot.
    Render {
        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Quarters before the peak covered by the table axis.
        #[arg(long, default_value_t = 12)]
        bkwd_qtrs_max: u32,

        /// Quarters after the peak covered by the table axis.
        #[arg(long, default_value_t = 40)]
        frwd_qtrs_max: u32,

        /// Quarters before the peak shown in the default viewport.
        #[arg(long, default_value_t = 3)]
        bkwd_qtrs_main: u32,

        /// Quarters after the peak shown in the default viewport.
        #[arg(long, default_value_t = 11)]
        frwd_qtrs_main: u32,

        /// Path to a TOML recession catalog. Defaults to the built-in
        /// fifteen U.S. recessions.
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Offline mode: no network access.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Use synthetic data as fallback.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Force re-download even if cached.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        /// Output directory for the chart HTML.
        #[arg(long, default_value = "images")]
        output_dir: PathBuf,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached end dates, spans, row counts, and sizes.
    Status {
        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Remove entries cached more than the given number of days ago.
    Clean {
        /// Remove entries cached more than this many days ago.
        #[arg(long)]
        older_than_days: u64,

        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Download {
            end,
            force,
            cache_dir,
        } => run_download(end, force, cache_dir),
        Commands::Build {
            end,
            bkwd_qtrs_max,
            frwd_qtrs_max,
            catalog,
            offline,
            synthetic,
            force,
            cache_dir,
        } => {
            build_table(
                end.as_deref(),
                bkwd_qtrs_max,
                frwd_qtrs_max,
                catalog.as_deref(),
                offline,
                synthetic,
                force,
                &cache_dir,
            )?;
            Ok(())
        }
        Commands::Render {
            end,
            bkwd_qtrs_max,
            frwd_qtrs_max,
            bkwd_qtrs_main,
            frwd_qtrs_main,
            catalog,
            offline,
            synthetic,
            force,
            cache_dir,
            output_dir,
        } => run_render(
            end,
            bkwd_qtrs_max,
            frwd_qtrs_max,
            bkwd_qtrs_main,
            frwd_qtrs_main,
            catalog,
            offline,
            synthetic,
            force,
            cache_dir,
            output_dir,
        ),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => run_cache_status(&cache_dir),
            CacheAction::Clean {
                older_than_days,
                cache_dir,
                confirm,
            } => run_cache_clean(&cache_dir, older_than_days, confirm),
        },
    }
}

fn run_download(end: Option<String>, force: bool, cache_dir: PathBuf) -> Result<()> {
    let end_date = parse_end(end.as_deref())?;
    let cache = SeriesCache::new(cache_dir);
    let provider = FredProvider::new();

    let opts = LoadOptions {
        end_date,
        offline: false,
        synthetic: false,
        force,
    };
    let loaded = load_series(&cache, Some(&provider), &opts)?;

    println!(
        "End date of U.S. real GDP series is {}",
        loaded.end_date
    );
    println!(
        "{} quarterly observations ({} to {}), source: {}",
        loaded.series.len(),
        loaded.series.first_date(),
        loaded.end_date,
        loaded.source.as_str()
    );
    Ok(())
}

/// Output of the shared load-and-align step behind `build` and `render`.
struct BuildOutput {
    alignment: Alignment,
    catalog: RecessionCatalog,
    end_date: NaiveDate,
}

#[allow(clippy::too_many_arguments)]
fn build_table(
    end: Option<&str>,
    bkwd_qtrs_max: u32,
    frwd_qtrs_max: u32,
    catalog_path: Option<&Path>,
    offline: bool,
    synthetic: bool,
    force: bool,
    cache_dir: &Path,
) -> Result<BuildOutput> {
    let end_date = parse_end(end)?;
    let catalog = match catalog_path {
        Some(path) => RecessionCatalog::from_file(path)?,
        None => RecessionCatalog::us_recessions(),
    };

    let cache = SeriesCache::new(cache_dir);
    let provider = FredProvider::new();
    let provider_ref: Option<&dyn SeriesProvider> = if offline { None } else { Some(&provider) };

    let opts = LoadOptions {
        end_date,
        offline,
        synthetic,
        force,
    };
    let loaded = load_series(&cache, provider_ref, &opts)?;

    if loaded.end_date != end_date {
        println!(
            "GDPC1 data requested through {end_date} has most recent data quarter of {}.",
            loaded.end_date
        );
    }
    println!(
        "End date of U.S. real GDP series is {}",
        loaded.end_date
    );

    let alignment = build_aligned_table(&loaded.series, &catalog, bkwd_qtrs_max, frwd_qtrs_max)?;

    for (i, peak) in alignment.peaks.iter().enumerate() {
        let onset = catalog.get(i).map(|r| r.onset.as_str()).unwrap_or("?");
        println!(
            "peak {i}: {:.1} on {} (recession onset {onset})",
            peak.value, peak.date
        );
    }
    if loaded.source == DataSource::Synthetic {
        println!("WARNING: table built from SYNTHETIC data");
    }

    let csv_path = cache.write_aligned_csv(&alignment, loaded.end_date)?;
    println!("Aligned table written to: {}", csv_path.display());

    Ok(BuildOutput {
        alignment,
        catalog,
        end_date: loaded.end_date,
    })
}

#[allow(clippy::too_many_arguments)]
fn run_render(
    end: Option<String>,
    bkwd_qtrs_max: u32,
    frwd_qtrs_max: u32,
    bkwd_qtrs_main: u32,
    frwd_qtrs_main: u32,
    catalog: Option<PathBuf>,
    offline: bool,
    synthetic: bool,
    force: bool,
    cache_dir: PathBuf,
    output_dir: PathBuf,
) -> Result<()> {
    if bkwd_qtrs_main > bkwd_qtrs_max || frwd_qtrs_main > frwd_qtrs_max {
        bail!(
            "main window [-{bkwd_qtrs_main}, +{frwd_qtrs_main}] must fit inside \
             the table axis [-{bkwd_qtrs_max}, +{frwd_qtrs_max}]"
        );
    }

    let out = build_table(
        end.as_deref(),
        bkwd_qtrs_max,
        frwd_qtrs_max,
        catalog.as_deref(),
        offline,
        synthetic,
        force,
        &cache_dir,
    )?;

    let spec = ChartSpec {
        bkwd_qtrs_main,
        frwd_qtrs_main,
        ..ChartSpec::default()
    };
    let path = write_chart(&output_dir, &out.alignment, &out.catalog, out.end_date, &spec)?;
    println!("Chart written to: {}", path.display());

    Ok(())
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = SeriesCache::new(cache_dir);
    let entries = cache.entries();
    if entries.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    let mut total_size: u64 = 0;
    println!("Cache: {}", cache_dir.display());
    println!("Entries: {}", entries.len());
    println!();
    println!(
        "{:<12} {:<25} {:<8} {:>10} {:<10}",
        "End Date", "Span", "Rows", "Size", "Source"
    );
    println!("{}", "-".repeat(70));
    for meta in &entries {
        let size = entry_size(&cache, meta.end_date);
        total_size += size;
        println!(
            "{:<12} {:<25} {:<8} {:>10} {:<10}",
            meta.end_date.to_string(),
            format!("{} to {}", meta.start_date, meta.end_date),
            meta.row_count,
            format_size(size),
            meta.source
        );
    }
    println!();
    println!("Total size: {}", format_size(total_size));

    Ok(())
}

fn run_cache_clean(cache_dir: &Path, older_than_days: u64, confirm: bool) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = SeriesCache::new(cache_dir);
    let cutoff =
        chrono::Local::now().naive_local() - chrono::Duration::days(older_than_days as i64);

    let stale: Vec<CacheMeta> = cache
        .entries()
        .into_iter()
        .filter(|m| m.cached_at < cutoff)
        .collect();

    if stale.is_empty() {
        println!("No entries cached more than {older_than_days} days ago.");
        return Ok(());
    }

    println!(
        "Found {} entr{} cached more than {older_than_days} days ago:",
        stale.len(),
        if stale.len() == 1 { "y" } else { "ies" }
    );
    for meta in &stale {
        println!(
            "  {} ({} rows, cached {})",
            meta.end_date, meta.row_count, meta.cached_at
        );
    }

    if !confirm {
        println!();
        println!("Dry run — pass --confirm to actually delete.");
        return Ok(());
    }

    for meta in &stale {
        cache.remove_entry(meta.end_date)?;
        println!("Removed: {}", meta.end_date);
    }

    println!("Done. Removed {} entr{}.", stale.len(), if stale.len() == 1 { "y" } else { "ies" });
    Ok(())
}

fn parse_end(end: Option<&str>) -> Result<NaiveDate> {
    Ok(end
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()?
        .unwrap_or_else(|| chrono::Local::now().date_naive()))
}

fn entry_size(cache: &SeriesCache, end_date: NaiveDate) -> u64 {
    let mut size = 0u64;
    for path in [
        cache.series_path(end_date),
        cache.aligned_path(end_date),
        cache.meta_path(end_date),
    ] {
        if let Ok(meta) = std::fs::metadata(&path) {
            size += meta.len();
        }
    }
    size
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
