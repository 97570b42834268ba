//! Reference data setup shared by every subcommand.

use std::path::Path;

use anyhow::{Context, Result};
use fiscal_core::{FiscalRegistry, FiscalYearData};
use fiscal_data::FiscalYearLoader;
use tracing::{debug, warn};

/// Built-in years, overridden and extended by `data_dir` when given.
pub fn build_registry(data_dir: Option<&Path>) -> Result<FiscalRegistry> {
    let mut registry = FiscalRegistry::with_builtin();

    if let Some(dir) = data_dir {
        let loaded = FiscalYearLoader::load_into(&mut registry, dir)
            .with_context(|| format!("failed to load fiscal data from {}", dir.display()))?;
        if loaded == 0 {
            warn!(dir = %dir.display(), "data directory contains no fiscal-<year>.toml files");
        }
        debug!(loaded, years = ?registry.years(), "fiscal registry ready");
    }

    Ok(registry)
}

/// The dataset for `year`, or the latest one when no year is requested.
///
/// A missing year falls back to the closest earlier dataset with a warning;
/// calculators that care (PO-SD) report the mismatch themselves.
pub fn select_year(
    registry: &FiscalRegistry,
    year: Option<i32>,
) -> Result<&FiscalYearData> {
    let data = match year {
        Some(year) => registry.closest(year)?,
        None => registry.latest()?,
    };

    if let Some(requested) = year.filter(|y| *y != data.year) {
        warn!(requested, using = data.year, "no fiscal data for requested year");
    }

    Ok(data)
}
