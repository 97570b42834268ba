use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use fiscal_core::FiscalRegistry;
use fiscal_data::FiscalYearLoader;

/// Validate a fiscal data directory before deploying it.
///
/// The directory holds `fiscal-<year>.toml` files and optional
/// `surtax-<year>.csv` tables. Every year is parsed, validated and merged
/// over the built-in reference data.
#[derive(Parser, Debug)]
#[command(name = "fiscal-data-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing fiscal-year files
    #[arg(short, long)]
    dir: PathBuf,

    /// Ignore the built-in reference years
    #[arg(long, default_value_t = false)]
    no_builtin: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut registry = if args.no_builtin {
        FiscalRegistry::new()
    } else {
        FiscalRegistry::with_builtin()
    };

    println!("Loading fiscal years from: {}", args.dir.display());

    let loaded = FiscalYearLoader::load_into(&mut registry, &args.dir)
        .with_context(|| format!("Failed to load: {}", args.dir.display()))?;

    if loaded == 0 {
        bail!("no fiscal-<year>.toml files in {}", args.dir.display());
    }

    println!("Loaded {loaded} fiscal year file(s).");
    for year in registry.years() {
        let data = registry.get(year)?;
        println!(
            "  {year}: {} brackets, {} surtax entries, {} deadlines, last verified {}",
            data.brackets().len(),
            data.surtax.entries.len(),
            data.deadlines.deadlines.len(),
            data.last_verified
        );
    }

    Ok(())
}
