use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use fiscal_core::{FiscalDataError, FiscalRegistry, FiscalYearData, SurtaxEntry};
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

static POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}$").expect("postal code pattern is a valid regex"));

/// Errors that can occur when loading fiscal-year files.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid postal code '{code}' on row {row}")]
    InvalidPostalCode { code: String, row: usize },

    #[error("Surtax rate {rate} on row {row} is not between 0 and 1")]
    InvalidRate { rate: Decimal, row: usize },

    #[error("Postal code {code} appears more than once (row {row})")]
    DuplicatePostalCode { code: String, row: usize },

    #[error("Invalid fiscal data: {0}")]
    Invalid(#[from] FiscalDataError),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<csv::Error> for LoaderError {
    fn from(err: csv::Error) -> Self {
        LoaderError::CsvParse(err.to_string())
    }
}

fn read_file(path: &Path) -> Result<String, LoaderError> {
    fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Loader for a complete fiscal year from a TOML file.
///
/// The file mirrors [`FiscalYearData`]: a top-level `year` and
/// `last_verified`, then one table per concern (`[contributions]`,
/// `[tax_brackets]`, `[thresholds]`, ...). Dates are quoted ISO strings and
/// amounts may be quoted to keep their exact decimal value.
///
/// A data directory holds `fiscal-<year>.toml` files and, optionally, a
/// `surtax-<year>.csv` next to each that replaces the TOML surtax entries.
pub struct FiscalYearLoader;

impl FiscalYearLoader {
    /// Parse and validate one fiscal year.
    pub fn parse(contents: &str) -> Result<FiscalYearData, LoaderError> {
        let data: FiscalYearData = toml::from_str(contents)?;
        data.validate()?;
        Ok(data)
    }

    pub fn load_file(path: &Path) -> Result<FiscalYearData, LoaderError> {
        let data = Self::parse(&read_file(path)?)?;
        debug!(path = %path.display(), year = data.year, "loaded fiscal year");
        Ok(data)
    }

    /// Load every `fiscal-*.toml` in `dir`, ordered by file name.
    pub fn load_dir(dir: &Path) -> Result<Vec<FiscalYearData>, LoaderError> {
        let entries = fs::read_dir(dir).map_err(|source| LoaderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| LoaderError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if name.starts_with("fiscal-") && name.ends_with(".toml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut years = Vec::with_capacity(paths.len());
        for path in paths {
            let mut data = Self::load_file(&path)?;

            let surtax_path = dir.join(format!("surtax-{}.csv", data.year));
            if surtax_path.is_file() {
                let entries = SurtaxLoader::load_file(&surtax_path)?;
                SurtaxLoader::apply(&mut data, entries);
            }

            years.push(data);
        }

        Ok(years)
    }

    /// Load a data directory into `registry`, replacing years already present.
    ///
    /// Returns the number of years loaded.
    pub fn load_into(
        registry: &mut FiscalRegistry,
        dir: &Path,
    ) -> Result<usize, LoaderError> {
        let years = Self::load_dir(dir)?;
        let count = years.len();

        for data in years {
            let year = data.year;
            if registry.insert(data)?.is_some() {
                info!(year, "fiscal year overridden from data directory");
            }
        }

        Ok(count)
    }
}

/// Loader for municipal surtax tables from CSV.
///
/// Columns: `postal_code,municipality,rate`, rate as a fraction (0.18 for 18%).
pub struct SurtaxLoader;

impl SurtaxLoader {
    /// Parse surtax rows from a CSV reader.
    ///
    /// Rows are numbered from 1, excluding the header.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<SurtaxEntry>, LoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut entries: Vec<SurtaxEntry> = Vec::new();
        let mut seen = HashSet::new();

        for (index, result) in csv_reader.deserialize().enumerate() {
            let entry: SurtaxEntry = result?;
            let row = index + 1;

            if !POSTAL_CODE.is_match(&entry.postal_code) {
                return Err(LoaderError::InvalidPostalCode {
                    code: entry.postal_code,
                    row,
                });
            }
            if entry.rate < Decimal::ZERO || entry.rate >= Decimal::ONE {
                return Err(LoaderError::InvalidRate {
                    rate: entry.rate,
                    row,
                });
            }
            if !seen.insert(entry.postal_code.clone()) {
                return Err(LoaderError::DuplicatePostalCode {
                    code: entry.postal_code,
                    row,
                });
            }

            entries.push(entry);
        }

        Ok(entries)
    }

    pub fn load_file(path: &Path) -> Result<Vec<SurtaxEntry>, LoaderError> {
        let file = fs::File::open(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries = Self::parse(file)?;
        debug!(path = %path.display(), rows = entries.len(), "loaded surtax table");
        Ok(entries)
    }

    /// Replace the surtax entries of `data`.
    pub fn apply(
        data: &mut FiscalYearData,
        entries: Vec<SurtaxEntry>,
    ) {
        data.surtax.entries = entries;
    }
}
