//! Integration tests for loading fiscal-year data directories.

use std::path::{Path, PathBuf};

use fiscal_core::calculations::{calculate_contributions, calculate_pausal_annual_costs};
use fiscal_core::{FiscalDataError, FiscalRegistry, PaymentKind};
use fiscal_data::{FiscalYearLoader, LoaderError};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[test]
fn test_load_single_year_file() {
    let data = FiscalYearLoader::load_file(&fixtures().join("data/fiscal-2024.toml"))
        .expect("Failed to load");

    assert_eq!(data.year, 2024);
    assert_eq!(data.brackets().len(), 5);
    assert_eq!(data.thresholds.pausal_limit, dec!(40000));
    // Only the TOML entry, the CSV is applied by `load_dir`.
    assert_eq!(data.surtax.entries.len(), 1);
    assert_eq!(
        data.payment_accounts.reference_number(PaymentKind::Hzzo, "12345678903"),
        Some("HR68 8486-12345678903".to_string())
    );
}

#[test]
fn test_load_dir_applies_surtax_csv() {
    let years = FiscalYearLoader::load_dir(&fixtures().join("data")).expect("Failed to load");

    assert_eq!(years.len(), 1);
    let data = &years[0];
    assert_eq!(data.surtax.entries.len(), 4);
    assert_eq!(data.surtax.rate_for_postal_code("51000"), Some(dec!(0.14)));
}

#[test]
fn test_loaded_year_drives_calculators() {
    let years = FiscalYearLoader::load_dir(&fixtures().join("data")).expect("Failed to load");
    let data = &years[0];

    let contributions = calculate_contributions(data);
    assert_eq!(contributions.total, dec!(255.50));

    let annual = calculate_pausal_annual_costs(data, dec!(25000), None).expect("in range");
    assert_eq!(annual.contributions, dec!(3066.00));
    assert_eq!(annual.tax, dec!(550.80));
}

#[test]
fn test_load_into_registry_keeps_builtin_years() {
    let mut registry = FiscalRegistry::with_builtin();

    let loaded =
        FiscalYearLoader::load_into(&mut registry, &fixtures().join("data")).expect("Failed to load");

    assert_eq!(loaded, 1);
    assert_eq!(registry.years(), vec![2024, 2025]);
    assert_eq!(registry.latest().expect("not empty").year, 2025);
}

#[test]
fn test_bracket_gap_is_rejected() {
    let result = FiscalYearLoader::load_dir(&fixtures().join("broken"));

    match result {
        Err(LoaderError::Invalid(FiscalDataError::BracketGap { index, found, .. })) => {
            assert_eq!(index, 1);
            assert_eq!(found, dec!(11400.00));
        }
        other => panic!("expected BracketGap, got {other:?}"),
    }
}

#[test]
fn test_missing_directory_is_io_error() {
    let result = FiscalYearLoader::load_dir(&fixtures().join("nope"));

    assert!(matches!(result, Err(LoaderError::Io { .. })));
}
