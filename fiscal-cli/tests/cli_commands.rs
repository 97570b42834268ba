//! End-to-end tests of the `fiscal` subcommands against on-disk fixtures.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Parser;
use fiscal_cli::{Cli, run};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

fn fixture(name: &str) -> String {
    fixture_path(name).to_string_lossy().into_owned()
}

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()
}

/// Runs the command line and returns stdout.
fn run_ok(args: &[&str]) -> String {
    let cli = Cli::parse_from(std::iter::once("fiscal").chain(args.iter().copied()));
    let mut out = Vec::new();
    run(&cli, today(), &mut out).unwrap_or_else(|e| panic!("{args:?} failed: {e:#}"));
    String::from_utf8(out).expect("utf-8 output")
}

fn run_err(args: &[&str]) -> anyhow::Error {
    let cli = Cli::parse_from(std::iter::once("fiscal").chain(args.iter().copied()));
    let mut out = Vec::new();
    match run(&cli, today(), &mut out) {
        Ok(_) => panic!("{args:?} should fail"),
        Err(e) => e,
    }
}

fn run_json(args: &[&str]) -> Value {
    let mut with_json = args.to_vec();
    with_json.push("--json");
    serde_json::from_str(&run_ok(&with_json)).expect("valid JSON")
}

fn decimal(
    value: &Value,
    key: &str,
) -> Decimal {
    let raw = &value[key];
    match raw {
        Value::String(s) => s.parse().unwrap_or_else(|_| panic!("{key}: {s}")),
        other => other.to_string().parse().unwrap_or_else(|_| panic!("{key}: {other}")),
    }
}

// =============================================================================
// posd
// =============================================================================

#[test]
fn test_posd_from_statement() {
    let statement = fixture("camt053_zaba_2025.xml");

    let report = run_json(&["posd", "--statement", &statement, "--postal-code", "10000"]);

    // Defaults to the previous calendar year.
    assert_eq!(report["year"], 2025);
    assert_eq!(decimal(&report, "total_income"), dec!(9504.49));
    assert_eq!(decimal(&report, "tax_base"), dec!(6653.14));
    assert_eq!(decimal(&report, "surtax"), dec!(143.71));
    assert_eq!(decimal(&report, "net_after_tax"), dec!(5412.28));
    assert_eq!(decimal(&report, "municipality_rate"), dec!(0.18));
    assert_eq!(report["quarterly_breakdown"].as_array().map(Vec::len), Some(4));
    assert_eq!(report["duplicates_skipped"], 0);
    assert_eq!(report["warnings"], Value::Array(vec![]));
}

#[test]
fn test_posd_counts_repeated_statement_once() {
    let statement = fixture("camt053_zaba_2025.xml");

    let report = run_json(&[
        "posd",
        "--year",
        "2025",
        "--statement",
        &statement,
        "--statement",
        &statement,
        "--surtax-rate",
        "0.18",
    ]);

    assert_eq!(report["duplicates_skipped"], 5);
    assert_eq!(decimal(&report, "total_income"), dec!(9504.49));
}

#[test]
fn test_posd_adds_income_ledger() {
    let report = run_json(&[
        "posd",
        "--year",
        "2025",
        "--statement",
        &fixture("camt053_zaba_2025.xml"),
        "--kpr",
        &fixture("kpr_2025.csv"),
    ]);

    assert_eq!(decimal(&report, "total_income"), dec!(9854.49));
    // No surtax source given.
    assert_eq!(decimal(&report, "surtax"), dec!(0));
}

#[test]
fn test_posd_text_output() {
    let text = run_ok(&[
        "posd",
        "--year",
        "2025",
        "--statement",
        &fixture("camt053_zaba_2025.xml"),
        "--surtax-rate",
        "0,18",
    ]);

    assert!(text.starts_with("PO-SD 2025 (obrt)\n"), "got:\n{text}");
    assert!(text.contains("9.504,49 €"), "got:\n{text}");
    assert!(text.contains("Surtax (18%)"), "got:\n{text}");
    assert!(!text.contains("Warning:"), "got:\n{text}");
}

#[test]
fn test_posd_for_year_without_data_warns() {
    let report = run_json(&[
        "posd",
        "--year",
        "2026",
        "--kpr",
        &fixture("kpr_2025.csv"),
    ]);

    let warnings = report["warnings"].as_array().expect("warnings");
    assert!(warnings.iter().any(|w| w["type"] == "DataYearMismatch"));
    assert!(warnings.iter().any(|w| w["type"] == "TransactionsOutsideYear"));
}

#[test]
fn test_posd_requires_an_income_source() {
    let err = run_err(&["posd", "--year", "2025"]);

    assert!(err.to_string().contains("no income source"));
}

#[test]
fn test_posd_unknown_postal_code() {
    let err = run_err(&[
        "posd",
        "--kpr",
        &fixture("kpr_2025.csv"),
        "--postal-code",
        "99999",
    ]);

    assert!(err.to_string().contains("99999"));
}

// =============================================================================
// statement
// =============================================================================

#[test]
fn test_statement_income_only() {
    let report = run_json(&["statement", &fixture("camt053_zaba_2025.xml"), "--income-only"]);

    assert_eq!(report["bank_name"], "Zagrebačka banka");
    assert_eq!(report["income_count"], 5);
    assert_eq!(report["transactions"].as_array().map(Vec::len), Some(5));
    assert_eq!(decimal(&report, "income_total"), dec!(9504.49));
}

#[test]
fn test_statement_missing_file() {
    let err = run_err(&["statement", &fixture("missing.xml")]);

    assert!(format!("{err:#}").contains("missing.xml"));
}

// =============================================================================
// pausal / jdoo / payment
// =============================================================================

#[test]
fn test_pausal_costs_text() {
    let text = run_ok(&["pausal", "--revenue", "25000"]);

    assert!(text.contains("319,81 €"), "got:\n{text}");
    assert!(text.contains("3.837,72 €"), "got:\n{text}");
    assert!(!text.contains("TZ contribution"));
}

#[test]
fn test_pausal_costs_with_tz_group() {
    let report = run_json(&["pausal", "--revenue", "25000", "--tz-group", "1"]);

    assert_eq!(decimal(&report["annual"], "tz"), dec!(35.53));
    assert_eq!(decimal(&report["annual"], "total"), dec!(3873.25));
    assert_eq!(decimal(&report["bracket"], "quarterly_tax"), dec!(137.70));
}

#[test]
fn test_pausal_above_limit_fails() {
    let err = run_err(&["pausal", "--revenue", "75000"]);

    assert!(format!("{err:#}").contains("exceeds the paušal limit"));
}

#[test]
fn test_jdoo_costs() {
    let report = run_json(&["jdoo", "--revenue", "50000"]);

    assert_eq!(decimal(&report["costs"], "yearly_contributions"), dec!(3066));
    assert_eq!(decimal(&report["costs"], "yearly_tax"), dec!(2853));
    assert_eq!(decimal(&report["costs"], "effective_tax_rate"), dec!(5.706));
    assert!(report["pausal_annual_total"].is_string() || report["pausal_annual_total"].is_number());
}

#[test]
fn test_jdoo_above_pausal_limit_has_no_comparison() {
    let report = run_json(&["jdoo", "--revenue", "1500000"]);

    assert_eq!(decimal(&report["costs"], "yearly_tax"), dec!(133936));
    assert!(report["pausal_annual_total"].is_null());
}

#[test]
fn test_payment_for_pausal_tax() {
    let report = run_json(&["payment", "pausal-tax", "--oib", "12345678903", "--revenue", "25000"]);

    assert_eq!(report["iban"], "HR1210010051863000160");
    assert_eq!(report["reference"], "HR68 1449-12345678903");
    assert_eq!(decimal(&report, "amount"), dec!(137.70));
    assert_eq!(report["frequency"], "quarterly");
}

#[test]
fn test_payment_for_health_insurance() {
    let report = run_json(&["payment", "hzzo", "--oib", "12345678903"]);

    assert_eq!(report["kind"], "hzzo");
    assert_eq!(decimal(&report, "amount"), dec!(118.67));
}

#[test]
fn test_payment_rejects_invalid_oib() {
    let err = run_err(&["payment", "hok", "--oib", "12345678901"]);

    assert!(err.to_string().contains("not a valid OIB"));
}

// =============================================================================
// oib / deadlines / years
// =============================================================================

#[test]
fn test_oib_output() {
    let text = run_ok(&["oib", "12345678903", "12345678901"]);

    assert_eq!(text, "12345678903   valid\n12345678901   invalid\n");
}

#[test]
fn test_deadlines_from_date() {
    let report = run_json(&["deadlines", "--from", "01.12.2025", "--limit", "2"]);

    let deadlines = report["deadlines"].as_array().expect("deadlines");
    assert_eq!(deadlines.len(), 2);
    assert_eq!(deadlines[0]["date"], "2025-12-15");
}

#[test]
fn test_years_with_data_dir() {
    let data_dir = fixture("data");

    let report = run_json(&["years", "--data-dir", &data_dir]);

    let years: Vec<_> = report["years"]
        .as_array()
        .expect("years")
        .iter()
        .map(|y| y["year"].as_i64().unwrap_or_default())
        .collect();
    assert_eq!(years, vec![2024, 2025]);
}

#[test]
fn test_data_dir_year_is_used_for_calculations() {
    let report = run_json(&["pausal", "--revenue", "25000", "--year", "2024", "--data-dir", &fixture("data")]);

    assert_eq!(report["year"], 2024);
    assert_eq!(decimal(&report["monthly"], "contributions"), dec!(255.50));
}
