use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use fiscal_core::{BusinessType, ExpenseBracket, PaymentKind, TzGroup};
use rust_decimal::Decimal;

use crate::utils;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Fiscal calculator for Croatian paušalni obrt and j.d.o.o.
///
/// Validates OIBs, reads camt.053 bank statements, fills in the PO-SD form
/// and estimates running costs from versioned reference data.
#[derive(Debug, Parser)]
#[command(name = "fiscal", version, about)]
pub struct Cli {
    /// Directory with fiscal-<year>.toml and surtax-<year>.csv files that
    /// extend or override the built-in reference data.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level ("warn", "debug", ...) or an EnvFilter directive.
    /// Falls back to RUST_LOG, then "warn".
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Print results as JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check one or more OIB numbers.
    Oib(OibArgs),
    /// Parse a camt.053 bank statement and list its transactions.
    Statement(StatementArgs),
    /// Fill in the annual PO-SD form from bank statements and the income ledger.
    Posd(PosdArgs),
    /// Monthly and annual running costs of a paušalni obrt.
    Pausal(PausalArgs),
    /// Director salary and profit tax of a j.d.o.o.
    Jdoo(JdooArgs),
    /// Payment details (IBAN, model, reference number) for an obligation.
    Payment(PaymentArgs),
    /// Upcoming filing and payment deadlines.
    Deadlines(DeadlinesArgs),
    /// Fiscal years with reference data.
    Years,
}

#[derive(Debug, Args)]
pub struct OibArgs {
    /// OIB numbers (11 digits)
    #[arg(required = true)]
    pub oibs: Vec<String>,
}

#[derive(Debug, Args)]
pub struct StatementArgs {
    /// camt.053 XML export
    pub file: PathBuf,

    /// Only list income (credit) transactions
    #[arg(long, default_value_t = false)]
    pub income_only: bool,
}

#[derive(Debug, Args)]
pub struct PosdArgs {
    /// Year being reported. Defaults to the previous calendar year.
    #[arg(long)]
    pub year: Option<i32>,

    /// camt.053 XML exports; may be given more than once
    #[arg(long = "statement", value_name = "FILE")]
    pub statements: Vec<PathBuf>,

    /// Income ledger (KPR) CSV export
    #[arg(long, value_name = "FILE")]
    pub kpr: Option<PathBuf>,

    #[arg(long, default_value = "obrt", value_parser = parse_business_type)]
    pub business_type: BusinessType,

    /// The payer is only in the first pension pillar
    #[arg(long, default_value_t = false)]
    pub no_second_pillar: bool,

    /// Residence postal code, used to look up the municipal surtax
    #[arg(long, conflicts_with = "surtax_rate")]
    pub postal_code: Option<String>,

    /// Municipal surtax rate as a fraction (0.18 for 18%)
    #[arg(long, value_parser = parse_amount)]
    pub surtax_rate: Option<Decimal>,

    /// Normative expense percentage: 15, 30, 60 or 85
    #[arg(long, default_value = "30", value_parser = parse_expense_bracket)]
    pub expense_bracket: ExpenseBracket,
}

#[derive(Debug, Args)]
pub struct PausalArgs {
    /// Expected annual revenue in EUR
    #[arg(long, value_parser = parse_amount)]
    pub revenue: Decimal,

    /// Reference year. Defaults to the latest available.
    #[arg(long)]
    pub year: Option<i32>,

    /// Tourist-board group (1-5); adds the TZ contribution to annual costs
    #[arg(long, value_parser = parse_tz_group)]
    pub tz_group: Option<TzGroup>,
}

#[derive(Debug, Args)]
pub struct JdooArgs {
    /// Expected annual revenue in EUR
    #[arg(long, value_parser = parse_amount)]
    pub revenue: Decimal,

    /// Reference year. Defaults to the latest available.
    #[arg(long)]
    pub year: Option<i32>,

    /// The director is employed elsewhere and draws no salary
    #[arg(long, default_value_t = false)]
    pub other_employment: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaymentKindArg {
    PausalTax,
    MioI,
    MioII,
    Hzzo,
    Hok,
}

impl From<PaymentKindArg> for PaymentKind {
    fn from(kind: PaymentKindArg) -> Self {
        match kind {
            PaymentKindArg::PausalTax => PaymentKind::PausalTax,
            PaymentKindArg::MioI => PaymentKind::MioI,
            PaymentKindArg::MioII => PaymentKind::MioII,
            PaymentKindArg::Hzzo => PaymentKind::Hzzo,
            PaymentKindArg::Hok => PaymentKind::Hok,
        }
    }
}

#[derive(Debug, Args)]
pub struct PaymentArgs {
    #[arg(value_enum)]
    pub kind: PaymentKindArg,

    /// Payer OIB, used in the reference number
    #[arg(long)]
    pub oib: String,

    /// Expected annual revenue; needed for the quarterly paušal tax amount
    #[arg(long, value_parser = parse_amount)]
    pub revenue: Option<Decimal>,

    /// Reference year. Defaults to the latest available.
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Debug, Args)]
pub struct DeadlinesArgs {
    /// List deadlines on or after this date (YYYY-MM-DD or DD.MM.YYYY). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Reference year. Defaults to the year of --from.
    #[arg(long)]
    pub year: Option<i32>,

    /// Show at most this many deadlines
    #[arg(long, default_value_t = 5)]
    pub limit: usize,
}

// ─── value parsers ───────────────────────────────────────────────────────────

fn parse_amount(s: &str) -> Result<Decimal, String> {
    utils::parse_decimal(s).map_err(|e| e.to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    utils::parse_date(s).map_err(|e| e.to_string())
}

fn parse_business_type(s: &str) -> Result<BusinessType, String> {
    BusinessType::parse(s).ok_or_else(|| {
        format!("unknown business type '{s}', expected 'obrt' or 'slobodna-djelatnost'")
    })
}

fn parse_expense_bracket(s: &str) -> Result<ExpenseBracket, String> {
    let value: u8 = s
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| format!("'{s}' is not a percentage"))?;
    ExpenseBracket::try_from(value).map_err(|e| e.to_string())
}

fn parse_tz_group(s: &str) -> Result<TzGroup, String> {
    let value: u8 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a group number"))?;
    TzGroup::try_from(value)
}
