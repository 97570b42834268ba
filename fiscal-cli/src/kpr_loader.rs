//! CSV loader for the income ledger (knjiga prometa, KPR).
//!
//! Paušalists record every receipt in the KPR, including cash and card
//! payments that never show up on a bank statement. Exported ledgers can be
//! fed to the PO-SD calculation next to (or instead of) bank statements.
//!
//! ## CSV Format
//!
//! Headers are matched by name; column order does not matter.
//!
//! | Column        | Required | Notes                                       |
//! |---------------|----------|---------------------------------------------|
//! | `date`        | yes      | `2025-03-31` or `31.03.2025`                |
//! | `amount`      | yes      | `1.234,56` or `1234.56`; must be positive   |
//! | `document`    | no       | invoice number, used as the transaction id  |
//! | `payer`       | no       |                                             |
//! | `description` | no       |                                             |
//!
//! ### Example
//!
//! ```csv
//! date,amount,document,payer,description
//! 15.01.2025,"1.250,00",1-1-1,Klijent d.o.o.,Izrada web stranice
//! 2025-02-03,80.00,,,Gotovina
//! ```

use std::path::Path;

use chrono::NaiveDate;
use fiscal_core::{BankTransaction, MAX_TRANSACTION_AMOUNT};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::utils::{parse_date, parse_decimal};

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    amount: String,
    #[serde(default)]
    document: Option<String>,
    #[serde(default)]
    payer: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Errors that can occur while loading an income ledger.
#[derive(Debug, thiserror::Error)]
pub enum KprLoadError {
    /// The underlying CSV deserialisation failed (bad structure, missing
    /// required column, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("invalid date '{value}' on row {row}")]
    InvalidDate { value: String, row: usize },

    #[error("invalid amount '{value}' on row {row}")]
    InvalidAmount { value: String, row: usize },

    /// Refunds and corrections are not income and must not be in the ledger.
    #[error("amount {amount} on row {row} is not positive")]
    NonPositiveAmount { amount: Decimal, row: usize },

    #[error("cannot read income ledger: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert a single CSV row into an income transaction.
///
/// row_number is 1-based (for error messages).
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<BankTransaction, KprLoadError> {
    let date: NaiveDate = parse_date(&row.date).map_err(|_| KprLoadError::InvalidDate {
        value: row.date.clone(),
        row: row_number,
    })?;

    let amount = parse_decimal(&row.amount)
        .ok()
        .filter(|a| a.abs() <= MAX_TRANSACTION_AMOUNT)
        .ok_or_else(|| KprLoadError::InvalidAmount {
            value: row.amount.clone(),
            row: row_number,
        })?;
    if amount <= Decimal::ZERO {
        return Err(KprLoadError::NonPositiveAmount {
            amount,
            row: row_number,
        });
    }

    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    Ok(BankTransaction {
        id: non_empty(row.document).unwrap_or_else(|| format!("kpr-{row_number}")),
        date,
        amount,
        counterparty: non_empty(row.payer).unwrap_or_default(),
        description: non_empty(row.description).unwrap_or_default(),
        is_income: true,
    })
}

/// Parse CSV text and return the ledger rows as income transactions, in file
/// order.
///
/// # Errors
///
/// * [`KprLoadError::Parse`] – the CSV is structurally invalid.
/// * [`KprLoadError::InvalidDate`] / [`KprLoadError::InvalidAmount`] – a
///   cell cannot be interpreted.
/// * [`KprLoadError::NonPositiveAmount`] – a row records zero or a negative
///   amount.
pub fn load_from_str(input: &str) -> Result<Vec<BankTransaction>, KprLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1)
        })
        .collect()
}

/// Read a ledger from disk and delegate to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<BankTransaction>, KprLoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents)
}
