use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Largest absolute amount a single transaction may carry (10^15 EUR).
///
/// Parsers reject anything above it, so sums over any realistic number of
/// transactions stay far inside the `Decimal` range.
pub const MAX_TRANSACTION_AMOUNT: Decimal = dec!(1000000000000000);

/// A single booked line from a bank statement.
///
/// `amount` is signed: credits are positive, debits negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub counterparty: String,
    pub description: String,
    pub is_income: bool,
}

impl BankTransaction {
    pub fn has_plausible_amount(&self) -> bool {
        self.amount.abs() <= MAX_TRANSACTION_AMOUNT
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedBankStatement {
    pub bank_name: String,
    pub iban: String,
    pub currency: Option<String>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub transactions: Vec<BankTransaction>,
}

impl ParsedBankStatement {
    pub fn income_total(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.is_income)
            .fold(Decimal::ZERO, |total, t| total.saturating_add(t.amount))
    }

    /// Transactions dated outside `[period_start, period_end]`.
    pub fn out_of_period(&self) -> impl Iterator<Item = &BankTransaction> {
        self.transactions
            .iter()
            .filter(|t| t.date < self.period_start || t.date > self.period_end)
    }
}
