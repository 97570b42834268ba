use std::io::{self, Write};

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use fiscal_core::BankTransaction;
use fiscal_core::calculations::common::format_eur;
use fiscal_data::{filter_income_transactions, parse_bank_file};
use rust_decimal::Decimal;
use serde::Serialize;

use super::Render;
use crate::cli::StatementArgs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementReport {
    pub bank_name: String,
    pub iban: String,
    pub currency: Option<String>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub income_count: usize,
    pub income_total: Decimal,
    pub outside_period: usize,
    pub transactions: Vec<BankTransaction>,
}

pub fn run(args: &StatementArgs) -> Result<StatementReport> {
    let statement = parse_bank_file(&args.file)
        .with_context(|| format!("failed to read statement {}", args.file.display()))?;

    let income = filter_income_transactions(&statement.transactions);
    let outside_period = statement.out_of_period().count();
    let income_total = statement.income_total();

    Ok(StatementReport {
        bank_name: statement.bank_name,
        iban: statement.iban,
        currency: statement.currency,
        period_start: statement.period_start,
        period_end: statement.period_end,
        income_count: income.len(),
        income_total,
        outside_period,
        transactions: if args.income_only {
            income
        } else {
            statement.transactions
        },
    })
}

fn truncate(
    text: &str,
    width: usize,
) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

impl Render for StatementReport {
    fn render(
        &self,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        writeln!(out, "{} ({})", self.bank_name, self.iban)?;
        writeln!(
            out,
            "Period: {} – {}",
            self.period_start.format("%d.%m.%Y."),
            self.period_end.format("%d.%m.%Y.")
        )?;
        writeln!(
            out,
            "Income: {} in {} transaction(s)",
            format_eur(self.income_total),
            self.income_count
        )?;
        if self.outside_period > 0 {
            writeln!(
                out,
                "Note: {} transaction(s) dated outside the statement period",
                self.outside_period
            )?;
        }
        writeln!(out)?;

        for t in &self.transactions {
            let party = truncate(&t.counterparty, 28);
            writeln!(
                out,
                "{}  {:>14}  {:<28}  {}",
                t.date.format("%d.%m.%Y."),
                format_eur(t.amount),
                party,
                truncate(&t.description, 40)
            )?;
        }
        Ok(())
    }
}
