use std::collections::HashSet;
use std::io::{self, Write};

use anyhow::{Context as _, Result, bail};
use chrono::Datelike;
use fiscal_core::calculations::calculate_posd;
use fiscal_core::calculations::common::format_eur;
use fiscal_core::{BankTransaction, PosdInput, PosdResult};
use fiscal_data::{filter_income_transactions, parse_bank_file};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::{Context, Render};
use crate::app;
use crate::cli::PosdArgs;
use crate::kpr_loader;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosdReport {
    #[serde(flatten)]
    pub result: PosdResult,
    pub municipality_rate: Decimal,
    pub expense_percentage: u8,
    /// Transactions that appeared in more than one source and were counted once.
    pub duplicates_skipped: usize,
}

/// Drops repeated transactions, keeping the first occurrence.
///
/// Overlapping statement exports repeat the same booking; two receipts are
/// the same when id, date and amount all match.
fn deduplicate(transactions: Vec<BankTransaction>) -> (Vec<BankTransaction>, usize) {
    let mut seen = HashSet::new();
    let before = transactions.len();

    let unique: Vec<_> = transactions
        .into_iter()
        .filter(|t| seen.insert((t.id.clone(), t.date, t.amount)))
        .collect();

    let skipped = before - unique.len();
    (unique, skipped)
}

fn collect_income(args: &PosdArgs) -> Result<Vec<BankTransaction>> {
    if args.statements.is_empty() && args.kpr.is_none() {
        bail!("no income source given; pass --statement and/or --kpr");
    }

    let mut income = Vec::new();
    for path in &args.statements {
        let statement = parse_bank_file(path)
            .with_context(|| format!("failed to read statement {}", path.display()))?;
        let credits = filter_income_transactions(&statement.transactions);
        info!(
            file = %path.display(),
            bank = %statement.bank_name,
            income = credits.len(),
            "statement loaded"
        );
        income.extend(credits);
    }

    if let Some(path) = &args.kpr {
        let rows = kpr_loader::load_from_file(path)
            .with_context(|| format!("failed to read income ledger {}", path.display()))?;
        info!(file = %path.display(), rows = rows.len(), "income ledger loaded");
        income.extend(rows);
    }

    Ok(income)
}

pub fn run(
    args: &PosdArgs,
    ctx: &Context,
) -> Result<PosdReport> {
    let year = args.year.unwrap_or(ctx.today.year() - 1);
    let data = app::select_year(&ctx.registry, Some(year))?;

    let municipality_rate = match (&args.postal_code, args.surtax_rate) {
        (Some(code), _) => match data.surtax.find(code) {
            Some(entry) => {
                info!(municipality = %entry.municipality, rate = %entry.rate, "surtax from postal code");
                entry.rate
            }
            None => bail!("no surtax rate known for postal code {code}; pass --surtax-rate"),
        },
        (None, Some(rate)) => {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                bail!("surtax rate {rate} must be a fraction between 0 and 1");
            }
            rate
        }
        (None, None) => {
            warn!("no --postal-code or --surtax-rate given; surtax is not included");
            Decimal::ZERO
        }
    };

    let (income_transactions, duplicates_skipped) = deduplicate(collect_income(args)?);
    if duplicates_skipped > 0 {
        warn!(count = duplicates_skipped, "duplicate transactions counted once");
    }

    let input = PosdInput {
        year,
        income_transactions,
        business_type: args.business_type,
        has_second_pension_pillar: !args.no_second_pillar,
        municipality_rate,
        expense_bracket: args.expense_bracket,
    };
    let result = calculate_posd(data, &input);

    Ok(PosdReport {
        result,
        municipality_rate,
        expense_percentage: args.expense_bracket.percentage(),
        duplicates_skipped,
    })
}

impl Render for PosdReport {
    fn render(
        &self,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        let r = &self.result;
        let line = |out: &mut dyn Write, label: &str, value: Decimal| -> io::Result<()> {
            writeln!(out, "  {label:<34} {:>14}", format_eur(value))
        };

        writeln!(out, "PO-SD {} ({})", r.year, r.business_type.as_str())?;
        writeln!(out)?;
        writeln!(out, "Income by quarter")?;
        for q in &r.quarterly_breakdown {
            writeln!(
                out,
                "  {:<34} {:>14}  ({} transaction(s))",
                q.label,
                format_eur(q.income),
                q.transaction_count
            )?;
        }
        writeln!(out)?;
        line(out, "Total income", r.total_income)?;
        line(
            out,
            &format!("Normative expenses ({}%)", self.expense_percentage),
            r.normative_expenses,
        )?;
        line(out, "Tax base", r.tax_base)?;
        line(out, "Income tax", r.income_tax)?;
        line(
            out,
            &format!("Surtax ({}%)", (self.municipality_rate * Decimal::ONE_HUNDRED).normalize()),
            r.surtax,
        )?;
        line(out, "Total tax", r.total_tax)?;
        line(out, "Contributions (monthly)", r.monthly_contributions)?;
        line(out, "Contributions (yearly)", r.yearly_contributions)?;
        line(out, "Total obligations", r.total_obligations)?;
        line(out, "Net after tax", r.net_after_tax)?;
        writeln!(out)?;

        match &r.tax_bracket {
            Some(b) => writeln!(
                out,
                "Paušal bracket: {} – {}, quarterly tax {}",
                format_eur(b.min_revenue),
                format_eur(b.max_revenue),
                format_eur(b.quarterly_tax)
            )?,
            None => writeln!(out, "Paušal bracket: none (income outside the regime)")?,
        }
        writeln!(out, "VAT threshold used: {}%", r.vat_threshold_percentage)?;

        if self.duplicates_skipped > 0 {
            writeln!(out, "Duplicates skipped: {}", self.duplicates_skipped)?;
        }
        for warning in &r.warnings {
            writeln!(out, "Warning: {warning}")?;
        }
        Ok(())
    }
}
