//! PO-SD annual income declaration for paušalni obrt.
//!
//! # Calculation Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Total income: sum of selected income transactions |
//! | 2    | Quarterly breakdown Q1..Q4 by transaction date |
//! | 3    | Normative expenses: total income × expense percentage |
//! | 4    | Tax base: total income − normative expenses (minimum 0) |
//! | 5    | Income tax: tax base × paušal income tax rate |
//! | 6    | Surtax: income tax × municipality rate |
//! | 7    | Total tax: income tax + surtax |
//! | 8    | Contributions: monthly × 12 |
//! | 9    | Total obligations and net income after tax |
//! | 10   | VAT threshold proximity |
//!
//! Every amount is rounded to cents when it is produced.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use fiscal_core::calculations::calculate_posd;
//! use fiscal_core::reference::fiscal_year_2025;
//! use fiscal_core::{BankTransaction, BusinessType, ExpenseBracket, PosdInput};
//!
//! let input = PosdInput {
//!     year: 2025,
//!     income_transactions: vec![BankTransaction {
//!         id: "1".to_string(),
//!         date: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
//!         amount: dec!(10000.00),
//!         counterparty: "Klijent d.o.o.".to_string(),
//!         description: "Račun 1-1-1".to_string(),
//!         is_income: true,
//!     }],
//!     business_type: BusinessType::Obrt,
//!     has_second_pension_pillar: true,
//!     municipality_rate: dec!(0.18),
//!     expense_bracket: ExpenseBracket::Percent30,
//! };
//!
//! let result = calculate_posd(&fiscal_year_2025(), &input);
//!
//! assert_eq!(result.tax_base, dec!(7000.00));
//! assert_eq!(result.income_tax, dec!(840.00));
//! assert_eq!(result.surtax, dec!(151.20));
//! ```

use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::bracket::get_pausal_tax_bracket;
use crate::calculations::common::{max, round_half_up};
use crate::calculations::contributions::calculate_contributions_for;
use crate::{
    BankTransaction, FiscalYearData, MAX_TRANSACTION_AMOUNT, PosdInput, PosdResult, PosdWarning,
    QuarterlyIncome,
};

/// Runs the PO-SD calculation against `data`.
///
/// Never fails: conditions worth the user's attention (VAT threshold, regime
/// limit, clamped tax base, transactions from another year) are reported in
/// [`PosdResult::warnings`]. Transactions above [`MAX_TRANSACTION_AMOUNT`]
/// are left out of every sum and reported as well. An empty transaction list yields an all-zero
/// result with a [`PosdWarning::NoIncome`] warning.
pub fn calculate_posd(
    data: &FiscalYearData,
    input: &PosdInput,
) -> PosdResult {
    let mut warnings = Vec::new();

    if data.year != input.year {
        warn!(requested = input.year, data = data.year, "PO-SD data year mismatch");
        warnings.push(PosdWarning::DataYearMismatch {
            requested: input.year,
            data: data.year,
        });
    }

    let (transactions, implausible): (Vec<&BankTransaction>, Vec<&BankTransaction>) = input
        .income_transactions
        .iter()
        .partition(|t| t.has_plausible_amount());
    if !implausible.is_empty() {
        warn!(count = implausible.len(), "transactions with implausible amounts left out");
        warnings.push(PosdWarning::ImplausibleAmounts {
            count: implausible.len(),
            limit: MAX_TRANSACTION_AMOUNT,
        });
    }
    if transactions.is_empty() {
        warnings.push(PosdWarning::NoIncome);
    }

    let outside_year = transactions
        .iter()
        .filter(|t| t.date.year() != input.year)
        .count();
    if outside_year > 0 {
        warnings.push(PosdWarning::TransactionsOutsideYear {
            year: input.year,
            count: outside_year,
        });
    }

    let total_income = round_half_up(transactions.iter().map(|t| t.amount).sum());
    let quarterly_breakdown = quarterly_breakdown(&transactions);

    let expense_rate =
        Decimal::from(input.expense_bracket.percentage()) / Decimal::ONE_HUNDRED;
    let normative_expenses = round_half_up(total_income * expense_rate);

    let raw_tax_base = round_half_up(total_income - normative_expenses);
    if raw_tax_base < Decimal::ZERO {
        warnings.push(PosdWarning::NegativeTaxBase {
            clamped_from: raw_tax_base,
        });
    }
    let tax_base = max(raw_tax_base, Decimal::ZERO);

    let income_tax = round_half_up(tax_base * data.thresholds.pausal_income_tax_rate);
    let surtax = round_half_up(income_tax * input.municipality_rate);
    let total_tax = round_half_up(income_tax + surtax);

    let monthly_contributions =
        calculate_contributions_for(data, input.has_second_pension_pillar).total;
    let yearly_contributions = round_half_up(monthly_contributions * Decimal::from(12));

    let total_obligations = round_half_up(total_tax + yearly_contributions);
    let net_after_tax = round_half_up(total_income - total_obligations);

    let tax_bracket = get_pausal_tax_bracket(data.brackets(), total_income)
        .ok()
        .cloned();
    if total_income > data.thresholds.pausal_limit {
        warnings.push(PosdWarning::AbovePausalLimit {
            total_income,
            limit: data.thresholds.pausal_limit,
        });
    }

    let vat_threshold_percentage = vat_threshold_percentage(data, total_income);
    let is_near_vat_threshold =
        vat_threshold_percentage >= data.thresholds.vat_warning_percentage;
    if vat_threshold_percentage >= Decimal::ONE_HUNDRED {
        warnings.push(PosdWarning::OverVatThreshold {
            percentage: vat_threshold_percentage,
        });
    } else if is_near_vat_threshold {
        warnings.push(PosdWarning::NearVatThreshold {
            percentage: vat_threshold_percentage,
        });
    }

    debug!(
        year = input.year,
        transactions = transactions.len(),
        %total_income,
        %total_obligations,
        warnings = warnings.len(),
        "PO-SD calculated"
    );

    PosdResult {
        year: input.year,
        business_type: input.business_type,
        total_income,
        normative_expenses,
        tax_base,
        income_tax,
        surtax,
        total_tax,
        monthly_contributions,
        yearly_contributions,
        total_obligations,
        net_after_tax,
        quarterly_breakdown,
        tax_bracket,
        vat_threshold_percentage,
        is_near_vat_threshold,
        warnings,
    }
}

/// Always four rows, Q1 to Q4, including empty quarters.
fn quarterly_breakdown(transactions: &[&BankTransaction]) -> Vec<QuarterlyIncome> {
    let mut sums = [Decimal::ZERO; 4];
    let mut counts = [0usize; 4];

    for t in transactions {
        let index = (t.date.month0() / 3) as usize;
        sums[index] += t.amount;
        counts[index] += 1;
    }

    (0..4)
        .map(|i| QuarterlyIncome {
            quarter: i as u32 + 1,
            label: format!("Q{}", i + 1),
            income: round_half_up(sums[i]),
            transaction_count: counts[i],
        })
        .collect()
}

fn vat_threshold_percentage(
    data: &FiscalYearData,
    total_income: Decimal,
) -> Decimal {
    let threshold = data.thresholds.pdv_threshold;
    if threshold <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_half_up(total_income / threshold * Decimal::ONE_HUNDRED)
}
