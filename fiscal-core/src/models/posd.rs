use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BankTransaction, BusinessType, ExpenseBracket, TaxBracket};

/// Input values for a PO-SD calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosdInput {
    pub year: i32,
    /// Income the user confirmed in the review step.
    pub income_transactions: Vec<BankTransaction>,
    pub business_type: BusinessType,
    pub has_second_pension_pillar: bool,
    /// Municipal surtax as a fraction of income tax (0.18 for 18%).
    pub municipality_rate: Decimal,
    pub expense_bracket: ExpenseBracket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterlyIncome {
    pub quarter: u32,
    pub label: String,
    pub income: Decimal,
    pub transaction_count: usize,
}

/// Conditions the caller should show next to a PO-SD result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PosdWarning {
    NoIncome,
    NearVatThreshold { percentage: Decimal },
    OverVatThreshold { percentage: Decimal },
    AbovePausalLimit { total_income: Decimal, limit: Decimal },
    NegativeTaxBase { clamped_from: Decimal },
    TransactionsOutsideYear { year: i32, count: usize },
    DataYearMismatch { requested: i32, data: i32 },
    ImplausibleAmounts { count: usize, limit: Decimal },
}

impl fmt::Display for PosdWarning {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::NoIncome => write!(f, "no income transactions were selected"),
            Self::NearVatThreshold { percentage } => write!(
                f,
                "income is at {percentage}% of the VAT (PDV) registration threshold"
            ),
            Self::OverVatThreshold { percentage } => write!(
                f,
                "income is at {percentage}% of the VAT (PDV) registration threshold; \
                 VAT registration is mandatory"
            ),
            Self::AbovePausalLimit {
                total_income,
                limit,
            } => write!(
                f,
                "income {total_income} exceeds the paušal regime limit of {limit}"
            ),
            Self::NegativeTaxBase { clamped_from } => {
                write!(f, "tax base {clamped_from} was negative and has been set to zero")
            }
            Self::TransactionsOutsideYear { year, count } => {
                write!(f, "{count} transaction(s) are dated outside {year}")
            }
            Self::DataYearMismatch { requested, data } => write!(
                f,
                "no fiscal data for {requested}; rates from {data} were used"
            ),
            Self::ImplausibleAmounts { count, limit } => write!(
                f,
                "{count} transaction(s) above {limit} were left out"
            ),
        }
    }
}

/// Result of a PO-SD calculation. All amounts are rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosdResult {
    pub year: i32,
    pub business_type: BusinessType,
    pub total_income: Decimal,
    pub normative_expenses: Decimal,
    pub tax_base: Decimal,
    pub income_tax: Decimal,
    pub surtax: Decimal,
    pub total_tax: Decimal,
    pub monthly_contributions: Decimal,
    pub yearly_contributions: Decimal,
    pub total_obligations: Decimal,
    pub net_after_tax: Decimal,
    pub quarterly_breakdown: Vec<QuarterlyIncome>,
    /// Paušal bracket for `total_income`, `None` when outside the regime.
    pub tax_bracket: Option<TaxBracket>,
    pub vat_threshold_percentage: Decimal,
    pub is_near_vat_threshold: bool,
    pub warnings: Vec<PosdWarning>,
}
