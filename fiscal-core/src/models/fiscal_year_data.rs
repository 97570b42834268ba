//! Versioned fiscal reference data for one calendar year.
//!
//! Every table carries its own `year` and `last_verified` date because the
//! tables are maintained independently (rates change in January, deadlines
//! are published separately, surtax rates follow municipal decisions).
//! [`FiscalYearData::validate`] checks that they still describe the same year.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{TaxBracket, TzGroup};

/// Maximum distance between the `last_verified` dates of sibling tables.
pub const MAX_VERIFICATION_SPREAD_DAYS: i64 = 365;

/// Errors raised when fiscal reference data is inconsistent or missing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FiscalDataError {
    #[error("table '{table}' is for year {found}, expected {expected}")]
    YearMismatch {
        table: &'static str,
        expected: i32,
        found: i32,
    },

    #[error("table '{table}' was last verified on {last_verified}, more than a year from {reference}")]
    StaleTable {
        table: &'static str,
        last_verified: NaiveDate,
        reference: NaiveDate,
    },

    #[error("no tax brackets defined for {0}")]
    NoBrackets(i32),

    #[error("tax bracket {index} starts at {found}, expected {expected}")]
    BracketGap {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("tax bracket {index} has min {min} above max {max}")]
    InvertedBracket {
        index: usize,
        min: Decimal,
        max: Decimal,
    },

    #[error("first tax bracket must start at or above zero, got {0}")]
    NegativeBracketStart(Decimal),

    #[error("no fiscal data for year {0}")]
    YearNotFound(i32),

    #[error("no fiscal data loaded")]
    Empty,
}

/// Pension (MIO) and health (HZZO) contribution rates on a shared monthly base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRates {
    pub year: i32,
    pub last_verified: NaiveDate,
    /// Monthly contribution base in EUR.
    pub base: Decimal,
    /// MIO first pillar when a second pillar is also paid.
    pub mio_i_rate: Decimal,
    pub mio_ii_rate: Decimal,
    pub hzzo_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTable {
    pub year: i32,
    pub last_verified: NaiveDate,
    pub brackets: Vec<TaxBracket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub year: i32,
    pub last_verified: NaiveDate,
    /// Annual revenue that triggers mandatory VAT (PDV) registration.
    pub pdv_threshold: Decimal,
    /// Annual revenue above which the paušal regime is no longer available.
    pub pausal_limit: Decimal,
    /// Share of the PDV threshold (in percent) from which a warning is raised.
    pub vat_warning_percentage: Decimal,
    pub pausal_income_tax_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChamberFees {
    pub year: i32,
    pub last_verified: NaiveDate,
    pub hok_monthly: Decimal,
    pub hok_quarterly: Decimal,
}

/// Tourist-board contribution rates, expressed as fractions of revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TzRates {
    pub year: i32,
    pub last_verified: NaiveDate,
    pub group_1: Decimal,
    pub group_2: Decimal,
    pub group_3: Decimal,
    pub group_4: Decimal,
    pub group_5: Decimal,
}

impl TzRates {
    pub fn rate(
        &self,
        group: TzGroup,
    ) -> Decimal {
        match group {
            TzGroup::One => self.group_1,
            TzGroup::Two => self.group_2,
            TzGroup::Three => self.group_3,
            TzGroup::Four => self.group_4,
            TzGroup::Five => self.group_5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurtaxEntry {
    pub postal_code: String,
    pub municipality: String,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurtaxTable {
    pub year: i32,
    pub last_verified: NaiveDate,
    #[serde(default)]
    pub entries: Vec<SurtaxEntry>,
}

impl SurtaxTable {
    pub fn find(
        &self,
        postal_code: &str,
    ) -> Option<&SurtaxEntry> {
        let code = postal_code.trim();
        self.entries.iter().find(|e| e.postal_code == code)
    }

    pub fn rate_for_postal_code(
        &self,
        postal_code: &str,
    ) -> Option<Decimal> {
        self.find(postal_code).map(|e| e.rate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineKind {
    Contributions,
    PausalTax,
    Posd,
    ChamberFee,
    TzContribution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub date: NaiveDate,
    pub kind: DeadlineKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineTable {
    pub year: i32,
    pub last_verified: NaiveDate,
    #[serde(default)]
    pub deadlines: Vec<Deadline>,
}

impl DeadlineTable {
    /// Deadlines falling on or after `from`, earliest first.
    pub fn upcoming(
        &self,
        from: NaiveDate,
    ) -> Vec<&Deadline> {
        let mut upcoming: Vec<&Deadline> =
            self.deadlines.iter().filter(|d| d.date >= from).collect();
        upcoming.sort_by_key(|d| d.date);
        upcoming
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    PausalTax,
    MioI,
    MioII,
    Hzzo,
    Hok,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAccount {
    pub kind: PaymentKind,
    pub recipient: String,
    pub iban: String,
    /// Leading part of the "poziv na broj"; the payer's OIB follows it.
    pub reference_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAccounts {
    pub year: i32,
    pub last_verified: NaiveDate,
    pub model: String,
    #[serde(default)]
    pub accounts: Vec<PaymentAccount>,
}

impl PaymentAccounts {
    pub fn get(
        &self,
        kind: PaymentKind,
    ) -> Option<&PaymentAccount> {
        self.accounts.iter().find(|a| a.kind == kind)
    }

    /// Builds the payment reference (`HR68 1449-<OIB>` style) for `kind`.
    pub fn reference_number(
        &self,
        kind: PaymentKind,
        oib: &str,
    ) -> Option<String> {
        self.get(kind)
            .map(|a| format!("{} {}-{}", self.model, a.reference_prefix, oib.trim()))
    }
}

/// Parameters for j.d.o.o. director salary and profit tax modelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateRates {
    pub year: i32,
    pub last_verified: NaiveDate,
    pub director_min_monthly_salary: Decimal,
    /// Contributions on top of gross salary, as a fraction.
    pub director_contribution_rate: Decimal,
    /// Share of revenue assumed to be consumed by business costs.
    pub assumed_cost_ratio: Decimal,
    pub lower_profit_tax_rate: Decimal,
    pub upper_profit_tax_rate: Decimal,
    /// Taxable profit up to which the lower rate applies.
    pub lower_rate_limit: Decimal,
}

/// All reference tables for one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYearData {
    pub year: i32,
    pub last_verified: NaiveDate,
    pub contributions: ContributionRates,
    pub tax_brackets: BracketTable,
    pub thresholds: Thresholds,
    pub chamber_fees: ChamberFees,
    pub tz_rates: TzRates,
    pub surtax: SurtaxTable,
    pub deadlines: DeadlineTable,
    pub payment_accounts: PaymentAccounts,
    pub corporate: CorporateRates,
}

impl FiscalYearData {
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.tax_brackets.brackets
    }

    fn table_versions(&self) -> [(&'static str, i32, NaiveDate); 10] {
        [
            ("dataset", self.year, self.last_verified),
            ("contributions", self.contributions.year, self.contributions.last_verified),
            ("tax_brackets", self.tax_brackets.year, self.tax_brackets.last_verified),
            ("thresholds", self.thresholds.year, self.thresholds.last_verified),
            ("chamber_fees", self.chamber_fees.year, self.chamber_fees.last_verified),
            ("tz_rates", self.tz_rates.year, self.tz_rates.last_verified),
            ("surtax", self.surtax.year, self.surtax.last_verified),
            ("deadlines", self.deadlines.year, self.deadlines.last_verified),
            ("payment_accounts", self.payment_accounts.year, self.payment_accounts.last_verified),
            ("corporate", self.corporate.year, self.corporate.last_verified),
        ]
    }

    /// Checks the cross-table invariants.
    ///
    /// # Errors
    ///
    /// Returns [`FiscalDataError`] if:
    /// - any table reports a different year than the dataset
    /// - any two tables, or a table and the dataset itself, were verified
    ///   more than a year apart
    /// - the bracket table is empty, inverted, or not contiguous
    pub fn validate(&self) -> Result<(), FiscalDataError> {
        let versions = self.table_versions();

        for (table, year, _) in versions {
            if year != self.year {
                return Err(FiscalDataError::YearMismatch {
                    table,
                    expected: self.year,
                    found: year,
                });
            }
        }

        for (table, _, last_verified) in versions {
            for (_, _, sibling) in versions {
                if (last_verified - sibling).num_days().abs() > MAX_VERIFICATION_SPREAD_DAYS {
                    return Err(FiscalDataError::StaleTable {
                        table,
                        last_verified,
                        reference: sibling,
                    });
                }
            }
        }

        validate_brackets(self.year, self.brackets())
    }
}

/// Brackets must be non-empty, start at or above zero and follow each other
/// with exactly one cent between `max` and the next `min`.
pub fn validate_brackets(
    year: i32,
    brackets: &[TaxBracket],
) -> Result<(), FiscalDataError> {
    let first = brackets.first().ok_or(FiscalDataError::NoBrackets(year))?;
    if first.min_revenue < Decimal::ZERO {
        return Err(FiscalDataError::NegativeBracketStart(first.min_revenue));
    }

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.min_revenue > bracket.max_revenue {
            return Err(FiscalDataError::InvertedBracket {
                index,
                min: bracket.min_revenue,
                max: bracket.max_revenue,
            });
        }
    }

    for (index, pair) in brackets.windows(2).enumerate() {
        let expected = pair[0].max_revenue + Decimal::new(1, 2);
        if pair[1].min_revenue != expected {
            return Err(FiscalDataError::BracketGap {
                index: index + 1,
                expected,
                found: pair[1].min_revenue,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::reference::fiscal_year_2025;

    fn bracket(
        min: Decimal,
        max: Decimal,
    ) -> TaxBracket {
        TaxBracket {
            min_revenue: min,
            max_revenue: max,
            tax_base: dec!(0),
            annual_tax: dec!(0),
            quarterly_tax: dec!(0),
        }
    }

    #[test]
    fn builtin_2025_data_is_valid() {
        assert_eq!(fiscal_year_2025().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_table_from_other_year() {
        let mut data = fiscal_year_2025();
        data.chamber_fees.year = 2024;

        assert_eq!(
            data.validate(),
            Err(FiscalDataError::YearMismatch {
                table: "chamber_fees",
                expected: 2025,
                found: 2024,
            })
        );
    }

    #[test]
    fn validate_rejects_tables_verified_far_apart() {
        let mut data = fiscal_year_2025();
        data.surtax.last_verified = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();

        let result = data.validate();

        assert!(matches!(result, Err(FiscalDataError::StaleTable { .. })));
    }

    #[test]
    fn validate_rejects_stale_dataset_date() {
        let mut data = fiscal_year_2025();
        data.last_verified = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();

        let result = data.validate();

        assert!(matches!(
            result,
            Err(FiscalDataError::StaleTable { table: "dataset", .. })
        ));
    }

    #[test]
    fn validate_brackets_rejects_gap() {
        let brackets = vec![
            bracket(dec!(0), dec!(100)),
            bracket(dec!(100.02), dec!(200)),
        ];

        assert_eq!(
            validate_brackets(2025, &brackets),
            Err(FiscalDataError::BracketGap {
                index: 1,
                expected: dec!(100.01),
                found: dec!(100.02),
            })
        );
    }

    #[test]
    fn validate_brackets_rejects_overlap() {
        let brackets = vec![bracket(dec!(0), dec!(100)), bracket(dec!(50), dec!(200))];

        assert!(matches!(
            validate_brackets(2025, &brackets),
            Err(FiscalDataError::BracketGap { index: 1, .. })
        ));
    }

    #[test]
    fn validate_brackets_rejects_empty_table() {
        assert_eq!(
            validate_brackets(2025, &[]),
            Err(FiscalDataError::NoBrackets(2025))
        );
    }

    #[test]
    fn validate_brackets_rejects_inverted_bracket() {
        let brackets = vec![bracket(dec!(0), dec!(-1))];

        assert!(matches!(
            validate_brackets(2025, &brackets),
            Err(FiscalDataError::InvertedBracket { index: 0, .. })
        ));
    }

    #[test]
    fn surtax_lookup_trims_postal_code() {
        let data = fiscal_year_2025();

        assert_eq!(data.surtax.rate_for_postal_code(" 10000 "), Some(dec!(0.18)));
        assert_eq!(data.surtax.rate_for_postal_code("99999"), None);
    }

    #[test]
    fn upcoming_deadlines_are_sorted_and_filtered() {
        let data = fiscal_year_2025();
        let from = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();

        let upcoming = data.deadlines.upcoming(from);

        assert!(!upcoming.is_empty());
        assert!(upcoming.iter().all(|d| d.date >= from));
        assert!(upcoming.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn reference_number_joins_model_prefix_and_oib() {
        let data = fiscal_year_2025();

        let reference = data
            .payment_accounts
            .reference_number(PaymentKind::PausalTax, "12345678903");

        assert_eq!(reference.as_deref(), Some("HR68 1449-12345678903"));
    }
}
