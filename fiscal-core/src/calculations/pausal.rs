//! Monthly and annual running costs of a paušalni obrt.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fiscal_core::calculations::{calculate_pausal_annual_costs, calculate_pausal_monthly_costs};
//! use fiscal_core::reference::fiscal_year_2025;
//!
//! let data = fiscal_year_2025();
//!
//! let monthly = calculate_pausal_monthly_costs(&data, dec!(25000)).unwrap();
//! assert_eq!(monthly.tax, dec!(45.90));
//!
//! let annual = calculate_pausal_annual_costs(&data, dec!(25000), None).unwrap();
//! assert_eq!(annual.total, dec!(3837.72));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::bracket::{BracketError, get_pausal_tax_bracket};
use crate::calculations::common::round_half_up;
use crate::calculations::contributions::{calculate_contributions, calculate_tz_contribution};
use crate::{FiscalYearData, TzGroup};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PausalMonthlyCosts {
    pub contributions: Decimal,
    pub hok: Decimal,
    /// One third of the bracket's quarterly tax.
    pub tax: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PausalAnnualCosts {
    pub contributions: Decimal,
    pub hok: Decimal,
    pub tax: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tz: Option<Decimal>,
    pub total: Decimal,
}

/// Average monthly cost at the given annual revenue.
///
/// # Errors
///
/// Returns [`BracketError`] when the revenue falls outside the paušal brackets.
pub fn calculate_pausal_monthly_costs(
    data: &FiscalYearData,
    annual_revenue: Decimal,
) -> Result<PausalMonthlyCosts, BracketError> {
    let bracket = get_pausal_tax_bracket(data.brackets(), annual_revenue)?;

    let contributions = calculate_contributions(data).total;
    let hok = data.chamber_fees.hok_monthly;
    let tax = round_half_up(bracket.quarterly_tax / Decimal::from(3));

    Ok(PausalMonthlyCosts {
        contributions,
        hok,
        tax,
        total: round_half_up(contributions + hok + tax),
    })
}

/// Annual cost at the given revenue, optionally including the
/// tourist-board contribution for `tz_group`.
///
/// # Errors
///
/// Returns [`BracketError`] when the revenue falls outside the paušal brackets.
pub fn calculate_pausal_annual_costs(
    data: &FiscalYearData,
    annual_revenue: Decimal,
    tz_group: Option<TzGroup>,
) -> Result<PausalAnnualCosts, BracketError> {
    let bracket = get_pausal_tax_bracket(data.brackets(), annual_revenue)?;

    let contributions = round_half_up(calculate_contributions(data).total * Decimal::from(12));
    let hok = round_half_up(data.chamber_fees.hok_quarterly * Decimal::from(4));
    let tax = bracket.annual_tax;
    let tz = tz_group.map(|group| calculate_tz_contribution(data, annual_revenue, group));

    let total = round_half_up(contributions + hok + tax + tz.unwrap_or(Decimal::ZERO));

    Ok(PausalAnnualCosts {
        contributions,
        hok,
        tax,
        tz,
        total,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::reference::fiscal_year_2025;

    #[test]
    fn monthly_costs_at_25000() {
        let costs = calculate_pausal_monthly_costs(&fiscal_year_2025(), dec!(25000)).unwrap();

        assert_eq!(
            costs,
            PausalMonthlyCosts {
                contributions: dec!(262.51),
                hok: dec!(11.40),
                tax: dec!(45.90),
                total: dec!(319.81),
            }
        );
    }

    #[test]
    fn monthly_tax_of_first_bracket_is_rounded() {
        // 50.85 / 3 = 16.95
        let costs = calculate_pausal_monthly_costs(&fiscal_year_2025(), dec!(5000)).unwrap();

        assert_eq!(costs.tax, dec!(16.95));
    }

    #[test]
    fn annual_costs_at_25000() {
        let costs = calculate_pausal_annual_costs(&fiscal_year_2025(), dec!(25000), None).unwrap();

        assert_eq!(
            costs,
            PausalAnnualCosts {
                contributions: dec!(3150.12),
                hok: dec!(136.80),
                tax: dec!(550.80),
                tz: None,
                total: dec!(3837.72),
            }
        );
    }

    #[test]
    fn annual_costs_include_tz_when_group_given() {
        let costs =
            calculate_pausal_annual_costs(&fiscal_year_2025(), dec!(25000), Some(TzGroup::One))
                .unwrap();

        assert_eq!(costs.tz, Some(dec!(35.53)));
        assert_eq!(costs.total, dec!(3873.25));
    }

    #[test]
    fn costs_outside_regime_are_errors() {
        let data = fiscal_year_2025();

        assert!(matches!(
            calculate_pausal_monthly_costs(&data, dec!(75000)),
            Err(BracketError::AboveRegimeLimit { .. })
        ));
        assert!(matches!(
            calculate_pausal_annual_costs(&data, dec!(-10), None),
            Err(BracketError::NegativeRevenue(_))
        ));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let data = fiscal_year_2025();

        let first = calculate_pausal_annual_costs(&data, dec!(41234.56), Some(TzGroup::Two));
        let second = calculate_pausal_annual_costs(&data, dec!(41234.56), Some(TzGroup::Two));

        assert_eq!(first, second);
    }
}
