//! Director salary and profit tax model for a j.d.o.o.
//!
//! A director without other employment must draw at least the minimum
//! salary, which carries contributions on top. Whatever remains after the
//! assumed business costs and the gross salary cost is taxed at the lower
//! profit tax rate up to the limit and at the upper rate beyond it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::FiscalYearData;
use crate::calculations::common::{max, round_half_up, round_whole};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JdooCosts {
    pub monthly_director_salary: Decimal,
    pub yearly_contributions: Decimal,
    pub taxable_profit: Decimal,
    pub yearly_tax: Decimal,
    /// Profit tax as a percentage of revenue.
    pub effective_tax_rate: Decimal,
}

/// Yearly director and profit tax costs at the given revenue.
///
/// Yearly contributions and tax are rounded to whole euros. The effective
/// rate is zero when revenue is zero.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use fiscal_core::calculations::calculate_jdoo_costs;
/// use fiscal_core::reference::fiscal_year_2025;
///
/// let costs = calculate_jdoo_costs(&fiscal_year_2025(), dec!(50000), false);
///
/// assert_eq!(costs.monthly_director_salary, dec!(700));
/// assert_eq!(costs.yearly_contributions, dec!(3066));
/// assert_eq!(costs.yearly_tax, dec!(2853));
/// ```
pub fn calculate_jdoo_costs(
    data: &FiscalYearData,
    annual_revenue: Decimal,
    has_other_employment: bool,
) -> JdooCosts {
    let rates = &data.corporate;
    let months = Decimal::from(12);

    let monthly_director_salary = if has_other_employment {
        Decimal::ZERO
    } else {
        rates.director_min_monthly_salary
    };
    let yearly_salary = round_half_up(monthly_director_salary * months);
    let yearly_contributions = round_half_up(yearly_salary * rates.director_contribution_rate);
    let salary_cost = round_half_up(yearly_salary + yearly_contributions);

    let business_costs = round_half_up(annual_revenue * rates.assumed_cost_ratio);
    let taxable_profit = max(
        round_half_up(annual_revenue - business_costs - salary_cost),
        Decimal::ZERO,
    );

    let lower_tier = taxable_profit.min(rates.lower_rate_limit);
    let upper_tier = max(taxable_profit - rates.lower_rate_limit, Decimal::ZERO);
    let lower_tax = round_half_up(lower_tier * rates.lower_profit_tax_rate);
    let upper_tax = round_half_up(upper_tier * rates.upper_profit_tax_rate);
    let yearly_tax = round_whole(lower_tax + upper_tax);

    let effective_tax_rate = if annual_revenue.is_zero() {
        Decimal::ZERO
    } else {
        (yearly_tax / annual_revenue * Decimal::ONE_HUNDRED).round_dp(4)
    };

    JdooCosts {
        monthly_director_salary,
        yearly_contributions: round_whole(yearly_contributions),
        taxable_profit,
        yearly_tax,
        effective_tax_rate,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::reference::fiscal_year_2025;

    #[test]
    fn director_without_other_employment() {
        let costs = calculate_jdoo_costs(&fiscal_year_2025(), dec!(50000), false);

        assert_eq!(costs.monthly_director_salary, dec!(700));
        assert_eq!(costs.yearly_contributions, dec!(3066));
        assert_eq!(costs.taxable_profit, dec!(28534));
        assert_eq!(costs.yearly_tax, dec!(2853));
        assert_eq!(costs.effective_tax_rate, dec!(5.706));
    }

    #[test]
    fn director_with_other_employment_draws_no_salary() {
        let costs = calculate_jdoo_costs(&fiscal_year_2025(), dec!(50000), true);

        assert_eq!(costs.monthly_director_salary, dec!(0));
        assert_eq!(costs.yearly_contributions, dec!(0));
        assert_eq!(costs.yearly_tax, dec!(4000));
        assert_eq!(costs.effective_tax_rate, dec!(8));
    }

    #[test]
    fn profit_above_limit_uses_both_rates() {
        let costs = calculate_jdoo_costs(&fiscal_year_2025(), dec!(1500000), false);

        assert_eq!(costs.taxable_profit, dec!(1188534));
        assert_eq!(costs.yearly_tax, dec!(133936));
    }

    #[test]
    fn zero_revenue_has_zero_effective_rate() {
        let costs = calculate_jdoo_costs(&fiscal_year_2025(), dec!(0), false);

        assert_eq!(costs.taxable_profit, dec!(0));
        assert_eq!(costs.yearly_tax, dec!(0));
        assert_eq!(costs.effective_tax_rate, dec!(0));
    }

    #[test]
    fn salary_cost_larger_than_profit_clamps_to_zero() {
        let costs = calculate_jdoo_costs(&fiscal_year_2025(), dec!(10000), false);

        assert_eq!(costs.taxable_profit, dec!(0));
        assert_eq!(costs.yearly_tax, dec!(0));
        assert_eq!(costs.yearly_contributions, dec!(3066));
    }
}
