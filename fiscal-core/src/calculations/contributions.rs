//! Monthly pension/health contributions and the tourist-board contribution.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;
use crate::{FiscalYearData, TzGroup};

/// Monthly MIO/HZZO contributions on the shared base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionBreakdown {
    pub base: Decimal,
    /// First pension pillar. Carries the full 20% when there is no second pillar.
    pub mio_i: Decimal,
    pub mio_ii: Decimal,
    pub hzzo: Decimal,
    pub total: Decimal,
}

/// Standard monthly contributions (with a second pension pillar).
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use fiscal_core::calculations::calculate_contributions;
/// use fiscal_core::reference::fiscal_year_2025;
///
/// let c = calculate_contributions(&fiscal_year_2025());
///
/// assert_eq!(c.mio_i, dec!(107.88));
/// assert_eq!(c.mio_ii, dec!(35.96));
/// assert_eq!(c.hzzo, dec!(118.67));
/// assert_eq!(c.total, dec!(262.51));
/// ```
pub fn calculate_contributions(data: &FiscalYearData) -> ContributionBreakdown {
    calculate_contributions_for(data, true)
}

/// Monthly contributions for a payer with or without a second pension pillar.
///
/// Without a second pillar the whole pension rate goes to the first pillar.
pub fn calculate_contributions_for(
    data: &FiscalYearData,
    has_second_pension_pillar: bool,
) -> ContributionBreakdown {
    let rates = &data.contributions;
    let base = rates.base;

    let (mio_i, mio_ii) = if has_second_pension_pillar {
        (
            round_half_up(base * rates.mio_i_rate),
            round_half_up(base * rates.mio_ii_rate),
        )
    } else {
        (
            round_half_up(base * (rates.mio_i_rate + rates.mio_ii_rate)),
            Decimal::ZERO,
        )
    };
    let hzzo = round_half_up(base * rates.hzzo_rate);

    ContributionBreakdown {
        base,
        mio_i,
        mio_ii,
        hzzo,
        total: round_half_up(mio_i + mio_ii + hzzo),
    }
}

/// Annual tourist-board contribution: revenue × the group's rate.
pub fn calculate_tz_contribution(
    data: &FiscalYearData,
    annual_revenue: Decimal,
    group: TzGroup,
) -> Decimal {
    round_half_up(annual_revenue * data.tz_rates.rate(group))
}
