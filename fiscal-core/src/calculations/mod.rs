//! Croatian fiscal calculators.
//!
//! Every calculator is a pure function over a [`crate::FiscalYearData`]
//! snapshot; none of them reads global state or the clock.

pub mod bracket;
pub mod common;
pub mod contributions;
pub mod jdoo;
pub mod oib;
pub mod pausal;
pub mod posd;

pub use bracket::{BracketError, get_pausal_tax_bracket};
pub use contributions::{
    ContributionBreakdown, calculate_contributions, calculate_contributions_for,
    calculate_tz_contribution,
};
pub use jdoo::{JdooCosts, calculate_jdoo_costs};
pub use oib::{oib_check_digit, validate_oib};
pub use pausal::{
    PausalAnnualCosts, PausalMonthlyCosts, calculate_pausal_annual_costs,
    calculate_pausal_monthly_costs,
};
pub use posd::calculate_posd;
