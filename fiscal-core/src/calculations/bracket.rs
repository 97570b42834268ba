//! Paušal tax bracket lookup.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::TaxBracket;

/// Errors returned when revenue cannot be placed in a paušal bracket.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketError {
    #[error("no tax brackets provided")]
    NoBrackets,

    #[error("annual revenue cannot be negative, got {0}")]
    NegativeRevenue(Decimal),

    /// Revenue above the top bracket is outside the paušal regime altogether.
    #[error("annual revenue {revenue} exceeds the paušal limit of {limit}")]
    AboveRegimeLimit { revenue: Decimal, limit: Decimal },
}

/// Returns the bracket whose `[min, max]` range contains `annual_revenue`.
///
/// Brackets must be sorted ascending and contiguous. Bounds are inclusive on
/// `max`, so revenue exactly on a boundary belongs to the lower bracket.
///
/// # Errors
///
/// Returns [`BracketError`] if the table is empty, the revenue is negative,
/// or the revenue lies above the top bracket.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use fiscal_core::calculations::get_pausal_tax_bracket;
/// use fiscal_core::reference::pausal_brackets_2025;
///
/// let brackets = pausal_brackets_2025();
///
/// let bracket = get_pausal_tax_bracket(&brackets, dec!(25000)).unwrap();
/// assert_eq!(bracket.quarterly_tax, dec!(137.70));
/// ```
pub fn get_pausal_tax_bracket(
    brackets: &[TaxBracket],
    annual_revenue: Decimal,
) -> Result<&TaxBracket, BracketError> {
    let top = brackets.last().ok_or(BracketError::NoBrackets)?;

    if annual_revenue < Decimal::ZERO {
        return Err(BracketError::NegativeRevenue(annual_revenue));
    }

    brackets
        .iter()
        .find(|b| annual_revenue <= b.max_revenue)
        .ok_or(BracketError::AboveRegimeLimit {
            revenue: annual_revenue,
            limit: top.max_revenue,
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::reference::pausal_brackets_2025;

    fn index_of(revenue: Decimal) -> usize {
        let brackets = pausal_brackets_2025();
        let bracket = get_pausal_tax_bracket(&brackets, revenue).unwrap();
        brackets.iter().position(|b| b == bracket).unwrap()
    }

    #[test]
    fn boundary_belongs_to_lower_bracket() {
        assert_eq!(index_of(dec!(11300)), 0);
    }

    #[test]
    fn one_cent_above_boundary_moves_up() {
        assert_eq!(index_of(dec!(11300.01)), 1);
    }

    #[test]
    fn zero_revenue_is_first_bracket() {
        assert_eq!(index_of(dec!(0)), 0);
    }

    #[test]
    fn top_of_regime_is_last_bracket() {
        assert_eq!(index_of(dec!(60000)), 6);
    }

    #[test]
    fn every_bracket_contains_its_own_bounds() {
        let brackets = pausal_brackets_2025();

        for (i, b) in brackets.iter().enumerate() {
            assert_eq!(index_of(b.min_revenue), i);
            assert_eq!(index_of(b.max_revenue), i);
            assert!(b.contains(b.min_revenue) && b.contains(b.max_revenue));
        }
    }

    #[test]
    fn sub_cent_revenue_between_brackets_goes_up() {
        assert_eq!(index_of(dec!(11300.005)), 1);
    }

    #[test]
    fn negative_revenue_is_rejected() {
        let brackets = pausal_brackets_2025();

        assert_eq!(
            get_pausal_tax_bracket(&brackets, dec!(-1)),
            Err(BracketError::NegativeRevenue(dec!(-1)))
        );
    }

    #[test]
    fn revenue_above_top_bracket_is_rejected() {
        let brackets = pausal_brackets_2025();

        assert_eq!(
            get_pausal_tax_bracket(&brackets, dec!(60000.01)),
            Err(BracketError::AboveRegimeLimit {
                revenue: dec!(60000.01),
                limit: dec!(60000),
            })
        );
    }

    #[test]
    fn empty_table_is_rejected() {
        assert_eq!(
            get_pausal_tax_bracket(&[], dec!(100)),
            Err(BracketError::NoBrackets)
        );
    }
}
