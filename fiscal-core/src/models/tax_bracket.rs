use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One paušal revenue band.
///
/// `max_revenue` is inclusive; the next band starts one cent above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_revenue: Decimal,
    pub max_revenue: Decimal,
    pub tax_base: Decimal,
    pub annual_tax: Decimal,
    pub quarterly_tax: Decimal,
}

impl TaxBracket {
    pub fn contains(
        &self,
        revenue: Decimal,
    ) -> bool {
        revenue >= self.min_revenue && revenue <= self.max_revenue
    }
}
