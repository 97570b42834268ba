use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{FiscalDataError, FiscalYearData};
use crate::reference;

/// Fiscal datasets keyed by year.
///
/// Typical lifetime:
/// 1. Create with `FiscalRegistry::with_builtin()`.
/// 2. Call `insert` for every year loaded from configuration.
/// 3. Hand `get(year)` to the calculators.
///
/// Datasets are never mutated once inserted; re-inserting a year replaces it.
#[derive(Debug, Clone, Default)]
pub struct FiscalRegistry {
    years: BTreeMap<i32, FiscalYearData>,
}

impl FiscalRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every dataset compiled into the crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        let data = reference::fiscal_year_2025();
        registry.years.insert(data.year, data);
        registry
    }

    /// Validate and add a dataset, returning the one it replaced.
    pub fn insert(
        &mut self,
        data: FiscalYearData,
    ) -> Result<Option<FiscalYearData>, FiscalDataError> {
        data.validate()?;
        debug!(year = data.year, "registering fiscal data");
        Ok(self.years.insert(data.year, data))
    }

    pub fn get(
        &self,
        year: i32,
    ) -> Result<&FiscalYearData, FiscalDataError> {
        self.years
            .get(&year)
            .ok_or(FiscalDataError::YearNotFound(year))
    }

    /// The most recent dataset.
    pub fn latest(&self) -> Result<&FiscalYearData, FiscalDataError> {
        self.years
            .values()
            .next_back()
            .ok_or(FiscalDataError::Empty)
    }

    /// Exact year if present, otherwise the latest dataset not newer than
    /// `year`, otherwise the oldest one.
    pub fn closest(
        &self,
        year: i32,
    ) -> Result<&FiscalYearData, FiscalDataError> {
        if let Some(data) = self.years.get(&year) {
            return Ok(data);
        }
        self.years
            .range(..year)
            .next_back()
            .map(|(_, data)| data)
            .or_else(|| self.years.values().next())
            .ok_or(FiscalDataError::Empty)
    }

    /// Years with data, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::reference::fiscal_year_2025;

    fn relabel(
        mut data: FiscalYearData,
        year: i32,
    ) -> FiscalYearData {
        let verified = NaiveDate::from_ymd_opt(year, 1, 15).unwrap();
        data.year = year;
        data.last_verified = verified;
        data.contributions.year = year;
        data.contributions.last_verified = verified;
        data.tax_brackets.year = year;
        data.tax_brackets.last_verified = verified;
        data.thresholds.year = year;
        data.thresholds.last_verified = verified;
        data.chamber_fees.year = year;
        data.chamber_fees.last_verified = verified;
        data.tz_rates.year = year;
        data.tz_rates.last_verified = verified;
        data.surtax.year = year;
        data.surtax.last_verified = verified;
        data.deadlines.year = year;
        data.deadlines.last_verified = verified;
        data.payment_accounts.year = year;
        data.payment_accounts.last_verified = verified;
        data.corporate.year = year;
        data.corporate.last_verified = verified;
        data
    }

    #[test]
    fn with_builtin_contains_2025() {
        let registry = FiscalRegistry::with_builtin();

        assert_eq!(registry.years(), vec![2025]);
        assert_eq!(registry.get(2025).map(|d| d.year), Ok(2025));
    }

    #[test]
    fn get_unknown_year_is_an_error() {
        let registry = FiscalRegistry::with_builtin();

        assert_eq!(
            registry.get(1999).map(|d| d.year),
            Err(FiscalDataError::YearNotFound(1999))
        );
    }

    #[test]
    fn latest_on_empty_registry_is_an_error() {
        let registry = FiscalRegistry::new();

        assert_eq!(registry.latest().map(|d| d.year), Err(FiscalDataError::Empty));
    }

    #[test]
    fn historical_years_stay_queryable() {
        let mut registry = FiscalRegistry::with_builtin();
        registry.insert(relabel(fiscal_year_2025(), 2024)).unwrap();

        assert_eq!(registry.years(), vec![2024, 2025]);
        assert_eq!(registry.latest().map(|d| d.year), Ok(2025));
        assert_eq!(registry.get(2024).map(|d| d.year), Ok(2024));
    }

    #[test]
    fn closest_falls_back_to_previous_year() {
        let registry = FiscalRegistry::with_builtin();

        assert_eq!(registry.closest(2026).map(|d| d.year), Ok(2025));
        assert_eq!(registry.closest(2020).map(|d| d.year), Ok(2025));
    }

    #[test]
    fn insert_rejects_invalid_data() {
        let mut registry = FiscalRegistry::new();
        let mut data = fiscal_year_2025();
        data.thresholds.year = 2019;

        let result = registry.insert(data);

        assert!(matches!(result, Err(FiscalDataError::YearMismatch { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn insert_replaces_existing_year() {
        let mut registry = FiscalRegistry::with_builtin();

        let previous = registry.insert(fiscal_year_2025()).unwrap();

        assert!(previous.is_some());
        assert_eq!(registry.years(), vec![2025]);
    }
}
