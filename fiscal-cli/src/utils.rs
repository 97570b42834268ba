use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Error returned when a string is neither `2025-03-31` nor `31.03.2025`.
#[derive(Debug, Error)]
#[error("invalid date '{0}', expected YYYY-MM-DD or DD.MM.YYYY")]
pub struct ParseDateError(String);

/// Normalizes amount input: strips whitespace, the euro sign and thousands
/// separators, and turns the decimal separator into a dot.
///
/// When both `.` and `,` appear, the one that comes last is the decimal
/// separator. A lone `,` is a decimal comma. Dots alone are thousands
/// separators when every group after the first has exactly three digits
/// (`25.000`, `1.250.000`); otherwise a single dot is a decimal point.
fn normalize_decimal_input(s: &str) -> String {
    let compact: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .collect();

    match (compact.rfind('.'), compact.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (None, Some(_)) => compact.replace(',', "."),
        (Some(_), None) if is_dot_grouped(&compact) => compact.replace('.', ""),
        _ => compact,
    }
}

fn is_dot_grouped(s: &str) -> bool {
    let mut groups = s.split('.');
    let head = groups.next().unwrap_or_default();
    let head_digits = head.strip_prefix('-').unwrap_or(head);

    !head_digits.is_empty()
        && head_digits.len() <= 3
        && head_digits.chars().all(|c| c.is_ascii_digit())
        && groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Parses an amount written the Croatian way (`1.234,56`) or the English
/// way (`1,234.56`).
///
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses `2025-03-31`, `31.03.2025` or `31.03.2025.`.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseDateError> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed.trim_end_matches('.'), "%d.%m.%Y"))
        .map_err(|_| ParseDateError(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_decimal_accepts_croatian_format() {
        assert_eq!(parse_decimal("1.234,56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("25000,00").unwrap(), dec!(25000.00));
        assert_eq!(parse_decimal("1.234.567,89 €").unwrap(), dec!(1234567.89));
    }

    #[test]
    fn parse_decimal_reads_dot_groups_as_thousands() {
        assert_eq!(parse_decimal("25.000").unwrap(), dec!(25000));
        assert_eq!(parse_decimal("1.250.000").unwrap(), dec!(1250000));
        assert_eq!(parse_decimal("25.000 €").unwrap(), dec!(25000));
    }

    #[test]
    fn parse_decimal_single_dot_with_cents_is_decimal_point() {
        assert_eq!(parse_decimal("123.45").unwrap(), dec!(123.45));
        assert_eq!(parse_decimal("0.5").unwrap(), dec!(0.5));
        assert_eq!(parse_decimal("1234.567").unwrap(), dec!(1234.567));
    }

    #[test]
    fn parse_decimal_accepts_english_format() {
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("25000").unwrap(), dec!(25000));
    }

    #[test]
    fn parse_decimal_trim_whitespace() {
        assert_eq!(parse_decimal("  123.45  ").unwrap(), dec!(123.45));
        assert_eq!(parse_decimal("12 500,00").unwrap(), dec!(12500.00));
    }

    #[test]
    fn parse_decimal_empty_treated_as_zero() {
        assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        assert!(parse_decimal("abc").is_err());
        assert!(parse_decimal("1.2.3").is_err());
    }

    #[test]
    fn parse_date_accepts_both_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();

        assert_eq!(parse_date("2025-03-31").unwrap(), expected);
        assert_eq!(parse_date("31.03.2025").unwrap(), expected);
        assert_eq!(parse_date(" 31.03.2025. ").unwrap(), expected);
        assert!(parse_date("31/03/2025").is_err());
    }
}
