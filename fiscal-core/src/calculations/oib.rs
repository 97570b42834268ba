//! OIB (osobni identifikacijski broj) validation.
//!
//! An OIB is 11 digits; the last one is an ISO 7064 MOD 11,10 check digit
//! over the first ten.

/// Computes the MOD 11,10 check digit for the first ten digits of an OIB.
///
/// Returns `None` unless `digits` is exactly ten ASCII digits.
///
/// # Example
///
/// ```
/// use fiscal_core::calculations::oib_check_digit;
///
/// assert_eq!(oib_check_digit("1234567890"), Some(3));
/// assert_eq!(oib_check_digit("12345"), None);
/// ```
pub fn oib_check_digit(digits: &str) -> Option<u8> {
    if digits.len() != 10 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut control: u32 = 10;
    for b in digits.bytes() {
        control = (control + u32::from(b - b'0')) % 10;
        if control == 0 {
            control = 10;
        }
        control = (control * 2) % 11;
    }

    let check = 11 - control;
    Some(if check == 10 { 0 } else { check as u8 })
}

/// Returns `true` when `oib` is a well-formed OIB with a valid check digit.
///
/// Whitespace anywhere in the input is ignored. Any other malformation
/// (letters, wrong length, bad checksum) yields `false`.
///
/// # Example
///
/// ```
/// use fiscal_core::calculations::validate_oib;
///
/// assert!(validate_oib("12345678903"));
/// assert!(validate_oib(" 123 4567 8903 "));
/// assert!(!validate_oib("12345678901"));
/// ```
pub fn validate_oib(oib: &str) -> bool {
    let cleaned: String = oib.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() != 11 || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let (body, check) = cleaned.split_at(10);
    let expected = oib_check_digit(body);
    let actual = check.bytes().next().map(|b| b - b'0');

    expected.is_some() && expected == actual
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const VALID: [&str; 5] = [
        "12345678903",
        "69435151530",
        "00000000001",
        "99999999994",
        "11111111119",
    ];

    #[test]
    fn accepts_known_valid_oibs() {
        for oib in VALID {
            assert!(validate_oib(oib), "{oib} should be valid");
        }
    }

    #[test]
    fn result_matches_recomputed_check_digit() {
        let expected = oib_check_digit("1234567890") == Some(1);

        assert_eq!(validate_oib("12345678901"), expected);
        assert!(!validate_oib("12345678901"));
    }

    #[test]
    fn rejects_every_wrong_check_digit() {
        for digit in 0..=9u8 {
            let oib = format!("1234567890{digit}");
            assert_eq!(validate_oib(&oib), digit == 3, "check digit {digit}");
        }
    }

    #[test]
    fn single_digit_mutations_are_detected() {
        for oib in VALID {
            for pos in 0..11 {
                let original = oib.as_bytes()[pos];
                for replacement in b'0'..=b'9' {
                    if replacement == original {
                        continue;
                    }
                    let mut mutated = oib.as_bytes().to_vec();
                    mutated[pos] = replacement;
                    let mutated = String::from_utf8(mutated).unwrap();
                    assert!(!validate_oib(&mutated), "{mutated} mutated from {oib}");
                }
            }
        }
    }

    #[test]
    fn strips_whitespace() {
        assert!(validate_oib("\t69435 151530\n"));
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!validate_oib(""));
        assert!(!validate_oib("1234567890"));
        assert!(!validate_oib("123456789033"));
    }

    #[test]
    fn rejects_non_digits() {
        assert!(!validate_oib("1234567890A"));
        assert!(!validate_oib("HR12345678903"));
        assert!(!validate_oib("１２３４５６７８９０３"));
    }

    #[test]
    fn check_digit_rejects_bad_input() {
        assert_eq!(oib_check_digit("123456789"), None);
        assert_eq!(oib_check_digit("12345678a0"), None);
    }
}
