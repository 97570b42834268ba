use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BusinessType {
    #[default]
    Obrt,
    SlobodnaDjelatnost,
}

impl BusinessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Obrt => "obrt",
            Self::SlobodnaDjelatnost => "slobodna-djelatnost",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "obrt" => Some(Self::Obrt),
            "slobodna-djelatnost" | "slobodna_djelatnost" | "sd" => Some(Self::SlobodnaDjelatnost),
            _ => None,
        }
    }
}

/// Returned when a percentage is not one of the recognised normative-expense rates.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("normative expense percentage must be one of 15, 30, 60 or 85, got {0}")]
pub struct ExpenseBracketError(pub u8);

/// Normative-expense percentage applied to PO-SD income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ExpenseBracket {
    Percent15,
    #[default]
    Percent30,
    Percent60,
    Percent85,
}

impl ExpenseBracket {
    pub const ALL: [ExpenseBracket; 4] = [
        ExpenseBracket::Percent15,
        ExpenseBracket::Percent30,
        ExpenseBracket::Percent60,
        ExpenseBracket::Percent85,
    ];

    pub fn percentage(&self) -> u8 {
        match self {
            Self::Percent15 => 15,
            Self::Percent30 => 30,
            Self::Percent60 => 60,
            Self::Percent85 => 85,
        }
    }
}

impl TryFrom<u8> for ExpenseBracket {
    type Error = ExpenseBracketError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|bracket| bracket.percentage() == value)
            .ok_or(ExpenseBracketError(value))
    }
}

impl From<ExpenseBracket> for u8 {
    fn from(bracket: ExpenseBracket) -> Self {
        bracket.percentage()
    }
}

/// Tourist-board (TZ) activity group, 1 being the highest-rated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TzGroup {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl TzGroup {
    pub fn number(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            5 => Some(Self::Five),
            _ => None,
        }
    }
}

impl TryFrom<u8> for TzGroup {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or_else(|| format!("TZ group must be 1-5, got {value}"))
    }
}

impl From<TzGroup> for u8 {
    fn from(group: TzGroup) -> Self {
        group.number()
    }
}

impl fmt::Display for TzGroup {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn expense_bracket_accepts_allowed_percentages() {
        for pct in [15u8, 30, 60, 85] {
            let bracket = ExpenseBracket::try_from(pct).unwrap();
            assert_eq!(bracket.percentage(), pct);
        }
    }

    #[test]
    fn expense_bracket_rejects_other_percentages() {
        assert_eq!(ExpenseBracket::try_from(25), Err(ExpenseBracketError(25)));
        assert_eq!(ExpenseBracket::try_from(0), Err(ExpenseBracketError(0)));
    }

    #[test]
    fn tz_group_round_trips_through_number() {
        for n in 1..=5u8 {
            assert_eq!(TzGroup::from_number(n).map(|g| g.number()), Some(n));
        }
        assert_eq!(TzGroup::from_number(6), None);
    }

    #[test]
    fn business_type_parse_is_case_insensitive() {
        assert_eq!(BusinessType::parse("OBRT"), Some(BusinessType::Obrt));
        assert_eq!(
            BusinessType::parse("slobodna-djelatnost"),
            Some(BusinessType::SlobodnaDjelatnost)
        );
        assert_eq!(BusinessType::parse("doo"), None);
    }
}
