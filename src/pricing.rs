//! Money handling for prices and totals.
//!
//! Prices are kept as whole hundredths so totals never drift the way
//! floating point sums do.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A non-negative amount with two decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceParseError {
    #[error("price is empty")]
    Empty,
    #[error("price must be a non-negative decimal: {0}")]
    Invalid(String),
    #[error("price has more than two decimal places: {0}")]
    TooPrecise(String),
    #[error("price is too large: {0}")]
    Overflow(String),
}

impl Price {
    pub const ZERO: Price = Price(0);

    pub const fn from_cents(cents: u64) -> Self {
        Price(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Unit price times a count. Saturates instead of wrapping.
    pub fn times(self, count: usize) -> Price {
        Price(self.0.saturating_mul(count as u64))
    }

    pub fn saturating_add(self, other: Price) -> Price {
        Price(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Price {
    type Err = PriceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PriceParseError::Empty);
        }

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() && frac.is_empty() || !all_digits(whole) || !all_digits(frac) {
            return Err(PriceParseError::Invalid(s.to_string()));
        }
        if frac.len() > 2 {
            return Err(PriceParseError::TooPrecise(s.to_string()));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| PriceParseError::Overflow(s.to_string()))?
        };
        let frac: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().unwrap_or(0) * 10,
            _ => frac.parse::<u64>().unwrap_or(0),
        };

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .map(Price)
            .ok_or_else(|| PriceParseError::Overflow(s.to_string()))
    }
}

// Stored and exchanged as the decimal string, e.g. "2500.00".
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_forms() {
        assert_eq!("2.50".parse::<Price>().unwrap(), Price::from_cents(250));
        assert_eq!("2.5".parse::<Price>().unwrap(), Price::from_cents(250));
        assert_eq!("2500".parse::<Price>().unwrap(), Price::from_cents(250_000));
        assert_eq!(".75".parse::<Price>().unwrap(), Price::from_cents(75));
        assert_eq!(" 0 ".parse::<Price>().unwrap(), Price::ZERO);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("".parse::<Price>(), Err(PriceParseError::Empty));
        assert!(matches!("-1".parse::<Price>(), Err(PriceParseError::Invalid(_))));
        assert!(matches!("1.2.3".parse::<Price>(), Err(PriceParseError::Invalid(_))));
        assert!(matches!(".".parse::<Price>(), Err(PriceParseError::Invalid(_))));
        assert!(matches!("1.005".parse::<Price>(), Err(PriceParseError::TooPrecise(_))));
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_cents(750).to_string(), "7.50");
        assert_eq!(Price::from_cents(5).to_string(), "0.05");
        assert_eq!(Price::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_times_saturates() {
        assert_eq!(Price::from_cents(250).times(3), Price::from_cents(750));
        assert_eq!(Price::from_cents(u64::MAX).times(2), Price::from_cents(u64::MAX));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Price::from_cents(250_000)).unwrap();
        assert_eq!(json, "\"2500.00\"");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Price::from_cents(250_000));
    }
}
