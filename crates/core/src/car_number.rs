//! Car numbers: the integer called out at pickup.
//!
//! A [`CarNumber`] is always positive and fits in a PostgreSQL `INTEGER`.
//! Raw operator input (typed digits, scanned codes) is turned into one here
//! so the rest of the system never sees an unvalidated value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A validated, positive car number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct CarNumber(i32);

impl CarNumber {
    /// Validate a raw integer.
    ///
    /// Rules:
    /// - Must be greater than zero.
    /// - Must fit in 32 bits.
    pub fn new(raw: i64) -> Result<Self, CoreError> {
        if raw <= 0 {
            return Err(CoreError::InvalidInput(format!(
                "Car number must be a positive integer, got {raw}"
            )));
        }
        i32::try_from(raw).map(Self).map_err(|_| {
            CoreError::InvalidInput(format!("Car number {raw} is out of range"))
        })
    }

    /// The underlying integer value.
    pub fn get(self) -> i32 {
        self.0
    }

    /// Parse text typed into a numeric field.
    ///
    /// Every non-digit character is discarded first, so `" 2 0 "` and
    /// `"#20"` both yield car 20.
    pub fn parse_typed(raw: &str) -> Result<Self, CoreError> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(CoreError::InvalidInput(
                "Please enter a car number".to_string(),
            ));
        }
        Self::from_digits(&digits)
    }

    /// Extract the car number from a scanned code.
    ///
    /// Takes the first run of ASCII digits (`"CAR-0042/B"` is car 42).
    pub fn extract_from_scan(code: &str) -> Result<Self, CoreError> {
        let digits: String = code
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();
        if digits.is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "Scanned code \"{code}\" contains no car number"
            )));
        }
        Self::from_digits(&digits)
    }

    fn from_digits(digits: &str) -> Result<Self, CoreError> {
        let value: i64 = digits.parse().map_err(|_| {
            CoreError::InvalidInput(format!("Car number {digits} is out of range"))
        })?;
        Self::new(value)
    }
}

impl TryFrom<i64> for CarNumber {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CarNumber> for i32 {
    fn from(value: CarNumber) -> Self {
        value.0
    }
}

impl fmt::Display for CarNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_positive_numbers() {
        assert_eq!(CarNumber::new(7).unwrap().get(), 7);
        assert_eq!(CarNumber::new(i32::MAX as i64).unwrap().get(), i32::MAX);
    }

    #[test]
    fn rejects_zero_and_negative() {
        assert_matches!(CarNumber::new(0), Err(CoreError::InvalidInput(_)));
        assert_matches!(CarNumber::new(-3), Err(CoreError::InvalidInput(_)));
    }

    #[test]
    fn rejects_values_beyond_i32() {
        assert_matches!(
            CarNumber::new(i32::MAX as i64 + 1),
            Err(CoreError::InvalidInput(_))
        );
    }

    #[test]
    fn typed_input_strips_non_digits() {
        assert_eq!(CarNumber::parse_typed(" 2 0 ").unwrap().get(), 20);
        assert_eq!(CarNumber::parse_typed("#15").unwrap().get(), 15);
    }

    #[test]
    fn typed_input_without_digits_is_invalid() {
        assert_matches!(CarNumber::parse_typed(""), Err(CoreError::InvalidInput(_)));
        assert_matches!(CarNumber::parse_typed("abc"), Err(CoreError::InvalidInput(_)));
    }

    #[test]
    fn typed_zero_is_invalid() {
        assert_matches!(CarNumber::parse_typed("000"), Err(CoreError::InvalidInput(_)));
    }

    #[test]
    fn typed_input_with_too_many_digits_is_invalid() {
        assert_matches!(
            CarNumber::parse_typed("99999999999999999999999"),
            Err(CoreError::InvalidInput(_))
        );
    }

    #[test]
    fn scan_takes_first_digit_run() {
        assert_eq!(CarNumber::extract_from_scan("CAR-0042/B7").unwrap().get(), 42);
        assert_eq!(CarNumber::extract_from_scan("12").unwrap().get(), 12);
    }

    #[test]
    fn scan_without_digits_is_invalid() {
        assert_matches!(
            CarNumber::extract_from_scan("no number here"),
            Err(CoreError::InvalidInput(_))
        );
    }

    #[test]
    fn deserialize_validates() {
        let car: CarNumber = serde_json::from_str("9").unwrap();
        assert_eq!(car.get(), 9);
        assert!(serde_json::from_str::<CarNumber>("0").is_err());
        assert!(serde_json::from_str::<CarNumber>("-1").is_err());
    }

    #[test]
    fn serializes_as_plain_integer() {
        let car = CarNumber::new(31).unwrap();
        assert_eq!(serde_json::to_string(&car).unwrap(), "31");
    }
}
