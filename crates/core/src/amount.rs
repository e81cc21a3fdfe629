//! Amount - Non-negative whole number of base units (wei)
//!
//! All amounts held or moved by the treasury MUST be non-negative integers.
//! This is enforced at the type level.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when working with amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Amount must be a whole number of base units: {0}")]
    Fractional(Decimal),

    #[error("Invalid amount literal: {0}")]
    InvalidLiteral(String),
}

/// A non-negative whole amount in the treasury's base unit.
///
/// # Invariant
/// The inner value is always an integer >= 0, stored without a fractional
/// scale. This is enforced by the constructor.
///
/// # Example
/// ```
/// use ctas_core::Amount;
/// use rust_decimal::Decimal;
///
/// let amount: Amount = "1000000000000000000".parse().unwrap();
/// assert_eq!(amount.value(), Decimal::new(1_000_000_000_000_000_000, 0));
///
/// // Negative and fractional amounts are rejected
/// assert!(Amount::new(Decimal::new(-1, 0)).is_err());
/// assert!("0.5".parse::<Amount>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Zero amount constant
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Amount from a Decimal.
    ///
    /// Returns an error if the value is negative or has a fractional part.
    /// Integral values written with a scale (`1.0`) are normalized to `1`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::NegativeAmount(value));
        }
        if !value.fract().is_zero() {
            return Err(AmountError::Fractional(value));
        }
        Ok(Self(value.normalize()))
    }

    /// Whole units, the common case for base-unit amounts such as wei.
    pub fn from_units(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    /// Get the inner Decimal value
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Check if the amount is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Check if the amount is strictly greater than zero
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checked addition - returns None on overflow
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction - returns None if result would be negative
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        let result = self.0.checked_sub(other.0)?;
        if result < Decimal::ZERO {
            None
        } else {
            Some(Amount(result))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| AmountError::InvalidLiteral(s.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(Decimal::new(100, 0)).unwrap();
        assert_eq!(amount.value(), Decimal::new(100, 0));
        assert!(amount.is_positive());
    }

    #[test]
    fn test_amount_zero() {
        let amount = Amount::new(Decimal::ZERO).unwrap();
        assert!(amount.is_zero());
        assert!(!amount.is_positive());
    }

    #[test]
    fn test_amount_negative_rejected() {
        let result = Amount::new(Decimal::new(-100, 0));
        assert!(matches!(result, Err(AmountError::NegativeAmount(_))));
    }

    #[test]
    fn test_parse_wei_literal() {
        let amount: Amount = "1000000000000000000".parse().unwrap();
        assert_eq!(amount.to_string(), "1000000000000000000");
    }

    #[test]
    fn test_parse_rejects_garbage_and_negative() {
        assert!(matches!(
            "ten".parse::<Amount>(),
            Err(AmountError::InvalidLiteral(_))
        ));
        assert!(matches!(
            "-5".parse::<Amount>(),
            Err(AmountError::NegativeAmount(_))
        ));
    }

    #[test]
    fn test_parse_rejects_fraction() {
        assert!(matches!(
            "0.5".parse::<Amount>(),
            Err(AmountError::Fractional(_))
        ));
        assert!(matches!(
            "100.000001".parse::<Amount>(),
            Err(AmountError::Fractional(_))
        ));
    }

    #[test]
    fn test_integral_scale_is_normalized() {
        let amount: Amount = "1.0".parse().unwrap();
        assert_eq!(amount, Amount::from_units(1));
        assert_eq!(amount.to_string(), "1");
    }

    #[test]
    fn test_serde_rejects_fraction() {
        let result: Result<Amount, _> = serde_json::from_str("\"0.5\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_checked_sub_prevents_negative() {
        let a = Amount::from_units(50);
        let b = Amount::from_units(100);
        assert!(a.checked_sub(&b).is_none());
    }

    #[test]
    fn test_checked_sub_success() {
        let a = Amount::from_units(100);
        let b = Amount::from_units(30);
        assert_eq!(a.checked_sub(&b), Some(Amount::from_units(70)));
    }

    #[test]
    fn test_serde_as_string() {
        let amount = Amount::from_units(12345);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"12345\"");
        let parsed: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, parsed);
    }

    #[test]
    fn test_serde_rejects_negative() {
        let result: Result<Amount, _> = serde_json::from_str("\"-1\"");
        assert!(result.is_err());
    }
}
