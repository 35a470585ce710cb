//! Type-safe monetary value with embedded currency.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::ValidationError;

/// Currencies accepted by the payment API.
///
/// Serialized in the lowercase form the payment provider expects (`"usd"`);
/// the uppercase form is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Currency {
    #[serde(rename = "usd", alias = "USD")]
    USD,
    #[serde(rename = "eur", alias = "EUR")]
    EUR,
    #[serde(rename = "gbp", alias = "GBP")]
    GBP,
}

impl Currency {
    /// Returns the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::USD | Currency::EUR | Currency::GBP => 2,
        }
    }

    /// Returns the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
        }
    }

    /// Lowercase ISO code as sent to the payment provider.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingCurrency);
        }
        match trimmed.to_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            _ => Err(ValidationError::UnsupportedCurrency(trimmed.to_string())),
        }
    }
}

/// Type-safe money representation with embedded currency.
///
/// Amount is stored in the smallest unit of the currency (cents, pence)
/// to avoid floating-point precision issues. A `Money` is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MoneyParts")]
pub struct Money {
    amount: i64,
    currency: Currency,
}

/// Unchecked wire form of [`Money`].
#[derive(Deserialize)]
struct MoneyParts {
    amount: i64,
    currency: Currency,
}

impl TryFrom<MoneyParts> for Money {
    type Error = ValidationError;

    fn try_from(parts: MoneyParts) -> Result<Self, Self::Error> {
        Self::from_minor(parts.amount, parts.currency)
    }
}

impl Money {
    /// Creates a Money value from an amount already in minor units.
    pub fn from_minor(amount: i64, currency: Currency) -> Result<Self, ValidationError> {
        if amount <= 0 {
            return Err(ValidationError::NonPositiveAmount);
        }
        Ok(Self { amount, currency })
    }

    /// Converts a major-unit amount (e.g. `10.5` dollars) into minor units,
    /// multiplying by 100 and rounding to the nearest unit.
    pub fn from_major(amount: f64, currency: Currency) -> Result<Self, ValidationError> {
        let minor = to_minor_units(amount, currency.decimal_places())?;
        Self::from_minor(minor, currency)
    }

    /// Returns the amount in smallest currency unit.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Returns the currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }
}

/// Scales a positive major-unit amount to minor units, rounding to the
/// nearest unit.
pub fn to_minor_units(amount: f64, decimal_places: u8) -> Result<i64, ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::InvalidAmount);
    }
    if amount <= 0.0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    let minor = (amount * 10_f64.powi(i32::from(decimal_places))).round();
    if minor > i64::MAX as f64 {
        return Err(ValidationError::InvalidAmount);
    }
    if minor < 1.0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(minor as i64)
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let major = self.amount / 100;
        let minor = (self.amount % 100).abs();
        write!(f, "{}{}.{:02}", self.currency.symbol(), major, minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_units_are_scaled_and_rounded() {
        let money = Money::from_major(10.0, Currency::USD).unwrap();
        assert_eq!(money.amount(), 1000);

        let money = Money::from_major(19.999, Currency::EUR).unwrap();
        assert_eq!(money.amount(), 2000);

        let money = Money::from_major(0.125, Currency::GBP).unwrap();
        assert_eq!(money.amount(), 13);
    }

    #[test]
    fn test_non_positive_amount_fails() {
        assert!(matches!(
            Money::from_major(0.0, Currency::USD),
            Err(ValidationError::NonPositiveAmount)
        ));
        assert!(matches!(
            Money::from_major(-5.0, Currency::USD),
            Err(ValidationError::NonPositiveAmount)
        ));
        assert!(matches!(
            Money::from_minor(0, Currency::USD),
            Err(ValidationError::NonPositiveAmount)
        ));
    }

    #[test]
    fn test_amount_rounding_to_zero_fails() {
        let result = Money::from_major(0.001, Currency::USD);
        assert!(matches!(result, Err(ValidationError::NonPositiveAmount)));
    }

    #[test]
    fn test_non_finite_amount_fails() {
        assert!(matches!(
            Money::from_major(f64::NAN, Currency::USD),
            Err(ValidationError::InvalidAmount)
        ));
        assert!(matches!(
            Money::from_major(f64::INFINITY, Currency::USD),
            Err(ValidationError::InvalidAmount)
        ));
    }

    #[test]
    fn test_currency_parsing_is_case_insensitive() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!(" Eur ".parse::<Currency>().unwrap(), Currency::EUR);
        assert!(matches!(
            "".parse::<Currency>(),
            Err(ValidationError::MissingCurrency)
        ));
        assert!(matches!(
            "jpy".parse::<Currency>(),
            Err(ValidationError::UnsupportedCurrency(_))
        ));
    }

    #[test]
    fn test_currency_wire_format() {
        assert_eq!(serde_json::to_string(&Currency::USD).unwrap(), "\"usd\"");
        let parsed: Currency = serde_json::from_str("\"GBP\"").unwrap();
        assert_eq!(parsed, Currency::GBP);
    }

    #[test]
    fn test_deserialized_money_must_be_positive() {
        let money: Money = serde_json::from_str(r#"{"amount":1050,"currency":"usd"}"#).unwrap();
        assert_eq!(money, Money::from_minor(1050, Currency::USD).unwrap());

        let err = serde_json::from_str::<Money>(r#"{"amount":0,"currency":"usd"}"#).unwrap_err();
        assert!(err.to_string().contains("Amount must be greater than 0"));
        assert!(serde_json::from_str::<Money>(r#"{"amount":-5,"currency":"eur"}"#).is_err());
    }

    #[test]
    fn test_money_display() {
        let money = Money::from_minor(1050, Currency::USD).unwrap();
        assert_eq!(format!("{}", money), "$10.50");
    }

    #[test]
    fn test_minor_unit_scaling_for_partial_amounts() {
        assert_eq!(to_minor_units(5.25, 2).unwrap(), 525);
        assert_eq!(to_minor_units(0.01, 2).unwrap(), 1);
        assert_eq!(to_minor_units(0.004, 2), Err(ValidationError::NonPositiveAmount));
        assert_eq!(to_minor_units(f64::NAN, 2), Err(ValidationError::InvalidAmount));
    }
}
