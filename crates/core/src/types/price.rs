//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices carry no currency of their own; the currency is a display
//! concern chosen by the storefront. [`Price::format`] renders an amount the
//! way the currency's home locale writes it:
//!
//! ```rust
//! use cart_core::{CurrencyCode, Price};
//! use rust_decimal::Decimal;
//!
//! let price = Price::new(Decimal::new(123_450, 2));
//! assert_eq!(price.format(CurrencyCode::USD), "$1,234.50");
//! assert_eq!(price.format(CurrencyCode::BRL), "R$ 1.234,50");
//! ```

use std::fmt;
use std::ops::{Add, Mul};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A price amount in the currency's standard unit (e.g. dollars, not cents).
///
/// Deserializes from either a JSON number or a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    amount: Decimal,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self { amount }
    }

    /// The zero price.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            amount: Decimal::ZERO,
        }
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Format for display in the given currency (e.g. `$19.99`, `R$ 19,99`).
    ///
    /// Always renders two fractional digits, rounding midpoints away from zero.
    #[must_use]
    pub fn format(&self, currency: CurrencyCode) -> String {
        let style = currency.style();
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        let digits = format!("{:.2}", rounded.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        let separator = if style.spaced { " " } else { "" };

        format!(
            "{sign}{}{separator}{}{}{fraction}",
            style.symbol,
            group_thousands(whole, style.thousands),
            style.decimal,
        )
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.amount + rhs.amount)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self::new(self.amount * Decimal::from(rhs))
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.amount)
    }
}

/// Insert `separator` between every group of three digits, counting from the right.
fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

/// Error parsing a currency code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported currency code: {0}")]
pub struct CurrencyError(String);

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    BRL,
}

/// How a currency is written in its home locale.
struct CurrencyStyle {
    symbol: &'static str,
    spaced: bool,
    thousands: char,
    decimal: char,
}

impl CurrencyCode {
    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::BRL => "BRL",
        }
    }

    /// The display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        self.style().symbol
    }

    const fn style(self) -> CurrencyStyle {
        match self {
            Self::USD => CurrencyStyle {
                symbol: "$",
                spaced: false,
                thousands: ',',
                decimal: '.',
            },
            Self::CAD => CurrencyStyle {
                symbol: "CA$",
                spaced: false,
                thousands: ',',
                decimal: '.',
            },
            Self::AUD => CurrencyStyle {
                symbol: "A$",
                spaced: false,
                thousands: ',',
                decimal: '.',
            },
            Self::GBP => CurrencyStyle {
                symbol: "£",
                spaced: false,
                thousands: ',',
                decimal: '.',
            },
            Self::EUR => CurrencyStyle {
                symbol: "€",
                spaced: false,
                thousands: ',',
                decimal: '.',
            },
            // pt-BR
            Self::BRL => CurrencyStyle {
                symbol: "R$",
                spaced: true,
                thousands: '.',
                decimal: ',',
            },
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            "BRL" => Ok(Self::BRL),
            _ => Err(CurrencyError(s.to_string())),
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2))
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(price(1999).format(CurrencyCode::USD), "$19.99");
        assert_eq!(price(123_456_789).format(CurrencyCode::USD), "$1,234,567.89");
        assert_eq!(price(0).format(CurrencyCode::USD), "$0.00");
    }

    #[test]
    fn test_format_brl_uses_pt_br_separators() {
        assert_eq!(price(13990).format(CurrencyCode::BRL), "R$ 139,90");
        assert_eq!(price(123_450).format(CurrencyCode::BRL), "R$ 1.234,50");
    }

    #[test]
    fn test_format_pads_and_rounds() {
        let whole = Price::new(Decimal::from(5));
        assert_eq!(whole.format(CurrencyCode::GBP), "£5.00");

        let midpoint = Price::new(Decimal::new(10_005, 3));
        assert_eq!(midpoint.format(CurrencyCode::USD), "$10.01");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(price(-250).format(CurrencyCode::USD), "-$2.50");
        // -0.001 rounds to zero and must not keep its sign
        let tiny = Price::new(Decimal::new(-1, 3));
        assert_eq!(tiny.format(CurrencyCode::USD), "$0.00");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1", ','), "1");
        assert_eq!(group_thousands("123", ','), "123");
        assert_eq!(group_thousands("1234", ','), "1,234");
        assert_eq!(group_thousands("1234567", '.'), "1.234.567");
    }

    #[test]
    fn test_price_deserializes_from_number_and_string() {
        let from_number: Price = serde_json::from_str("139.9").unwrap();
        let from_string: Price = serde_json::from_str("\"139.9\"").unwrap();
        assert_eq!(from_number, price(13990));
        assert_eq!(from_string, price(13990));
    }

    #[test]
    fn test_price_arithmetic() {
        assert_eq!(price(1050) * 3, price(3150));
        let total: Price = [price(100), price(250)].into_iter().sum();
        assert_eq!(total, price(350));
    }

    #[test]
    fn test_currency_code_parse() {
        assert_eq!("brl".parse::<CurrencyCode>().unwrap(), CurrencyCode::BRL);
        assert_eq!(" USD ".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
        assert_eq!(CurrencyCode::EUR.to_string(), "EUR");
        assert_eq!(CurrencyCode::default(), CurrencyCode::USD);
    }
}
