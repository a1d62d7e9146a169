//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices and order amounts are stored in the currency's standard
//! unit (rupees, not paise). Formatting follows the storefront's display
//! convention: symbol first, two fraction digits, and lakh/crore digit
//! grouping for INR (`₹1,23,456.00`).

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the storefront's currency (INR).
    #[must_use]
    pub const fn inr(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::INR)
    }

    /// Format for display, e.g. `₹1,23,456.50` or `$1,234.50`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let digits = format!("{:.2}", rounded.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let grouped = match self.currency_code {
            CurrencyCode::INR => group_indian(whole),
            _ => group_thousands(whole),
        };

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        format!(
            "{sign}{}{grouped}.{fraction}",
            self.currency_code.symbol()
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for this currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

/// Group digits in threes: `1234567` -> `1,234,567`.
fn group_thousands(whole: &str) -> String {
    let mut out = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Indian grouping: last three digits, then pairs: `1234567` -> `12,34,567`.
fn group_indian(whole: &str) -> String {
    if whole.len() <= 3 {
        return whole.to_owned();
    }
    let (head, tail) = whole.split_at(whole.len() - 3);

    let mut out = String::with_capacity(whole.len() + whole.len() / 2);
    for (i, c) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push(',');
    out.push_str(tail);
    out
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_inr_small_amounts() {
        assert_eq!(Price::inr(dec!(0)).display(), "₹0.00");
        assert_eq!(Price::inr(dec!(99)).display(), "₹99.00");
        assert_eq!(Price::inr(dec!(999.5)).display(), "₹999.50");
    }

    #[test]
    fn test_inr_lakh_grouping() {
        assert_eq!(Price::inr(dec!(1234)).display(), "₹1,234.00");
        assert_eq!(Price::inr(dec!(123456)).display(), "₹1,23,456.00");
        assert_eq!(Price::inr(dec!(12345678.9)).display(), "₹1,23,45,678.90");
    }

    #[test]
    fn test_western_grouping() {
        let price = Price::new(dec!(1234567.891), CurrencyCode::USD);
        assert_eq!(price.display(), "$1,234,567.89");
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(Price::inr(dec!(10.005)).display(), "₹10.01");
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(Price::inr(dec!(-1500)).display(), "-₹1,500.00");
    }

    #[test]
    fn test_default_currency_is_inr() {
        assert_eq!(CurrencyCode::default().code(), "INR");
    }
}
