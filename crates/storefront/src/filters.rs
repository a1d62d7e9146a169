//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use voyager_core::Price;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for main.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Formats a decimal amount as rupees, e.g. `₹1,23,456.00`.
///
/// Usage in templates: `{{ product.price|inr }}`
#[askama::filter_fn]
pub fn inr(amount: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_inr(&amount.to_string()))
}

/// Formats unix seconds as `DD MMM YYYY` (UTC).
///
/// Usage in templates: `{{ order.timestamp|order_date }}`
#[askama::filter_fn]
pub fn order_date(timestamp: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_order_date(&timestamp.to_string()))
}

fn format_inr(amount: &str) -> String {
    Decimal::from_str(amount).map_or_else(|_| amount.to_string(), |d| Price::inr(d).display())
}

fn format_order_date(timestamp: &str) -> String {
    timestamp
        .parse::<i64>()
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map_or_else(String::new, |dt| dt.format("%d %b %Y").to_string())
}
