//! Basket cookie.
//!
//! The basket never touches server-side storage. It round-trips through a
//! client cookie holding only product IDs (base64url JSON); names and prices
//! are re-read from the catalog on every request, so a tampered cookie can at
//! worst reference products that exist.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, header, request::Parts},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use tower_sessions::cookie::{Cookie, SameSite};

use voyager_core::{Basket, ProductId};

use crate::state::AppState;

/// Basket cookie name.
pub const BASKET_COOKIE_NAME: &str = "voyager_basket";

/// Basket cookie lifetime (30 days).
const BASKET_COOKIE_MAX_AGE_DAYS: i64 = 30;

/// Longest `Set-Cookie` value the basket may produce. Browsers silently drop
/// cookies over 4096 bytes.
pub const MAX_BASKET_COOKIE_BYTES: usize = 4000;

/// Extractor yielding the request's basket, resolved against the catalog.
///
/// A missing or unreadable cookie yields an empty basket.
pub struct BasketCookie(pub Basket);

impl FromRequestParts<AppState> for BasketCookie {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ids = read_basket_ids(&parts.headers);
        Ok(Self(state.catalog().resolve_basket(&ids)))
    }
}

/// Product IDs stored in the request's basket cookie.
#[must_use]
pub fn read_basket_ids(headers: &HeaderMap) -> Vec<ProductId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == BASKET_COOKIE_NAME)
        .and_then(|cookie| decode_ids(cookie.value()))
        .unwrap_or_default()
}

/// Whether `basket` still fits in the cookie (measured with every attribute
/// set, so it holds over plain HTTP too).
#[must_use]
pub fn fits_in_cookie(basket: &Basket) -> bool {
    basket_set_cookie(basket, true).len() <= MAX_BASKET_COOKIE_BYTES
}

/// `Set-Cookie` value persisting `basket` on the client.
///
/// An empty basket expires the cookie.
#[must_use]
pub fn basket_set_cookie(basket: &Basket, secure: bool) -> HeaderValue {
    let mut builder = Cookie::build((BASKET_COOKIE_NAME, encode_ids(&basket.product_ids())))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax);

    builder = if basket.is_empty() {
        builder.max_age(tower_sessions::cookie::time::Duration::ZERO)
    } else {
        builder.max_age(tower_sessions::cookie::time::Duration::days(
            BASKET_COOKIE_MAX_AGE_DAYS,
        ))
    };

    // Cookie values are restricted to base64url characters, so this cannot fail
    HeaderValue::from_str(&builder.build().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("voyager_basket=; Path=/; Max-Age=0"))
}

fn encode_ids(ids: &[ProductId]) -> String {
    if ids.is_empty() {
        return String::new();
    }
    serde_json::to_vec(ids)
        .map(|json| URL_SAFE_NO_PAD.encode(json))
        .unwrap_or_default()
}

fn decode_ids(value: &str) -> Option<Vec<ProductId>> {
    if value.is_empty() {
        return None;
    }
    let json = URL_SAFE_NO_PAD.decode(value).ok()?;
    match serde_json::from_slice(&json) {
        Ok(ids) => Some(ids),
        Err(e) => {
            tracing::debug!("Ignoring unreadable basket cookie: {e}");
            None
        }
    }
}
