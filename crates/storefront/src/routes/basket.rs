//! Basket route handlers.
//!
//! Basket mutations use HTMX for in-place updates. Every mutation rewrites the
//! basket cookie; nothing is stored server-side. Requests without HTMX get a
//! redirect back to the basket page.

use std::fmt::Display;
use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};
use tracing::instrument;

use voyager_core::{Basket, BasketLine, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{BasketCookie, OptionalAuth, basket_set_cookie, fits_in_cookie};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Toast shown after a successful add.
pub const ADDED_TOAST_MESSAGE: &str = "Added item to basket";

/// HTMX event refreshing the basket badge.
pub const BASKET_UPDATED_EVENT: &str = "basket-updated";

fn hx_trigger() -> HeaderName {
    HeaderName::from_static("hx-trigger")
}

/// Add to basket form data.
#[derive(Debug, Deserialize)]
pub struct AddToBasketForm {
    pub product_id: String,
}

/// Remove from basket form data: by position, or the first unit of a product.
///
/// Blank fields count as absent.
#[derive(Debug, Deserialize)]
pub struct RemoveFromBasketForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub index: Option<usize>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub product_id: Option<String>,
}

fn blank_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Basket page template.
#[derive(Template, WebTemplate)]
#[template(path = "basket.html")]
pub struct BasketTemplate {
    pub user: Option<CurrentUser>,
    pub basket_count: usize,
    pub lines: Vec<BasketLine>,
    pub total: Decimal,
}

/// Basket items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/basket_items.html")]
pub struct BasketItemsTemplate {
    pub lines: Vec<BasketLine>,
    pub total: Decimal,
}

impl From<&Basket> for BasketItemsTemplate {
    fn from(basket: &Basket) -> Self {
        Self {
            lines: basket.lines(),
            total: basket.total(),
        }
    }
}

/// Basket count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/basket_count.html")]
pub struct BasketCountTemplate {
    pub count: usize,
}

/// Whether the request was issued by HTMX.
fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .is_some_and(|v| v.as_bytes() == b"true")
}

/// `HX-Trigger` payload for a successful add: a toast plus a badge refresh.
#[must_use]
pub fn added_trigger() -> String {
    serde_json::json!({
        "toast": { "message": ADDED_TOAST_MESSAGE },
        "basket-updated": null,
    })
    .to_string()
}

/// Display the basket page.
///
/// # Route
///
/// `GET /basket`
#[instrument(skip_all)]
pub async fn show(
    OptionalAuth(user): OptionalAuth,
    BasketCookie(basket): BasketCookie,
) -> BasketTemplate {
    BasketTemplate {
        user,
        basket_count: basket.len(),
        lines: basket.lines(),
        total: basket.total(),
    }
}

/// Add one unit of a product.
///
/// # Route
///
/// `POST /basket/add` (`product_id`)
#[instrument(skip(state, headers, basket))]
pub async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    BasketCookie(mut basket): BasketCookie,
    Form(form): Form<AddToBasketForm>,
) -> Result<Response> {
    let id = ProductId::new(form.product_id);
    let product = state
        .catalog()
        .product(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    basket.add(product);
    if !fits_in_cookie(&basket) {
        tracing::info!(items = basket.len(), "Basket full, add refused");
        return Err(AppError::BasketFull);
    }
    add_breadcrumb("basket", "Added item", &[("product_id", id.as_str())]);

    let cookie = basket_set_cookie(&basket, state.config().is_secure());

    if !is_htmx(&headers) {
        return Ok(
            (AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/basket")).into_response(),
        );
    }

    let trigger = HeaderValue::from_str(&added_trigger())
        .map_err(|e| AppError::Internal(format!("HX-Trigger header: {e}")))?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookie), (hx_trigger(), trigger)]),
        BasketCountTemplate {
            count: basket.len(),
        },
    )
        .into_response())
}

/// Remove one entry.
///
/// # Route
///
/// `POST /basket/remove` (`index` or `product_id`)
#[instrument(skip(state, headers, basket))]
pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    BasketCookie(mut basket): BasketCookie,
    Form(form): Form<RemoveFromBasketForm>,
) -> Result<Response> {
    let removed = match (form.index, form.product_id) {
        (Some(index), _) => basket.remove_at(index),
        (None, Some(product_id)) => basket.remove_product(&ProductId::new(product_id)),
        (None, None) => {
            return Err(AppError::BadRequest(
                "index or product_id is required".to_string(),
            ));
        }
    };

    if removed.is_none() {
        tracing::debug!("Basket removal matched nothing");
    }

    Ok(basket_changed(&state, &headers, &basket))
}

/// Empty the basket.
///
/// # Route
///
/// `POST /basket/clear`
#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    headers: HeaderMap,
    BasketCookie(mut basket): BasketCookie,
) -> Response {
    basket.clear();
    basket_changed(&state, &headers, &basket)
}

/// Get basket count badge (HTMX).
///
/// # Route
///
/// `GET /basket/count`
pub async fn count(BasketCookie(basket): BasketCookie) -> BasketCountTemplate {
    BasketCountTemplate {
        count: basket.len(),
    }
}

/// Persist the basket and re-render the items fragment (or redirect).
fn basket_changed(state: &AppState, headers: &HeaderMap, basket: &Basket) -> Response {
    let cookie = basket_set_cookie(basket, state.config().is_secure());

    if is_htmx(headers) {
        (
            AppendHeaders([
                (SET_COOKIE, cookie),
                (hx_trigger(), HeaderValue::from_static(BASKET_UPDATED_EVENT)),
            ]),
            BasketItemsTemplate::from(basket),
        )
            .into_response()
    } else {
        (AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/basket")).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_added_trigger_payload() {
        let payload: serde_json::Value =
            serde_json::from_str(&added_trigger()).unwrap_or_default();

        assert_eq!(payload["toast"]["message"], ADDED_TOAST_MESSAGE);
        assert!(payload.get(BASKET_UPDATED_EVENT).is_some());
    }

    #[test]
    fn test_blank_remove_fields_are_absent() {
        let form: RemoveFromBasketForm =
            serde_json::from_value(serde_json::json!({"index": "", "product_id": " "}))
                .unwrap_or_else(|e| panic!("blank fields rejected: {e}"));
        assert!(form.index.is_none());
        assert!(form.product_id.is_none());

        let form: RemoveFromBasketForm =
            serde_json::from_value(serde_json::json!({"index": "2"}))
                .unwrap_or_else(|e| panic!("index rejected: {e}"));
        assert_eq!(form.index, Some(2));
        assert!(form.product_id.is_none());
    }

    #[test]
    fn test_non_numeric_index_is_rejected() {
        let result: std::result::Result<RemoveFromBasketForm, _> =
            serde_json::from_value(serde_json::json!({"index": "first"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));

        headers.insert("HX-Request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }
}
