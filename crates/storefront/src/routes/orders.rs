//! Order history route handler.
//!
//! The session is checked before anything else: guests get a sign-in prompt
//! and the order store is never queried for them.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use voyager_core::Order;

use crate::error::Result;
use crate::filters;
use crate::middleware::{BasketCookie, OptionalAuth};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Order history template.
///
/// `user` is `None` for guests, in which case `orders` is always empty.
#[derive(Template, WebTemplate)]
#[template(path = "orders.html")]
pub struct OrdersTemplate {
    pub user: Option<CurrentUser>,
    pub basket_count: usize,
    pub orders: Vec<Order>,
}

impl OrdersTemplate {
    /// Header line, e.g. `1 Order` or `3 Orders`.
    #[must_use]
    pub fn heading(&self) -> String {
        match self.orders.len() {
            1 => "1 Order".to_string(),
            n => format!("{n} Orders"),
        }
    }
}

/// Display the signed-in user's orders, newest first.
///
/// # Route
///
/// `GET /orders`
#[instrument(skip_all, fields(signed_in = user.is_some()))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    BasketCookie(basket): BasketCookie,
) -> Result<OrdersTemplate> {
    let orders = match &user {
        Some(user) => state.orders().list_for_user(&user.email).await?,
        None => Vec::new(),
    };

    Ok(OrdersTemplate {
        user,
        basket_count: basket.len(),
        orders,
    })
}
