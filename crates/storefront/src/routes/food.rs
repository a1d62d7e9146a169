//! Food listing route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use voyager_core::Product;

use crate::filters;
use crate::middleware::{BasketCookie, OptionalAuth};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Listing filter.
#[derive(Debug, Deserialize)]
pub struct FoodQuery {
    /// Category name, matched case-insensitively.
    pub category: Option<String>,
}

/// Food listing template.
#[derive(Template, WebTemplate)]
#[template(path = "food.html")]
pub struct FoodTemplate {
    pub user: Option<CurrentUser>,
    pub basket_count: usize,
    pub title: String,
    pub products: Vec<Product>,
}

/// List products, optionally restricted to one category.
///
/// # Route
///
/// `GET /food/?category=<name>`
#[instrument(skip(state, user, basket))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    BasketCookie(basket): BasketCookie,
    Query(query): Query<FoodQuery>,
) -> FoodTemplate {
    let catalog = state.catalog();
    let category = query.category.as_deref().filter(|c| !c.trim().is_empty());

    let title = match category {
        Some(name) => catalog
            .category(name)
            .map_or_else(|| name.to_string(), |c| c.name.clone()),
        None => "All food".to_string(),
    };

    FoodTemplate {
        user,
        basket_count: basket.len(),
        title,
        products: catalog.products_in(category).into_iter().cloned().collect(),
    }
}
