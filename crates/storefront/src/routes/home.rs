//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use voyager_core::{Category, Product};

use crate::filters;
use crate::middleware::{BasketCookie, OptionalAuth};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<CurrentUser>,
    pub basket_count: usize,
    pub categories: Vec<Category>,
    pub offers: Vec<Product>,
}

/// Display the home page: category tiles and today's offers.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    BasketCookie(basket): BasketCookie,
) -> HomeTemplate {
    let catalog = state.catalog();

    HomeTemplate {
        user,
        basket_count: basket.len(),
        categories: catalog.categories().to_vec(),
        offers: catalog.offers().into_iter().cloned().collect(),
    }
}
