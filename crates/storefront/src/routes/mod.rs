//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (category tiles, offers)
//! GET  /food/?category=<name>  - Food listing, optionally by category
//! GET  /orders                 - Order history (sign-in prompt for guests)
//!
//! # Basket (HTMX fragments)
//! GET  /basket                 - Basket page
//! POST /basket/add             - Add product (toast + basket-updated trigger)
//! POST /basket/remove          - Remove entry (returns basket_items fragment)
//! POST /basket/clear           - Empty basket (returns basket_items fragment)
//! GET  /basket/count           - Basket count badge (fragment)
//!
//! # Auth (rate limited)
//! GET  /api/auth/login         - Redirect to the identity provider
//! GET  /api/auth/callback      - Handle the provider callback
//! GET  /api/auth/logout        - Sign out (POST also accepted)
//! GET  /api/auth/me            - Current user as JSON (401 for guests)
//! ```

pub mod auth;
pub mod basket;
pub mod food;
pub mod home;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router (without rate limiting).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the basket routes router.
pub fn basket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(basket::show))
        .route("/add", post(basket::add))
        .route("/remove", post(basket::remove))
        .route("/clear", post(basket::clear))
        .route("/count", get(basket::count))
}

/// Create all page routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/food", get(food::index))
        .route("/food/", get(food::index))
        .route("/orders", get(orders::index))
        .nest("/basket", basket_routes())
}
