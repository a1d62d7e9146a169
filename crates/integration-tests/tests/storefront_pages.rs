//! In-process tests for the storefront pages and basket.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use voyager_core::{Basket, Email};
use voyager_integration_tests::{TestApp, order, product};
use voyager_storefront::middleware::basket::{BASKET_COOKIE_NAME, basket_set_cookie};

fn basket_cookie(basket: &Basket) -> String {
    let value = basket_set_cookie(basket, false);
    value.to_str().unwrap().split(';').next().unwrap().to_string()
}

// ============================================================================
// Health & headers
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let resp = app.get("/health", None).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = TestApp::new();
    let resp = app.get("/", None).await;

    assert_eq!(resp.header("x-frame-options"), Some("DENY"));
    assert!(resp.header("content-security-policy").is_some());
    assert!(resp.header("x-request-id").is_some());
}

// ============================================================================
// Home & listing
// ============================================================================

#[tokio::test]
async fn test_home_renders_category_tiles_and_offers() {
    let app = TestApp::new();
    let resp = app.get("/", None).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(r#"href="/food/?category=pizza""#));
    assert!(resp.body.contains(r#"href="/food/?category=salad""#));
    assert!(resp.body.contains("Margherita Pizza"));
    assert!(resp.body.contains("₹249.00"));
    assert!(resp.body.contains("Greek Salad"));
    // Not an offer
    assert!(!resp.body.contains("Farmhouse Pizza"));
    assert!(resp.body.contains("Sign in"));
}

#[tokio::test]
async fn test_food_listing_filters_by_category_case_insensitively() {
    let app = TestApp::new();
    let resp = app.get("/food/?category=PIZZA", None).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Margherita Pizza"));
    assert!(resp.body.contains("Farmhouse Pizza"));
    assert!(!resp.body.contains("Greek Salad"));
}

#[tokio::test]
async fn test_food_listing_without_category_lists_everything() {
    let app = TestApp::new();
    let resp = app.get("/food/", None).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("All food"));
    assert!(resp.body.contains("Farmhouse Pizza"));
    assert!(resp.body.contains("Greek Salad"));
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_orders_guest_gets_sign_in_prompt_without_query() {
    let app = TestApp::new();
    let resp = app.get("/orders", None).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Please sign in to see your orders."));
    assert_eq!(app.orders.query_count(), 0);
}

#[tokio::test]
async fn test_orders_render_newest_first() {
    let app = TestApp::new();
    let email = Email::parse("u@example.com").unwrap();
    app.orders.insert(&email, order("a", "500", 1_700_000_000));
    app.orders.insert(&email, order("b", "1234.5", 1_700_086_400));

    let cookie = app.sign_in("u@example.com").await;
    let resp = app.get("/orders", Some(&cookie)).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("2 Orders"));
    let b = resp.body.find(r#"id="order-b""#).unwrap();
    let a = resp.body.find(r#"id="order-a""#).unwrap();
    assert!(b < a);
    assert!(resp.body.contains("₹1,234.50"));
    assert!(resp.body.contains("15 Nov 2023"));
    assert_eq!(app.orders.query_count(), 1);
}

#[tokio::test]
async fn test_orders_single_order_heading() {
    let app = TestApp::new();
    let email = Email::parse("solo@example.com").unwrap();
    app.orders.insert(&email, order("only", "99", 1_700_000_000));

    let cookie = app.sign_in("solo@example.com").await;
    let resp = app.get("/orders", Some(&cookie)).await;

    assert!(resp.body.contains("1 Order<"));
}

#[tokio::test]
async fn test_orders_empty_history() {
    let app = TestApp::new();
    let cookie = app.sign_in("new@example.com").await;
    let resp = app.get("/orders", Some(&cookie)).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("have any order yet"));
    assert!(resp.body.contains(r#"<a href="/">Homepage Store</a>"#));
    assert_eq!(app.orders.query_count(), 1);
}

#[tokio::test]
async fn test_orders_are_scoped_to_the_signed_in_user() {
    let app = TestApp::new();
    let other = Email::parse("other@example.com").unwrap();
    app.orders.insert(&other, order("theirs", "10", 1_700_000_000));

    let cookie = app.sign_in("me@example.com").await;
    let resp = app.get("/orders", Some(&cookie)).await;

    assert!(!resp.body.contains("theirs"));
}

// ============================================================================
// Basket
// ============================================================================

#[tokio::test]
async fn test_basket_add_sets_cookie_and_triggers_toast() {
    let app = TestApp::new();
    let resp = app
        .post_form("/basket/add", "product_id=pizza-margherita", None)
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let trigger = resp.header("hx-trigger").unwrap();
    assert!(trigger.contains("Added item to basket"));
    assert!(trigger.contains("basket-updated"));

    let cookie = resp.cookie_pair(BASKET_COOKIE_NAME).unwrap();
    let count = app.get("/basket/count", Some(&cookie)).await;
    assert!(count.body.contains(">1<"));
}

#[tokio::test]
async fn test_basket_add_appends_duplicates_in_order() {
    let app = TestApp::new();
    let mut cookie: Option<String> = None;

    for id in ["salad-greek", "pizza-margherita", "salad-greek"] {
        let resp = app
            .post_form("/basket/add", &format!("product_id={id}"), cookie.as_deref())
            .await;
        cookie = resp.cookie_pair(BASKET_COOKIE_NAME);
    }

    let resp = app.get("/basket", cookie.as_deref()).await;
    assert_eq!(resp.status, StatusCode::OK);
    let salad = resp.body.find("Greek Salad").unwrap();
    let pizza = resp.body.find("Margherita Pizza").unwrap();
    assert!(salad < pizza);
    // 2 x 179.50 + 249
    assert!(resp.body.contains("₹608.00"));
}

#[tokio::test]
async fn test_basket_add_unknown_product_is_not_found() {
    let app = TestApp::new();
    let resp = app.post_form("/basket/add", "product_id=nope", None).await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.cookie_pair(BASKET_COOKIE_NAME).is_none());
}

#[tokio::test]
async fn test_basket_add_without_htmx_redirects() {
    let app = TestApp::new();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/basket/add")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("product_id=salad-greek"))
        .unwrap();

    let resp = app.request(request).await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.header("location"), Some("/basket"));
    assert!(resp.cookie_pair(BASKET_COOKIE_NAME).is_some());
}

#[tokio::test]
async fn test_basket_cookie_drops_unknown_products() {
    let app = TestApp::new();
    let basket = Basket::from_products([
        product("discontinued", "Old Pizza", "100", "Pizza"),
        product("pizza-margherita", "Margherita Pizza", "249", "Pizza"),
    ]);

    let resp = app.get("/basket", Some(&basket_cookie(&basket))).await;

    assert!(resp.body.contains("Margherita Pizza"));
    assert!(!resp.body.contains("Old Pizza"));
    assert!(resp.body.contains("₹249.00"));
}

#[tokio::test]
async fn test_basket_prices_come_from_catalog() {
    let app = TestApp::new();
    // A tampered cookie cannot carry its own price
    let basket = Basket::from_products([product("salad-greek", "Greek Salad", "1", "Salad")]);

    let resp = app.get("/basket", Some(&basket_cookie(&basket))).await;

    assert!(resp.body.contains("₹179.50"));
}

#[tokio::test]
async fn test_basket_remove_by_index() {
    let app = TestApp::new();
    let basket = Basket::from_products([
        product("pizza-margherita", "Margherita Pizza", "249", "Pizza"),
        product("salad-greek", "Greek Salad", "179.50", "Salad"),
    ]);

    let resp = app
        .post_form("/basket/remove", "index=0", Some(&basket_cookie(&basket)))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("hx-trigger"), Some("basket-updated"));
    assert!(!resp.body.contains("Margherita Pizza"));
    assert!(resp.body.contains("Greek Salad"));
}

#[tokio::test]
async fn test_basket_remove_out_of_range_is_noop() {
    let app = TestApp::new();
    let basket = Basket::from_products([product(
        "pizza-margherita",
        "Margherita Pizza",
        "249",
        "Pizza",
    )]);

    let resp = app
        .post_form("/basket/remove", "index=7", Some(&basket_cookie(&basket)))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Margherita Pizza"));
}

#[tokio::test]
async fn test_basket_clear_expires_cookie() {
    let app = TestApp::new();
    let basket = Basket::from_products([product("salad-greek", "Greek Salad", "179.50", "Salad")]);

    let resp = app
        .post_form("/basket/clear", "", Some(&basket_cookie(&basket)))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Your basket is empty"));
    let set_cookie = resp.header("set-cookie").unwrap();
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_basket_add_refused_once_cookie_is_full() {
    let app = TestApp::new();
    let basket = Basket::from_products(
        std::iter::repeat_with(|| product("salad-greek", "Greek Salad", "179.50", "Salad")).take(300),
    );

    let resp = app
        .post_form("/basket/add", "product_id=salad-greek", Some(&basket_cookie(&basket)))
        .await;

    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body, "Your basket is full");
    assert!(resp.header("hx-trigger").is_none());
    assert!(resp.cookie_pair(BASKET_COOKIE_NAME).is_none());
}

#[tokio::test]
async fn test_basket_remove_with_blank_index_is_bad_request() {
    let app = TestApp::new();
    let basket = Basket::from_products([product("salad-greek", "Greek Salad", "179.50", "Salad")]);

    let resp = app
        .post_form("/basket/remove", "index=", Some(&basket_cookie(&basket)))
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_basket_remove_blank_index_falls_back_to_product() {
    let app = TestApp::new();
    let basket = Basket::from_products([
        product("pizza-margherita", "Margherita Pizza", "249", "Pizza"),
        product("salad-greek", "Greek Salad", "179.50", "Salad"),
    ]);

    let resp = app
        .post_form(
            "/basket/remove",
            "index=&product_id=salad-greek",
            Some(&basket_cookie(&basket)),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Margherita Pizza"));
    assert!(!resp.body.contains("Greek Salad"));
}
