//! Integration test harness for Voyager.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router tests (no external services)
//! cargo test -p voyager-integration-tests
//!
//! # Tests against a running storefront
//! STOREFRONT_BASE_URL=http://localhost:3000 cargo test -p voyager-integration-tests -- --ignored
//! ```
//!
//! [`TestApp`] builds the real router around an in-memory session store, an
//! in-memory order repository and a small fixed catalog.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session};

use voyager_core::{Category, Email, Order, OrderId, Product, ProductId};
use voyager_storefront::app::build_router;
use voyager_storefront::catalog::Catalog;
use voyager_storefront::config::{
    AuthConfig, FIRESTORE_PUBLIC_ENDPOINT, FirestoreAuth, FirestoreConfig, StorefrontConfig,
};
use voyager_storefront::db::InMemoryOrderRepository;
use voyager_storefront::middleware::session::{SESSION_COOKIE_NAME, session_layer};
use voyager_storefront::middleware::set_current_user;
use voyager_storefront::models::CurrentUser;
use voyager_storefront::state::AppState;

/// Identity provider tenant used by the test configuration.
pub const TEST_ISSUER: &str = "https://voyager-test.eu.auth0.com";

/// Client IP sent with every request (the auth routes are rate limited per IP).
pub const TEST_CLIENT_IP: &str = "203.0.113.10";

/// Storefront configuration pointing at nothing real.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/voyager_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        auth: AuthConfig {
            issuer_base_url: TEST_ISSUER.to_string(),
            client_id: "test-client".to_string(),
            client_secret: SecretString::from("k8Q2v9Lr3Zt6Wp1Xn5Bc7Md4"),
        },
        firestore: FirestoreConfig {
            project_id: "voyager-test".to_string(),
            database: "(default)".to_string(),
            endpoint: FIRESTORE_PUBLIC_ENDPOINT.to_string(),
            auth: FirestoreAuth::Emulator,
        },
        catalog_path: PathBuf::from("unused.json"),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A catalog product.
#[must_use]
pub fn product(id: &str, name: &str, price: &str, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Decimal::from_str(price).unwrap(),
        image: format!("https://images.voyager.example/{id}.png"),
        category: Some(category.to_string()),
    }
}

/// Fixed catalog: two pizzas, a salad; the margherita and salad are offers.
#[must_use]
pub fn test_catalog() -> Catalog {
    Catalog::new(
        vec![
            Category {
                name: "Pizza".to_string(),
                image: "https://images.voyager.example/pizza.png".to_string(),
            },
            Category {
                name: "Salad".to_string(),
                image: "https://images.voyager.example/salad.png".to_string(),
            },
        ],
        vec![ProductId::new("pizza-margherita"), ProductId::new("salad-greek")],
        vec![
            product("pizza-margherita", "Margherita Pizza", "249", "Pizza"),
            product("pizza-farmhouse", "Farmhouse Pizza", "399", "Pizza"),
            product("salad-greek", "Greek Salad", "179.50", "Salad"),
        ],
    )
    .unwrap()
}

/// An order as the payment webhook would store it.
#[must_use]
pub fn order(id: &str, amount: &str, timestamp: i64) -> Order {
    Order {
        id: OrderId::new(id),
        amount: Decimal::from_str(amount).unwrap(),
        amount_shipping: Decimal::from_str("40").unwrap(),
        images: vec![format!("https://images.voyager.example/{id}.png")],
        timestamp,
    }
}

/// Buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// A response header as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `name=value` pair of a `Set-Cookie` header, ready to send back.
    #[must_use]
    pub fn cookie_pair(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.starts_with(&format!("{name}=")))
            .map(ToString::to_string)
    }
}

/// The storefront router wired to in-memory backends.
pub struct TestApp {
    pub router: Router,
    pub orders: Arc<InMemoryOrderRepository>,
    pub sessions: MemoryStore,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build a fresh app (fresh sessions, orders and rate limiter).
    #[must_use]
    pub fn new() -> Self {
        let config = test_config();
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/voyager_test")
            .unwrap();
        let orders = Arc::new(InMemoryOrderRepository::new());
        let sessions = MemoryStore::default();

        let state = AppState::with_order_repository(config, pool, test_catalog(), orders.clone());
        let router = build_router(state, session_layer(sessions.clone(), false));

        Self {
            router,
            orders,
            sessions,
        }
    }

    /// Send a request through the router.
    pub async fn request(&self, mut request: Request<Body>) -> TestResponse {
        request
            .headers_mut()
            .insert("x-forwarded-for", TEST_CLIENT_IP.parse().unwrap());

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// `GET uri` with optional cookies.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// HTMX form `POST` with optional cookies.
    pub async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("HX-Request", "true");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.request(builder.body(Body::from(form.to_string())).unwrap())
            .await
    }

    /// Create a signed-in session for `email` and return its cookie pair.
    pub async fn sign_in(&self, email: &str) -> String {
        let session = Session::new(None, Arc::new(self.sessions.clone()), None);
        let user = CurrentUser {
            email: Email::parse(email).unwrap(),
            name: None,
            picture: None,
        };
        set_current_user(&session, &user).await.unwrap();
        session.save().await.unwrap();

        let id = session.id().expect("saved session has an id");
        format!("{SESSION_COOKIE_NAME}={id}")
    }
}
