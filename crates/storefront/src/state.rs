//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::db::{FirestoreOrderRepository, OrderRepository};
use crate::firestore::FirestoreClient;
use crate::services::auth::IdentityClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: Catalog,
    orders: Arc<dyn OrderRepository>,
    identity: IdentityClient,
}

impl AppState {
    /// Create the production state: orders come from Firestore.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool, catalog: Catalog) -> Self {
        let orders = Arc::new(FirestoreOrderRepository::new(FirestoreClient::new(
            &config.firestore,
        )));
        Self::with_order_repository(config, pool, catalog, orders)
    }

    /// Create a state around an arbitrary order repository.
    #[must_use]
    pub fn with_order_repository(
        config: StorefrontConfig,
        pool: PgPool,
        catalog: Catalog,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        let identity = IdentityClient::new(&config.auth);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                orders,
                identity,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the session database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get the order history repository.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderRepository {
        self.inner.orders.as_ref()
    }

    /// Get the identity provider client.
    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    /// Callback URL registered with the identity provider.
    #[must_use]
    pub fn auth_callback_url(&self) -> String {
        format!("{}/api/auth/callback", self.inner.config.base_url)
    }
}
