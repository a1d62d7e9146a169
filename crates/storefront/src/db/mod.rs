//! Data access for the storefront.
//!
//! # Stores
//!
//! - **Order store** (Firestore): read-only per-user order history under
//!   `users/{email}/orders`, written by the payment webhook.
//! - **Session store** (`PostgreSQL`, `voyager_storefront`): tower-sessions
//!   table only. Baskets are never stored server-side.
//!
//! # Migrations
//!
//! The session table is created by:
//! ```bash
//! cargo run -p voyager-cli -- migrate
//! ```

pub mod orders;

pub use orders::{FirestoreOrderRepository, InMemoryOrderRepository, OrderRepository};

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::firestore::FirestoreError;

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The order store could not be queried.
    #[error("order store error: {0}")]
    OrderStore(#[source] FirestoreError),

    /// A stored record could not be decoded.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl From<FirestoreError> for RepositoryError {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::Decode { .. } => Self::DataCorruption(err.to_string()),
            other => Self::OrderStore(other),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
