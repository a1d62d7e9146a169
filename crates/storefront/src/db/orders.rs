//! Order history repository.
//!
//! Orders live in the document store under `users/{email}/orders`, one
//! document per completed checkout. The storefront only ever reads them.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::instrument;

use voyager_core::{Email, Order};

use super::RepositoryError;
use crate::firestore::{Direction, FirestoreClient, StructuredQuery, convert_order};

/// Top-level collection keyed by user email.
pub const USERS_COLLECTION: &str = "users";
/// Per-user sub-collection of orders.
pub const ORDERS_COLLECTION: &str = "orders";
/// Field orders are sorted on.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Read access to a user's past orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// All orders of `email`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be queried or a record
    /// cannot be decoded. There is no retry and no partial result.
    async fn list_for_user(&self, email: &Email) -> Result<Vec<Order>, RepositoryError>;
}

// =============================================================================
// Firestore
// =============================================================================

/// Order repository backed by Firestore.
#[derive(Clone)]
pub struct FirestoreOrderRepository {
    client: FirestoreClient,
}

impl FirestoreOrderRepository {
    /// Create a repository over an existing client.
    #[must_use]
    pub const fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// The query issued for every user.
    #[must_use]
    pub fn orders_query() -> StructuredQuery {
        StructuredQuery::collection(ORDERS_COLLECTION).order_by(TIMESTAMP_FIELD, Direction::Descending)
    }
}

#[async_trait]
impl OrderRepository for FirestoreOrderRepository {
    #[instrument(skip(self), fields(email = %email))]
    async fn list_for_user(&self, email: &Email) -> Result<Vec<Order>, RepositoryError> {
        let documents = self
            .client
            .run_query(&[USERS_COLLECTION, email.as_str()], Self::orders_query())
            .await?;

        let orders = documents
            .iter()
            .map(convert_order)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = orders.len(), "Loaded order history");
        Ok(orders)
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Order repository holding orders in process memory.
///
/// Used by tests and local development without a document store. Counts the
/// queries it serves so callers can assert that no lookup happened.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<Email, Vec<Order>>>,
    queries: AtomicUsize,
}

impl InMemoryOrderRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an order for `email`, as the payment webhook would.
    pub fn insert(&self, email: &Email, order: Order) {
        let mut orders = self
            .orders
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        orders.entry(email.clone()).or_default().push(order);
    }

    /// Number of `list_for_user` calls served so far.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn list_for_user(&self, email: &Email) -> Result<Vec<Order>, RepositoryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let mut orders = self
            .orders
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(email)
            .cloned()
            .unwrap_or_default();

        Order::sort_newest_first(&mut orders);
        Ok(orders)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;
    use voyager_core::OrderId;

    use super::*;

    fn order(id: &str, timestamp: i64) -> Order {
        Order {
            id: OrderId::new(id),
            amount: dec!(300),
            amount_shipping: dec!(40),
            images: Vec::new(),
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_in_memory_returns_newest_first() {
        let repo = InMemoryOrderRepository::new();
        let email = Email::parse("u@example.com").unwrap();
        repo.insert(&email, order("a", 1_700_000_000));
        repo.insert(&email, order("b", 1_700_000_100));

        let orders = repo.list_for_user(&email).await.unwrap();

        assert_eq!(orders[0].id.as_str(), "b");
        assert_eq!(orders[1].id.as_str(), "a");
        assert_eq!(repo.query_count(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_isolates_users() {
        let repo = InMemoryOrderRepository::new();
        let alice = Email::parse("alice@example.com").unwrap();
        let bob = Email::parse("bob@example.com").unwrap();
        repo.insert(&alice, order("a", 1));

        assert!(repo.list_for_user(&bob).await.unwrap().is_empty());
    }

    #[test]
    fn test_orders_query_sorts_by_timestamp_descending() {
        let query = serde_json::to_value(FirestoreOrderRepository::orders_query()).unwrap();

        assert_eq!(
            query,
            json!({
                "from": [{"collectionId": "orders"}],
                "orderBy": [{"field": {"fieldPath": "timestamp"}, "direction": "DESCENDING"}]
            })
        );
    }
}
