//! Order lookup.
//!
//! Reads through the same repository the storefront uses, so it shows exactly
//! what `/orders` would render.
//!
//! # Environment Variables
//!
//! - `FIRESTORE_PROJECT_ID`, `FIRESTORE_DATABASE`, `FIRESTORE_EMULATOR_HOST`,
//!   `GCE_METADATA_HOST` - see the storefront configuration

use thiserror::Error;

use voyager_core::{Email, EmailError, Order};
use voyager_storefront::config::{ConfigError, FirestoreConfig};
use voyager_storefront::db::{FirestoreOrderRepository, OrderRepository, RepositoryError};
use voyager_storefront::firestore::FirestoreClient;

/// Errors from the orders command.
#[derive(Debug, Error)]
pub enum OrdersError {
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Order store error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Print the orders stored for `email`.
///
/// # Errors
///
/// Returns `OrdersError` if the email is invalid, the store is not
/// configured, or the query fails.
pub async fn list(email: &str) -> Result<(), OrdersError> {
    let _ = dotenvy::dotenv();

    let email = Email::parse(email)?;
    let config = FirestoreConfig::from_env()?;
    let repository = FirestoreOrderRepository::new(FirestoreClient::new(&config));

    let orders = repository.list_for_user(&email).await?;

    #[allow(clippy::print_stdout)]
    {
        if orders.is_empty() {
            println!("{email} has no orders");
        } else {
            println!("{}", heading(orders.len()));
            for order in &orders {
                println!("{}", format_row(order));
            }
        }
    }

    Ok(())
}

fn heading(count: usize) -> String {
    if count == 1 {
        "1 Order".to_string()
    } else {
        format!("{count} Orders")
    }
}

fn format_row(order: &Order) -> String {
    let placed = order
        .placed_at()
        .map_or_else(|| "-".to_string(), |dt| dt.format("%d %b %Y").to_string());

    format!(
        "{id}  {placed}  total {total}  shipping {shipping}  {items} item(s)",
        id = order.id,
        total = order.total(),
        shipping = order.shipping(),
        items = order.item_count(),
    )
}

#[cfg(test)]
mod tests {
    use voyager_core::OrderId;

    use super::*;

    #[test]
    fn test_heading() {
        assert_eq!(heading(1), "1 Order");
        assert_eq!(heading(2), "2 Orders");
    }

    #[test]
    fn test_format_row() {
        let order = Order {
            id: OrderId::new("cs_test_1"),
            amount: "1234.5".parse().unwrap_or_default(),
            amount_shipping: "50".parse().unwrap_or_default(),
            images: vec!["a.png".to_string(), "b.png".to_string()],
            timestamp: 1_700_000_000,
        };

        assert_eq!(
            format_row(&order),
            "cs_test_1  14 Nov 2023  total ₹1,234.50  shipping ₹50.00  2 item(s)"
        );
    }
}
