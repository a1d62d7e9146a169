//! Catalog entries: products and categories.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Route of the category-filtered food listing.
pub const FOOD_LISTING_PATH: &str = "/food/";

/// A product that can be added to the basket.
///
/// Immutable once loaded from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog key.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price in INR.
    pub price: Decimal,
    /// Image URL.
    pub image: String,
    /// Category this product is listed under, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Product {
    /// Whether this product belongs to `category`, compared the way
    /// [`Category::slug`] folds names.
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| fold_name(c) == fold_name(category))
    }
}

/// A browsable food category, shown as a round tile on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Display name, e.g. "Pizza".
    pub name: String,
    /// Image URL.
    pub image: String,
}

impl Category {
    /// Query value used in the listing URL (the lower-cased name).
    #[must_use]
    pub fn slug(&self) -> String {
        fold_name(&self.name)
    }

    /// Whether `name` refers to this category (same folding as [`Self::slug`]).
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.slug() == fold_name(name)
    }

    /// Target of a click on this category's tile.
    ///
    /// ```
    /// use voyager_core::Category;
    ///
    /// let pizza = Category { name: "Pizza".into(), image: "/static/img/pizza.png".into() };
    /// assert_eq!(pizza.listing_href(), "/food/?category=pizza");
    /// ```
    #[must_use]
    pub fn listing_href(&self) -> String {
        format!("{FOOD_LISTING_PATH}?category={}", self.slug())
    }
}

/// Case folding shared by category links and category lookups.
fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn category(name: &str) -> Category {
        Category {
            name: name.to_owned(),
            image: format!("/static/img/{name}.png"),
        }
    }

    #[test]
    fn test_listing_href_lower_cases_name() {
        assert_eq!(category("Pizza").listing_href(), "/food/?category=pizza");
        assert_eq!(category("BURGER").listing_href(), "/food/?category=burger");
    }

    #[test]
    fn test_in_category_ignores_case() {
        let product = Product {
            id: ProductId::new("margherita"),
            name: "Margherita".to_owned(),
            price: dec!(249),
            image: "/static/img/margherita.png".to_owned(),
            category: Some("Pizza".to_owned()),
        };

        assert!(product.in_category("pizza"));
        assert!(product.in_category("PIZZA"));
        assert!(!product.in_category("burger"));
    }

    #[test]
    fn test_uncategorised_product_matches_nothing() {
        let product = Product {
            id: ProductId::new("paracetamol"),
            name: "Paracetamol".to_owned(),
            price: dec!(35.5),
            image: "/static/img/paracetamol.png".to_owned(),
            category: None,
        };

        assert!(!product.in_category(""));
    }

    #[test]
    fn test_non_ascii_category_links_to_its_products() {
        let medicine = category("Ärzneimittel");
        let product = Product {
            id: ProductId::new("ibuprofen"),
            name: "Ibuprofen 400mg".to_owned(),
            price: dec!(48),
            image: "/static/img/ibuprofen.png".to_owned(),
            category: Some("ÄRZNEIMITTEL".to_owned()),
        };

        assert_eq!(medicine.listing_href(), "/food/?category=ärzneimittel");
        assert!(product.in_category(&medicine.slug()));
        assert!(medicine.matches("ärzneimittel"));
    }
}
