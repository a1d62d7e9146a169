//! The basket store.
//!
//! A basket is an ordered sequence of items. Every add appends a new entry,
//! so two adds of the same product are two entries (two units). Removal is by
//! position or by the first entry matching a product. All operations are
//! total: out-of-range or unknown removals leave the basket untouched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;

/// One unit of a product in the basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasketItem {
    product: Product,
}

impl BasketItem {
    /// The product this entry refers to.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Key of the referenced product.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product.id
    }
}

impl From<Product> for BasketItem {
    fn from(product: Product) -> Self {
        Self { product }
    }
}

/// Products grouped for display: one row per distinct product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketLine {
    /// Index of the first entry for this product (used for removal).
    pub first_index: usize,
    pub product: Product,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// Client-owned shopping basket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Basket {
    items: Vec<BasketItem>,
}

impl Basket {
    /// Create an empty basket.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Rebuild a basket from products in order.
    #[must_use]
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            items: products.into_iter().map(BasketItem::from).collect(),
        }
    }

    /// Append a product. Identical products are not merged.
    pub fn add(&mut self, product: Product) {
        self.items.push(BasketItem::from(product));
    }

    /// Remove the entry at `index`, returning it if it existed.
    pub fn remove_at(&mut self, index: usize) -> Option<BasketItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Remove the first entry referring to `id`, returning it if found.
    pub fn remove_product(&mut self, id: &ProductId) -> Option<BasketItem> {
        let index = self.items.iter().position(|item| item.product_id() == id)?;
        self.remove_at(index)
    }

    /// Empty the basket.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of entries (units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the basket has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn items(&self) -> &[BasketItem] {
        &self.items
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &BasketItem> {
        self.items.iter()
    }

    /// Product keys in insertion order, duplicates included.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|item| item.product_id().clone()).collect()
    }

    /// Sum of all entry prices.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|item| item.product.price).sum()
    }

    /// Group entries by product, keeping the order in which each product
    /// was first added.
    #[must_use]
    pub fn lines(&self) -> Vec<BasketLine> {
        let mut lines: Vec<BasketLine> = Vec::new();

        for (index, item) in self.items.iter().enumerate() {
            if let Some(line) = lines
                .iter_mut()
                .find(|line| line.product.id == item.product.id)
            {
                line.quantity += 1;
                line.line_total += item.product.price;
            } else {
                lines.push(BasketLine {
                    first_index: index,
                    product: item.product.clone(),
                    quantity: 1,
                    line_total: item.product.price,
                });
            }
        }

        lines
    }
}

impl<'a> IntoIterator for &'a Basket {
    type Item = &'a BasketItem;
    type IntoIter = std::slice::Iter<'a, BasketItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn product(id: &str, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_uppercase(),
            price,
            image: format!("https://images.example.com/{id}.png"),
            category: None,
        }
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut basket = Basket::new();
        let ids = ["salad", "burger", "pizza", "salad", "juice"];
        for id in ids {
            basket.add(product(id, dec!(100)));
        }

        assert_eq!(basket.len(), ids.len());
        let stored: Vec<_> = basket.iter().map(|i| i.product_id().as_str()).collect();
        assert_eq!(stored, ids);
    }

    #[test]
    fn test_duplicates_are_separate_entries() {
        let mut basket = Basket::new();
        basket.add(product("pizza", dec!(249)));
        basket.add(product("pizza", dec!(249)));

        assert_eq!(basket.len(), 2);
        assert_eq!(basket.total(), dec!(498));
    }

    #[test]
    fn test_remove_at_out_of_range_is_noop() {
        let mut basket = Basket::from_products([product("pizza", dec!(249))]);

        assert!(basket.remove_at(5).is_none());
        assert_eq!(basket.len(), 1);
    }

    #[test]
    fn test_remove_at_shifts_following_entries() {
        let mut basket = Basket::from_products([
            product("a", dec!(1)),
            product("b", dec!(2)),
            product("c", dec!(3)),
        ]);

        let removed = basket.remove_at(1).unwrap();
        assert_eq!(removed.product_id().as_str(), "b");
        assert_eq!(
            basket.product_ids(),
            vec![ProductId::new("a"), ProductId::new("c")]
        );
    }

    #[test]
    fn test_remove_product_takes_first_match_only() {
        let mut basket = Basket::from_products([
            product("pizza", dec!(249)),
            product("salad", dec!(120)),
            product("pizza", dec!(249)),
        ]);

        basket.remove_product(&ProductId::new("pizza"));
        assert_eq!(
            basket.product_ids(),
            vec![ProductId::new("salad"), ProductId::new("pizza")]
        );

        assert!(basket.remove_product(&ProductId::new("sushi")).is_none());
        assert_eq!(basket.len(), 2);
    }

    #[test]
    fn test_total_of_empty_basket_is_zero() {
        let basket = Basket::new();
        assert!(basket.is_empty());
        assert_eq!(basket.total(), Decimal::ZERO);
    }

    #[test]
    fn test_lines_group_by_first_appearance() {
        let basket = Basket::from_products([
            product("salad", dec!(120)),
            product("pizza", dec!(249.50)),
            product("salad", dec!(120)),
        ]);

        let lines = basket.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product.id.as_str(), "salad");
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].line_total, dec!(240));
        assert_eq!(lines[0].first_index, 0);
        assert_eq!(lines[1].product.id.as_str(), "pizza");
        assert_eq!(lines[1].first_index, 1);
    }

    #[test]
    fn test_clear_empties_basket() {
        let mut basket = Basket::from_products([product("a", dec!(1))]);
        basket.clear();
        assert!(basket.is_empty());
    }
}
