//! Product catalog loaded from a JSON file at startup.
//!
//! The catalog is the upstream source of product names, prices and images.
//! It is immutable for the lifetime of the process.
//!
//! # File Format
//!
//! ```json
//! {
//!   "categories": [{ "name": "Pizza", "image": "/static/img/categories/pizza.png" }],
//!   "offers": ["margherita"],
//!   "products": [
//!     { "id": "margherita", "name": "Margherita", "price": "249.00",
//!       "image": "/static/img/food/margherita.png", "category": "Pizza" }
//!   ]
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use voyager_core::{Basket, Category, Product, ProductId};

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate product id: {0}")]
    DuplicateProduct(ProductId),
    #[error("offer references unknown product: {0}")]
    UnknownOffer(ProductId),
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    offers: Vec<ProductId>,
    #[serde(default)]
    products: Vec<Product>,
}

/// In-memory catalog, cheaply cloneable.
#[derive(Debug, Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

#[derive(Debug)]
struct CatalogInner {
    categories: Vec<Category>,
    offers: Vec<ProductId>,
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Load and validate a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or fails validation.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;

        tracing::info!(
            path = %path.display(),
            products = catalog.inner.products.len(),
            categories = catalog.inner.categories.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse and validate catalog JSON.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on malformed JSON, duplicate product IDs,
    /// negative prices or offers naming unknown products.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.categories, file.offers, file.products)
    }

    /// Build a catalog from parts.
    ///
    /// # Errors
    ///
    /// Same validation as [`Catalog::from_json`].
    pub fn new(
        categories: Vec<Category>,
        offers: Vec<ProductId>,
        products: Vec<Product>,
    ) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if product.price.is_sign_negative() {
                return Err(CatalogError::NegativePrice(product.id.clone()));
            }
            if index.insert(product.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateProduct(product.id.clone()));
            }
        }

        if let Some(unknown) = offers.iter().find(|id| !index.contains_key(*id)) {
            return Err(CatalogError::UnknownOffer(unknown.clone()));
        }

        Ok(Self {
            inner: Arc::new(CatalogInner {
                categories,
                offers,
                products,
                index,
            }),
        })
    }

    /// Home page category tiles.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.inner.categories
    }

    /// Products featured as offers, in file order.
    #[must_use]
    pub fn offers(&self) -> Vec<&Product> {
        self.inner
            .offers
            .iter()
            .filter_map(|id| self.product(id))
            .collect()
    }

    /// All products.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.inner.products
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.inner
            .index
            .get(id)
            .and_then(|&position| self.inner.products.get(position))
    }

    /// Products listed under `category` (case-insensitive), or every product
    /// when no category is given.
    #[must_use]
    pub fn products_in(&self, category: Option<&str>) -> Vec<&Product> {
        match category {
            Some(name) => self
                .inner
                .products
                .iter()
                .filter(|p| p.in_category(name))
                .collect(),
            None => self.inner.products.iter().collect(),
        }
    }

    /// Category matching `name` (case-insensitive).
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.inner.categories.iter().find(|c| c.matches(name))
    }

    /// Rebuild a basket from product IDs, dropping IDs the catalog no
    /// longer knows. Order and duplicates are preserved.
    #[must_use]
    pub fn resolve_basket(&self, ids: &[ProductId]) -> Basket {
        let mut unknown = HashSet::new();
        let basket = Basket::from_products(ids.iter().filter_map(|id| {
            let product = self.product(id).cloned();
            if product.is_none() {
                unknown.insert(id.as_str());
            }
            product
        }));

        if !unknown.is_empty() {
            tracing::debug!(?unknown, "Dropped unknown products from basket");
        }
        basket
    }
}
