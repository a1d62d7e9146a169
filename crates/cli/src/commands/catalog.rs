//! Catalog validation.

use std::path::Path;

use voyager_storefront::catalog::{Catalog, CatalogError};

/// Load `path` with the storefront's validation rules and print a summary.
///
/// # Errors
///
/// Returns `CatalogError` if the file is unreadable or invalid.
pub fn check(path: &Path) -> Result<(), CatalogError> {
    let catalog = Catalog::load(path)?;

    let uncategorized = catalog
        .products()
        .iter()
        .filter(|p| p.category.is_none())
        .count();
    let empty_categories: Vec<&str> = catalog
        .categories()
        .iter()
        .filter(|c| catalog.products_in(Some(&c.name)).is_empty())
        .map(|c| c.name.as_str())
        .collect();

    #[allow(clippy::print_stdout)]
    {
        println!(
            "{}: {} products, {} categories, {} offers",
            path.display(),
            catalog.products().len(),
            catalog.categories().len(),
            catalog.offers().len()
        );
        if uncategorized > 0 {
            println!("warning: {uncategorized} product(s) have no category");
        }
        for name in empty_categories {
            println!("warning: category {name} has no products");
        }
    }

    Ok(())
}
