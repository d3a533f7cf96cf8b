//! Headless view layer
//!
//! Render-ready state for the catalog page: the filtered list, the add/edit
//! form and the delete confirmation. Nothing here draws; a front-end reads
//! these values and forwards user input back.

pub mod card;
pub mod form;
pub mod page;

pub use card::ProductCard;
pub use form::{FieldErrors, FormField, FormMode, ProductForm};
pub use page::{DeleteConfirmation, ProductsPage};

use mobilemart_products::Product;

/// Shown when the filtered list is empty and nothing is loading
pub const EMPTY_MESSAGE: &str = "No products available.";

/// What the product list area shows
#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    /// The first load is still outstanding
    Loading,
    /// The first load failed and there is nothing cached to show
    Error(String),
    /// Loaded, but nothing matches
    Empty(&'static str),
    Products(Vec<ProductCard>),
}

/// Case-insensitive substring match of `search` against product names
pub fn filter_products<'a>(products: &'a [Product], search: &str) -> Vec<&'a Product> {
    let needle = search.to_lowercase();
    products
        .iter()
        .filter(|product| product.name().to_lowercase().contains(&needle))
        .collect()
}
