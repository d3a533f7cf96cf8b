//! Mirror store
//!
//! A denormalized copy of the product collection plus the product currently
//! selected for editing. It is written only through the narrow operations
//! below, from endpoint success paths and explicit selection changes.

use log::trace;
use mobilemart_products::Product;
use std::sync::Arc;
use tokio::sync::watch;

/// Everything the mirror store holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductsState {
    pub products: Vec<Product>,
    pub selected: Option<Product>,
}

/// Shared handle to the mirror state; clones observe the same state.
#[derive(Debug, Clone)]
pub struct MirrorStore {
    state: Arc<watch::Sender<ProductsState>>,
}

impl Default for MirrorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MirrorStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ProductsState::default());
        Self {
            state: Arc::new(state),
        }
    }

    /// Replace the whole collection, e.g. after a list fetch.
    pub fn replace_all(&self, products: Vec<Product>) {
        trace!("Mirror: replace_all ({} products)", products.len());
        self.state.send_modify(|state| state.products = products);
    }

    /// Replace the product with the same id, or append it when it is new.
    pub fn upsert(&self, product: Product) {
        trace!("Mirror: upsert product {}", product.id);
        self.state.send_modify(|state| {
            match state.products.iter_mut().find(|p| p.id == product.id) {
                Some(existing) => *existing = product,
                None => state.products.push(product),
            }
        });
    }

    pub fn remove(&self, id: u64) {
        trace!("Mirror: remove product {}", id);
        self.state
            .send_modify(|state| state.products.retain(|p| p.id != id));
    }

    pub fn set_selected(&self, product: Option<Product>) {
        self.state.send_modify(|state| state.selected = product);
    }

    pub fn clear_selected(&self) {
        self.set_selected(None);
    }

    pub fn snapshot(&self) -> ProductsState {
        self.state.borrow().clone()
    }

    pub fn products(&self) -> Vec<Product> {
        self.state.borrow().products.clone()
    }

    pub fn selected(&self) -> Option<Product> {
        self.state.borrow().selected.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProductsState> {
        self.state.subscribe()
    }
}
