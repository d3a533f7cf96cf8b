//! Catalog page view-model

use super::{filter_products, FormMode, ListView, ProductCard, ProductForm, EMPTY_MESSAGE};
use crate::api::{ProductsApi, ProductsQueryState, ProductsSubscription};
use crate::config::Theme;
use crate::error::{Error, Result};
use log::debug;
use mobilemart_products::Product;
use mobilemart_query::QueryStatus;

/// A delete waiting for the user to confirm or cancel
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteConfirmation {
    pub product: Product,
}

impl DeleteConfirmation {
    pub fn prompt(&self) -> &'static str {
        "Are you sure you want to delete this product?"
    }
}

/// State behind the product catalog screen
pub struct ProductsPage {
    api: ProductsApi,
    theme: Theme,
    search: String,
    subscription: Option<ProductsSubscription>,
    form: Option<ProductForm>,
    pending_delete: Option<DeleteConfirmation>,
}

impl ProductsPage {
    pub fn new(api: ProductsApi, theme: Theme) -> Self {
        Self {
            api,
            theme,
            search: String::new(),
            subscription: None,
            form: None,
            pending_delete: None,
        }
    }

    /// Start watching the product list. Calling it again is a no-op.
    pub async fn load(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(self.api.subscribe_products().await);
        }
    }

    /// Wait until the list query is not loading and return its state.
    pub async fn settled(&mut self) -> ProductsQueryState {
        self.load().await;
        match self.subscription.as_mut() {
            Some(subscription) => subscription.settled().await,
            None => ProductsQueryState::default(),
        }
    }

    pub fn query_state(&self) -> ProductsQueryState {
        self.subscription
            .as_ref()
            .map(|subscription| subscription.state())
            .unwrap_or_default()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggle();
        self.theme
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Products matching the current search
    pub fn visible_products(&self) -> Vec<Product> {
        let state = self.query_state();
        let products = state.data.unwrap_or_default();
        filter_products(&products, &self.search)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn list_view(&self) -> ListView {
        let state = self.query_state();
        if state.is_loading() || state.status == QueryStatus::Uninitialized {
            return ListView::Loading;
        }

        let Some(products) = state.data else {
            let message = state
                .error
                .map(|err| err.to_string())
                .unwrap_or_else(|| "Failed to load products".to_string());
            return ListView::Error(message);
        };

        let cards: Vec<_> = filter_products(&products, &self.search)
            .into_iter()
            .map(ProductCard::from)
            .collect();
        if cards.is_empty() {
            ListView::Empty(EMPTY_MESSAGE)
        } else {
            ListView::Products(cards)
        }
    }

    pub fn open_add(&mut self) {
        self.api.store().clear_selected();
        self.form = Some(ProductForm::new());
    }

    pub fn open_edit(&mut self, product: &Product) {
        self.api.store().set_selected(Some(product.clone()));
        self.form = Some(ProductForm::edit(product));
    }

    pub fn form(&self) -> Option<&ProductForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut ProductForm> {
        self.form.as_mut()
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.api.store().clear_selected();
    }

    /// Validate the open form and create or update accordingly.
    ///
    /// Invalid input never reaches the network. A failed request leaves the
    /// form open so the user can resubmit.
    pub async fn submit_form(&mut self) -> Result<Product> {
        let (mode, draft) = {
            let form = self
                .form
                .as_mut()
                .ok_or_else(|| Error::no_pending_action("no form is open"))?;
            (form.mode(), form.submit()?)
        };

        let saved = match mode {
            FormMode::Add => self.api.add_product(&draft).await?,
            FormMode::Edit { id } => self.api.update_product(&Product::new(id, draft)).await?,
        };

        debug!("Saved product {}, closing form", saved.id);
        self.close_form();
        Ok(saved)
    }

    /// Ask for confirmation before deleting `product`; nothing is sent yet.
    pub fn request_delete(&mut self, product: &Product) {
        self.pending_delete = Some(DeleteConfirmation {
            product: product.clone(),
        });
    }

    pub fn pending_delete(&self) -> Option<&DeleteConfirmation> {
        self.pending_delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the product awaiting confirmation. On failure the dialog stays open.
    pub async fn confirm_delete(&mut self) -> Result<()> {
        let id = self
            .pending_delete
            .as_ref()
            .map(|pending| pending.product.id)
            .ok_or_else(|| Error::no_pending_action("no delete is awaiting confirmation"))?;
        if id == 0 {
            self.pending_delete = None;
            return Err(Error::no_pending_action("product was never saved"));
        }

        self.api.delete_product(id).await?;
        self.pending_delete = None;
        Ok(())
    }
}
