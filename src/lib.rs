//! MobileMart Admin Client Library
//!
//! A headless admin client for the MobileMart product catalog: REST request
//! layer, tagged query cache, mirror store and the view-model behind the
//! catalog page (search, add/edit form, confirmed delete).

pub mod api;
pub mod config;
pub mod error;
pub mod store;
pub mod view;

use reqwest::Client;
use std::sync::Arc;

use crate::api::ProductsApi;
use crate::config::{ClientOptions, Theme};
use crate::error::Result;
use crate::store::MirrorStore;
use crate::view::ProductsPage;

pub use mobilemart_products::{Product, ProductDraft, ProductsBackend, ProductsClient, ProductsError};

/// The main entry point for the admin client
pub struct MobileMart {
    /// Options the HTTP backend was built from; `None` for a caller-supplied backend
    pub options: Option<ClientOptions>,
    theme: Theme,
    products: ProductsApi,
}

impl MobileMart {
    /// Create a new client against `base_url`
    ///
    /// # Example
    ///
    /// ```
    /// use mobilemart_admin::MobileMart;
    ///
    /// let admin = MobileMart::new("http://localhost:4000").unwrap();
    /// ```
    pub fn new(base_url: &str) -> Result<Self> {
        Self::new_with_options(ClientOptions::default().with_base_url(base_url))
    }

    /// Create a new client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use mobilemart_admin::{MobileMart, config::{ClientOptions, Theme}};
    ///
    /// let options = ClientOptions::default()
    ///     .with_base_url("http://localhost:4000")
    ///     .with_theme(Theme::Dark);
    /// let admin = MobileMart::new_with_options(options).unwrap();
    /// ```
    pub fn new_with_options(options: ClientOptions) -> Result<Self> {
        let backend = http_backend(&options)?;
        let mut admin = Self::with_backend(Arc::new(backend), options.theme);
        admin.options = Some(options);
        Ok(admin)
    }

    /// Create a client from `MOBILEMART_API_URL`
    pub fn from_env() -> Result<Self> {
        Self::new_with_options(ClientOptions::from_env()?)
    }

    /// Create a client over any [`ProductsBackend`]
    ///
    /// Transport settings belong to the backend, so only the theme is taken here.
    pub fn with_backend(backend: Arc<dyn ProductsBackend>, theme: Theme) -> Self {
        Self {
            options: None,
            theme,
            products: ProductsApi::new(backend, MirrorStore::new()),
        }
    }

    /// Initial theme of pages created from this client
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Product endpoints (cached queries and mutations)
    pub fn products(&self) -> &ProductsApi {
        &self.products
    }

    /// The mirror store fed by the product endpoints
    pub fn store(&self) -> &MirrorStore {
        self.products.store()
    }

    /// A fresh catalog page bound to this client's cache and store
    pub fn products_page(&self) -> ProductsPage {
        ProductsPage::new(self.products.clone(), self.theme)
    }
}

fn http_backend(options: &ClientOptions) -> Result<ProductsClient> {
    let client = ProductsClient::new(&options.base_url, Client::new())?
        .with_request_timeout(options.request_timeout);
    Ok(client)
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::{ClientOptions, Theme};
    pub use crate::error::Error;
    pub use crate::view::{FormField, ListView, ProductsPage};
    pub use crate::MobileMart;
    pub use mobilemart_products::{Product, ProductDraft};
}
