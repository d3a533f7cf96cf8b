//! MobileMart catalog REST client
//!
//! This crate provides the product model and the request layer for the
//! catalog service: list, create, update and delete, one HTTP round trip each.

pub mod error;
pub mod fetch;
pub mod models;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub use error::{ProductsError, Result};
use fetch::Fetch;
pub use models::{Product, ProductDraft};

/// The four catalog operations the rest of the application depends on.
#[async_trait]
pub trait ProductsBackend: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>>;
    async fn create(&self, draft: &ProductDraft) -> Result<Product>;
    async fn update(&self, product: &Product) -> Result<Product>;
    async fn delete(&self, id: u64) -> Result<()>;
}

/// REST client for `{base_url}/products`
#[derive(Debug, Clone)]
pub struct ProductsClient {
    base_url: Url,
    http_client: Client,
    request_timeout: Option<Duration>,
}

impl ProductsClient {
    /// Create a new client rooted at `base_url`
    pub fn new(base_url: &str, http_client: Client) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            http_client,
            request_timeout: None,
        })
    }

    /// Apply a per-request timeout. There is none by default.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn products_url(&self, id: Option<u64>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ProductsError::UrlParseError(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            segments.pop_if_empty().push("products");
            if let Some(id) = id {
                segments.push(&id.to_string());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ProductsBackend for ProductsClient {
    async fn list(&self) -> Result<Vec<Product>> {
        let url = self.products_url(None)?;
        Fetch::get(&self.http_client, url)
            .timeout(self.request_timeout)
            .execute()
            .await
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product> {
        let url = self.products_url(None)?;
        Fetch::post(&self.http_client, url)
            .timeout(self.request_timeout)
            .json(draft)?
            .execute()
            .await
    }

    async fn update(&self, product: &Product) -> Result<Product> {
        if product.is_draft() {
            return Err(ProductsError::InvalidParameters(
                "cannot update a product without an id".to_string(),
            ));
        }

        let url = self.products_url(Some(product.id))?;
        Fetch::put(&self.http_client, url)
            .timeout(self.request_timeout)
            .json(&product.draft)?
            .execute()
            .await
    }

    async fn delete(&self, id: u64) -> Result<()> {
        let url = self.products_url(Some(id))?;
        Fetch::delete(&self.http_client, url)
            .timeout(self.request_timeout)
            .execute_empty()
            .await
    }
}
