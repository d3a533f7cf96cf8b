//! Product endpoints
//!
//! Ties the request layer, the query cache and the mirror store together.
//! Every successful fetch or mutation is pushed into the mirror store; every
//! successful mutation invalidates the `Products` tag.

use crate::error::Result;
use crate::store::MirrorStore;
use log::{error, info};
use mobilemart_products::{Product, ProductDraft, ProductsBackend, ProductsError};
use mobilemart_query::{fetcher, Fetcher, QueryCache, QueryKey, QueryState, QuerySubscription, Tag};
use std::sync::Arc;

/// Tag carried by every query that reads products
pub const PRODUCTS_TAG: Tag = Tag::new("Products");

/// Cache key of the product list
pub const GET_PRODUCTS: &str = "getProducts";

pub type ProductsCache = QueryCache<Vec<Product>, ProductsError>;
pub type ProductsQueryState = QueryState<Vec<Product>, ProductsError>;
pub type ProductsSubscription = QuerySubscription<Vec<Product>, ProductsError>;

/// Product endpoints backed by a shared cache and mirror store
#[derive(Clone)]
pub struct ProductsApi {
    backend: Arc<dyn ProductsBackend>,
    cache: ProductsCache,
    store: MirrorStore,
}

impl ProductsApi {
    pub fn new(backend: Arc<dyn ProductsBackend>, store: MirrorStore) -> Self {
        Self {
            backend,
            cache: ProductsCache::new(),
            store,
        }
    }

    pub fn products_key() -> QueryKey {
        QueryKey::endpoint(GET_PRODUCTS)
    }

    pub fn store(&self) -> &MirrorStore {
        &self.store
    }

    pub fn cache(&self) -> &ProductsCache {
        &self.cache
    }

    // Each run of the list request mirrors its result, including background refetches.
    fn list_fetcher(&self) -> Fetcher<Vec<Product>, ProductsError> {
        let backend = Arc::clone(&self.backend);
        let store = self.store.clone();
        fetcher(move || {
            let backend = Arc::clone(&backend);
            let store = store.clone();
            async move {
                match backend.list().await {
                    Ok(products) => {
                        store.replace_all(products.clone());
                        Ok(products)
                    }
                    Err(err) => {
                        error!("Failed to fetch products: {}", err);
                        Err(err)
                    }
                }
            }
        })
    }

    /// `GET /products`, served from the cache while fresh
    pub async fn get_products(&self) -> Result<Vec<Product>> {
        let products = self
            .cache
            .query(Self::products_key(), &[PRODUCTS_TAG], self.list_fetcher())
            .await?;
        Ok(products)
    }

    /// Watch the product list; it refetches itself after every product mutation.
    pub async fn subscribe_products(&self) -> ProductsSubscription {
        self.cache
            .subscribe(Self::products_key(), &[PRODUCTS_TAG], self.list_fetcher())
            .await
    }

    pub async fn products_state(&self) -> ProductsQueryState {
        self.cache
            .state(&Self::products_key())
            .await
            .unwrap_or_default()
    }

    /// Manual refetch of the product list
    pub async fn refetch_products(&self) -> Result<Vec<Product>> {
        match self.cache.refetch(&Self::products_key()).await {
            Some(result) => Ok(result?),
            None => self.get_products().await,
        }
    }

    /// `POST /products`
    ///
    /// The request, the mirror patch and the invalidation finish even if the
    /// caller stops waiting; the same holds for the other mutations.
    pub async fn add_product(&self, draft: &ProductDraft) -> Result<Product> {
        let backend = Arc::clone(&self.backend);
        let draft = draft.clone();
        let store = self.store.clone();
        let created = self
            .cache
            .mutate(
                &[PRODUCTS_TAG],
                async move { backend.create(&draft).await },
                move |created: &Product| {
                    info!("Added product {} ({})", created.id, created.name());
                    store.upsert(created.clone());
                },
            )
            .await
            .map_err(|err| {
                error!("Failed to add product: {}", err);
                err
            })?;
        Ok(created)
    }

    /// `PUT /products/:id`
    pub async fn update_product(&self, product: &Product) -> Result<Product> {
        let backend = Arc::clone(&self.backend);
        let product = product.clone();
        let store = self.store.clone();
        let updated = self
            .cache
            .mutate(
                &[PRODUCTS_TAG],
                async move { backend.update(&product).await },
                move |updated: &Product| {
                    info!("Updated product {}", updated.id);
                    store.upsert(updated.clone());
                },
            )
            .await
            .map_err(|err| {
                error!("Failed to update product: {}", err);
                err
            })?;
        Ok(updated)
    }

    /// `DELETE /products/:id`
    pub async fn delete_product(&self, id: u64) -> Result<()> {
        let backend = Arc::clone(&self.backend);
        let store = self.store.clone();
        self.cache
            .mutate(
                &[PRODUCTS_TAG],
                async move { backend.delete(id).await },
                move |_: &()| {
                    info!("Deleted product {}", id);
                    store.remove(id);
                },
            )
            .await
            .map_err(|err| {
                error!("Failed to delete product: {}", err);
                err
            })?;
        Ok(())
    }
}
