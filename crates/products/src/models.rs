// src/models.rs

use serde::{Deserialize, Serialize};

/// Every product field the server accepts on create/update.
///
/// This is also the JSON body of `POST /products` and `PUT /products/:id`;
/// the id travels in the path, never in the body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    pub old_price: f64,
    /// Display label, e.g. `"20%"`.
    #[serde(default)]
    pub discount: String,
    pub rating: u8,
    pub reviews: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub image: String,
}

/// A catalog item as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Server-assigned. `0` marks a draft that has not been round-tripped yet.
    #[serde(default)]
    pub id: u64,
    #[serde(flatten)]
    pub draft: ProductDraft,
}

impl Product {
    pub fn new(id: u64, draft: ProductDraft) -> Self {
        Self { id, draft }
    }

    pub fn is_draft(&self) -> bool {
        self.id == 0
    }

    pub fn name(&self) -> &str {
        &self.draft.name
    }
}

impl From<ProductDraft> for Product {
    fn from(draft: ProductDraft) -> Self {
        Self { id: 0, draft }
    }
}
