//! Error handling for the MobileMart admin client

use crate::view::form::FieldErrors;
use mobilemart_products::ProductsError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Unified error type for the admin client
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Request layer failures; shared because one query result may reach several callers
    #[error("Transport error: {0}")]
    Products(Arc<ProductsError>),

    /// Form input rejected before anything was sent
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The view was asked to act on something it does not hold
    #[error("Nothing to act on: {0}")]
    NoPendingAction(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new "nothing pending" error
    pub fn no_pending_action<T: fmt::Display>(msg: T) -> Self {
        Error::NoPendingAction(msg.to_string())
    }

    /// The underlying transport failure, if this is one
    pub fn transport(&self) -> Option<&ProductsError> {
        match self {
            Error::Products(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProductsError> for Error {
    fn from(err: ProductsError) -> Self {
        Error::Products(Arc::new(err))
    }
}

impl From<Arc<ProductsError>> for Error {
    fn from(err: Arc<ProductsError>) -> Self {
        Error::Products(err)
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Error::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
