use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// エラー型
#[derive(Error, Debug)]
pub enum ProductsError {
    /// The server answered with a non-2xx status.
    #[error("API error: {message} (Status: {status})")]
    ApiError { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

impl ProductsError {
    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ProductsError::ApiError { status, .. } => Some(*status),
            ProductsError::NetworkError(err) => err.status(),
            _ => None,
        }
    }

    /// Builds an `ApiError` from a failed response body.
    ///
    /// Servers in front of the catalog reply with `{"message": "..."}` on
    /// failure; anything else is kept verbatim.
    pub(crate) fn from_response_body(status: StatusCode, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: Option<String>,
        }

        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { message: Some(message) }) => message,
            _ if !body.trim().is_empty() => body.to_string(),
            _ => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };

        ProductsError::ApiError { status, message }
    }
}

pub type Result<T> = std::result::Result<T, ProductsError>;
