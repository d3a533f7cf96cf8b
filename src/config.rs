//! Configuration options for the MobileMart admin client

use crate::error::{Error, Result};
use std::time::Duration;

/// Used when neither the caller nor the environment supplies an API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// Environment variable consulted by [`ClientOptions::from_env`]
pub const BASE_URL_ENV: &str = "MOBILEMART_API_URL";

/// Color scheme handed to the view layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Configuration options for the MobileMart admin client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Root of the catalog API; `/products` is appended to it
    pub base_url: String,

    /// The request timeout. `None` waits for the transport indefinitely.
    pub request_timeout: Option<Duration>,

    /// Initial theme for views created from the client
    pub theme: Theme,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            theme: Theme::default(),
        }
    }
}

impl ClientOptions {
    /// Read the base URL from `MOBILEMART_API_URL`, falling back to the default.
    pub fn from_env() -> Result<Self> {
        let options = match std::env::var(BASE_URL_ENV) {
            Ok(url) if url.trim().is_empty() => {
                return Err(Error::config(format!("{} is set but empty", BASE_URL_ENV)))
            }
            Ok(url) => Self::default().with_base_url(url.trim()),
            Err(_) => Self::default(),
        };
        Ok(options)
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, value: &str) -> Self {
        self.base_url = value.to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the initial theme
    pub fn with_theme(mut self, value: Theme) -> Self {
        self.theme = value;
        self
    }
}
