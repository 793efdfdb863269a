use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::CachedResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Other(String),
}

/// What the page is loading the resource as. Only `Document` requests get
/// the shell fallback when offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    #[default]
    Other,
}

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRequest {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
}

impl CacheRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            destination: Destination::Other,
        }
    }

    /// A top-level page load.
    pub fn navigate(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            destination: Destination::Document,
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Cache key: the url without its fragment.
    pub fn cache_key(&self) -> String {
        cache_key(&self.url)
    }
}

pub(super) fn cache_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.into()
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("network unreachable")]
    Offline,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Other(String),
}

#[async_trait]
pub trait Network: Send + Sync {
    /// Any HTTP status is a successful fetch; only transport failures are errors.
    async fn fetch(&self, request: &CacheRequest) -> Result<CachedResponse, NetworkError>;
}
