//! Offline cache manager.
//!
//! Runs apart from the presentation controller and shares no state with it.
//! The worker pre-populates a versioned cache with the application shell on
//! install, purges older caches on activate, and answers same-origin GETs
//! cache-first with a network fallback.

mod manifest;
mod network;
mod runtime;
mod storage;
mod worker;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{AppError, ErrorKind};

pub use self::manifest::{CacheConfig, CACHE_PREFIX, DEFAULT_CACHE_VERSION, DEFAULT_SHELL_DOCUMENT};
pub use self::network::{CacheRequest, Destination, Method, Network, NetworkError};
pub use self::runtime::{spawn, WorkerError, WorkerHandle};
pub use self::storage::{CacheStorage, CachedResponse, MemoryCacheStorage};
pub use self::worker::{FetchDisposition, ResponseSource, ServiceWorker, WorkerState};

/// Identifies one registration attempt in logs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(String);

impl RegistrationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid cache config: {0}")]
    InvalidConfig(String),

    #[error("failed to fetch {url}: {source}")]
    AssetFetch {
        url: String,
        #[source]
        source: NetworkError,
    },

    #[error("{url} answered with status {status}")]
    AssetStatus { url: String, status: u16 },

    #[error("cache storage error: {0}")]
    Storage(String),

    #[error("cannot move worker from {from:?} to {to:?}")]
    InvalidTransition { from: WorkerState, to: WorkerState },
}

impl From<&CacheError> for AppError {
    fn from(err: &CacheError) -> Self {
        let kind = match err {
            CacheError::AssetFetch { .. } | CacheError::AssetStatus { .. } => ErrorKind::AssetFetch,
            CacheError::InvalidTransition { .. } => ErrorKind::InvalidState,
            CacheError::InvalidConfig(_) | CacheError::Storage(_) => ErrorKind::Internal,
        };
        AppError::new(kind, "offline cache unavailable").with_internal(err.to_string())
    }
}
