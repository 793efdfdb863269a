use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use super::network::cache_key;
use super::{
    CacheConfig, CacheError, CacheRequest, CacheStorage, CachedResponse, Destination, Method,
    Network, RegistrationId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Registering,
    Installing,
    /// Installed and waiting to activate.
    Installed,
    Activating,
    Active,
    Redundant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    ShellFallback,
    Offline,
}

/// Outcome of intercepting one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDisposition {
    /// Not ours to handle; the request goes to the network untouched.
    PassThrough,
    Respond {
        response: CachedResponse,
        source: ResponseSource,
    },
}

impl FetchDisposition {
    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            Self::PassThrough => None,
            Self::Respond { source, .. } => Some(*source),
        }
    }
}

pub struct ServiceWorker<S: CacheStorage, N: Network> {
    id: RegistrationId,
    config: CacheConfig,
    storage: Arc<S>,
    network: Arc<N>,
    state: RwLock<WorkerState>,
}

impl<S: CacheStorage, N: Network> ServiceWorker<S, N> {
    pub fn new(config: CacheConfig, storage: Arc<S>, network: Arc<N>) -> Result<Self, CacheError> {
        config.validate()?;
        let id = RegistrationId::generate();
        info!(registration = %id, cache = %config.cache_name(), "service worker registered");
        Ok(Self {
            id,
            config,
            storage,
            network,
            state: RwLock::new(WorkerState::Registering),
        })
    }

    pub fn id(&self) -> &RegistrationId {
        &self.id
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn transition(&self, from: WorkerState, to: WorkerState) -> Result<(), CacheError> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(CacheError::InvalidTransition { from: *state, to });
        }
        *state = to;
        Ok(())
    }

    async fn set_state(&self, to: WorkerState) {
        *self.state.write().await = to;
    }

    /// Downloads the whole manifest and stores it in one write. Any failure
    /// leaves the cache untouched and the worker redundant.
    #[instrument(skip(self), fields(registration = %self.id))]
    pub async fn install(&self) -> Result<usize, CacheError> {
        self.transition(WorkerState::Registering, WorkerState::Installing)
            .await?;

        match self.download_manifest().await {
            Ok(entries) => {
                let count = entries.len();
                let cache_name = self.config.cache_name();
                if let Err(e) = self.storage.put_all(&cache_name, entries).await {
                    error!(error = %e, "failed to populate cache");
                    self.set_state(WorkerState::Redundant).await;
                    return Err(e);
                }
                self.set_state(WorkerState::Installed).await;
                info!(cache = %cache_name, assets = count, "install complete");
                Ok(count)
            }
            Err(e) => {
                error!(error = %e, "install failed, worker is redundant");
                self.set_state(WorkerState::Redundant).await;
                Err(e)
            }
        }
    }

    async fn download_manifest(&self) -> Result<Vec<(String, CachedResponse)>, CacheError> {
        let urls = self.config.asset_urls()?;
        let mut entries = Vec::with_capacity(urls.len());
        for url in urls {
            let request = CacheRequest::get(url);
            let response = self.network.fetch(&request).await.map_err(|source| {
                CacheError::AssetFetch {
                    url: request.url.to_string(),
                    source,
                }
            })?;
            if !response.is_success() {
                return Err(CacheError::AssetStatus {
                    url: request.url.to_string(),
                    status: response.status,
                });
            }
            entries.push((request.cache_key(), response));
        }
        Ok(entries)
    }

    /// Deletes every cache but the current one. Returns the deleted names.
    #[instrument(skip(self), fields(registration = %self.id))]
    pub async fn activate(&self) -> Result<Vec<String>, CacheError> {
        self.transition(WorkerState::Installed, WorkerState::Activating)
            .await?;

        match self.purge_stale_caches().await {
            Ok(deleted) => {
                self.set_state(WorkerState::Active).await;
                info!(purged = deleted.len(), "worker active");
                Ok(deleted)
            }
            Err(e) => {
                error!(error = %e, "activation failed");
                self.set_state(WorkerState::Installed).await;
                Err(e)
            }
        }
    }

    /// Retires this worker once a newer version has activated. From then on
    /// every request passes through.
    #[instrument(skip(self), fields(registration = %self.id))]
    pub async fn supersede(&self) -> Result<(), CacheError> {
        let mut state = self.state.write().await;
        match *state {
            WorkerState::Installed | WorkerState::Active => {
                *state = WorkerState::Redundant;
                info!("worker superseded");
                Ok(())
            }
            WorkerState::Redundant => Ok(()),
            from => Err(CacheError::InvalidTransition {
                from,
                to: WorkerState::Redundant,
            }),
        }
    }

    async fn purge_stale_caches(&self) -> Result<Vec<String>, CacheError> {
        let current = self.config.cache_name();
        let mut deleted = Vec::new();
        for name in self.storage.cache_names().await? {
            if name != current && self.storage.delete(&name).await? {
                debug!(cache = %name, "deleted stale cache");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Cache-first with network fallback. Never fails: every request ends in
    /// a response or a passthrough.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn handle_fetch(&self, request: &CacheRequest) -> FetchDisposition {
        if self.state().await != WorkerState::Active {
            return FetchDisposition::PassThrough;
        }
        if request.method != Method::Get || !self.config.is_same_origin(&request.url) {
            return FetchDisposition::PassThrough;
        }

        let cache_name = self.config.cache_name();
        match self.storage.lookup(&cache_name, &request.cache_key()).await {
            Ok(Some(response)) => {
                return FetchDisposition::Respond {
                    response,
                    source: ResponseSource::Cache,
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "cache lookup failed, trying network"),
        }

        match self.network.fetch(request).await {
            Ok(response) => FetchDisposition::Respond {
                response,
                source: ResponseSource::Network,
            },
            Err(e) => {
                debug!(error = %e, "network failed");
                self.offline_fallback(request, &cache_name).await
            }
        }
    }

    async fn offline_fallback(&self, request: &CacheRequest, cache_name: &str) -> FetchDisposition {
        if request.destination == Destination::Document {
            let shell = match self.config.shell_url() {
                Ok(url) => self.storage.lookup(cache_name, &cache_key(&url)).await,
                Err(e) => Err(e),
            };
            match shell {
                Ok(Some(response)) => {
                    return FetchDisposition::Respond {
                        response,
                        source: ResponseSource::ShellFallback,
                    }
                }
                Ok(None) => warn!("shell document missing from cache"),
                Err(e) => warn!(error = %e, "shell lookup failed"),
            }
        }
        FetchDisposition::Respond {
            response: CachedResponse::offline(),
            source: ResponseSource::Offline,
        }
    }
}
