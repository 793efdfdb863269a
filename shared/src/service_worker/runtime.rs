use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::{
    CacheError, CacheRequest, CacheStorage, FetchDisposition, Network, RegistrationId,
    ServiceWorker, WorkerState,
};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker task has stopped")]
    ChannelClosed,

    #[error("worker dropped the reply")]
    ReplyDropped,

    #[error(transparent)]
    Cache(#[from] CacheError),
}

enum WorkerMessage {
    Install {
        reply: oneshot::Sender<Result<usize, CacheError>>,
    },
    Activate {
        reply: oneshot::Sender<Result<Vec<String>, CacheError>>,
    },
    Fetch {
        request: CacheRequest,
        reply: oneshot::Sender<FetchDisposition>,
    },
    Supersede {
        reply: oneshot::Sender<Result<(), CacheError>>,
    },
    State {
        reply: oneshot::Sender<WorkerState>,
    },
}

/// Cloneable handle to a running worker task.
#[derive(Clone)]
pub struct WorkerHandle {
    id: RegistrationId,
    tx: mpsc::Sender<WorkerMessage>,
}

/// Moves `worker` onto its own task. Lifecycle messages are handled in
/// order; each fetch is answered on a task of its own.
pub fn spawn<S, N>(worker: ServiceWorker<S, N>, buffer: usize) -> WorkerHandle
where
    S: CacheStorage + 'static,
    N: Network + 'static,
{
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let id = worker.id().clone();
    tokio::spawn(run(Arc::new(worker), rx));
    WorkerHandle { id, tx }
}

async fn run<S, N>(worker: Arc<ServiceWorker<S, N>>, mut rx: mpsc::Receiver<WorkerMessage>)
where
    S: CacheStorage + 'static,
    N: Network + 'static,
{
    while let Some(message) = rx.recv().await {
        match message {
            WorkerMessage::Install { reply } => {
                let _ = reply.send(worker.install().await);
            }
            WorkerMessage::Activate { reply } => {
                let _ = reply.send(worker.activate().await);
            }
            WorkerMessage::Fetch { request, reply } => {
                let worker = Arc::clone(&worker);
                tokio::spawn(async move {
                    let disposition = worker.handle_fetch(&request).await;
                    if reply.send(disposition).is_err() {
                        debug!(url = %request.url, "fetch caller went away");
                    }
                });
            }
            WorkerMessage::Supersede { reply } => {
                let _ = reply.send(worker.supersede().await);
            }
            WorkerMessage::State { reply } => {
                let _ = reply.send(worker.state().await);
            }
        }
    }
    info!(registration = %worker.id(), "worker task stopped");
}

impl WorkerHandle {
    pub fn id(&self) -> &RegistrationId {
        &self.id
    }

    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> WorkerMessage,
    ) -> Result<T, WorkerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| WorkerError::ChannelClosed)?;
        rx.await.map_err(|_| WorkerError::ReplyDropped)
    }

    pub async fn install(&self) -> Result<usize, WorkerError> {
        self.call(|reply| WorkerMessage::Install { reply })
            .await?
            .map_err(WorkerError::from)
    }

    pub async fn activate(&self) -> Result<Vec<String>, WorkerError> {
        self.call(|reply| WorkerMessage::Activate { reply })
            .await?
            .map_err(WorkerError::from)
    }

    /// Activates this worker, then retires `previous`, which no longer has
    /// a cache to serve from.
    pub async fn activate_replacing(
        &self,
        previous: &WorkerHandle,
    ) -> Result<Vec<String>, WorkerError> {
        let purged = self.activate().await?;
        previous.supersede().await?;
        info!(registration = %self.id, previous = %previous.id, "worker replaced");
        Ok(purged)
    }

    pub async fn supersede(&self) -> Result<(), WorkerError> {
        self.call(|reply| WorkerMessage::Supersede { reply })
            .await?
            .map_err(WorkerError::from)
    }

    pub async fn fetch(&self, request: CacheRequest) -> Result<FetchDisposition, WorkerError> {
        self.call(|reply| WorkerMessage::Fetch { request, reply })
            .await
    }

    pub async fn state(&self) -> Result<WorkerState, WorkerError> {
        self.call(|reply| WorkerMessage::State { reply }).await
    }
}
