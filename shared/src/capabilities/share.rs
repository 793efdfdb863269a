use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Native share sheet.
pub struct Share<Ev> {
    context: CapabilityContext<ShareOperation, Ev>,
}

impl<Ev> Capability<Ev> for Share<Ev>
where
    Ev: Send + 'static,
{
    type Operation = ShareOperation;
    type MappedSelf<MappedEv> = Share<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Share::new(self.context.map_event(f))
    }
}

impl<Ev> Share<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<ShareOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn share_link<F>(&self, title: String, url: String, callback: F)
    where
        F: FnOnce(ShareResult) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(ShareOperation::ShareLink { title, url })
                .await;
            ctx.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShareOperation {
    ShareLink { title: String, url: String },
}

impl Operation for ShareOperation {
    type Output = ShareResult;
}

/// How the platform share sheet ended. Only `Shared` means the link left the app.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShareOutput {
    Shared,
    Cancelled,
    Unsupported,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShareError {
    #[error("share permission denied")]
    PermissionDenied,

    #[error("share failed: {reason}")]
    Failed { reason: String },
}

pub type ShareResult = Result<ShareOutput, ShareError>;
