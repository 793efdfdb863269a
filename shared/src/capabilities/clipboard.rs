use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub struct Clipboard<Ev> {
    context: CapabilityContext<ClipboardOperation, Ev>,
}

impl<Ev> Capability<Ev> for Clipboard<Ev>
where
    Ev: Send + 'static,
{
    type Operation = ClipboardOperation;
    type MappedSelf<MappedEv> = Clipboard<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Clipboard::new(self.context.map_event(f))
    }
}

impl<Ev> Clipboard<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<ClipboardOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn write_text<F>(&self, text: String, callback: F)
    where
        F: FnOnce(ClipboardResult) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(ClipboardOperation::WriteText { text })
                .await;
            ctx.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClipboardOperation {
    WriteText { text: String },
}

impl Operation for ClipboardOperation {
    type Output = ClipboardResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("clipboard permission denied")]
    PermissionDenied,

    #[error("clipboard unavailable")]
    Unavailable,

    #[error("clipboard write failed: {reason}")]
    WriteFailed { reason: String },
}

pub type ClipboardResult = Result<(), ClipboardError>;
