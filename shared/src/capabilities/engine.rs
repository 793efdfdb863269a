//! Analysis engine binding.
//!
//! The engine is an opaque collaborator: the core only ever asks the shell to
//! run one of five operations and gets back a [`EngineResult`]. Shells that
//! host the engine in-process implement [`AnalysisEngine`] and answer requests
//! with [`serve`].

use async_trait::async_trait;
use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::digest::DigestPayload;
use crate::event::{EventId, Mode};

pub struct Engine<Ev> {
    context: CapabilityContext<EngineOperation, Ev>,
}

impl<Ev> Capability<Ev> for Engine<Ev>
where
    Ev: Send + 'static,
{
    type Operation = EngineOperation;
    type MappedSelf<MappedEv> = Engine<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Engine::new(self.context.map_event(f))
    }
}

impl<Ev> Engine<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<EngineOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn init<F>(&self, callback: F)
    where
        F: FnOnce(EngineResult) -> Ev + Send + 'static,
    {
        self.request(EngineOperation::Init, callback);
    }

    pub fn init_knowledge_base<F>(&self, callback: F)
    where
        F: FnOnce(EngineResult) -> Ev + Send + 'static,
    {
        self.request(EngineOperation::InitKnowledgeBase, callback);
    }

    pub fn analyze<F>(&self, event_json: String, mode: Mode, context_year: u32, callback: F)
    where
        F: FnOnce(EngineResult) -> Ev + Send + 'static,
    {
        self.request(
            EngineOperation::Analyze {
                event_json,
                mode,
                context_year,
            },
            callback,
        );
    }

    pub fn plain_summary<F>(&self, event_id: EventId, mode: Mode, callback: F)
    where
        F: FnOnce(EngineResult) -> Ev + Send + 'static,
    {
        self.request(EngineOperation::PlainSummary { event_id, mode }, callback);
    }

    pub fn digest<F>(&self, event_id: EventId, mode: Mode, callback: F)
    where
        F: FnOnce(EngineResult) -> Ev + Send + 'static,
    {
        self.request(EngineOperation::Digest { event_id, mode }, callback);
    }

    fn request<F>(&self, operation: EngineOperation, callback: F)
    where
        F: FnOnce(EngineResult) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await;
            ctx.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EngineOperation {
    Init,
    InitKnowledgeBase,
    Analyze {
        event_json: String,
        mode: Mode,
        context_year: u32,
    },
    PlainSummary {
        event_id: EventId,
        mode: Mode,
    },
    Digest {
        event_id: EventId,
        mode: Mode,
    },
}

impl Operation for EngineOperation {
    type Output = EngineResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum EngineError {
    #[error("engine not initialized")]
    NotInitialized,

    #[error("engine initialization failed: {reason}")]
    InitFailed { reason: String },

    #[error("knowledge base failed to load: {reason}")]
    KnowledgeBase { reason: String },

    #[error("analysis failed: {reason}")]
    Analysis { reason: String },

    #[error("unexpected engine output for {operation}")]
    UnexpectedOutput { operation: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EngineOutput {
    Ready,
    /// Raw JSON produced by `analyzeEvent`; parsed and checked by the core.
    Analysis(String),
    Text(String),
    Digest(DigestPayload),
}

pub type EngineResult = Result<EngineOutput, EngineError>;

// ============================================================================
// In-process engine hosting
// ============================================================================

/// The engine contract a shell must satisfy to answer [`EngineOperation`]s.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    async fn init(&self) -> Result<(), EngineError>;

    /// Optional second setup step; engines without a knowledge base succeed.
    async fn init_knowledge_base(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn analyze_event(
        &self,
        event_json: &str,
        mode: Mode,
        context_year: u32,
    ) -> Result<String, EngineError>;

    fn generate_plain_summary(&self, event_id: &EventId, mode: Mode)
        -> Result<String, EngineError>;

    fn generate_digest(&self, event_id: &EventId, mode: Mode)
        -> Result<DigestPayload, EngineError>;
}

/// Runs a single engine operation against an in-process engine.
pub async fn serve<E>(engine: &E, operation: &EngineOperation) -> EngineResult
where
    E: AnalysisEngine + ?Sized,
{
    match operation {
        EngineOperation::Init => engine.init().await.map(|()| EngineOutput::Ready),
        EngineOperation::InitKnowledgeBase => engine
            .init_knowledge_base()
            .await
            .map(|()| EngineOutput::Ready),
        EngineOperation::Analyze {
            event_json,
            mode,
            context_year,
        } => engine
            .analyze_event(event_json, *mode, *context_year)
            .map(EngineOutput::Analysis),
        EngineOperation::PlainSummary { event_id, mode } => engine
            .generate_plain_summary(event_id, *mode)
            .map(EngineOutput::Text),
        EngineOperation::Digest { event_id, mode } => engine
            .generate_digest(event_id, *mode)
            .map(EngineOutput::Digest),
    }
}
