#![allow(dead_code)]

use std::collections::VecDeque;

use async_trait::async_trait;
use crux_core::testing::AppTester;
use crux_core::Request;
use noemafeed_shared::capabilities::{
    serve, AnalysisEngine, ClipboardOperation, ClipboardResult, EngineError, EngineOperation,
    ShareOperation, ShareOutput, ShareResult,
};
use noemafeed_shared::{App, DigestPayload, Effect, Event, EventId, EventStore, Mode, Model, NewsEvent, ShellConfig};
use serde_json::{json, Map, Value};

/// Deterministic engine: echoes the event title back as the summary.
#[derive(Default)]
pub struct FakeEngine {
    pub fail_init: bool,
    pub fail_knowledge_base: bool,
    pub malformed: bool,
    pub fail_analysis: bool,
    pub fail_digest: bool,
    pub plain_summary: Option<String>,
}

#[async_trait]
impl AnalysisEngine for FakeEngine {
    async fn init(&self) -> Result<(), EngineError> {
        if self.fail_init {
            return Err(EngineError::InitFailed {
                reason: "wasm module failed to load".into(),
            });
        }
        Ok(())
    }

    async fn init_knowledge_base(&self) -> Result<(), EngineError> {
        if self.fail_knowledge_base {
            return Err(EngineError::KnowledgeBase {
                reason: "ontology fetch failed".into(),
            });
        }
        Ok(())
    }

    fn analyze_event(
        &self,
        event_json: &str,
        mode: Mode,
        context_year: u32,
    ) -> Result<String, EngineError> {
        if self.fail_analysis {
            return Err(EngineError::Analysis {
                reason: "engine panicked".into(),
            });
        }
        if self.malformed {
            return Ok("{\"summary\": ".into());
        }
        let event: Value = serde_json::from_str(event_json).map_err(|e| EngineError::Analysis {
            reason: e.to_string(),
        })?;
        let title = event["title"].as_str().unwrap_or_default();
        Ok(json!({
            "mode": mode.as_str(),
            "summary": format!("{title} seen from {context_year}"),
            "fus_level": "OntologicalLevel",
            "affected_invariant": "fus:ObserverPosition",
        })
        .to_string())
    }

    fn generate_plain_summary(&self, _event_id: &EventId, _mode: Mode) -> Result<String, EngineError> {
        Ok(self.plain_summary.clone().unwrap_or_default())
    }

    fn generate_digest(&self, event_id: &EventId, mode: Mode) -> Result<DigestPayload, EngineError> {
        if self.fail_digest {
            return Err(EngineError::Analysis {
                reason: "digest unavailable".into(),
            });
        }
        let mut map = Map::new();
        map.insert("event_id".into(), Value::String(event_id.to_string()));
        map.insert("mode".into(), Value::String(mode.to_string()));
        Ok(DigestPayload::Structured(map))
    }
}

/// Runs the controller against fake shell collaborators, resolving every
/// effect until the app goes quiet.
pub struct Harness {
    pub app: AppTester<App, Effect>,
    pub model: Model,
    pub engine: FakeEngine,
    pub share_result: ShareResult,
    pub clipboard_result: ClipboardResult,
    pub clipboard: Vec<String>,
    pub shared_links: Vec<(String, String)>,
    pub renders: usize,
}

impl Harness {
    pub fn new(engine: FakeEngine) -> Self {
        Self::with_model(engine, Model::default())
    }

    pub fn with_model(engine: FakeEngine, model: Model) -> Self {
        Self {
            app: AppTester::default(),
            model,
            engine,
            share_result: Ok(ShareOutput::Shared),
            clipboard_result: Ok(()),
            clipboard: Vec::new(),
            shared_links: Vec::new(),
            renders: 0,
        }
    }

    /// Two-event store `[E1, E2]`.
    pub fn two_events(engine: FakeEngine) -> Self {
        let store = EventStore::new(vec![
            NewsEvent::new("e1", "E1 title"),
            NewsEvent::new("e2", "E2 title").with_content("Second event body"),
        ])
        .expect("valid store");
        Self::with_model(engine, Model::new(ShellConfig::default(), store))
    }

    pub async fn started(engine: FakeEngine) -> Self {
        let mut harness = Self::new(engine);
        harness.run(Event::AppStarted).await;
        harness
    }

    pub async fn run(&mut self, event: Event) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let update = self.app.update(event, &mut self.model);
            queue.extend(update.events);
            for effect in update.effects {
                queue.extend(self.resolve(effect).await);
            }
        }
    }

    /// Applies one event without resolving anything; returns the effects.
    pub fn send(&mut self, event: Event) -> Vec<Effect> {
        self.app.update(event, &mut self.model).effects
    }

    pub async fn resolve_engine(
        &mut self,
        mut request: Request<EngineOperation>,
    ) -> Vec<Event> {
        let output = serve(&self.engine, &request.operation).await;
        self.app
            .resolve(&mut request, output)
            .expect("engine request resolves")
            .events
    }

    /// Feeds events back in, resolving the effects they cause.
    pub async fn feed(&mut self, events: Vec<Event>) {
        for event in events {
            self.run(event).await;
        }
    }

    async fn resolve(&mut self, effect: Effect) -> Vec<Event> {
        match effect {
            Effect::Render(_) => {
                self.renders += 1;
                Vec::new()
            }
            Effect::Engine(request) => self.resolve_engine(request).await,
            Effect::Clipboard(mut request) => {
                let ClipboardOperation::WriteText { text } = &request.operation;
                self.clipboard.push(text.clone());
                let result = self.clipboard_result.clone();
                self.app
                    .resolve(&mut request, result)
                    .expect("clipboard request resolves")
                    .events
            }
            Effect::Share(mut request) => {
                let ShareOperation::ShareLink { title, url } = &request.operation;
                self.shared_links.push((title.clone(), url.clone()));
                let result = self.share_result.clone();
                self.app
                    .resolve(&mut request, result)
                    .expect("share request resolves")
                    .events
            }
        }
    }

    pub fn toast(&self) -> Option<String> {
        self.model.active_toast.as_ref().map(|t| t.message.clone())
    }
}
