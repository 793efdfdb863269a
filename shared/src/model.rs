use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

use crate::config::ShellConfig;
use crate::event::{EventId, FrameKind, Mode};
use crate::get_current_time_ms;

pub const FULL_TEXT_PLACEHOLDER: &str = "Full text will be loaded on first open...";

// --- Event store ---

/// One news item under analysis. Provenance fields are opaque to the core.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NewsEvent {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub source_url: Option<String>,
    pub published_at: Option<String>,
}

impl NewsEvent {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: EventId::new(id),
            title: title.into(),
            content: String::new(),
            source_url: None,
            published_at: None,
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    #[must_use]
    pub fn with_source(mut self, url: impl Into<String>, published_at: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self.published_at = Some(published_at.into());
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventStoreError {
    #[error("event store must contain at least one event")]
    Empty,

    #[error("duplicate event id: {0}")]
    DuplicateId(EventId),
}

/// Ordered, non-empty sequence of events with unique ids.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EventStore {
    events: Vec<NewsEvent>,
}

impl EventStore {
    pub fn new(events: Vec<NewsEvent>) -> Result<Self, EventStoreError> {
        if events.is_empty() {
            return Err(EventStoreError::Empty);
        }
        let mut seen = HashSet::with_capacity(events.len());
        for event in &events {
            if !seen.insert(&event.id) {
                return Err(EventStoreError::DuplicateId(event.id.clone()));
            }
        }
        Ok(Self { events })
    }

    /// Fixed demo feed; a real deployment hydrates the store from RSS.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            events: vec![
                NewsEvent::new(
                    "demo-event-2026",
                    "EU regulators propose a ban on AI grading in schools",
                )
                .with_source("https://example.org/news/ai-grading-ban", "2026-01-14"),
                NewsEvent::new(
                    "demo-event-2026-b",
                    "Platform accused of using feeds to manipulate voter turnout",
                )
                .with_content(
                    "Internal documents suggest ranking changes were tested on \
                     swing districts weeks before the vote.",
                )
                .with_source("https://example.org/news/feed-turnout", "2026-02-02"),
                NewsEvent::new(
                    "demo-event-2026-c",
                    "City council pilots open-source budgeting software",
                )
                .with_source("https://example.org/news/open-budget", "2026-02-19"),
            ],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Always false for a constructed store.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&NewsEvent> {
        self.events.get(index)
    }

    #[must_use]
    pub fn find(&self, id: &EventId) -> Option<&NewsEvent> {
        self.events.iter().find(|e| &e.id == id)
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::demo()
    }
}

// --- Navigation cursor ---

/// Index into the event store. Clamped to `0..len`, never wraps.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct NavigationCursor(usize);

impl NavigationCursor {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Returns the moved cursor, or `None` at the lower boundary.
    #[must_use]
    pub const fn prev(self) -> Option<Self> {
        if self.0 > 0 {
            Some(Self(self.0 - 1))
        } else {
            None
        }
    }

    /// Returns the moved cursor, or `None` at the upper boundary.
    #[must_use]
    pub const fn next(self, len: usize) -> Option<Self> {
        if self.0 + 1 < len {
            Some(Self(self.0 + 1))
        } else {
            None
        }
    }
}

// --- Engine results ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    #[default]
    Uninitialized,
    Initializing,
    LoadingKnowledgeBase,
    Ready,
    Unavailable,
}

/// Display data returned by `analyzeEvent`. Only `mode` and `summary` are
/// required; everything else is kept as raw JSON, shown when present and
/// never validated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AnalysisResult {
    pub mode: String,
    pub summary: String,
    #[serde(default)]
    pub fus_level: Option<Value>,
    #[serde(default)]
    pub affected_invariant: Option<Value>,
    #[serde(default)]
    pub perturbation_type: Option<Value>,
    #[serde(default)]
    pub temperament_hint: Option<Value>,
    #[serde(default)]
    pub plain_summary: Option<Value>,
    #[serde(default)]
    pub digest: Option<Value>,
}

#[derive(Debug, Error)]
pub enum AnalysisParseError {
    #[error("analysis output is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("analysis output is missing `{0}`")]
    MissingField(&'static str),
}

impl AnalysisResult {
    pub fn parse(raw: &str) -> Result<Self, AnalysisParseError> {
        let result: Self = serde_json::from_str(raw)?;
        if result.mode.trim().is_empty() {
            return Err(AnalysisParseError::MissingField("mode"));
        }
        if result.summary.trim().is_empty() {
            return Err(AnalysisParseError::MissingField("summary"));
        }
        Ok(result)
    }

    /// Clipboard text: the engine's plain summary when it supplied one,
    /// otherwise `"[<app> • <mode>]\n<summary>"`.
    #[must_use]
    pub fn clipboard_text(&self, app_name: &str, mode: Mode) -> String {
        match self.plain_summary.as_ref().and_then(Value::as_str) {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => fallback_plain_summary(app_name, mode, &self.summary),
        }
    }
}

#[must_use]
pub fn fallback_plain_summary(app_name: &str, mode: Mode, summary: &str) -> String {
    format!("[{app_name} • {mode}]\n{summary}")
}

/// What the analysis region currently shows.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub enum AnalysisRegion {
    #[default]
    Empty,
    Loading,
    Ready(AnalysisResult),
    Failed,
    Degraded,
}

// --- Toasts ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Warning => 4000,
            Self::Error => 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub created_at_ms: u64,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at_ms: get_current_time_ms(),
            duration_ms: kind.default_duration_ms(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) > self.duration_ms
    }
}

// --- Model ---

/// Controller state. Mutated only through `App::update`.
#[derive(Clone, Debug)]
pub struct Model {
    pub config: ShellConfig,
    pub store: EventStore,
    pub cursor: NavigationCursor,
    pub mode: Mode,
    pub engine: EngineStatus,
    pub analysis: AnalysisRegion,
    /// Sequence number of the latest render request; older completions are stale.
    pub render_seq: u64,
    pub active_toast: Option<ToastMessage>,
    pub active_frame: Option<FrameKind>,
    pub full_text_visible: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(ShellConfig::default(), EventStore::default())
    }
}

impl Model {
    #[must_use]
    pub fn new(config: ShellConfig, store: EventStore) -> Self {
        Self {
            config,
            store,
            cursor: NavigationCursor::default(),
            mode: Mode::default(),
            engine: EngineStatus::default(),
            analysis: AnalysisRegion::default(),
            render_seq: 0,
            active_toast: None,
            active_frame: None,
            full_text_visible: false,
        }
    }

    /// The event under the cursor. The store is non-empty and the cursor
    /// clamped, so this always resolves.
    #[must_use]
    pub fn current_event(&self) -> &NewsEvent {
        match self.store.get(self.cursor.index()) {
            Some(event) => event,
            None => &self.store.events[0],
        }
    }

    #[must_use]
    pub fn is_engine_ready(&self) -> bool {
        self.engine == EngineStatus::Ready
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.active_toast = Some(ToastMessage::new(message, kind));
    }

    pub fn clear_toast(&mut self) {
        self.active_toast = None;
    }

    /// Moves the cursor. Returns false for out-of-range requests.
    pub fn step(&mut self, direction: crate::event::Direction) -> bool {
        let moved = match direction {
            crate::event::Direction::Prev => self.cursor.prev(),
            crate::event::Direction::Next => self.cursor.next(self.store.len()),
        };
        match moved {
            Some(cursor) => {
                self.cursor = cursor;
                true
            }
            None => false,
        }
    }

    pub fn next_render_seq(&mut self) -> u64 {
        self.render_seq += 1;
        self.render_seq
    }
}
