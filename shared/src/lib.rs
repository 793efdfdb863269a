// lib.rs - NoemaFeed shell core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod actions;
pub mod capabilities;
pub mod config;
pub mod digest;
pub mod error;
pub mod event;
pub mod markup;
pub mod model;
pub mod service_worker;

use serde::{Deserialize, Serialize};

pub use actions::{dispatch, ActionError, UiAction, ACTION_BINDINGS};
pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{ConfigError, ShellConfig};
pub use digest::{decode_digest, digest_from_url, encode_digest, share_url, DigestPayload};
pub use error::{AppError, ErrorKind, ErrorSeverity};
pub use event::{
    AnalysisTarget, ClipboardPurpose, Direction, Event, EventId, FrameKind, LinkFallback, Mode,
};
pub use model::{
    AnalysisRegion, AnalysisResult, EngineStatus, EventStore, EventStoreError, Model,
    NavigationCursor, NewsEvent, ToastKind, ToastMessage,
};

pub const MSG_ANALYSIS_COPIED: &str = "Analysis copied";
pub const MSG_ANALYSIS_SHARED: &str = "Analysis shared";
pub const MSG_LINK_COPIED: &str = "Link copied";
pub const MSG_SHARE_UNSUPPORTED_LINK_COPIED: &str = "Link to analysis copied";
pub const MSG_COPY_FAILED: &str = "Could not copy the analysis.";
pub const MSG_SHARE_FAILED: &str = "Could not prepare a share link.";
pub const MSG_ENGINE_LOADING: &str = "The analysis engine is still loading.";
pub const MSG_ENGINE_OFF: &str = "Analysis is not available in this session.";

#[must_use]
pub fn get_current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

// ============================================================================
// View model
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Empty,
    Loading,
    Ready,
    Failed,
    Degraded,
}

/// Analysis region contents. `markup` is built from engine fields only and
/// is always escaped.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisView {
    pub status: AnalysisStatus,
    pub mode_label: Option<String>,
    pub message: Option<String>,
    pub markup: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModeOption {
    pub id: String,
    pub mode: Mode,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameView {
    pub kind: FrameKind,
    pub title: String,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    /// Plain text; shells must not interpret it as markup.
    pub title: String,
    pub analysis: AnalysisView,
    pub mode: Mode,
    pub modes: Vec<ModeOption>,
    pub position: usize,
    pub total: usize,
    pub can_go_prev: bool,
    pub can_go_next: bool,
    pub engine_ready: bool,
    pub toast: Option<ToastView>,
    pub frame: Option<FrameView>,
    pub full_text: Option<String>,
}

pub mod app {
    use tracing::{debug, error, info, warn};

    use super::*;
    use crate::capabilities::{
        CapabilityError, EngineResult, EngineOutput, ShareOutput,
    };
    use crate::config::SHARE_TITLE;
    use crate::error::{ANALYSIS_FAILED_MESSAGE, DEGRADED_ENGINE_MESSAGE};
    use crate::markup::{analysis_markup, message_markup};
    use crate::model::FULL_TEXT_PLACEHOLDER;

    #[derive(Default)]
    pub struct App;

    impl App {
        fn parse_analysis(result: EngineResult) -> Result<AnalysisResult, AppError> {
            match result {
                Ok(EngineOutput::Analysis(raw)) => AnalysisResult::parse(&raw).map_err(|e| {
                    AppError::new(ErrorKind::AnalysisFailed, "malformed analysis output")
                        .with_internal(e.to_string())
                }),
                Ok(other) => Err(AppError::new(
                    ErrorKind::AnalysisFailed,
                    "unexpected engine output",
                )
                .with_internal(format!("{other:?}"))),
                Err(e) => Err(AppError::new(ErrorKind::AnalysisFailed, "engine error")
                    .with_internal(CapabilityError::from(e).to_string())),
            }
        }

        /// Returns false (and tells the user why) when the engine cannot take work.
        fn ensure_engine(model: &mut Model) -> bool {
            match model.engine {
                EngineStatus::Ready => true,
                EngineStatus::Unavailable => {
                    model.show_toast(MSG_ENGINE_OFF, ToastKind::Warning);
                    false
                }
                EngineStatus::Uninitialized
                | EngineStatus::Initializing
                | EngineStatus::LoadingKnowledgeBase => {
                    model.show_toast(MSG_ENGINE_LOADING, ToastKind::Info);
                    false
                }
            }
        }

        fn current_event_json(model: &Model) -> Result<String, AppError> {
            serde_json::to_string(model.current_event()).map_err(|e| {
                AppError::new(ErrorKind::Serialization, "event serialization failed")
                    .with_internal(e.to_string())
                    .with_context("event_id", model.current_event().id.as_str())
            })
        }

        fn current_target(model: &Model) -> AnalysisTarget {
            AnalysisTarget {
                event_id: model.current_event().id.clone(),
                mode: model.mode,
            }
        }

        /// Issues a fresh analysis for (cursor, mode). Earlier in-flight
        /// renders become stale.
        fn request_render(model: &mut Model, caps: &Capabilities) {
            if model.engine == EngineStatus::Ready {
                let seq = model.next_render_seq();
                match Self::current_event_json(model) {
                    Ok(event_json) => {
                        model.analysis = AnalysisRegion::Loading;
                        debug!(
                            seq,
                            event_id = %model.current_event().id,
                            mode = %model.mode,
                            "requesting analysis"
                        );
                        caps.engine.analyze(
                            event_json,
                            model.mode,
                            model.config.profile_year,
                            move |result| Event::AnalysisReceived {
                                seq,
                                result: Box::new(result),
                            },
                        );
                    }
                    Err(e) => {
                        error!(code = e.code(), error = %e, "cannot build analysis input");
                        model.analysis = AnalysisRegion::Failed;
                    }
                }
            }
            caps.render.render();
        }

        fn engine_ready(model: &mut Model, caps: &Capabilities) {
            model.engine = EngineStatus::Ready;
            info!("analysis engine ready");
            Self::request_render(model, caps);
        }

        fn engine_unavailable(
            model: &mut Model,
            caps: &Capabilities,
            stage: &str,
            result: EngineResult,
        ) {
            let internal = match result {
                Ok(other) => format!("unexpected output {other:?}"),
                Err(e) => CapabilityError::from(e).to_string(),
            };
            let err = AppError::new(ErrorKind::EngineUnavailable, format!("{stage} failed"))
                .with_internal(internal);
            error!(code = err.code(), error = %err, "analysis engine unavailable");

            model.engine = EngineStatus::Unavailable;
            model.analysis = AnalysisRegion::Degraded;
            caps.render.render();
        }

        fn write_share_link(caps: &Capabilities, url: String, reason: LinkFallback) {
            caps.clipboard.write_text(url, move |result| Event::ClipboardWritten {
                purpose: ClipboardPurpose::ShareLink { reason },
                result: Box::new(result),
            });
        }

        fn analysis_view(model: &Model) -> AnalysisView {
            match &model.analysis {
                AnalysisRegion::Empty => AnalysisView {
                    status: AnalysisStatus::Empty,
                    mode_label: None,
                    message: None,
                    markup: String::new(),
                },
                AnalysisRegion::Loading => AnalysisView {
                    status: AnalysisStatus::Loading,
                    mode_label: None,
                    message: None,
                    markup: String::new(),
                },
                AnalysisRegion::Ready(result) => AnalysisView {
                    status: AnalysisStatus::Ready,
                    mode_label: Some(result.mode.clone()),
                    message: None,
                    markup: analysis_markup(result),
                },
                AnalysisRegion::Failed => AnalysisView {
                    status: AnalysisStatus::Failed,
                    mode_label: None,
                    message: Some(ANALYSIS_FAILED_MESSAGE.into()),
                    markup: message_markup(ANALYSIS_FAILED_MESSAGE),
                },
                AnalysisRegion::Degraded => AnalysisView {
                    status: AnalysisStatus::Degraded,
                    mode_label: None,
                    message: Some(DEGRADED_ENGINE_MESSAGE.into()),
                    markup: message_markup(DEGRADED_ENGINE_MESSAGE),
                },
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            let event_name = event.name();
            if event.is_user_initiated() {
                info!(event = event_name, "user_action");
            } else {
                debug!(event = event_name, "update");
            }

            match event {
                Event::Noop => {}

                Event::AppStarted => {
                    model.engine = EngineStatus::Initializing;
                    model.analysis = AnalysisRegion::Loading;
                    caps.engine
                        .init(|result| Event::EngineInitialized(Box::new(result)));
                    caps.render.render();
                }

                Event::EngineInitialized(result) => match *result {
                    Ok(EngineOutput::Ready) if model.config.load_knowledge_base => {
                        model.engine = EngineStatus::LoadingKnowledgeBase;
                        caps.engine.init_knowledge_base(|result| {
                            Event::KnowledgeBaseLoaded(Box::new(result))
                        });
                    }
                    Ok(EngineOutput::Ready) => Self::engine_ready(model, caps),
                    other => Self::engine_unavailable(model, caps, "engine init", other),
                },

                Event::KnowledgeBaseLoaded(result) => match *result {
                    Ok(EngineOutput::Ready) => Self::engine_ready(model, caps),
                    other => {
                        Self::engine_unavailable(model, caps, "knowledge base load", other);
                    }
                },

                Event::Navigate { direction } => {
                    if model.step(direction) {
                        model.full_text_visible = false;
                        Self::request_render(model, caps);
                    } else {
                        debug!(?direction, cursor = model.cursor.index(), "navigation at boundary");
                    }
                }

                Event::ModeSelected { mode } => {
                    model.mode = mode;
                    Self::request_render(model, caps);
                }

                Event::AnalysisReceived { seq, result } => {
                    if seq != model.render_seq {
                        debug!(seq, latest = model.render_seq, "dropping stale analysis");
                        return;
                    }
                    model.analysis = match Self::parse_analysis(*result) {
                        Ok(analysis) => AnalysisRegion::Ready(analysis),
                        Err(e) => {
                            warn!(
                                code = e.code(),
                                error = %e,
                                event_id = %model.current_event().id,
                                "analysis failed"
                            );
                            AnalysisRegion::Failed
                        }
                    };
                    caps.render.render();
                }

                Event::CopyRequested => {
                    if !Self::ensure_engine(model) {
                        caps.render.render();
                        return;
                    }
                    let target = Self::current_target(model);
                    match Self::current_event_json(model) {
                        Ok(event_json) => caps.engine.analyze(
                            event_json,
                            target.mode,
                            model.config.profile_year,
                            move |result| Event::CopyAnalysisReceived {
                                target,
                                result: Box::new(result),
                            },
                        ),
                        Err(e) => {
                            warn!(code = e.code(), error = %e, "copy aborted");
                            model.show_toast(MSG_COPY_FAILED, ToastKind::Error);
                            caps.render.render();
                        }
                    }
                }

                Event::CopyAnalysisReceived { target, result } => {
                    match Self::parse_analysis(*result) {
                        Ok(analysis) => {
                            let fallback =
                                analysis.clipboard_text(&model.config.app_name, target.mode);
                            let event_id = target.event_id.clone();
                            let mode = target.mode;
                            caps.engine.plain_summary(event_id, mode, move |result| {
                                Event::PlainSummaryReceived {
                                    target,
                                    fallback,
                                    result: Box::new(result),
                                }
                            });
                        }
                        Err(e) => {
                            warn!(code = e.code(), error = %e, event_id = %target.event_id, "copy failed");
                            model.show_toast(MSG_COPY_FAILED, ToastKind::Error);
                            caps.render.render();
                        }
                    }
                }

                Event::PlainSummaryReceived {
                    target,
                    fallback,
                    result,
                } => {
                    let text = match *result {
                        Ok(EngineOutput::Text(text)) if !text.trim().is_empty() => text,
                        Ok(_) => fallback,
                        Err(e) => {
                            debug!(error = %e, event_id = %target.event_id, "plain summary unavailable, using fallback");
                            fallback
                        }
                    };
                    caps.clipboard.write_text(text, |result| Event::ClipboardWritten {
                        purpose: ClipboardPurpose::Analysis,
                        result: Box::new(result),
                    });
                }

                Event::ShareRequested => {
                    if !Self::ensure_engine(model) {
                        caps.render.render();
                        return;
                    }
                    let target = Self::current_target(model);
                    match Self::current_event_json(model) {
                        Ok(event_json) => caps.engine.analyze(
                            event_json,
                            target.mode,
                            model.config.profile_year,
                            move |result| Event::ShareAnalysisReceived {
                                target,
                                result: Box::new(result),
                            },
                        ),
                        Err(e) => {
                            warn!(code = e.code(), error = %e, "share aborted");
                            model.show_toast(MSG_SHARE_FAILED, ToastKind::Error);
                            caps.render.render();
                        }
                    }
                }

                Event::ShareAnalysisReceived { target, result } => {
                    match Self::parse_analysis(*result) {
                        Ok(_) => {
                            let event_id = target.event_id.clone();
                            let mode = target.mode;
                            caps.engine.digest(event_id, mode, move |result| {
                                Event::DigestReceived {
                                    target,
                                    result: Box::new(result),
                                }
                            });
                        }
                        Err(e) => {
                            warn!(code = e.code(), error = %e, event_id = %target.event_id, "share failed");
                            model.show_toast(MSG_SHARE_FAILED, ToastKind::Error);
                            caps.render.render();
                        }
                    }
                }

                Event::DigestReceived { target, result } => {
                    let url = match *result {
                        Ok(EngineOutput::Digest(payload)) => {
                            share_url(&model.config.app_host, &payload).map_err(|e| {
                                AppError::new(ErrorKind::Serialization, "digest encoding failed")
                                    .with_internal(e.to_string())
                            })
                        }
                        Ok(other) => Err(AppError::new(
                            ErrorKind::AnalysisFailed,
                            "unexpected engine output",
                        )
                        .with_internal(format!("{other:?}"))),
                        Err(e) => Err(AppError::new(ErrorKind::AnalysisFailed, "digest failed")
                            .with_internal(CapabilityError::from(e).to_string())),
                    };
                    match url {
                        Ok(url) => {
                            let url = url.to_string();
                            let link = url.clone();
                            caps.share.share_link(SHARE_TITLE.to_string(), link, move |result| {
                                Event::ShareCompleted {
                                    url,
                                    result: Box::new(result),
                                }
                            });
                        }
                        Err(e) => {
                            warn!(code = e.code(), error = %e, event_id = %target.event_id, "share failed");
                            model.show_toast(MSG_SHARE_FAILED, ToastKind::Error);
                            caps.render.render();
                        }
                    }
                }

                Event::ShareCompleted { url, result } => match *result {
                    Ok(ShareOutput::Shared) => {
                        info!("analysis shared");
                        model.show_toast(MSG_ANALYSIS_SHARED, ToastKind::Success);
                        caps.render.render();
                    }
                    Ok(ShareOutput::Cancelled) => {
                        debug!("share cancelled, copying link instead");
                        Self::write_share_link(caps, url, LinkFallback::ShareCancelled);
                    }
                    Ok(ShareOutput::Unsupported) => {
                        debug!("native share unsupported, copying link instead");
                        Self::write_share_link(caps, url, LinkFallback::ShareUnsupported);
                    }
                    Err(e) => {
                        let err = AppError::new(ErrorKind::ShareDenied, "native share failed")
                            .with_internal(CapabilityError::from(e).to_string());
                        warn!(code = err.code(), error = %err, "share failed, copying link instead");
                        Self::write_share_link(caps, url, LinkFallback::ShareFailed);
                    }
                },

                Event::ClipboardWritten { purpose, result } => {
                    match (*result, purpose) {
                        (Ok(()), ClipboardPurpose::Analysis) => {
                            model.show_toast(MSG_ANALYSIS_COPIED, ToastKind::Success);
                        }
                        (Ok(()), ClipboardPurpose::ShareLink { reason }) => {
                            let message = match reason {
                                LinkFallback::ShareUnsupported => {
                                    MSG_SHARE_UNSUPPORTED_LINK_COPIED
                                }
                                LinkFallback::ShareCancelled | LinkFallback::ShareFailed => {
                                    MSG_LINK_COPIED
                                }
                            };
                            model.show_toast(message, ToastKind::Success);
                        }
                        (Err(e), purpose) => {
                            let err =
                                AppError::new(ErrorKind::ClipboardDenied, "clipboard write failed")
                                    .with_internal(CapabilityError::from(e).to_string());
                            warn!(code = err.code(), error = %err, ?purpose, "clipboard write failed");
                            model.show_toast(err.user_facing_message(), ToastKind::Error);
                        }
                    }
                    caps.render.render();
                }

                Event::FrameOpened { kind } => {
                    model.active_frame = Some(kind);
                    caps.render.render();
                }

                Event::FrameDismissed => {
                    model.active_frame = None;
                    caps.render.render();
                }

                Event::FullTextRequested => {
                    model.full_text_visible = true;
                    caps.render.render();
                }

                Event::DismissToast => {
                    model.clear_toast();
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            let event = model.current_event();
            let position = model.cursor.index();
            let total = model.store.len();

            let modes = Mode::ALL
                .iter()
                .map(|mode| ModeOption {
                    id: UiAction::SelectMode(*mode).id().to_string(),
                    mode: *mode,
                    label: mode.label().to_string(),
                    selected: *mode == model.mode,
                })
                .collect();

            let full_text = model.full_text_visible.then(|| {
                if event.content.trim().is_empty() {
                    FULL_TEXT_PLACEHOLDER.to_string()
                } else {
                    event.content.clone()
                }
            });

            ViewModel {
                title: event.title.clone(),
                analysis: Self::analysis_view(model),
                mode: model.mode,
                modes,
                position,
                total,
                can_go_prev: model.cursor.prev().is_some(),
                can_go_next: model.cursor.next(total).is_some(),
                engine_ready: model.is_engine_ready(),
                toast: model
                    .active_toast
                    .as_ref()
                    .filter(|t| !t.is_expired(get_current_time_ms()))
                    .map(ToastView::from),
                frame: model.active_frame.map(|kind| FrameView {
                    kind,
                    title: kind.title().to_string(),
                    message: kind.description().to_string(),
                }),
                full_text,
            }
        }
    }
}
