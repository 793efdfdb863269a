use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::capabilities::{ClipboardResult, EngineResult, ShareResult};

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(EventId);

// --- Interpretive mode ---

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown mode: {0}")]
pub struct UnknownMode(pub String);

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Constructive,
    #[default]
    Analytical,
    Critical,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Constructive, Mode::Analytical, Mode::Critical];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Constructive => "constructive",
            Self::Analytical => "analytical",
            Self::Critical => "critical",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Constructive => "Constructive mode",
            Self::Analytical => "Analytical mode",
            Self::Critical => "Critical mode",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constructive" => Ok(Self::Constructive),
            "analytical" => Ok(Self::Analytical),
            "critical" => Ok(Self::Critical),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Prev,
    Next,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Cause,
    Effect,
}

impl FrameKind {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Cause => "Cause frame",
            Self::Effect => "Effect frame",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Cause => "Traces the conditions that led up to this event.",
            Self::Effect => "Outlines what this event is likely to set in motion.",
        }
    }
}

/// The (event, mode) pair a copy or share chain was issued for.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AnalysisTarget {
    pub event_id: EventId,
    pub mode: Mode,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkFallback {
    ShareCancelled,
    ShareFailed,
    ShareUnsupported,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ClipboardPurpose {
    Analysis,
    ShareLink { reason: LinkFallback },
}

// --- Event enum: large capability payloads boxed ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    Noop,

    AppStarted,

    // User actions
    Navigate {
        direction: Direction,
    },
    ModeSelected {
        mode: Mode,
    },
    CopyRequested,
    ShareRequested,
    FrameOpened {
        kind: FrameKind,
    },
    FrameDismissed,
    FullTextRequested,
    DismissToast,

    // Engine lifecycle
    EngineInitialized(Box<EngineResult>),
    KnowledgeBaseLoaded(Box<EngineResult>),

    // Render chain
    AnalysisReceived {
        seq: u64,
        result: Box<EngineResult>,
    },

    // Copy chain
    CopyAnalysisReceived {
        target: AnalysisTarget,
        result: Box<EngineResult>,
    },
    PlainSummaryReceived {
        target: AnalysisTarget,
        fallback: String,
        result: Box<EngineResult>,
    },

    // Share chain
    ShareAnalysisReceived {
        target: AnalysisTarget,
        result: Box<EngineResult>,
    },
    DigestReceived {
        target: AnalysisTarget,
        result: Box<EngineResult>,
    },
    ShareCompleted {
        url: String,
        result: Box<ShareResult>,
    },

    ClipboardWritten {
        purpose: ClipboardPurpose,
        result: Box<ClipboardResult>,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::AppStarted => "app_started",
            Self::Navigate { .. } => "navigate",
            Self::ModeSelected { .. } => "mode_selected",
            Self::CopyRequested => "copy_requested",
            Self::ShareRequested => "share_requested",
            Self::FrameOpened { .. } => "frame_opened",
            Self::FrameDismissed => "frame_dismissed",
            Self::FullTextRequested => "full_text_requested",
            Self::DismissToast => "dismiss_toast",
            Self::EngineInitialized(_) => "engine_initialized",
            Self::KnowledgeBaseLoaded(_) => "knowledge_base_loaded",
            Self::AnalysisReceived { .. } => "analysis_received",
            Self::CopyAnalysisReceived { .. } => "copy_analysis_received",
            Self::PlainSummaryReceived { .. } => "plain_summary_received",
            Self::ShareAnalysisReceived { .. } => "share_analysis_received",
            Self::DigestReceived { .. } => "digest_received",
            Self::ShareCompleted { .. } => "share_completed",
            Self::ClipboardWritten { .. } => "clipboard_written",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::Navigate { .. }
                | Self::ModeSelected { .. }
                | Self::CopyRequested
                | Self::ShareRequested
                | Self::FrameOpened { .. }
                | Self::FrameDismissed
                | Self::FullTextRequested
                | Self::DismissToast
        )
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::Noop
    }
}
