use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEGRADED_ENGINE_MESSAGE: &str =
    "Analysis engine unavailable. Reload the page to try again.";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed for this event.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    EngineUnavailable,
    AnalysisFailed,
    ClipboardDenied,
    ShareDenied,
    AssetFetch,
    Serialization,
    InvalidState,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EngineUnavailable => "ENGINE_UNAVAILABLE",
            Self::AnalysisFailed => "ANALYSIS_FAILED",
            Self::ClipboardDenied => "CLIPBOARD_DENIED",
            Self::ShareDenied => "SHARE_DENIED",
            Self::AssetFetch => "ASSET_FETCH_ERROR",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::InvalidState => "INVALID_STATE",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::ClipboardDenied | Self::ShareDenied | Self::AssetFetch => {
                ErrorSeverity::Transient
            }
            Self::AnalysisFailed | Self::Serialization => ErrorSeverity::Permanent,
            Self::EngineUnavailable | Self::InvalidState | Self::Internal => ErrorSeverity::Fatal,
        }
    }

    /// Whether the failure is scoped to a single operation and leaves the
    /// rest of the session usable.
    #[must_use]
    pub const fn is_local(self) -> bool {
        !matches!(self, Self::EngineUnavailable)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::EngineUnavailable => DEGRADED_ENGINE_MESSAGE.into(),
            ErrorKind::AnalysisFailed => ANALYSIS_FAILED_MESSAGE.into(),
            ErrorKind::ClipboardDenied => {
                "Could not copy to the clipboard. Check the browser permissions.".into()
            }
            ErrorKind::ShareDenied => "Sharing is not available right now.".into(),
            ErrorKind::AssetFetch => "Some offline files could not be downloaded.".into(),
            ErrorKind::Serialization => {
                "A data error occurred. Please reload the page if this persists.".into()
            }
            ErrorKind::InvalidState | ErrorKind::Internal => self.message.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}
