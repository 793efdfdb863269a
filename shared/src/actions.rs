//! UI action dispatch table.
//!
//! Each page affordance has one identifier and maps to exactly one controller
//! event. Shells bind the table once at startup instead of wiring handlers per
//! element.

use std::str::FromStr;
use thiserror::Error;

use crate::event::{Direction, Event, FrameKind, Mode};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no UI action is bound to `{0}`")]
pub struct ActionError(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    SelectMode(Mode),
    Prev,
    Next,
    Copy,
    Share,
    OpenFrame(FrameKind),
    ShowFullText,
}

pub const ACTION_BINDINGS: &[(&str, UiAction)] = &[
    ("mode-constructive", UiAction::SelectMode(Mode::Constructive)),
    ("mode-analytical", UiAction::SelectMode(Mode::Analytical)),
    ("mode-critical", UiAction::SelectMode(Mode::Critical)),
    ("btn-prev", UiAction::Prev),
    ("btn-next", UiAction::Next),
    ("btn-copy", UiAction::Copy),
    ("btn-share", UiAction::Share),
    ("btn-cause", UiAction::OpenFrame(FrameKind::Cause)),
    ("btn-effect", UiAction::OpenFrame(FrameKind::Effect)),
    ("btn-full-text", UiAction::ShowFullText),
];

impl UiAction {
    #[must_use]
    pub fn id(self) -> &'static str {
        ACTION_BINDINGS
            .iter()
            .find(|(_, action)| *action == self)
            .map_or("", |(id, _)| id)
    }

    #[must_use]
    pub const fn into_event(self) -> Event {
        match self {
            Self::SelectMode(mode) => Event::ModeSelected { mode },
            Self::Prev => Event::Navigate {
                direction: Direction::Prev,
            },
            Self::Next => Event::Navigate {
                direction: Direction::Next,
            },
            Self::Copy => Event::CopyRequested,
            Self::Share => Event::ShareRequested,
            Self::OpenFrame(kind) => Event::FrameOpened { kind },
            Self::ShowFullText => Event::FullTextRequested,
        }
    }
}

impl FromStr for UiAction {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ACTION_BINDINGS
            .iter()
            .find(|(id, _)| *id == s)
            .map(|(_, action)| *action)
            .ok_or_else(|| ActionError(s.to_string()))
    }
}

/// Resolves an action identifier straight to the event it dispatches.
pub fn dispatch(action_id: &str) -> Result<Event, ActionError> {
    action_id.parse::<UiAction>().map(UiAction::into_event)
}
