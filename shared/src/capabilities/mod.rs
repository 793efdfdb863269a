mod clipboard;
mod engine;
mod share;

pub use self::clipboard::{Clipboard, ClipboardError, ClipboardOperation, ClipboardResult};
pub use self::engine::{
    serve, AnalysisEngine, Engine, EngineError, EngineOperation, EngineOutput, EngineResult,
};
pub use self::share::{Share, ShareError, ShareOperation, ShareOutput, ShareResult};

// Crux's built-in Render capability covers view updates.
pub use crux_core::render::Render;

// The Effect derive expands against `App`.
#[allow(unused_imports)]
use crate::App;
use crate::event::Event;

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Share error: {0}")]
    Share(#[from] ShareError),
}

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub engine: Engine<Event>,
    pub clipboard: Clipboard<Event>,
    pub share: Share<Event>,
}
