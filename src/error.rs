use thiserror::Error;

use crate::looper::RecordingState;

/// Errors surfaced by the engine's non-realtime operations.
///
/// Realtime problems (underruns, ring overflows, stream errors) never show up
/// here; they are counted in [`crate::engine::EngineStats`] instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("engine has not been started")]
    NotStarted,

    #[error("invalid drum pattern: {0}")]
    InvalidPattern(String),

    #[error("recorder is {0}")]
    RecordingState(RecordingState),

    #[error("nothing audible to export")]
    ExportEmpty,

    #[error("pattern '{0}' is built in and cannot be changed")]
    PatternProtected(String),

    #[error("no pattern named '{0}'")]
    UnknownPattern(String),

    #[error("could not decode take: {0}")]
    Decode(String),

    #[error("could not encode audio")]
    Encode(#[from] hound::Error),

    #[cfg(feature = "serde")]
    #[error("pattern json")]
    Json(#[from] serde_json::Error),
}
