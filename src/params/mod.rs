//! Parameter model: plain values the caller edits and hands to the engine.

pub mod effect;
pub mod presets;
pub mod rhythm;

pub use effect::{DriveModel, EffectSettings, InputMode};
pub use presets::{find_preset, TonePreset, FACTORY_PRESETS};
pub use rhythm::{HihatType, KickType, RhythmSettings, SnareType};
