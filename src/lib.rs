pub mod config;
pub mod curve; // Distortion tables and reverb impulse responses
pub mod dsp;
pub mod engine;
pub mod error;
pub mod graph; // Effects chain topology and realtime nodes
pub mod looper; // Take capture and offline mixdown
pub mod params;
pub mod sequencing; // Drum patterns and lookahead scheduling
pub mod voices;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Time every smoothed parameter needs to settle on a new target, in seconds.
pub const SMOOTHING_TIME: f32 = 0.1;

/// Sixteenth-note grid: four sequencer steps per beat.
pub const STEPS_PER_BEAT: u32 = 4;

pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
