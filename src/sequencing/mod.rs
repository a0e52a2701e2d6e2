//! Drum patterns, the pattern library and the lookahead step sequencer.

pub mod clock;
pub mod pattern;
pub mod sequencer;
pub mod store;
mod trigger;

pub use clock::{step_duration, StepClock};
pub use pattern::{DrumPattern, DEFAULT_PATTERN_STEPS, MAX_PATTERN_STEPS};
pub use sequencer::{RhythmSequencer, SchedulerTiming, TransportState, TRIGGER_CAPACITY};
pub use store::{PatternStore, FALLBACK_PATTERN, PROTECTED_PATTERNS};
pub use trigger::{DrumTimbre, DrumTrigger, Instrument};
