//! Drum voices for the rhythm track.
//!
//! Each instrument has three fixed recipes (see [`kick`], [`snare`] and
//! [`hihat`]). A recipe is plain data; [`DrumVoice`] plays one hit of it and
//! [`DrumBus`] owns the voice pool inside the audio callback.
//!
//! # Example
//!
//! ```
//! use neuroamp_dsp::params::SnareType;
//! use neuroamp_dsp::sequencing::DrumTimbre;
//! use neuroamp_dsp::voices::recipe_for;
//!
//! let tight = recipe_for(DrumTimbre::Snare(SnareType::Tight));
//! assert!(tight.noise.is_some());
//! ```

mod bus;
pub mod hihat;
pub mod kick;
mod recipe;
pub mod snare;
mod voice;

pub use bus::{DrumBus, MAX_DRUM_VOICES, MAX_PENDING_TRIGGERS};
pub use recipe::{recipe_for, NoiseLayer, Recipe, ToneLayer};
pub use voice::DrumVoice;
