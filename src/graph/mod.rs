//! The effects chain: node types, the static topology, and the executor.
//!
//! Nodes wrap the DSP primitives in `dsp` with smoothed parameters and
//! block-based rendering. [`topology`] describes how they connect,
//! [`signal::SignalGraph`] runs them inside the audio callback, and
//! [`control`] carries parameter changes across to it.

/// Frequency and waveform snapshots of the master bus.
pub mod analysis;
/// Modulated short delay, wet only.
pub mod chorus;
/// Control-thread to audio-thread message rings.
pub mod control;
/// Echo with a feedback loop, wet only.
pub mod delay;
/// Noise gate and compressor.
pub mod dynamics;
/// Smoothed SVF stage.
pub mod filter;
/// Smoothed gain stage.
pub mod gain;
/// Core traits shared by all graph nodes.
pub mod node;
/// Stereo convolution reverb.
pub mod reverb;
/// Table-lookup waveshaper.
pub mod shaper;
/// Executor over the fixed topology.
pub mod signal;
/// Settings to per-stage numeric targets.
pub mod targets;
pub mod topology;
/// Amplitude LFO.
pub mod tremolo;

pub use analysis::{AnalysisFrame, Analyser};
pub use control::{graph_channel, GraphController, GraphInbox, GraphMessage};
pub use signal::{DestinationWriter, SignalGraph, TapSink, RENDER_QUANTUM};
pub use targets::StageTargets;
pub use topology::{Edge, Stage, EDGES};
