//! Realtime-safe DSP primitives. Nothing here allocates after construction.

pub mod convolver;
pub mod delay;
pub mod distortion;
pub mod dynamics;
pub mod envelope;
pub mod filter;
pub mod lfo;
pub mod mix;
pub mod oscillator;
pub mod smooth;
