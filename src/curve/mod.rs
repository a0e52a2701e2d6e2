//! Curve synthesis: waveshaper tables and the reverb impulse response.
//!
//! Both run on the control side. Tables are handed to the realtime thread
//! fully built.

pub mod impulse;
pub mod shaper;

pub use impulse::ImpulseResponse;
pub use shaper::{CurveKey, TransferCurve, CURVE_POINTS};
