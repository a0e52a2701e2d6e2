//! Hi-hat recipes (closed).
//!
//! A tight, short burst of filtered noise. Closed hi-hats are the backbone
//! of most drum patterns, providing rhythmic drive.
//!
//! # How It Works
//!
//! 1. White noise provides the "metallic" character
//! 2. A high-pass or narrow band-pass keeps only the top end
//! 3. Very short envelope for that tight "tss" sound
//!
//! # Variations
//!
//! - Classic: bright high-passed noise
//! - Acoustic: darker, ringing band around 8 kHz, slightly longer
//! - Electronic: very short and very bright

use crate::dsp::filter::FilterResponse;

use super::recipe::{NoiseLayer, Recipe};

pub const CLASSIC: Recipe = Recipe {
    tone: None,
    noise: Some(NoiseLayer {
        response: FilterResponse::HighPass,
        cutoff_hz: 7_000.0,
        q: 0.7,
        decay: 0.02,
        level: 1.0,
    }),
    attack: 0.0005,
    gain: 0.5,
};

pub const ACOUSTIC: Recipe = Recipe {
    tone: None,
    noise: Some(NoiseLayer {
        response: FilterResponse::BandPass,
        cutoff_hz: 8_000.0,
        q: 1.5,
        decay: 0.04,
        level: 1.0,
    }),
    attack: 0.001,
    gain: 0.6,
};

pub const ELECTRONIC: Recipe = Recipe {
    tone: None,
    noise: Some(NoiseLayer {
        response: FilterResponse::HighPass,
        cutoff_hz: 10_000.0,
        q: 0.9,
        decay: 0.012,
        level: 1.0,
    }),
    attack: 0.0002,
    gain: 0.5,
};
