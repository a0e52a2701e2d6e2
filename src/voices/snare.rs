//! Snare drum recipes.
//!
//! A synthesized snare combines a tonal body with noise for the "snare"
//! rattle. Real snares have metal wires stretched across the bottom head
//! that buzz when the drum is struck; filtered noise stands in for them.
//!
//! # How It Works
//!
//! 1. Triangle wave provides the tonal "body" (the drum head sound)
//! 2. Noise provides the rattle
//! 3. Both layers decay exponentially, the noise a bit longer
//! 4. A band-pass or high-pass filter shapes the wire buzz
//!
//! # Variations
//!
//! - Classic: balanced body and band-passed rattle
//! - Tight: higher, shorter body, high-passed snap
//! - Electronic: mostly resonant noise with a swept body (909-ish)

use crate::dsp::filter::FilterResponse;
use crate::dsp::oscillator::OscillatorWaveform;

use super::recipe::{NoiseLayer, Recipe, ToneLayer};

pub const CLASSIC: Recipe = Recipe {
    tone: Some(ToneLayer {
        waveform: OscillatorWaveform::Triangle,
        start_hz: 190.0,
        end_hz: 180.0,
        sweep: 0.02,
        decay: 0.06,
        level: 0.6,
    }),
    noise: Some(NoiseLayer {
        response: FilterResponse::BandPass,
        cutoff_hz: 3_000.0,
        q: 0.8,
        decay: 0.07,
        level: 0.9,
    }),
    attack: 0.001,
    gain: 0.8,
};

pub const TIGHT: Recipe = Recipe {
    tone: Some(ToneLayer {
        waveform: OscillatorWaveform::Triangle,
        start_hz: 260.0,
        end_hz: 240.0,
        sweep: 0.01,
        decay: 0.03,
        level: 0.5,
    }),
    noise: Some(NoiseLayer {
        response: FilterResponse::HighPass,
        cutoff_hz: 2_500.0,
        q: 0.7,
        decay: 0.035,
        level: 1.0,
    }),
    attack: 0.0005,
    gain: 0.8,
};

pub const ELECTRONIC: Recipe = Recipe {
    tone: Some(ToneLayer {
        waveform: OscillatorWaveform::Sine,
        start_hz: 330.0,
        end_hz: 180.0,
        sweep: 0.015,
        decay: 0.05,
        level: 0.5,
    }),
    noise: Some(NoiseLayer {
        response: FilterResponse::BandPass,
        cutoff_hz: 1_800.0,
        q: 2.5,
        decay: 0.1,
        level: 1.0,
    }),
    attack: 0.001,
    gain: 0.8,
};
