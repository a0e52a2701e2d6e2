//! Kick drum recipes.
//!
//! A synthesized kick is a sine wave with a pitch envelope. The pitch starts
//! high and quickly drops to the fundamental, creating the characteristic
//! "punch".
//!
//! # How It Works
//!
//! 1. Sine oscillator provides the body (pure, deep tone)
//! 2. Very fast pitch sweep: starts ~150Hz, drops to ~50Hz
//! 3. Amplitude envelope with instant attack, exponential decay
//! 4. Optional low-passed noise burst for beater click
//!
//! # Variations
//!
//! - Classic: tight rock kick, short sweep, no click
//! - Heavy: lower, longer, with a dark click layer on top
//! - Electronic: 808-style, very fast sweep and a long boomy tail

use crate::dsp::filter::FilterResponse;
use crate::dsp::oscillator::OscillatorWaveform;

use super::recipe::{NoiseLayer, Recipe, ToneLayer};

pub const CLASSIC: Recipe = Recipe {
    tone: Some(ToneLayer {
        waveform: OscillatorWaveform::Sine,
        start_hz: 150.0,
        end_hz: 50.0,
        sweep: 0.03,
        decay: 0.12,
        level: 1.0,
    }),
    noise: None,
    attack: 0.001,
    gain: 1.0,
};

pub const HEAVY: Recipe = Recipe {
    tone: Some(ToneLayer {
        waveform: OscillatorWaveform::Sine,
        start_hz: 120.0,
        end_hz: 40.0,
        sweep: 0.05,
        decay: 0.22,
        level: 1.0,
    }),
    noise: Some(NoiseLayer {
        response: FilterResponse::LowPass,
        cutoff_hz: 1_000.0,
        q: 0.7,
        decay: 0.01,
        level: 0.4,
    }),
    attack: 0.001,
    gain: 1.0,
};

pub const ELECTRONIC: Recipe = Recipe {
    tone: Some(ToneLayer {
        waveform: OscillatorWaveform::Sine,
        start_hz: 200.0,
        end_hz: 45.0,
        sweep: 0.012,
        decay: 0.35,
        level: 1.0,
    }),
    noise: None,
    attack: 0.0005,
    gain: 0.9,
};
