#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tonal waveforms used by the drum bodies.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Triangle,
}

/// Phase accumulator in cycles (0.0..1.0).
///
/// Frequency is passed per sample so pitch sweeps need no extra state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Phasor {
    phase: f32,
}

impl Phasor {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    pub fn next(&mut self, waveform: OscillatorWaveform, frequency: f32, sample_rate: f32) -> f32 {
        let value = match waveform {
            OscillatorWaveform::Sine => (std::f32::consts::TAU * self.phase).sin(),
            OscillatorWaveform::Triangle => 1.0 - 4.0 * (self.phase - 0.5).abs(),
        };
        self.phase += frequency / sample_rate;
        self.phase -= self.phase.floor();
        value
    }
}

/// White noise in [-1.0, 1.0) from a seeded generator.
///
/// Seeded so that drum hits and test renders are reproducible.
#[derive(Debug, Clone)]
pub struct Noise {
    rng: fastrand::Rng,
}

impl Noise {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        self.rng.f32() * 2.0 - 1.0
    }
}
