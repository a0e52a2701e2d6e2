//! Algorithmic reverb impulse response.
//!
//! # How It Works
//!
//! A diffuse room tail is well approximated by noise with a decaying
//! envelope. Each channel gets its own seeded noise so the two tails are
//! uncorrelated, which is what makes a convolution reverb sound wide.
//!
//! ```text
//! amplitude
//!   │╲
//!   │ ╲╲
//!   │   ╲╲╲
//!   │      ╲╲╲╲__
//!   │            ╲╲╲╲╲______
//!   └──────────────────────────▶ t
//!   0                          T (2 s)
//!
//! env(t) = (1 - t/T)² · e^(-3t/T)
//! ```
//!
//! A one-pole lowpass darkens the noise (real rooms absorb highs first).
//! Finally each channel is scaled to unit energy, so white input comes out
//! of the convolver at roughly the same RMS it went in.
//!
//! The response is built once when the engine starts and never regenerated.

use crate::dsp::oscillator::Noise;

pub const IMPULSE_SECONDS: f32 = 2.0;

const SEEDS: [u64; 2] = [0x5EED_0001_A11C_E5E1, 0x5EED_0002_B0B0_CAFE];

/// Lowpass coefficient of the tail darkening filter.
const DAMPING: f32 = 0.35;

/// Stereo impulse response, one buffer per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
    pub sample_rate: u32,
}

impl ImpulseResponse {
    pub fn synthesize(sample_rate: u32) -> Self {
        Self::with_length(sample_rate, IMPULSE_SECONDS)
    }

    pub fn with_length(sample_rate: u32, seconds: f32) -> Self {
        let len = ((sample_rate as f32 * seconds) as usize).max(1);
        Self {
            left: channel(len, SEEDS[0]),
            right: channel(len, SEEDS[1]),
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn duration(&self) -> f32 {
        self.len() as f32 / self.sample_rate as f32
    }
}

fn channel(len: usize, seed: u64) -> Vec<f32> {
    let mut noise = Noise::new(seed);
    let mut lowpassed = 0.0f32;
    let mut samples: Vec<f32> = (0..len)
        .map(|i| {
            let t = i as f32 / len as f32;
            let env = (1.0 - t).powi(2) * (-3.0 * t).exp();
            lowpassed += (noise.next() - lowpassed) * DAMPING;
            lowpassed * env
        })
        .collect();

    let energy: f32 = samples.iter().map(|s| s * s).sum();
    if energy > 0.0 {
        let scale = 1.0 / energy.sqrt();
        samples.iter_mut().for_each(|s| *s *= scale);
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_matches_duration() {
        let ir = ImpulseResponse::synthesize(48_000);
        assert_eq!(ir.len(), 96_000);
        assert_eq!(ir.right.len(), ir.left.len());
        assert!((ir.duration() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_is_deterministic() {
        assert_eq!(
            ImpulseResponse::with_length(8_000, 0.5),
            ImpulseResponse::with_length(8_000, 0.5)
        );
    }

    #[test]
    fn test_channels_are_decorrelated() {
        let ir = ImpulseResponse::synthesize(48_000);
        let dot: f32 = ir.left.iter().zip(&ir.right).map(|(l, r)| l * r).sum();
        // both channels have unit energy, so dot is the correlation coefficient
        assert!(dot.abs() < 0.1, "correlation {dot}");
    }

    #[test]
    fn test_unit_energy_and_decaying_tail() {
        let ir = ImpulseResponse::synthesize(48_000);
        let energy: f32 = ir.left.iter().map(|s| s * s).sum();
        assert!((energy - 1.0).abs() < 1e-3);

        let quarter = ir.len() / 4;
        let head: f32 = ir.left[..quarter].iter().map(|s| s * s).sum();
        let tail: f32 = ir.left[3 * quarter..].iter().map(|s| s * s).sum();
        assert!(head > tail * 100.0, "head {head}, tail {tail}");
    }
}
