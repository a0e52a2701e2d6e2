//! Distortion / Waveshaping
//!
//! Distortion adds harmonics by reshaping the waveform. The drive intensity
//! `k` (0..=100) controls how aggressively the signal is pushed into the
//! nonlinear region of a transfer function.
//!
//! # How Waveshaping Works
//!
//! A waveshaper applies a transfer function to each sample:
//!   output = f(input)
//!
//! Every function here is normalized so that f(±1) = ±1: turning up the
//! drive changes the shape of the curve, not the peak level. At k = 0 each
//! function is (or is indistinguishable from) the identity line.
//!
//! # The Three Models
//!
//! Overdrive (rational soft clip):
//!   f(x) = (1 + d)·x / (1 + d·|x|),  d = k / 5
//!   - Gentle, asymptotic compression, widest linear region
//!   - Tube-screamer style push
//!
//! Distortion (normalized tanh):
//!   f(x) = tanh(g·x) / tanh(g),  g = 1 + k / 4
//!   - Harder knee, flattens sooner
//!
//! Fuzz (asymmetric exponential):
//!   f(x) = sign(x)·(1 - e^(-g·|x|)) / (1 - e^(-g))
//!   g = 3 + k / 2 on the positive half, 1.5× that on the negative half
//!   - Nearly square at high drive
//!   - Uneven halves add even harmonics (the "spit" of a fuzz box)
//!
//! # Clip Point
//!
//! The clip point of a curve is the smallest input whose output reaches 90%
//! of full scale. At equal k the models always order
//!
//!   overdrive  >  distortion  >  fuzz
//!
//! so fuzz always saturates first.

/// Overdrive transfer for drive intensity `k` in [0, 100].
#[inline]
pub fn overdrive(x: f32, k: f32) -> f32 {
    let d = k / 5.0;
    (1.0 + d) * x / (1.0 + d * x.abs())
}

/// Distortion transfer for drive intensity `k` in [0, 100].
#[inline]
pub fn distortion(x: f32, k: f32) -> f32 {
    let g = 1.0 + k / 4.0;
    (g * x).tanh() / g.tanh()
}

/// Fuzz transfer for drive intensity `k` in [0, 100].
#[inline]
pub fn fuzz(x: f32, k: f32) -> f32 {
    let positive = 3.0 + k / 2.0;
    let g = if x >= 0.0 { positive } else { positive * 1.5 };
    x.signum() * (1.0 - (-g * x.abs()).exp()) / (1.0 - (-g).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overdrive_is_identity_without_drive() {
        for &x in &[-1.0, -0.4, 0.0, 0.3, 1.0] {
            assert!((overdrive(x, 0.0) - x).abs() < 1e-6);
        }
    }

    #[test]
    fn test_all_models_hit_full_scale() {
        for &k in &[0.0, 10.0, 50.0, 100.0] {
            for f in [overdrive, distortion, fuzz] {
                assert!((f(1.0, k) - 1.0).abs() < 1e-5);
                assert!((f(-1.0, k) + 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_fuzz_is_asymmetric() {
        let k = 40.0;
        assert!(fuzz(-0.1, k).abs() > fuzz(0.1, k));
    }

    #[test]
    fn test_more_drive_compresses_more() {
        assert!(distortion(0.2, 80.0) > distortion(0.2, 10.0));
        assert!(overdrive(0.2, 80.0) > overdrive(0.2, 10.0));
    }
}
