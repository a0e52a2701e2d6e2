//! Level detection and gain computers for the noise gate and compressor.
//!
//! # Signal Flow
//!
//! ```text
//! input ─┬──────────────────────────────(×)──▶ output
//!        │                               ▲
//!        └─▶ |x| ─▶ follower ─▶ dB ─▶ gain computer ─▶ gain smoothing
//! ```
//!
//! The follower turns the waveform into a level; the gain computer maps that
//! level (dB) to a gain change (dB, never positive); the smoother applies
//! attack and release so the gain moves at a musical speed.
//!
//! # Gain Computers
//!
//! Compressor (soft knee of width W around threshold T, ratio R):
//!
//! ```text
//!   x < T - W/2          y = x
//!   |x - T| <= W/2       y = x + (1/R - 1)(x - T + W/2)² / 2W
//!   x > T + W/2          y = T + (x - T) / R
//! ```
//!
//! Gate (downward expander, closes below threshold):
//!
//! ```text
//!   x >= T               0 dB
//!   x <  T               (x - T)·(GATE_RATIO - 1), floored at -GATE_RANGE_DB
//! ```

/// Silence floor for level conversions.
pub const MIN_DB: f32 = -120.0;

/// Expansion ratio below the gate threshold.
pub const GATE_RATIO: f32 = 10.0;

/// Deepest attenuation the gate applies.
pub const GATE_RANGE_DB: f32 = 80.0;

#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    if gain <= 0.0 {
        MIN_DB
    } else {
        (20.0 * gain.log10()).max(MIN_DB)
    }
}

/// One-pole coefficient for a time constant in seconds.
#[inline]
pub fn time_coeff(seconds: f32, sample_rate: f32) -> f32 {
    if seconds <= 0.0 {
        0.0
    } else {
        (-1.0 / (seconds * sample_rate)).exp()
    }
}

/// Peak follower with separate attack and release coefficients.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeFollower {
    level: f32,
    attack: f32,
    release: f32,
}

impl EnvelopeFollower {
    pub fn new(attack_seconds: f32, release_seconds: f32, sample_rate: f32) -> Self {
        Self {
            level: 0.0,
            attack: time_coeff(attack_seconds, sample_rate),
            release: time_coeff(release_seconds, sample_rate),
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let rectified = input.abs();
        let coeff = if rectified > self.level {
            self.attack
        } else {
            self.release
        };
        self.level = coeff * self.level + (1.0 - coeff) * rectified;
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
    }
}

/// Soft-knee compressor gain change in dB (always <= 0).
#[inline]
pub fn compressor_gain_db(level_db: f32, threshold_db: f32, ratio: f32, knee_db: f32) -> f32 {
    let ratio = ratio.max(1.0);
    let over = level_db - threshold_db;
    let slope = 1.0 / ratio - 1.0;

    let gain = if knee_db > 0.0 && 2.0 * over.abs() <= knee_db {
        let x = over + knee_db / 2.0;
        slope * x * x / (2.0 * knee_db)
    } else if over > 0.0 {
        slope * over
    } else {
        0.0
    };
    gain.min(0.0)
}

/// Downward-gate gain change in dB (always <= 0).
#[inline]
pub fn gate_gain_db(level_db: f32, threshold_db: f32) -> f32 {
    if level_db >= threshold_db {
        0.0
    } else {
        ((level_db - threshold_db) * (GATE_RATIO - 1.0)).max(-GATE_RANGE_DB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_round_trip() {
        assert!((db_to_gain(-6.0) - 0.501).abs() < 1e-3);
        assert!((gain_to_db(db_to_gain(-18.0)) + 18.0).abs() < 1e-4);
        assert_eq!(gain_to_db(0.0), MIN_DB);
    }

    #[test]
    fn test_compressor_below_knee_is_unity() {
        assert_eq!(compressor_gain_db(-60.0, -24.0, 12.0, 30.0), 0.0);
    }

    #[test]
    fn test_compressor_above_knee_follows_ratio() {
        // 20 dB over a 4:1 threshold comes out 5 dB over: 15 dB of reduction
        let g = compressor_gain_db(0.0, -20.0, 4.0, 6.0);
        assert!((g + 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_compressor_knee_is_continuous() {
        let (t, r, w) = (-24.0, 8.0, 30.0);
        let edge = t + w / 2.0;
        let inside = compressor_gain_db(edge - 1e-3, t, r, w);
        let outside = compressor_gain_db(edge + 1e-3, t, r, w);
        assert!((inside - outside).abs() < 1e-2);
    }

    #[test]
    fn test_ratio_one_never_compresses() {
        assert_eq!(compressor_gain_db(0.0, -50.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_gate_open_above_threshold() {
        assert_eq!(gate_gain_db(-30.0, -40.0), 0.0);
    }

    #[test]
    fn test_gate_closes_below_threshold() {
        assert!((gate_gain_db(-42.0, -40.0) + 18.0).abs() < 1e-4);
        assert_eq!(gate_gain_db(-120.0, -40.0), -GATE_RANGE_DB);
    }

    #[test]
    fn test_follower_tracks_and_releases() {
        let mut f = EnvelopeFollower::new(0.001, 0.05, 48_000.0);
        for _ in 0..480 {
            f.process(0.5);
        }
        assert!((f.level() - 0.5).abs() < 0.01);
        for _ in 0..48_000 {
            f.process(0.0);
        }
        assert!(f.level() < 1e-3);
    }
}
