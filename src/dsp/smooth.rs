//! Parameter smoothing.

/*
Parameter Smoothing
===================

Jumping a gain or a cutoff from one value to another between two samples
produces a click (a step in the waveform, or a step in the filter state).
Every numeric target in the effects chain therefore glides toward its new
value through a one-pole lowpass:

    value[n+1] = target + (value[n] - target) × coeff

    coeff = exp(-1 / (tau × sample_rate))

This is an exponential approach: it never overshoots, it is monotone, and
after t seconds the remaining distance is exp(-t / tau) of the original.
We choose tau = SMOOTHING_TIME / 7, so after SMOOTHING_TIME the remaining
error is e^-7 ≈ 0.09 % of the jump. Once the distance falls under SNAP, or
f32 rounding stops the value from moving, it is set to the target exactly,
so "settled" is a real state and not an asymptote.

  value
    ▲
  1 │        ╭──────────────────────
    │      ╭─╯
    │    ╭─╯
    │   ╭╯
    │  ╱
    │ ╱
  0 │╱
    └─────────────────────────────▶ time
     0        SMOOTHING_TIME

Per-sample use (gains): call `next()` once per sample.
Per-block use (filter coefficients): call `advance(n)` once per block; the
closed form coeff^n gives the same trajectory at block boundaries.
*/

use crate::SMOOTHING_TIME;

/// Distance under which the smoother lands exactly on its target.
pub const SNAP: f32 = 1e-6;

/// Time constants per smoothing time.
const SETTLE_TAUS: f32 = 7.0;

#[derive(Debug, Clone, Copy)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    coeff: f32,
}

impl SmoothedParam {
    /// Smoother that settles within [`SMOOTHING_TIME`].
    pub fn new(value: f32, sample_rate: f32) -> Self {
        Self::with_time(value, SMOOTHING_TIME, sample_rate)
    }

    pub fn with_time(value: f32, settle_seconds: f32, sample_rate: f32) -> Self {
        let tau_samples = (settle_seconds / SETTLE_TAUS) * sample_rate;
        let coeff = if tau_samples > 0.0 {
            (-1.0 / tau_samples).exp()
        } else {
            0.0
        };
        Self {
            current: value,
            target: value,
            coeff,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump straight to `value`. Only for construction-time setup.
    pub fn snap_to(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.current != self.target {
            let next = self.target + (self.current - self.target) * self.coeff;
            self.current = if (next - self.target).abs() <= SNAP || next == self.current {
                self.target
            } else {
                next
            };
        }
        self.current
    }

    /// Advance `samples` steps at once and return the new value.
    #[inline]
    pub fn advance(&mut self, samples: usize) -> f32 {
        if self.current != self.target {
            let decay = self.coeff.powi(samples as i32);
            let next = self.target + (self.current - self.target) * decay;
            self.current = if (next - self.target).abs() <= SNAP || next == self.current {
                self.target
            } else {
                next
            };
        }
        self.current
    }
}
