//! Distortion transfer tables.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::distortion::{distortion, fuzz, overdrive};
use crate::params::{DriveModel, EffectSettings, InputMode};

/// Points in every transfer table, spanning input [-1, 1].
pub const CURVE_POINTS: usize = 44_100;

/// Drive setting scaled to curve intensity.
pub const DRIVE_INTENSITY: f32 = 100.0;

/// Everything a transfer table depends on. Two equal keys build identical
/// tables, so the control side only rebuilds when the key changes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveKey {
    pub mode: InputMode,
    pub model: DriveModel,
    pub drive: f32,
}

impl CurveKey {
    pub fn from_settings(settings: &EffectSettings) -> Self {
        Self {
            mode: settings.input_mode,
            model: settings.drive_model,
            drive: settings.drive.clamp(0.0, 1.0),
        }
    }

    /// Curve intensity `k` in [0, 100].
    pub fn intensity(&self) -> f32 {
        self.drive * DRIVE_INTENSITY
    }

    /// Evaluate the analytic transfer function this key describes.
    pub fn transfer(&self, x: f32) -> f32 {
        if self.mode == InputMode::Vocal {
            return x;
        }
        let k = self.intensity();
        match self.model {
            DriveModel::Overdrive => overdrive(x, k),
            DriveModel::Distortion => distortion(x, k),
            DriveModel::Fuzz => fuzz(x, k),
        }
    }
}

/// Sampled transfer function read by the waveshaper stage.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferCurve {
    points: Vec<f32>,
}

impl TransferCurve {
    pub fn build(key: &CurveKey) -> Self {
        Self::sample(CURVE_POINTS, |x| key.transfer(x))
    }

    pub fn identity() -> Self {
        Self::sample(CURVE_POINTS, |x| x)
    }

    fn sample(len: usize, f: impl Fn(f32) -> f32) -> Self {
        let last = (len - 1) as f32;
        let points = (0..len)
            .map(|i| f(i as f32 / last * 2.0 - 1.0))
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[f32] {
        &self.points
    }

    /// Interpolated table read; input outside [-1, 1] is clamped.
    #[inline]
    pub fn lookup(&self, x: f32) -> f32 {
        let last = self.points.len() - 1;
        let x = if x.is_nan() { 0.0 } else { x.clamp(-1.0, 1.0) };
        let pos = (x + 1.0) * 0.5 * last as f32;
        let index = (pos as usize).min(last);
        let frac = pos - index as f32;
        let a = self.points[index];
        let b = self.points[(index + 1).min(last)];
        a + (b - a) * frac
    }

    /// Smallest input magnitude whose output reaches `level` on the positive
    /// and negative halves, or `None` when a half never gets there.
    pub fn clip_point(&self, level: f32) -> (Option<f32>, Option<f32>) {
        let last = (self.points.len() - 1) as f32;
        let input_at = |i: usize| i as f32 / last * 2.0 - 1.0;
        let centre = self.points.len() / 2;

        let positive = self.points[centre..]
            .iter()
            .position(|&y| y >= level)
            .map(|i| input_at(centre + i));
        let negative = self.points[..=centre]
            .iter()
            .rposition(|&y| y <= -level)
            .map(|i| -input_at(i));
        (positive, negative)
    }

    /// Earliest clip point over both halves.
    pub fn earliest_clip(&self, level: f32) -> Option<f32> {
        match self.clip_point(level) {
            (Some(p), Some(n)) => Some(p.min(n)),
            (p, n) => p.or(n),
        }
    }
}
