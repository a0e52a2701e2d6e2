//! Effects-chain settings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which kind of source is plugged in. Changes the highpass corner, the
/// cabinet lowpass, and forces a clean (identity) distortion curve for vocals.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputMode {
    #[default]
    Guitar,
    Vocal,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DriveModel {
    #[default]
    Overdrive,
    Distortion,
    Fuzz,
}

/// Complete effects-chain state.
///
/// A plain value: callers own it, edit it, and hand a copy to
/// [`crate::Engine::apply_parameters`]. Ranges are listed per field; the engine
/// runs [`EffectSettings::clamped`] before using anything.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSettings {
    pub input_mode: InputMode,
    /// Linear gain, 0..=4.
    pub input_gain: f32,
    /// 0..=1, scaled to curve intensity `k = drive * 100`.
    pub drive: f32,
    pub drive_model: DriveModel,
    /// Low shelf at 320 Hz, dB.
    pub tone_bass: f32,
    /// Peaking band at 1 kHz, dB.
    pub tone_mid: f32,
    /// High shelf at 3.2 kHz, dB.
    pub tone_treble: f32,
    /// Seconds, 0..=5.
    pub delay_time: f32,
    pub delay_feedback: f32,
    pub reverb_mix: f32,
    /// LFO rate in Hz.
    pub chorus_speed: f32,
    pub chorus_depth: f32,
    pub chorus_mix: f32,
    pub tremolo_speed: f32,
    pub tremolo_depth: f32,
    /// dB, -100..=0.
    pub compressor_threshold: f32,
    pub compressor_ratio: f32,
    pub output_volume: f32,
    /// dB, -100..=0.
    pub noise_gate_threshold: f32,
}

pub const GAIN_RANGE: (f32, f32) = (0.0, 4.0);
pub const TONE_RANGE_DB: (f32, f32) = (-24.0, 24.0);
pub const MAX_DELAY_TIME: f32 = 5.0;
pub const MAX_FEEDBACK: f32 = 0.95;
pub const LFO_RATE_RANGE: (f32, f32) = (0.01, 20.0);
pub const THRESHOLD_RANGE_DB: (f32, f32) = (-100.0, 0.0);
pub const RATIO_RANGE: (f32, f32) = (1.0, 20.0);

impl EffectSettings {
    /// Initial tone of a fresh session: clean guitar with a little room.
    pub const DEFAULT: Self = Self {
        input_mode: InputMode::Guitar,
        input_gain: 1.0,
        drive: 0.0,
        drive_model: DriveModel::Overdrive,
        tone_bass: 0.0,
        tone_mid: 0.0,
        tone_treble: 0.0,
        delay_time: 0.3,
        delay_feedback: 0.0,
        reverb_mix: 0.1,
        chorus_speed: 1.0,
        chorus_depth: 0.0,
        chorus_mix: 0.0,
        tremolo_speed: 4.0,
        tremolo_depth: 0.0,
        compressor_threshold: -24.0,
        compressor_ratio: 12.0,
        output_volume: 0.8,
        noise_gate_threshold: -40.0,
    };

    /// Clamp every field into its legal range.
    ///
    /// Total: each field is replaced independently, and non-finite values fall
    /// back to the default for that field.
    pub fn clamped(&self) -> Self {
        let d = Self::DEFAULT;
        Self {
            input_mode: self.input_mode,
            input_gain: clamp_or(self.input_gain, GAIN_RANGE, d.input_gain),
            drive: clamp_or(self.drive, (0.0, 1.0), d.drive),
            drive_model: self.drive_model,
            tone_bass: clamp_or(self.tone_bass, TONE_RANGE_DB, d.tone_bass),
            tone_mid: clamp_or(self.tone_mid, TONE_RANGE_DB, d.tone_mid),
            tone_treble: clamp_or(self.tone_treble, TONE_RANGE_DB, d.tone_treble),
            delay_time: clamp_or(self.delay_time, (0.0, MAX_DELAY_TIME), d.delay_time),
            delay_feedback: clamp_or(self.delay_feedback, (0.0, MAX_FEEDBACK), d.delay_feedback),
            reverb_mix: clamp_or(self.reverb_mix, (0.0, 1.0), d.reverb_mix),
            chorus_speed: clamp_or(self.chorus_speed, LFO_RATE_RANGE, d.chorus_speed),
            chorus_depth: clamp_or(self.chorus_depth, (0.0, 1.0), d.chorus_depth),
            chorus_mix: clamp_or(self.chorus_mix, (0.0, 1.0), d.chorus_mix),
            tremolo_speed: clamp_or(self.tremolo_speed, LFO_RATE_RANGE, d.tremolo_speed),
            tremolo_depth: clamp_or(self.tremolo_depth, (0.0, 1.0), d.tremolo_depth),
            compressor_threshold: clamp_or(
                self.compressor_threshold,
                THRESHOLD_RANGE_DB,
                d.compressor_threshold,
            ),
            compressor_ratio: clamp_or(self.compressor_ratio, RATIO_RANGE, d.compressor_ratio),
            output_volume: clamp_or(self.output_volume, (0.0, 1.0), d.output_volume),
            noise_gate_threshold: clamp_or(
                self.noise_gate_threshold,
                THRESHOLD_RANGE_DB,
                d.noise_gate_threshold,
            ),
        }
    }
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[inline]
fn clamp_or(value: f32, (lo, hi): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_already_clamped() {
        assert_eq!(EffectSettings::default().clamped(), EffectSettings::default());
    }

    #[test]
    fn clamp_pulls_every_field_into_range() {
        let wild = EffectSettings {
            input_gain: 10.0,
            drive: -1.0,
            tone_bass: 60.0,
            tone_mid: -60.0,
            delay_time: 9.0,
            delay_feedback: 1.5,
            chorus_speed: 0.0,
            tremolo_depth: 3.0,
            compressor_threshold: 12.0,
            compressor_ratio: 0.5,
            output_volume: 2.0,
            noise_gate_threshold: -400.0,
            ..EffectSettings::default()
        };
        let c = wild.clamped();

        assert_eq!(c.input_gain, 4.0);
        assert_eq!(c.drive, 0.0);
        assert_eq!(c.tone_bass, 24.0);
        assert_eq!(c.tone_mid, -24.0);
        assert_eq!(c.delay_time, 5.0);
        assert_eq!(c.delay_feedback, 0.95);
        assert_eq!(c.chorus_speed, 0.01);
        assert_eq!(c.tremolo_depth, 1.0);
        assert_eq!(c.compressor_threshold, 0.0);
        assert_eq!(c.compressor_ratio, 1.0);
        assert_eq!(c.output_volume, 1.0);
        assert_eq!(c.noise_gate_threshold, -100.0);
    }

    #[test]
    fn non_finite_values_fall_back_to_defaults() {
        let broken = EffectSettings {
            drive: f32::NAN,
            reverb_mix: f32::INFINITY,
            ..EffectSettings::default()
        };
        let c = broken.clamped();
        assert_eq!(c.drive, EffectSettings::DEFAULT.drive);
        assert_eq!(c.reverb_mix, EffectSettings::DEFAULT.reverb_mix);
    }
}
