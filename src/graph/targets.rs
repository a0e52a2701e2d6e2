//! Mapping from caller settings to per-stage numeric targets.

use crate::curve::CurveKey;
use crate::graph::chorus::CHORUS_MAX_SWEEP;
use crate::graph::delay::DELAY_WET_GAIN;
use crate::params::{EffectSettings, InputMode};

pub const GUITAR_HIGHPASS_HZ: f32 = 80.0;
pub const VOCAL_HIGHPASS_HZ: f32 = 60.0;
pub const GUITAR_CABINET_HZ: f32 = 4_500.0;
pub const VOCAL_CABINET_HZ: f32 = 20_000.0;

pub const BASS_HZ: f32 = 320.0;
pub const MID_HZ: f32 = 1_000.0;
pub const MID_Q: f32 = 1.0;
pub const TREBLE_HZ: f32 = 3_200.0;

/// What every stage should glide toward.
///
/// Built by a pure function of [`EffectSettings`]; the realtime side only
/// copies these numbers into its smoothers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageTargets {
    pub input_gain: f32,
    pub gate_threshold_db: f32,
    pub highpass_hz: f32,
    pub curve: CurveKey,
    pub bass_db: f32,
    pub mid_db: f32,
    pub treble_db: f32,
    pub cabinet_hz: f32,
    pub dry_gain: f32,
    pub delay_seconds: f32,
    pub delay_feedback: f32,
    pub delay_wet: f32,
    pub reverb_wet: f32,
    pub chorus_rate_hz: f32,
    pub chorus_depth_seconds: f32,
    pub chorus_wet: f32,
    pub tremolo_rate_hz: f32,
    pub tremolo_depth: f32,
    pub compressor_threshold_db: f32,
    pub compressor_ratio: f32,
    pub output_gain: f32,
}

impl StageTargets {
    pub fn from_settings(settings: &EffectSettings) -> Self {
        let s = settings.clamped();
        let (highpass_hz, cabinet_hz) = match s.input_mode {
            InputMode::Guitar => (GUITAR_HIGHPASS_HZ, GUITAR_CABINET_HZ),
            InputMode::Vocal => (VOCAL_HIGHPASS_HZ, VOCAL_CABINET_HZ),
        };

        Self {
            input_gain: s.input_gain,
            gate_threshold_db: s.noise_gate_threshold,
            highpass_hz,
            curve: CurveKey::from_settings(&s),
            bass_db: s.tone_bass,
            mid_db: s.tone_mid,
            treble_db: s.tone_treble,
            cabinet_hz,
            dry_gain: 1.0,
            delay_seconds: s.delay_time,
            delay_feedback: s.delay_feedback,
            delay_wet: DELAY_WET_GAIN,
            reverb_wet: s.reverb_mix,
            chorus_rate_hz: s.chorus_speed,
            chorus_depth_seconds: s.chorus_depth * CHORUS_MAX_SWEEP,
            chorus_wet: s.chorus_mix,
            tremolo_rate_hz: s.tremolo_speed,
            tremolo_depth: s.tremolo_depth,
            compressor_threshold_db: s.compressor_threshold,
            compressor_ratio: s.compressor_ratio,
            output_gain: s.output_volume,
        }
    }
}

impl Default for StageTargets {
    fn default() -> Self {
        Self::from_settings(&EffectSettings::default())
    }
}
