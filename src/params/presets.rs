//! Read-only factory tones.
//!
//! Each preset is a full [`EffectSettings`] built over the default, so
//! fields a preset doesn't mention keep their initial values.

use super::effect::{DriveModel, EffectSettings};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TonePreset {
    pub name: &'static str,
    pub description: &'static str,
    pub settings: EffectSettings,
}

const D: EffectSettings = EffectSettings::DEFAULT;

pub const FACTORY_PRESETS: [TonePreset; 5] = [
    TonePreset {
        name: "Clean Start",
        description: "Crystal clear tone with a touch of space.",
        settings: EffectSettings {
            delay_time: 0.0,
            reverb_mix: 0.15,
            compressor_threshold: -20.0,
            compressor_ratio: 4.0,
            ..D
        },
    },
    TonePreset {
        name: "Blues Breaker",
        description: "Warm overdrive for expressive leads.",
        settings: EffectSettings {
            input_gain: 1.2,
            drive: 0.35,
            tone_bass: 2.0,
            tone_mid: 3.5,
            tone_treble: 1.0,
            reverb_mix: 0.2,
            delay_time: 0.0,
            compressor_threshold: -15.0,
            compressor_ratio: 3.0,
            ..D
        },
    },
    TonePreset {
        name: "Shoegaze Wall",
        description: "Massive distortion washed in reverb.",
        settings: EffectSettings {
            drive: 0.8,
            drive_model: DriveModel::Fuzz,
            tone_bass: 4.0,
            tone_mid: -2.0,
            tone_treble: 2.0,
            reverb_mix: 0.6,
            delay_time: 0.35,
            delay_feedback: 0.6,
            chorus_mix: 0.3,
            chorus_speed: 0.5,
            chorus_depth: 0.8,
            tremolo_depth: 0.4,
            tremolo_speed: 4.0,
            compressor_threshold: -30.0,
            compressor_ratio: 8.0,
            ..D
        },
    },
    TonePreset {
        name: "80s Clean",
        description: "Compressed clean with thick chorus.",
        settings: EffectSettings {
            input_gain: 1.4,
            tone_bass: -1.0,
            tone_treble: 4.0,
            reverb_mix: 0.3,
            delay_time: 0.25,
            delay_feedback: 0.1,
            chorus_mix: 0.6,
            chorus_speed: 2.0,
            chorus_depth: 0.7,
            compressor_threshold: -25.0,
            compressor_ratio: 8.0,
            ..D
        },
    },
    TonePreset {
        name: "Slapback Rockabilly",
        description: "Tight delay for that 50s sound.",
        settings: EffectSettings {
            input_gain: 1.1,
            drive: 0.15,
            tone_bass: 1.0,
            tone_mid: 2.0,
            tone_treble: 4.0,
            reverb_mix: 0.1,
            delay_time: 0.12,
            delay_feedback: 0.3,
            tremolo_depth: 0.3,
            tremolo_speed: 6.0,
            compressor_threshold: -15.0,
            compressor_ratio: 3.0,
            ..D
        },
    },
];

/// Look up a factory preset by name, ignoring case.
pub fn find_preset(name: &str) -> Option<&'static TonePreset> {
    FACTORY_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_within_range() {
        for preset in &FACTORY_PRESETS {
            assert_eq!(
                preset.settings.clamped(),
                preset.settings,
                "{} has an out-of-range field",
                preset.name
            );
        }
    }

    #[test]
    fn lookup_ignores_case() {
        let p = find_preset("shoegaze wall").expect("preset exists");
        assert_eq!(p.settings.drive_model, DriveModel::Fuzz);
        assert!(find_preset("Nope").is_none());
    }
}
