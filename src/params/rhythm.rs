//! Drum machine transport settings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const BPM_RANGE: (f64, f64) = (40.0, 240.0);

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KickType {
    #[default]
    Classic,
    Heavy,
    Electronic,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SnareType {
    #[default]
    Classic,
    Tight,
    Electronic,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HihatType {
    #[default]
    Classic,
    Acoustic,
    Electronic,
}

/// Rhythm track state as the caller sees it.
///
/// `is_playing` is the transport switch: flipping it is what starts and stops
/// the sequencer. Everything else may change freely while running.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmSettings {
    pub bpm: f64,
    /// Name of the selected pattern in the pattern store.
    pub pattern: String,
    pub volume: f32,
    pub is_playing: bool,
    pub kick: KickType,
    pub snare: SnareType,
    pub hihat: HihatType,
}

impl RhythmSettings {
    pub fn clamped(&self) -> Self {
        let bpm = if self.bpm.is_finite() {
            self.bpm.clamp(BPM_RANGE.0, BPM_RANGE.1)
        } else {
            Self::default().bpm
        };
        let volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            Self::default().volume
        };
        Self {
            bpm,
            volume,
            ..self.clone()
        }
    }
}

impl Default for RhythmSettings {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            pattern: "basic-rock".to_string(),
            volume: 0.6,
            is_playing: false,
            kick: KickType::Classic,
            snare: SnareType::Classic,
            hihat: HihatType::Classic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_tempo_and_volume() {
        let fast = RhythmSettings {
            bpm: 900.0,
            volume: -0.5,
            ..Default::default()
        }
        .clamped();
        assert_eq!(fast.bpm, 240.0);
        assert_eq!(fast.volume, 0.0);

        let slow = RhythmSettings {
            bpm: f64::NAN,
            ..Default::default()
        }
        .clamped();
        assert_eq!(slow.bpm, 120.0);
    }
}
