#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::{HihatType, KickType, RhythmSettings, SnareType};

/// One lane of a drum pattern.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    Kick,
    Snare,
    Hihat,
}

impl Instrument {
    pub const ALL: [Instrument; 3] = [Instrument::Kick, Instrument::Snare, Instrument::Hihat];

    /// Timbre selected for this lane by the rhythm settings.
    pub fn timbre(self, settings: &RhythmSettings) -> DrumTimbre {
        match self {
            Instrument::Kick => DrumTimbre::Kick(settings.kick),
            Instrument::Snare => DrumTimbre::Snare(settings.snare),
            Instrument::Hihat => DrumTimbre::Hihat(settings.hihat),
        }
    }
}

/// Which recipe a hit plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrumTimbre {
    Kick(KickType),
    Snare(SnareType),
    Hihat(HihatType),
}

impl DrumTimbre {
    pub fn instrument(self) -> Instrument {
        match self {
            DrumTimbre::Kick(_) => Instrument::Kick,
            DrumTimbre::Snare(_) => Instrument::Snare,
            DrumTimbre::Hihat(_) => Instrument::Hihat,
        }
    }
}

/// A hit scheduled on the audio clock.
///
/// Produced by the sequencer on the housekeeping thread and consumed by the
/// drum bus inside the audio callback. `Copy` so it can travel through a
/// ring without allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrumTrigger {
    pub timbre: DrumTimbre,
    /// Absolute frame index on the engine's audio clock.
    pub at_sample: u64,
    pub gain: f32,
    /// Pattern step this hit belongs to.
    pub step: usize,
}

impl DrumTrigger {
    pub fn instrument(&self) -> Instrument {
        self.timbre.instrument()
    }
}
