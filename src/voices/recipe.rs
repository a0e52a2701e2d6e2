use crate::dsp::filter::FilterResponse;
use crate::dsp::oscillator::OscillatorWaveform;
use crate::params::{HihatType, KickType, SnareType};
use crate::sequencing::DrumTimbre;

use super::{hihat, kick, snare};

/// Pitched part of a hit: an oscillator whose frequency falls from
/// `start_hz` toward `end_hz` with time constant `sweep`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneLayer {
    pub waveform: OscillatorWaveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub sweep: f32,
    pub decay: f32,
    pub level: f32,
}

/// Noise part of a hit, shaped by one SVF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseLayer {
    pub response: FilterResponse,
    pub cutoff_hz: f32,
    pub q: f32,
    pub decay: f32,
    pub level: f32,
}

/// Fixed description of a drum sound. Everything a voice needs to play a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recipe {
    pub tone: Option<ToneLayer>,
    pub noise: Option<NoiseLayer>,
    /// Linear attack shared by both layers, seconds.
    pub attack: f32,
    pub gain: f32,
}

impl Recipe {
    /// Longest decay time constant of the layers.
    pub fn longest_decay(&self) -> f32 {
        let tone = self.tone.map_or(0.0, |t| t.decay);
        let noise = self.noise.map_or(0.0, |n| n.decay);
        tone.max(noise)
    }
}

pub fn recipe_for(timbre: DrumTimbre) -> &'static Recipe {
    match timbre {
        DrumTimbre::Kick(KickType::Classic) => &kick::CLASSIC,
        DrumTimbre::Kick(KickType::Heavy) => &kick::HEAVY,
        DrumTimbre::Kick(KickType::Electronic) => &kick::ELECTRONIC,
        DrumTimbre::Snare(SnareType::Classic) => &snare::CLASSIC,
        DrumTimbre::Snare(SnareType::Tight) => &snare::TIGHT,
        DrumTimbre::Snare(SnareType::Electronic) => &snare::ELECTRONIC,
        DrumTimbre::Hihat(HihatType::Classic) => &hihat::CLASSIC,
        DrumTimbre::Hihat(HihatType::Acoustic) => &hihat::ACOUSTIC,
        DrumTimbre::Hihat(HihatType::Electronic) => &hihat::ELECTRONIC,
    }
}
