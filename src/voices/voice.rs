use crate::dsp::envelope::DecayEnvelope;
use crate::dsp::filter::SVFilter;
use crate::dsp::oscillator::{Noise, Phasor};

use super::recipe::Recipe;

/// One sounding drum hit.
///
/// Voices are preallocated by the drum bus and reused. Starting a hit only
/// copies a recipe and retunes a filter, so it is safe on the audio thread.
pub struct DrumVoice {
    recipe: Option<&'static Recipe>,
    gain: f32,
    age: u64,
    // Frames to wait inside the current block before sounding.
    offset: usize,

    phasor: Phasor,
    frequency: f32,
    sweep_coeff: f32,
    tone_env: DecayEnvelope,

    noise: Noise,
    noise_filter: SVFilter,
    noise_env: DecayEnvelope,
}

impl DrumVoice {
    pub fn new(seed: u64) -> Self {
        Self {
            recipe: None,
            gain: 0.0,
            age: 0,
            offset: 0,
            phasor: Phasor::new(),
            frequency: 0.0,
            sweep_coeff: 0.0,
            tone_env: DecayEnvelope::new(),
            noise: Noise::new(seed),
            noise_filter: SVFilter::highpass(1_000.0),
            noise_env: DecayEnvelope::new(),
        }
    }

    /// Begin a hit `offset` frames into the next rendered block.
    pub fn start(
        &mut self,
        recipe: &'static Recipe,
        gain: f32,
        offset: usize,
        age: u64,
        sample_rate: f32,
    ) {
        self.recipe = Some(recipe);
        self.gain = gain * recipe.gain;
        self.offset = offset;
        self.age = age;

        self.phasor.reset();
        self.tone_env = DecayEnvelope::new();
        self.noise_env = DecayEnvelope::new();

        if let Some(tone) = recipe.tone {
            self.frequency = tone.start_hz;
            self.sweep_coeff = (-1.0 / (tone.sweep.max(crate::MIN_TIME) * sample_rate)).exp();
            self.tone_env.trigger(recipe.attack, tone.decay, sample_rate);
        }
        if let Some(noise) = recipe.noise {
            self.noise_filter = SVFilter::new(noise.response, noise.cutoff_hz).with_q(noise.q);
            self.noise_filter.prepare(sample_rate);
            self.noise_env.trigger(recipe.attack, noise.decay, sample_rate);
        }
    }

    /// Add this voice into `out`. Frees itself once both layers have decayed.
    pub fn render_add(&mut self, out: &mut [f32], sample_rate: f32) {
        let Some(recipe) = self.recipe else {
            return;
        };

        let skip = self.offset.min(out.len());
        self.offset -= skip;

        for sample in &mut out[skip..] {
            let mut value = 0.0;

            if let Some(tone) = recipe.tone {
                let level = self.tone_env.next();
                // Exponential glide toward the resting pitch
                self.frequency = tone.end_hz + (self.frequency - tone.end_hz) * self.sweep_coeff;
                value += self.phasor.next(tone.waveform, self.frequency, sample_rate)
                    * level
                    * tone.level;
            }

            if let Some(noise) = recipe.noise {
                let level = self.noise_env.next();
                value += self.noise_filter.process(self.noise.next()) * level * noise.level;
            }

            *sample += value * self.gain;
        }

        if skip < out.len() && !self.tone_env.is_active() && !self.noise_env.is_active() {
            self.recipe = None;
        }
    }

    pub fn is_free(&self) -> bool {
        self.recipe.is_none()
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn stop(&mut self) {
        self.recipe = None;
        self.noise_filter.reset();
    }
}
