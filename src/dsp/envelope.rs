use crate::MIN_TIME;

/*
Percussive Envelope
===================

Drums don't sustain. A hit is a very short attack followed by a decay that
dies away on its own, so the envelope here has only two stages and no gate.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0). This multiplies
              the audio signal to control its amplitude over time.

  attack      Linear ramp from 0 to 1. A millisecond or so is enough to
              remove the click of starting a sine mid-cycle while keeping the
              transient sharp.

  decay       Exponential fall from 1 toward 0, described by a time
              constant: after `decay` seconds the level is 1/e (≈ 37 %).

  finished    The level has fallen below FLOOR (-80 dB). The voice using the
              envelope can be recycled.


The Shape
---------

  Level
    1.0 ┐ ╱╲
        │╱  ╲
        │    ╲
        │     ╲__
        │        ╲____
    0.0 └─────────────────────→ Time
        A   Decay (exponential)

Exponential decay is what struck membranes and cymbals actually do, and it
is cheap: one multiply per sample.

    level[n+1] = level[n] × coeff,   coeff = exp(-1 / (decay × sample_rate))
*/

/// Level below which a percussive envelope counts as finished.
pub const FLOOR: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Attack,
    Decay,
}

#[derive(Debug, Clone, Copy)]
pub struct DecayEnvelope {
    stage: Stage,
    level: f32,
    attack_increment: f32,
    decay_coeff: f32,
}

impl DecayEnvelope {
    pub fn new() -> Self {
        Self {
            stage: Stage::Idle,
            level: 0.0,
            attack_increment: 1.0,
            decay_coeff: 0.0,
        }
    }

    /// Start a hit with the given attack time and decay time constant.
    pub fn trigger(&mut self, attack: f32, decay: f32, sample_rate: f32) {
        let attack = attack.max(MIN_TIME);
        let decay = decay.max(MIN_TIME);
        self.attack_increment = 1.0 / (attack * sample_rate);
        self.decay_coeff = (-1.0 / (decay * sample_rate)).exp();
        self.level = 0.0;
        self.stage = Stage::Attack;
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        match self.stage {
            Stage::Idle => {}
            Stage::Attack => {
                self.level += self.attack_increment;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = Stage::Decay;
                }
            }
            Stage::Decay => {
                self.level *= self.decay_coeff;
                if self.level < FLOOR {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                }
            }
        }
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.stage != Stage::Idle
    }
}

impl Default for DecayEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48_000.0;

    #[test]
    fn test_attack_reaches_peak() {
        let mut env = DecayEnvelope::new();
        env.trigger(0.001, 0.1, SR);
        let peak = (0..100).map(|_| env.next()).fold(0.0f32, f32::max);
        assert_eq!(peak, 1.0);
    }

    #[test]
    fn test_decay_time_constant() {
        let mut env = DecayEnvelope::new();
        env.trigger(MIN_TIME, 0.1, SR);
        env.next(); // attack done in one sample
        for _ in 0..4_800 {
            env.next();
        }
        assert!((env.level() - (-1.0f32).exp()).abs() < 0.01);
    }

    #[test]
    fn test_finishes_on_its_own() {
        let mut env = DecayEnvelope::new();
        env.trigger(0.001, 0.05, SR);
        assert!(env.is_active());
        for _ in 0..48_000 {
            env.next();
        }
        assert!(!env.is_active());
        assert_eq!(env.level(), 0.0);
    }
}
