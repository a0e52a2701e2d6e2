//! Low Frequency Oscillator (LFO) for chorus sweep and tremolo.

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at sub-audio frequencies. Instead of being
heard, its output moves a parameter: the chorus delay time, the tremolo
gain.

Vocabulary
----------

  control-rate    Frequencies below human hearing: ~0.01 Hz to ~20 Hz.
                  The chain accepts exactly that range for both LFOs.

  bipolar         Output swings positive AND negative: -1.0 to +1.0
                  The chorus uses it so the delay moves around its centre.

  unipolar        Output is only positive: 0.0 to 1.0
                  Tremolo uses it so the gain only ever dips below unity.
                  Convert: unipolar = (bipolar + 1.0) / 2.0


Tremolo Gain
------------

With depth d in [0, 1] the tremolo gain is

    gain = 1 - d/2 + (d/2)·sin(phase)
         = (1 - d) + d · unipolar(sin(phase))

    d = 0.0    gain stays at 1.0
    d = 0.5    gain swings 0.5 … 1.0
    d = 1.0    gain swings 0.0 … 1.0 (full chop)


Rate Changes
------------

The phase accumulator keeps running when the rate changes; only the
increment per sample changes. Retuning an LFO therefore never jumps the
waveform, and smoothing the rate is enough to keep the sweep continuous.
*/

use std::f32::consts::TAU;

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

/// Free-running sine LFO.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lfo {
    phase: f32,
}

impl Lfo {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Current bipolar value, then advance by one sample at `rate_hz`.
    #[inline]
    pub fn next(&mut self, rate_hz: f32, sample_rate: f32) -> f32 {
        let value = self.phase.sin();
        self.phase += TAU * rate_hz / sample_rate;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        value
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Tremolo gain for a bipolar LFO value and depth.
#[inline]
pub fn tremolo_gain(lfo: f32, depth: f32) -> f32 {
    (1.0 - depth) + depth * bipolar_to_unipolar(lfo)
}
