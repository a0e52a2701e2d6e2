use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

/*
| type        | passes            | shapes                       | used by             |
| ----------- | ----------------- | ---------------------------- | ------------------- |
| low-pass    | below cutoff      | rolls off above              | cabinet, kick click |
| high-pass   | above cutoff      | rolls off below              | input rumble, hats  |
| band-pass   | around cutoff     | rolls off both sides         | snare noise         |
| notch       | everything else   | cuts a narrow band           |                     |
| low-shelf   | everything        | boosts/cuts below the corner | bass                |
| high-shelf  | everything        | boosts/cuts above the corner | treble              |
| peaking     | everything        | boosts/cuts around centre    | mid                 |

All of them are the same trapezoidal state-variable core. Only the output
mix (m0·input + m1·band + m2·low) and, for the shelves, the prewarped g
change between responses. Coefficients are recomputed whenever cutoff, Q or
gain move, so smoothing a parameter is just calling `set_params` per block.
*/

pub const DEFAULT_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResponse {
    LowPass,
    HighPass,
    BandPass,
    Notch,
    LowShelf,
    HighShelf,
    Peaking,
}

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    response: FilterResponse,
    cutoff_hz: f32,
    q: f32,
    gain_db: f32,

    a1: f32,
    a2: f32,
    a3: f32,
    m0: f32,
    m1: f32,
    m2: f32,
    // Sample rate the coefficients were computed for; 0.0 means stale.
    coeff_rate: f32,
}

impl SVFilter {
    pub fn new(response: FilterResponse, cutoff_hz: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            response,
            cutoff_hz,
            q: DEFAULT_Q,
            gain_db: 0.0,
            a1: 0.0,
            a2: 0.0,
            a3: 0.0,
            m0: 0.0,
            m1: 0.0,
            m2: 0.0,
            coeff_rate: 0.0,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterResponse::LowPass, cutoff_hz)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterResponse::HighPass, cutoff_hz)
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::new(FilterResponse::BandPass, cutoff_hz)
    }

    pub fn notch(cutoff_hz: f32) -> Self {
        Self::new(FilterResponse::Notch, cutoff_hz)
    }

    pub fn low_shelf(cutoff_hz: f32, gain_db: f32) -> Self {
        Self::new(FilterResponse::LowShelf, cutoff_hz).with_gain_db(gain_db)
    }

    pub fn high_shelf(cutoff_hz: f32, gain_db: f32) -> Self {
        Self::new(FilterResponse::HighShelf, cutoff_hz).with_gain_db(gain_db)
    }

    pub fn peaking(center_hz: f32, q: f32, gain_db: f32) -> Self {
        Self::new(FilterResponse::Peaking, center_hz)
            .with_q(q)
            .with_gain_db(gain_db)
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.q = q.max(0.025);
        self.coeff_rate = 0.0;
        self
    }

    pub fn with_gain_db(mut self, gain_db: f32) -> Self {
        self.gain_db = gain_db;
        self.coeff_rate = 0.0;
        self
    }

    pub fn response(&self) -> FilterResponse {
        self.response
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    /// Retune the filter. Integrator state is kept, so this is safe mid-stream.
    pub fn set_params(&mut self, cutoff_hz: f32, gain_db: f32, sample_rate: f32) {
        if cutoff_hz != self.cutoff_hz || gain_db != self.gain_db || sample_rate != self.coeff_rate
        {
            self.cutoff_hz = cutoff_hz;
            self.gain_db = gain_db;
            self.compute_coefficients(sample_rate);
        }
    }

    fn compute_coefficients(&mut self, sample_rate: f32) {
        let fc = self.cutoff_hz.clamp(1.0, sample_rate * 0.49);
        let mut g = (PI * fc / sample_rate).tan();
        let mut k = 1.0 / self.q;
        // A is the square root of the linear gain
        let a = 10.0_f32.powf(self.gain_db / 40.0);

        let (m0, m1, m2) = match self.response {
            FilterResponse::LowPass => (0.0, 0.0, 1.0),
            FilterResponse::HighPass => (1.0, -k, -1.0),
            FilterResponse::BandPass => (0.0, k, 0.0),
            FilterResponse::Notch => (1.0, -k, 0.0),
            FilterResponse::Peaking => {
                k = 1.0 / (self.q * a);
                (1.0, k * (a * a - 1.0), 0.0)
            }
            FilterResponse::LowShelf => {
                g /= a.sqrt();
                (1.0, k * (a - 1.0), a * a - 1.0)
            }
            FilterResponse::HighShelf => {
                g *= a.sqrt();
                (a * a, k * (1.0 - a) * a, 1.0 - a * a)
            }
        };

        self.a1 = 1.0 / (1.0 + g * (g + k));
        self.a2 = g * self.a1;
        self.a3 = g * self.a2;
        self.m0 = m0;
        self.m1 = m1;
        self.m2 = m2;
        self.coeff_rate = sample_rate;
    }

    /// Make sure coefficients exist for `sample_rate`.
    #[inline]
    pub fn prepare(&mut self, sample_rate: f32) {
        if self.coeff_rate != sample_rate {
            self.compute_coefficients(sample_rate);
        }
    }

    /// Filter one sample. Call [`SVFilter::prepare`] (or `set_params`) first.
    #[inline]
    pub fn process(&mut self, v0: f32) -> f32 {
        let v3 = v0 - self.ic2eq;
        let v1 = self.a1 * self.ic1eq + self.a2 * v3;
        let v2 = self.ic2eq + self.a2 * self.ic1eq + self.a3 * v3;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        self.m0 * v0 + self.m1 * v1 + self.m2 * v2
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        self.prepare(ctx.sample_rate);

        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}
