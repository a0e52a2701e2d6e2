use crate::dsp::lfo::{tremolo_gain, Lfo};
use crate::dsp::smooth::SmoothedParam;
use crate::graph::node::{RenderCtx, StereoNode};

/// Amplitude modulation: `gain = 1 - d/2 + (d/2)·sin(phase)`.
pub struct TremoloNode {
    lfo: Lfo,
    rate: SmoothedParam,
    depth: SmoothedParam,
}

impl TremoloNode {
    pub fn new(rate: f32, depth: f32, sample_rate: f32) -> Self {
        Self {
            lfo: Lfo::new(),
            rate: SmoothedParam::new(rate, sample_rate),
            depth: SmoothedParam::new(depth, sample_rate),
        }
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate.set_target(rate);
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.depth.set_target(depth);
    }
}

impl StereoNode for TremoloNode {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let lfo = self.lfo.next(self.rate.next(), ctx.sample_rate);
            let gain = tremolo_gain(lfo, self.depth.next());
            *l *= gain;
            *r *= gain;
        }
    }

    fn reset(&mut self) {
        self.lfo.reset();
    }
}
