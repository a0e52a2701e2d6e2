use crate::dsp::delay::DelayLine;
use crate::dsp::lfo::Lfo;
use crate::dsp::smooth::SmoothedParam;
use crate::graph::node::{GraphNode, RenderCtx};

/*
Chorus Path
===========

Chorus thickens a sound by mixing the dry signal with a slightly delayed,
pitch-modulated copy. In this chain the dry signal has its own path, so
this node outputs only the wet copy; the bus sum does the mixing.

How It Works
------------

1. The signal enters a 30 ms delay line
2. A sine LFO moves the read position around that centre
3. The moving read head gives small pitch shifts up and down
4. The wet gain (chorus mix) sets how much of it reaches the sum

Parameters
----------

Speed (0.01 - 20 Hz):
  LFO rate. Slow = shimmer, fast = vibrato-like wobble.

Depth (0.0 - 1.0):
  Scaled to a sweep of ±depth × 5 ms around the 30 ms centre.

Mix (0.0 - 1.0):
  Level of the wet path. 0.0 removes the chorus entirely.
*/

/// Centre of the chorus sweep, seconds.
pub const CHORUS_BASE_DELAY: f32 = 0.03;

/// Sweep depth at `chorus_depth = 1.0`, seconds.
pub const CHORUS_MAX_SWEEP: f32 = 0.005;

pub struct ChorusNode {
    delay_line: DelayLine,
    lfo: Lfo,
    rate: SmoothedParam,
    depth: SmoothedParam, // seconds
    wet: SmoothedParam,
}

impl ChorusNode {
    /// - `rate`: LFO speed in Hz
    /// - `depth`: sweep in seconds either side of the 30 ms centre
    /// - `wet`: level of the chorus path
    pub fn new(rate: f32, depth: f32, wet: f32, sample_rate: f32) -> Self {
        Self {
            delay_line: DelayLine::with_seconds(CHORUS_BASE_DELAY + CHORUS_MAX_SWEEP, sample_rate),
            lfo: Lfo::new(),
            rate: SmoothedParam::new(rate, sample_rate),
            depth: SmoothedParam::new(depth, sample_rate),
            wet: SmoothedParam::new(wet, sample_rate),
        }
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate.set_target(rate);
    }

    pub fn set_depth(&mut self, seconds: f32) {
        self.depth.set_target(seconds.clamp(0.0, CHORUS_MAX_SWEEP));
    }

    pub fn set_wet(&mut self, wet: f32) {
        self.wet.set_target(wet);
    }
}

impl GraphNode for ChorusNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let sample_rate = ctx.sample_rate;

        for sample in out.iter_mut() {
            let lfo_value = self.lfo.next(self.rate.next(), sample_rate);
            let delay = (CHORUS_BASE_DELAY + lfo_value * self.depth.next()) * sample_rate;

            let delayed = self.delay_line.read_interpolated(delay);
            self.delay_line.write(*sample);

            *sample = delayed * self.wet.next();
        }
    }

    fn reset(&mut self) {
        self.delay_line.reset();
        self.lfo.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48_000.0;

    fn test_ctx() -> RenderCtx {
        RenderCtx::new(SR, 0)
    }

    #[test]
    fn test_zero_mix_is_silent() {
        let mut node = ChorusNode::new(1.0, 0.004, 0.0, SR);
        let mut buffer: Vec<f32> = (0..4_096).map(|i| (i as f32 * 0.1).sin()).collect();
        node.render_block(&mut buffer, &test_ctx());
        assert!(buffer.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_static_chorus_is_pure_delay() {
        let mut node = ChorusNode::new(1.0, 0.0, 1.0, SR);
        let mut buffer = vec![0.0; 2_000];
        buffer[0] = 1.0;
        node.render_block(&mut buffer, &test_ctx());
        // 30 ms at 48 kHz
        assert!((buffer[1_440] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_chorus_output_bounded() {
        let mut node = ChorusNode::new(5.0, 0.005, 1.0, SR);
        let mut buffer: Vec<f32> = (0..8_192).map(|i| (i as f32 * 0.1).sin()).collect();
        node.render_block(&mut buffer, &test_ctx());
        for sample in &buffer {
            assert!(sample.abs() <= 1.0 + 1e-6);
        }
    }
}
