use crate::dsp::smooth::SmoothedParam;
use crate::graph::node::{GraphNode, RenderCtx, StereoNode};

/// Smoothed linear gain. Used for input gain, the dry path and the output
/// volume.
pub struct GainNode {
    gain: SmoothedParam,
}

impl GainNode {
    pub fn new(gain: f32, sample_rate: f32) -> Self {
        Self {
            gain: SmoothedParam::new(gain, sample_rate),
        }
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain.set_target(gain);
    }

    pub fn gain(&self) -> f32 {
        self.gain.value()
    }
}

impl GraphNode for GainNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample *= self.gain.next();
        }
    }
}

impl StereoNode for GainNode {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], _ctx: &RenderCtx) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let g = self.gain.next();
            *l *= g;
            *r *= g;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_glides_instead_of_stepping() {
        let ctx = RenderCtx::new(48_000.0, 0);
        let mut node = GainNode::new(1.0, 48_000.0);
        node.set_gain(0.0);

        let mut buffer = vec![1.0; 64];
        node.render_block(&mut buffer, &ctx);

        assert!(buffer[0] > 0.99);
        assert!(buffer.windows(2).all(|w| w[1] <= w[0]));
        assert!(buffer[63] > 0.5);
    }

    #[test]
    fn test_stereo_applies_same_gain_to_both_sides() {
        let ctx = RenderCtx::new(48_000.0, 0);
        let mut node = GainNode::new(0.5, 48_000.0);
        let mut left = vec![1.0; 8];
        let mut right = vec![-1.0; 8];
        node.render_stereo(&mut left, &mut right, &ctx);
        assert!(left.iter().zip(&right).all(|(l, r)| *l == 0.5 && *r == -0.5));
    }
}
