use crate::curve::ImpulseResponse;
use crate::dsp::convolver::PartitionedConvolver;
use crate::dsp::smooth::SmoothedParam;
use crate::graph::node::{RenderCtx, StereoNode};
use crate::MAX_BLOCK_SIZE;

/// Convolution reverb path: mono in, independent left/right tails out.
///
/// The input is read from the left channel (the bus is still mono when it
/// reaches this path). Output is wet only, scaled by the reverb mix.
pub struct ConvolutionReverbNode {
    left: PartitionedConvolver,
    right: PartitionedConvolver,
    wet: SmoothedParam,
    input: Vec<f32>,
}

impl ConvolutionReverbNode {
    pub fn new(impulse: &ImpulseResponse, wet: f32, sample_rate: f32) -> Self {
        Self {
            left: PartitionedConvolver::new(&impulse.left),
            right: PartitionedConvolver::new(&impulse.right),
            wet: SmoothedParam::new(wet, sample_rate),
            input: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn set_wet(&mut self, wet: f32) {
        self.wet.set_target(wet);
    }

    pub fn latency(&self) -> usize {
        self.left.latency()
    }
}

impl StereoNode for ConvolutionReverbNode {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], _ctx: &RenderCtx) {
        for chunk_start in (0..left.len()).step_by(MAX_BLOCK_SIZE) {
            let end = (chunk_start + MAX_BLOCK_SIZE).min(left.len());
            let n = end - chunk_start;
            let input = &mut self.input[..n];
            input.copy_from_slice(&left[chunk_start..end]);

            self.left.process(input, &mut left[chunk_start..end]);
            self.right.process(input, &mut right[chunk_start..end]);
        }

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let g = self.wet.next();
            *l *= g;
            *r *= g;
        }
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_produces_decorrelated_tails() {
        let sr = 8_000;
        let ir = ImpulseResponse::with_length(sr, 0.5);
        let mut node = ConvolutionReverbNode::new(&ir, 1.0, sr as f32);
        let ctx = RenderCtx::new(sr as f32, 0);

        let mut left = vec![0.0; 2_048];
        left[0] = 1.0;
        let mut right = left.clone();
        node.render_stereo(&mut left, &mut right, &ctx);

        let energy_l: f32 = left.iter().map(|s| s * s).sum();
        let energy_r: f32 = right.iter().map(|s| s * s).sum();
        assert!(energy_l > 0.1 && energy_r > 0.1);
        assert_ne!(left, right);
        // nothing comes out before the partition latency
        assert!(left[..node.latency()].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_zero_wet_is_silent() {
        let ir = ImpulseResponse::with_length(8_000, 0.25);
        let mut node = ConvolutionReverbNode::new(&ir, 0.0, 8_000.0);
        let mut left = vec![1.0; 1_024];
        let mut right = left.clone();
        node.render_stereo(&mut left, &mut right, &RenderCtx::new(8_000.0, 0));
        assert!(left.iter().chain(&right).all(|s| *s == 0.0));
    }
}
