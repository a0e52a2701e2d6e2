use crate::dsp::delay::DelayLine;
use crate::dsp::smooth::SmoothedParam;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::params::effect::MAX_DELAY_TIME;

/// Fixed level of the echo path relative to the dry signal.
pub const DELAY_WET_GAIN: f32 = 0.8;

/// Echo path: delay line with a feedback loop around it, wet signal only.
///
/// ```text
/// in ──(+)──▶ [delay line] ──┬──▶ × wet ──▶ out
///       ▲                    │
///       └──── × feedback ◀───┘
/// ```
///
/// Delay time is smoothed like every other target, which gives the familiar
/// tape-style pitch glide when it is moved while echoes are ringing.
pub struct FeedbackDelayNode {
    line: DelayLine,
    time: SmoothedParam,
    feedback: SmoothedParam,
    wet: SmoothedParam,
}

impl FeedbackDelayNode {
    pub fn new(time: f32, feedback: f32, sample_rate: f32) -> Self {
        Self {
            line: DelayLine::with_seconds(MAX_DELAY_TIME, sample_rate),
            time: SmoothedParam::new(time, sample_rate),
            feedback: SmoothedParam::new(feedback, sample_rate),
            wet: SmoothedParam::new(DELAY_WET_GAIN, sample_rate),
        }
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time.set_target(seconds);
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback.set_target(feedback);
    }

    pub fn set_wet(&mut self, wet: f32) {
        self.wet.set_target(wet);
    }
}

impl GraphNode for FeedbackDelayNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            let delay = self.time.next() * ctx.sample_rate;
            let delayed = self.line.read_interpolated(delay);
            self.line.write(*sample + delayed * self.feedback.next());
            *sample = delayed * self.wet.next();
        }
    }

    fn reset(&mut self) {
        self.line.reset();
    }
}
