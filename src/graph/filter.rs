use crate::dsp::filter::SVFilter;
use crate::dsp::smooth::SmoothedParam;
use crate::graph::node::{GraphNode, RenderCtx};

/// SVF stage with smoothed cutoff and gain.
///
/// Coefficients are refreshed once per rendered block; the graph renders in
/// short quanta so the sweep stays smooth.
pub struct FilterNode {
    filter: SVFilter,
    cutoff: SmoothedParam,
    gain_db: SmoothedParam,
}

impl FilterNode {
    pub fn new(mut filter: SVFilter, sample_rate: f32) -> Self {
        filter.prepare(sample_rate);
        Self {
            cutoff: SmoothedParam::new(filter.cutoff_hz(), sample_rate),
            gain_db: SmoothedParam::new(filter.gain_db(), sample_rate),
            filter,
        }
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff.set_target(cutoff_hz);
    }

    pub fn set_gain_db(&mut self, gain_db: f32) {
        self.gain_db.set_target(gain_db);
    }

    pub fn filter(&self) -> &SVFilter {
        &self.filter
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let n = out.len();
        let cutoff = self.cutoff.advance(n);
        let gain_db = self.gain_db.advance(n);
        self.filter.set_params(cutoff, gain_db, ctx.sample_rate);
        self.filter.render(out, ctx);
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}
