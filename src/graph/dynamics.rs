use crate::dsp::dynamics::{
    compressor_gain_db, db_to_gain, gain_to_db, gate_gain_db, time_coeff, EnvelopeFollower,
};
use crate::dsp::smooth::SmoothedParam;
use crate::graph::node::{GraphNode, RenderCtx, StereoNode};

/*
Dynamics Stages
===============

Noise Gate (mono, right after the input gain):
  Fast detector (1 ms attack, 50 ms release). Below the threshold the gate
  expands downward; the gain itself opens in 1 ms and closes over 100 ms so
  decaying notes fade instead of being chopped.

Compressor (stereo-linked, after tremolo):
  Peak detector on max(|L|, |R|) with 3 ms attack and 250 ms release, and a
  30 dB soft knee. Both channels get the same gain so the image doesn't
  shift.
*/

const GATE_DETECT_ATTACK: f32 = 0.001;
const GATE_DETECT_RELEASE: f32 = 0.05;
const GATE_OPEN: f32 = 0.001;
const GATE_CLOSE: f32 = 0.1;

pub const COMPRESSOR_ATTACK: f32 = 0.003;
pub const COMPRESSOR_RELEASE: f32 = 0.25;
pub const COMPRESSOR_KNEE_DB: f32 = 30.0;

pub struct NoiseGateNode {
    detector: EnvelopeFollower,
    threshold_db: SmoothedParam,
    gain_db: f32,
    open_coeff: f32,
    close_coeff: f32,
}

impl NoiseGateNode {
    pub fn new(threshold_db: f32, sample_rate: f32) -> Self {
        Self {
            detector: EnvelopeFollower::new(GATE_DETECT_ATTACK, GATE_DETECT_RELEASE, sample_rate),
            threshold_db: SmoothedParam::new(threshold_db, sample_rate),
            gain_db: 0.0,
            open_coeff: time_coeff(GATE_OPEN, sample_rate),
            close_coeff: time_coeff(GATE_CLOSE, sample_rate),
        }
    }

    pub fn set_threshold_db(&mut self, threshold_db: f32) {
        self.threshold_db.set_target(threshold_db);
    }

    /// Current gate gain in dB (0 = fully open).
    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }
}

impl GraphNode for NoiseGateNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            let level_db = gain_to_db(self.detector.process(*sample));
            let target = gate_gain_db(level_db, self.threshold_db.next());
            let coeff = if target > self.gain_db {
                self.open_coeff
            } else {
                self.close_coeff
            };
            self.gain_db = target + (self.gain_db - target) * coeff;
            *sample *= db_to_gain(self.gain_db);
        }
    }

    fn reset(&mut self) {
        self.detector.reset();
        self.gain_db = 0.0;
    }
}

pub struct CompressorNode {
    detector: EnvelopeFollower,
    threshold_db: SmoothedParam,
    ratio: SmoothedParam,
    reduction_db: f32,
}

impl CompressorNode {
    pub fn new(threshold_db: f32, ratio: f32, sample_rate: f32) -> Self {
        Self {
            detector: EnvelopeFollower::new(COMPRESSOR_ATTACK, COMPRESSOR_RELEASE, sample_rate),
            threshold_db: SmoothedParam::new(threshold_db, sample_rate),
            ratio: SmoothedParam::new(ratio, sample_rate),
            reduction_db: 0.0,
        }
    }

    pub fn set_threshold_db(&mut self, threshold_db: f32) {
        self.threshold_db.set_target(threshold_db);
    }

    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio.set_target(ratio);
    }

    /// Most recent gain reduction in dB (<= 0).
    pub fn reduction_db(&self) -> f32 {
        self.reduction_db
    }
}

impl StereoNode for CompressorNode {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], _ctx: &RenderCtx) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let level = self.detector.process(l.abs().max(r.abs()));
            self.reduction_db = compressor_gain_db(
                gain_to_db(level),
                self.threshold_db.next(),
                self.ratio.next(),
                COMPRESSOR_KNEE_DB,
            );
            let gain = db_to_gain(self.reduction_db);
            *l *= gain;
            *r *= gain;
        }
    }

    fn reset(&mut self) {
        self.detector.reset();
        self.reduction_db = 0.0;
    }
}
