/*
Signal Graph Executor
=====================

Turns the static description in `topology` into running processors and
renders them block by block.

Every stage owns one stereo scratch buffer. For each stage, in render order:

    1. clear its buffer
    2. sum the buffers of its feed-forward inputs into it
       (the `Input` stage copies the live input instead)
    3. run its processor in place

Mono processors work on the left channel and copy it to the right, so a
mono stage looks like a centre-panned stereo stage to everything after it.
Stereo processors (reverb onward) see both channels.

Blocks are split into RENDER_QUANTUM frames so per-block coefficient updates
(filter cutoffs) move in small steps. Sinks hand each quantum to a `TapSink`,
which is how the callback gets the destination audio, the analysis feed and
the capture feed without the graph knowing about rings.

Nothing here allocates after `new`.
*/

use crate::curve::{ImpulseResponse, TransferCurve};
use crate::dsp::filter::SVFilter;
use crate::graph::chorus::ChorusNode;
use crate::graph::delay::FeedbackDelayNode;
use crate::graph::dynamics::{CompressorNode, NoiseGateNode};
use crate::graph::filter::FilterNode;
use crate::graph::gain::GainNode;
use crate::graph::node::{GraphNode, RenderCtx, StereoBuffer, StereoNode};
use crate::graph::reverb::ConvolutionReverbNode;
use crate::graph::shaper::ShaperNode;
use crate::graph::targets::{StageTargets, BASS_HZ, MID_HZ, MID_Q, TREBLE_HZ};
use crate::graph::topology::{inputs_of, render_order, Stage};
use crate::graph::tremolo::TremoloNode;
use crate::voices::DrumBus;
use crate::MAX_BLOCK_SIZE;

/// Frames rendered per pass through the stage list.
pub const RENDER_QUANTUM: usize = 128;

/// Receives the audio arriving at each sink stage.
pub trait TapSink {
    fn tap(&mut self, stage: Stage, left: &[f32], right: &[f32]);
}

/// Collects the `Destination` stage into a pair of output slices.
pub struct DestinationWriter<'a> {
    left: &'a mut [f32],
    right: &'a mut [f32],
    written: usize,
}

impl<'a> DestinationWriter<'a> {
    pub fn new(left: &'a mut [f32], right: &'a mut [f32]) -> Self {
        Self {
            left,
            right,
            written: 0,
        }
    }
}

impl TapSink for DestinationWriter<'_> {
    fn tap(&mut self, stage: Stage, left: &[f32], right: &[f32]) {
        if stage != Stage::Destination {
            return;
        }
        let end = self.written + left.len();
        self.left[self.written..end].copy_from_slice(left);
        self.right[self.written..end].copy_from_slice(right);
        self.written = end;
    }
}

enum Processor {
    Pass,
    Gain(GainNode),
    Gate(NoiseGateNode),
    Filter(FilterNode),
    Shaper(ShaperNode),
    Delay(FeedbackDelayNode),
    Chorus(ChorusNode),
    Drums(DrumBus),
    Reverb(ConvolutionReverbNode),
    Tremolo(TremoloNode),
    Compressor(CompressorNode),
    StereoGain(GainNode),
}

impl Processor {
    fn process(&mut self, buffer: &mut StereoBuffer, frames: usize, ctx: &RenderCtx) {
        let mono: Option<&mut dyn GraphNode> = match self {
            Processor::Gain(node) => Some(node as &mut dyn GraphNode),
            Processor::Gate(node) => Some(node as &mut dyn GraphNode),
            Processor::Filter(node) => Some(node as &mut dyn GraphNode),
            Processor::Shaper(node) => Some(node as &mut dyn GraphNode),
            Processor::Delay(node) => Some(node as &mut dyn GraphNode),
            Processor::Chorus(node) => Some(node as &mut dyn GraphNode),
            Processor::Drums(node) => Some(node as &mut dyn GraphNode),
            _ => None,
        };
        if let Some(node) = mono {
            node.render_block(&mut buffer.left[..frames], ctx);
            buffer.mirror_left(frames);
            return;
        }

        let stereo: Option<&mut dyn StereoNode> = match self {
            Processor::Reverb(node) => Some(node as &mut dyn StereoNode),
            Processor::Tremolo(node) => Some(node as &mut dyn StereoNode),
            Processor::Compressor(node) => Some(node as &mut dyn StereoNode),
            Processor::StereoGain(node) => Some(node as &mut dyn StereoNode),
            _ => None,
        };
        if let Some(node) = stereo {
            let (left, right) = buffer.split(frames);
            node.render_stereo(left, right, ctx);
        }
    }

    fn reset(&mut self) {
        match self {
            Processor::Pass => {}
            Processor::Gain(node) => GraphNode::reset(node),
            Processor::Gate(node) => node.reset(),
            Processor::Filter(node) => node.reset(),
            Processor::Shaper(node) => node.reset(),
            Processor::Delay(node) => node.reset(),
            Processor::Chorus(node) => node.reset(),
            Processor::Drums(node) => node.reset(),
            Processor::Reverb(node) => node.reset(),
            Processor::Tremolo(node) => node.reset(),
            Processor::Compressor(node) => node.reset(),
            Processor::StereoGain(node) => StereoNode::reset(node),
        }
    }
}

/// The live effects chain plus the rhythm bus.
pub struct SignalGraph {
    order: Vec<Stage>,
    inputs: Vec<Vec<usize>>,
    processors: Vec<Processor>,
    buffers: Vec<StereoBuffer>,
    sample_rate: f32,
    frame: u64,
}

impl SignalGraph {
    pub fn new(
        sample_rate: f32,
        impulse: &ImpulseResponse,
        targets: &StageTargets,
        curve: Box<TransferCurve>,
        drums: DrumBus,
    ) -> Self {
        let t = targets;
        let sr = sample_rate;
        let mut curve = Some(curve);
        let mut drums = Some(drums);

        let processors = Stage::ALL
            .iter()
            .map(|stage| match stage {
                Stage::InputGain => Processor::Gain(GainNode::new(t.input_gain, sr)),
                Stage::NoiseGate => Processor::Gate(NoiseGateNode::new(t.gate_threshold_db, sr)),
                Stage::HighPass => {
                    Processor::Filter(FilterNode::new(SVFilter::highpass(t.highpass_hz), sr))
                }
                Stage::Drive => match curve.take() {
                    Some(curve) => Processor::Shaper(ShaperNode::new(curve)),
                    None => Processor::Pass,
                },
                Stage::Bass => {
                    Processor::Filter(FilterNode::new(SVFilter::low_shelf(BASS_HZ, t.bass_db), sr))
                }
                Stage::Mid => Processor::Filter(FilterNode::new(
                    SVFilter::peaking(MID_HZ, MID_Q, t.mid_db),
                    sr,
                )),
                Stage::Treble => Processor::Filter(FilterNode::new(
                    SVFilter::high_shelf(TREBLE_HZ, t.treble_db),
                    sr,
                )),
                Stage::Cabinet => {
                    Processor::Filter(FilterNode::new(SVFilter::lowpass(t.cabinet_hz), sr))
                }
                Stage::Dry => Processor::Gain(GainNode::new(t.dry_gain, sr)),
                Stage::Delay => {
                    let mut node = FeedbackDelayNode::new(t.delay_seconds, t.delay_feedback, sr);
                    node.set_wet(t.delay_wet);
                    Processor::Delay(node)
                }
                Stage::Reverb => {
                    Processor::Reverb(ConvolutionReverbNode::new(impulse, t.reverb_wet, sr))
                }
                Stage::Chorus => Processor::Chorus(ChorusNode::new(
                    t.chorus_rate_hz,
                    t.chorus_depth_seconds,
                    t.chorus_wet,
                    sr,
                )),
                Stage::Tremolo => {
                    Processor::Tremolo(TremoloNode::new(t.tremolo_rate_hz, t.tremolo_depth, sr))
                }
                Stage::Compressor => Processor::Compressor(CompressorNode::new(
                    t.compressor_threshold_db,
                    t.compressor_ratio,
                    sr,
                )),
                Stage::Output => Processor::StereoGain(GainNode::new(t.output_gain, sr)),
                Stage::Rhythm => match drums.take() {
                    Some(bus) => Processor::Drums(bus),
                    None => Processor::Pass,
                },
                Stage::Input
                | Stage::Mix
                | Stage::Master
                | Stage::Destination
                | Stage::Analyser
                | Stage::Capture => Processor::Pass,
            })
            .collect();

        let inputs = Stage::ALL
            .iter()
            .map(|&stage| inputs_of(stage).map(Stage::index).collect())
            .collect();

        Self {
            // Stage::ALL is itself listed in a valid order
            order: render_order().unwrap_or_else(|| Stage::ALL.to_vec()),
            inputs,
            processors,
            buffers: (0..Stage::COUNT).map(|_| StereoBuffer::new()).collect(),
            sample_rate,
            frame: 0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Audio-clock frame of the next block.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Retarget every smoother from a fresh set of targets.
    pub fn apply_targets(&mut self, t: &StageTargets) {
        for (stage, processor) in Stage::ALL.iter().zip(self.processors.iter_mut()) {
            match (stage, processor) {
                (Stage::InputGain, Processor::Gain(node)) => node.set_gain(t.input_gain),
                (Stage::NoiseGate, Processor::Gate(node)) => {
                    node.set_threshold_db(t.gate_threshold_db)
                }
                (Stage::HighPass, Processor::Filter(node)) => node.set_cutoff(t.highpass_hz),
                (Stage::Bass, Processor::Filter(node)) => node.set_gain_db(t.bass_db),
                (Stage::Mid, Processor::Filter(node)) => node.set_gain_db(t.mid_db),
                (Stage::Treble, Processor::Filter(node)) => node.set_gain_db(t.treble_db),
                (Stage::Cabinet, Processor::Filter(node)) => node.set_cutoff(t.cabinet_hz),
                (Stage::Dry, Processor::Gain(node)) => node.set_gain(t.dry_gain),
                (Stage::Delay, Processor::Delay(node)) => {
                    node.set_time(t.delay_seconds);
                    node.set_feedback(t.delay_feedback);
                    node.set_wet(t.delay_wet);
                }
                (Stage::Reverb, Processor::Reverb(node)) => node.set_wet(t.reverb_wet),
                (Stage::Chorus, Processor::Chorus(node)) => {
                    node.set_rate(t.chorus_rate_hz);
                    node.set_depth(t.chorus_depth_seconds);
                    node.set_wet(t.chorus_wet);
                }
                (Stage::Tremolo, Processor::Tremolo(node)) => {
                    node.set_rate(t.tremolo_rate_hz);
                    node.set_depth(t.tremolo_depth);
                }
                (Stage::Compressor, Processor::Compressor(node)) => {
                    node.set_threshold_db(t.compressor_threshold_db);
                    node.set_ratio(t.compressor_ratio);
                }
                (Stage::Output, Processor::StereoGain(node)) => node.set_gain(t.output_gain),
                _ => {}
            }
        }
    }

    /// Install a new transfer table. The replaced one is returned so the
    /// caller can send it off the realtime thread.
    pub fn swap_curve(&mut self, next: Box<TransferCurve>) -> Box<TransferCurve> {
        match &mut self.processors[Stage::Drive.index()] {
            Processor::Shaper(node) => node.swap_curve(next),
            _ => next,
        }
    }

    /// Render `input.len()` frames of live input, handing every sink stage's
    /// audio to `sink` one quantum at a time.
    pub fn render(&mut self, input: &[f32], sink: &mut impl TapSink) {
        for chunk in input.chunks(RENDER_QUANTUM) {
            self.render_quantum(chunk, sink);
        }
    }

    /// Convenience wrapper writing the destination into `left`/`right`.
    pub fn render_into(&mut self, input: &[f32], left: &mut [f32], right: &mut [f32]) {
        let mut writer = DestinationWriter::new(left, right);
        self.render(input, &mut writer);
    }

    fn render_quantum(&mut self, input: &[f32], sink: &mut impl TapSink) {
        let frames = input.len().min(MAX_BLOCK_SIZE);
        let ctx = RenderCtx::new(self.sample_rate, self.frame);

        for &stage in &self.order {
            let idx = stage.index();
            let mut buffer = std::mem::take(&mut self.buffers[idx]);
            buffer.clear(frames);

            if stage == Stage::Input {
                buffer.left[..frames].copy_from_slice(&input[..frames]);
                buffer.mirror_left(frames);
            } else {
                for &from in &self.inputs[idx] {
                    buffer.accumulate(&self.buffers[from], frames);
                }
            }

            self.processors[idx].process(&mut buffer, frames, &ctx);

            if stage.is_sink() {
                sink.tap(stage, &buffer.left[..frames], &buffer.right[..frames]);
            }
            self.buffers[idx] = buffer;
        }

        self.frame += frames as u64;
    }

    /// Clear every delay line, filter and voice.
    pub fn reset(&mut self) {
        for processor in &mut self.processors {
            processor.reset();
        }
        for buffer in &mut self.buffers {
            let frames = buffer.frames();
            buffer.clear(frames);
        }
    }
}
