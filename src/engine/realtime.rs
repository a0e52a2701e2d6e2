/*
Realtime Processor
==================

Everything the audio callback touches, in one owned value that is moved into
the backend when the engine starts.

Per callback:

    poll graph inbox (targets, transfer tables)
    for each MAX_BLOCK_SIZE slice of the device buffer:
        fill mono input (shortfall → zeros, counted as underrun)
        render the graph; sinks land in BusTaps:
            Destination → left/right scratch
            Analyser    → mono ring, one sample per frame, drop when full
            Capture     → interleaved ring while armed, whole quantum or nothing
        interleave into the device buffer
    publish the audio clock

No locks, no allocation, no logging. Problems are counted in RealtimeStats.
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rtrb::Producer;

use super::clock::AudioClock;
use super::stats::RealtimeStats;
use crate::graph::{DestinationWriter, GraphInbox, SignalGraph, Stage, TapSink};
use crate::MAX_BLOCK_SIZE;

/// Ring ends fed from the sink stages.
pub(crate) struct BusTaps {
    pub(crate) capture: Producer<f32>,
    pub(crate) analysis: Producer<f32>,
    pub(crate) armed: Arc<AtomicBool>,
}

struct CallbackSink<'a> {
    taps: &'a mut BusTaps,
    destination: DestinationWriter<'a>,
    stats: &'a RealtimeStats,
    recording: bool,
}

impl TapSink for CallbackSink<'_> {
    fn tap(&mut self, stage: Stage, left: &[f32], right: &[f32]) {
        match stage {
            Stage::Destination => self.destination.tap(stage, left, right),
            Stage::Analyser => {
                let mut dropped = 0;
                for (&l, &r) in left.iter().zip(right) {
                    if self.taps.analysis.push(0.5 * (l + r)).is_err() {
                        dropped += 1;
                    }
                }
                self.stats.add_analysis_drops(dropped);
            }
            Stage::Capture if self.recording => {
                match self.taps.capture.write_chunk_uninit(left.len() * 2) {
                    Ok(chunk) => {
                        chunk.fill_from_iter(left.iter().zip(right).flat_map(|(&l, &r)| [l, r]));
                    }
                    Err(_) => self.stats.add_capture_overflows(1),
                }
            }
            _ => {}
        }
    }
}

/// The audio-thread half of an engine session.
pub struct RealtimeProcessor {
    graph: SignalGraph,
    inbox: GraphInbox,
    taps: BusTaps,
    clock: Arc<AudioClock>,
    stats: Arc<RealtimeStats>,
    input: Vec<f32>,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl RealtimeProcessor {
    pub(crate) fn new(
        graph: SignalGraph,
        inbox: GraphInbox,
        taps: BusTaps,
        clock: Arc<AudioClock>,
        stats: Arc<RealtimeStats>,
    ) -> Self {
        Self {
            graph,
            inbox,
            taps,
            clock,
            stats,
            input: vec![0.0; MAX_BLOCK_SIZE],
            left: vec![0.0; MAX_BLOCK_SIZE],
            right: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    pub fn stats(&self) -> &Arc<RealtimeStats> {
        &self.stats
    }

    /// Render one device buffer of `channels`-interleaved frames.
    ///
    /// `fill_input` writes mono input into the slice it is given and returns
    /// how many frames it had. Missing frames are rendered as silence.
    /// Channel 0 gets the left bus, channel 1 the right; any further channel
    /// (or a mono device) gets their average.
    pub fn render<F>(&mut self, output: &mut [f32], channels: usize, mut fill_input: F)
    where
        F: FnMut(&mut [f32]) -> usize,
    {
        let channels = channels.max(1);
        self.inbox.poll(&mut self.graph);

        let total = output.len() / channels;
        let mut done = 0;
        while done < total {
            let frames = (total - done).min(MAX_BLOCK_SIZE);

            let input = &mut self.input[..frames];
            let got = fill_input(input).min(frames);
            if got < frames {
                input[got..].fill(0.0);
                self.stats.add_input_underruns((frames - got) as u64);
            }

            let recording = self.taps.armed.load(Ordering::Acquire);
            let mut sink = CallbackSink {
                taps: &mut self.taps,
                destination: DestinationWriter::new(
                    &mut self.left[..frames],
                    &mut self.right[..frames],
                ),
                stats: &self.stats,
                recording,
            };
            self.graph.render(&self.input[..frames], &mut sink);

            let out = &mut output[done * channels..(done + frames) * channels];
            for ((frame, &l), &r) in out.chunks_exact_mut(channels).zip(&self.left).zip(&self.right) {
                let mid = 0.5 * (l + r);
                match frame {
                    [mono] => *mono = mid,
                    [left, right, rest @ ..] => {
                        *left = l;
                        *right = r;
                        rest.fill(mid);
                    }
                    [] => {}
                }
            }
            done += frames;
        }
        output[total * channels..].fill(0.0);

        self.clock.publish(self.graph.frame());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{ImpulseResponse, TransferCurve};
    use crate::graph::{graph_channel, StageTargets};
    use crate::voices::DrumBus;
    use rtrb::{Consumer, RingBuffer};

    const SR: u32 = 48_000;

    struct Rig {
        processor: RealtimeProcessor,
        capture: Consumer<f32>,
        analysis: Consumer<f32>,
        armed: Arc<AtomicBool>,
        clock: Arc<AudioClock>,
        stats: Arc<RealtimeStats>,
    }

    fn rig(capture_capacity: usize) -> Rig {
        let stats = Arc::new(RealtimeStats::new());
        let targets = StageTargets::default();
        let curve = Box::new(TransferCurve::build(&targets.curve));
        let impulse = ImpulseResponse::with_length(SR, 0.05);
        let (_trigger_tx, trigger_rx) = RingBuffer::new(8);
        let drums = DrumBus::new(trigger_rx, Arc::clone(&stats));
        let graph = SignalGraph::new(SR as f32, &impulse, &targets, curve, drums);
        let (_controller, inbox) = graph_channel(targets.curve);

        let (capture_tx, capture) = RingBuffer::new(capture_capacity);
        let (analysis_tx, analysis) = RingBuffer::new(16_384);
        let armed = Arc::new(AtomicBool::new(false));
        let clock = Arc::new(AudioClock::new(SR));
        let taps = BusTaps {
            capture: capture_tx,
            analysis: analysis_tx,
            armed: Arc::clone(&armed),
        };
        Rig {
            processor: RealtimeProcessor::new(graph, inbox, taps, Arc::clone(&clock), Arc::clone(&stats)),
            capture,
            analysis,
            armed,
            clock,
            stats,
        }
    }

    fn tone(buf: &mut [f32]) -> usize {
        for (i, s) in buf.iter_mut().enumerate() {
            *s = 0.5 * (i as f32 * 0.05).sin();
        }
        buf.len()
    }

    #[test]
    fn test_clock_and_analysis_follow_frames() {
        let mut rig = rig(8192);
        let mut out = vec![0.0; 512 * 2];
        rig.processor.render(&mut out, 2, tone);
        assert_eq!(rig.clock.frames(), 512);
        assert_eq!(rig.analysis.slots(), 512);
        assert_eq!(rig.capture.slots(), 0);
    }

    #[test]
    fn test_capture_only_while_armed() {
        let mut rig = rig(8192);
        let mut out = vec![0.0; 256 * 2];
        rig.processor.render(&mut out, 2, tone);
        assert_eq!(rig.capture.slots(), 0);

        rig.armed.store(true, Ordering::Release);
        rig.processor.render(&mut out, 2, tone);
        assert_eq!(rig.capture.slots(), 512);
    }

    #[test]
    fn test_full_capture_ring_counts_overflow() {
        let mut rig = rig(300);
        rig.armed.store(true, Ordering::Release);
        let mut out = vec![0.0; 256 * 2];
        rig.processor.render(&mut out, 2, tone);
        // One 128-frame quantum fits, the second does not
        assert_eq!(rig.capture.slots(), 256);
        assert_eq!(rig.stats.snapshot().capture_overflows, 1);
    }

    #[test]
    fn test_missing_input_is_counted() {
        let mut rig = rig(8192);
        let mut out = vec![0.0; 100 * 2];
        rig.processor.render(&mut out, 2, |buf| tone(&mut buf[..60]));
        assert_eq!(rig.stats.snapshot().input_underruns, 40);
    }

    #[test]
    fn test_extra_channels_get_the_average() {
        let mut rig = rig(8192);
        let mut out = vec![0.0; 4_800 * 4];
        rig.processor.render(&mut out, 4, tone);
        let frame = &out[4_000 * 4..4_000 * 4 + 4];
        let mid = 0.5 * (frame[0] + frame[1]);
        assert!((frame[2] - mid).abs() < 1e-6);
        assert!((frame[3] - mid).abs() < 1e-6);
        assert!(out.iter().any(|&s| s != 0.0));
    }
}
