use std::sync::Arc;

use rtrb::Consumer;

use crate::engine::stats::RealtimeStats;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::sequencing::DrumTrigger;

use super::recipe::recipe_for;
use super::voice::DrumVoice;

/// Voices sounding at once. Enough for three lanes with long electronic kick
/// tails at 240 bpm.
pub const MAX_DRUM_VOICES: usize = 16;

/// Triggers that can wait for a later block. The scheduler looks ahead about
/// 100 ms, which is at most a few dozen hits.
pub const MAX_PENDING_TRIGGERS: usize = 128;

/// Percussion source feeding the `Rhythm` stage.
///
/// Pulls scheduled hits from the sequencer's ring, holds the ones that belong
/// to future blocks and starts each voice at its exact frame inside the block.
/// A hit whose frame has already passed starts at the top of the block and is
/// counted as late.
pub struct DrumBus {
    rx: Consumer<DrumTrigger>,
    pending: Vec<DrumTrigger>,
    voices: Vec<DrumVoice>,
    stats: Arc<RealtimeStats>,
}

impl DrumBus {
    pub fn new(rx: Consumer<DrumTrigger>, stats: Arc<RealtimeStats>) -> Self {
        let voices = (0..MAX_DRUM_VOICES)
            .map(|i| DrumVoice::new(0x5EED_0000 + i as u64))
            .collect();

        Self {
            rx,
            pending: Vec::with_capacity(MAX_PENDING_TRIGGERS),
            voices,
            stats,
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_free()).count()
    }

    fn drain_ring(&mut self) {
        let mut dropped = 0;
        while let Ok(trigger) = self.rx.pop() {
            if self.pending.len() < MAX_PENDING_TRIGGERS {
                self.pending.push(trigger);
            } else {
                dropped += 1;
            }
        }
        self.stats.add_dropped_triggers(dropped);
    }

    fn allocate_voice(&mut self) -> &mut DrumVoice {
        // First pass: free voice, otherwise steal the oldest
        let idx = self
            .voices
            .iter()
            .position(|v| v.is_free())
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.age())
                    .map(|(idx, _)| idx)
            })
            .unwrap_or(0);
        &mut self.voices[idx]
    }
}

impl GraphNode for DrumBus {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.drain_ring();

        let block_start = ctx.frame;
        let block_end = block_start + out.len() as u64;

        let mut late = 0;
        let mut i = 0;
        while i < self.pending.len() {
            let trigger = self.pending[i];
            if trigger.at_sample >= block_end {
                i += 1;
                continue;
            }
            self.pending.swap_remove(i);

            let offset = if trigger.at_sample >= block_start {
                (trigger.at_sample - block_start) as usize
            } else {
                late += 1;
                0
            };
            let recipe = recipe_for(trigger.timbre);
            self.allocate_voice()
                .start(recipe, trigger.gain, offset, trigger.at_sample, ctx.sample_rate);
        }
        self.stats.add_late_triggers(late);

        for voice in self.voices.iter_mut().filter(|v| !v.is_free()) {
            voice.render_add(out, ctx.sample_rate);
        }
    }

    fn reset(&mut self) {
        self.pending.clear();
        for voice in &mut self.voices {
            voice.stop();
        }
    }
}
