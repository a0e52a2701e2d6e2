use std::sync::Arc;

use rtrb::Producer;
use tracing::{debug, info, warn};

use super::clock::StepClock;
use super::store::{PatternStore, FALLBACK_PATTERN};
use super::{DrumPattern, DrumTrigger};
use crate::engine::stats::RealtimeStats;
use crate::params::RhythmSettings;
use crate::EngineError;

/// Slots in the sequencer → drum bus ring.
pub const TRIGGER_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Running,
}

/// How far ahead the scheduler plans and where a fresh start lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerTiming {
    pub sample_rate: u32,
    /// Seconds of audio scheduled ahead of `now` on every tick.
    pub lookahead: f64,
    /// Gap between pressing play and step 0.
    pub start_offset: f64,
}

/// Lookahead drum sequencer.
///
/// Runs on the housekeeping thread. Each [`tick`](Self::tick) turns every
/// step that starts before `now + lookahead` into [`DrumTrigger`]s stamped
/// with their exact audio-clock frame and pushes them to the drum bus.
/// Steps already pushed are never revisited, so pattern and tempo edits only
/// affect steps that are still in the future.
pub struct RhythmSequencer {
    settings: RhythmSettings,
    /// Pattern name as last passed to `set_settings`, before fallback.
    requested: String,
    store: PatternStore,
    live: Arc<DrumPattern>,
    clock: StepClock,
    state: TransportState,
    timing: SchedulerTiming,
    tx: Option<Producer<DrumTrigger>>,
    stats: Arc<RealtimeStats>,
    current_step: Option<usize>,
    skipped_steps: u64,
}

impl RhythmSequencer {
    pub fn new(
        store: PatternStore,
        timing: SchedulerTiming,
        tx: Producer<DrumTrigger>,
        stats: Arc<RealtimeStats>,
    ) -> Self {
        let mut sequencer = Self::detached(store, timing, stats);
        sequencer.tx = Some(tx);
        sequencer
    }

    /// A sequencer with no drum bus yet. Settings and patterns can be edited;
    /// nothing is scheduled until [`attach`](Self::attach).
    pub fn detached(store: PatternStore, timing: SchedulerTiming, stats: Arc<RealtimeStats>) -> Self {
        let defaults = RhythmSettings::default();
        let clock = StepClock::new(defaults.bpm);
        let (pattern, live) = select(&store, &defaults.pattern);
        Self {
            requested: defaults.pattern.clone(),
            settings: RhythmSettings { pattern, ..defaults },
            store,
            live,
            clock,
            state: TransportState::Stopped,
            timing,
            tx: None,
            stats,
            current_step: None,
            skipped_steps: 0,
        }
    }

    /// Connect to a fresh drum bus whose clock reads `now`. A transport that
    /// was already switched on restarts from step 0.
    pub fn attach(&mut self, tx: Producer<DrumTrigger>, timing: SchedulerTiming, now: f64) {
        self.tx = Some(tx);
        self.timing = timing;
        self.current_step = None;
        if self.state == TransportState::Running {
            self.clock.start(now + timing.start_offset);
        }
    }

    pub fn detach(&mut self) {
        self.tx = None;
        self.current_step = None;
    }

    pub fn settings(&self) -> &RhythmSettings {
        &self.settings
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Index of the most recently scheduled step within the pattern.
    pub fn current_step(&self) -> Option<usize> {
        self.current_step
    }

    pub fn skipped_steps(&self) -> u64 {
        self.skipped_steps
    }

    /// Pattern the scheduler is reading from.
    pub fn live_pattern(&self) -> Arc<DrumPattern> {
        Arc::clone(&self.live)
    }

    pub fn store(&self) -> &PatternStore {
        &self.store
    }

    /// Apply new settings. Crossing the `is_playing` edge starts or stops the
    /// transport; everything else changes in place.
    pub fn set_settings(&mut self, settings: RhythmSettings, now: f64) {
        let settings = settings.clamped();

        // A name that fell back stays on the fallback until it changes or
        // gets saved, so unrelated updates keep any live edit
        let reselect = settings.pattern != self.requested
            || (settings.pattern != self.settings.pattern && self.store.contains(&settings.pattern));
        if reselect {
            let (name, live) = select(&self.store, &settings.pattern);
            self.live = live;
            self.settings.pattern = name;
            self.requested = settings.pattern.clone();
        }
        self.clock.set_bpm(settings.bpm);
        self.settings.bpm = settings.bpm;
        self.settings.volume = settings.volume;
        self.settings.kick = settings.kick;
        self.settings.snare = settings.snare;
        self.settings.hihat = settings.hihat;

        match (self.state, settings.is_playing) {
            (TransportState::Stopped, true) => {
                self.clock.start(now + self.timing.start_offset);
                self.state = TransportState::Running;
                self.current_step = None;
                info!(bpm = settings.bpm, pattern = %self.settings.pattern, "rhythm started");
            }
            (TransportState::Running, false) => {
                self.state = TransportState::Stopped;
                self.current_step = None;
                info!("rhythm stopped");
            }
            _ => {}
        }
        self.settings.is_playing = settings.is_playing;
    }

    /// Schedule every step that starts before `now + lookahead`. Returns the
    /// number of triggers pushed.
    pub fn tick(&mut self, now: f64) -> usize {
        if self.state != TransportState::Running {
            return 0;
        }
        let Some(tx) = self.tx.as_mut() else {
            return 0;
        };

        let skipped = self.clock.skip_past(now);
        if skipped > 0 {
            self.skipped_steps += skipped;
            warn!(skipped, "sequencer fell behind, skipping late steps");
        }

        let horizon = now + self.timing.lookahead;
        let sample_rate = self.timing.sample_rate as f64;
        let mut pushed = 0;
        let mut dropped = 0;

        while self.clock.next_time() < horizon {
            let (step, time) = self.clock.advance();
            let index = (step % self.live.len() as u64) as usize;
            let at_sample = (time * sample_rate).round() as u64;

            for instrument in self.live.hits_at(index) {
                let trigger = DrumTrigger {
                    timbre: instrument.timbre(&self.settings),
                    at_sample,
                    gain: self.settings.volume,
                    step: index,
                };
                match tx.push(trigger) {
                    Ok(()) => pushed += 1,
                    Err(_) => dropped += 1,
                }
            }
            self.current_step = Some(index);
        }

        self.stats.add_dropped_triggers(dropped);
        pushed
    }

    /// Replace the playing pattern without saving it.
    pub fn update_live_pattern(&mut self, pattern: DrumPattern) -> Result<(), EngineError> {
        pattern.validate()?;
        debug!(steps = pattern.len(), "live pattern updated");
        self.live = Arc::new(pattern);
        Ok(())
    }

    /// Save under `name`. Saving over the selected pattern also updates what
    /// is playing.
    pub fn save_pattern(&mut self, name: &str, pattern: DrumPattern) -> Result<(), EngineError> {
        self.store.save(name, pattern)?;
        if name.trim() == self.settings.pattern {
            if let Some(saved) = self.store.get(&self.settings.pattern) {
                self.live = saved;
            }
        }
        Ok(())
    }

    /// Delete `name`. Deleting the selected pattern selects the fallback.
    pub fn delete_pattern(&mut self, name: &str) -> Result<(), EngineError> {
        self.store.delete(name)?;
        if name == self.settings.pattern {
            info!(deleted = name, fallback = FALLBACK_PATTERN, "selected pattern deleted");
            self.settings.pattern = FALLBACK_PATTERN.to_string();
            self.live = self.store.fallback();
        }
        Ok(())
    }
}

/// Resolve a pattern name, falling back when it is unknown.
fn select(store: &PatternStore, name: &str) -> (String, Arc<DrumPattern>) {
    match store.get(name) {
        Some(pattern) => (name.to_string(), pattern),
        None => {
            warn!(name, fallback = FALLBACK_PATTERN, "unknown pattern selected");
            (FALLBACK_PATTERN.to_string(), store.fallback())
        }
    }
}
